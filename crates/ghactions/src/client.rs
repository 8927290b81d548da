//! GitHub API client construction.
//!
//! Handlers receive an [`Octocrab`] client built here. Without a token the
//! client is anonymous; with one, every request carries it as a bearer token.
//! The token is not validated up front, a bad token only shows up when a
//! handler makes its first call.

use std::fmt;

use octocrab::Octocrab;
use tracing::debug;

use crate::context::{ActionContext, DEFAULT_API_URL};
use crate::error::ActionError;

/// Configuration for the API client handed to event handlers.
///
/// # Examples
///
/// ```
/// use ghactions::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_api_url("https://ghe.example.com/api/v3")
///     .with_token("ghs_example");
///
/// assert!(config.is_authenticated());
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// GitHub API base URL
    pub api_url: String,
    /// Bearer token; `None` or empty builds an anonymous client
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
        }
    }
}

impl ClientConfig {
    /// Take API URL and token from the runner context.
    pub fn from_context(context: &ActionContext) -> Self {
        Self {
            api_url: context.api_url().to_string(),
            token: context.token().map(str::to_string),
        }
    }

    /// Set the GitHub API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Whether requests will carry a token.
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Build the API client described by `config`.
///
/// # Errors
///
/// - `NoRuntime` when called outside a Tokio runtime; the HTTP stack spawns
///   a background task on construction
/// - `Client` if the base URL is not a valid URI or the HTTP stack cannot be
///   created
pub fn build_client(config: &ClientConfig) -> Result<Octocrab, ActionError> {
    tokio::runtime::Handle::try_current()?;

    let mut builder = Octocrab::builder().base_uri(config.api_url.as_str())?;

    match config.token.as_deref() {
        Some(token) if !token.is_empty() => {
            builder = builder.personal_token(token.to_string());
        }
        _ => {}
    }

    let client = builder.build()?;

    debug!(
        api_url = %config.api_url,
        authenticated = config.is_authenticated(),
        "Built GitHub API client"
    );

    Ok(client)
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
