//! Error types for event dispatch.
//!
//! Every failure of a dispatch run ends up as one [`ActionError`]. The hosting
//! binary turns it into a non-zero exit code; nothing here is retried.

use std::path::PathBuf;

use thiserror::Error;

/// Error returned by a user-registered event handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced while loading, parsing or dispatching an event.
#[derive(Debug, Error)]
pub enum ActionError {
    /// A required runner environment variable is not set.
    #[error("Missing required environment variable: {name}")]
    MissingVariable { name: &'static str },

    /// The runner environment could not be loaded.
    #[error("Configuration error: {0}")]
    Configuration(#[from] config::ConfigError),

    /// `GITHUB_REPOSITORY` is not in `owner/name` form.
    #[error("Invalid repository {value:?}: expected owner/name")]
    InvalidRepository { value: String },

    /// The event payload file could not be read.
    #[error("Failed to read event payload {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The payload does not match the shape expected for the event type.
    #[error("Failed to parse {event_name:?} event payload: {source}")]
    Parse {
        event_name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The event type is supported but no handler was registered for it.
    #[error("No handler for the received event type {event_name:?}")]
    NoHandler { event_name: String },

    /// The event type is not one the dispatcher knows about.
    #[error("Unsupported event type: {event_name:?}")]
    UnsupportedEventType { event_name: String },

    /// The GitHub API client could not be constructed.
    #[error("GitHub client error: {0}")]
    Client(#[from] octocrab::Error),

    /// The client was built outside a Tokio runtime.
    #[error("A Tokio runtime is required to build the GitHub client: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// The invoked handler failed. The handler's error is kept as-is.
    #[error(transparent)]
    Handler(HandlerError),
}

impl ActionError {
    /// Check if this error is a policy outcome that a skip flag can turn into success.
    ///
    /// Only `NoHandler` and `UnsupportedEventType` qualify; every other
    /// variant is a real failure.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Self::NoHandler { .. } | Self::UnsupportedEventType { .. }
        )
    }

    /// Name of the event involved, when the error concerns a specific event.
    pub fn event_name(&self) -> Option<&str> {
        match self {
            Self::Parse { event_name, .. }
            | Self::NoHandler { event_name }
            | Self::UnsupportedEventType { event_name } => Some(event_name),
            _ => None,
        }
    }

    /// Take back the handler's own error, if the handler is what failed.
    pub fn into_handler_error(self) -> Result<HandlerError, Self> {
        match self {
            Self::Handler(e) => Ok(e),
            other => Err(other),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
