//! GitHub Actions runner environment.
//!
//! The runner exposes the event and the workflow run through `GITHUB_*`
//! environment variables. [`ActionContext`] loads them through the `config`
//! crate so the same code path serves the real environment and explicit maps
//! in tests.

use std::fmt;
use std::path::Path;

use config::{Config, Environment};
use serde::{Deserialize, Serialize};

use crate::error::ActionError;

// ============================================================================
// Environment Variable Names
// ============================================================================

pub const HOME: &str = "HOME";
pub const HOSTNAME: &str = "HOSTNAME";
pub const PWD: &str = "PWD";
pub const PATH: &str = "PATH";
pub const GITHUB_ACTION: &str = "GITHUB_ACTION";
pub const GITHUB_ACTIONS: &str = "GITHUB_ACTIONS";
pub const GITHUB_ACTOR: &str = "GITHUB_ACTOR";
pub const GITHUB_API_URL: &str = "GITHUB_API_URL";
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const GITHUB_WORKFLOW: &str = "GITHUB_WORKFLOW";
pub const GITHUB_RUN_ID: &str = "GITHUB_RUN_ID";
pub const GITHUB_RUN_NUMBER: &str = "GITHUB_RUN_NUMBER";
pub const GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
pub const GITHUB_EVENT_NAME: &str = "GITHUB_EVENT_NAME";
pub const GITHUB_EVENT_PATH: &str = "GITHUB_EVENT_PATH";
pub const GITHUB_WORKSPACE: &str = "GITHUB_WORKSPACE";
pub const GITHUB_SHA: &str = "GITHUB_SHA";
pub const GITHUB_REF: &str = "GITHUB_REF";
pub const GITHUB_HEAD_REF: &str = "GITHUB_HEAD_REF";
pub const GITHUB_BASE_REF: &str = "GITHUB_BASE_REF";

/// Public GitHub REST API endpoint, used when `GITHUB_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const ENV_PREFIX: &str = "GITHUB";

// ============================================================================
// Action Context
// ============================================================================

/// Snapshot of the `GITHUB_*` variables of a workflow step.
///
/// Every field is optional because the runner omits some of them depending
/// on the trigger (`GITHUB_HEAD_REF` only exists for pull requests, for
/// example). Empty values are treated as absent.
///
/// # Examples
///
/// ```
/// use ghactions::ActionContext;
///
/// let context = ActionContext::from_vars([
///     ("GITHUB_EVENT_NAME", "push"),
///     ("GITHUB_EVENT_PATH", "/github/workflow/event.json"),
///     ("GITHUB_REPOSITORY", "octo-org/hello-world"),
/// ])
/// .unwrap();
///
/// assert_eq!(context.event_name().unwrap(), "push");
/// assert_eq!(context.repository_parts().unwrap(), ("octo-org", "hello-world"));
/// ```
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ActionContext {
    /// Webhook event that triggered the workflow (`GITHUB_EVENT_NAME`)
    pub event_name: Option<String>,

    /// Path of the JSON event payload (`GITHUB_EVENT_PATH`)
    pub event_path: Option<String>,

    /// Token for the GitHub API (`GITHUB_TOKEN`)
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// REST API base URL (`GITHUB_API_URL`)
    pub api_url: Option<String>,

    /// `owner/name` of the repository (`GITHUB_REPOSITORY`)
    pub repository: Option<String>,

    /// Commit SHA that triggered the workflow
    pub sha: Option<String>,

    /// Fully-formed ref that triggered the workflow
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,

    /// Source branch of a pull request
    pub head_ref: Option<String>,

    /// Target branch of a pull request
    pub base_ref: Option<String>,

    /// User or app that initiated the workflow
    pub actor: Option<String>,

    /// Name of the workflow
    pub workflow: Option<String>,

    /// Identifier of the running step
    pub action: Option<String>,

    /// Set to "true" when running inside GitHub Actions
    pub actions: Option<String>,

    /// Unique number of the workflow run
    pub run_id: Option<String>,

    /// Sequential number of this workflow's runs
    pub run_number: Option<String>,

    /// Working directory of the step
    pub workspace: Option<String>,
}

impl ActionContext {
    /// Load the context from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::Configuration` if the environment cannot be
    /// deserialized.
    pub fn from_env() -> Result<Self, ActionError> {
        Self::load(Environment::with_prefix(ENV_PREFIX).ignore_empty(true))
    }

    /// Load the context from an explicit set of variables.
    ///
    /// Variable names are the same as in the environment (`GITHUB_SHA`, ...);
    /// anything without the `GITHUB_` prefix is ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ActionError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Self::load(
            Environment::with_prefix(ENV_PREFIX)
                .ignore_empty(true)
                .source(Some(source)),
        )
    }

    fn load(environment: Environment) -> Result<Self, ActionError> {
        let context = Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize::<ActionContext>()?;

        Ok(context)
    }

    /// Event name, required for dispatch.
    pub fn event_name(&self) -> Result<&str, ActionError> {
        self.event_name
            .as_deref()
            .ok_or(ActionError::MissingVariable {
                name: GITHUB_EVENT_NAME,
            })
    }

    /// Event payload path, required for dispatch.
    pub fn event_path(&self) -> Result<&Path, ActionError> {
        self.event_path
            .as_deref()
            .map(Path::new)
            .ok_or(ActionError::MissingVariable {
                name: GITHUB_EVENT_PATH,
            })
    }

    /// API token, if one is available.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    /// REST API base URL, falling back to the public GitHub endpoint.
    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_API_URL)
    }

    /// Split `GITHUB_REPOSITORY` into owner and repository name.
    ///
    /// # Errors
    ///
    /// Returns `MissingVariable` if the variable is unset and
    /// `InvalidRepository` if it has no `/` separator or an empty half.
    pub fn repository_parts(&self) -> Result<(&str, &str), ActionError> {
        let repository = self
            .repository
            .as_deref()
            .ok_or(ActionError::MissingVariable {
                name: GITHUB_REPOSITORY,
            })?;

        match repository.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => Ok((owner, name)),
            _ => Err(ActionError::InvalidRepository {
                value: repository.to_string(),
            }),
        }
    }

    /// Whether the process runs inside GitHub Actions.
    pub fn is_github_actions(&self) -> bool {
        self.actions.as_deref() == Some("true")
    }
}

impl fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("event_name", &self.event_name)
            .field("event_path", &self.event_path)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("repository", &self.repository)
            .field("sha", &self.sha)
            .field("git_ref", &self.git_ref)
            .field("head_ref", &self.head_ref)
            .field("base_ref", &self.base_ref)
            .field("actor", &self.actor)
            .field("workflow", &self.workflow)
            .field("action", &self.action)
            .field("actions", &self.actions)
            .field("run_id", &self.run_id)
            .field("run_number", &self.run_number)
            .field("workspace", &self.workspace)
            .finish()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
