//! Event type names and payload helpers.
//!
//! The constants are the values GitHub puts in `GITHUB_EVENT_NAME`. Parsing
//! itself is delegated to the `octocrab` webhook models; this module only
//! reads the payload file and maps the few Actions-only event names onto the
//! webhook payload they carry.

use std::path::Path;

use octocrab::models::webhook_events::WebhookEvent;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ActionError;

// ============================================================================
// Event Types
// ============================================================================

pub const BRANCH_PROTECTION_RULE: &str = "branch_protection_rule";
pub const CHECK_RUN: &str = "check_run";
pub const CHECK_SUITE: &str = "check_suite";
pub const CODE_SCANNING_ALERT: &str = "code_scanning_alert";
pub const COMMIT_COMMENT: &str = "commit_comment";
pub const CREATE: &str = "create";
pub const DELETE: &str = "delete";
pub const DEPENDABOT_ALERT: &str = "dependabot_alert";
pub const DEPLOY_KEY: &str = "deploy_key";
pub const DEPLOYMENT: &str = "deployment";
pub const DEPLOYMENT_PROTECTION_RULE: &str = "deployment_protection_rule";
pub const DEPLOYMENT_STATUS: &str = "deployment_status";
pub const DISCUSSION: &str = "discussion";
pub const DISCUSSION_COMMENT: &str = "discussion_comment";
pub const FORK: &str = "fork";
pub const GITHUB_APP_AUTHORIZATION: &str = "github_app_authorization";
pub const GOLLUM: &str = "gollum";
pub const INSTALLATION: &str = "installation";
pub const INSTALLATION_REPOSITORIES: &str = "installation_repositories";
pub const INSTALLATION_TARGET: &str = "installation_target";
pub const ISSUE_COMMENT: &str = "issue_comment";
pub const ISSUES: &str = "issues";
pub const LABEL: &str = "label";
pub const MARKETPLACE_PURCHASE: &str = "marketplace_purchase";
pub const MEMBER: &str = "member";
pub const MEMBERSHIP: &str = "membership";
pub const MERGE_GROUP: &str = "merge_group";
pub const META: &str = "meta";
pub const MILESTONE: &str = "milestone";
pub const ORG_BLOCK: &str = "org_block";
pub const ORGANIZATION: &str = "organization";
pub const PACKAGE: &str = "package";
pub const PAGE_BUILD: &str = "page_build";
pub const PING: &str = "ping";
pub const PROJECT: &str = "project";
pub const PROJECT_CARD: &str = "project_card";
pub const PROJECT_COLUMN: &str = "project_column";
pub const PROJECTS_V2: &str = "projects_v2";
pub const PROJECTS_V2_ITEM: &str = "projects_v2_item";
pub const PUBLIC: &str = "public";
pub const PULL_REQUEST: &str = "pull_request";
pub const PULL_REQUEST_REVIEW: &str = "pull_request_review";
pub const PULL_REQUEST_REVIEW_COMMENT: &str = "pull_request_review_comment";
pub const PULL_REQUEST_REVIEW_THREAD: &str = "pull_request_review_thread";
pub const PULL_REQUEST_TARGET: &str = "pull_request_target";
pub const PUSH: &str = "push";
pub const REGISTRY_PACKAGE: &str = "registry_package";
pub const RELEASE: &str = "release";
pub const REPOSITORY: &str = "repository";
pub const REPOSITORY_DISPATCH: &str = "repository_dispatch";
pub const REPOSITORY_IMPORT: &str = "repository_import";
pub const REPOSITORY_VULNERABILITY_ALERT: &str = "repository_vulnerability_alert";
pub const SCHEDULE: &str = "schedule";
pub const SECRET_SCANNING_ALERT: &str = "secret_scanning_alert";
pub const SECURITY_AND_ANALYSIS: &str = "security_and_analysis";
pub const SPONSORSHIP: &str = "sponsorship";
pub const STAR: &str = "star";
pub const STATUS: &str = "status";
pub const TEAM: &str = "team";
pub const TEAM_ADD: &str = "team_add";
pub const WATCH: &str = "watch";
pub const WORKFLOW_DISPATCH: &str = "workflow_dispatch";
pub const WORKFLOW_JOB: &str = "workflow_job";
pub const WORKFLOW_RUN: &str = "workflow_run";

/// Webhook payload name the parser expects for an event name.
///
/// `pull_request_target` runs in the context of the base branch but carries
/// an ordinary `pull_request` payload.
pub fn payload_name(event_name: &str) -> &str {
    match event_name {
        PULL_REQUEST_TARGET => PULL_REQUEST,
        other => other,
    }
}

// ============================================================================
// Payload Loading
// ============================================================================

/// Read the raw event payload.
///
/// # Errors
///
/// Returns `ActionError::Io` with the path if the file cannot be read.
pub async fn read_payload(path: &Path) -> Result<Vec<u8>, ActionError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| ActionError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Parse a payload into the typed webhook record for `event_name`.
///
/// # Errors
///
/// Returns `ActionError::Parse` if the bytes are not JSON or do not match the
/// shape of the event.
pub fn parse(event_name: &str, payload: &[u8]) -> Result<WebhookEvent, ActionError> {
    let header = payload_name(event_name);

    let event = WebhookEvent::try_from_header_and_body(header, payload).map_err(|source| {
        ActionError::Parse {
            event_name: event_name.to_string(),
            source,
        }
    })?;

    debug!(event_name = %event_name, kind = ?event.kind, "Parsed event payload");

    Ok(event)
}

// ============================================================================
// Event Summary
// ============================================================================

/// Short description of an event, independent of its payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    /// Event name as given by the runner
    pub event_name: String,

    /// Activity type (`opened`, `completed`, ...), when the event has one
    pub action: Option<String>,

    /// `owner/name` of the repository the event belongs to
    pub repository: Option<String>,

    /// Login of the user that triggered the event
    pub sender: Option<String>,
}

impl EventSummary {
    /// Summarize a raw payload.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::Parse` if the payload is not valid JSON.
    pub fn from_payload(event_name: &str, payload: &[u8]) -> Result<Self, ActionError> {
        let value: Value = serde_json::from_slice(payload).map_err(|source| ActionError::Parse {
            event_name: event_name.to_string(),
            source,
        })?;

        let field = |pointer: &str| {
            value
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Ok(Self {
            event_name: event_name.to_string(),
            action: field("/action"),
            repository: field("/repository/full_name"),
            sender: field("/sender/login"),
        })
    }
}

impl std::fmt::Display for EventSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name)?;
        if let Some(action) = &self.action {
            write!(f, " ({})", action)?;
        }
        if let Some(repository) = &self.repository {
            write!(f, " in {}", repository)?;
        }
        if let Some(sender) = &self.sender {
            write!(f, " by {}", sender)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
