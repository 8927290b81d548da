//! Event dispatcher for GitHub Actions.
//!
//! [`Action`] holds at most one handler per event type. [`Action::run`] reads
//! the current event from the runner, parses it and awaits the matching
//! handler, if any. Events without a handler and event types the dispatcher
//! does not know are errors unless the corresponding skip flag is set.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ghactions::Action;
//!
//! # async fn example() -> Result<(), ghactions::ActionError> {
//! let mut action = Action::new(std::env::var("GITHUB_TOKEN").ok())?;
//!
//! action
//!     .skip_when_no_handler(true)
//!     .on_pull_request(|_client, event| async move {
//!         println!("pull request #{}", event.payload.number);
//!         Ok(())
//!     });
//!
//! action.run().await
//! # }
//! ```

use std::fmt;
use std::future::Future;

use futures::future::{BoxFuture, FutureExt};
use octocrab::models::webhook_events::{payload, WebhookEvent, WebhookEventPayload, WebhookEventType};
use octocrab::models::{Author, Repository};
use octocrab::Octocrab;
use tracing::{debug, info, warn};

use crate::client::{build_client, ClientConfig};
use crate::context::ActionContext;
use crate::error::{ActionError, HandlerError};
use crate::event;

/// Result returned by event handlers.
pub type HandlerResult = Result<(), HandlerError>;

type HandlerFuture = BoxFuture<'static, HandlerResult>;

type Handler<P> = Box<dyn Fn(Octocrab, Event<P>) -> HandlerFuture + Send + Sync>;

type Routed = Result<Option<HandlerFuture>, ActionError>;

fn boxed<P, F, Fut>(handler: F) -> Handler<P>
where
    F: Fn(Octocrab, Event<P>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Box::new(move |client, event| handler(client, event).boxed())
}

// ============================================================================
// Typed Event
// ============================================================================

/// A parsed event handed to a handler.
///
/// `P` is the payload type of the event, e.g.
/// [`IssuesWebhookEventPayload`](octocrab::models::webhook_events::payload::IssuesWebhookEventPayload).
/// Sender and repository are common to all webhooks and are split out of the
/// payload by the parser.
#[derive(Debug, Clone)]
pub struct Event<P> {
    /// Kind of webhook event
    pub kind: WebhookEventType,

    /// User who triggered the event
    pub sender: Option<Author>,

    /// Repository the event belongs to
    pub repository: Option<Repository>,

    /// Event-specific payload
    pub payload: Box<P>,
}

/// Fields shared by every webhook, carried to the handler next to the payload.
struct Envelope {
    kind: WebhookEventType,
    sender: Option<Author>,
    repository: Option<Repository>,
}

// ============================================================================
// Dispatch Table
// ============================================================================

macro_rules! event_handlers {
    ($( ($name:ident, $variant:ident, $setter:ident, $payload:ident) ),* $(,)?) => {
        /// Event names the dispatcher can route to a handler.
        pub const SUPPORTED_EVENTS: &[&str] = &[
            $( event::$name, )*
            event::PULL_REQUEST_TARGET,
        ];

        #[derive(Default)]
        struct Handlers {
            $( $setter: Option<Handler<payload::$payload>>, )*
            on_pull_request_target: Option<Handler<payload::PullRequestWebhookEventPayload>>,
        }

        impl Handlers {
            fn registered(&self) -> Vec<&'static str> {
                let mut names = Vec::new();
                $(
                    if self.$setter.is_some() {
                        names.push(event::$name);
                    }
                )*
                if self.on_pull_request_target.is_some() {
                    names.push(event::PULL_REQUEST_TARGET);
                }
                names
            }
        }

        impl Action {
            $(
                #[doc = concat!(
                    "Register the handler for [`", stringify!($name), "`](crate::event::",
                    stringify!($name), ") events, replacing any earlier one."
                )]
                pub fn $setter<F, Fut>(&mut self, handler: F) -> &mut Self
                where
                    F: Fn(Octocrab, Event<payload::$payload>) -> Fut + Send + Sync + 'static,
                    Fut: Future<Output = HandlerResult> + Send + 'static,
                {
                    self.handlers.$setter = Some(boxed(handler));
                    self
                }
            )*

            /// Register the handler for [`PULL_REQUEST_TARGET`](crate::event::PULL_REQUEST_TARGET)
            /// events, replacing any earlier one.
            ///
            /// These carry a pull request payload but never reach the
            /// [`on_pull_request`](Self::on_pull_request) handler.
            pub fn on_pull_request_target<F, Fut>(&mut self, handler: F) -> &mut Self
            where
                F: Fn(Octocrab, Event<payload::PullRequestWebhookEventPayload>) -> Fut
                    + Send
                    + Sync
                    + 'static,
                Fut: Future<Output = HandlerResult> + Send + 'static,
            {
                self.handlers.on_pull_request_target = Some(boxed(handler));
                self
            }

            /// Resolve the handler future for a parsed event.
            ///
            /// `Ok(None)` means a skip flag turned the event into a no-op.
            /// Each arm only moves boxes so the frame stays small.
            fn route(&self, event_name: &str, webhook: WebhookEvent) -> Routed {
                let WebhookEvent {
                    kind,
                    sender,
                    repository,
                    specific,
                    ..
                } = webhook;
                let envelope = Box::new(Envelope {
                    kind,
                    sender,
                    repository,
                });

                match specific {
                    WebhookEventPayload::PullRequest(payload)
                        if event_name == event::PULL_REQUEST_TARGET =>
                    {
                        let handler = self.handlers.on_pull_request_target.as_ref();
                        self.bind(event_name, handler, envelope, payload)
                    }
                    $(
                        WebhookEventPayload::$variant(payload) => {
                            self.bind(event_name, self.handlers.$setter.as_ref(), envelope, payload)
                        }
                    )*
                    _ => self.unsupported_event_type(event_name).map(|()| None),
                }
            }
        }
    };
}

event_handlers! {
    (BRANCH_PROTECTION_RULE, BranchProtectionRule, on_branch_protection_rule, BranchProtectionRuleWebhookEventPayload),
    (CHECK_RUN, CheckRun, on_check_run, CheckRunWebhookEventPayload),
    (CHECK_SUITE, CheckSuite, on_check_suite, CheckSuiteWebhookEventPayload),
    (CODE_SCANNING_ALERT, CodeScanningAlert, on_code_scanning_alert, CodeScanningAlertWebhookEventPayload),
    (COMMIT_COMMENT, CommitComment, on_commit_comment, CommitCommentWebhookEventPayload),
    (CREATE, Create, on_create, CreateWebhookEventPayload),
    (DELETE, Delete, on_delete, DeleteWebhookEventPayload),
    (DEPENDABOT_ALERT, DependabotAlert, on_dependabot_alert, DependabotAlertWebhookEventPayload),
    (DEPLOY_KEY, DeployKey, on_deploy_key, DeployKeyWebhookEventPayload),
    (DEPLOYMENT, Deployment, on_deployment, DeploymentWebhookEventPayload),
    (DEPLOYMENT_PROTECTION_RULE, DeploymentProtectionRule, on_deployment_protection_rule, DeploymentProtectionRuleWebhookEventPayload),
    (DEPLOYMENT_STATUS, DeploymentStatus, on_deployment_status, DeploymentStatusWebhookEventPayload),
    (DISCUSSION, Discussion, on_discussion, DiscussionWebhookEventPayload),
    (DISCUSSION_COMMENT, DiscussionComment, on_discussion_comment, DiscussionCommentWebhookEventPayload),
    (FORK, Fork, on_fork, ForkWebhookEventPayload),
    (GITHUB_APP_AUTHORIZATION, GithubAppAuthorization, on_github_app_authorization, GithubAppAuthorizationWebhookEventPayload),
    (GOLLUM, Gollum, on_gollum, GollumWebhookEventPayload),
    (INSTALLATION, Installation, on_installation, InstallationWebhookEventPayload),
    (INSTALLATION_REPOSITORIES, InstallationRepositories, on_installation_repositories, InstallationRepositoriesWebhookEventPayload),
    (INSTALLATION_TARGET, InstallationTarget, on_installation_target, InstallationTargetWebhookEventPayload),
    (ISSUE_COMMENT, IssueComment, on_issue_comment, IssueCommentWebhookEventPayload),
    (ISSUES, Issues, on_issues, IssuesWebhookEventPayload),
    (LABEL, Label, on_label, LabelWebhookEventPayload),
    (MARKETPLACE_PURCHASE, MarketplacePurchase, on_marketplace_purchase, MarketplacePurchaseWebhookEventPayload),
    (MEMBER, Member, on_member, MemberWebhookEventPayload),
    (MEMBERSHIP, Membership, on_membership, MembershipWebhookEventPayload),
    (MERGE_GROUP, MergeGroup, on_merge_group, MergeGroupWebhookEventPayload),
    (META, Meta, on_meta, MetaWebhookEventPayload),
    (MILESTONE, Milestone, on_milestone, MilestoneWebhookEventPayload),
    (ORG_BLOCK, OrgBlock, on_org_block, OrgBlockWebhookEventPayload),
    (ORGANIZATION, Organization, on_organization, OrganizationWebhookEventPayload),
    (PACKAGE, Package, on_package, PackageWebhookEventPayload),
    (PAGE_BUILD, PageBuild, on_page_build, PageBuildWebhookEventPayload),
    (PING, Ping, on_ping, PingWebhookEventPayload),
    (PROJECT, Project, on_project, ProjectWebhookEventPayload),
    (PROJECT_CARD, ProjectCard, on_project_card, ProjectCardWebhookEventPayload),
    (PROJECT_COLUMN, ProjectColumn, on_project_column, ProjectColumnWebhookEventPayload),
    (PROJECTS_V2, ProjectsV2, on_projects_v2, ProjectsV2WebhookEventPayload),
    (PROJECTS_V2_ITEM, ProjectsV2Item, on_projects_v2_item, ProjectsV2ItemWebhookEventPayload),
    (PUBLIC, Public, on_public, PublicWebhookEventPayload),
    (PULL_REQUEST, PullRequest, on_pull_request, PullRequestWebhookEventPayload),
    (PULL_REQUEST_REVIEW, PullRequestReview, on_pull_request_review, PullRequestReviewWebhookEventPayload),
    (PULL_REQUEST_REVIEW_COMMENT, PullRequestReviewComment, on_pull_request_review_comment, PullRequestReviewCommentWebhookEventPayload),
    (PULL_REQUEST_REVIEW_THREAD, PullRequestReviewThread, on_pull_request_review_thread, PullRequestReviewThreadWebhookEventPayload),
    (PUSH, Push, on_push, PushWebhookEventPayload),
    (REGISTRY_PACKAGE, RegistryPackage, on_registry_package, RegistryPackageWebhookEventPayload),
    (RELEASE, Release, on_release, ReleaseWebhookEventPayload),
    (REPOSITORY, Repository, on_repository, RepositoryWebhookEventPayload),
    (REPOSITORY_DISPATCH, RepositoryDispatch, on_repository_dispatch, RepositoryDispatchWebhookEventPayload),
    (REPOSITORY_IMPORT, RepositoryImport, on_repository_import, RepositoryImportWebhookEventPayload),
    (REPOSITORY_VULNERABILITY_ALERT, RepositoryVulnerabilityAlert, on_repository_vulnerability_alert, RepositoryVulnerabilityAlertWebhookEventPayload),
    (SCHEDULE, Schedule, on_schedule, ScheduleWebhookEventPayload),
    (SECRET_SCANNING_ALERT, SecretScanningAlert, on_secret_scanning_alert, SecretScanningAlertWebhookEventPayload),
    (SECURITY_AND_ANALYSIS, SecurityAndAnalysis, on_security_and_analysis, SecurityAndAnalysisWebhookEventPayload),
    (SPONSORSHIP, Sponsorship, on_sponsorship, SponsorshipWebhookEventPayload),
    (STAR, Star, on_star, StarWebhookEventPayload),
    (STATUS, Status, on_status, StatusWebhookEventPayload),
    (TEAM, Team, on_team, TeamWebhookEventPayload),
    (TEAM_ADD, TeamAdd, on_team_add, TeamAddWebhookEventPayload),
    (WATCH, Watch, on_watch, WatchWebhookEventPayload),
    (WORKFLOW_DISPATCH, WorkflowDispatch, on_workflow_dispatch, WorkflowDispatchWebhookEventPayload),
    (WORKFLOW_JOB, WorkflowJob, on_workflow_job, WorkflowJobWebhookEventPayload),
    (WORKFLOW_RUN, WorkflowRun, on_workflow_run, WorkflowRunWebhookEventPayload),
}

/// Check whether the dispatcher can route `event_name` to a handler.
pub fn is_supported(event_name: &str) -> bool {
    SUPPORTED_EVENTS.contains(&event_name)
}

// ============================================================================
// Action
// ============================================================================

/// GitHub Action event dispatcher.
///
/// Build it once, register handlers with the `on_*` setters, then call
/// [`run`](Self::run) once per process.
pub struct Action {
    client: Octocrab,
    skip_when_no_handler: bool,
    skip_when_type_unknown: bool,
    handlers: Handlers,
}

impl Action {
    /// Create a dispatcher whose client uses `token`, if any.
    ///
    /// `None` or an empty token gives an anonymous client. The token is not
    /// checked here.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::NoRuntime` outside a runtime and
    /// `ActionError::Client` if the HTTP client cannot be built.
    pub fn new(token: Option<String>) -> Result<Self, ActionError> {
        let config = ClientConfig {
            token,
            ..ClientConfig::default()
        };
        Ok(Self::with_client(build_client(&config)?))
    }

    /// Create a dispatcher configured from the runner environment.
    ///
    /// Uses `GITHUB_TOKEN` and `GITHUB_API_URL`. Like [`new`](Self::new) it
    /// must be called from within a Tokio runtime.
    pub fn from_env() -> Result<Self, ActionError> {
        let context = ActionContext::from_env()?;
        let client = build_client(&ClientConfig::from_context(&context))?;
        Ok(Self::with_client(client))
    }

    /// Create a dispatcher around an existing client.
    pub fn with_client(client: Octocrab) -> Self {
        Self {
            client,
            skip_when_no_handler: false,
            skip_when_type_unknown: false,
            handlers: Handlers::default(),
        }
    }

    /// Succeed instead of failing when no handler is registered for the event.
    pub fn skip_when_no_handler(&mut self, skip: bool) -> &mut Self {
        self.skip_when_no_handler = skip;
        self
    }

    /// Succeed instead of failing when the event type is not supported.
    pub fn skip_when_type_unknown(&mut self, skip: bool) -> &mut Self {
        self.skip_when_type_unknown = skip;
        self
    }

    /// The client handed to handlers.
    pub fn client(&self) -> &Octocrab {
        &self.client
    }

    /// Event names that currently have a handler.
    pub fn registered_events(&self) -> Vec<&'static str> {
        self.handlers.registered()
    }

    /// Dispatch the event described by the process environment.
    ///
    /// # Errors
    ///
    /// See [`run_with_context`](Self::run_with_context).
    pub async fn run(&self) -> Result<(), ActionError> {
        let context = ActionContext::from_env()?;
        self.run_with_context(&context).await
    }

    /// Dispatch the event described by `context`.
    ///
    /// The payload file is read before anything else is decided, so a missing
    /// file fails even for events without a handler.
    ///
    /// # Errors
    ///
    /// - `MissingVariable` if the event name or path is unset
    /// - `Io` if the payload cannot be read
    /// - `UnsupportedEventType` for unknown events, unless skipped
    /// - `Parse` if the payload does not match the event
    /// - `NoHandler` if nothing is registered, unless skipped
    /// - `Handler` with the handler's own error
    pub async fn run_with_context(&self, context: &ActionContext) -> Result<(), ActionError> {
        let event_name = context.event_name()?;
        let event_path = context.event_path()?;

        let payload = event::read_payload(event_path).await?;

        if !is_supported(event_name) {
            return self.unsupported_event_type(event_name);
        }

        // The parsed event must not live across the await below.
        let handler = {
            let webhook = event::parse(event_name, &payload)?;
            info!(event_name = %event_name, "Dispatching event");
            self.route(event_name, webhook)?
        };

        match handler {
            Some(handler) => handler.await.map_err(ActionError::Handler),
            None => Ok(()),
        }
    }

    fn bind<P>(
        &self,
        event_name: &str,
        handler: Option<&Handler<P>>,
        envelope: Box<Envelope>,
        payload: Box<P>,
    ) -> Routed {
        let Some(handler) = handler else {
            return self.missing_handler(event_name).map(|()| None);
        };

        let Envelope {
            kind,
            sender,
            repository,
        } = *envelope;
        let event = Event {
            kind,
            sender,
            repository,
            payload,
        };

        debug!(event_name = %event_name, "Invoking handler");
        Ok(Some(handler(self.client.clone(), event)))
    }

    fn missing_handler(&self, event_name: &str) -> Result<(), ActionError> {
        if self.skip_when_no_handler {
            warn!(event_name = %event_name, "No handler registered, skipping event");
            return Ok(());
        }

        Err(ActionError::NoHandler {
            event_name: event_name.to_string(),
        })
    }

    fn unsupported_event_type(&self, event_name: &str) -> Result<(), ActionError> {
        if self.skip_when_type_unknown {
            warn!(event_name = %event_name, "Unsupported event type, skipping event");
            return Ok(());
        }

        Err(ActionError::UnsupportedEventType {
            event_name: event_name.to_string(),
        })
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("skip_when_no_handler", &self.skip_when_no_handler)
            .field("skip_when_type_unknown", &self.skip_when_type_unknown)
            .field("handlers", &self.handlers.registered())
            .finish()
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
