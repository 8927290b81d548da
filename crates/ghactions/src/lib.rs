//! # ghactions
//!
//! Typed event dispatch for GitHub Actions.
//!
//! A workflow step runs one process per event. The runner describes that event
//! through `GITHUB_EVENT_NAME` and a JSON payload file at `GITHUB_EVENT_PATH`.
//! This crate reads both, parses the payload with the `octocrab` webhook models
//! and hands the typed record to the one handler registered for that event,
//! together with a GitHub API client.
//!
//! This crate provides:
//! - [`Action`], the dispatcher with one `on_*` setter per supported event
//! - [`ActionContext`], the runner environment
//! - [`ClientConfig`] and [`build_client`] for the (optionally authenticated) API client
//! - [`event`] constants and payload helpers
//!
//! # Examples
//!
//! ```rust,no_run
//! use ghactions::Action;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut action = Action::from_env()?;
//!
//!     action
//!         .on_issues(|_client, event| async move {
//!             if let Some(repository) = &event.repository {
//!                 println!("{}: issue #{}", repository.name, event.payload.issue.number);
//!             }
//!             Ok(())
//!         })
//!         .on_push(|_client, event| async move {
//!             println!("push received for {:?}", event.kind);
//!             Ok(())
//!         });
//!
//!     action.run().await?;
//!     Ok(())
//! }
//! ```

pub mod action;
pub mod client;
pub mod context;
pub mod error;
pub mod event;

pub use action::{Action, Event, HandlerResult, SUPPORTED_EVENTS};
pub use client::{build_client, ClientConfig};
pub use context::ActionContext;
pub use error::{ActionError, HandlerError};
pub use event::EventSummary;

// The SDK types handlers work with.
pub use octocrab::models::webhook_events::{
    payload, WebhookEvent, WebhookEventPayload, WebhookEventType,
};
pub use octocrab::{self, Octocrab};
