//! Table-driven dispatch of webhook events to handlers.
//!
//! Handlers are registered against an event type and, optionally, an action.
//! A registration without an action is a wildcard: it matches every action of
//! its event type, including events that carry no action at all.
//!
//! # Dispatch contract
//!
//! - Matching handlers run one after another, in registration order.
//! - `dispatch` returns only once every matched handler has finished.
//! - A handler that fails (or panics) is logged and recorded in the
//!   [`DispatchReport`]; its siblings still run.
//! - An event nothing is registered for is not an error.
//!
//! The table is built during startup through `&mut self` and then shared
//! behind an `Arc`, so it cannot change while deliveries are being served.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use futures::future::BoxFuture;
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::github::GitHubApiError;

use super::event::Event;
use super::payload::PayloadError;

/// Errors a handler can report.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A payload field the handler needs is missing or has the wrong type.
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// An outbound API call failed.
    #[error(transparent)]
    Api(#[from] GitHubApiError),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),

    /// Any other handler-specific failure.
    #[error("{0}")]
    Other(String),
}

impl HandlerError {
    /// Returns true if the failure was a transient API error, so a
    /// redelivery of the webhook could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            HandlerError::Api(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// The future a handler callback returns.
pub type HandlerFuture<'a> = BoxFuture<'a, Result<(), HandlerError>>;

type Callback<A> = Box<dyn for<'a> Fn(&'a Event, &'a A) -> HandlerFuture<'a> + Send + Sync>;

struct Registration<A> {
    /// `None` matches every action.
    action: Option<String>,
    /// `<event_type>:<action or *>#<n>`, used in logs and reports.
    name: String,
    callback: Callback<A>,
}

impl<A> Registration<A> {
    fn matches(&self, action: Option<&str>) -> bool {
        match &self.action {
            None => true,
            Some(filter) => Some(filter.as_str()) == action,
        }
    }
}

/// A handler that failed during dispatch.
#[derive(Debug)]
pub struct HandlerFailure {
    /// The registration's generated name.
    pub handler: String,
    pub error: HandlerError,
}

/// Outcome of dispatching one event.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Number of handlers invoked.
    pub invoked: usize,
    /// Handlers that returned an error or panicked.
    pub failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    /// Returns true if every invoked handler succeeded (or none matched).
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of handlers that completed without error.
    pub fn succeeded(&self) -> usize {
        self.invoked - self.failures.len()
    }
}

/// Routes events to the handlers registered for their `(event_type, action)`.
///
/// `A` is the API client handed to every handler alongside the event.
pub struct EventRouter<A> {
    /// Registrations per event type, in registration order.
    routes: HashMap<String, Vec<Registration<A>>>,
    /// Total number of registrations, for naming.
    count: usize,
}

impl<A> Default for EventRouter<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for EventRouter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self
            .routes
            .values()
            .flatten()
            .map(|r| r.name.as_str())
            .collect();
        names.sort_unstable();
        f.debug_struct("EventRouter")
            .field("handlers", &names)
            .finish()
    }
}

impl<A> EventRouter<A> {
    /// Creates an empty router.
    pub fn new() -> Self {
        EventRouter {
            routes: HashMap::new(),
            count: 0,
        }
    }

    /// Registers `handler` for `event_type` and, if given, a single `action`.
    ///
    /// Registration always appends: several handlers may share a key and all
    /// of them run.
    ///
    /// # Example
    ///
    /// ```
    /// use ideal_octo_garbanzo::github::{GitHubApi, OctocrabClient};
    /// use ideal_octo_garbanzo::webhooks::{Event, EventRouter, HandlerError};
    ///
    /// async fn greet<A: GitHubApi>(event: &Event, gh: &A) -> Result<(), HandlerError> {
    ///     let url = event.get_str(&["issue", "comments_url"])?;
    ///     gh.post(url, &serde_json::json!({ "body": "Hi!" }), None).await?;
    ///     Ok(())
    /// }
    ///
    /// let mut router = EventRouter::<OctocrabClient>::new();
    /// router.register("issues", Some("opened"), |event, gh| Box::pin(greet(event, gh)));
    /// assert_eq!(router.len(), 1);
    /// ```
    pub fn register<F>(&mut self, event_type: &str, action: Option<&str>, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a Event, &'a A) -> HandlerFuture<'a> + Send + Sync + 'static,
    {
        let name = format!("{}:{}#{}", event_type, action.unwrap_or("*"), self.count);
        debug!(handler = %name, "Registering webhook handler");

        self.routes
            .entry(event_type.to_string())
            .or_default()
            .push(Registration {
                action: action.map(str::to_string),
                name,
                callback: Box::new(handler),
            });
        self.count += 1;
        self
    }

    /// Total number of registered handlers.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Names of the handlers `event` would be dispatched to, in order.
    pub fn matching_handlers(&self, event: &Event) -> Vec<&str> {
        self.matching(event)
            .into_iter()
            .map(|r| r.name.as_str())
            .collect()
    }

    fn matching(&self, event: &Event) -> Vec<&Registration<A>> {
        self.routes
            .get(event.event_type())
            .map(|registrations| {
                registrations
                    .iter()
                    .filter(|r| r.matches(event.action()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Invokes every handler matching `event`, passing it `api`.
    ///
    /// Handlers run sequentially in registration order; the returned future
    /// resolves after the last one has finished. Handler errors and panics are
    /// logged and collected into the report rather than propagated.
    #[instrument(
        skip_all,
        fields(
            delivery_id = %event.delivery_id(),
            event_type = %event.event_type(),
            action = event.action().unwrap_or("-"),
        )
    )]
    pub async fn dispatch(&self, event: &Event, api: &A) -> DispatchReport {
        let mut report = DispatchReport::default();

        for registration in self.matching(event) {
            report.invoked += 1;
            debug!(handler = %registration.name, "Invoking handler");

            if let Err(e) = invoke(registration, event, api).await {
                error!(
                    handler = %registration.name,
                    error = %e,
                    transient = e.is_transient(),
                    "Webhook handler failed"
                );
                report.failures.push(HandlerFailure {
                    handler: registration.name.clone(),
                    error: e,
                });
            }
        }

        if report.invoked == 0 {
            debug!("No handlers registered for event");
        }

        report
    }
}

/// Runs one handler, turning a panic (while building or polling its future)
/// into a [`HandlerError::Panicked`].
async fn invoke<A>(
    registration: &Registration<A>,
    event: &Event,
    api: &A,
) -> Result<(), HandlerError> {
    let future = match panic::catch_unwind(AssertUnwindSafe(|| (registration.callback)(event, api)))
    {
        Ok(future) => future,
        Err(payload) => return Err(HandlerError::Panicked(panic_message(&*payload))),
    };

    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(HandlerError::Panicked(panic_message(&*payload))))
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
