//! HTTP server for the bot.
//!
//! This module implements the HTTP server that:
//! - Accepts webhooks from GitHub, validates them, and dispatches them to the
//!   registered handlers before answering
//! - Provides health checks for liveness probes
//!
//! # Endpoints
//!
//! - `POST /` - Accepts GitHub webhook deliveries (returns 200 once handled)
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

use tower_http::trace::TraceLayer;

use crate::github::GitHubApi;
use crate::webhooks::EventRouter;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::webhook_handler;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor.
/// `A` is the API client handlers reply through.
pub struct AppState<A> {
    inner: Arc<AppStateInner<A>>,
}

// Derived `Clone` would require `A: Clone`.
impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<A> {
    /// The handler table, fixed at startup.
    router: EventRouter<A>,

    /// Webhook secret for signature verification. `None` disables it.
    webhook_secret: Option<Vec<u8>>,

    /// API client; each delivery gets its own clone.
    api: A,
}

impl<A> AppState<A> {
    /// Creates a new `AppState`.
    ///
    /// An empty `webhook_secret` is treated as no secret.
    pub fn new(router: EventRouter<A>, webhook_secret: Option<Vec<u8>>, api: A) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                router,
                webhook_secret: webhook_secret.filter(|s| !s.is_empty()),
                api,
            }),
        }
    }

    pub fn router(&self) -> &EventRouter<A> {
        &self.inner.router
    }

    /// Returns the webhook secret, if verification is enabled.
    pub fn webhook_secret(&self) -> Option<&[u8]> {
        self.inner.webhook_secret.as_deref()
    }

    pub fn api(&self) -> &A {
        &self.inner.api
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<A>(app_state: AppState<A>) -> axum::Router
where
    A: GitHubApi + Clone + 'static,
{
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/", post(webhook_handler::<A>))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
