//! Webhook endpoint handler.
//!
//! Validates a GitHub webhook delivery, dispatches it to the registered
//! handlers, and answers once they have all finished.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::AppState;
use crate::github::GitHubApi;
use crate::webhooks::{Event, EventError, EventErrorKind};

/// A delivery rejected before dispatch.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct WebhookError(#[from] EventError);

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match (&self.0, self.0.kind()) {
            (EventError::UnsupportedContentType(_), _) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            (_, EventErrorKind::Authentication) => StatusCode::UNAUTHORIZED,
            (_, EventErrorKind::MalformedPayload) => StatusCode::BAD_REQUEST,
        };

        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Required headers:
///   - `X-GitHub-Event`: Event type (e.g., "issues", "pull_request")
///   - `X-GitHub-Delivery`: Unique delivery ID
///   - `X-Hub-Signature-256` or `X-Hub-Signature`: HMAC of the body, when a
///     secret is configured
/// - Body: JSON webhook payload, or a form whose `payload` field holds it
///
/// # Response
///
/// - 200 OK: Every matching handler has run (some may have failed; failures
///   are logged, not reported to GitHub)
/// - 400 Bad Request: Missing header or invalid JSON
/// - 401 Unauthorized: Missing or invalid signature
/// - 415 Unsupported Media Type: Body is neither JSON nor a form
///
/// # Example
///
/// ```ignore
/// POST / HTTP/1.1
/// X-GitHub-Event: issues
/// X-GitHub-Delivery: 72d3162e-cc78-11e3-81ab-4c9367dc0958
/// X-Hub-Signature-256: sha256=...
/// Content-Type: application/json
///
/// {"action": "opened", "issue": {...}, "repository": {...}}
///
/// HTTP/1.1 200 OK
/// ```
pub async fn webhook_handler<A>(
    State(app_state): State<AppState<A>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError>
where
    A: GitHubApi + Clone + 'static,
{
    let event = match Event::from_http(&headers, &body, app_state.webhook_secret()) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Rejected webhook delivery");
            return Err(e.into());
        }
    };

    debug!(
        delivery_id = %event.delivery_id(),
        event_type = %event.event_type(),
        action = event.action().unwrap_or("-"),
        "Received webhook"
    );

    let api = app_state.api().clone();
    let report = app_state.router().dispatch(&event, &api).await;

    if report.is_success() {
        info!(
            delivery_id = %event.delivery_id(),
            handlers = report.invoked,
            "Webhook handled"
        );
    } else {
        warn!(
            delivery_id = %event.delivery_id(),
            handlers = report.invoked,
            failed = report.failures.len(),
            "Webhook handled with failures"
        );
    }

    Ok((StatusCode::OK, "OK"))
}
