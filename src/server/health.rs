//! Liveness endpoint.

use axum::http::StatusCode;

/// Answers `GET /health` with 200 and the text "OK".
///
/// Does not touch the GitHub API or the handler table, so it stays cheap
/// enough for a load balancer to poll.
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
