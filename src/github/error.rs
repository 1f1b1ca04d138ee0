//! GitHub API error types.
//!
//! The client never retries on its own. Each error is classified, and the
//! kind is part of its message and of the dispatch failure log, so an
//! operator can tell whether redelivering the webhook could help:
//!
//! - **Transient** errors would likely succeed later (5xx, rate limits,
//!   network failures)
//! - **Permanent** errors will not (most 4xx: bad URL, missing permission,
//!   locked issue)

use std::fmt;
use thiserror::Error;

/// The kind of GitHub API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// Likely to succeed if the same call is made later.
    ///
    /// Examples:
    /// - HTTP 5xx (server errors)
    /// - HTTP 429 (rate limited)
    /// - HTTP 403 with a rate limit message
    /// - Network timeouts
    Transient,

    /// Requires a change on our side or in the repository's settings.
    ///
    /// Examples:
    /// - HTTP 404 (URL from the payload no longer exists)
    /// - HTTP 401/403 (token lacks permission)
    /// - HTTP 422 (validation failed, e.g. unknown reaction content)
    Permanent,
}

impl fmt::Display for GitHubErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitHubErrorKind::Transient => write!(f, "transient"),
            GitHubErrorKind::Permanent => write!(f, "permanent"),
        }
    }
}

/// A failed call against the GitHub API.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// Transient or permanent.
    pub kind: GitHubErrorKind,

    /// The HTTP status code, if a response was received.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(
                f,
                "GitHub API error (HTTP {}, {}): {}",
                code, self.kind, self.message
            ),
            None => write!(f, "GitHub API error ({}): {}", self.kind, self.message),
        }
    }
}

impl GitHubApiError {
    /// Creates an error for a non-2xx response without an octocrab source.
    ///
    /// The kind is derived from the status code.
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: classify(Some(status_code), &message),
            status_code: Some(status_code),
            message,
            source: None,
        }
    }

    /// Categorizes an octocrab error.
    ///
    /// Uses the response status when GitHub answered, and falls back to the
    /// error message for transport-level failures.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = match &err {
            octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
            _ => None,
        };
        let message = match &err {
            octocrab::Error::GitHub { source, .. } => source.message.clone(),
            other => other.to_string(),
        };

        Self {
            kind: classify(status_code, &message),
            status_code,
            message,
            source: Some(err),
        }
    }

    /// Returns true if the same call could succeed later.
    pub fn is_transient(&self) -> bool {
        self.kind == GitHubErrorKind::Transient
    }
}

fn classify(status_code: Option<u16>, message: &str) -> GitHubErrorKind {
    match status_code {
        Some(429) => GitHubErrorKind::Transient,
        Some(403) if is_rate_limit_error(message) => GitHubErrorKind::Transient,
        Some(code) if (500..600).contains(&code) => GitHubErrorKind::Transient,
        Some(_) => GitHubErrorKind::Permanent,
        None if is_network_error(message) => GitHubErrorKind::Transient,
        None => GitHubErrorKind::Permanent,
    }
}

/// Checks if an error message indicates a rate limit.
fn is_rate_limit_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("rate limit")
        || message_lower.contains("api rate")
        || message_lower.contains("secondary rate")
        || message_lower.contains("abuse detection")
}

/// Checks if an error message indicates a network-level error.
fn is_network_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("timeout")
        || message_lower.contains("connection")
        || message_lower.contains("network")
        || message_lower.contains("dns")
        || message_lower.contains("timed out")
}
