//! The outbound API surface handlers are given.
//!
//! Handlers only need three verbs against the REST API. URLs are usually
//! taken straight from webhook payloads (`issue.comments_url` and the like),
//! so they may be absolute; API-relative paths such as
//! `/repos/{owner}/{repo}/issues/1/comments` also work.
//!
//! The trait-based design lets the listener run against a recording fake in
//! tests and against [`OctocrabClient`](super::OctocrabClient) in production.

use std::future::Future;

use serde::Serialize;
use serde_json::Value;

use super::error::GitHubApiError;

/// Authenticated calls against the GitHub REST API.
///
/// Every method resolves to the decoded JSON response, or to a
/// [`GitHubApiError`] for transport failures and non-2xx responses.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct NullApi;
///
/// impl GitHubApi for NullApi {
///     async fn get(&self, _url: &str) -> Result<Value, GitHubApiError> {
///         Ok(Value::Null)
///     }
///     // ...
/// }
/// ```
pub trait GitHubApi: Send + Sync {
    /// `GET url`.
    fn get(&self, url: &str) -> impl Future<Output = Result<Value, GitHubApiError>> + Send;

    /// `POST url` with a JSON body.
    ///
    /// `accept` overrides the `Accept` header, for endpoints behind a custom
    /// media type.
    fn post<B>(
        &self,
        url: &str,
        body: &B,
        accept: Option<&str>,
    ) -> impl Future<Output = Result<Value, GitHubApiError>> + Send
    where
        B: Serialize + Sync + ?Sized;

    /// `PATCH url` with a JSON body.
    fn patch<B>(
        &self,
        url: &str,
        body: &B,
    ) -> impl Future<Output = Result<Value, GitHubApiError>> + Send
    where
        B: Serialize + Sync + ?Sized;
}
