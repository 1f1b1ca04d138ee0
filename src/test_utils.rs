//! Shared test utilities: signed request headers and a recording API client.

use std::sync::{Arc, Mutex};

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde_json::Value;

use crate::github::{GitHubApi, GitHubApiError};
use crate::webhooks::{
    HEADER_DELIVERY, HEADER_EVENT, SignatureAlgorithm, compute_signature, format_signature_header,
};

pub const DELIVERY_ID: &str = "72d3162e-cc78-11e3-81ab-4c9367dc0958";

/// Headers for a JSON delivery of `event_type`, signed with `X-Hub-Signature`.
pub fn signed_headers(event_type: &str, body: &[u8], secret: &[u8]) -> HeaderMap {
    let signature = compute_signature(body, secret, SignatureAlgorithm::Sha1);

    let mut headers = HeaderMap::new();
    headers.insert(HEADER_EVENT, HeaderValue::from_str(event_type).unwrap());
    headers.insert(HEADER_DELIVERY, HeaderValue::from_static(DELIVERY_ID));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        SignatureAlgorithm::Sha1.header_name(),
        HeaderValue::from_str(&format_signature_header(
            &signature,
            SignatureAlgorithm::Sha1,
        ))
        .unwrap(),
    );
    headers
}

/// One call made against a [`RecordingClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    pub method: &'static str,
    pub url: String,
    pub body: Option<Value>,
    pub accept: Option<String>,
}

/// A [`GitHubApi`] that records calls instead of making them.
///
/// Clones share the same call log.
#[derive(Debug, Clone, Default)]
pub struct RecordingClient {
    calls: Arc<Mutex<Vec<ApiCall>>>,
    /// When set, every call is recorded and then fails with this status.
    fail_with: Option<u16>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose calls all fail with `status`.
    pub fn failing(status: u16) -> Self {
        Self {
            calls: Arc::default(),
            fail_with: Some(status),
        }
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ApiCall) -> Result<Value, GitHubApiError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_with {
            Some(status) => Err(GitHubApiError::from_status(status, "recorded failure")),
            None => Ok(Value::Object(Default::default())),
        }
    }
}

impl GitHubApi for RecordingClient {
    async fn get(&self, url: &str) -> Result<Value, GitHubApiError> {
        self.record(ApiCall {
            method: "GET",
            url: url.to_string(),
            body: None,
            accept: None,
        })
    }

    async fn post<B>(&self, url: &str, body: &B, accept: Option<&str>) -> Result<Value, GitHubApiError>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.record(ApiCall {
            method: "POST",
            url: url.to_string(),
            body: Some(serde_json::to_value(body).unwrap()),
            accept: accept.map(str::to_string),
        })
    }

    async fn patch<B>(&self, url: &str, body: &B) -> Result<Value, GitHubApiError>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.record(ApiCall {
            method: "PATCH",
            url: url.to_string(),
            body: Some(serde_json::to_value(body).unwrap()),
            accept: None,
        })
    }
}
