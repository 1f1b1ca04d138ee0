//! Inbound webhook events.
//!
//! An [`Event`] is built once per delivery from the raw HTTP headers and body
//! by [`Event::from_http`], which verifies the signature before anything else
//! is looked at.
//!
//! # Headers
//!
//! - `X-GitHub-Event` - event type (e.g. "issues"), required
//! - `X-GitHub-Delivery` - unique delivery ID, required
//! - `X-Hub-Signature-256` / `X-Hub-Signature` - HMAC signature, required
//!   when a secret is configured
//! - `Content-Type` - JSON, or a form with the JSON in its `payload` field

use http::HeaderMap;
use http::header::CONTENT_TYPE;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::form_urlencoded;

use crate::types::DeliveryId;

use super::payload::{self, PayloadError};
use super::signature::{SignatureAlgorithm, verify_signature};

/// Header name for the GitHub event type.
pub const HEADER_EVENT: &str = "x-github-event";
/// Header name for the GitHub delivery ID.
pub const HEADER_DELIVERY: &str = "x-github-delivery";

/// Broad classification of [`EventError`]s, used by the listener to pick a
/// status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventErrorKind {
    /// The delivery could not be proven to come from GitHub.
    Authentication,
    /// The delivery is not a well-formed webhook.
    MalformedPayload,
}

/// Errors that can occur when building an [`Event`] from a delivery.
#[derive(Debug, Error)]
pub enum EventError {
    /// A secret is configured but the delivery carries no signature header.
    #[error("signature header is missing")]
    MissingSignature,

    /// The signature does not match the body.
    #[error("invalid signature")]
    InvalidSignature,

    /// The body is declared as something other than JSON or a form.
    #[error(
        "unsupported content type: {0} (expected application/json or application/x-www-form-urlencoded)"
    )]
    UnsupportedContentType(String),

    /// A form-encoded body has no `payload` field.
    #[error("form body has no payload field")]
    MissingFormPayload,

    /// The body is not valid JSON.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A required header is missing or empty.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),
}

impl EventError {
    pub fn kind(&self) -> EventErrorKind {
        match self {
            EventError::MissingSignature | EventError::InvalidSignature => {
                EventErrorKind::Authentication
            }
            EventError::UnsupportedContentType(_)
            | EventError::MissingFormPayload
            | EventError::InvalidJson(_)
            | EventError::MissingHeader(_) => EventErrorKind::MalformedPayload,
        }
    }
}

/// A verified, parsed webhook delivery.
///
/// Immutable once constructed. Handlers read payload fields through the
/// failable accessors ([`Event::get_path`] and friends).
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    event_type: String,
    action: Option<String>,
    payload: Value,
    delivery_id: DeliveryId,
}

impl Event {
    /// Creates an event from already-trusted parts.
    ///
    /// The action is taken from `payload["action"]`, as in
    /// [`Event::from_http`]. Returns `None` if `event_type` is empty.
    pub fn new(
        event_type: impl Into<String>,
        payload: Value,
        delivery_id: impl Into<DeliveryId>,
    ) -> Option<Self> {
        let event_type = event_type.into();
        if event_type.is_empty() {
            return None;
        }
        let action = payload
            .get("action")
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(Event {
            event_type,
            action,
            payload,
            delivery_id: delivery_id.into(),
        })
    }

    /// Builds an event from an inbound delivery.
    ///
    /// Validation order:
    ///
    /// 1. With a secret configured, the signature is checked against the raw
    ///    body. `X-Hub-Signature-256` is preferred over `X-Hub-Signature`.
    ///    Without a secret, verification is skipped.
    /// 2. The content type, when given, must be JSON.
    /// 3. The body is parsed as JSON.
    /// 4. The event type and delivery ID headers are read.
    ///
    /// # Errors
    ///
    /// [`EventErrorKind::Authentication`] errors for a missing or mismatched
    /// signature, [`EventErrorKind::MalformedPayload`] errors otherwise.
    pub fn from_http(
        headers: &HeaderMap,
        body: &[u8],
        secret: Option<&[u8]>,
    ) -> Result<Event, EventError> {
        match secret {
            Some(secret) => check_signature(headers, body, secret)?,
            None => {
                if signature_header(headers).is_some() {
                    debug!("No webhook secret configured; signature header not checked");
                }
            }
        }

        let payload: Value = match body_encoding(headers)? {
            BodyEncoding::Json => serde_json::from_slice(body)?,
            BodyEncoding::Form => serde_json::from_str(&form_payload(body)?)?,
        };

        let event_type = required_header(headers, HEADER_EVENT)?;
        let delivery_id = required_header(headers, HEADER_DELIVERY)?;

        Event::new(event_type, payload, delivery_id).ok_or(EventError::MissingHeader(HEADER_EVENT))
    }

    /// The `X-GitHub-Event` header value.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The payload's `action` field, if it has one.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// The full delivery body.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn delivery_id(&self) -> &DeliveryId {
        &self.delivery_id
    }

    /// Looks up a payload field by path, e.g. `["issue", "user", "login"]`.
    pub fn get_path(&self, path: &[&str]) -> Result<&Value, PayloadError> {
        payload::lookup(&self.payload, path)
    }

    pub fn get_str(&self, path: &[&str]) -> Result<&str, PayloadError> {
        payload::lookup_str(&self.payload, path)
    }

    pub fn get_bool(&self, path: &[&str]) -> Result<bool, PayloadError> {
        payload::lookup_bool(&self.payload, path)
    }

    pub fn get_u64(&self, path: &[&str]) -> Result<u64, PayloadError> {
        payload::lookup_u64(&self.payload, path)
    }
}

/// Returns the signature header to check and its algorithm, preferring SHA-256.
fn signature_header(headers: &HeaderMap) -> Option<(SignatureAlgorithm, &str)> {
    [SignatureAlgorithm::Sha256, SignatureAlgorithm::Sha1]
        .into_iter()
        .find_map(|alg| {
            headers
                .get(alg.header_name())
                .map(|v| (alg, v.to_str().unwrap_or("")))
        })
}

fn check_signature(headers: &HeaderMap, body: &[u8], secret: &[u8]) -> Result<(), EventError> {
    let (algorithm, header) = signature_header(headers).ok_or(EventError::MissingSignature)?;
    if verify_signature(body, header, secret, algorithm) {
        Ok(())
    } else {
        Err(EventError::InvalidSignature)
    }
}

/// How the delivery body carries its JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyEncoding {
    /// The body is the JSON document.
    Json,
    /// The body is a form whose `payload` field is the JSON document.
    Form,
}

/// Reads the body encoding from `Content-Type`; a missing header means JSON.
fn body_encoding(headers: &HeaderMap) -> Result<BodyEncoding, EventError> {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return Ok(BodyEncoding::Json);
    };
    let content_type = value.to_str().unwrap_or("");
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "application/json" => Ok(BodyEncoding::Json),
        "application/x-www-form-urlencoded" => Ok(BodyEncoding::Form),
        _ => Err(EventError::UnsupportedContentType(content_type.to_string())),
    }
}

/// Extracts the `payload` field of a form-encoded body.
fn form_payload(body: &[u8]) -> Result<String, EventError> {
    form_urlencoded::parse(body)
        .find(|(key, _)| key == "payload")
        .map(|(_, value)| value.into_owned())
        .ok_or(EventError::MissingFormPayload)
}

/// Extracts a required header value, as sent. Blank values count as missing.
fn required_header(headers: &HeaderMap, name: &'static str) -> Result<String, EventError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .ok_or(EventError::MissingHeader(name))
}
