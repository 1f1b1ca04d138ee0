//! Webhook handling for GitHub events.
//!
//! This module provides:
//! - Signature verification for webhook payloads (HMAC-SHA1 and HMAC-SHA256)
//! - [`Event`]: a validated delivery with failable payload accessors
//! - [`EventRouter`]: dispatch of events to handlers by `(event_type, action)`
//! - The bot's reply handlers, installed by [`register_handlers`]

pub mod event;
pub mod handlers;
pub mod payload;
pub mod router;
pub mod signature;

pub use event::{Event, EventError, EventErrorKind, HEADER_DELIVERY, HEADER_EVENT};
pub use handlers::register_handlers;
pub use payload::{PayloadError, lookup, lookup_bool, lookup_str, lookup_u64};
pub use router::{DispatchReport, EventRouter, HandlerError, HandlerFailure, HandlerFuture};
pub use signature::{
    SignatureAlgorithm, compute_signature, format_signature_header, parse_signature_header,
    verify_signature,
};
