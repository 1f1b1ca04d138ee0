//! ideal-octo-garbanzo - A GitHub bot that answers webhook deliveries.
//!
//! This library provides the webhook receiver: signature verification,
//! event routing to reply handlers, and the GitHub API client those handlers
//! reply through.

pub mod config;
pub mod github;
pub mod server;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub(crate) mod test_utils;
