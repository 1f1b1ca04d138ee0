//! GitHub API client used by reply handlers.
//!
//! - [`GitHubApi`]: the trait handlers are written against
//! - [`OctocrabClient`]: the production implementation, authenticated with
//!   the bot's bearer token
//! - [`GitHubApiError`]: failures, classified as transient or permanent

mod api;
mod client;
mod error;

pub use api::GitHubApi;
pub use client::{ClientSettings, OctocrabClient};
pub use error::{GitHubApiError, GitHubErrorKind};
