//! Handlers for `pull_request` webhook events.
//!
//! - `opened` - label the PR for review
//! - `closed` (merged) - thank the author
//! - `closed` (not merged) - nothing

use serde::Serialize;
use tracing::{debug, info};

use crate::github::GitHubApi;
use crate::webhooks::Event;
use crate::webhooks::router::HandlerError;

use super::{CommentRequest, is_bot};

/// Label added to every newly opened pull request.
pub const REVIEW_LABEL: &str = "needs review";

#[derive(Debug, Serialize)]
struct LabelsRequest<'a> {
    labels: &'a [&'a str],
}

/// Adds [`REVIEW_LABEL`] to a newly opened pull request.
///
/// Labels live on the PR's issue, so the call goes to
/// `{pull_request.issue_url}/labels`.
pub async fn label_new_pull_request<A: GitHubApi>(
    event: &Event,
    gh: &A,
) -> Result<(), HandlerError> {
    let issue_url = event.get_str(&["pull_request", "issue_url"])?;
    let url = format!("{}/labels", issue_url.trim_end_matches('/'));

    gh.post(
        &url,
        &LabelsRequest {
            labels: &[REVIEW_LABEL],
        },
        None,
    )
    .await?;

    info!(label = REVIEW_LABEL, "Labelled new pull request");
    Ok(())
}

/// Thanks the author of a merged pull request.
///
/// A PR closed without merging produces no API calls.
pub async fn thank_merged_pull_request<A: GitHubApi>(
    event: &Event,
    gh: &A,
) -> Result<(), HandlerError> {
    if !event.get_bool(&["pull_request", "merged"])? {
        debug!("Pull request closed without merging");
        return Ok(());
    }

    let user = event.get_path(&["pull_request", "user"])?;
    if is_bot(user) {
        debug!("Merged pull request is from a bot; not thanking");
        return Ok(());
    }

    let author = event.get_str(&["pull_request", "user", "login"])?;
    let comments_url = event.get_str(&["pull_request", "comments_url"])?;
    let body = format!("Thanks for the contribution @{author}! :sparkles: It's merged.");

    gh.post(comments_url, &CommentRequest { body: &body }, None)
        .await?;

    info!(author, "Thanked author of merged pull request");
    Ok(())
}
