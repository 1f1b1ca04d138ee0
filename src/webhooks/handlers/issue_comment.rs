//! Handler for `issue_comment` webhook events.

use serde::Serialize;
use tracing::{debug, info};

use crate::github::GitHubApi;
use crate::webhooks::Event;
use crate::webhooks::router::HandlerError;

use super::is_bot;

/// Media type of the reactions API.
const REACTIONS_ACCEPT: &str = "application/vnd.github.squirrel-girl-preview+json";

#[derive(Debug, Serialize)]
struct ReactionRequest<'a> {
    content: &'a str,
}

/// Returns true if a comment body thanks someone.
fn is_thanks(body: &str) -> bool {
    body.to_lowercase().contains("thank")
}

/// Reacts with a heart to new comments that say thanks.
pub async fn react_to_thanks<A: GitHubApi>(event: &Event, gh: &A) -> Result<(), HandlerError> {
    let user = event.get_path(&["comment", "user"])?;
    if is_bot(user) {
        return Ok(());
    }

    let body = event.get_str(&["comment", "body"])?;
    if !is_thanks(body) {
        debug!("Comment is not a thank-you");
        return Ok(());
    }

    let comment_url = event.get_str(&["comment", "url"])?;
    let url = format!("{}/reactions", comment_url.trim_end_matches('/'));

    gh.post(
        &url,
        &ReactionRequest { content: "heart" },
        Some(REACTIONS_ACCEPT),
    )
    .await?;

    info!(url = %url, "Reacted to thank-you comment");
    Ok(())
}
