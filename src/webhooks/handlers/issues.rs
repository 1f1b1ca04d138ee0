//! Handler for `issues` webhook events.

use tracing::{debug, info};

use crate::github::GitHubApi;
use crate::webhooks::Event;
use crate::webhooks::router::HandlerError;

use super::{CommentRequest, is_bot};

/// The comment posted on a newly opened issue.
pub fn greeting(author: &str) -> String {
    format!(
        "Thanks for the report @{author}! :tada: A maintainer will be\n\
         along soon to take a look.\n\
         \n\
         :doughnut: We appreciate your taking the time to file a bug report. :doughnut:\n\
         \n\
         —Sincerely, ideal-:octocat:-garbanzo the Bot"
    )
}

/// Thanks the author of a newly opened issue.
///
/// Posts [`greeting`] to `issue.comments_url`. Issues opened by bots are
/// left alone.
pub async fn greet_new_issue<A: GitHubApi>(event: &Event, gh: &A) -> Result<(), HandlerError> {
    let user = event.get_path(&["issue", "user"])?;
    if is_bot(user) {
        debug!("Issue opened by a bot; not greeting");
        return Ok(());
    }

    let author = event.get_str(&["issue", "user", "login"])?;
    let comments_url = event.get_str(&["issue", "comments_url"])?;
    let body = greeting(author);

    gh.post(comments_url, &CommentRequest { body: &body }, None)
        .await?;

    info!(author, "Greeted new issue");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::GitHubErrorKind;
    use crate::test_utils::{DELIVERY_ID, RecordingClient};
    use crate::webhooks::PayloadError;
    use serde_json::{Value, json};

    fn issue_event(user: Value) -> Event {
        Event::new(
            "issues",
            json!({
                "action": "opened",
                "issue": {
                    "number": 7,
                    "comments_url": "https://api.example/comments/1",
                    "user": user
                }
            }),
            DELIVERY_ID,
        )
        .unwrap()
    }

    #[test]
    fn greeting_mentions_author() {
        let text = greeting("alice");
        assert!(text.starts_with("Thanks for the report @alice! :tada:"));
        assert!(text.ends_with("Sincerely, ideal-:octocat:-garbanzo the Bot"));
        assert_eq!(text.lines().count(), 6);
    }

    #[tokio::test]
    async fn posts_greeting_to_comments_url() {
        let gh = RecordingClient::new();
        let event = issue_event(json!({ "login": "alice", "type": "User" }));

        greet_new_issue(&event, &gh).await.unwrap();

        let calls = gh.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[0].url, "https://api.example/comments/1");
        assert_eq!(calls[0].accept, None);
        let body = calls[0].body.as_ref().unwrap()["body"].as_str().unwrap();
        assert!(body.contains("@alice"));
    }

    #[tokio::test]
    async fn does_not_greet_bots() {
        let gh = RecordingClient::new();
        let event = issue_event(json!({ "login": "renovate[bot]", "type": "Bot" }));

        greet_new_issue(&event, &gh).await.unwrap();

        assert!(gh.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_comments_url_is_a_payload_error() {
        let gh = RecordingClient::new();
        let event = Event::new(
            "issues",
            json!({ "action": "opened", "issue": { "user": { "login": "alice" } } }),
            DELIVERY_ID,
        )
        .unwrap();

        let err = greet_new_issue(&event, &gh).await.unwrap_err();

        assert!(matches!(
            err,
            HandlerError::Payload(PayloadError::Missing { ref path }) if path == "issue.comments_url"
        ));
        assert!(gh.calls().is_empty());
    }

    #[tokio::test]
    async fn api_failure_is_reported() {
        let gh = RecordingClient::failing(403);
        let event = issue_event(json!({ "login": "alice", "type": "User" }));

        let err = greet_new_issue(&event, &gh).await.unwrap_err();

        match err {
            HandlerError::Api(e) => {
                assert_eq!(e.status_code, Some(403));
                assert_eq!(e.kind, GitHubErrorKind::Permanent);
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
