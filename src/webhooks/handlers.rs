//! The bot's reply handlers.
//!
//! Each handler reads what it needs from the event payload and replies
//! through the [`GitHubApi`] it is given. URLs come from the payload itself,
//! so the handlers work against any repository the webhook is installed on.
//!
//! # Event Types
//!
//! | Event | Action | Handler |
//! |-------|--------|---------|
//! | `issues` | `opened` | [`greet_new_issue`] - thank the reporter |
//! | `pull_request` | `opened` | [`label_new_pull_request`] - add the review label |
//! | `pull_request` | `closed` | [`thank_merged_pull_request`] - thank the author, if merged |
//! | `issue_comment` | `created` | [`react_to_thanks`] - heart a thank-you comment |

mod issue_comment;
mod issues;
mod pull_request;

use serde::Serialize;
use serde_json::Value;

use crate::github::GitHubApi;

use super::router::EventRouter;

pub use issue_comment::react_to_thanks;
pub use issues::{greet_new_issue, greeting};
pub use pull_request::{REVIEW_LABEL, label_new_pull_request, thank_merged_pull_request};

/// Body of a "create an issue comment" request.
#[derive(Debug, Serialize)]
struct CommentRequest<'a> {
    body: &'a str,
}

/// Returns true if a payload `user` object describes a bot account.
///
/// The bot must not answer itself (or other bots) in a loop.
fn is_bot(user: &Value) -> bool {
    let is_bot_type = user.get("type").and_then(Value::as_str) == Some("Bot");
    let is_bot_login = user
        .get("login")
        .and_then(Value::as_str)
        .is_some_and(|login| login.ends_with("[bot]"));
    is_bot_type || is_bot_login
}

/// Registers every reply handler on `router`.
pub fn register_handlers<A>(router: &mut EventRouter<A>)
where
    A: GitHubApi + 'static,
{
    router
        .register("issues", Some("opened"), |event, gh| {
            Box::pin(greet_new_issue(event, gh))
        })
        .register("pull_request", Some("opened"), |event, gh| {
            Box::pin(label_new_pull_request(event, gh))
        })
        .register("pull_request", Some("closed"), |event, gh| {
            Box::pin(thank_merged_pull_request(event, gh))
        })
        .register("issue_comment", Some("created"), |event, gh| {
            Box::pin(react_to_thanks(event, gh))
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{DELIVERY_ID, RecordingClient};
    use crate::webhooks::Event;
    use serde_json::json;

    #[test]
    fn bot_detection() {
        assert!(is_bot(&json!({ "login": "ci", "type": "Bot" })));
        assert!(is_bot(&json!({ "login": "dependabot[bot]", "type": "User" })));
        assert!(!is_bot(&json!({ "login": "alice", "type": "User" })));
        assert!(!is_bot(&json!({})));
    }

    #[test]
    fn registers_one_handler_per_reply() {
        let mut router = EventRouter::<RecordingClient>::new();
        register_handlers(&mut router);
        assert_eq!(router.len(), 4);

        let closed = Event::new(
            "pull_request",
            json!({ "action": "closed" }),
            DELIVERY_ID,
        )
        .unwrap();
        assert_eq!(router.matching_handlers(&closed), vec!["pull_request:closed#2"]);

        let edited = Event::new("issues", json!({ "action": "edited" }), DELIVERY_ID).unwrap();
        assert!(router.matching_handlers(&edited).is_empty());
    }

    #[tokio::test]
    async fn opened_issue_is_greeted_through_router() {
        let mut router = EventRouter::<RecordingClient>::new();
        register_handlers(&mut router);
        let gh = RecordingClient::new();

        let event = Event::new(
            "issues",
            json!({
                "action": "opened",
                "issue": {
                    "comments_url": "https://api.example/comments/1",
                    "user": { "login": "alice", "type": "User" }
                }
            }),
            DELIVERY_ID,
        )
        .unwrap();

        let report = router.dispatch(&event, &gh).await;

        assert!(report.is_success());
        assert_eq!(report.invoked, 1);
        let calls = gh.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "https://api.example/comments/1");
    }
}
