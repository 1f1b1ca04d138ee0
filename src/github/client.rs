//! Octocrab-backed implementation of [`GitHubApi`].
//!
//! `OctocrabClient` wraps an `Octocrab` instance authenticated with the bot's
//! bearer token. Cloning is cheap (the connection pool is shared), so the
//! listener hands each delivery its own clone.
//!
//! Octocrab sets the `Accept` header per instance. A call with an `Accept`
//! override goes through a second instance built on first use and kept for
//! the life of the client.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use http::header::ACCEPT;
use octocrab::Octocrab;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::api::GitHubApi;
use super::error::GitHubApiError;

/// Settings needed to (re)build an authenticated octocrab instance.
#[derive(Clone, Default)]
pub struct ClientSettings {
    /// OAuth / personal access token sent as a bearer token.
    ///
    /// `None` makes unauthenticated calls, which GitHub heavily rate limits.
    pub token: Option<String>,

    /// API base URI, for GitHub Enterprise. `None` uses api.github.com.
    pub base_uri: Option<String>,
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("base_uri", &self.base_uri)
            .finish()
    }
}

/// A GitHub API client for webhook reply handlers.
#[derive(Clone)]
pub struct OctocrabClient {
    /// The underlying octocrab client.
    client: Octocrab,

    /// Kept so a client with a different `Accept` header can be built.
    settings: ClientSettings,

    /// Clients for `Accept` overrides, keyed by media type. Shared by clones.
    accept_clients: Arc<Mutex<HashMap<String, Octocrab>>>,
}

impl OctocrabClient {
    /// Creates a client from the given settings.
    pub fn from_settings(settings: ClientSettings) -> Result<Self, octocrab::Error> {
        let client = build_octocrab(&settings, None)?;
        Ok(Self {
            client,
            settings,
            accept_clients: Arc::default(),
        })
    }

    /// Returns true if calls carry a bearer token.
    pub fn is_authenticated(&self) -> bool {
        self.settings.token.is_some()
    }

    /// Returns the client sending `accept` as its `Accept` header, building
    /// it on first use.
    fn with_accept(&self, accept: &str) -> Result<Octocrab, GitHubApiError> {
        let mut clients = self
            .accept_clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = clients.get(accept) {
            return Ok(client.clone());
        }

        debug!(accept, "Building client for Accept override");
        let client = build_octocrab(&self.settings, Some(accept))
            .map_err(GitHubApiError::from_octocrab)?;
        clients.insert(accept.to_string(), client.clone());
        Ok(client)
    }
}

fn build_octocrab(
    settings: &ClientSettings,
    accept: Option<&str>,
) -> Result<Octocrab, octocrab::Error> {
    let mut builder = Octocrab::builder();
    if let Some(token) = &settings.token {
        builder = builder.personal_token(token.clone());
    }
    if let Some(base_uri) = &settings.base_uri {
        builder = builder.base_uri(base_uri.as_str())?;
    }
    if let Some(accept) = accept {
        builder = builder.add_header(ACCEPT, accept.to_string());
    }
    builder.build()
}

impl GitHubApi for OctocrabClient {
    async fn get(&self, url: &str) -> Result<Value, GitHubApiError> {
        debug!(url, "GET");
        self.client
            .get(url, None::<&()>)
            .await
            .map_err(GitHubApiError::from_octocrab)
    }

    async fn post<B>(&self, url: &str, body: &B, accept: Option<&str>) -> Result<Value, GitHubApiError>
    where
        B: Serialize + Sync + ?Sized,
    {
        debug!(url, accept, "POST");
        let client = match accept {
            Some(accept) => self.with_accept(accept)?,
            None => self.client.clone(),
        };
        client
            .post(url, Some(body))
            .await
            .map_err(GitHubApiError::from_octocrab)
    }

    async fn patch<B>(&self, url: &str, body: &B) -> Result<Value, GitHubApiError>
    where
        B: Serialize + Sync + ?Sized,
    {
        debug!(url, "PATCH");
        self.client
            .patch(url, Some(body))
            .await
            .map_err(GitHubApiError::from_octocrab)
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_debug_redacts_token() {
        let settings = ClientSettings {
            token: Some("ghp_supersecret".to_string()),
            base_uri: None,
        };
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("ghp_supersecret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn builds_with_token_and_base_uri() {
        let client = OctocrabClient::from_settings(ClientSettings {
            token: Some("token".to_string()),
            base_uri: Some("https://github.example.com/api/v3/".to_string()),
        })
        .unwrap();
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn accept_override_client_is_built_once() {
        let client = OctocrabClient::from_settings(ClientSettings::default()).unwrap();
        let reactions = "application/vnd.github.squirrel-girl-preview+json";

        client.with_accept(reactions).unwrap();
        client.clone().with_accept(reactions).unwrap();
        assert_eq!(client.accept_clients.lock().unwrap().len(), 1);

        client.with_accept("application/vnd.github.raw+json").unwrap();
        assert_eq!(client.accept_clients.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn builds_unauthenticated() {
        let client = OctocrabClient::from_settings(ClientSettings::default()).unwrap();
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn rejects_invalid_base_uri() {
        let result = OctocrabClient::from_settings(ClientSettings {
            token: None,
            base_uri: Some("not a uri".to_string()),
        });
        assert!(result.is_err());
    }
}
