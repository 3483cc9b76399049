//! Bluesky XRPC session client
//!
//! Speaks the two calls the bridge needs: `com.atproto.server.createSession`
//! to obtain a bearer token and repo DID, and `com.atproto.repo.createRecord`
//! to publish a post. Authentication happens lazily, exactly once per client
//! instance; the session is never refreshed, so a token that expires mid-life
//! surfaces as a posting failure.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::DEFAULT_API_BASE;
use crate::error::{PlatformError, Result};
use crate::platform::Publisher;

/// Record collection and `$type` for feed posts
const POST_COLLECTION: &str = "app.bsky.feed.post";

/// Fallback when an error response carries no `message` field
const UNKNOWN_ERROR: &str = "Unknown error";

/// A session obtained from `createSession`
#[derive(Debug, Clone)]
pub struct Session {
    /// Bearer token for subsequent calls
    pub access_jwt: String,
    /// Repository identifier of the authenticated account
    pub did: String,
}

/// Explicit session lifecycle: a client starts unauthenticated and
/// transitions at most once.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated(Session),
}

pub struct BskyClient {
    client: Client,
    api_base: String,
    identifier: String,
    app_password: SecretString,
    session: SessionState,
}

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct CreateSessionResponse {
    #[serde(rename = "accessJwt")]
    access_jwt: String,
    did: String,
}

#[derive(Serialize)]
struct CreateRecordRequest<'a> {
    collection: &'a str,
    repo: &'a str,
    record: PostRecord<'a>,
}

#[derive(Serialize)]
struct PostRecord<'a> {
    text: &'a str,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(rename = "$type")]
    type_tag: &'a str,
}

impl BskyClient {
    /// Create a client against the public Bluesky PDS.
    pub fn new(identifier: String, app_password: SecretString) -> Self {
        Self::with_api_base(identifier, app_password, DEFAULT_API_BASE.to_string())
    }

    /// Create a client against a specific XRPC base URL (self-hosted PDS,
    /// mock server in tests).
    pub fn with_api_base(
        identifier: String,
        app_password: SecretString,
        api_base: String,
    ) -> Self {
        // The builder only fails if the TLS backend cannot load; fall back
        // to the default client rather than panic in a constructor
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_base,
            identifier,
            app_password,
            session: SessionState::Unauthenticated,
        }
    }

    /// Current session state
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Authenticate against `createSession` and transition to
    /// `Authenticated`.
    ///
    /// # Errors
    ///
    /// `PlatformError::Authentication` carrying the upstream `message` field
    /// (or "Unknown error") on a non-200 response, or the transport error on
    /// network failure.
    pub async fn authenticate(&mut self) -> Result<Session> {
        debug!(identifier = %self.identifier, "Creating Bluesky session");

        let url = format!("{}/com.atproto.server.createSession", self.api_base);
        let response = self
            .client
            .post(&url)
            .json(&CreateSessionRequest {
                identifier: &self.identifier,
                password: self.app_password.expose_secret(),
            })
            .send()
            .await
            .map_err(|e| PlatformError::Authentication(e.to_string()))?;

        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);

        if status.as_u16() != 200 {
            return Err(PlatformError::Authentication(upstream_message(&body)).into());
        }

        let parsed: CreateSessionResponse = serde_json::from_value(body)
            .map_err(|e| PlatformError::Authentication(e.to_string()))?;

        let session = Session {
            access_jwt: parsed.access_jwt,
            did: parsed.did,
        };
        self.session = SessionState::Authenticated(session.clone());
        debug!(did = %session.did, "Bluesky session created");

        Ok(session)
    }

    /// Create a feed post, authenticating first if no session exists yet.
    ///
    /// Exactly one `createRecord` round trip per call, plus the one-time
    /// implicit `createSession`. The decoded response body is returned
    /// unchanged; its shape is not validated.
    ///
    /// # Errors
    ///
    /// `PlatformError::Authentication` if the lazy authentication fails,
    /// `PlatformError::Posting` if record creation is rejected or the
    /// request cannot be sent.
    pub async fn create_post(&mut self, text: &str) -> Result<serde_json::Value> {
        let session = match &self.session {
            SessionState::Authenticated(session) => session.clone(),
            SessionState::Unauthenticated => self.authenticate().await?,
        };

        debug!(chars = text.chars().count(), "Posting to Bluesky");

        let url = format!("{}/com.atproto.repo.createRecord", self.api_base);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", session.access_jwt))
            .json(&CreateRecordRequest {
                collection: POST_COLLECTION,
                repo: &session.did,
                record: PostRecord {
                    text,
                    created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                    type_tag: POST_COLLECTION,
                },
            })
            .send()
            .await
            .map_err(|e| PlatformError::Posting(e.to_string()))?;

        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);

        if status.as_u16() != 200 {
            return Err(PlatformError::Posting(upstream_message(&body)).into());
        }

        debug!("Posted to Bluesky");
        Ok(body)
    }
}

/// Pull the upstream `message` field out of an error body.
fn upstream_message(body: &serde_json::Value) -> String {
    body.get("message")
        .and_then(|m| m.as_str())
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}

#[async_trait]
impl Publisher for BskyClient {
    async fn publish(&mut self, text: &str) -> Result<serde_json::Value> {
        self.create_post(text).await
    }

    fn name(&self) -> &str {
        "bluesky"
    }
}
