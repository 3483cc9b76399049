//! Publish trigger
//!
//! Reacts to the host's "content published" event: evaluates the category
//! and configuration gates, derives the post text, and sends it through a
//! freshly built publisher. Syndication is a best-effort side channel; a
//! failed post is recorded for the operator but never propagated, so the
//! host's own publish action cannot be blocked from here.

use secrecy::SecretString;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::client::BskyClient;
use crate::config::BridgeConfig;
use crate::crypto::CredentialStore;
use crate::error::BridgeError;
use crate::formatter::format_post;
use crate::notice::NoticeSink;
use crate::platform::Publisher;

/// Lifecycle status of a content record on the host platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentStatus {
    Draft,
    Pending,
    Future,
    Private,
    Publish,
    Trash,
    Other(String),
}

impl From<&str> for ContentStatus {
    fn from(s: &str) -> Self {
        match s {
            "draft" => ContentStatus::Draft,
            "pending" => ContentStatus::Pending,
            "future" => ContentStatus::Future,
            "private" => ContentStatus::Private,
            "publish" => ContentStatus::Publish,
            "trash" => ContentStatus::Trash,
            other => ContentStatus::Other(other.to_string()),
        }
    }
}

/// One status-transition event, supplied per trigger invocation
#[derive(Debug, Clone)]
pub struct PublishEvent {
    pub content_id: u64,
    pub title: String,
    pub body_html: String,
    pub excerpt_html: String,
    pub permalink: String,
    pub category_ids: HashSet<u64>,
    pub old_status: ContentStatus,
    pub new_status: ContentStatus,
}

/// Why a qualifying check declined to post. All skips are silent no-ops
/// apart from a log line; none of them are operator-visible failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The event did not land on the publish status
    StatusNotPublish,
    /// The stored secret exists but could not be decrypted (wrong salt,
    /// corrupted blob); distinct from "not configured"
    DecryptionFailed,
    /// Identifier, secret, or category allow-list missing
    ConfigurationIncomplete,
    /// No overlap between the content's categories and the allow-list
    NotInAllowedCategory,
}

/// Result of one trigger invocation. `Failed` means the post was attempted
/// and rejected; the message has already been recorded for the operator.
#[derive(Debug)]
pub enum TriggerOutcome {
    Posted(serde_json::Value),
    Skipped(SkipReason),
    Failed(String),
}

/// Builds a fresh publisher per qualifying event from the configured
/// identifier and the decrypted app password.
pub type PublisherFactory =
    Box<dyn Fn(&str, SecretString) -> Box<dyn Publisher> + Send + Sync>;

pub struct PublishTrigger {
    config: BridgeConfig,
    store: CredentialStore,
    notices: Arc<dyn NoticeSink>,
    factory: PublisherFactory,
}

impl PublishTrigger {
    /// Create a trigger that posts through [`BskyClient`] against the
    /// configured API base.
    pub fn new(config: BridgeConfig, store: CredentialStore, notices: Arc<dyn NoticeSink>) -> Self {
        let api_base = config.api_base.clone();
        let factory: PublisherFactory = Box::new(move |identifier, secret| {
            Box::new(BskyClient::with_api_base(
                identifier.to_string(),
                secret,
                api_base.clone(),
            ))
        });
        Self::with_factory(config, store, notices, factory)
    }

    /// Create a trigger with a custom publisher factory (tests, other
    /// backends).
    pub fn with_factory(
        config: BridgeConfig,
        store: CredentialStore,
        notices: Arc<dyn NoticeSink>,
        factory: PublisherFactory,
    ) -> Self {
        Self {
            config,
            store,
            notices,
            factory,
        }
    }

    /// Evaluate one publish event.
    ///
    /// Gate order: publish status, complete configuration, category overlap.
    /// Each gate short-circuits with no side effects. On pass, exactly one
    /// post attempt is made; its failure is recorded in the notice sink and
    /// reported as [`TriggerOutcome::Failed`] rather than an error, so the
    /// caller's publish pipeline is never interrupted.
    pub async fn fire(&self, event: &PublishEvent) -> TriggerOutcome {
        if event.new_status != ContentStatus::Publish {
            return TriggerOutcome::Skipped(SkipReason::StatusNotPublish);
        }

        let secret = match self.store.decrypt(&self.config.encrypted_app_password) {
            Ok(secret) => secret,
            Err(e) => {
                warn!(content_id = event.content_id, error = %e,
                    "Stored app password could not be decrypted; skipping syndication");
                return TriggerOutcome::Skipped(SkipReason::DecryptionFailed);
            }
        };

        if !self.config.is_complete(&secret) {
            return TriggerOutcome::Skipped(SkipReason::ConfigurationIncomplete);
        }

        if event
            .category_ids
            .is_disjoint(&self.config.allowed_category_ids)
        {
            return TriggerOutcome::Skipped(SkipReason::NotInAllowedCategory);
        }

        let text = format_post(&event.body_html, &event.excerpt_html, &event.permalink);

        let mut publisher =
            (self.factory)(&self.config.identifier, SecretString::new(secret.into()));

        match publisher.publish(&text).await {
            Ok(body) => {
                info!(content_id = event.content_id, title = %event.title,
                    platform = publisher.name(), "Syndicated post");
                TriggerOutcome::Posted(body)
            }
            Err(e) => {
                let message = match &e {
                    BridgeError::Platform(platform_error) => {
                        platform_error.upstream_message().to_string()
                    }
                    other => other.to_string(),
                };
                warn!(content_id = event.content_id, platform = publisher.name(),
                    error = %e, "Syndication failed");
                self.notices.record(&message);
                TriggerOutcome::Failed(message)
            }
        }
    }
}
