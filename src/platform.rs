//! Publisher abstraction
//!
//! Seam between the publish trigger and the network client. The trigger only
//! needs "send this text somewhere"; [`BskyClient`](crate::client::BskyClient)
//! is the real implementation and [`MockPublisher`] stands in for tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{PlatformError, Result};

/// A destination that accepts one-shot text posts.
///
/// `publish` takes `&mut self` because implementations may lazily establish
/// a session on first use and hold it for their lifetime.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Send a post, returning the platform's response body.
    ///
    /// # Errors
    ///
    /// `PlatformError::Authentication` if the session cannot be established,
    /// `PlatformError::Posting` if record creation is rejected or unreachable.
    async fn publish(&mut self, text: &str) -> Result<serde_json::Value>;

    /// Lowercase platform identifier (e.g., "bluesky")
    fn name(&self) -> &str;
}

/// Configurable mock publisher for trigger tests
#[derive(Clone)]
pub struct MockPublisher {
    fail_with: Option<PlatformError>,
    pub publish_call_count: Arc<Mutex<usize>>,
    pub published_texts: Arc<Mutex<Vec<String>>>,
}

impl MockPublisher {
    pub fn succeeding() -> Self {
        Self {
            fail_with: None,
            publish_call_count: Arc::new(Mutex::new(0)),
            published_texts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(error: PlatformError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::succeeding()
        }
    }

    pub fn call_count(&self) -> usize {
        *self.publish_call_count.lock().unwrap()
    }

    pub fn texts(&self) -> Vec<String> {
        self.published_texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&mut self, text: &str) -> Result<serde_json::Value> {
        *self.publish_call_count.lock().unwrap() += 1;
        if let Some(error) = &self.fail_with {
            return Err(error.clone().into());
        }
        self.published_texts.lock().unwrap().push(text.to_string());
        Ok(serde_json::json!({ "uri": "at://did:mock/app.bsky.feed.post/1" }))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
