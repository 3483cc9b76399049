//! Transient operator notices
//!
//! When a syndication attempt fails, the upstream error message is parked
//! here for the host to surface on its next admin render. The slot holds a
//! single entry, last write wins, entries expire after a short TTL, and a
//! read consumes the entry so a message is shown at most once.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Where the trigger records a failure message for later display.
///
/// Injected so tests can capture notices in memory and deployments can back
/// the slot with whatever short-lived store the host offers.
pub trait NoticeSink: Send + Sync {
    /// Record a failure message, replacing any previous one.
    fn record(&self, message: &str);

    /// Consume the pending message, if any unexpired one exists.
    fn take(&self) -> Option<String>;
}

/// In-memory single-entry notice slot with time-based expiry
pub struct TransientNotice {
    slot: Mutex<Option<(String, Instant)>>,
    ttl: Duration,
}

impl TransientNotice {
    /// Default lifetime of a recorded notice
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

    pub fn new() -> Self {
        Self::with_ttl(Self::DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
        }
    }
}

impl Default for TransientNotice {
    fn default() -> Self {
        Self::new()
    }
}

impl NoticeSink for TransientNotice {
    fn record(&self, message: &str) {
        let mut slot = self.slot.lock().unwrap();
        *slot = Some((message.to_string(), Instant::now()));
    }

    fn take(&self) -> Option<String> {
        let mut slot = self.slot.lock().unwrap();
        match slot.take() {
            Some((message, recorded_at)) if recorded_at.elapsed() < self.ttl => Some(message),
            _ => None,
        }
    }
}
