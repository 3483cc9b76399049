//! Skypost - content-syndication bridge to Bluesky
//!
//! When the host platform publishes an article in an allowed category, this
//! library reformats it and pushes it to Bluesky over the AT Protocol XRPC
//! API. The host owns settings storage and hook wiring; it hands this crate
//! a configuration snapshot and invokes the trigger per publish event.

pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod formatter;
pub mod logging;
pub mod notice;
pub mod platform;
pub mod trigger;

// Re-export commonly used types
pub use client::{BskyClient, Session, SessionState};
pub use config::BridgeConfig;
pub use crypto::CredentialStore;
pub use error::{BridgeError, PlatformError, Result};
pub use notice::{NoticeSink, TransientNotice};
pub use trigger::{ContentStatus, PublishEvent, PublishTrigger, SkipReason, TriggerOutcome};
