//! End-to-end trigger scenarios against a mock PDS
//!
//! Exercises the full pipeline: gates, credential decryption, formatting,
//! and the real XRPC client over the wire.

use std::collections::HashSet;
use std::sync::Arc;

use skypost::{
    BridgeConfig, ContentStatus, CredentialStore, NoticeSink, PublishEvent, PublishTrigger,
    SkipReason, TransientNotice, TriggerOutcome,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SALT: &str = "integration-salt";

fn trigger_against(server: &MockServer, identifier: &str) -> (PublishTrigger, Arc<TransientNotice>) {
    let store = CredentialStore::from_salt(SALT);
    let encrypted = store.encrypt("app-password").unwrap();
    let mut config = BridgeConfig::new(identifier.to_string(), encrypted, HashSet::from([5]));
    config.api_base = server.uri();

    let notices = Arc::new(TransientNotice::new());
    (
        PublishTrigger::new(config, store, notices.clone()),
        notices,
    )
}

fn publish_event() -> PublishEvent {
    PublishEvent {
        content_id: 9,
        title: "Hello".to_string(),
        body_html: "<p>Hello from the blog</p>".to_string(),
        excerpt_html: "Hello".to_string(),
        permalink: "https://blog.test/hello".to_string(),
        category_ids: HashSet::from([5]),
        old_status: ContentStatus::Draft,
        new_status: ContentStatus::Publish,
    }
}

async fn mount_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/com.atproto.server.createSession"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accessJwt": "jwt-token",
            "did": "did:plc:abc123"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn happy_path_posts_the_stripped_body() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/com.atproto.repo.createRecord"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "uri": "at://did:plc:abc123/app.bsky.feed.post/xyz"
        })))
        .mount(&server)
        .await;

    let (trigger, notices) = trigger_against(&server, "user.bsky.social");
    let outcome = trigger.fire(&publish_event()).await;

    match outcome {
        TriggerOutcome::Posted(body) => {
            assert_eq!(body["uri"], "at://did:plc:abc123/app.bsky.feed.post/xyz");
        }
        other => panic!("Expected Posted, got {:?}", other),
    }
    assert_eq!(notices.take(), None);

    let requests = server.received_requests().await.unwrap();
    let record = requests
        .iter()
        .find(|r| r.url.path() == "/com.atproto.repo.createRecord")
        .expect("createRecord was called");
    let sent: serde_json::Value = serde_json::from_slice(&record.body).unwrap();
    assert_eq!(sent["record"]["text"], "Hello from the blog");
    assert_eq!(sent["record"]["$type"], "app.bsky.feed.post");
    assert_eq!(sent["repo"], "did:plc:abc123");
}

#[tokio::test]
async fn incomplete_configuration_makes_no_network_call() {
    let server = MockServer::start().await;

    // Identifier empty; password and categories set; status is publish
    let (trigger, _) = trigger_against(&server, "");
    let outcome = trigger.fire(&publish_event()).await;

    assert!(matches!(
        outcome,
        TriggerOutcome::Skipped(SkipReason::ConfigurationIncomplete)
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_authentication_is_recorded_for_the_operator() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/com.atproto.server.createSession"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "AuthenticationRequired",
            "message": "Invalid credentials"
        })))
        .mount(&server)
        .await;

    let (trigger, notices) = trigger_against(&server, "user.bsky.social");
    let outcome = trigger.fire(&publish_event()).await;

    // The attempt failed but fire() still returned normally
    match outcome {
        TriggerOutcome::Failed(message) => assert_eq!(message, "Invalid credentials"),
        other => panic!("Expected Failed, got {:?}", other),
    }

    // Exactly the upstream message, readable once
    assert_eq!(notices.take(), Some("Invalid credentials".to_string()));
    assert_eq!(notices.take(), None);
}

#[tokio::test]
async fn rejected_record_creation_is_recorded_for_the_operator() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/com.atproto.repo.createRecord"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "message": "Record rejected"
        })))
        .mount(&server)
        .await;

    let (trigger, notices) = trigger_against(&server, "user.bsky.social");
    let outcome = trigger.fire(&publish_event()).await;

    assert!(matches!(outcome, TriggerOutcome::Failed(_)));
    assert_eq!(notices.take(), Some("Record rejected".to_string()));
}

#[tokio::test]
async fn each_event_authenticates_with_a_fresh_client() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/com.atproto.server.createSession"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "accessJwt": "jwt-token",
            "did": "did:plc:abc123"
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/com.atproto.repo.createRecord"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "uri": "at://x" })),
        )
        .expect(2)
        .mount(&server)
        .await;

    // Sessions are not persisted across invocations: two events, two logins
    let (trigger, _) = trigger_against(&server, "user.bsky.social");
    trigger.fire(&publish_event()).await;
    trigger.fire(&publish_event()).await;
}

#[tokio::test]
async fn long_body_syndicates_excerpt_and_permalink() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/com.atproto.repo.createRecord"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "uri": "at://x" })),
        )
        .mount(&server)
        .await;

    let (trigger, _) = trigger_against(&server, "user.bsky.social");
    let mut event = publish_event();
    event.body_html = "b".repeat(500);
    event.excerpt_html = "Read more...".to_string();
    event.permalink = "https://x.test/p/9".to_string();

    trigger.fire(&event).await;

    let requests = server.received_requests().await.unwrap();
    let record = requests
        .iter()
        .find(|r| r.url.path() == "/com.atproto.repo.createRecord")
        .unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&record.body).unwrap();
    assert_eq!(sent["record"]["text"], "Read more...\n\nhttps://x.test/p/9");
}
