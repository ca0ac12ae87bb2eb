use super::*;
use crate::config::{TrackerConfig, TrackerProfile};
use crate::context::RequestContext;
use crate::params::EventParams;
use crate::transport::MockTransport;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn create_test_tracker(transport: &Arc<MockTransport>) -> EventTracker {
    let config = TrackerConfig {
        app_token: Some("app-token".to_string()),
        endpoint: "http://localhost:9999/event".to_string(),
        ..Default::default()
    };
    let context = RequestContext {
        user_agent: Some("Mozilla/5.0".to_string()),
        accept_language: Some("en-GB".to_string()),
        ..Default::default()
    };
    let tracker = EventTracker::new(config, &context, transport.clone());
    tracker.set_forced_timestamp(Some("@1400000000".to_string()));
    tracker
}

fn sent_payload(transport: &MockTransport, index: usize) -> Value {
    let request = &transport.requests()[index];
    let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
    body["p"].clone()
}

#[tokio::test]
async fn test_track_sends_one_post() {
    let transport = Arc::new(MockTransport::responding("ok"));
    let tracker = create_test_tracker(&transport);

    tracker
        .track("found_item", "custom", EventParams::default().parameter(1, "Black Stab"))
        .await;

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);

    let request = &requests[0];
    assert_eq!(request.method(), "POST");
    assert_eq!(request.url, "http://localhost:9999/event");
    assert_eq!(request.header("Content-Type"), Some("application/json"));
    assert_eq!(request.header("Accept-Language"), Some("en-GB"));
    assert_eq!(request.header("User-Agent"), Some("Mozilla/5.0"));
    assert_eq!(request.timeout, None);

    let payload = sent_payload(&transport, 0);
    assert_eq!(payload["event_name"], "found_item");
    assert_eq!(payload["event_category"], "custom");
    assert_eq!(payload["app_token"], "app-token");
    assert_eq!(payload["parameter1"], "Black Stab");
    assert_eq!(payload["timestamp"], 1_400_000_000);
}

#[tokio::test]
async fn test_track_swallows_transport_failure() {
    let transport = Arc::new(MockTransport::failing());
    let tracker = create_test_tracker(&transport);

    tracker
        .track("session_start", "session", EventParams::default())
        .await;

    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_send_request_returns_body_or_empty() {
    let ok = Arc::new(MockTransport::responding("{\"status\":\"ok\"}"));
    let tracker = create_test_tracker(&ok);
    let payload = tracker.build_payload("ping", "custom", &EventParams::default());
    assert_eq!(
        tracker.send_request(&tracker.endpoint(), Some(&payload)).await,
        "{\"status\":\"ok\"}"
    );

    let failing = Arc::new(MockTransport::failing());
    let tracker = create_test_tracker(&failing);
    assert_eq!(
        tracker.send_request(&tracker.endpoint(), Some(&payload)).await,
        ""
    );
}

#[tokio::test]
async fn test_empty_payload_sends_no_body() {
    let transport = Arc::new(MockTransport::default());
    let tracker = create_test_tracker(&transport);

    tracker
        .send_request("http://localhost:9999/ping", Some(&crate::EventPayload::new()))
        .await;
    tracker.send_request("http://localhost:9999/ping", None).await;

    for request in transport.requests() {
        assert_eq!(request.method(), "GET");
        assert_eq!(request.body, None);
        assert_eq!(request.header("Content-Type"), None);
    }
}

#[tokio::test]
async fn test_registration_sets_user_id() {
    let transport = Arc::new(MockTransport::default());
    let tracker = create_test_tracker(&transport);

    tracker.registration("user-1", EventParams::default()).await;
    assert_eq!(tracker.user_id().as_deref(), Some("user-1"));

    let payload = sent_payload(&transport, 0);
    assert_eq!(payload["event_name"], "registration");
    assert_eq!(payload["event_category"], "account");
    assert_eq!(payload["user_id"], "user-1");
}

#[tokio::test]
async fn test_sign_in_with_empty_id_keeps_previous_user() {
    let transport = Arc::new(MockTransport::default());
    let tracker = create_test_tracker(&transport);
    tracker.set_user_id("user-1");

    tracker.sign_in("", EventParams::default()).await;

    assert_eq!(tracker.user_id().as_deref(), Some("user-1"));
    let payload = sent_payload(&transport, 0);
    assert_eq!(payload["event_name"], "sign_in");
    assert_eq!(payload["user_id"], "user-1");
}

#[tokio::test]
async fn test_profile_update_keeps_user_and_sends_account_block() {
    let transport = Arc::new(MockTransport::default());
    let tracker = create_test_tracker(&transport);
    tracker.set_profile(TrackerProfile {
        country_code: Some("DE".to_string()),
        ..Default::default()
    });

    let params = EventParams {
        target_group: Some("casual".to_string()),
        ..Default::default()
    };
    tracker.profile_update(params).await;

    assert_eq!(tracker.user_id(), None);
    let payload = sent_payload(&transport, 0);
    assert_eq!(payload["event_name"], "update");
    assert_eq!(payload["event_category"], "account");
    assert_eq!(payload["country_code"], "DE");
    assert_eq!(payload["target_group"], "casual");
    assert!(payload.get("user_id").is_none());
}

#[test]
fn test_request_timeout_setters() {
    let transport = Arc::new(MockTransport::default());
    let tracker = create_test_tracker(&transport);

    tracker.set_request_timeout(750);
    assert_eq!(tracker.request_timeout(), 750);
    assert_eq!(
        tracker.outbound_request("http://x/", None).timeout,
        Some(Duration::from_millis(750))
    );

    tracker.set_request_timeout(-5);
    assert_eq!(tracker.request_timeout(), 0);

    tracker.set_request_timeout_str("250");
    assert_eq!(tracker.request_timeout(), 250);

    tracker.set_request_timeout_str("abc");
    assert_eq!(tracker.request_timeout(), 0);
    assert_eq!(tracker.outbound_request("http://x/", None).timeout, None);
}

#[test]
fn test_context_snapshot_and_overrides() {
    let context = RequestContext {
        https: Some("on".to_string()),
        host: Some("game.example.com".to_string()),
        path_info: Some("/lobby".to_string()),
        query_string: Some("room=7".to_string()),
        remote_addr: Some("192.0.2.10".to_string()),
        referer: Some("https://search.example.org/".to_string()),
        ..Default::default()
    };
    let tracker = EventTracker::new(
        TrackerConfig::default(),
        &context,
        Arc::new(MockTransport::default()),
    );

    assert_eq!(tracker.page_url(), "https://game.example.com/lobby?room=7");
    assert_eq!(tracker.remote_ip().as_deref(), Some("192.0.2.10"));
    assert_eq!(
        tracker.http_referer().as_deref(),
        Some("https://search.example.org/")
    );
    assert_eq!(tracker.user_agent(), None);
    assert_eq!(tracker.charset(), "utf-8");
    assert!(tracker.server_side());

    tracker.set_remote_ip("198.51.100.1");
    assert_eq!(tracker.remote_ip().as_deref(), Some("198.51.100.1"));
    assert_eq!(tracker.snapshot().page_url, "https://game.example.com/lobby?room=7");
}

#[test]
fn test_identical_calls_build_identical_payloads() {
    let transport = Arc::new(MockTransport::default());
    let tracker = create_test_tracker(&transport);
    let params = EventParams {
        locale: Some("en-US".to_string()),
        ..Default::default()
    }
    .parameter(2, 21);

    let first = tracker.build_payload("session_start", "session", &params);
    let second = tracker.build_payload("session_start", "session", &params);
    assert_eq!(first, second);
    assert_eq!(first.get("parameter2"), Some(&json!(21)));
}

#[test]
fn test_server_side_flag_is_sent_even_when_false() {
    let transport = Arc::new(MockTransport::default());
    let tracker = create_test_tracker(&transport);
    tracker.set_server_side(false);

    let payload = tracker.build_payload("ping", "custom", &EventParams::default());
    assert_eq!(payload.get("server_side"), Some(&json!(false)));
}
