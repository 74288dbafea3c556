//! Scenario tests S-1 and S-2 (spec §8), plus invariant 10's signature
//! vector set, exercised against the real router.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{Request, StatusCode};
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use tower::ServiceExt;

use syrus_core::config::{DialectsConfig, DiscordDialectConfig, SyrusConfig};
use syrus_core::types::ChatSource;
use syrus_queue::InProcessQueue;
use syrus_store::{model::Host, HostStore, InMemorySecretStore, SqliteHostStore};
use syrus_workers::messages::{ConfiguringMessage, PlayMessage};

fn sign(signing_key: &SigningKey, timestamp: &str, body: &[u8]) -> String {
    let mut message = timestamp.as_bytes().to_vec();
    message.extend_from_slice(body);
    hex::encode(signing_key.sign(&message).to_bytes())
}

fn test_state(secrets: InMemorySecretStore) -> Arc<syrus_gateway::app::GatewayState> {
    test_state_with_config(secrets, SyrusConfig::default())
}

fn test_state_with_config(secrets: InMemorySecretStore, config: SyrusConfig) -> Arc<syrus_gateway::app::GatewayState> {
    let hosts = SqliteHostStore::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap();
    hosts
        .put(&Host { id: "caller-1".into(), source: ChatSource::Discord, display_name: None })
        .unwrap();

    Arc::new(syrus_gateway::app::GatewayState {
        config,
        hosts: Arc::new(hosts),
        secrets: Arc::new(secrets),
        configuring_queue: Arc::new(InProcessQueue::<ConfiguringMessage>::new()),
        play_queue: Arc::new(InProcessQueue::<PlayMessage>::new()),
    })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn s1_verification_handshake_matches_token() {
    let secrets = InMemorySecretStore::default().with("whatsapp_verify_token", "secret");
    let router = syrus_gateway::app::build_router(test_state(secrets));

    let request = Request::builder()
        .method("GET")
        .uri("/webhooks/whatsapp?hub.mode=subscribe&hub.verify_token=secret&hub.challenge=abc123")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"abc123");
}

#[tokio::test]
async fn s1_verification_handshake_rejects_wrong_token() {
    let secrets = InMemorySecretStore::default().with("whatsapp_verify_token", "secret");
    let router = syrus_gateway::app::build_router(test_state(secrets));

    let request = Request::builder()
        .method("GET")
        .uri("/webhooks/whatsapp?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=abc123")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn s2_signed_ping_is_acknowledged_without_side_effects() {
    let signing_key = SigningKey::generate(&mut OsRng);
    let public_key_hex = hex::encode(signing_key.verifying_key().to_bytes());
    let secrets = InMemorySecretStore::default().with("discord_public_key", &public_key_hex);
    let state = test_state(secrets);
    let router = syrus_gateway::app::build_router(state.clone());

    let body: Bytes = Bytes::from_static(br#"{"type":1}"#);
    let timestamp = "1700000000";
    let signature = sign(&signing_key, timestamp, &body);

    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/discord")
        .header("x-signature-ed25519", signature)
        .header("x-signature-timestamp", timestamp)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["type"], 1);
}

#[tokio::test]
async fn invariant10_tampered_and_wrong_key_signatures_are_rejected() {
    let signing_key = SigningKey::generate(&mut OsRng);
    let other_key = SigningKey::generate(&mut OsRng);
    let public_key_hex = hex::encode(signing_key.verifying_key().to_bytes());
    let wrong_key_hex = hex::encode(other_key.verifying_key().to_bytes());
    let timestamp = "1700000000";
    let body = br#"{"type":1}"#;
    let valid_signature = sign(&signing_key, timestamp, body);

    // valid → accept
    assert!(syrus_gateway::verify::verify_detached(&public_key_hex, &valid_signature, timestamp, body));
    // tampered body → reject
    assert!(!syrus_gateway::verify::verify_detached(&public_key_hex, &valid_signature, timestamp, br#"{"type":2}"#));
    // tampered timestamp → reject
    assert!(!syrus_gateway::verify::verify_detached(&public_key_hex, &valid_signature, "1700000001", body));
    // wrong key → reject
    assert!(!syrus_gateway::verify::verify_detached(&wrong_key_hex, &valid_signature, timestamp, body));
}

#[tokio::test]
async fn debug_flag_echoes_raw_payload_only_for_the_configured_operator() {
    let signing_key = SigningKey::generate(&mut OsRng);
    let public_key_hex = hex::encode(signing_key.verifying_key().to_bytes());
    let secrets = InMemorySecretStore::default().with("discord_public_key", &public_key_hex);

    let mut config = SyrusConfig::default();
    config.dialects = DialectsConfig {
        discord: Some(DiscordDialectConfig { app_id: "app-1".into(), debug_operator_id: Some("caller-1".into()) }),
        whatsapp: None,
    };
    let state = test_state_with_config(secrets, config);
    let router = syrus_gateway::app::build_router(state);

    let body_value = serde_json::json!({
        "type": 2,
        "id": "int-1",
        "token": "tok-1",
        "channel_id": "chan-1",
        "member": {"user": {"id": "caller-1"}},
        "data": {"options": [{"name": "debug", "value": true}]},
    });
    let body = serde_json::to_vec(&body_value).unwrap();
    let timestamp = "1700000000";
    let signature = sign(&signing_key, timestamp, &body);

    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/discord")
        .header("x-signature-ed25519", signature)
        .header("x-signature-timestamp", timestamp)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["type"], 4);
    let content = json["data"]["content"].as_str().unwrap();
    assert!(content.contains("\"id\":\"int-1\""));
}

#[tokio::test]
async fn unsigned_discord_request_is_rejected() {
    let secrets = InMemorySecretStore::default().with("discord_public_key", "00");
    let router = syrus_gateway::app::build_router(test_state(secrets));

    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/discord")
        .body(axum::body::Body::from(br#"{"type":1}"#.to_vec()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let secrets = InMemorySecretStore::default();
    let router = syrus_gateway::app::build_router(test_state(secrets));

    let request = Request::builder().uri("/health").body(axum::body::Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
