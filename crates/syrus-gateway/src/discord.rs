//! Dialect A (Discord-like signed interactions), spec §4.1 steps 1-9.

use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

use syrus_core::types::{ChatSource, CommandOption};
use syrus_queue::MessageGroupId;
use syrus_workers::messages::{ConfiguringMessage, PlayMessage};

use crate::app::GatewayState;
use crate::options::parse_options;

const PING: u64 = 1;

/// POST /webhooks/discord. Every request, including pings, is signature
/// verified first; a 401 here is the only response that skips JSON parsing.
pub async fn handle_interaction(state: &GatewayState, headers: HeaderMap, body: Bytes) -> (StatusCode, Json<Value>) {
    let Some(signature) = header_str(&headers, "x-signature-ed25519") else {
        return unauthorized();
    };
    let Some(timestamp) = header_str(&headers, "x-signature-timestamp") else {
        return unauthorized();
    };

    let Ok(public_key) = state.secrets.get("discord_public_key") else {
        warn!("discord public key not configured");
        return unauthorized();
    };

    if !crate::verify::verify_detached(&public_key, signature, timestamp, &body) {
        return unauthorized();
    }

    let envelope: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return (StatusCode::BAD_REQUEST, Json(json!({"error": "malformed payload"}))),
    };

    let interaction_type = envelope.get("type").and_then(|v| v.as_u64()).unwrap_or(0);
    if interaction_type == PING {
        return (StatusCode::OK, Json(json!({"type": 1})));
    }

    let Some(user_id) = caller_id(&envelope) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "no caller identity"})));
    };

    let host = match state.hosts.lookup(&user_id, ChatSource::Discord) {
        Ok(h) => h,
        Err(e) => {
            warn!(error = %e, "host lookup failed");
            return (StatusCode::OK, Json(not_authorized_reply()));
        }
    };
    if host.is_none() {
        // Do not leak whitelist membership via status code; always 200.
        return (StatusCode::OK, Json(not_authorized_reply()));
    }

    let data = envelope.get("data").cloned().unwrap_or(Value::Null);
    let channel_id = envelope.get("channel_id").and_then(|v| v.as_str()).unwrap_or_default().to_string();
    let interaction_id = envelope.get("id").and_then(|v| v.as_str()).unwrap_or_default().to_string();
    let interaction_token = envelope.get("token").and_then(|v| v.as_str()).map(str::to_string);

    let options = data
        .get("options")
        .map(parse_options)
        .unwrap_or_default();

    // A `debug` flag is honored only for the configured operator; the
    // gateway never echoes raw payloads to anyone else (spec §4.1 step 9).
    let debug_requested = CommandOption::find(&options, "debug").and_then(|o| o.as_bool()).unwrap_or(false);
    let debug_allowed = debug_requested
        && state
            .config
            .dialects
            .discord
            .as_ref()
            .and_then(|d| d.debug_operator_id.as_deref())
            == Some(user_id.as_str());
    if debug_requested && !debug_allowed {
        warn!(user_id = %user_id, "debug flag requested by non-operator, ignoring");
    }
    if debug_allowed {
        return (StatusCode::OK, Json(json!({"type": 4, "data": {"content": envelope.to_string(), "flags": 64}})));
    }

    if CommandOption::find(&options, "declare").is_some() {
        let msg = PlayMessage {
            campaign_id: syrus_core::types::CampaignId::from(channel_id.clone()),
            interaction_id,
            interaction_token,
            options,
        };
        if let Err(e) = state.play_queue.send(MessageGroupId::from(channel_id.as_str()), msg).await {
            warn!(error = %e, "failed to enqueue play message");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "internal error"})));
        }
        return (StatusCode::OK, Json(json!({"type": 5})));
    }

    if CommandOption::find(&options, "start").is_some() || CommandOption::find(&options, "end").is_some() {
        let msg = ConfiguringMessage {
            channel_id: channel_id.clone(),
            host_id: user_id,
            interaction_id,
            interaction_token,
            source: ChatSource::Discord,
            options,
        };
        if let Err(e) = state.configuring_queue.send(MessageGroupId::from(channel_id.as_str()), msg).await {
            warn!(error = %e, "failed to enqueue configuring message");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "internal error"})));
        }
        return (StatusCode::OK, Json(json!({"type": 5})));
    }

    (StatusCode::OK, Json(json!({"type": 5})))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok()
}

fn caller_id(envelope: &Value) -> Option<String> {
    envelope
        .pointer("/member/user/id")
        .or_else(|| envelope.pointer("/user/id"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn not_authorized_reply() -> Value {
    json!({"type": 4, "data": {"content": "You are not recognized here.", "flags": 64}})
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid request signature"})))
}
