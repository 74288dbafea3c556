//! Dialect B (WhatsApp-like webhooks), spec §4.1 last paragraph and §6.
//! Unsigned: there is no per-request signature, so the gateway only ever
//! acknowledges whitelisted senders and silently drops everyone else.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
};
use serde_json::{json, Value};
use tracing::warn;

use syrus_core::types::{CampaignId, ChatSource, CommandOption, OptionValue};
use syrus_queue::MessageGroupId;
use syrus_workers::messages::{ConfiguringMessage, PlayMessage};

use crate::app::GatewayState;

const COMMAND_PREFIXES: [&str; 2] = ["$yrus", "/syrus"];

/// GET /webhooks/{dialect} — verification handshake (S-1).
pub async fn verify_handler(
    State(state): State<Arc<GatewayState>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    let expected = state.secrets.get_optional("whatsapp_verify_token").unwrap_or_default();
    let mode = params.get("hub.mode").map(String::as_str);
    let token = params.get("hub.verify_token").map(String::as_str);
    let challenge = params.get("hub.challenge").cloned().unwrap_or_default();

    if mode == Some("subscribe") && token == Some(expected.as_str()) && !expected.is_empty() {
        (StatusCode::OK, challenge)
    } else {
        (StatusCode::FORBIDDEN, String::new())
    }
}

/// POST /webhooks/{dialect} — unsigned message delivery.
pub async fn handle_message(state: &GatewayState, body: Bytes) -> (StatusCode, axum::Json<Value>) {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return (StatusCode::BAD_REQUEST, axum::Json(json!({"error": "malformed payload"}))),
    };

    let empty = Vec::new();
    let entries = payload.get("entry").and_then(|v| v.as_array()).unwrap_or(&empty);
    for entry in entries {
        let changes = entry.get("changes").and_then(|v| v.as_array()).unwrap_or(&empty);
        for change in changes {
            let messages = change
                .pointer("/value/messages")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            for message in &messages {
                handle_one_message(state, message).await;
            }
        }
    }

    // WhatsApp-shaped webhooks are always acked 200 regardless of whether any
    // message was whitelisted, so the platform never retries delivery.
    (StatusCode::OK, axum::Json(json!({})))
}

async fn handle_one_message(state: &GatewayState, message: &Value) {
    let Some(from) = message.get("from").and_then(|v| v.as_str()) else { return };
    let Some(body) = message.pointer("/text/body").and_then(|v| v.as_str()) else { return };

    let Some(command_text) = strip_command_prefix(body) else { return };

    match state.hosts.lookup(from, ChatSource::Whatsapp) {
        Ok(Some(_)) => {}
        Ok(None) => return, // unknown sender: drop silently, no ack, no enqueue.
        Err(e) => {
            warn!(error = %e, "host lookup failed");
            return;
        }
    }

    let Some(options) = parse_command_text(command_text) else { return };
    let channel_id = from.to_string();

    if CommandOption::find(&options, "declare").is_some() {
        let msg = PlayMessage {
            campaign_id: CampaignId::from(channel_id.clone()),
            interaction_id: uuid::Uuid::new_v4().to_string(),
            interaction_token: None,
            options,
        };
        if let Err(e) = state.play_queue.send(MessageGroupId::from(channel_id.as_str()), msg).await {
            warn!(error = %e, "failed to enqueue play message");
        }
        return;
    }

    if CommandOption::find(&options, "start").is_some() || CommandOption::find(&options, "end").is_some() {
        let msg = ConfiguringMessage {
            channel_id: channel_id.clone(),
            host_id: from.to_string(),
            interaction_id: uuid::Uuid::new_v4().to_string(),
            interaction_token: None,
            source: ChatSource::Whatsapp,
            options,
        };
        if let Err(e) = state.configuring_queue.send(MessageGroupId::from(channel_id.as_str()), msg).await {
            warn!(error = %e, "failed to enqueue configuring message");
        }
    }
}

fn strip_command_prefix(body: &str) -> Option<&str> {
    for prefix in COMMAND_PREFIXES {
        if let Some(rest) = body.strip_prefix(prefix) {
            return Some(rest.trim());
        }
    }
    None
}

/// Plain-text commands carry no structured option tree; tokenize into the
/// same `start`/`end`/`declare` shape the Discord-like path produces so both
/// dialects feed identical message schemas downstream.
fn parse_command_text(text: &str) -> Option<Vec<CommandOption>> {
    let mut tokens = text.split_whitespace();
    let sub_command = tokens.next()?;

    let scalar = |name: &str, value: &str| CommandOption {
        name: name.to_string(),
        value: OptionValue::Scalar(json!(value)),
    };

    match sub_command {
        "start" => {
            let campaign_type = tokens.next()?;
            let decisions = tokens.next().unwrap_or("host");
            Some(vec![CommandOption {
                name: "start".to_string(),
                value: OptionValue::Sequence(vec![scalar("type", campaign_type), scalar("decisions", decisions)]),
            }])
        }
        "end" => {
            let confirm = tokens.next();
            let children = match confirm {
                Some(token) => vec![scalar("confirm", token)],
                None => vec![],
            };
            Some(vec![CommandOption { name: "end".to_string(), value: OptionValue::Sequence(children) }])
        }
        "declare" => {
            let rest: Vec<&str> = tokens.collect();
            if rest.is_empty() {
                return Some(vec![]);
            }
            Some(vec![CommandOption {
                name: "declare".to_string(),
                value: OptionValue::Sequence(vec![scalar("text", &rest.join(" "))]),
            }])
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_either_command_prefix() {
        assert_eq!(strip_command_prefix("$yrus start short host"), Some("start short host"));
        assert_eq!(strip_command_prefix("/syrus declare search the hall"), Some("declare search the hall"));
        assert_eq!(strip_command_prefix("hello there"), None);
    }

    #[test]
    fn parses_start_command_text() {
        let options = parse_command_text("start short host").unwrap();
        let start = CommandOption::find(&options, "start").unwrap();
        assert_eq!(start.opt("type").and_then(|o| o.as_str()), Some("short"));
        assert_eq!(start.opt("decisions").and_then(|o| o.as_str()), Some("host"));
    }

    #[test]
    fn parses_declare_command_text() {
        let options = parse_command_text("declare search the entry hall").unwrap();
        let declare = CommandOption::find(&options, "declare").unwrap();
        assert_eq!(declare.opt("text").and_then(|o| o.as_str()), Some("search the entry hall"));
    }
}
