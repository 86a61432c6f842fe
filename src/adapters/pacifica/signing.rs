//! Pacifica action signing
//!
//! Write operations are signed client-side: the action header and the
//! payload are merged into `{..header, data: payload}`, every object is
//! key-sorted, the result is rendered as compact JSON and signed with the
//! account (or agent) ed25519 key. The signature travels base58-encoded in
//! the request body.

use serde_json::{Map, Value};

use super::types::ActionType;
use crate::adapters::errors::ExchangeResult;
use crate::adapters::signing::{decode_ed25519_seed, ed25519_sign_base58};

/// Header fields covered by the signature
#[derive(Debug, Clone, Copy)]
pub struct ActionHeader {
    pub timestamp: i64,
    pub expiry_window: u64,
    pub action: ActionType,
}

/// Recursively sort object keys
pub fn sort_json_keys(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(sort_json_keys).collect()),
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                if let Some(inner) = map.get(key) {
                    sorted.insert(key.clone(), sort_json_keys(inner));
                }
            }
            Value::Object(sorted)
        }
        other => other.clone(),
    }
}

/// Canonical text that gets signed
pub fn prepare_message(header: &ActionHeader, payload: &Value) -> String {
    let mut message = Map::new();
    message.insert("timestamp".into(), Value::from(header.timestamp));
    message.insert("expiry_window".into(), Value::from(header.expiry_window));
    message.insert("type".into(), Value::from(header.action.as_str()));
    message.insert("data".into(), payload.clone());
    sort_json_keys(&Value::Object(message)).to_string()
}

/// Base58 ed25519 signature of the canonical message
pub fn sign_action(private_key: &str, header: &ActionHeader, payload: &Value) -> ExchangeResult<String> {
    let seed = decode_ed25519_seed(private_key)?;
    let message = prepare_message(header, payload);
    Ok(ed25519_sign_base58(&seed, message.as_bytes()))
}
