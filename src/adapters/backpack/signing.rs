//! Backpack request signing
//!
//! The signed string is
//! `instruction=<i>&<params sorted, urlencoded>&timestamp=<ms>&window=<ms>`,
//! signed with ed25519 and sent base64 in `X-Signature`. Batch order
//! requests repeat the `instruction=<i>&<order params>&` block once per order
//! before the shared timestamp and window.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::Value;

use crate::adapters::endpoints::urlencode;
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::safe::Params;
use crate::adapters::signing::ed25519_sign_base64;

/// String to sign for one private request
pub fn signing_payload(instruction: &str, params: &Params, timestamp: i64, window: u64) -> String {
    let query = urlencode(params);
    let mut payload = format!("instruction={}&", instruction);
    if !query.is_empty() {
        payload.push_str(&query);
        payload.push('&');
    }
    payload.push_str(&format!("timestamp={}&window={}", timestamp, window));
    payload
}

/// String to sign for a batch of orders posted as one JSON array
pub fn batch_signing_payload(instruction: &str, orders: &[Value], timestamp: i64, window: u64) -> String {
    let mut payload = String::new();
    for order in orders {
        let params = order.as_object().cloned().unwrap_or_default();
        payload.push_str(&format!("instruction={}&{}&", instruction, urlencode(&params)));
    }
    payload.push_str(&format!("timestamp={}&window={}", timestamp, window));
    payload
}

/// Seed from the base64 API secret (first 32 bytes)
pub fn decode_secret(secret: &str) -> ExchangeResult<[u8; 32]> {
    let bytes = BASE64
        .decode(secret.trim())
        .map_err(|e| ExchangeError::AuthenticationError(format!("backpack secret is not base64: {}", e)))?;
    if bytes.len() < 32 {
        return Err(ExchangeError::AuthenticationError(format!(
            "backpack secret decodes to {} bytes, expected 32",
            bytes.len()
        )));
    }
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&bytes[..32]);
    Ok(seed)
}

pub fn sign_payload(secret: &str, payload: &str) -> ExchangeResult<String> {
    let seed = decode_secret(secret)?;
    Ok(ed25519_sign_base64(&seed, payload.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::signing::{decode_ed25519_seed, ed25519_public_key, tests::TEST_ED25519_SEED};
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};
    use serde_json::json;

    #[test]
    fn test_payload_layout() {
        let mut params = Params::new();
        params.insert("symbol".into(), json!("SOL_USDC"));
        params.insert("orderId".into(), json!("111"));
        assert_eq!(
            signing_payload("orderCancel", &params, 1614550000000, 5000),
            "instruction=orderCancel&orderId=111&symbol=SOL_USDC&timestamp=1614550000000&window=5000"
        );
        assert_eq!(
            signing_payload("balanceQuery", &Params::new(), 1614550000000, 5000),
            "instruction=balanceQuery&timestamp=1614550000000&window=5000"
        );
    }

    #[test]
    fn test_batch_payload_repeats_instruction() {
        let orders = vec![
            json!({"symbol": "SOL_USDC", "side": "Bid", "quantity": "1"}),
            json!({"symbol": "SOL_USDC", "side": "Ask", "quantity": "2"}),
        ];
        assert_eq!(
            batch_signing_payload("orderExecute", &orders, 1614550000000, 5000),
            "instruction=orderExecute&quantity=1&side=Bid&symbol=SOL_USDC&\
             instruction=orderExecute&quantity=2&side=Ask&symbol=SOL_USDC&\
             timestamp=1614550000000&window=5000"
        );
    }

    #[test]
    fn test_signature_verifies() {
        let seed = decode_ed25519_seed(TEST_ED25519_SEED).unwrap();
        let secret = BASE64.encode(seed);
        let payload = "instruction=balanceQuery&timestamp=1614550000000&window=5000";
        let signature = sign_payload(&secret, payload).unwrap();

        let public = VerifyingKey::from_bytes(&ed25519_public_key(&seed)).unwrap();
        let raw: [u8; 64] = BASE64.decode(signature).unwrap().try_into().unwrap();
        assert!(public.verify(payload.as_bytes(), &Signature::from_bytes(&raw)).is_ok());
    }

    #[test]
    fn test_bad_secret() {
        assert!(matches!(decode_secret("not base64!"), Err(ExchangeError::AuthenticationError(_))));
        assert!(matches!(decode_secret("AAAA"), Err(ExchangeError::AuthenticationError(_))));
    }
}
