//! Deepwaters request signing
//!
//! The signed message is
//! `METHOD + "/rest/v1" + lowercase(path + query) + timestamp_us + nonce + body`,
//! hashed with keccak-256 and signed with the API key's secp256k1 key. The
//! header carries `0x` + r + s + v with v in {00, 01}.

use super::types::SIGNED_PATH_PREFIX;
use crate::adapters::errors::ExchangeResult;
use crate::adapters::signing::ecdsa_keccak_sign;
use crate::adapters::types::HttpMethod;

pub fn signing_message(method: HttpMethod, path_and_query: &str, timestamp_us: i64, nonce: &str, body: &str) -> String {
    format!(
        "{}{}{}{}{}{}",
        method,
        SIGNED_PATH_PREFIX,
        path_and_query.to_lowercase(),
        timestamp_us,
        nonce,
        body
    )
}

pub fn sign_message(message: &str, secret: &str) -> ExchangeResult<String> {
    Ok(ecdsa_keccak_sign(message.as_bytes(), secret)?.to_hex())
}
