//! Request signing primitives
//!
//! Venue-specific canonicalization lives in each adapter; this module only
//! holds the cryptographic building blocks:
//! - HMAC over SHA-256/512 with hex output
//! - ECDSA secp256k1 over Keccak-256, packed `r ‖ s ‖ v` with `v` in {0, 1}
//! - Ed25519 with base64 or base58 output

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::{Signer as _, SigningKey};
use ethers::core::types::H256;
use ethers::signers::LocalWallet;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};
use sha3::{Digest, Keccak256};

use crate::adapters::errors::{ExchangeError, ExchangeResult};

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

// =============================================================================
// HMAC
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
}

macro_rules! mac_bytes {
    ($mac:ty, $secret:expr, $message:expr) => {{
        let mut mac = <$mac>::new_from_slice($secret)
            .map_err(|e| ExchangeError::AuthenticationError(format!("Invalid HMAC key: {}", e)))?;
        mac.update($message);
        mac.finalize().into_bytes().to_vec()
    }};
}

/// Hex HMAC of `message` keyed by `secret`
pub fn hmac_sign(secret: &[u8], message: &[u8], algorithm: HashAlgorithm) -> ExchangeResult<String> {
    let bytes = match algorithm {
        HashAlgorithm::Sha256 => mac_bytes!(HmacSha256, secret, message),
        HashAlgorithm::Sha512 => mac_bytes!(HmacSha512, secret, message),
    };
    Ok(hex::encode(bytes))
}

pub fn hmac_sha256_hex(secret: &str, message: &str) -> ExchangeResult<String> {
    hmac_sign(secret.as_bytes(), message.as_bytes(), HashAlgorithm::Sha256)
}

pub fn hmac_sha512_hex(secret: &str, message: &str) -> ExchangeResult<String> {
    hmac_sign(secret.as_bytes(), message.as_bytes(), HashAlgorithm::Sha512)
}

// =============================================================================
// ECDSA secp256k1 / Keccak-256
// =============================================================================

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Recoverable secp256k1 signature over a 32-byte digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverableSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// Recovery id, normalized to 0 or 1
    pub v: u8,
}

impl RecoverableSignature {
    /// `0x` + r + s + v, 65 bytes as hex
    pub fn to_hex(&self) -> String {
        format!("0x{}{}{:02x}", hex::encode(self.r), hex::encode(self.s), self.v)
    }
}

/// Map legacy (27/28) or raw (0/1) recovery ids onto {0, 1}
pub fn normalize_recovery_id(v: u64) -> ExchangeResult<u8> {
    match v {
        0 | 1 => Ok(v as u8),
        27 | 28 => Ok((v - 27) as u8),
        other => Err(ExchangeError::AuthenticationError(format!(
            "Unexpected recovery id {}",
            other
        ))),
    }
}

pub fn parse_wallet(private_key: &str) -> ExchangeResult<LocalWallet> {
    private_key
        .trim()
        .parse::<LocalWallet>()
        .map_err(|e| ExchangeError::AuthenticationError(format!("Invalid private key: {}", e)))
}

/// Sign a 32-byte digest with a hex secp256k1 private key
pub fn ecdsa_sign_digest(digest: [u8; 32], private_key: &str) -> ExchangeResult<RecoverableSignature> {
    let wallet = parse_wallet(private_key)?;
    let signature = wallet
        .sign_hash(H256::from(digest))
        .map_err(|e| ExchangeError::AuthenticationError(format!("Signing failed: {}", e)))?;
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    signature.r.to_big_endian(&mut r);
    signature.s.to_big_endian(&mut s);
    Ok(RecoverableSignature {
        r,
        s,
        v: normalize_recovery_id(signature.v)?,
    })
}

/// Keccak-256 the message, then sign the digest
pub fn ecdsa_keccak_sign(message: &[u8], private_key: &str) -> ExchangeResult<RecoverableSignature> {
    ecdsa_sign_digest(keccak256(message), private_key)
}

// =============================================================================
// Ed25519
// =============================================================================

fn seed_from_bytes(bytes: &[u8]) -> Option<[u8; 32]> {
    // 64-byte keypairs carry the seed in the first half
    if bytes.len() == 32 || bytes.len() == 64 {
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes[..32]);
        Some(seed)
    } else {
        None
    }
}

/// Decode an ed25519 secret given as hex (optionally `0x`-prefixed), base58
/// or base64; 32-byte seeds and 64-byte keypairs are both accepted
pub fn decode_ed25519_seed(secret: &str) -> ExchangeResult<[u8; 32]> {
    let trimmed = secret.trim();
    let unprefixed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(unprefixed)
        .ok()
        .and_then(|b| seed_from_bytes(&b))
        .or_else(|| bs58::decode(trimmed).into_vec().ok().and_then(|b| seed_from_bytes(&b)))
        .or_else(|| BASE64.decode(trimmed).ok().and_then(|b| seed_from_bytes(&b)))
        .ok_or_else(|| ExchangeError::AuthenticationError("Invalid ed25519 secret".into()))
}

pub fn ed25519_sign(seed: &[u8; 32], message: &[u8]) -> [u8; 64] {
    SigningKey::from_bytes(seed).sign(message).to_bytes()
}

pub fn ed25519_public_key(seed: &[u8; 32]) -> [u8; 32] {
    SigningKey::from_bytes(seed).verifying_key().to_bytes()
}

pub fn ed25519_sign_base64(seed: &[u8; 32], message: &[u8]) -> String {
    BASE64.encode(ed25519_sign(seed, message))
}

pub fn ed25519_sign_base58(seed: &[u8; 32], message: &[u8]) -> String {
    bs58::encode(ed25519_sign(seed, message)).into_string()
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use ethers::core::types::{RecoveryMessage, Signature, U256};
    use ethers::signers::Signer;

    /// Hardhat account #1 private key (well-known, public test key)
    pub const TEST_PRIMARY_KEY: &str =
        "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    /// Hardhat account #1 address
    pub const TEST_PRIMARY_ADDR: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    /// RFC 8032 test vector 1 seed
    pub const TEST_ED25519_SEED: &str =
        "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

    #[test]
    fn test_hmac_sha256_documented_vector() {
        let secret = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
        let query = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            hmac_sha256_hex(secret, query).unwrap(),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_hmac_output_lengths() {
        let hex512 = hmac_sha512_hex("k", "m").unwrap();
        assert_eq!(hex512.len(), 128);
        let hex256 = hmac_sign(b"k", b"m", HashAlgorithm::Sha256).unwrap();
        assert_eq!(hex256.len(), 64);
    }

    #[test]
    fn test_keccak_empty() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_recovery_id_normalization() {
        assert_eq!(normalize_recovery_id(27).unwrap(), 0);
        assert_eq!(normalize_recovery_id(28).unwrap(), 1);
        assert_eq!(normalize_recovery_id(1).unwrap(), 1);
        assert!(normalize_recovery_id(37).is_err());
    }

    #[test]
    fn test_ecdsa_signature_recovers_signer() {
        let message = b"GET/rest/v1/customer1677844033163585";
        let sig = ecdsa_keccak_sign(message, TEST_PRIMARY_KEY).unwrap();
        assert!(sig.v <= 1);
        let packed = sig.to_hex();
        assert_eq!(packed.len(), 2 + 130);
        assert!(packed.ends_with("00") || packed.ends_with("01"));

        let ethers_sig = Signature {
            r: U256::from_big_endian(&sig.r),
            s: U256::from_big_endian(&sig.s),
            v: sig.v as u64 + 27,
        };
        let recovered = ethers_sig
            .recover(RecoveryMessage::Hash(H256::from(keccak256(message))))
            .unwrap();
        let wallet = parse_wallet(TEST_PRIMARY_KEY).unwrap();
        assert_eq!(recovered, wallet.address());
        assert_eq!(format!("{:?}", wallet.address()), TEST_PRIMARY_ADDR.to_lowercase());
    }

    #[test]
    fn test_ed25519_rfc8032_vector() {
        let seed = decode_ed25519_seed(TEST_ED25519_SEED).unwrap();
        assert_eq!(
            hex::encode(ed25519_public_key(&seed)),
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"
        );
        assert_eq!(
            hex::encode(ed25519_sign(&seed, b"")),
            "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
        );
    }

    #[test]
    fn test_ed25519_seed_encodings_agree() {
        let seed = decode_ed25519_seed(TEST_ED25519_SEED).unwrap();
        let b58 = bs58::encode(seed).into_string();
        let b64 = BASE64.encode(seed);
        assert_eq!(decode_ed25519_seed(&b58).unwrap(), seed);
        assert_eq!(decode_ed25519_seed(&b64).unwrap(), seed);
        assert!(decode_ed25519_seed("not a key").is_err());
    }

    #[test]
    fn test_base58_signature_decodes_to_64_bytes() {
        let seed = decode_ed25519_seed(TEST_ED25519_SEED).unwrap();
        let sig = ed25519_sign_base58(&seed, b"{}");
        assert_eq!(bs58::decode(sig).into_vec().unwrap().len(), 64);
    }
}
