//! Web3-style request signing.
//!
//! The canonical parameter string is hashed with legacy Keccak-256 (the
//! Ethereum variant, not NIST SHA3-256) and signed with ECDSA over secp256k1.
//! The signature goes on the wire as `0x` + hex of `r || s || v` (65 bytes).

use std::collections::BTreeMap;

use secp256k1::ecdsa::RecoverableSignature;
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use sha3::{Digest, Keccak256};

use crate::auth::signature::canonicalize;
use crate::error::AsterError;

/// How the trailing recovery byte `v` of a Web3 signature is filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecoveryIdPolicy {
    /// Always `0`. This is what the exchange has historically accepted.
    #[default]
    Zero,
    /// The real recovery id (`0` or `1`), so the public key can be recovered.
    Computed,
}

/// Keccak-256 digest.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// A parsed signing key.
#[derive(Clone)]
pub struct Web3Signer {
    secret_key: SecretKey,
    secp: Secp256k1<All>,
    address: String,
    recovery: RecoveryIdPolicy,
}

impl Web3Signer {
    /// Parse a hex private key, with or without a `0x` prefix.
    pub fn from_private_key(private_key: &str) -> Result<Self, AsterError> {
        let trimmed = private_key.trim();
        let stripped = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(stripped)
            .map_err(|e| AsterError::Signing(format!("Invalid private key hex: {e}")))?;
        if bytes.len() != 32 {
            return Err(AsterError::Signing(format!(
                "Private key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let secret_key = SecretKey::from_slice(&bytes)
            .map_err(|e| AsterError::Signing(format!("Invalid private key: {e}")))?;

        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);

        Ok(Self {
            secret_key,
            secp,
            address: public_key_to_address(&public_key),
            recovery: RecoveryIdPolicy::default(),
        })
    }

    pub fn with_recovery_policy(mut self, recovery: RecoveryIdPolicy) -> Self {
        self.recovery = recovery;
        self
    }

    /// Ethereum address of the signing key (lowercase, `0x`-prefixed).
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_key(&self.secp, &self.secret_key)
    }

    /// Sign an already-canonical message string.
    pub fn sign_message(&self, message: &str) -> Result<String, AsterError> {
        let digest = keccak256(message.as_bytes());
        let message = Message::from_digest(digest);
        let signature: RecoverableSignature =
            self.secp.sign_ecdsa_recoverable(&message, &self.secret_key);
        let (recovery_id, compact) = signature.serialize_compact();

        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&compact);
        bytes[64] = match self.recovery {
            RecoveryIdPolicy::Zero => 0,
            RecoveryIdPolicy::Computed => u8::try_from(recovery_id.to_i32())
                .map_err(|e| AsterError::Signing(format!("Invalid recovery id: {e}")))?,
        };

        Ok(format!("0x{}", hex::encode(bytes)))
    }

    /// Canonicalize `params` and sign the result.
    pub fn sign_params(&self, params: &BTreeMap<String, String>) -> Result<String, AsterError> {
        self.sign_message(&canonicalize(params))
    }
}

impl std::fmt::Debug for Web3Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Web3Signer")
            .field("address", &self.address)
            .field("recovery", &self.recovery)
            .finish_non_exhaustive()
    }
}

/// One-shot Web3 signature over a parameter map.
pub fn web3_sign(
    params: &BTreeMap<String, String>,
    private_key: &str,
    recovery: RecoveryIdPolicy,
) -> Result<String, AsterError> {
    Web3Signer::from_private_key(private_key)?
        .with_recovery_policy(recovery)
        .sign_params(params)
}

fn public_key_to_address(public_key: &PublicKey) -> String {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secp256k1::ecdsa::{RecoveryId, Signature};

    const KEY_ONE: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";
    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn params() -> BTreeMap<String, String> {
        [
            ("symbol", "BTCUSDT"),
            ("timestamp", "1758619433599"),
            ("nonce", "1758619433599123"),
            ("userAddress", "0xabc"),
            ("signerAddress", "0xdef"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn decode_signature(signature: &str) -> Vec<u8> {
        hex::decode(signature.strip_prefix("0x").unwrap()).unwrap()
    }

    #[test]
    fn test_keccak_is_not_sha3() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_ne!(
            hex::encode(keccak256(b"")),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
        assert_eq!(
            hex::encode(keccak256(b"abc")),
            "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        );
    }

    #[test]
    fn test_signer_address() {
        let signer = Web3Signer::from_private_key(KEY_ONE).unwrap();
        assert_eq!(signer.address(), "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");
    }

    #[test]
    fn test_signature_shape() {
        let signature = web3_sign(&params(), KEY, RecoveryIdPolicy::Zero).unwrap();
        assert!(signature.starts_with("0x"));
        assert_eq!(signature.len(), 132);
        assert!(signature.ends_with("00"));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let a = web3_sign(&params(), KEY, RecoveryIdPolicy::Zero).unwrap();
        let b = web3_sign(&params(), &format!("0x{KEY}"), RecoveryIdPolicy::Zero).unwrap();
        assert_eq!(a, b);

        let mut changed = params();
        changed.insert("symbol".into(), "ETHUSDT".into());
        assert_ne!(a, web3_sign(&changed, KEY, RecoveryIdPolicy::Zero).unwrap());
    }

    #[test]
    fn test_empty_values_do_not_change_signature() {
        let mut with_empty = params();
        with_empty.insert("clientId".into(), String::new());
        assert_eq!(
            web3_sign(&params(), KEY, RecoveryIdPolicy::Zero).unwrap(),
            web3_sign(&with_empty, KEY, RecoveryIdPolicy::Zero).unwrap()
        );
    }

    #[test]
    fn test_signature_verifies_against_signer_key() {
        let signer = Web3Signer::from_private_key(KEY).unwrap();
        let bytes = decode_signature(&signer.sign_params(&params()).unwrap());

        let secp = Secp256k1::verification_only();
        let message = Message::from_digest(keccak256(canonicalize(&params()).as_bytes()));
        let signature = Signature::from_compact(&bytes[..64]).unwrap();
        assert!(secp.verify_ecdsa(&message, &signature, &signer.public_key()).is_ok());
    }

    #[test]
    fn test_computed_recovery_id_recovers_public_key() {
        let signer = Web3Signer::from_private_key(KEY)
            .unwrap()
            .with_recovery_policy(RecoveryIdPolicy::Computed);
        let bytes = decode_signature(&signer.sign_params(&params()).unwrap());
        assert!(bytes[64] <= 1);

        let secp = Secp256k1::new();
        let message = Message::from_digest(keccak256(canonicalize(&params()).as_bytes()));
        let recovery_id = RecoveryId::from_i32(i32::from(bytes[64])).unwrap();
        let signature = RecoverableSignature::from_compact(&bytes[..64], recovery_id).unwrap();
        let recovered = secp.recover_ecdsa(&message, &signature).unwrap();
        assert_eq!(recovered, signer.public_key());
    }

    #[test]
    fn test_invalid_private_keys() {
        for key in ["", "0x", "zz", "0x1234", &"00".repeat(32)] {
            assert!(
                matches!(Web3Signer::from_private_key(key), Err(AsterError::Signing(_))),
                "key {key:?} should be rejected"
            );
        }
    }
}
