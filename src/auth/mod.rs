//! Authentication module for the Aster API.
//!
//! This module provides:
//! - Credential management with secure secret storage
//! - Timestamps, server clock offset and Web3 nonces
//! - HMAC-SHA256 and Web3 (Keccak-256 + ECDSA) request signatures

mod credentials;
mod nonce;
mod signature;
mod web3;

pub use credentials::{
    Credentials, CredentialsProvider, ENV_API_KEY, ENV_PRIVATE_KEY, ENV_SECRET_KEY,
    ENV_SIGNER_ADDRESS, ENV_USER_ADDRESS, EnvCredentials, StaticCredentials,
};
pub use nonce::{IncreasingNonce, NonceProvider, TimeOffset, now_micros, now_millis};
pub use signature::{canonicalize, encode_params, hmac_sign};
pub use web3::{RecoveryIdPolicy, Web3Signer, keccak256, web3_sign};
