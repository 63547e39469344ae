//! HMAC-SHA256 signing and parameter canonicalization.
//!
//! API-key requests are signed as:
//! ```text
//! hex(HMAC-SHA256(secret_key, encoded_query + encoded_body))
//! ```
//! with no separator between the two encoded strings. The lowercase hex digest
//! is appended to the query as the final `signature` parameter.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AsterError;

type HmacSha256 = Hmac<Sha256>;

/// Build the Web3 signing string: `k1=v1&k2=v2...` with keys in byte order,
/// empty values dropped, nothing URL-encoded.
///
/// The HMAC path does not use this; it signs the literal encoded query and
/// body, empty values included.
pub fn canonicalize(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// URL-encode a parameter map in key order (`application/x-www-form-urlencoded`).
pub fn encode_params(params: &BTreeMap<String, String>) -> Result<String, AsterError> {
    serde_urlencoded::to_string(params).map_err(|e| AsterError::Signing(e.to_string()))
}

/// Compute the lowercase hex HMAC-SHA256 of `payload` keyed by `secret_key`.
///
/// # Example
///
/// ```rust
/// use aster_api_client::auth::hmac_sign;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let signature = hmac_sign("my_secret", "symbol=BTCUSDT&timestamp=1700000000000")?;
/// assert_eq!(signature.len(), 64);
/// # Ok(())
/// # }
/// ```
pub fn hmac_sign(secret_key: &str, payload: &str) -> Result<String, AsterError> {
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| AsterError::Signing(format!("Invalid HMAC key: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
