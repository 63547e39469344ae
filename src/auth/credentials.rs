//! Credential management for Aster API authentication.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use crate::error::AsterError;

/// Environment variable holding the HMAC API key.
pub const ENV_API_KEY: &str = "ASTER_API_KEY";
/// Environment variable holding the HMAC secret key.
pub const ENV_SECRET_KEY: &str = "ASTER_SECRET_KEY";
/// Environment variable holding the Web3 user (account) address.
pub const ENV_USER_ADDRESS: &str = "ASTER_USER_ADDRESS";
/// Environment variable holding the Web3 signer address.
pub const ENV_SIGNER_ADDRESS: &str = "ASTER_SIGNER_ADDRESS";
/// Environment variable holding the hex-encoded Web3 private key.
pub const ENV_PRIVATE_KEY: &str = "ASTER_PRIVATE_KEY";

/// Authentication material for one client.
///
/// A client signs in exactly one mode, so the two credential shapes are
/// alternatives rather than optional fields on one struct.
#[derive(Clone)]
pub enum Credentials {
    /// API key + secret, signed with HMAC-SHA256.
    Hmac {
        /// The API key, sent in the `X-MBX-APIKEY` header.
        api_key: String,
        secret_key: SecretString,
    },
    /// Wallet addresses + private key, signed with Keccak-256 and ECDSA.
    Web3 {
        /// Address of the account the request acts on.
        user_address: String,
        /// Address of the key that signs.
        signer_address: String,
        private_key: SecretString,
    },
}

impl Credentials {
    /// Create HMAC credentials from an API key and secret.
    pub fn hmac(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Credentials::Hmac {
            api_key: api_key.into(),
            secret_key: SecretString::from(secret_key.into()),
        }
    }

    /// Create Web3 credentials. The private key is hex, with or without a `0x` prefix.
    pub fn web3(
        user_address: impl Into<String>,
        signer_address: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Credentials::Web3 {
            user_address: user_address.into(),
            signer_address: signer_address.into(),
            private_key: SecretString::from(private_key.into()),
        }
    }

    /// Whether requests are signed in Web3 mode.
    pub fn is_web3(&self) -> bool {
        matches!(self, Credentials::Web3 { .. })
    }

    /// The API key, if these are HMAC credentials with a non-empty key.
    pub fn api_key(&self) -> Result<&str, AsterError> {
        match self {
            Credentials::Hmac { api_key, .. } if !api_key.is_empty() => Ok(api_key),
            _ => Err(AsterError::MissingCredential("api key")),
        }
    }

    /// Get the HMAC secret for signing.
    ///
    /// This method exposes the secret - use carefully.
    pub fn expose_secret_key(&self) -> Result<&str, AsterError> {
        match self {
            Credentials::Hmac { secret_key, .. } if !secret_key.expose_secret().is_empty() => {
                Ok(secret_key.expose_secret())
            }
            _ => Err(AsterError::MissingCredential("secret key")),
        }
    }

    /// Get the Web3 private key for signing.
    ///
    /// This method exposes the secret - use carefully.
    pub fn expose_private_key(&self) -> Result<&str, AsterError> {
        match self {
            Credentials::Web3 { private_key, .. } if !private_key.expose_secret().is_empty() => {
                Ok(private_key.expose_secret())
            }
            _ => Err(AsterError::MissingCredential("private key")),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Hmac { api_key, .. } => f
                .debug_struct("Credentials::Hmac")
                .field("api_key", api_key)
                .field("secret_key", &"[REDACTED]")
                .finish(),
            Credentials::Web3 {
                user_address,
                signer_address,
                ..
            } => f
                .debug_struct("Credentials::Web3")
                .field("user_address", user_address)
                .field("signer_address", signer_address)
                .field("private_key", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Trait for providing API credentials.
///
/// Implement this trait to customize how credentials are retrieved,
/// for example from a secrets manager.
pub trait CredentialsProvider: Send + Sync {
    /// Get the credentials.
    fn get_credentials(&self) -> &Credentials;
}

/// Static credentials provider that holds credentials directly.
#[derive(Clone, Debug)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    /// Wrap already-built credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// HMAC credentials provider.
    pub fn hmac(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self::new(Credentials::hmac(api_key, secret_key))
    }

    /// Web3 credentials provider.
    pub fn web3(
        user_address: impl Into<String>,
        signer_address: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self::new(Credentials::web3(user_address, signer_address, private_key))
    }
}

impl CredentialsProvider for StaticCredentials {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}

impl CredentialsProvider for Arc<StaticCredentials> {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}

/// Credentials provider that reads from environment variables.
///
/// HMAC variables (`ASTER_API_KEY`, `ASTER_SECRET_KEY`) take precedence over the
/// Web3 ones (`ASTER_USER_ADDRESS`, `ASTER_SIGNER_ADDRESS`, `ASTER_PRIVATE_KEY`).
#[derive(Debug)]
pub struct EnvCredentials {
    credentials: Credentials,
}

impl EnvCredentials {
    /// Read credentials from the default environment variables.
    pub fn from_env() -> Result<Self, AsterError> {
        Self::try_from_env().ok_or(AsterError::MissingCredential(
            "ASTER_API_KEY/ASTER_SECRET_KEY or ASTER_USER_ADDRESS/ASTER_SIGNER_ADDRESS/ASTER_PRIVATE_KEY",
        ))
    }

    /// Try to read credentials from the default environment variables.
    ///
    /// Returns `None` if neither complete set is present.
    pub fn try_from_env() -> Option<Self> {
        Self::try_hmac_from_env_vars(ENV_API_KEY, ENV_SECRET_KEY).or_else(|| {
            Self::try_web3_from_env_vars(ENV_USER_ADDRESS, ENV_SIGNER_ADDRESS, ENV_PRIVATE_KEY)
        })
    }

    /// Try to create HMAC credentials from custom environment variable names.
    pub fn try_hmac_from_env_vars(key_var: &str, secret_var: &str) -> Option<Self> {
        let api_key = std::env::var(key_var).ok()?;
        let secret_key = std::env::var(secret_var).ok()?;

        Some(Self {
            credentials: Credentials::hmac(api_key, secret_key),
        })
    }

    /// Try to create Web3 credentials from custom environment variable names.
    pub fn try_web3_from_env_vars(user_var: &str, signer_var: &str, key_var: &str) -> Option<Self> {
        let user_address = std::env::var(user_var).ok()?;
        let signer_address = std::env::var(signer_var).ok()?;
        let private_key = std::env::var(key_var).ok()?;

        Some(Self {
            credentials: Credentials::web3(user_address, signer_address, private_key),
        })
    }
}

impl CredentialsProvider for EnvCredentials {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacted() {
        let creds = Credentials::hmac("my_key", "super_secret");
        let debug_str = format!("{:?}", creds);
        assert!(debug_str.contains("my_key"));
        assert!(!debug_str.contains("super_secret"));
        assert!(debug_str.contains("[REDACTED]"));

        let creds = Credentials::web3("0xuser", "0xsigner", "deadbeef");
        let debug_str = format!("{:?}", creds);
        assert!(debug_str.contains("0xsigner"));
        assert!(!debug_str.contains("deadbeef"));
    }

    #[test]
    fn test_static_credentials() {
        let provider = StaticCredentials::hmac("key", "secret");
        let creds = provider.get_credentials();
        assert_eq!(creds.api_key().unwrap(), "key");
        assert_eq!(creds.expose_secret_key().unwrap(), "secret");
        assert!(!creds.is_web3());
    }

    #[test]
    fn test_empty_fields_are_missing() {
        let creds = Credentials::hmac("", "secret");
        assert!(matches!(
            creds.api_key(),
            Err(AsterError::MissingCredential(_))
        ));

        let creds = Credentials::web3("0xuser", "0xsigner", "");
        assert!(creds.is_web3());
        assert!(creds.api_key().is_err());
        assert!(creds.expose_private_key().is_err());
    }

    #[test]
    fn test_env_credentials_need_every_var() {
        // PATH is always present; the other names are never set.
        assert!(EnvCredentials::try_hmac_from_env_vars("PATH", "ASTER_TEST_UNSET_SECRET").is_none());
        assert!(EnvCredentials::try_hmac_from_env_vars("ASTER_TEST_UNSET_KEY", "PATH").is_none());
        assert!(EnvCredentials::try_web3_from_env_vars("PATH", "PATH", "ASTER_TEST_UNSET_KEY").is_none());

        let provider = EnvCredentials::try_hmac_from_env_vars("PATH", "PATH").unwrap();
        let path = std::env::var("PATH").unwrap();
        assert_eq!(provider.get_credentials().api_key().unwrap(), path);
        assert!(!provider.get_credentials().is_web3());
    }
}
