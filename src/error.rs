//! Error types for the Aster client library.

use serde::Deserialize;
use thiserror::Error;

/// The main error type for all Aster client operations.
#[derive(Error, Debug)]
pub enum AsterError {
    /// A required credential field is absent for the requested security level.
    ///
    /// Raised while preparing a request, before anything is sent.
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    /// Signing failed (bad private key encoding, invalid key, signer failure).
    #[error("Signing failed: {0}")]
    Signing(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP request with middleware failed
    #[error("HTTP request failed: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// The exchange answered with a structured `{code, msg}` error.
    #[error("Aster API error: {0}")]
    Api(ApiError),

    /// The exchange answered with a body that could not be understood.
    #[error("Malformed response (HTTP {status}): {body}")]
    MalformedResponse {
        /// HTTP status code of the response.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Stream failure that is not a protocol error (keep-alive, idle timeout, decode).
    #[error("Stream error: {0}")]
    Stream(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AsterError {
    /// The structured API error, if this is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            AsterError::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Error body returned by the exchange for non-2xx responses.
///
/// The wire shape is `{"code": -1021, "msg": "Timestamp for this request is outside of the recvWindow."}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    /// Numeric error code (negative for most exchange errors).
    pub code: i64,
    /// Human-readable error message
    #[serde(rename = "msg")]
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<APIError> code={}, msg={}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new API error from code and message.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Try to decode an error body. Returns `None` unless both fields are present.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        serde_json::from_slice::<ApiError>(body).ok()
    }

    /// The request timestamp fell outside `recvWindow`; resync the clock before retrying.
    pub fn is_timestamp_outside_recv_window(&self) -> bool {
        self.code == error_codes::TIMESTAMP_OUTSIDE_RECV_WINDOW
    }

    /// Check if this is an invalid signature error.
    pub fn is_invalid_signature(&self) -> bool {
        self.code == error_codes::INVALID_SIGNATURE
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        self.code == error_codes::TOO_MANY_REQUESTS || self.code == error_codes::TOO_MANY_ORDERS
    }

    /// The listen key used by a user data request does not exist (expired or closed).
    pub fn is_listen_key_missing(&self) -> bool {
        self.code == error_codes::LISTEN_KEY_NOT_FOUND
    }
}

/// Known Aster error codes.
pub mod error_codes {
    pub const UNKNOWN: i64 = -1000;
    pub const DISCONNECTED: i64 = -1001;
    pub const UNAUTHORIZED: i64 = -1002;
    pub const TOO_MANY_REQUESTS: i64 = -1003;
    pub const TOO_MANY_ORDERS: i64 = -1015;
    pub const TIMESTAMP_OUTSIDE_RECV_WINDOW: i64 = -1021;
    pub const INVALID_SIGNATURE: i64 = -1022;
    pub const MANDATORY_PARAM_MISSING: i64 = -1102;
    pub const LISTEN_KEY_NOT_FOUND: i64 = -1125;
    pub const INVALID_API_KEY: i64 = -2015;
}
