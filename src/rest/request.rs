//! Request description and the signed form it is turned into.

use std::collections::BTreeMap;
use std::fmt::Display;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// How much authentication material a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityLevel {
    /// Public endpoint, nothing attached.
    #[default]
    None,
    /// `X-MBX-APIKEY` header only, no signature.
    ApiKey,
    /// Credentials, timestamp and signature.
    Signed,
}

/// An unsigned request: method, path, security level and parameters.
///
/// Query and form parameters are kept in sorted maps; setting an existing key
/// replaces its value.
///
/// # Example
///
/// ```rust
/// use aster_api_client::rest::{Request, SecurityLevel};
/// use reqwest::Method;
///
/// let request = Request::new(Method::POST, "/fapi/v1/leverage", SecurityLevel::Signed)
///     .set_param("symbol", "BTCUSDT")
///     .set_form_param("leverage", 10);
/// assert_eq!(request.query().get("symbol").map(String::as_str), Some("BTCUSDT"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    endpoint: String,
    security: SecurityLevel,
    query: BTreeMap<String, String>,
    form: BTreeMap<String, String>,
    recv_window: Option<u64>,
    headers: HeaderMap,
}

impl Request {
    pub fn new(method: Method, endpoint: impl Into<String>, security: SecurityLevel) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            security,
            query: BTreeMap::new(),
            form: BTreeMap::new(),
            recv_window: None,
            headers: HeaderMap::new(),
        }
    }

    /// Set a query parameter.
    pub fn set_param(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.query.insert(key.into(), value.to_string());
        self
    }

    /// Set a query parameter when `value` is present.
    pub fn set_param_opt<V: Display>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set_param(key, value),
            None => self,
        }
    }

    /// Set several query parameters.
    pub fn set_params<K, V, I>(mut self, params: I) -> Self
    where
        K: Into<String>,
        V: Display,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in params {
            self.query.insert(key.into(), value.to_string());
        }
        self
    }

    /// Set a form (body) parameter.
    pub fn set_form_param(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.form.insert(key.into(), value.to_string());
        self
    }

    /// Set several form (body) parameters.
    pub fn set_form_params<K, V, I>(mut self, params: I) -> Self
    where
        K: Into<String>,
        V: Display,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in params {
            self.form.insert(key.into(), value.to_string());
        }
        self
    }

    /// Validity window in milliseconds, sent as `recvWindow`.
    pub fn recv_window(mut self, millis: u64) -> Self {
        self.recv_window = Some(millis);
        self
    }

    /// Add an extra header, replacing any existing value.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn security(&self) -> SecurityLevel {
        self.security
    }

    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    pub fn form(&self) -> &BTreeMap<String, String> {
        &self.form
    }

    pub(crate) fn into_parts(self) -> RequestParts {
        RequestParts {
            method: self.method,
            endpoint: self.endpoint,
            security: self.security,
            query: self.query,
            form: self.form,
            recv_window: self.recv_window,
            headers: self.headers,
        }
    }
}

pub(crate) struct RequestParts {
    pub method: Method,
    pub endpoint: String,
    pub security: SecurityLevel,
    pub query: BTreeMap<String, String>,
    pub form: BTreeMap<String, String>,
    pub recv_window: Option<u64>,
    pub headers: HeaderMap,
}

/// A request ready to send: final URL (signature included), headers and body.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// URL-encoded form body, if any form parameters were set.
    pub body: Option<String>,
}

impl PreparedRequest {
    /// The query string part of the URL (without `?`).
    pub fn query_string(&self) -> &str {
        self.url.split_once('?').map(|(_, q)| q).unwrap_or("")
    }

    /// Value of the `signature` query parameter, if signed.
    pub fn signature(&self) -> Option<&str> {
        self.query_string()
            .rsplit('&')
            .find_map(|pair| pair.strip_prefix("signature="))
    }
}
