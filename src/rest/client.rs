//! Signing HTTP client shared by the spot and futures services.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::{
    Credentials, CredentialsProvider, IncreasingNonce, NonceProvider, RecoveryIdPolicy,
    TimeOffset, Web3Signer, encode_params, hmac_sign,
};
use crate::error::{ApiError, AsterError};
use crate::rest::endpoints::{Environment, Market};
use crate::rest::request::{PreparedRequest, Request, RequestParts, SecurityLevel};

/// Header carrying the API key (`X-MBX-APIKEY`).
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-mbx-apikey");

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const SIGNATURE_PARAM: &str = "signature";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The Aster REST client.
///
/// Turns [`Request`]s into signed HTTP calls and classifies the responses.
/// Cloning is cheap; clones share the connection pool and the server time offset.
/// No request is ever retried.
///
/// # Example
///
/// ```rust,no_run
/// use aster_api_client::rest::{RestClient, SecurityLevel};
/// use aster_api_client::auth::StaticCredentials;
/// use reqwest::Method;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = RestClient::builder()
///         .credentials(Arc::new(StaticCredentials::hmac("api_key", "secret_key")))
///         .build()?;
///
///     let request = client
///         .build_request(Method::GET, "/api/v3/account", SecurityLevel::Signed)
///         .recv_window(5000);
///     let body = client.execute(request).await?;
///     println!("{}", String::from_utf8_lossy(&body));
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct RestClient {
    http_client: ClientWithMiddleware,
    base_url: String,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    nonce_provider: Arc<dyn NonceProvider>,
    time_offset: Arc<TimeOffset>,
    recovery: RecoveryIdPolicy,
    recv_window: Option<u64>,
    debug: bool,
}

impl RestClient {
    /// Create a new client builder (spot mainnet defaults).
    pub fn builder() -> RestClientBuilder {
        RestClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared server clock offset used for request timestamps.
    pub fn time_offset(&self) -> &TimeOffset {
        &self.time_offset
    }

    /// Start describing a request against this client's base URL.
    pub fn build_request(
        &self,
        method: Method,
        endpoint: impl Into<String>,
        security: SecurityLevel,
    ) -> Request {
        Request::new(method, endpoint, security)
    }

    fn credentials(&self) -> Result<&Credentials, AsterError> {
        self.credentials
            .as_deref()
            .map(|provider| provider.get_credentials())
            .ok_or(AsterError::MissingCredential("credentials"))
    }

    /// Attach authentication material and sign.
    ///
    /// Runs entirely before any I/O: a missing credential or a signing failure
    /// means nothing is sent.
    pub fn prepare(&self, request: Request) -> Result<PreparedRequest, AsterError> {
        let RequestParts {
            method,
            endpoint,
            security,
            mut query,
            form,
            recv_window,
            mut headers,
        } = request.into_parts();

        if let Some(window) = recv_window.or(self.recv_window) {
            query.insert("recvWindow".to_string(), window.to_string());
        }

        let body = encode_params(&form)?;
        if !body.is_empty() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        }

        let query_string = match security {
            SecurityLevel::None => encode_params(&query)?,
            SecurityLevel::ApiKey => {
                let api_key = self.credentials()?.api_key()?;
                headers.insert(API_KEY_HEADER, api_key_header(api_key)?);
                encode_params(&query)?
            }
            SecurityLevel::Signed => {
                if query.contains_key(SIGNATURE_PARAM) || form.contains_key(SIGNATURE_PARAM) {
                    return Err(AsterError::InvalidConfig(
                        "`signature` is added by the client and cannot be set on a signed request"
                            .into(),
                    ));
                }
                let credentials = self.credentials()?;
                match credentials {
                    Credentials::Hmac { .. } => {
                        let api_key = credentials.api_key()?;
                        let secret_key = credentials.expose_secret_key()?;
                        headers.insert(API_KEY_HEADER, api_key_header(api_key)?);

                        query.insert(
                            "timestamp".to_string(),
                            self.time_offset.timestamp_millis().to_string(),
                        );
                        let query_string = encode_params(&query)?;
                        let signature = hmac_sign(secret_key, &format!("{query_string}{body}"))?;
                        append_signature(query_string, &signature)
                    }
                    Credentials::Web3 {
                        user_address,
                        signer_address,
                        ..
                    } => {
                        if user_address.is_empty() {
                            return Err(AsterError::MissingCredential("user address"));
                        }
                        if signer_address.is_empty() {
                            return Err(AsterError::MissingCredential("signer address"));
                        }
                        let signer = Web3Signer::from_private_key(credentials.expose_private_key()?)?
                            .with_recovery_policy(self.recovery);

                        query.insert(
                            "timestamp".to_string(),
                            self.time_offset.timestamp_millis().to_string(),
                        );
                        query.insert("userAddress".to_string(), user_address.clone());
                        query.insert("signerAddress".to_string(), signer_address.clone());
                        query.insert(
                            "nonce".to_string(),
                            self.nonce_provider.next_nonce().to_string(),
                        );

                        // Body values win on key collision.
                        let mut signed = query.clone();
                        signed.extend(form.iter().map(|(k, v)| (k.clone(), v.clone())));
                        let signature = signer.sign_params(&signed)?;

                        append_signature(encode_params(&query)?, &signature)
                    }
                }
            }
        };

        let mut url = format!("{}{}", self.base_url, endpoint);
        if !query_string.is_empty() {
            url.push('?');
            url.push_str(&query_string);
        }

        Ok(PreparedRequest {
            method,
            url,
            headers,
            body: (!body.is_empty()).then_some(body),
        })
    }

    /// Sign, send and classify. Returns the raw body of a successful response.
    pub async fn execute(&self, request: Request) -> Result<Vec<u8>, AsterError> {
        let (_, body) = self.send(request).await?;
        Ok(body)
    }

    /// Like [`execute`](Self::execute), decoding the JSON body into `T`.
    ///
    /// A body that does not decode is reported as [`AsterError::MalformedResponse`].
    pub async fn call<T>(&self, request: Request) -> Result<T, AsterError>
    where
        T: DeserializeOwned,
    {
        let (status, body) = self.send(request).await?;
        serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, "failed to decode response body");
            malformed(status, &body)
        })
    }

    async fn send(&self, request: Request) -> Result<(StatusCode, Vec<u8>), AsterError> {
        let endpoint = request.endpoint().to_string();
        let prepared = self.prepare(request)?;

        if self.debug {
            debug!(
                method = %prepared.method,
                url = %prepared.url,
                body = prepared.body.as_deref().unwrap_or(""),
                "sending request"
            );
        } else {
            debug!(method = %prepared.method, endpoint = %endpoint, "sending request");
        }

        let mut builder = self
            .http_client
            .request(prepared.method, &prepared.url)
            .headers(prepared.headers);
        if let Some(body) = prepared.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if self.debug {
            debug!(status = status.as_u16(), body = %String::from_utf8_lossy(&body), "received response");
        }

        if status.as_u16() >= 400 {
            return Err(classify_error(status, &body));
        }
        Ok((status, body))
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("has_credentials", &self.credentials.is_some())
            .field("recv_window", &self.recv_window)
            .field("debug", &self.debug)
            .finish()
    }
}

fn api_key_header(api_key: &str) -> Result<HeaderValue, AsterError> {
    let mut value = HeaderValue::from_str(api_key)
        .map_err(|_| AsterError::InvalidConfig("API key is not a valid header value".into()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// The signature is always the final query parameter.
fn append_signature(query_string: String, signature: &str) -> String {
    if query_string.is_empty() {
        format!("{SIGNATURE_PARAM}={signature}")
    } else {
        format!("{query_string}&{SIGNATURE_PARAM}={signature}")
    }
}

fn malformed(status: StatusCode, body: &[u8]) -> AsterError {
    AsterError::MalformedResponse {
        status: status.as_u16(),
        body: String::from_utf8_lossy(body).into_owned(),
    }
}

/// Turn a >= 400 response into a structured error when the body allows it.
fn classify_error(status: StatusCode, body: &[u8]) -> AsterError {
    match ApiError::from_body(body) {
        Some(api_error) => {
            warn!(status = status.as_u16(), code = api_error.code, msg = %api_error.message, "API error");
            AsterError::Api(api_error)
        }
        None => {
            warn!(status = status.as_u16(), "unstructured error response");
            malformed(status, body)
        }
    }
}

/// Builder for [`RestClient`].
pub struct RestClientBuilder {
    market: Market,
    environment: Environment,
    intranet: bool,
    base_url: Option<String>,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    nonce_provider: Option<Arc<dyn NonceProvider>>,
    http_client: Option<reqwest::Client>,
    user_agent: Option<String>,
    timeout: Duration,
    local_address: Option<IpAddr>,
    recovery: RecoveryIdPolicy,
    recv_window: Option<u64>,
    debug: bool,
}

impl RestClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            market: Market::Spot,
            environment: Environment::Mainnet,
            intranet: false,
            base_url: None,
            credentials: None,
            nonce_provider: None,
            http_client: None,
            user_agent: None,
            timeout: DEFAULT_TIMEOUT,
            local_address: None,
            recovery: RecoveryIdPolicy::default(),
            recv_window: None,
            debug: false,
        }
    }

    /// Market whose default base URL is used when none is set explicitly.
    pub fn market(mut self, market: Market) -> Self {
        self.market = market;
        self
    }

    /// Production or testnet defaults.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Use the futures intranet host (mainnet only).
    pub fn intranet(mut self, intranet: bool) -> Self {
        self.intranet = intranet;
        self
    }

    /// Set the base URL (useful for testing with a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the credentials provider for authenticated requests.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set a custom nonce provider (Web3 signing).
    pub fn nonce_provider(mut self, provider: Arc<dyn NonceProvider>) -> Self {
        self.nonce_provider = Some(provider);
        self
    }

    /// Use a preconfigured HTTP client. Timeout, user agent and local address are then ignored.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Whole-request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bind outbound connections to this local address.
    pub fn local_address(mut self, address: IpAddr) -> Self {
        self.local_address = Some(address);
        self
    }

    /// How the recovery byte of Web3 signatures is filled.
    pub fn recovery_policy(mut self, recovery: RecoveryIdPolicy) -> Self {
        self.recovery = recovery;
        self
    }

    /// Default `recvWindow` for every request that does not set its own.
    pub fn recv_window(mut self, millis: u64) -> Self {
        self.recv_window = Some(millis);
        self
    }

    /// Log full URLs, bodies and responses at debug level.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<RestClient, AsterError> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => self
                .market
                .rest_base_url(self.environment, self.intranet)
                .to_string(),
        };
        url::Url::parse(&base_url)?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let reqwest_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut headers = HeaderMap::new();
                let user_agent = self
                    .user_agent
                    .unwrap_or_else(|| format!("aster-api-client/{}", env!("CARGO_PKG_VERSION")));
                let header_value = HeaderValue::from_str(&user_agent)
                    .unwrap_or_else(|_| HeaderValue::from_static("aster-api-client"));
                headers.insert(USER_AGENT, header_value);

                let mut builder = reqwest::Client::builder()
                    .default_headers(headers)
                    .timeout(self.timeout);
                if let Some(address) = self.local_address {
                    builder = builder.local_address(address);
                }
                builder.build()?
            }
        };

        let client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        let nonce_provider = self
            .nonce_provider
            .unwrap_or_else(|| Arc::new(IncreasingNonce::new()));

        Ok(RestClient {
            http_client: client,
            base_url,
            credentials: self.credentials,
            nonce_provider,
            time_offset: Arc::new(TimeOffset::new()),
            recovery: self.recovery,
            recv_window: self.recv_window,
            debug: self.debug,
        })
    }
}

impl Default for RestClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
