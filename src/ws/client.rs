//! WebSocket client and connection settings.

use std::net::IpAddr;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::AsterError;
use crate::rest::endpoints::{Environment, Market};
use crate::ws::reconnect;
use crate::ws::stream::{self, StreamHandle};
use crate::ws::streams::StreamDescriptor;

/// Configuration for WebSocket connections.
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Interval between keep-alive pings (None = no pings).
    pub ping_interval: Option<Duration>,
    /// Upper bound for the closing handshake on shutdown.
    pub close_timeout: Duration,
    /// End the stream when no frame arrives for this long (None = wait forever).
    pub read_timeout: Option<Duration>,
    /// Local address to dial from.
    pub local_address: Option<IpAddr>,
    /// Initial backoff for [`StreamClient::subscribe_reconnecting`].
    pub initial_backoff: Duration,
    /// Maximum backoff for [`StreamClient::subscribe_reconnecting`].
    pub max_backoff: Duration,
    /// Maximum consecutive reconnection attempts (None = infinite).
    pub max_reconnect_attempts: Option<u32>,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            ping_interval: Some(Duration::from_secs(5)),
            close_timeout: Duration::from_secs(5),
            read_timeout: None,
            local_address: None,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            max_reconnect_attempts: None,
        }
    }
}

impl WsConfig {
    /// Create a builder for custom configuration.
    pub fn builder() -> WsConfigBuilder {
        WsConfigBuilder::new()
    }
}

/// Builder for [`WsConfig`].
#[derive(Debug, Clone, Default)]
pub struct WsConfigBuilder {
    config: WsConfig,
}

impl WsConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: WsConfig::default(),
        }
    }

    /// Set the keep-alive ping interval.
    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.config.ping_interval = Some(interval);
        self
    }

    /// Disable keep-alive pings.
    pub fn no_ping(mut self) -> Self {
        self.config.ping_interval = None;
        self
    }

    /// Set how long to wait for the closing handshake.
    pub fn close_timeout(mut self, timeout: Duration) -> Self {
        self.config.close_timeout = timeout;
        self
    }

    /// End the stream when no frame arrives within `timeout`.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = Some(timeout);
        self
    }

    /// Dial from a fixed local address.
    pub fn local_address(mut self, address: IpAddr) -> Self {
        self.config.local_address = Some(address);
        self
    }

    /// Set the reconnection backoff parameters.
    pub fn reconnect_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Give up after this many consecutive failed reconnections.
    pub fn max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.config.max_reconnect_attempts = Some(attempts);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> WsConfig {
        self.config
    }
}

/// Aster WebSocket client.
///
/// Each subscription gets its own connection, read loop and keep-alive loop.
///
/// # Example
///
/// ```rust,no_run
/// use aster_api_client::rest::Market;
/// use aster_api_client::ws::{StreamClient, streams};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = StreamClient::new(Market::Futures);
///     let handle = client
///         .subscribe(
///             streams::book_ticker("BTCUSDT"),
///             |ticker| println!("{} {} / {}", ticker.symbol, ticker.bid_price, ticker.ask_price),
///             |err| eprintln!("stream error: {err}"),
///         )
///         .await?;
///
///     tokio::time::sleep(std::time::Duration::from_secs(10)).await;
///     handle.stop_signal().stop();
///     handle.done().wait().await;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct StreamClient {
    market: Market,
    base_url: String,
    config: WsConfig,
}

impl StreamClient {
    /// Client for the mainnet endpoint of `market`.
    pub fn new(market: Market) -> Self {
        Self {
            market,
            base_url: market.ws_base_url(Environment::Mainnet).to_string(),
            config: WsConfig::default(),
        }
    }

    /// Switch to the endpoint of `environment`.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.base_url = self.market.ws_base_url(environment).to_string();
        self
    }

    /// Override the endpoint (useful for testing).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn config(mut self, config: WsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn market(&self) -> Market {
        self.market
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    pub fn ws_config(&self) -> &WsConfig {
        &self.config
    }

    /// Dial `descriptor` and start delivering its events.
    ///
    /// `handler` is called in frame order on the read task. `err_handler`
    /// receives decode failures (the stream continues) and the error that
    /// ended the stream, if any. Returns once the connection is open.
    pub async fn subscribe<T, H, E>(
        &self,
        descriptor: StreamDescriptor<T>,
        handler: H,
        err_handler: E,
    ) -> Result<StreamHandle, AsterError>
    where
        T: DeserializeOwned + Send + 'static,
        H: FnMut(T) + Send + 'static,
        E: Fn(AsterError) + Send + Sync + 'static,
    {
        let url = descriptor.url(&self.base_url)?;
        stream::spawn(url, descriptor, handler, err_handler, &self.config).await
    }

    /// Like [`subscribe`](Self::subscribe), but dials again with exponential
    /// backoff whenever the connection drops. Dial failures go to `err_handler`.
    pub fn subscribe_reconnecting<T, H, E>(
        &self,
        descriptor: StreamDescriptor<T>,
        handler: H,
        err_handler: E,
    ) -> Result<StreamHandle, AsterError>
    where
        T: DeserializeOwned + Send + 'static,
        H: FnMut(T) + Send + 'static,
        E: Fn(AsterError) + Send + Sync + 'static,
    {
        reconnect::ReconnectingStream::spawn(self.clone(), descriptor, handler, err_handler)
    }
}
