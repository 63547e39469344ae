//! Aster Spot REST client.

use reqwest::Method;

use crate::error::AsterError;
use crate::rest::endpoints::{Market, spot};
use crate::rest::{RestClient, RestClientBuilder, Request, SecurityLevel, UserDataStreamApi, market, user_stream};
use crate::spot::types::SpotAccount;
use crate::types::{BookTicker, Kline, KlinesRequest, ServerTime};

/// The Aster Spot REST client.
///
/// A thin layer over [`RestClient`]: each call builds a [`Request`] with the
/// right security level and hands it over.
///
/// # Example
///
/// ```rust,no_run
/// use aster_api_client::spot::SpotClient;
/// use aster_api_client::types::{KlineInterval, KlinesRequest};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = SpotClient::new(SpotClient::builder().build()?);
///     let klines = client
///         .klines(&KlinesRequest::new("BTCUSDT", KlineInterval::OneHour).limit(10))
///         .await?;
///     println!("{} candles", klines.len());
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct SpotClient {
    rest: RestClient,
}

impl SpotClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// A [`RestClientBuilder`] with spot defaults.
    pub fn builder() -> RestClientBuilder {
        RestClient::builder().market(Market::Spot)
    }

    /// The underlying client, for endpoints without a dedicated method.
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// Test connectivity.
    pub async fn ping(&self) -> Result<(), AsterError> {
        market::ping(&self.rest, spot::PING).await
    }

    pub async fn server_time(&self) -> Result<ServerTime, AsterError> {
        market::server_time(&self.rest, spot::TIME).await
    }

    /// Measure the clock offset to the exchange and apply it to signed requests.
    pub async fn sync_server_time(&self) -> Result<i64, AsterError> {
        market::sync_server_time(&self.rest, spot::TIME).await
    }

    pub async fn klines(&self, request: &KlinesRequest) -> Result<Vec<Kline>, AsterError> {
        market::klines(&self.rest, spot::KLINES, request).await
    }

    /// Best bid/ask for one symbol, or for all symbols when `symbol` is `None`.
    pub async fn book_ticker(&self, symbol: Option<&str>) -> Result<Vec<BookTicker>, AsterError> {
        market::book_ticker(&self.rest, spot::BOOK_TICKER, symbol).await
    }

    /// Account balances and permissions.
    pub async fn account(&self) -> Result<SpotAccount, AsterError> {
        self.rest
            .call(Request::new(Method::GET, spot::ACCOUNT, SecurityLevel::Signed))
            .await
    }
}

impl From<RestClient> for SpotClient {
    fn from(rest: RestClient) -> Self {
        Self::new(rest)
    }
}

/// Spot listen keys only need the API key header.
impl UserDataStreamApi for SpotClient {
    async fn start_user_stream(&self) -> Result<String, AsterError> {
        user_stream::start(&self.rest, spot::USER_DATA_STREAM, SecurityLevel::ApiKey).await
    }

    async fn keepalive_user_stream(&self, listen_key: &str) -> Result<(), AsterError> {
        user_stream::keepalive(&self.rest, spot::USER_DATA_STREAM, SecurityLevel::ApiKey, listen_key)
            .await
    }

    async fn close_user_stream(&self, listen_key: &str) -> Result<(), AsterError> {
        user_stream::close(&self.rest, spot::USER_DATA_STREAM, SecurityLevel::ApiKey, listen_key)
            .await
    }
}
