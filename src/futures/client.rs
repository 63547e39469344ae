//! Aster Futures REST client.

use reqwest::Method;

use crate::error::AsterError;
use crate::futures::types::{Balance, FuturesAccount, SymbolLeverage};
use crate::rest::endpoints::{Market, futures};
use crate::rest::{RestClient, RestClientBuilder, Request, SecurityLevel, UserDataStreamApi, market, user_stream};
use crate::types::{BookTicker, Kline, KlinesRequest, ServerTime};

/// The Aster Futures REST client.
///
/// Works with either credential kind; with Web3 credentials every signed
/// call is authorized by the signer wallet instead of an API key.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use aster_api_client::auth::StaticCredentials;
/// use aster_api_client::futures::FuturesClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let credentials = Arc::new(StaticCredentials::hmac("api_key", "secret_key"));
///     let client = FuturesClient::new(FuturesClient::builder().credentials(credentials).build()?);
///     client.sync_server_time().await?;
///     let leverage = client.change_leverage("BTCUSDT", 10).await?;
///     println!("{} now at {}x", leverage.symbol, leverage.leverage);
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct FuturesClient {
    rest: RestClient,
}

impl FuturesClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// A [`RestClientBuilder`] with futures defaults.
    pub fn builder() -> RestClientBuilder {
        RestClient::builder().market(Market::Futures)
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    pub async fn ping(&self) -> Result<(), AsterError> {
        market::ping(&self.rest, futures::PING).await
    }

    pub async fn server_time(&self) -> Result<ServerTime, AsterError> {
        market::server_time(&self.rest, futures::TIME).await
    }

    /// Measure the clock offset to the exchange and apply it to signed requests.
    pub async fn sync_server_time(&self) -> Result<i64, AsterError> {
        market::sync_server_time(&self.rest, futures::TIME).await
    }

    pub async fn klines(&self, request: &KlinesRequest) -> Result<Vec<Kline>, AsterError> {
        market::klines(&self.rest, futures::KLINES, request).await
    }

    pub async fn book_ticker(&self, symbol: Option<&str>) -> Result<Vec<BookTicker>, AsterError> {
        market::book_ticker(&self.rest, futures::BOOK_TICKER, symbol).await
    }

    /// Wallet balances per asset.
    pub async fn balance(&self) -> Result<Vec<Balance>, AsterError> {
        self.rest
            .call(Request::new(Method::GET, futures::BALANCE, SecurityLevel::Signed))
            .await
    }

    /// Set the initial leverage of `symbol`.
    ///
    /// The symbol travels in the query string and the leverage in the form body.
    pub async fn change_leverage(
        &self,
        symbol: &str,
        leverage: u32,
    ) -> Result<SymbolLeverage, AsterError> {
        let request = Request::new(Method::POST, futures::LEVERAGE, SecurityLevel::Signed)
            .set_param("symbol", symbol)
            .set_form_param("leverage", leverage);
        self.rest.call(request).await
    }

    pub async fn account(&self) -> Result<FuturesAccount, AsterError> {
        self.rest
            .call(Request::new(Method::GET, futures::ACCOUNT, SecurityLevel::Signed))
            .await
    }
}

impl From<RestClient> for FuturesClient {
    fn from(rest: RestClient) -> Self {
        Self::new(rest)
    }
}

/// Futures listen keys are signed.
impl UserDataStreamApi for FuturesClient {
    async fn start_user_stream(&self) -> Result<String, AsterError> {
        user_stream::start(&self.rest, futures::LISTEN_KEY, SecurityLevel::Signed).await
    }

    async fn keepalive_user_stream(&self, listen_key: &str) -> Result<(), AsterError> {
        user_stream::keepalive(&self.rest, futures::LISTEN_KEY, SecurityLevel::Signed, listen_key)
            .await
    }

    async fn close_user_stream(&self, listen_key: &str) -> Result<(), AsterError> {
        user_stream::close(&self.rest, futures::LISTEN_KEY, SecurityLevel::Signed, listen_key)
            .await
    }
}
