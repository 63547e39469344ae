//! Public market-data calls shared by the spot and futures services.

use reqwest::Method;
use tracing::debug;

use crate::auth::now_millis;
use crate::error::AsterError;
use crate::rest::client::RestClient;
use crate::rest::request::{Request, SecurityLevel};
use crate::types::{BookTicker, BookTickers, Kline, KlinesRequest, ServerTime};

pub(crate) async fn ping(rest: &RestClient, path: &str) -> Result<(), AsterError> {
    rest.execute(Request::new(Method::GET, path, SecurityLevel::None))
        .await
        .map(|_| ())
}

pub(crate) async fn server_time(rest: &RestClient, path: &str) -> Result<ServerTime, AsterError> {
    rest.call(Request::new(Method::GET, path, SecurityLevel::None))
        .await
}

/// Measure the server clock against the local one and store the offset on `rest`.
///
/// The local reference is the midpoint of the round trip.
pub(crate) async fn sync_server_time(rest: &RestClient, path: &str) -> Result<i64, AsterError> {
    let before = now_millis();
    let server = server_time(rest, path).await?;
    let after = now_millis();

    let offset = rest
        .time_offset()
        .observe(server.server_time, before + (after - before) / 2);
    debug!(offset_ms = offset, round_trip_ms = after - before, "synchronized server time");
    Ok(offset)
}

pub(crate) async fn klines(
    rest: &RestClient,
    path: &str,
    request: &KlinesRequest,
) -> Result<Vec<Kline>, AsterError> {
    let request = Request::new(Method::GET, path, SecurityLevel::None)
        .set_param("symbol", &request.symbol)
        .set_param("interval", request.interval)
        .set_param_opt("startTime", request.start_time)
        .set_param_opt("endTime", request.end_time)
        .set_param_opt("limit", request.limit);
    rest.call(request).await
}

pub(crate) async fn book_ticker(
    rest: &RestClient,
    path: &str,
    symbol: Option<&str>,
) -> Result<Vec<BookTicker>, AsterError> {
    let request = Request::new(Method::GET, path, SecurityLevel::None).set_param_opt("symbol", symbol);
    rest.call::<BookTickers>(request)
        .await
        .map(BookTickers::into_vec)
}
