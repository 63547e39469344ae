//! Example: Fetching public market data from Aster.
//!
//! Public endpoints need no credentials.
//!
//! Run with: cargo run --example public_data

use aster_api_client::futures::FuturesClient;
use aster_api_client::rest::Market;
use aster_api_client::spot::SpotClient;
use aster_api_client::types::{KlineInterval, KlinesRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let spot = SpotClient::new(SpotClient::builder().build()?);

    println!("=== Server Time (spot) ===");
    let time = spot.server_time().await?;
    println!("Server time: {} ms", time.server_time);

    println!("\n=== Book Ticker (BTCUSDT, spot) ===");
    for ticker in spot.book_ticker(Some("BTCUSDT")).await? {
        println!(
            "{}: bid {} x {} / ask {} x {}",
            ticker.symbol, ticker.bid_price, ticker.bid_qty, ticker.ask_price, ticker.ask_qty
        );
    }

    let futures = FuturesClient::new(FuturesClient::builder().market(Market::Futures).build()?);

    println!("\n=== Klines (BTCUSDT 1h, futures) ===");
    let request = KlinesRequest::new("BTCUSDT", KlineInterval::OneHour).limit(5);
    for kline in futures.klines(&request).await? {
        println!(
            "{}: O={} H={} L={} C={} V={} trades={}",
            kline.open_time,
            kline.open,
            kline.high,
            kline.low,
            kline.close,
            kline.volume,
            kline.number_of_trades
        );
    }

    let offset = futures.sync_server_time().await?;
    println!("\nLocal clock offset: {offset} ms");

    Ok(())
}
