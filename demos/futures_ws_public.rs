//! Example: Streaming futures market data.
//!
//! Subscribes to a combined book ticker stream and a kline stream, prints
//! events for a while and shuts both down.
//!
//! Run with: RUST_LOG=debug cargo run --example futures_ws_public

use std::time::Duration;

use aster_api_client::rest::Market;
use aster_api_client::types::KlineInterval;
use aster_api_client::ws::{StreamClient, WsConfig, streams};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // tungstenite logs through the `log` crate
    tracing_log::LogTracer::init()?;
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )?;

    let client = StreamClient::new(Market::Futures).config(
        WsConfig::builder()
            .ping_interval(Duration::from_secs(30))
            .build(),
    );

    let tickers = client
        .subscribe(
            streams::combined_book_ticker(&["BTCUSDT", "ETHUSDT"]),
            |ticker| {
                println!(
                    "[BookTicker] {} | Bid: {} | Ask: {}",
                    ticker.symbol, ticker.bid_price, ticker.ask_price
                );
            },
            |err| eprintln!("[Error] {err}"),
        )
        .await?;

    let klines = client
        .subscribe_reconnecting(
            streams::kline("BTCUSDT", KlineInterval::OneMinute),
            |event| {
                let k = event.kline;
                println!(
                    "[Kline] {} {} | O: {} C: {} | final: {}",
                    k.symbol,
                    k.interval.as_str(),
                    k.open,
                    k.close,
                    k.is_final
                );
            },
            |err| eprintln!("[Error] {err}"),
        )?;

    println!("Streaming for 30 seconds...");
    tokio::time::sleep(Duration::from_secs(30)).await;

    tickers.close().await;
    klines.close().await;
    println!("Streams closed.");

    Ok(())
}
