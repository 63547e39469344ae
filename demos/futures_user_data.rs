//! Example: Futures user data stream.
//!
//! Creates a listen key, keeps it alive in the background and prints
//! account and order events.
//!
//! Requires `ASTER_API_KEY`/`ASTER_SECRET_KEY` or the Web3 variables
//! (`ASTER_USER_ADDRESS`, `ASTER_SIGNER_ADDRESS`, `ASTER_PRIVATE_KEY`).
//!
//! Run with: cargo run --example futures_user_data

use std::sync::Arc;
use std::time::Duration;

use aster_api_client::auth::EnvCredentials;
use aster_api_client::futures::{FuturesClient, FuturesUserDataEvent};
use aster_api_client::rest::{ListenKeyKeeper, Market, UserDataStreamApi};
use aster_api_client::ws::{StreamClient, streams};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt::init();

    let credentials = EnvCredentials::from_env()?;
    let client = Arc::new(FuturesClient::new(
        FuturesClient::builder()
            .credentials(Arc::new(credentials))
            .build()?,
    ));
    client.sync_server_time().await?;

    let listen_key = client.start_user_stream().await?;
    let keeper = ListenKeyKeeper::spawn(client.clone(), listen_key.clone());

    let handle = StreamClient::new(Market::Futures)
        .subscribe(
            streams::user_data::<FuturesUserDataEvent>(&listen_key),
            |event| match event {
                FuturesUserDataEvent::AccountUpdate(update) => {
                    for balance in &update.update.balances {
                        println!("[Balance] {} wallet={}", balance.asset, balance.wallet_balance);
                    }
                }
                FuturesUserDataEvent::OrderTradeUpdate(update) => {
                    let order = &update.order;
                    println!(
                        "[Order] {} {} {:?} status={:?}",
                        order.symbol, order.order_id, order.side, order.status
                    );
                }
                FuturesUserDataEvent::ListenKeyExpired(_) => {
                    println!("[ListenKey] expired");
                }
                other => println!("[{}]", other.event_type()),
            },
            |err| eprintln!("[Error] {err}"),
        )
        .await?;

    tokio::time::sleep(Duration::from_secs(60)).await;

    handle.close().await;
    keeper.stop().await;
    client.close_user_stream(&listen_key).await?;

    Ok(())
}
