//! Aster Futures API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aster_api_client::futures::{FuturesClient, FuturesUserDataEvent};
//! use aster_api_client::rest::{Market, UserDataStreamApi};
//! use aster_api_client::ws::{StreamClient, streams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rest = FuturesClient::new(FuturesClient::builder().build()?);
//!     let listen_key = rest.start_user_stream().await?;
//!
//!     let handle = StreamClient::new(Market::Futures)
//!         .subscribe(
//!             streams::user_data::<FuturesUserDataEvent>(&listen_key),
//!             |event| println!("{}", event.event_type()),
//!             |err| eprintln!("{err}"),
//!         )
//!         .await?;
//!     handle.done().wait().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! Signed futures calls accept either credential kind:
//!
//! ```text
//! HMAC: signature = hex(HMAC-SHA256(secret, query + body))
//! Web3: signature = 0x || hex(r || s || v) over Keccak256(sorted params)
//! ```

pub mod client;
pub mod events;
pub mod types;

pub use client::FuturesClient;
pub use events::FuturesUserDataEvent;
pub use types::{Balance, FuturesAccount, SymbolLeverage};
