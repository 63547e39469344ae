//! # Aster API Client
//!
//! An async Rust client library for the Aster exchange REST and WebSocket APIs.
//!
//! ## Features
//!
//! - Spot and Futures REST clients over one signing transport
//! - HMAC-SHA256 API keys or Web3 wallet signatures
//! - WebSocket streams with keep-alive, combined streams and cooperative shutdown
//! - Structured API errors
//! - Financial precision with `rust_decimal`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aster_api_client::spot::SpotClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SpotClient::new(SpotClient::builder().build()?);
//!     let time = client.server_time().await?;
//!     println!("Server time: {:?}", time.to_datetime());
//!     Ok(())
//! }
//! ```
//!
//! Endpoints without a dedicated method go through the generic request path:
//!
//! ```rust,no_run
//! use aster_api_client::rest::{RestClient, Market, SecurityLevel};
//! use reqwest::Method;
//!
//! # async fn run() -> aster_api_client::Result<()> {
//! let client = RestClient::builder().market(Market::Futures).build()?;
//! let request = client
//!     .build_request(Method::GET, "/fapi/v1/depth", SecurityLevel::None)
//!     .set_param("symbol", "BTCUSDT")
//!     .set_param("limit", 5);
//! let body = client.execute(request).await?;
//! println!("{}", String::from_utf8_lossy(&body));
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;
pub mod futures;
pub mod rest;
pub mod spot;
pub mod types;
pub mod ws;

// Re-export commonly used types at crate root
pub use error::{ApiError, AsterError};
pub use types::common::{OrderStatus, OrderType, Side};

/// Result type alias using AsterError
pub type Result<T> = std::result::Result<T, AsterError>;
