//! Common types used across the Aster client library.

pub mod common;
pub mod market;
pub mod serde_helpers;

pub use common::*;
pub use market::{BookTicker, BookTickers, Kline, KlinesRequest, ServerTime};
