//! Aster Spot API.
//!
//! - [`SpotClient`] - REST calls against `/api/v3`
//! - [`SpotUserDataEvent`] - events of a spot listen key stream

pub mod client;
pub mod events;
pub mod types;

pub use client::SpotClient;
pub use events::SpotUserDataEvent;
pub use types::{SpotAccount, SpotBalance};
