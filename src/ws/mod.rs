//! WebSocket market and user data streams.
//!
//! - [`streams`] builds descriptors for each stream type
//! - [`StreamClient::subscribe`] dials one and returns a [`StreamHandle`]
//! - [`reconnect`] adds opt-in reconnection

pub mod client;
pub mod messages;
pub mod reconnect;
pub mod stream;
pub mod streams;

pub use client::{StreamClient, WsConfig, WsConfigBuilder};
pub use messages::*;
pub use reconnect::ReconnectingStream;
pub use stream::{DoneSignal, StopSignal, StreamHandle, StreamState};
pub use streams::StreamDescriptor;
