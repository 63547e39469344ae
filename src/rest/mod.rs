//! Request building, signing and HTTP transport shared by both markets.

pub mod client;
pub mod endpoints;
pub(crate) mod market;
pub mod request;
pub mod user_stream;

pub use client::{API_KEY_HEADER, RestClient, RestClientBuilder};
pub use endpoints::{Environment, Market};
pub use request::{PreparedRequest, Request, SecurityLevel};
pub use user_stream::{LISTEN_KEY_KEEPALIVE_INTERVAL, ListenKeyKeeper, UserDataStreamApi};
