//! Aster REST and WebSocket base URLs and endpoint paths.

/// Spot REST API, production.
pub const SPOT_BASE_URL: &str = "https://sapi.asterdex.com";
/// Spot REST API, testnet.
pub const SPOT_TESTNET_URL: &str = "https://testnet-sapi.asterdex.com";

/// Futures REST API, production.
pub const FUTURES_BASE_URL: &str = "https://fapi.asterdex.com";
/// Futures REST API, intranet (co-located) host.
pub const FUTURES_INTRANET_URL: &str = "https://fapi3.asterdex.com";
/// Futures REST API, testnet.
pub const FUTURES_TESTNET_URL: &str = "https://testnet.asterdex.com";

/// Spot market streams, production.
pub const SPOT_WS_URL: &str = "wss://sstream.asterdex.com";
/// Futures market streams, production.
pub const FUTURES_WS_URL: &str = "wss://fstream.asterdex.com";
/// Market streams, testnet (spot and futures).
pub const TESTNET_WS_URL: &str = "wss://testnet.asterdex.com";

/// Which product the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Market {
    #[default]
    Spot,
    Futures,
}

/// Production or testnet. Selected per client; there is no process-wide switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Mainnet,
    Testnet,
}

impl Market {
    /// Default REST base URL for this market.
    pub fn rest_base_url(self, environment: Environment, intranet: bool) -> &'static str {
        match (self, environment) {
            (Market::Spot, Environment::Mainnet) => SPOT_BASE_URL,
            (Market::Spot, Environment::Testnet) => SPOT_TESTNET_URL,
            (Market::Futures, Environment::Mainnet) if intranet => FUTURES_INTRANET_URL,
            (Market::Futures, Environment::Mainnet) => FUTURES_BASE_URL,
            (Market::Futures, Environment::Testnet) => FUTURES_TESTNET_URL,
        }
    }

    /// Default WebSocket base URL for this market.
    pub fn ws_base_url(self, environment: Environment) -> &'static str {
        match (self, environment) {
            (_, Environment::Testnet) => TESTNET_WS_URL,
            (Market::Spot, Environment::Mainnet) => SPOT_WS_URL,
            (Market::Futures, Environment::Mainnet) => FUTURES_WS_URL,
        }
    }
}

/// Spot endpoints.
pub mod spot {
    pub const PING: &str = "/api/v3/ping";
    pub const TIME: &str = "/api/v3/time";
    pub const KLINES: &str = "/api/v3/klines";
    pub const BOOK_TICKER: &str = "/api/v3/ticker/bookTicker";
    pub const ACCOUNT: &str = "/api/v3/account";
    /// Listen key lifecycle (POST create, PUT keepalive, DELETE close).
    pub const USER_DATA_STREAM: &str = "/api/v3/userDataStream";
}

/// Futures endpoints.
pub mod futures {
    pub const PING: &str = "/fapi/v1/ping";
    pub const TIME: &str = "/fapi/v1/time";
    pub const KLINES: &str = "/fapi/v1/klines";
    pub const BOOK_TICKER: &str = "/fapi/v1/ticker/bookTicker";
    pub const LEVERAGE: &str = "/fapi/v1/leverage";
    pub const BALANCE: &str = "/fapi/v2/balance";
    pub const ACCOUNT: &str = "/fapi/v2/account";
    /// Listen key lifecycle (POST create, PUT keepalive, DELETE close).
    pub const LISTEN_KEY: &str = "/fapi/v1/listenKey";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_selection() {
        assert_eq!(Market::Spot.rest_base_url(Environment::Mainnet, false), SPOT_BASE_URL);
        assert_eq!(Market::Spot.rest_base_url(Environment::Testnet, true), SPOT_TESTNET_URL);
        assert_eq!(
            Market::Futures.rest_base_url(Environment::Mainnet, true),
            FUTURES_INTRANET_URL
        );
        assert_eq!(
            Market::Futures.rest_base_url(Environment::Testnet, true),
            FUTURES_TESTNET_URL
        );
        assert_eq!(Market::Futures.ws_base_url(Environment::Mainnet), FUTURES_WS_URL);
        assert_eq!(Market::Spot.ws_base_url(Environment::Testnet), TESTNET_WS_URL);
    }
}
