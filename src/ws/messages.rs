//! Market data events pushed over the WebSocket streams.
//!
//! Field names follow the exchange's single-letter keys; each struct maps
//! them onto descriptive names. Prices and quantities are [`Decimal`].

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::KlineInterval;

/// One `[price, quantity]` level of an order book update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PriceLevel(pub Decimal, pub Decimal);

impl PriceLevel {
    pub fn price(&self) -> Decimal {
        self.0
    }

    pub fn quantity(&self) -> Decimal {
        self.1
    }

    /// A zero quantity removes the level from the book.
    pub fn is_removal(&self) -> bool {
        self.1.is_zero()
    }
}

/// `<symbol>@depth` and partial depth updates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DepthEvent {
    #[serde(rename = "e", default)]
    pub event_type: String,
    #[serde(rename = "E", default)]
    pub event_time: i64,
    /// Futures only.
    #[serde(rename = "T", default)]
    pub transaction_time: i64,
    #[serde(rename = "s", default)]
    pub symbol: String,
    #[serde(rename = "U", default)]
    pub first_update_id: i64,
    #[serde(rename = "u", alias = "lastUpdateId", default)]
    pub last_update_id: i64,
    /// Futures only: final update id of the previous event.
    #[serde(rename = "pu", default)]
    pub previous_update_id: Option<i64>,
    #[serde(rename = "b", alias = "bids")]
    pub bids: Vec<PriceLevel>,
    #[serde(rename = "a", alias = "asks")]
    pub asks: Vec<PriceLevel>,
}

/// `<symbol>@aggTrade`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AggTradeEvent {
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "a")]
    pub aggregate_trade_id: i64,
    #[serde(rename = "p")]
    pub price: Decimal,
    #[serde(rename = "q")]
    pub quantity: Decimal,
    #[serde(rename = "f")]
    pub first_trade_id: i64,
    #[serde(rename = "l")]
    pub last_trade_id: i64,
    #[serde(rename = "T")]
    pub trade_time: i64,
    #[serde(rename = "m")]
    pub is_buyer_maker: bool,
}

/// `<symbol>@kline_<interval>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KlineEvent {
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "k")]
    pub kline: StreamKline,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamKline {
    #[serde(rename = "t")]
    pub start_time: i64,
    #[serde(rename = "T")]
    pub end_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "i")]
    pub interval: KlineInterval,
    #[serde(rename = "f")]
    pub first_trade_id: i64,
    #[serde(rename = "L")]
    pub last_trade_id: i64,
    #[serde(rename = "o")]
    pub open: Decimal,
    #[serde(rename = "c")]
    pub close: Decimal,
    #[serde(rename = "h")]
    pub high: Decimal,
    #[serde(rename = "l")]
    pub low: Decimal,
    #[serde(rename = "v")]
    pub volume: Decimal,
    #[serde(rename = "n")]
    pub trade_count: i64,
    /// Whether this candle is closed.
    #[serde(rename = "x")]
    pub is_final: bool,
    #[serde(rename = "q")]
    pub quote_volume: Decimal,
    #[serde(rename = "V")]
    pub taker_buy_volume: Decimal,
    #[serde(rename = "Q")]
    pub taker_buy_quote_volume: Decimal,
}

/// `<symbol>@bookTicker` and `!bookTicker`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookTickerEvent {
    #[serde(rename = "e", default)]
    pub event_type: String,
    #[serde(rename = "u")]
    pub update_id: i64,
    #[serde(rename = "E", default)]
    pub event_time: i64,
    #[serde(rename = "T", default)]
    pub transaction_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "b")]
    pub bid_price: Decimal,
    #[serde(rename = "B")]
    pub bid_qty: Decimal,
    #[serde(rename = "a")]
    pub ask_price: Decimal,
    #[serde(rename = "A")]
    pub ask_qty: Decimal,
}

/// `<symbol>@markPrice` and the elements of `!markPrice@arr`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarkPriceEvent {
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "p")]
    pub mark_price: Decimal,
    #[serde(rename = "i")]
    pub index_price: Decimal,
    #[serde(rename = "P")]
    pub estimated_settle_price: Decimal,
    #[serde(rename = "r")]
    pub funding_rate: Decimal,
    #[serde(rename = "T")]
    pub next_funding_time: i64,
}

/// `<symbol>@ticker` and the elements of `!ticker@arr`: rolling 24h statistics.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarketStatEvent {
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "p")]
    pub price_change: Decimal,
    #[serde(rename = "P")]
    pub price_change_percent: Decimal,
    #[serde(rename = "w")]
    pub weighted_avg_price: Decimal,
    /// Spot only.
    #[serde(rename = "x", default)]
    pub prev_close_price: Option<Decimal>,
    #[serde(rename = "c")]
    pub last_price: Decimal,
    #[serde(rename = "Q")]
    pub last_qty: Decimal,
    /// Spot only.
    #[serde(rename = "b", default)]
    pub bid_price: Option<Decimal>,
    #[serde(rename = "B", default)]
    pub bid_qty: Option<Decimal>,
    #[serde(rename = "a", default)]
    pub ask_price: Option<Decimal>,
    #[serde(rename = "A", default)]
    pub ask_qty: Option<Decimal>,
    #[serde(rename = "o")]
    pub open_price: Decimal,
    #[serde(rename = "h")]
    pub high_price: Decimal,
    #[serde(rename = "l")]
    pub low_price: Decimal,
    #[serde(rename = "v")]
    pub base_volume: Decimal,
    #[serde(rename = "q")]
    pub quote_volume: Decimal,
    #[serde(rename = "O")]
    pub open_time: i64,
    #[serde(rename = "C")]
    pub close_time: i64,
    #[serde(rename = "F")]
    pub first_trade_id: i64,
    #[serde(rename = "L")]
    pub last_trade_id: i64,
    #[serde(rename = "n")]
    pub trade_count: i64,
}

/// `<symbol>@miniTicker`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MiniTickerEvent {
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "c")]
    pub close_price: Decimal,
    #[serde(rename = "o")]
    pub open_price: Decimal,
    #[serde(rename = "h")]
    pub high_price: Decimal,
    #[serde(rename = "l")]
    pub low_price: Decimal,
    #[serde(rename = "v")]
    pub base_volume: Decimal,
    #[serde(rename = "q")]
    pub quote_volume: Decimal,
}

/// Discriminator and timestamps shared by every user data event.
///
/// Events this crate does not model are delivered with only these fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventHeader {
    #[serde(rename = "e")]
    pub event_type: String,
    #[serde(rename = "E", default)]
    pub event_time: i64,
    #[serde(rename = "T", default)]
    pub transaction_time: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_event() {
        let event: DepthEvent = serde_json::from_str(
            r#"{"e":"depthUpdate","E":1700000000000,"T":1700000000001,"s":"BTCUSDT",
                "U":10,"u":12,"pu":9,"b":[["60000.1","0.5"]],"a":[["60001","0"]]}"#,
        )
        .unwrap();
        assert_eq!(event.symbol, "BTCUSDT");
        assert_eq!(event.previous_update_id, Some(9));
        assert_eq!(event.bids[0].price(), Decimal::new(600001, 1));
        assert!(event.asks[0].is_removal());
    }

    #[test]
    fn test_partial_depth_without_header() {
        let event: DepthEvent = serde_json::from_str(
            r#"{"lastUpdateId":1,"bids":[["1","2"]],"asks":[]}"#,
        )
        .unwrap();
        assert_eq!(event.bids.len(), 1);
        assert_eq!(event.last_update_id, 1);
        assert!(event.symbol.is_empty());
    }

    #[test]
    fn test_kline_event() {
        let event: KlineEvent = serde_json::from_str(
            r#"{"e":"kline","E":1,"s":"ETHUSDT","k":{"t":0,"T":59999,"s":"ETHUSDT","i":"1m",
                "f":1,"L":5,"o":"3000","c":"3001","h":"3002","l":"2999","v":"10","n":5,
                "x":false,"q":"30000","V":"4","Q":"12000","B":"0"}}"#,
        )
        .unwrap();
        assert_eq!(event.kline.interval, KlineInterval::OneMinute);
        assert!(!event.kline.is_final);
    }

    #[test]
    fn test_mark_price_event() {
        let event: MarkPriceEvent = serde_json::from_str(
            r#"{"e":"markPriceUpdate","E":1,"s":"BTCUSDT","p":"60000","i":"59990",
                "P":"60010","r":"0.0001","T":1700000000000}"#,
        )
        .unwrap();
        assert_eq!(event.funding_rate, Decimal::new(1, 4));
    }
}
