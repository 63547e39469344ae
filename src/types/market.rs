//! Market data returned by both the spot and futures REST APIs.

use rust_decimal::Decimal;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// `GET /api/v3/time` and `GET /fapi/v1/time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTime {
    /// Milliseconds since the UNIX epoch.
    pub server_time: i64,
}

impl ServerTime {
    pub fn to_datetime(self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.server_time) * 1_000_000).ok()
    }
}

/// One candlestick.
///
/// The wire form is a 12-element positional array:
/// `[openTime, open, high, low, close, volume, closeTime, quoteAssetVolume,
/// numberOfTrades, takerBuyBaseVolume, takerBuyQuoteVolume, ignore]`.
/// Any other length fails to decode. Serializes back to the same array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "KlineRow", into = "KlineRow")]
pub struct Kline {
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub close_time: i64,
    pub quote_asset_volume: Decimal,
    pub number_of_trades: u64,
    pub taker_buy_base_volume: Decimal,
    pub taker_buy_quote_volume: Decimal,
}

#[derive(Serialize, Deserialize)]
struct KlineRow(
    i64,
    Decimal,
    Decimal,
    Decimal,
    Decimal,
    Decimal,
    i64,
    Decimal,
    u64,
    Decimal,
    Decimal,
    Value,
);

impl From<KlineRow> for Kline {
    fn from(row: KlineRow) -> Self {
        Self {
            open_time: row.0,
            open: row.1,
            high: row.2,
            low: row.3,
            close: row.4,
            volume: row.5,
            close_time: row.6,
            quote_asset_volume: row.7,
            number_of_trades: row.8,
            taker_buy_base_volume: row.9,
            taker_buy_quote_volume: row.10,
        }
    }
}

impl From<Kline> for KlineRow {
    fn from(kline: Kline) -> Self {
        Self(
            kline.open_time,
            kline.open,
            kline.high,
            kline.low,
            kline.close,
            kline.volume,
            kline.close_time,
            kline.quote_asset_volume,
            kline.number_of_trades,
            kline.taker_buy_base_volume,
            kline.taker_buy_quote_volume,
            Value::String("0".into()),
        )
    }
}

/// Best bid/ask for a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookTicker {
    pub symbol: String,
    pub bid_price: Decimal,
    pub bid_qty: Decimal,
    pub ask_price: Decimal,
    pub ask_qty: Decimal,
    /// Present on futures responses only.
    #[serde(default)]
    pub time: Option<i64>,
}

/// Either one ticker (symbol given) or all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookTickers {
    One(BookTicker),
    All(Vec<BookTicker>),
}

// Decoded through `Value` rather than `#[serde(untagged)]`: untagged buffering
// loses integers under serde_json's arbitrary_precision.
impl<'de> Deserialize<'de> for BookTickers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let decoded = if value.is_array() {
            serde_json::from_value(value).map(BookTickers::All)
        } else {
            serde_json::from_value(value).map(BookTickers::One)
        };
        decoded.map_err(de::Error::custom)
    }
}

impl BookTickers {
    pub fn into_vec(self) -> Vec<BookTicker> {
        match self {
            BookTickers::One(ticker) => vec![ticker],
            BookTickers::All(tickers) => tickers,
        }
    }
}

/// Query for `klines`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlinesRequest {
    pub symbol: String,
    pub interval: crate::types::KlineInterval,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    /// Number of candles (exchange default 500, max 1500).
    pub limit: Option<u32>,
}

impl KlinesRequest {
    pub fn new(symbol: impl Into<String>, interval: crate::types::KlineInterval) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            start_time: None,
            end_time: None,
            limit: None,
        }
    }

    pub fn start_time(mut self, millis: i64) -> Self {
        self.start_time = Some(millis);
        self
    }

    pub fn end_time(mut self, millis: i64) -> Self {
        self.end_time = Some(millis);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: &str = r#"[1499040000000,"0.01634790","0.80000000","0.01575800","0.01577100","148976.11427815",1499644799999,"2434.19055334",308,"1756.87402397","28.46694368","0"]"#;

    #[test]
    fn test_kline_positional_decode() {
        let kline: Kline = serde_json::from_str(ROW).unwrap();
        assert_eq!(kline.open_time, 1499040000000);
        assert_eq!(kline.close_time, 1499644799999);
        assert_eq!(kline.number_of_trades, 308);
        assert_eq!(kline.high.to_string(), "0.80000000");
    }

    #[test]
    fn test_kline_serializes_as_row() {
        let kline: Kline = serde_json::from_str(ROW).unwrap();
        let encoded = serde_json::to_string(&kline).unwrap();
        assert_eq!(encoded, ROW);
        assert_eq!(serde_json::from_str::<Kline>(&encoded).unwrap(), kline);
    }

    #[test]
    fn test_kline_rejects_wrong_length() {
        let short = r#"[1499040000000,"0.1","0.2","0.3","0.4","5",1499644799999,"2",308,"1","2"]"#;
        assert!(serde_json::from_str::<Kline>(short).is_err());

        let long = ROW.replace("\"0\"]", "\"0\",\"extra\"]");
        assert!(serde_json::from_str::<Kline>(&long).is_err());
    }

    #[test]
    fn test_book_tickers_one_or_many() {
        let one: BookTickers = serde_json::from_str(
            r#"{"symbol":"BTCUSDT","bidPrice":"1","bidQty":"2","askPrice":"3","askQty":"4","time":5}"#,
        )
        .unwrap();
        assert_eq!(one.into_vec()[0].time, Some(5));

        let many: BookTickers = serde_json::from_str(
            r#"[{"symbol":"A","bidPrice":"1","bidQty":"2","askPrice":"3","askQty":"4"}]"#,
        )
        .unwrap();
        assert_eq!(many.into_vec().len(), 1);
    }

    #[test]
    fn test_server_time_datetime() {
        let time: ServerTime = serde_json::from_str(r#"{"serverTime":1758619433599}"#).unwrap();
        assert_eq!(time.to_datetime().unwrap().year(), 2025);
    }
}
