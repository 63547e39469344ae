//! Spot user data stream events.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

use crate::types::serde_helpers::optional_decimal;
use crate::types::{OrderStatus, OrderType, Side, TimeInForce};
use crate::ws::messages::EventHeader;

/// An event from a spot listen key stream, routed on `"e"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpotUserDataEvent {
    /// `outboundAccountPosition`: balances that changed.
    AccountPosition(AccountPositionEvent),
    /// `executionReport`: order lifecycle and fills.
    ExecutionReport(ExecutionReportEvent),
    ListenKeyExpired(EventHeader),
    /// Any other event type; only the header is decoded.
    Unknown(EventHeader),
}

impl<'de> Deserialize<'de> for SpotUserDataEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let header = EventHeader::deserialize(&value).map_err(de::Error::custom)?;

        let event = match header.event_type.as_str() {
            "outboundAccountPosition" => {
                AccountPositionEvent::deserialize(value).map(Self::AccountPosition)
            }
            "executionReport" => ExecutionReportEvent::deserialize(value).map(Self::ExecutionReport),
            "listenKeyExpired" => Ok(Self::ListenKeyExpired(header)),
            _ => Ok(Self::Unknown(header)),
        };
        event.map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountPositionEvent {
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "u", default)]
    pub last_update_time: i64,
    #[serde(rename = "B")]
    pub balances: Vec<AccountBalance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountBalance {
    #[serde(rename = "a")]
    pub asset: String,
    #[serde(rename = "f")]
    pub free: Decimal,
    #[serde(rename = "l")]
    pub locked: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecutionReportEvent {
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "c")]
    pub client_order_id: String,
    #[serde(rename = "S")]
    pub side: Side,
    #[serde(rename = "o")]
    pub order_type: OrderType,
    #[serde(rename = "f")]
    pub time_in_force: TimeInForce,
    #[serde(rename = "q")]
    pub original_qty: Decimal,
    #[serde(rename = "p")]
    pub original_price: Decimal,
    #[serde(rename = "ap", deserialize_with = "optional_decimal::deserialize", default)]
    pub average_price: Option<Decimal>,
    #[serde(rename = "sp", deserialize_with = "optional_decimal::deserialize", default)]
    pub stop_price: Option<Decimal>,
    #[serde(rename = "x")]
    pub execution_type: String,
    #[serde(rename = "X")]
    pub status: OrderStatus,
    #[serde(rename = "i")]
    pub order_id: i64,
    #[serde(rename = "l")]
    pub last_filled_qty: Decimal,
    #[serde(rename = "z")]
    pub cumulative_filled_qty: Decimal,
    #[serde(rename = "L")]
    pub last_filled_price: Decimal,
    #[serde(rename = "n", deserialize_with = "optional_decimal::deserialize", default)]
    pub commission: Option<Decimal>,
    #[serde(rename = "N", default)]
    pub commission_asset: Option<String>,
    #[serde(rename = "T")]
    pub transaction_time: i64,
    #[serde(rename = "t", default)]
    pub trade_id: i64,
    #[serde(rename = "O", default)]
    pub order_created_time: i64,
    #[serde(rename = "Z", default)]
    pub cumulative_quote_qty: Decimal,
    #[serde(rename = "Y", default)]
    pub last_quote_qty: Decimal,
}
