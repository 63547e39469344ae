//! Futures user data stream events.
//!
//! Frames are routed on their `"e"` field. Unknown event types are not an
//! error: they arrive as [`FuturesUserDataEvent::Unknown`] carrying only the
//! [`EventHeader`].

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

use crate::types::serde_helpers::optional_decimal;
use crate::types::{MarginType, OrderStatus, OrderType, PositionSide, Side, TimeInForce};
use crate::ws::messages::EventHeader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FuturesUserDataEvent {
    /// `ACCOUNT_UPDATE`: balance and position changes.
    AccountUpdate(AccountUpdateEvent),
    /// `ORDER_TRADE_UPDATE`: order lifecycle and fills.
    OrderTradeUpdate(OrderTradeUpdateEvent),
    /// `ACCOUNT_CONFIG_UPDATE`: leverage changes.
    AccountConfigUpdate(AccountConfigUpdateEvent),
    /// `MARGIN_CALL`.
    MarginCall(MarginCallEvent),
    /// `listenKeyExpired`: the stream will stop delivering events.
    ListenKeyExpired(EventHeader),
    Unknown(EventHeader),
}

impl FuturesUserDataEvent {
    pub fn event_type(&self) -> &str {
        match self {
            Self::AccountUpdate(_) => "ACCOUNT_UPDATE",
            Self::OrderTradeUpdate(_) => "ORDER_TRADE_UPDATE",
            Self::AccountConfigUpdate(_) => "ACCOUNT_CONFIG_UPDATE",
            Self::MarginCall(_) => "MARGIN_CALL",
            Self::ListenKeyExpired(header) | Self::Unknown(header) => &header.event_type,
        }
    }
}

impl<'de> Deserialize<'de> for FuturesUserDataEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let header = EventHeader::deserialize(&value).map_err(de::Error::custom)?;

        let event = match header.event_type.as_str() {
            "ACCOUNT_UPDATE" => AccountUpdateEvent::deserialize(value).map(Self::AccountUpdate),
            "ORDER_TRADE_UPDATE" => {
                OrderTradeUpdateEvent::deserialize(value).map(Self::OrderTradeUpdate)
            }
            "ACCOUNT_CONFIG_UPDATE" => {
                AccountConfigUpdateEvent::deserialize(value).map(Self::AccountConfigUpdate)
            }
            "MARGIN_CALL" => MarginCallEvent::deserialize(value).map(Self::MarginCall),
            "listenKeyExpired" => Ok(Self::ListenKeyExpired(header)),
            _ => Ok(Self::Unknown(header)),
        };
        event.map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountUpdateEvent {
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "T")]
    pub transaction_time: i64,
    #[serde(rename = "a")]
    pub update: AccountUpdateData,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountUpdateData {
    /// Why the account changed, e.g. `ORDER` or `FUNDING_FEE`.
    #[serde(rename = "m")]
    pub reason: String,
    #[serde(rename = "B", default)]
    pub balances: Vec<BalanceUpdate>,
    #[serde(rename = "P", default)]
    pub positions: Vec<PositionUpdate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BalanceUpdate {
    #[serde(rename = "a")]
    pub asset: String,
    #[serde(rename = "wb")]
    pub wallet_balance: Decimal,
    #[serde(rename = "cw")]
    pub cross_wallet_balance: Decimal,
    #[serde(rename = "bc", default)]
    pub balance_change: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PositionUpdate {
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "pa")]
    pub position_amount: Decimal,
    #[serde(rename = "ep")]
    pub entry_price: Decimal,
    #[serde(rename = "up")]
    pub unrealized_pnl: Decimal,
    #[serde(rename = "mt")]
    pub margin_type: MarginType,
    #[serde(rename = "iw", default)]
    pub isolated_wallet: Decimal,
    #[serde(rename = "ps")]
    pub position_side: PositionSide,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderTradeUpdateEvent {
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "T")]
    pub transaction_time: i64,
    #[serde(rename = "o")]
    pub order: OrderUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderUpdate {
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
    #[serde(rename = "ap")]
    pub average_price: Decimal,
    #[serde(rename = "sp", default)]
    pub stop_price: Decimal,
    /// `NEW`, `TRADE`, `CANCELED`, `EXPIRED`...
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
    #[serde(rename = "N", default)]
    pub commission_asset: Option<String>,
    #[serde(rename = "n", deserialize_with = "optional_decimal::deserialize", default)]
    pub commission: Option<Decimal>,
    #[serde(rename = "T")]
    pub trade_time: i64,
    #[serde(rename = "t")]
    pub trade_id: i64,
    #[serde(rename = "b", default)]
    pub bids_notional: Decimal,
    #[serde(rename = "a", default)]
    pub asks_notional: Decimal,
    #[serde(rename = "m")]
    pub is_maker: bool,
    #[serde(rename = "R")]
    pub is_reduce_only: bool,
    #[serde(rename = "wt", default)]
    pub working_type: Option<String>,
    #[serde(rename = "ot")]
    pub original_type: OrderType,
    #[serde(rename = "ps")]
    pub position_side: PositionSide,
    #[serde(rename = "cp", default)]
    pub close_position: bool,
    #[serde(rename = "AP", deserialize_with = "optional_decimal::deserialize", default)]
    pub activation_price: Option<Decimal>,
    #[serde(rename = "cr", deserialize_with = "optional_decimal::deserialize", default)]
    pub callback_rate: Option<Decimal>,
    #[serde(rename = "rp", default)]
    pub realized_profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountConfigUpdateEvent {
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "T")]
    pub transaction_time: i64,
    #[serde(rename = "ac", default)]
    pub leverage: Option<LeverageUpdate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeverageUpdate {
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "l")]
    pub leverage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarginCallEvent {
    #[serde(rename = "E")]
    pub event_time: i64,
    /// Cross wallet balance; only present for cross positions.
    #[serde(rename = "cw", deserialize_with = "optional_decimal::deserialize", default)]
    pub cross_wallet_balance: Option<Decimal>,
    #[serde(rename = "p")]
    pub positions: Vec<MarginCallPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarginCallPosition {
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "ps")]
    pub position_side: PositionSide,
    #[serde(rename = "pa")]
    pub position_amount: Decimal,
    #[serde(rename = "mt")]
    pub margin_type: MarginType,
    #[serde(rename = "iw", default)]
    pub isolated_wallet: Decimal,
    #[serde(rename = "mp")]
    pub mark_price: Decimal,
    #[serde(rename = "up")]
    pub unrealized_pnl: Decimal,
    #[serde(rename = "mm")]
    pub maintenance_margin_required: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_update() {
        let event: FuturesUserDataEvent = serde_json::from_str(
            r#"{"e":"ACCOUNT_UPDATE","E":1564745798939,"T":1564745798938,"a":{"m":"ORDER",
                "B":[{"a":"USDT","wb":"122624.12345678","cw":"100.12345678","bc":"50.12345678"}],
                "P":[{"s":"BTCUSDT","pa":"0","ep":"0.00000","cr":"200","up":"0","mt":"isolated","iw":"0.00000000","ps":"BOTH"}]}}"#,
        )
        .unwrap();
        let FuturesUserDataEvent::AccountUpdate(update) = event else {
            panic!("expected an account update");
        };
        assert_eq!(update.transaction_time, 1564745798938);
        assert_eq!(update.update.reason, "ORDER");
        assert_eq!(update.update.balances[0].asset, "USDT");
        assert_eq!(update.update.positions[0].margin_type, MarginType::Isolated);
    }

    #[test]
    fn test_order_trade_update() {
        let event: FuturesUserDataEvent = serde_json::from_str(
            r#"{"e":"ORDER_TRADE_UPDATE","E":1568879465651,"T":1568879465650,"o":{
                "s":"BTCUSDT","c":"TEST","S":"SELL","o":"TRAILING_STOP_MARKET","f":"GTC",
                "q":"0.001","p":"0","ap":"0","sp":"7103.04","x":"NEW","X":"NEW","i":8886774,
                "l":"0","z":"0","L":"0","N":"USDT","n":"0","T":1568879465650,"t":0,
                "b":"0","a":"9.91","m":false,"R":false,"wt":"CONTRACT_PRICE",
                "ot":"TRAILING_STOP_MARKET","ps":"LONG","cp":false,"AP":"7476.89","cr":"5.0","rp":"0"}}"#,
        )
        .unwrap();
        let FuturesUserDataEvent::OrderTradeUpdate(update) = event else {
            panic!("expected an order update");
        };
        assert_eq!(update.order.order_type, OrderType::TrailingStopMarket);
        assert_eq!(update.order.status, OrderStatus::New);
        assert_eq!(update.order.activation_price, Some(Decimal::new(747689, 2)));
    }

    #[test]
    fn test_account_config_update() {
        let event: FuturesUserDataEvent = serde_json::from_str(
            r#"{"e":"ACCOUNT_CONFIG_UPDATE","E":1611646737479,"T":1611646737476,"ac":{"s":"BTCUSDT","l":25}}"#,
        )
        .unwrap();
        assert_eq!(event.event_type(), "ACCOUNT_CONFIG_UPDATE");
        let FuturesUserDataEvent::AccountConfigUpdate(update) = event else {
            panic!("expected a config update");
        };
        assert_eq!(update.leverage.unwrap().leverage, 25);
    }

    #[test]
    fn test_margin_call() {
        let event: FuturesUserDataEvent = serde_json::from_str(
            r#"{"e":"MARGIN_CALL","E":1587727187525,"cw":"3.16812045","p":[{"s":"ETHUSDT","ps":"LONG",
                "pa":"1.327","mt":"CROSSED","iw":"0","mp":"187.17127","up":"-1.166074","mm":"1.614445"}]}"#,
        )
        .unwrap();
        let FuturesUserDataEvent::MarginCall(call) = event else {
            panic!("expected a margin call");
        };
        assert_eq!(call.positions[0].margin_type, MarginType::Crossed);
    }

    #[test]
    fn test_unknown_event_keeps_header_only() {
        let event: FuturesUserDataEvent =
            serde_json::from_str(r#"{"e":"STRATEGY_UPDATE","E":42,"T":41,"su":{"x":1}}"#).unwrap();
        assert_eq!(
            event,
            FuturesUserDataEvent::Unknown(EventHeader {
                event_type: "STRATEGY_UPDATE".into(),
                event_time: 42,
                transaction_time: 41,
            })
        );
    }

    #[test]
    fn test_listen_key_expired() {
        let event: FuturesUserDataEvent =
            serde_json::from_str(r#"{"e":"listenKeyExpired","E":1576653824250}"#).unwrap();
        assert!(matches!(event, FuturesUserDataEvent::ListenKeyExpired(_)));
    }

    #[test]
    fn test_missing_discriminator_fails() {
        assert!(serde_json::from_str::<FuturesUserDataEvent>(r#"{"E":1}"#).is_err());
    }
}
