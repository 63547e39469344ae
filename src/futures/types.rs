//! Futures REST response types.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::PositionSide;

/// One entry of `GET /fapi/v2/balance`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[serde(default)]
    pub account_alias: String,
    pub asset: String,
    pub balance: Decimal,
    pub cross_wallet_balance: Decimal,
    #[serde(rename = "crossUnPnl")]
    pub cross_unrealized_pnl: Decimal,
    pub available_balance: Decimal,
    pub max_withdraw_amount: Decimal,
    #[serde(default)]
    pub margin_available: bool,
    pub update_time: i64,
}

/// Response of `POST /fapi/v1/leverage`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolLeverage {
    pub leverage: u32,
    /// Notional cap at this leverage; sent as a string or a number.
    #[serde(deserialize_with = "crate::types::serde_helpers::optional_decimal::deserialize", default)]
    pub max_notional_value: Option<Decimal>,
    pub symbol: String,
}

/// `GET /fapi/v2/account`, trimmed to the fields callers usually need.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesAccount {
    #[serde(default)]
    pub can_trade: bool,
    pub total_wallet_balance: Decimal,
    pub total_unrealized_profit: Decimal,
    pub total_margin_balance: Decimal,
    pub available_balance: Decimal,
    pub max_withdraw_amount: Decimal,
    #[serde(default)]
    pub assets: Vec<AccountAsset>,
    #[serde(default)]
    pub positions: Vec<AccountPosition>,
}

impl FuturesAccount {
    /// Positions with a non-zero amount.
    pub fn open_positions(&self) -> impl Iterator<Item = &AccountPosition> {
        self.positions.iter().filter(|p| !p.position_amt.is_zero())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAsset {
    pub asset: String,
    pub wallet_balance: Decimal,
    pub unrealized_profit: Decimal,
    pub margin_balance: Decimal,
    pub available_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPosition {
    pub symbol: String,
    pub position_amt: Decimal,
    pub entry_price: Decimal,
    pub unrealized_profit: Decimal,
    #[serde(default, deserialize_with = "crate::types::serde_helpers::string_or_u32::deserialize")]
    pub leverage: u32,
    #[serde(default)]
    pub isolated: bool,
    #[serde(default)]
    pub position_side: Option<PositionSide>,
}
