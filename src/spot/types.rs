//! Spot REST response types.

use rust_decimal::Decimal;
use serde::Deserialize;

/// `GET /api/v3/account`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotAccount {
    #[serde(default)]
    pub can_trade: bool,
    #[serde(default)]
    pub can_withdraw: bool,
    #[serde(default)]
    pub can_deposit: bool,
    #[serde(default)]
    pub update_time: i64,
    pub balances: Vec<SpotBalance>,
}

impl SpotAccount {
    /// Balance of one asset, if the account holds it.
    pub fn balance(&self, asset: &str) -> Option<&SpotBalance> {
        self.balances.iter().find(|b| b.asset == asset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpotBalance {
    pub asset: String,
    pub free: Decimal,
    pub locked: Decimal,
}

impl SpotBalance {
    pub fn total(&self) -> Decimal {
        self.free + self.locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_decode() {
        let account: SpotAccount = serde_json::from_str(
            r#"{"canTrade":true,"canWithdraw":false,"canDeposit":true,"updateTime":1,
                "balances":[{"asset":"USDT","free":"10.5","locked":"0.5"}]}"#,
        )
        .unwrap();
        assert!(account.can_trade);
        assert_eq!(account.balance("USDT").unwrap().total(), Decimal::new(11, 0));
        assert!(account.balance("BTC").is_none());
    }
}
