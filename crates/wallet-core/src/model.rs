//! Domain Models
//!
//! Core data types for the aggregated portfolio document. Uses
//! `rust_decimal` for all monetary values - never use f64 for money!
//! Balances stay decimal strings on the wire, exactly as the upstream
//! provider returns them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chains::Chain;

/// A fungible token held on a chain (ERC-20, SPL, ...)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolding {
    /// Ticker symbol
    pub symbol: String,

    /// Token contract address
    pub contract_address: String,

    /// Raw balance as a decimal string
    pub balance: String,

    /// USD value of the position
    pub usd_value: Decimal,
}

/// One chain's native-asset position plus its tokens
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainHolding {
    /// Chain identifier (lower-case network name)
    pub name: String,

    /// Native asset ticker
    pub symbol: String,

    /// Native balance as a decimal string
    pub balance: String,

    /// USD value of this chain: native value + sum of token values
    pub usd_value: Decimal,

    /// Token positions owned by this chain entry
    pub tokens: Vec<TokenHolding>,
}

impl ChainHolding {
    /// Zero-value placeholder for a chain whose fetch failed, built from
    /// the static config table so every candidate chain always appears in
    /// the resulting portfolio.
    pub fn placeholder(chain: Chain) -> Self {
        Self {
            name: chain.as_str().to_string(),
            symbol: chain.symbol().to_string(),
            balance: "0".into(),
            usd_value: Decimal::ZERO,
            tokens: Vec::new(),
        }
    }

    /// Native balance parsed for math; unparseable input counts as zero
    pub fn balance_value(&self) -> Decimal {
        self.balance.parse().unwrap_or(Decimal::ZERO)
    }
}

/// Best-effort malicious-address screening result
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityInfo {
    pub is_malicious: bool,
    pub checked: bool,
}

/// Best-effort recent-activity snapshot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub transaction_count: u32,
    pub has_recent_activity: bool,
}

/// The aggregated multi-chain portfolio for one address.
///
/// Constructed fresh per request, handed off immutably, never persisted.
/// Chains keep classification order, not value order. `total_usd_value` is
/// always recomputed by summation over `chains` - it is never carried as
/// independent state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    /// The classified address, never mutated
    pub address: String,

    /// One entry per candidate chain, fetch order preserved
    pub chains: Vec<ChainHolding>,

    /// Sum of every chain's `usd_value`
    pub total_usd_value: Decimal,

    /// Enhancement pass result, present only on the comprehensive variant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityInfo>,

    /// Enhancement pass result, present only on the comprehensive variant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_activity: Option<RecentActivity>,
}

impl Portfolio {
    /// Build a portfolio from fetched chain holdings, recomputing the total
    /// from the chain entries (the single source of truth).
    pub fn from_chains(address: impl Into<String>, chains: Vec<ChainHolding>) -> Self {
        let total_usd_value = chains.iter().map(|c| c.usd_value).sum();
        Self {
            address: address.into(),
            chains,
            total_usd_value,
            security: None,
            recent_activity: None,
        }
    }

    /// Recompute the total from chain entries
    pub fn recomputed_total(&self) -> Decimal {
        self.chains.iter().map(|c| c.usd_value).sum()
    }

    /// Flatten the portfolio into per-asset holdings for analysis.
    ///
    /// Native entries come before their chain's tokens and carry the
    /// native-only value (chain total minus its tokens) so that summing
    /// holdings never double-counts token value. The portfolio itself is
    /// never mutated.
    pub fn flatten(&self) -> Vec<Holding> {
        let mut holdings = Vec::new();
        for chain in &self.chains {
            let token_value: Decimal = chain.tokens.iter().map(|t| t.usd_value).sum();
            holdings.push(Holding {
                symbol: chain.symbol.clone(),
                balance: chain.balance_value(),
                usd_value: (chain.usd_value - token_value).max(Decimal::ZERO),
                chain: chain.name.clone(),
                kind: HoldingKind::Native,
                contract_address: None,
            });
            for token in &chain.tokens {
                holdings.push(Holding {
                    symbol: token.symbol.clone(),
                    balance: token.balance.parse().unwrap_or(Decimal::ZERO),
                    usd_value: token.usd_value,
                    chain: chain.name.clone(),
                    kind: HoldingKind::Token,
                    contract_address: Some(token.contract_address.clone()),
                });
            }
        }
        holdings
    }
}

/// Whether a holding is a chain's base currency or an issued token
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldingKind {
    Native,
    Token,
}

/// Flattened analytic view of one position, derived transiently from a
/// `Portfolio` inside the analyzer
#[derive(Clone, Debug, PartialEq)]
pub struct Holding {
    pub symbol: String,
    pub balance: Decimal,
    pub usd_value: Decimal,
    pub chain: String,
    pub kind: HoldingKind,
    pub contract_address: Option<String>,
}

impl Holding {
    /// Derived unit price: `usd_value / balance` when balance > 0, else 0
    pub fn price_usd(&self) -> Decimal {
        if self.balance > Decimal::ZERO {
            self.usd_value / self.balance
        } else {
            Decimal::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_portfolio() -> Portfolio {
        Portfolio::from_chains(
            "0x1111111111111111111111111111111111111111",
            vec![
                ChainHolding {
                    name: "ethereum".into(),
                    symbol: "ETH".into(),
                    balance: "2.5".into(),
                    usd_value: dec!(5600),
                    tokens: vec![TokenHolding {
                        symbol: "USDC".into(),
                        contract_address: "0xa0b8".into(),
                        balance: "600".into(),
                        usd_value: dec!(600),
                    }],
                },
                ChainHolding::placeholder(Chain::Polygon),
            ],
        )
    }

    #[test]
    fn test_total_is_sum_of_chains() {
        let portfolio = sample_portfolio();
        assert_eq!(portfolio.total_usd_value, dec!(5600));
        assert_eq!(portfolio.total_usd_value, portfolio.recomputed_total());
    }

    #[test]
    fn test_placeholder_is_zero_valued() {
        let placeholder = ChainHolding::placeholder(Chain::Avalanche);
        assert_eq!(placeholder.name, "avalanche");
        assert_eq!(placeholder.symbol, "AVAX");
        assert_eq!(placeholder.balance, "0");
        assert_eq!(placeholder.usd_value, Decimal::ZERO);
        assert!(placeholder.tokens.is_empty());
    }

    #[test]
    fn test_flatten_orders_native_before_tokens() {
        let holdings = sample_portfolio().flatten();
        assert_eq!(holdings.len(), 3);
        assert_eq!(holdings[0].kind, HoldingKind::Native);
        assert_eq!(holdings[0].symbol, "ETH");
        assert_eq!(holdings[1].kind, HoldingKind::Token);
        assert_eq!(holdings[1].symbol, "USDC");
        assert_eq!(holdings[2].chain, "polygon");
    }

    #[test]
    fn test_flatten_native_value_excludes_tokens() {
        let holdings = sample_portfolio().flatten();
        // Chain total 5600 minus the 600 USDC position
        assert_eq!(holdings[0].usd_value, dec!(5000));
        // Summing holdings reproduces the portfolio total
        let sum: Decimal = holdings.iter().map(|h| h.usd_value).sum();
        assert_eq!(sum, dec!(5600));
    }

    #[test]
    fn test_derived_unit_price() {
        let holdings = sample_portfolio().flatten();
        // 5000 USD over 2.5 ETH
        assert_eq!(holdings[0].price_usd(), dec!(2000));
        // Zero-balance placeholder never divides
        assert_eq!(holdings[2].price_usd(), Decimal::ZERO);
    }

    #[test]
    fn test_unparseable_balance_counts_as_zero() {
        let chain = ChainHolding {
            name: "ethereum".into(),
            symbol: "ETH".into(),
            balance: "not-a-number".into(),
            usd_value: Decimal::ZERO,
            tokens: vec![],
        };
        assert_eq!(chain.balance_value(), Decimal::ZERO);
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let json = serde_json::to_value(sample_portfolio()).unwrap();
        assert!(json.get("totalUsdValue").is_some());
        assert!(json.get("security").is_none()); // absent, not null
        let chain = &json["chains"][0];
        assert!(chain.get("usdValue").is_some());
        assert_eq!(chain["tokens"][0]["contractAddress"], "0xa0b8");
    }
}
