//! Provider Capability Traits
//!
//! Everything upstream is abstracted behind two traits so the aggregation
//! pipeline never holds ambient global clients: providers are constructed
//! explicitly and injected. Implement [`BalanceProvider`] per balance
//! backend and [`PriceProvider`] per price service.

use async_trait::async_trait;
use rust_decimal::Decimal;

use wallet_core::{Chain, Result, TokenHolding};

/// Raw native-balance payload as returned by a balance backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawBalance {
    /// Decimal string, exactly as the provider reported it
    pub balance: String,
}

impl RawBalance {
    pub fn new(balance: impl Into<String>) -> Self {
        Self { balance: balance.into() }
    }

    /// A successful call that reported no balance
    pub fn zero() -> Self {
        Self { balance: "0".into() }
    }
}

/// Balance backend for one chain/address pair
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Fetch the native balance of `address` on `chain`
    async fn fetch_native_balance(&self, chain: Chain, address: &str) -> Result<RawBalance>;

    /// Fetch token balances; `usd_value` fields are filled in later by the
    /// fetcher. Backends without token support return an empty list.
    async fn fetch_token_balances(
        &self,
        _chain: Chain,
        _address: &str,
    ) -> Result<Vec<TokenHolding>> {
        Ok(Vec::new())
    }

    /// Chains this backend can serve, as wire identifiers
    async fn supported_chains(&self) -> Result<Vec<String>> {
        Ok(Chain::ALL.iter().map(|c| c.as_str().to_string()).collect())
    }

    /// Best-effort malicious-address screening
    async fn is_malicious(&self, address: &str) -> Result<bool>;

    /// Best-effort count of recent transactions, up to `limit`
    async fn recent_transaction_count(&self, address: &str, limit: u32) -> Result<u32>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Backend name, for logs and the health endpoint
    fn name(&self) -> &str;
}

/// USD price service.
///
/// Infallible by contract: any provider error, timeout, or missing price
/// field yields zero so a pricing failure can never abort portfolio
/// assembly. Single best-effort attempt, no retries, no caching.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Current USD unit price for a symbol, zero when unavailable
    async fn unit_price(&self, symbol: &str) -> Decimal;

    /// USD value of `amount` units of `symbol`
    async fn value_of(&self, symbol: &str, amount: Decimal) -> Decimal {
        amount * self.unit_price(symbol).await
    }

    /// Service name, for logs and the health endpoint
    fn name(&self) -> &str;
}
