//! Mock Providers
//!
//! Deterministic in-memory implementations of the provider traits, used by
//! the test suite and as demo mode when no API key is configured.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;

use wallet_core::{Chain, Result, TokenHolding, WalletError};

use crate::provider::{BalanceProvider, PriceProvider, RawBalance};

/// In-memory balance provider with scriptable balances and failures
#[derive(Default)]
pub struct MockBalanceProvider {
    balances: HashMap<(Chain, String), String>,
    tokens: HashMap<(Chain, String), Vec<TokenHolding>>,
    failing_chains: HashSet<Chain>,
    failing_tokens: HashSet<Chain>,
    demo: bool,
    malicious: bool,
    recent_transactions: u32,
    balance_calls: AtomicUsize,
}

impl MockBalanceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo-mode provider: canned balances for any address, so the server
    /// stays usable without an API key
    pub fn demo() -> Self {
        Self { demo: true, recent_transactions: 3, ..Self::default() }
    }

    pub fn with_balance(mut self, chain: Chain, address: &str, balance: &str) -> Self {
        self.balances.insert((chain, address.to_string()), balance.to_string());
        self
    }

    pub fn with_tokens(mut self, chain: Chain, address: &str, tokens: Vec<TokenHolding>) -> Self {
        self.tokens.insert((chain, address.to_string()), tokens);
        self
    }

    /// Make every balance fetch on `chain` fail with a provider error
    pub fn with_failing_chain(mut self, chain: Chain) -> Self {
        self.failing_chains.insert(chain);
        self
    }

    /// Make token fetches on `chain` fail while native fetches succeed
    pub fn with_failing_tokens(mut self, chain: Chain) -> Self {
        self.failing_tokens.insert(chain);
        self
    }

    pub fn with_malicious_flag(mut self, malicious: bool) -> Self {
        self.malicious = malicious;
        self
    }

    /// Number of native-balance fetches issued so far
    pub fn balance_call_count(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    fn demo_balance(chain: Chain) -> &'static str {
        match chain {
            Chain::Ethereum => "1.25",
            Chain::Polygon => "340",
            Chain::Solana => "12.5",
            Chain::Bsc => "0.8",
            _ => "0",
        }
    }
}

#[async_trait]
impl BalanceProvider for MockBalanceProvider {
    async fn fetch_native_balance(&self, chain: Chain, address: &str) -> Result<RawBalance> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);

        if chain.config().balance_endpoint.is_none() {
            return Err(WalletError::UnsupportedChain(chain.to_string()));
        }
        if self.failing_chains.contains(&chain) {
            return Err(WalletError::provider(chain.as_str(), "simulated outage"));
        }
        if self.demo {
            return Ok(RawBalance::new(Self::demo_balance(chain)));
        }

        Ok(self
            .balances
            .get(&(chain, address.to_string()))
            .map(|b| RawBalance::new(b.clone()))
            .unwrap_or_else(RawBalance::zero))
    }

    async fn fetch_token_balances(
        &self,
        chain: Chain,
        address: &str,
    ) -> Result<Vec<TokenHolding>> {
        if self.failing_tokens.contains(&chain) {
            return Err(WalletError::provider(chain.as_str(), "token endpoint down"));
        }
        Ok(self
            .tokens
            .get(&(chain, address.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn is_malicious(&self, _address: &str) -> Result<bool> {
        Ok(self.malicious)
    }

    async fn recent_transaction_count(&self, _address: &str, limit: u32) -> Result<u32> {
        Ok(self.recent_transactions.min(limit))
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        if self.demo { "MockProvider (demo)" } else { "MockProvider" }
    }
}

/// In-memory price oracle; symbols without a configured price cost zero,
/// which doubles as the timed-out/unavailable case
#[derive(Default)]
pub struct MockPriceOracle {
    prices: HashMap<String, Decimal>,
}

impl MockPriceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo-mode oracle with static prices
    pub fn demo() -> Self {
        let mut oracle = Self::new();
        for (symbol, price) in [
            ("ETH", Decimal::from(3450)),
            ("MATIC", Decimal::new(52, 2)),
            ("SOL", Decimal::from(195)),
            ("BNB", Decimal::from(620)),
            ("AVAX", Decimal::from(42)),
            ("BTC", Decimal::from(97500)),
        ] {
            oracle.prices.insert(symbol.into(), price);
        }
        oracle
    }

    pub fn with_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.prices.insert(symbol.to_uppercase(), price);
        self
    }
}

#[async_trait]
impl PriceProvider for MockPriceOracle {
    async fn unit_price(&self, symbol: &str) -> Decimal {
        self.prices
            .get(&symbol.to_uppercase())
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn name(&self) -> &str {
        "MockOracle"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const ADDR: &str = "0x1111111111111111111111111111111111111111";

    #[tokio::test]
    async fn test_scripted_balance_and_default_zero() {
        let provider = MockBalanceProvider::new().with_balance(Chain::Ethereum, ADDR, "2.5");

        let eth = provider.fetch_native_balance(Chain::Ethereum, ADDR).await.unwrap();
        assert_eq!(eth.balance, "2.5");

        let polygon = provider.fetch_native_balance(Chain::Polygon, ADDR).await.unwrap();
        assert_eq!(polygon.balance, "0");
        assert_eq!(provider.balance_call_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_chain_errors() {
        let provider = MockBalanceProvider::new().with_failing_chain(Chain::Polygon);
        let err = provider.fetch_native_balance(Chain::Polygon, ADDR).await.unwrap_err();
        assert!(err.is_absorbable());
    }

    #[tokio::test]
    async fn test_value_of_uses_unit_price() {
        let oracle = MockPriceOracle::new().with_price("ETH", dec!(2000));
        assert_eq!(oracle.value_of("ETH", dec!(2.5)).await, dec!(5000));
        // Unknown symbols price at zero
        assert_eq!(oracle.value_of("NOPE", dec!(100)).await, Decimal::ZERO);
    }
}
