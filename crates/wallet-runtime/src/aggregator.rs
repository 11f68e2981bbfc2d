//! Portfolio Aggregator
//!
//! Orchestrates the full pipeline for one address: strict validation,
//! chain classification, a concurrent per-chain balance fan-out, and merge
//! into a single portfolio document. Per-chain failures are absorbed into
//! zero-value placeholders so the aggregate call always returns a usable
//! portfolio; only an invalid address aborts the request.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future;
use rust_decimal::Decimal;
use tokio::time::timeout;

use wallet_core::model::{RecentActivity, SecurityInfo};
use wallet_core::{classify, is_valid_address, Chain, ChainHolding, Portfolio, Result, WalletError};

use crate::fetcher::ChainBalanceFetcher;
use crate::provider::{BalanceProvider, PriceProvider};

/// How many recent transactions the enhancement pass asks for
const RECENT_TX_LIMIT: u32 = 5;

/// Multi-chain portfolio aggregator over injected providers
pub struct PortfolioAggregator {
    fetcher: ChainBalanceFetcher,
    provider: Arc<dyn BalanceProvider>,
    prices: Arc<dyn PriceProvider>,
    /// Cap on each best-effort enhancement call; expiry is a soft failure
    enhancement_timeout: Duration,
}

impl PortfolioAggregator {
    pub fn new(provider: Arc<dyn BalanceProvider>, prices: Arc<dyn PriceProvider>) -> Self {
        Self {
            fetcher: ChainBalanceFetcher::new(provider.clone(), prices.clone()),
            provider,
            prices,
            enhancement_timeout: Duration::from_secs(4),
        }
    }

    /// Aggregate the multi-chain portfolio of one address.
    ///
    /// Fails only with `InvalidAddress`; every candidate chain appears in
    /// the result, as a real holding or a zero-value placeholder. Fetches
    /// run concurrently, bounded by the candidate count.
    pub async fn aggregate(&self, address: &str) -> Result<Portfolio> {
        if !is_valid_address(address) {
            return Err(WalletError::InvalidAddress(address.to_string()));
        }

        let candidates = classify(address);
        tracing::info!(
            address = %&address[..10.min(address.len())],
            chains = candidates.len(),
            "aggregating portfolio"
        );

        let fetches = candidates
            .iter()
            .map(|&chain| async move { (chain, self.fetcher.fetch(address, chain).await) });
        let results = future::join_all(fetches).await;

        let chains = results
            .into_iter()
            .map(|(chain, result)| match result {
                Ok(holding) => holding,
                Err(e) => {
                    tracing::warn!(%chain, "chain fetch failed, using placeholder: {}", e);
                    ChainHolding::placeholder(chain)
                }
            })
            .collect();

        Ok(Portfolio::from_chains(address, chains))
    }

    /// Enhanced variant: the base aggregate plus best-effort security and
    /// recent-activity flags. Enhancement failures or timeouts leave the
    /// fields absent and never fail the call.
    pub async fn aggregate_comprehensive(&self, address: &str) -> Result<Portfolio> {
        let mut portfolio = self.aggregate(address).await?;

        match timeout(self.enhancement_timeout, self.provider.is_malicious(address)).await {
            Ok(Ok(is_malicious)) => {
                portfolio.security = Some(SecurityInfo { is_malicious, checked: true });
            }
            Ok(Err(e)) => tracing::debug!("security check failed: {}", e),
            Err(_) => tracing::debug!("security check timed out"),
        }

        match timeout(
            self.enhancement_timeout,
            self.provider.recent_transaction_count(address, RECENT_TX_LIMIT),
        )
        .await
        {
            Ok(Ok(count)) => {
                portfolio.recent_activity = Some(RecentActivity {
                    transaction_count: count,
                    has_recent_activity: count > 0,
                });
            }
            Ok(Err(e)) => tracing::debug!("recent activity check failed: {}", e),
            Err(_) => tracing::debug!("recent activity check timed out"),
        }

        Ok(portfolio)
    }

    /// Current USD unit prices for a set of symbols, fetched concurrently;
    /// unavailable symbols price at zero
    pub async fn exchange_rates(&self, currencies: &[String]) -> HashMap<String, Decimal> {
        let lookups = currencies.iter().map(|symbol| async {
            (symbol.to_uppercase(), self.prices.unit_price(symbol).await)
        });
        future::join_all(lookups).await.into_iter().collect()
    }

    /// Chain identifiers the backend can serve, falling back to the static
    /// table when the backend cannot say
    pub async fn supported_chains(&self) -> Vec<String> {
        match self.provider.supported_chains().await {
            Ok(chains) if !chains.is_empty() => chains,
            _ => Chain::ALL.iter().map(|c| c.as_str().to_string()).collect(),
        }
    }

    /// Backend reachability, for the health endpoint
    pub async fn provider_healthy(&self) -> bool {
        self.provider.health_check().await
    }

    /// Backend name, for the health endpoint
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Price service name, for the health endpoint
    pub fn price_source_name(&self) -> &str {
        self.prices.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::mock::{MockBalanceProvider, MockPriceOracle};

    const ETH_ADDR: &str = "0x1111111111111111111111111111111111111111";
    const SOL_ADDR: &str = "DYw8jCTfwHNRJhhmFcbXvVDTqWMEVFBX6ZKUmG5CNSKK";

    fn aggregator(provider: MockBalanceProvider, oracle: MockPriceOracle) -> PortfolioAggregator {
        PortfolioAggregator::new(Arc::new(provider), Arc::new(oracle))
    }

    #[tokio::test]
    async fn test_invalid_address_fails_before_any_fetch() {
        let provider = Arc::new(MockBalanceProvider::new());
        let agg = PortfolioAggregator::new(provider.clone(), Arc::new(MockPriceOracle::new()));

        let err = agg.aggregate("not-an-address").await.unwrap_err();
        assert!(matches!(err, WalletError::InvalidAddress(_)));
        assert_eq!(provider.balance_call_count(), 0, "no network call may precede validation");
    }

    #[tokio::test]
    async fn test_evm_address_covers_full_family() {
        let agg = aggregator(
            MockBalanceProvider::new().with_balance(Chain::Ethereum, ETH_ADDR, "2.5"),
            MockPriceOracle::new().with_price("ETH", dec!(2000)),
        );

        let portfolio = agg.aggregate(ETH_ADDR).await.unwrap();
        assert_eq!(portfolio.chains.len(), 6);
        assert_eq!(portfolio.chains[0].name, "ethereum");
        assert_eq!(portfolio.chains[0].usd_value, dec!(5000));
        // Arbitrum and Optimism share the ETH symbol but hold zero here
        assert_eq!(portfolio.total_usd_value, dec!(5000));
    }

    #[tokio::test]
    async fn test_failed_chain_becomes_placeholder() {
        let agg = aggregator(
            MockBalanceProvider::new()
                .with_balance(Chain::Ethereum, ETH_ADDR, "1")
                .with_failing_chain(Chain::Polygon),
            MockPriceOracle::new().with_price("ETH", dec!(2000)),
        );

        let portfolio = agg.aggregate(ETH_ADDR).await.unwrap();
        // Every candidate chain is present despite the polygon outage
        assert_eq!(portfolio.chains.len(), 6);
        let polygon = portfolio.chains.iter().find(|c| c.name == "polygon").unwrap();
        assert_eq!(polygon.symbol, "MATIC");
        assert_eq!(polygon.balance, "0");
        assert_eq!(polygon.usd_value, Decimal::ZERO);
        // Total still reflects the chains that worked
        assert_eq!(portfolio.total_usd_value, dec!(2000));
    }

    #[tokio::test]
    async fn test_total_is_sum_of_chain_values() {
        let agg = aggregator(
            MockBalanceProvider::new()
                .with_balance(Chain::Ethereum, ETH_ADDR, "1")
                .with_balance(Chain::Polygon, ETH_ADDR, "100"),
            MockPriceOracle::new()
                .with_price("ETH", dec!(2000))
                .with_price("MATIC", dec!(0.5)),
        );

        let portfolio = agg.aggregate(ETH_ADDR).await.unwrap();
        assert_eq!(portfolio.total_usd_value, portfolio.recomputed_total());
        assert_eq!(portfolio.total_usd_value, dec!(2050));
    }

    #[tokio::test]
    async fn test_aggregate_is_idempotent() {
        let agg = aggregator(
            MockBalanceProvider::new().with_balance(Chain::Ethereum, ETH_ADDR, "2.5"),
            MockPriceOracle::new().with_price("ETH", dec!(2000)),
        );

        let first = agg.aggregate(ETH_ADDR).await.unwrap();
        let second = agg.aggregate(ETH_ADDR).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_solana_address_yields_single_chain() {
        let agg = aggregator(
            MockBalanceProvider::new().with_balance(Chain::Solana, SOL_ADDR, "10"),
            MockPriceOracle::new().with_price("SOL", dec!(200)),
        );

        let portfolio = agg.aggregate(SOL_ADDR).await.unwrap();
        assert_eq!(portfolio.chains.len(), 1);
        assert_eq!(portfolio.chains[0].name, "solana");
        assert_eq!(portfolio.total_usd_value, dec!(2000));
    }

    #[tokio::test]
    async fn test_price_outage_still_returns_portfolio() {
        // Empty oracle: every lookup behaves like a timed-out price call
        let agg = aggregator(
            MockBalanceProvider::new().with_balance(Chain::Ethereum, ETH_ADDR, "2.5"),
            MockPriceOracle::new(),
        );

        let portfolio = agg.aggregate(ETH_ADDR).await.unwrap();
        assert_eq!(portfolio.total_usd_value, Decimal::ZERO);
        assert_eq!(portfolio.chains[0].balance, "2.5");
    }

    #[tokio::test]
    async fn test_comprehensive_attaches_enhancements() {
        let agg = aggregator(
            MockBalanceProvider::demo().with_malicious_flag(false),
            MockPriceOracle::demo(),
        );

        let portfolio = agg.aggregate_comprehensive(ETH_ADDR).await.unwrap();
        let security = portfolio.security.unwrap();
        assert!(security.checked);
        assert!(!security.is_malicious);
        let activity = portfolio.recent_activity.unwrap();
        assert!(activity.has_recent_activity);
        assert_eq!(activity.transaction_count, 3);
    }

    #[tokio::test]
    async fn test_basic_aggregate_omits_enhancements() {
        let agg = aggregator(MockBalanceProvider::demo(), MockPriceOracle::demo());
        let portfolio = agg.aggregate(ETH_ADDR).await.unwrap();
        assert!(portfolio.security.is_none());
        assert!(portfolio.recent_activity.is_none());
    }

    #[tokio::test]
    async fn test_exchange_rates_zero_for_unknown() {
        let agg = aggregator(
            MockBalanceProvider::new(),
            MockPriceOracle::new().with_price("ETH", dec!(2000)),
        );

        let rates = agg.exchange_rates(&["ETH".into(), "NOPE".into()]).await;
        assert_eq!(rates["ETH"], dec!(2000));
        assert_eq!(rates["NOPE"], Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_supported_chains_fallback() {
        let agg = aggregator(MockBalanceProvider::new(), MockPriceOracle::new());
        let chains = agg.supported_chains().await;
        assert!(chains.contains(&"ethereum".to_string()));
        assert!(chains.contains(&"solana".to_string()));
    }
}
