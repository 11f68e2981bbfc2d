//! Chain Balance Fetcher
//!
//! Retrieves one chain's holdings for an address: native balance, USD
//! valuation through the price oracle, and a best-effort token pass. A
//! failed token fetch never fails the chain fetch; a failed native fetch
//! propagates for the aggregator to absorb.

use std::sync::Arc;

use rust_decimal::Decimal;

use wallet_core::{Chain, ChainHolding, Result, TokenHolding, WalletError};

use crate::provider::{BalanceProvider, PriceProvider};

/// Per-chain balance fetcher over injected providers
#[derive(Clone)]
pub struct ChainBalanceFetcher {
    provider: Arc<dyn BalanceProvider>,
    prices: Arc<dyn PriceProvider>,
}

impl ChainBalanceFetcher {
    pub fn new(provider: Arc<dyn BalanceProvider>, prices: Arc<dyn PriceProvider>) -> Self {
        Self { provider, prices }
    }

    /// Fetch the holdings of `address` on `chain`.
    ///
    /// Fails with `UnsupportedChain` when the chain has no balance endpoint
    /// in the static config table, or `Provider` when the upstream call
    /// fails. The returned holding's `usd_value` is the native value plus
    /// the sum of its tokens' values.
    pub async fn fetch(&self, address: &str, chain: Chain) -> Result<ChainHolding> {
        let config = chain.config();
        if config.balance_endpoint.is_none() {
            return Err(WalletError::UnsupportedChain(chain.to_string()));
        }

        let raw = self.provider.fetch_native_balance(chain, address).await?;
        let amount: Decimal = raw.balance.parse().unwrap_or(Decimal::ZERO);
        let native_usd = self.prices.value_of(config.symbol, amount).await;

        // Token failures degrade to an empty list, never the whole chain
        let tokens = match self.provider.fetch_token_balances(chain, address).await {
            Ok(tokens) => self.price_tokens(tokens).await,
            Err(e) => {
                tracing::debug!(%chain, "token fetch failed, continuing without tokens: {}", e);
                Vec::new()
            }
        };
        let token_usd: Decimal = tokens.iter().map(|t| t.usd_value).sum();

        Ok(ChainHolding {
            name: chain.as_str().to_string(),
            symbol: config.symbol.to_string(),
            balance: raw.balance,
            usd_value: native_usd + token_usd,
            tokens,
        })
    }

    /// Fill in USD values on raw token holdings
    async fn price_tokens(&self, tokens: Vec<TokenHolding>) -> Vec<TokenHolding> {
        let mut priced = Vec::with_capacity(tokens.len());
        for mut token in tokens {
            let amount: Decimal = token.balance.parse().unwrap_or(Decimal::ZERO);
            token.usd_value = self.prices.value_of(&token.symbol, amount).await;
            priced.push(token);
        }
        priced
    }
}
