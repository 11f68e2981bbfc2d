//! # wallet-runtime
//!
//! Runtime providers and the aggregation pipeline for wallet-core.
//!
//! The external world is reached through two capability traits:
//! [`BalanceProvider`] (native + token balances for one chain/address pair)
//! and [`PriceProvider`] (USD unit prices). HTTP implementations talk to the
//! Tatum and CoinGecko public APIs; deterministic mock implementations back
//! the test suite and demo mode. [`PortfolioAggregator`] orchestrates
//! classification, the concurrent per-chain fan-out, and failure absorption
//! into placeholder holdings.

pub mod aggregator;
pub mod fetcher;
pub mod mock;
pub mod price;
pub mod provider;
pub mod tatum;

pub use aggregator::PortfolioAggregator;
pub use fetcher::ChainBalanceFetcher;
pub use mock::{MockBalanceProvider, MockPriceOracle};
pub use price::{CoinGeckoConfig, CoinGeckoOracle};
pub use provider::{BalanceProvider, PriceProvider, RawBalance};
pub use tatum::{TatumClient, TatumConfig};
