//! Application State

use std::sync::Arc;

use wallet_core::QueryAnalyzer;
use wallet_runtime::PortfolioAggregator;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Portfolio aggregation pipeline over the configured providers
    pub aggregator: Arc<PortfolioAggregator>,

    /// Rule-based portfolio analyst
    pub analyzer: Arc<QueryAnalyzer>,
}
