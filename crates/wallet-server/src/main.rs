//! Wallet Portfolio HTTP Server
//!
//! Axum-based server exposing the aggregation pipeline and the rule-based
//! portfolio analyst over REST. Runs against the live Tatum/CoinGecko
//! backends when an API key is configured, and falls back to deterministic
//! demo providers otherwise.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wallet_core::QueryAnalyzer;
use wallet_runtime::{
    BalanceProvider, CoinGeckoOracle, MockBalanceProvider, MockPriceOracle, PortfolioAggregator,
    PriceProvider, TatumClient, TatumConfig,
};

use crate::handlers::{
    analyze_portfolio, exchange_rates, get_portfolio, health_check, list_chains,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Select providers: live backends with an API key, demo mode without
    let tatum_config = TatumConfig::from_env();
    let (provider, prices): (Arc<dyn BalanceProvider>, Arc<dyn PriceProvider>) =
        if tatum_config.api_key.is_some() {
            tracing::info!("✓ Tatum API key configured (key {})", tatum_config.redacted_key());
            (
                Arc::new(TatumClient::new(tatum_config)?),
                Arc::new(CoinGeckoOracle::from_env()?),
            )
        } else {
            tracing::warn!("⚠ TATUM_API_KEY not set - using demo data");
            tracing::warn!("  Add your API key to .env for live blockchain data");
            (Arc::new(MockBalanceProvider::demo()), Arc::new(MockPriceOracle::demo()))
        };

    if provider.health_check().await {
        tracing::info!("✓ Balance provider '{}' reachable", provider.name());
    } else {
        tracing::warn!("⚠ Balance provider '{}' unreachable - portfolios will be empty", provider.name());
    }

    // Build application state
    let state = AppState {
        aggregator: Arc::new(PortfolioAggregator::new(provider, prices)),
        analyzer: Arc::new(QueryAnalyzer::new()),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/portfolio/{address}", get(get_portfolio))
        .route("/api/chains", get(list_chains))
        .route("/api/rates", get(exchange_rates))
        .route("/api/ai/analyze", post(analyze_portfolio))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5002".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 Wallet portfolio server running on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /api/health               - Health check");
    tracing::info!("  GET  /api/portfolio/{{address}}  - Aggregated portfolio");
    tracing::info!("  GET  /api/chains               - Supported chains");
    tracing::info!("  GET  /api/rates                - USD exchange rates");
    tracing::info!("  POST /api/ai/analyze           - Portfolio Q&A");

    axum::serve(listener, app).await?;

    Ok(())
}
