//! HTTP Handlers

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wallet_core::{Portfolio, WalletError};

use crate::state::AppState;

/// Rates requests are clipped to this many symbols to keep the upstream
/// fan-out bounded
const MAX_RATE_CURRENCIES: usize = 5;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: String,
    pub provider: String,
    pub provider_connected: bool,
    pub price_source: String,
    pub version: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis: String,
    pub portfolio_data: Portfolio,
    pub timestamp: DateTime<Utc>,
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ChainsResponse {
    pub chains: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RatesParams {
    #[serde(default)]
    pub currencies: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RatesResponse {
    pub rates: HashMap<String, Decimal>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, error: &str, details: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse { error: error.into(), details: details.into() }),
    )
}

/// Map a pipeline error onto the wire: invalid addresses are the client's
/// fault, everything else is a generic 500 with details kept in the logs
fn portfolio_error(context: &str, err: &WalletError) -> ApiError {
    match err {
        WalletError::InvalidAddress(_) => error_response(
            StatusCode::BAD_REQUEST,
            "Invalid wallet address format",
            err.user_message(),
        ),
        other => {
            tracing::error!("{}: {}", context, other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, context, other.user_message())
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider_connected = state.aggregator.provider_healthy().await;

    Json(HealthResponse {
        status: "OK",
        message: "Wallet portfolio API is running".into(),
        provider: state.aggregator.provider_name().to_string(),
        provider_connected,
        price_source: state.aggregator.price_source_name().to_string(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Aggregated portfolio for one address
pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Portfolio>, ApiError> {
    tracing::info!("portfolio request");

    let portfolio = state
        .aggregator
        .aggregate(&address)
        .await
        .map_err(|e| portfolio_error("Failed to fetch portfolio data", &e))?;

    Ok(Json(portfolio))
}

/// Rule-based analysis of a portfolio against a free-text query
pub async fn analyze_portfolio(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let (address, query) = match (payload.wallet_address, payload.query) {
        (Some(address), Some(query)) if !address.is_empty() && !query.is_empty() => {
            (address, query)
        }
        _ => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Wallet address and query are required",
                "Provide both 'walletAddress' and 'query' fields",
            ));
        }
    };

    tracing::info!(query = %query, "analysis request");

    // Fresh, enhanced portfolio per query; nothing is cached between calls
    let portfolio = state
        .aggregator
        .aggregate_comprehensive(&address)
        .await
        .map_err(|e| portfolio_error("Failed to analyze portfolio", &e))?;

    let analysis = state.analyzer.analyze(Some(&portfolio), &query);

    Ok(Json(AnalyzeResponse {
        analysis,
        portfolio_data: portfolio,
        timestamp: Utc::now(),
        query,
    }))
}

/// Chains the configured backend can serve
pub async fn list_chains(State(state): State<AppState>) -> Json<ChainsResponse> {
    Json(ChainsResponse { chains: state.aggregator.supported_chains().await })
}

/// Current USD rates for up to five symbols
pub async fn exchange_rates(
    State(state): State<AppState>,
    Query(params): Query<RatesParams>,
) -> Json<RatesResponse> {
    let currencies = parse_currency_list(params.currencies.as_deref());
    tracing::info!(currencies = ?currencies, "rates request");

    let rates = state.aggregator.exchange_rates(&currencies).await;
    Json(RatesResponse { rates, timestamp: Utc::now() })
}

/// Split and clip the `currencies` query parameter, defaulting to the
/// classic trio
fn parse_currency_list(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => raw
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .take(MAX_RATE_CURRENCIES)
            .collect(),
        _ => vec!["ETH".into(), "BTC".into(), "MATIC".into()],
    }
}
