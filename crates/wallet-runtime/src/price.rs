//! CoinGecko Price Oracle
//!
//! Live [`PriceProvider`] over the CoinGecko simple-price endpoint. No
//! caching, no retries: one best-effort GET per lookup with an enforced
//! client timeout, and zero on any failure.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use wallet_core::{Result, WalletError};

use crate::provider::PriceProvider;

/// CoinGecko client configuration
#[derive(Clone, Debug)]
pub struct CoinGeckoConfig {
    /// API base URL
    pub base_url: String,

    /// Per-request timeout in seconds; a timed-out lookup prices at zero
    pub timeout_secs: u64,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com".into(),
            timeout_secs: 4,
        }
    }
}

impl CoinGeckoConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("COINGECKO_BASE_URL")
                .unwrap_or_else(|_| "https://api.coingecko.com".into()),
            ..Default::default()
        }
    }
}

/// Price oracle backed by CoinGecko
pub struct CoinGeckoOracle {
    client: reqwest::Client,
    config: CoinGeckoConfig,
}

impl CoinGeckoOracle {
    pub fn new(config: CoinGeckoConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WalletError::Unexpected(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(CoinGeckoConfig::from_env())
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoOracle {
    async fn unit_price(&self, symbol: &str) -> Decimal {
        let id = coin_id(symbol);
        let url = format!(
            "{}/api/v3/simple/price?ids={}&vs_currencies=usd",
            self.config.base_url, id
        );

        let body = match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<Value>().await {
                    Ok(body) => body,
                    Err(e) => {
                        tracing::warn!(%symbol, "price response parse failed: {}", e);
                        return Decimal::ZERO;
                    }
                }
            }
            Ok(response) => {
                tracing::warn!(%symbol, status = %response.status(), "price lookup rejected");
                return Decimal::ZERO;
            }
            Err(e) => {
                tracing::warn!(%symbol, "price lookup failed: {}", e);
                return Decimal::ZERO;
            }
        };

        parse_usd_price(&body, &id)
    }

    fn name(&self) -> &str {
        "CoinGecko"
    }
}

/// Map a ticker symbol to a CoinGecko coin identifier; unknown symbols fall
/// back to the lower-cased symbol
pub fn coin_id(symbol: &str) -> String {
    match symbol.to_uppercase().as_str() {
        "ETH" => "ethereum".into(),
        "MATIC" => "polygon".into(),
        "SOL" => "solana".into(),
        "BNB" => "binancecoin".into(),
        "AVAX" => "avalanche-2".into(),
        "BTC" => "bitcoin".into(),
        other => other.to_lowercase(),
    }
}

/// Read `{coin_id: {"usd": price}}` out of a simple-price response, zero
/// when the field is missing or malformed
fn parse_usd_price(body: &Value, coin_id: &str) -> Decimal {
    body.get(coin_id)
        .and_then(|coin| coin.get("usd"))
        .and_then(Value::as_f64)
        .and_then(Decimal::from_f64_retain)
        .filter(|price| *price >= Decimal::ZERO)
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_coin_id_known_symbols() {
        assert_eq!(coin_id("ETH"), "ethereum");
        assert_eq!(coin_id("eth"), "ethereum");
        assert_eq!(coin_id("MATIC"), "polygon");
        assert_eq!(coin_id("SOL"), "solana");
        assert_eq!(coin_id("BNB"), "binancecoin");
        assert_eq!(coin_id("AVAX"), "avalanche-2");
        assert_eq!(coin_id("BTC"), "bitcoin");
    }

    #[test]
    fn test_coin_id_unknown_symbol_falls_back_to_lowercase() {
        assert_eq!(coin_id("DOGE"), "doge");
        assert_eq!(coin_id("WeirdToken"), "weirdtoken");
    }

    #[test]
    fn test_parse_usd_price() {
        let body = json!({"ethereum": {"usd": 2000.0}});
        assert_eq!(parse_usd_price(&body, "ethereum"), dec!(2000));
    }

    #[test]
    fn test_parse_usd_price_missing_field_is_zero() {
        assert_eq!(parse_usd_price(&json!({}), "ethereum"), Decimal::ZERO);
        assert_eq!(
            parse_usd_price(&json!({"ethereum": {}}), "ethereum"),
            Decimal::ZERO
        );
        assert_eq!(
            parse_usd_price(&json!({"ethereum": {"usd": "oops"}}), "ethereum"),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_parse_usd_price_rejects_negative() {
        let body = json!({"ethereum": {"usd": -1.0}});
        assert_eq!(parse_usd_price(&body, "ethereum"), Decimal::ZERO);
    }
}
