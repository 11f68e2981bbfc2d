//! Tatum Balance Provider
//!
//! reqwest-based implementation of [`BalanceProvider`] against the Tatum
//! REST API. Balance responses have drifted across API generations, so the
//! native balance is read through an ordered field fallback
//! (`balance` | `value` | `result`), defaulting to `"0"` when the call
//! succeeds but carries no recognized field.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use wallet_core::{Chain, Result, TokenHolding, WalletError};

use crate::provider::{BalanceProvider, RawBalance};

/// Tatum client configuration
#[derive(Clone, Debug)]
pub struct TatumConfig {
    /// API key; requests go out unauthenticated without one
    pub api_key: Option<String>,

    /// API base URL
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TatumConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.tatum.io".into(),
            timeout_secs: 10,
        }
    }
}

impl TatumConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("TATUM_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: std::env::var("TATUM_BASE_URL")
                .unwrap_or_else(|_| "https://api.tatum.io".into()),
            ..Default::default()
        }
    }

    /// Redacted key for log lines; the full key is never logged
    pub fn redacted_key(&self) -> String {
        match &self.api_key {
            Some(key) if key.len() > 4 => format!("...{}", &key[key.len() - 4..]),
            Some(_) => "...".into(),
            None => "<unset>".into(),
        }
    }
}

/// Tatum REST API client
pub struct TatumClient {
    client: reqwest::Client,
    config: TatumConfig,
}

impl TatumClient {
    pub fn new(config: TatumConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WalletError::Unexpected(e.to_string()))?;

        tracing::info!(
            base_url = %config.base_url,
            api_key = %config.redacted_key(),
            "initialized Tatum client"
        );
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(TatumConfig::from_env())
    }

    /// Issue one GET and parse the JSON body
    async fn get_json(&self, url: &str, chain: &str) -> Result<Value> {
        let mut request = self.client.get(url);
        if let Some(key) = &self.config.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| WalletError::provider(chain, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WalletError::provider(chain, format!("HTTP {}", status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| WalletError::provider(chain, e))
    }
}

#[async_trait]
impl BalanceProvider for TatumClient {
    async fn fetch_native_balance(&self, chain: Chain, address: &str) -> Result<RawBalance> {
        let endpoint = chain
            .config()
            .balance_endpoint
            .ok_or_else(|| WalletError::UnsupportedChain(chain.to_string()))?;

        let url = format!("{}/{}/{}", self.config.base_url, endpoint, address);
        let body = self.get_json(&url, chain.as_str()).await?;

        let balance = extract_balance_field(&body).unwrap_or_else(|| "0".into());
        tracing::debug!(%chain, %balance, "fetched native balance");
        Ok(RawBalance::new(balance))
    }

    async fn fetch_token_balances(
        &self,
        chain: Chain,
        address: &str,
    ) -> Result<Vec<TokenHolding>> {
        let url = format!(
            "{}/v4/data/balances?chain={}&addresses={}",
            self.config.base_url, chain, address
        );
        let body = self.get_json(&url, chain.as_str()).await?;

        let entries = body
            .get("result")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let tokens = entries
            .iter()
            .filter_map(|entry| {
                let contract = entry.get("tokenAddress")?.as_str()?.to_string();
                let balance = extract_balance_field(entry)?;
                let symbol = entry
                    .get("symbol")
                    .and_then(Value::as_str)
                    .unwrap_or("UNKNOWN")
                    .to_string();
                Some(TokenHolding {
                    symbol,
                    contract_address: contract,
                    balance,
                    usd_value: rust_decimal::Decimal::ZERO,
                })
            })
            .collect();

        Ok(tokens)
    }

    async fn is_malicious(&self, address: &str) -> Result<bool> {
        let url = format!("{}/v3/security/address/{}", self.config.base_url, address);
        let body = self.get_json(&url, "security").await?;

        let malicious = body
            .get("isKnownMalicious")
            .or_else(|| body.get("malicious"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Ok(malicious)
    }

    async fn recent_transaction_count(&self, address: &str, limit: u32) -> Result<u32> {
        let url = format!(
            "{}/v3/ethereum/account/transaction/{}?pageSize={}",
            self.config.base_url, address, limit
        );
        let body = self.get_json(&url, "transactions").await?;

        let count = body.as_array().map(Vec::len).unwrap_or(0);
        Ok(count as u32)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/v3/tatum/version", self.config.base_url);
        match self.get_json(&url, "health").await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Tatum health check failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &str {
        "Tatum"
    }
}

/// Ordered-fallback extraction of the native balance field.
///
/// Legacy response shapes carry the balance under `balance`, `value`, or
/// `result`; the first recognized field wins. Accepts both string and
/// numeric JSON values.
pub fn extract_balance_field(body: &Value) -> Option<String> {
    for key in ["balance", "value", "result"] {
        match body.get(key) {
            Some(Value::String(s)) => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => continue,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_balance_legacy_shapes() {
        assert_eq!(
            extract_balance_field(&json!({"balance": "2.5"})),
            Some("2.5".into())
        );
        assert_eq!(
            extract_balance_field(&json!({"value": "1.25"})),
            Some("1.25".into())
        );
        assert_eq!(
            extract_balance_field(&json!({"result": "0.001"})),
            Some("0.001".into())
        );
    }

    #[test]
    fn test_extract_balance_priority_order() {
        // balance wins over value, value over result
        let body = json!({"result": "3", "value": "2", "balance": "1"});
        assert_eq!(extract_balance_field(&body), Some("1".into()));
        let body = json!({"result": "3", "value": "2"});
        assert_eq!(extract_balance_field(&body), Some("2".into()));
    }

    #[test]
    fn test_extract_balance_numeric_value() {
        assert_eq!(
            extract_balance_field(&json!({"balance": 2.5})),
            Some("2.5".into())
        );
    }

    #[test]
    fn test_extract_balance_unrecognized_shape() {
        assert_eq!(extract_balance_field(&json!({"amount": "5"})), None);
        assert_eq!(extract_balance_field(&json!({})), None);
        // null fields are skipped, not treated as present
        assert_eq!(extract_balance_field(&json!({"balance": null})), None);
    }

    #[test]
    fn test_api_key_is_redacted() {
        let config = TatumConfig {
            api_key: Some("t-secret-api-key-1234".into()),
            ..Default::default()
        };
        let redacted = config.redacted_key();
        assert_eq!(redacted, "...1234");
        assert!(!redacted.contains("secret"));

        let unset = TatumConfig::default();
        assert_eq!(unset.redacted_key(), "<unset>");
    }

    #[tokio::test]
    async fn test_bitcoin_is_unsupported() {
        let client = TatumClient::new(TatumConfig::default()).unwrap();
        let err = client
            .fetch_native_balance(Chain::Bitcoin, "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::UnsupportedChain(_)));
    }
}
