//! Error Types

use thiserror::Error;

/// Result type alias for wallet operations
pub type Result<T> = std::result::Result<T, WalletError>;

/// Wallet error types
///
/// Only `InvalidAddress` ever reaches the end user as a failure; per-chain
/// and per-price errors are absorbed into zero-value placeholders by the
/// aggregation layer.
#[derive(Error, Debug)]
pub enum WalletError {
    /// Address fails strict format validation (client error)
    #[error("Invalid wallet address format: {0}")]
    InvalidAddress(String),

    /// An upstream balance/price provider call failed for one chain
    #[error("Provider error on {chain}: {message}")]
    Provider { chain: String, message: String },

    /// Requested chain is absent from the static configuration table
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything else (surfaced as a generic 500)
    #[error("{0}")]
    Unexpected(String),
}

impl WalletError {
    /// Provider error for a chain, from any displayable cause
    pub fn provider(chain: impl Into<String>, err: impl std::fmt::Display) -> Self {
        WalletError::Provider {
            chain: chain.into(),
            message: err.to_string(),
        }
    }

    /// True if the error is absorbed into a degraded value rather than
    /// propagated to the caller
    pub fn is_absorbable(&self) -> bool {
        matches!(
            self,
            WalletError::Provider { .. } | WalletError::UnsupportedChain(_)
        )
    }

    /// Convert to a client-safe message (no upstream details)
    pub fn user_message(&self) -> String {
        match self {
            WalletError::InvalidAddress(_) => {
                "Please provide a valid Ethereum, Polygon, or Solana address".into()
            }
            WalletError::Provider { chain, .. } => {
                format!("Balance data for {} is temporarily unavailable", chain)
            }
            WalletError::UnsupportedChain(chain) => format!("Chain '{}' is not supported", chain),
            _ => "An unexpected error occurred".into(),
        }
    }
}

impl From<anyhow::Error> for WalletError {
    fn from(err: anyhow::Error) -> Self {
        WalletError::Unexpected(err.to_string())
    }
}
