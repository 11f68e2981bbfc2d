//! Chain Configuration
//!
//! The static per-chain table: native symbol, display name, and the balance
//! endpoint path on the upstream provider. Bitcoin is classifiable but has
//! no balance endpoint, so fetches against it fail as unsupported while
//! placeholder holdings stay constructible.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WalletError;

/// A supported blockchain network
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Polygon,
    Bsc,
    Arbitrum,
    Optimism,
    Avalanche,
    Solana,
    Bitcoin,
}

/// Static configuration for one chain
#[derive(Clone, Copy, Debug)]
pub struct ChainConfig {
    /// Native asset ticker (ETH, SOL, ...)
    pub symbol: &'static str,

    /// Human-readable network name
    pub display_name: &'static str,

    /// Balance endpoint path on the provider, `None` when the provider
    /// cannot serve balances for this chain
    pub balance_endpoint: Option<&'static str>,
}

impl Chain {
    /// Every chain in classification order
    pub const ALL: [Chain; 8] = [
        Chain::Ethereum,
        Chain::Polygon,
        Chain::Bsc,
        Chain::Arbitrum,
        Chain::Optimism,
        Chain::Avalanche,
        Chain::Solana,
        Chain::Bitcoin,
    ];

    /// The EVM family reachable from a 0x address
    pub const EVM: [Chain; 6] = [
        Chain::Ethereum,
        Chain::Polygon,
        Chain::Bsc,
        Chain::Arbitrum,
        Chain::Optimism,
        Chain::Avalanche,
    ];

    /// Lower-case chain identifier as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Polygon => "polygon",
            Chain::Bsc => "bsc",
            Chain::Arbitrum => "arbitrum",
            Chain::Optimism => "optimism",
            Chain::Avalanche => "avalanche",
            Chain::Solana => "solana",
            Chain::Bitcoin => "bitcoin",
        }
    }

    /// Static configuration for this chain
    pub fn config(&self) -> ChainConfig {
        match self {
            Chain::Ethereum => ChainConfig {
                symbol: "ETH",
                display_name: "Ethereum",
                balance_endpoint: Some("v3/ethereum/account/balance"),
            },
            Chain::Polygon => ChainConfig {
                symbol: "MATIC",
                display_name: "Polygon",
                balance_endpoint: Some("v3/polygon/account/balance"),
            },
            Chain::Bsc => ChainConfig {
                symbol: "BNB",
                display_name: "BNB Smart Chain",
                balance_endpoint: Some("v3/bsc/account/balance"),
            },
            Chain::Arbitrum => ChainConfig {
                symbol: "ETH",
                display_name: "Arbitrum",
                balance_endpoint: Some("v3/arbitrum/account/balance"),
            },
            Chain::Optimism => ChainConfig {
                symbol: "ETH",
                display_name: "Optimism",
                balance_endpoint: Some("v3/optimism/account/balance"),
            },
            Chain::Avalanche => ChainConfig {
                symbol: "AVAX",
                display_name: "Avalanche",
                balance_endpoint: Some("v3/avalanche/account/balance"),
            },
            Chain::Solana => ChainConfig {
                symbol: "SOL",
                display_name: "Solana",
                balance_endpoint: Some("v3/solana/account/balance"),
            },
            Chain::Bitcoin => ChainConfig {
                symbol: "BTC",
                display_name: "Bitcoin",
                balance_endpoint: None,
            },
        }
    }

    /// Native asset ticker
    pub fn symbol(&self) -> &'static str {
        self.config().symbol
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ethereum" => Ok(Chain::Ethereum),
            "polygon" => Ok(Chain::Polygon),
            "bsc" => Ok(Chain::Bsc),
            "arbitrum" => Ok(Chain::Arbitrum),
            "optimism" => Ok(Chain::Optimism),
            "avalanche" => Ok(Chain::Avalanche),
            "solana" => Ok(Chain::Solana),
            "bitcoin" => Ok(Chain::Bitcoin),
            other => Err(WalletError::UnsupportedChain(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for chain in Chain::ALL {
            assert_eq!(chain.as_str().parse::<Chain>().unwrap(), chain);
        }
    }

    #[test]
    fn test_unknown_chain_rejected() {
        assert!("dogecoin".parse::<Chain>().is_err());
    }

    #[test]
    fn test_bitcoin_has_no_balance_endpoint() {
        assert!(Chain::Bitcoin.config().balance_endpoint.is_none());
        assert_eq!(Chain::Bitcoin.symbol(), "BTC");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Chain::Bsc).unwrap();
        assert_eq!(json, "\"bsc\"");
    }
}
