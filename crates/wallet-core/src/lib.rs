//! # wallet-core
//!
//! Core logic for multi-chain wallet portfolio tracking: given one wallet
//! address, decide which chains it could live on, model the aggregated
//! USD-valued portfolio, and answer free-text questions about it with
//! deterministic rule-based analysis.
//!
//! ## Pipeline
//!
//! ```text
//! raw address
//!     │ classify()            which chain families is this syntactically
//!     ▼                       compatible with?
//! candidate chains ──► per-chain balance fetch (wallet-runtime)
//!     │                       tolerates partial failure per chain
//!     ▼
//! Portfolio document ──► QueryAnalyzer::analyze()
//!                         diversification / risk / performance /
//!                         recommendations / summary reports
//! ```
//!
//! This crate is pure: no I/O, no async. Network concerns (balance
//! providers, price oracles, the aggregation fan-out) live in
//! `wallet-runtime`; the HTTP surface lives in `wallet-server`.

pub mod address;
pub mod analyzer;
pub mod chains;
pub mod error;
pub mod model;

pub use address::{classify, is_valid_address};
pub use analyzer::{AnalyzerThresholds, QueryAnalyzer, QueryIntent};
pub use chains::{Chain, ChainConfig};
pub use error::{Result, WalletError};
pub use model::{ChainHolding, Holding, HoldingKind, Portfolio, TokenHolding};
