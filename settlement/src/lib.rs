//! Settlement Engine
//!
//! Nets pairwise obligations into a short list of settlement transfers.
//!
//! # Architecture
//!
//! 1. **Aggregation**: collapse obligations into one edge per ordered pair
//!    (`ledger_core::LedgerAggregator`)
//! 2. **Balances**: reduce the ledger to per-party net positions
//! 3. **Matching**: pair debtors with creditors, carrying partial amounts
//!    forward (`SettlementMatcher`)
//! 4. **Verification**: check the transfers reproduce every net position
//!
//! # Example
//!
//! ```
//! use ledger_core::Obligation;
//! use rust_decimal::Decimal;
//! use settlement::{Config, SettlementEngine, Transfer};
//!
//! let engine = SettlementEngine::new(Config::default())?;
//! let plan = engine.net(&[
//!     Obligation::new("A", "B", Decimal::from(50)),
//!     Obligation::new("B", "C", Decimal::from(30)),
//!     Obligation::new("A", "C", Decimal::from(20)),
//! ])?;
//!
//! assert_eq!(plan.transfers, vec![
//!     Transfer::new("A", "B", Decimal::from(20)),
//!     Transfer::new("A", "C", Decimal::from(50)),
//! ]);
//! # Ok::<(), settlement::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod engine;
pub mod error;
pub mod netting;
pub mod types;

// Re-exports
pub use config::{Config, MatchOrdering, NettingConfig};
pub use engine::SettlementEngine;
pub use error::{Error, Result};
pub use netting::{compute_settlement, verify_settlement, SettlementMatcher};
pub use types::*;
