//! Cashflow Ledger Core
//!
//! Aggregates pairwise obligations into a deduplicated obligation graph and
//! reduces it to per-party net balances.
//!
//! # Architecture
//!
//! - **Aggregation**: one weighted edge per ordered (payer, payee) pair
//! - **Balances**: payer debited, payee credited by each edge amount
//! - **Ordering**: parties and edges keep first-appearance order
//!
//! # Invariants
//!
//! - Money conservation: Σ(balances) == 0 for every derived balance set
//! - Only positive amounts enter the ledger
//! - Deterministic: same obligations → same ledger, same balances

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod balance;
pub mod config;
pub mod error;
pub mod ledger;
pub mod types;

// Re-exports
pub use balance::{checked_sum, Balances, PartyBalance};
pub use config::{AggregationConfig, Config, SelfObligationPolicy};
pub use error::{Error, Result};
pub use ledger::{compute_balances, Ledger, LedgerAggregator, LedgerEdge};
pub use types::{Obligation, PartyId};
