//! Error types for settlement

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// Ledger error (invalid obligation, self obligation...)
    #[error("Ledger error: {0}")]
    Ledger(#[from] ledger_core::Error),

    /// Balances do not sum to zero
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Amount arithmetic left the decimal range
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Transfers do not reproduce the balances they were derived from
    #[error("Settlement mismatch for party {party}: expected {expected}, transfers give {actual}")]
    SettlementMismatch {
        /// Party whose position differs
        party: String,
        /// Balance before settlement
        expected: Decimal,
        /// Net position implied by the transfers
        actual: Decimal,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
