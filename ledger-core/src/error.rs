//! Error types for obligation aggregation

use crate::types::PartyId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Obligation amount is zero or negative
    #[error("Invalid amount {amount} for obligation {payer} -> {payee}: amount must be positive")]
    InvalidAmount {
        /// Party that owes
        payer: PartyId,
        /// Party that is owed
        payee: PartyId,
        /// Rejected amount
        amount: Decimal,
    },

    /// Payer and payee are the same party
    #[error("Self obligation rejected for party {0}")]
    SelfObligation(PartyId),

    /// Accumulated amount does not fit the decimal range
    #[error("Amount overflow on ledger edge {payer} -> {payee}")]
    AmountOverflow {
        /// Party that owes
        payer: PartyId,
        /// Party that is owed
        payee: PartyId,
    },

    /// Net balance of a party does not fit the decimal range
    #[error("Balance overflow for party {0}")]
    BalanceOverflow(PartyId),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
