//! Core types for obligation aggregation
//!
//! All amounts are exact decimals. Parties carry identity only.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Party identifier (person, bank, account holder...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyId(String);

impl PartyId {
    /// Create new party ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PartyId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PartyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single recorded debt: `payer` owes `payee` the given amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
    /// Party that owes
    pub payer: PartyId,

    /// Party that is owed
    pub payee: PartyId,

    /// Amount owed (must be positive)
    pub amount: Decimal,
}

impl Obligation {
    /// Create new obligation
    pub fn new(payer: impl Into<PartyId>, payee: impl Into<PartyId>, amount: Decimal) -> Self {
        Self {
            payer: payer.into(),
            payee: payee.into(),
            amount,
        }
    }

    /// Payer and payee are the same party
    pub fn is_self_obligation(&self) -> bool {
        self.payer == self.payee
    }
}

impl fmt::Display for Obligation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.payer, self.payee, self.amount)
    }
}
