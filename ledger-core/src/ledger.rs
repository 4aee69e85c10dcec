//! Obligation aggregation
//!
//! Collapses raw obligations into a directed graph with a single weighted
//! edge per ordered (payer, payee) pair, then reduces that graph to net
//! balances.
//!
//! # Example
//!
//! ```
//! use ledger_core::{LedgerAggregator, Obligation, PartyId};
//! use rust_decimal::Decimal;
//!
//! let aggregator = LedgerAggregator::default();
//! let ledger = aggregator.aggregate(&[
//!     Obligation::new("A", "B", Decimal::from(10)),
//!     Obligation::new("A", "B", Decimal::from(5)),
//!     Obligation::new("B", "C", Decimal::from(3)),
//! ])?;
//! assert_eq!(ledger.len(), 2);
//!
//! let balances = ledger.derive_balances()?;
//! assert_eq!(balances.balance_of(&PartyId::new("A")), Decimal::from(-15));
//! assert!(balances.is_balanced());
//! # Ok::<(), ledger_core::Error>(())
//! ```

use crate::{
    balance::{checked_sum, Balances},
    config::{AggregationConfig, SelfObligationPolicy},
    types::{Obligation, PartyId},
    Error, Result,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Aggregated obligation between an ordered pair of parties
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEdge {
    /// Party that owes
    pub payer: PartyId,

    /// Party that is owed
    pub payee: PartyId,

    /// Accumulated amount
    pub amount: Decimal,
}

/// Aggregated, deduplicated obligation graph
///
/// Edges are kept in the order their (payer, payee) pair first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    edges: Vec<LedgerEdge>,
    index: HashMap<(PartyId, PartyId), usize>,
}

impl Ledger {
    /// Add an amount to the (payer, payee) edge, creating it if needed
    fn record(&mut self, payer: &PartyId, payee: &PartyId, amount: Decimal) -> Result<()> {
        let key = (payer.clone(), payee.clone());
        match self.index.get(&key) {
            Some(&idx) => {
                let edge = &mut self.edges[idx];
                edge.amount = edge.amount.checked_add(amount).ok_or_else(|| {
                    Error::AmountOverflow {
                        payer: payer.clone(),
                        payee: payee.clone(),
                    }
                })?;
            }
            None => {
                debug!(payer = %payer, payee = %payee, "Creating ledger edge");
                self.index.insert(key, self.edges.len());
                self.edges.push(LedgerEdge {
                    payer: payer.clone(),
                    payee: payee.clone(),
                    amount,
                });
            }
        }
        Ok(())
    }

    /// Aggregated amount owed by `payer` to `payee`
    pub fn amount(&self, payer: &PartyId, payee: &PartyId) -> Option<Decimal> {
        self.index
            .get(&(payer.clone(), payee.clone()))
            .map(|&idx| self.edges[idx].amount)
    }

    /// Edges in first-appearance order
    pub fn edges(&self) -> &[LedgerEdge] {
        &self.edges
    }

    /// Number of edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// No edges
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Distinct parties in first-appearance order
    pub fn parties(&self) -> Vec<&PartyId> {
        let mut seen = HashSet::new();
        self.edges
            .iter()
            .flat_map(|e| [&e.payer, &e.payee])
            .filter(|p| seen.insert(*p))
            .collect()
    }

    /// Sum of all edge amounts, `None` if it exceeds the decimal range
    pub fn gross_amount(&self) -> Option<Decimal> {
        checked_sum(self.edges.iter().map(|e| e.amount))
    }

    /// Reduce the ledger to per-party net balances
    ///
    /// Every edge debits its payer and credits its payee by the same amount,
    /// so the result always sums to zero. Fails with `BalanceOverflow` when a
    /// party's net position leaves the decimal range.
    pub fn derive_balances(&self) -> Result<Balances> {
        let mut balances = Balances::new();
        for edge in &self.edges {
            balances.adjust(&edge.payer, -edge.amount)?;
            balances.adjust(&edge.payee, edge.amount)?;
        }
        Ok(balances)
    }
}

impl Serialize for Ledger {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.edges.serialize(serializer)
    }
}

/// Builds ledgers and balances from raw obligations
#[derive(Debug, Clone, Default)]
pub struct LedgerAggregator {
    config: AggregationConfig,
}

impl LedgerAggregator {
    /// Create new aggregator
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    /// Aggregate obligations into a ledger
    ///
    /// Fails on the first obligation with a non-positive amount, or on a
    /// self obligation when the policy is `Reject`. No partial ledger is
    /// returned.
    pub fn aggregate(&self, obligations: &[Obligation]) -> Result<Ledger> {
        let mut ledger = Ledger::default();

        for obligation in obligations {
            if obligation.amount <= Decimal::ZERO {
                return Err(Error::InvalidAmount {
                    payer: obligation.payer.clone(),
                    payee: obligation.payee.clone(),
                    amount: obligation.amount,
                });
            }

            if obligation.is_self_obligation() {
                match self.config.self_obligations {
                    SelfObligationPolicy::Reject => {
                        return Err(Error::SelfObligation(obligation.payer.clone()));
                    }
                    SelfObligationPolicy::Ignore => {
                        warn!(party = %obligation.payer, amount = %obligation.amount, "Ignoring self obligation");
                        continue;
                    }
                }
            }

            ledger.record(&obligation.payer, &obligation.payee, obligation.amount)?;
        }

        info!(
            "Aggregated {} obligations into {} ledger edges",
            obligations.len(),
            ledger.len()
        );

        Ok(ledger)
    }

    /// Reduce a ledger to net balances
    pub fn derive_balances(&self, ledger: &Ledger) -> Result<Balances> {
        ledger.derive_balances()
    }

    /// Aggregate obligations and derive net balances in one step
    pub fn compute_balances(&self, obligations: &[Obligation]) -> Result<Balances> {
        self.aggregate(obligations)?.derive_balances()
    }
}

/// Compute net balances with the default aggregation policy
pub fn compute_balances(obligations: &[Obligation]) -> Result<Balances> {
    LedgerAggregator::default().compute_balances(obligations)
}
