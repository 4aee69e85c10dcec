//! Core types for settlement

use crate::{Error, Result};
use ledger_core::{checked_sum, Balances, LedgerEdge, Obligation, PartyId};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Group number partitioning independent obligation sets
pub type GroupId = u64;

/// Payment from a net debtor to a net creditor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Debtor (pays)
    pub from: PartyId,

    /// Creditor (receives)
    pub to: PartyId,

    /// Amount to transfer (always positive)
    pub amount: Decimal,
}

impl Transfer {
    /// Create new transfer
    pub fn new(from: impl Into<PartyId>, to: impl Into<PartyId>, amount: Decimal) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pays {} {}", self.from, self.to, self.amount)
    }
}

/// Obligation tagged with the group it is settled in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedObligation {
    /// Group number (0 when absent), also read from a `group no.` column
    #[serde(default, alias = "group no.")]
    pub group: GroupId,

    /// The obligation itself
    #[serde(flatten)]
    pub obligation: Obligation,
}

/// Netting statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NettingStats {
    /// Number of parties with a recorded balance
    pub party_count: usize,

    /// Number of raw obligations
    pub gross_obligation_count: usize,

    /// Number of aggregated ledger edges
    pub ledger_edge_count: usize,

    /// Number of net transfers
    pub net_transfer_count: usize,

    /// Total gross amount
    pub total_gross: Decimal,

    /// Total net amount
    pub total_net: Decimal,

    /// Amount saved
    pub amount_saved: Decimal,

    /// Netting efficiency (0.0 - 1.0)
    pub efficiency: f64,

    /// Number of transfers eliminated relative to the raw obligations
    pub transfers_eliminated: usize,
}

impl NettingStats {
    /// Compute statistics for a settlement run
    ///
    /// Fails with `Error::Overflow` when the gross or net total does not fit
    /// the decimal range.
    pub fn compute(
        gross_obligation_count: usize,
        edges: &[LedgerEdge],
        balances: &Balances,
        transfers: &[Transfer],
    ) -> Result<Self> {
        let total_gross = checked_sum(edges.iter().map(|e| e.amount))
            .ok_or_else(|| Error::Overflow("total gross amount".to_string()))?;
        let total_net = checked_sum(transfers.iter().map(|t| t.amount))
            .ok_or_else(|| Error::Overflow("total net amount".to_string()))?;
        let amount_saved = total_gross
            .checked_sub(total_net)
            .ok_or_else(|| Error::Overflow("amount saved".to_string()))?;

        Ok(Self {
            party_count: balances.len(),
            gross_obligation_count,
            ledger_edge_count: edges.len(),
            net_transfer_count: transfers.len(),
            total_gross,
            total_net,
            amount_saved,
            efficiency: efficiency(total_gross, amount_saved),
            transfers_eliminated: gross_obligation_count.saturating_sub(transfers.len()),
        })
    }
}

/// Share of the gross amount that no longer has to move
fn efficiency(gross: Decimal, saved: Decimal) -> f64 {
    if gross == Decimal::ZERO {
        return 0.0;
    }
    (saved / gross).to_f64().unwrap_or(0.0)
}

/// Full result of netting one obligation set
#[derive(Debug, Clone, Serialize)]
pub struct SettlementPlan {
    /// Aggregated obligation graph before netting
    pub ledger: Vec<LedgerEdge>,

    /// Net balances
    pub balances: Balances,

    /// Transfers realizing the balances
    pub transfers: Vec<Transfer>,

    /// Netting statistics
    pub stats: NettingStats,
}

/// Settlement plan for one group
#[derive(Debug, Clone, Serialize)]
pub struct GroupSettlement {
    /// Group number
    pub group: GroupId,

    /// Plan for the group's obligations
    pub plan: SettlementPlan,
}
