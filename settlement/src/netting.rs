//! Settlement matching
//!
//! Turns net balances into a short list of transfers by walking debtors and
//! creditors with two cursors. Each step moves `min(debt, credit)` from the
//! current debtor to the current creditor; whichever side reaches zero
//! advances, the other keeps its reduced amount for the next step.
//!
//! # Example
//!
//! ```text
//! Obligations:
//!   A owes B: 50
//!   B owes C: 30
//!   A owes C: 20
//!
//! Net positions:
//!   A: -70 (debtor)
//!   B: +20 (creditor)
//!   C: +50 (creditor)
//!
//! Transfers:
//!   A pays B: 20
//!   A pays C: 50
//! ```
//!
//! The matching is greedy. It produces at most `debtors + creditors - 1`
//! transfers but does not search for the minimum possible count.

use crate::{
    config::{MatchOrdering, NettingConfig},
    types::Transfer,
    Error, Result,
};
use ledger_core::{checked_sum, Balances, PartyId};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Greedy debtor/creditor matcher
#[derive(Debug, Clone, Default)]
pub struct SettlementMatcher {
    config: NettingConfig,
}

impl SettlementMatcher {
    /// Create new matcher
    pub fn new(config: NettingConfig) -> Self {
        Self { config }
    }

    /// Compute transfers that realize the given balances
    ///
    /// Parties with a zero balance take part in no transfer. Fails with
    /// `Error::InvariantViolation` when the balances do not sum to zero
    /// within the configured tolerance.
    pub fn settle(&self, balances: &Balances) -> Result<Vec<Transfer>> {
        self.check_conservation(balances)?;

        let mut debtors: Vec<(&PartyId, Decimal)> = balances.debtors().collect();
        let mut creditors: Vec<(&PartyId, Decimal)> = balances.creditors().collect();

        if self.config.ordering == MatchOrdering::LargestFirst {
            // Stable sort keeps first-appearance order among equal amounts
            debtors.sort_by(|a, b| b.1.cmp(&a.1));
            creditors.sort_by(|a, b| b.1.cmp(&a.1));
        }

        let mut transfers = Vec::with_capacity(debtors.len() + creditors.len());
        let mut debtor_idx = 0;
        let mut creditor_idx = 0;

        while debtor_idx < debtors.len() && creditor_idx < creditors.len() {
            let (debtor, mut debt_amount) = debtors[debtor_idx];
            let (creditor, mut credit_amount) = creditors[creditor_idx];

            let transfer_amount = debt_amount.min(credit_amount);

            debug!(from = %debtor, to = %creditor, amount = %transfer_amount, "Matched transfer");
            transfers.push(Transfer {
                from: debtor.clone(),
                to: creditor.clone(),
                amount: transfer_amount,
            });

            debt_amount -= transfer_amount;
            credit_amount -= transfer_amount;

            if debt_amount == Decimal::ZERO {
                debtor_idx += 1;
            } else {
                debtors[debtor_idx].1 = debt_amount;
            }

            if credit_amount == Decimal::ZERO {
                creditor_idx += 1;
            } else {
                creditors[creditor_idx].1 = credit_amount;
            }
        }

        // Only reachable with a non-zero tolerance
        let residual = checked_sum(
            debtors[debtor_idx..]
                .iter()
                .chain(&creditors[creditor_idx..])
                .map(|(_, amount)| *amount),
        );
        match residual {
            Some(residual) if residual != Decimal::ZERO => {
                warn!(residual = %residual, "Balances within tolerance left an unmatched residual");
            }
            None => warn!("Unmatched residual exceeds the decimal range"),
            _ => {}
        }

        info!(
            "Settlement matched {} debtors against {} creditors in {} transfers",
            debtors.len(),
            creditors.len(),
            transfers.len()
        );

        Ok(transfers)
    }

    fn check_conservation(&self, balances: &Balances) -> Result<()> {
        let total = balances.checked_total().ok_or_else(|| {
            Error::InvariantViolation("balance total exceeds the decimal range".to_string())
        })?;
        if total.abs() > self.config.balance_tolerance {
            return Err(Error::InvariantViolation(format!(
                "balances sum to {}, expected zero",
                total
            )));
        }
        Ok(())
    }
}

/// Compute transfers with the default matcher configuration
pub fn compute_settlement(balances: &Balances) -> Result<Vec<Transfer>> {
    SettlementMatcher::default().settle(balances)
}

/// Check that transfers reproduce every party's balance exactly
///
/// For each party, incoming minus outgoing transfer amounts must equal its
/// balance. Parties that only appear in transfers are expected at zero.
pub fn verify_settlement(balances: &Balances, transfers: &[Transfer]) -> Result<()> {
    let mut implied: HashMap<&PartyId, Decimal> = HashMap::new();
    for transfer in transfers {
        apply_delta(&mut implied, &transfer.from, -transfer.amount)?;
        apply_delta(&mut implied, &transfer.to, transfer.amount)?;
    }

    for entry in balances {
        let actual = implied.remove(&entry.party).unwrap_or(Decimal::ZERO);
        if actual != entry.amount {
            return Err(Error::SettlementMismatch {
                party: entry.party.to_string(),
                expected: entry.amount,
                actual,
            });
        }
    }

    if let Some((party, actual)) = implied.into_iter().find(|(_, a)| *a != Decimal::ZERO) {
        return Err(Error::SettlementMismatch {
            party: party.to_string(),
            expected: Decimal::ZERO,
            actual,
        });
    }

    Ok(())
}

fn apply_delta<'a>(
    implied: &mut HashMap<&'a PartyId, Decimal>,
    party: &'a PartyId,
    delta: Decimal,
) -> Result<()> {
    let position = implied.entry(party).or_insert(Decimal::ZERO);
    *position = position
        .checked_add(delta)
        .ok_or_else(|| Error::Overflow(format!("net transfer position of {}", party)))?;
    Ok(())
}
