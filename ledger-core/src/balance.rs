//! Per-party net balances
//!
//! Balances keep parties in the order they were first recorded, so that
//! anything iterating over them (settlement matching in particular) behaves
//! the same on every run.

use crate::{types::PartyId, Error, Result};
use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Net position of a single party
///
/// Negative = net debtor (owes), positive = net creditor (is owed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyBalance {
    /// Party
    pub party: PartyId,

    /// Signed net amount
    pub amount: Decimal,
}

impl PartyBalance {
    /// Party owes money
    pub fn is_debtor(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Party is owed money
    pub fn is_creditor(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

/// Ordered mapping from party to signed net amount
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances {
    entries: Vec<PartyBalance>,
    index: HashMap<PartyId, usize>,
}

impl Balances {
    /// Create empty balances
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the balance of a party, returning the previous value
    ///
    /// A party that is already present keeps its position.
    pub fn insert(&mut self, party: PartyId, amount: Decimal) -> Option<Decimal> {
        match self.index.get(&party) {
            Some(&idx) => Some(std::mem::replace(&mut self.entries[idx].amount, amount)),
            None => {
                self.index.insert(party.clone(), self.entries.len());
                self.entries.push(PartyBalance { party, amount });
                None
            }
        }
    }

    /// Add a signed delta to a party's balance, recording the party if new
    pub(crate) fn adjust(&mut self, party: &PartyId, delta: Decimal) -> Result<()> {
        match self.index.get(party) {
            Some(&idx) => {
                let entry = &mut self.entries[idx];
                entry.amount = entry
                    .amount
                    .checked_add(delta)
                    .ok_or_else(|| Error::BalanceOverflow(party.clone()))?;
            }
            None => {
                self.insert(party.clone(), delta);
            }
        }
        Ok(())
    }

    /// Balance of a party, if recorded
    pub fn get(&self, party: &PartyId) -> Option<Decimal> {
        self.index.get(party).map(|&idx| self.entries[idx].amount)
    }

    /// Balance of a party, zero if not recorded
    pub fn balance_of(&self, party: &PartyId) -> Decimal {
        self.get(party).unwrap_or(Decimal::ZERO)
    }

    /// Iterate in first-appearance order
    pub fn iter(&self) -> impl Iterator<Item = &PartyBalance> {
        self.entries.iter()
    }

    /// Parties in first-appearance order
    pub fn parties(&self) -> impl Iterator<Item = &PartyId> {
        self.entries.iter().map(|e| &e.party)
    }

    /// Number of recorded parties
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No parties recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Net debtors with the (positive) amount they owe
    pub fn debtors(&self) -> impl Iterator<Item = (&PartyId, Decimal)> {
        self.entries
            .iter()
            .filter(|e| e.is_debtor())
            .map(|e| (&e.party, -e.amount))
    }

    /// Net creditors with the amount they are owed
    pub fn creditors(&self) -> impl Iterator<Item = (&PartyId, Decimal)> {
        self.entries
            .iter()
            .filter(|e| e.is_creditor())
            .map(|e| (&e.party, e.amount))
    }

    /// Sum of all balances, `None` if it does not fit the decimal range
    ///
    /// Zero for balances derived from a ledger.
    pub fn checked_total(&self) -> Option<Decimal> {
        checked_sum(self.entries.iter().map(|e| e.amount))
    }

    /// Sum owed by all net debtors, `None` on overflow
    pub fn checked_total_debt(&self) -> Option<Decimal> {
        checked_sum(self.debtors().map(|(_, amount)| amount))
    }

    /// Money is conserved (balances sum to zero)
    pub fn is_balanced(&self) -> bool {
        self.checked_total() == Some(Decimal::ZERO)
    }
}

/// Sum amounts without panicking, `None` on overflow
pub fn checked_sum<I: IntoIterator<Item = Decimal>>(amounts: I) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}

impl FromIterator<(PartyId, Decimal)> for Balances {
    fn from_iter<I: IntoIterator<Item = (PartyId, Decimal)>>(iter: I) -> Self {
        let mut balances = Balances::new();
        for (party, amount) in iter {
            balances.insert(party, amount);
        }
        balances
    }
}

impl<'a> IntoIterator for &'a Balances {
    type Item = &'a PartyBalance;
    type IntoIter = std::slice::Iter<'a, PartyBalance>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// Serialized as a JSON-style map in first-appearance order.
impl Serialize for Balances {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.party, &entry.amount)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Balances {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct BalancesVisitor;

        impl<'de> Visitor<'de> for BalancesVisitor {
            type Value = Balances;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of party to signed amount")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Balances, A::Error> {
                let mut balances = Balances::new();
                while let Some((party, amount)) = access.next_entry::<PartyId, Decimal>()? {
                    balances.insert(party, amount);
                }
                Ok(balances)
            }
        }

        deserializer.deserialize_map(BalancesVisitor)
    }
}
