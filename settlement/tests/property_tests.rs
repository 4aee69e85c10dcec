//! Property-based tests for settlement invariants
//!
//! - Settlement conservation: transfers reproduce every net position
//! - No residual: every debtor and creditor is fully consumed
//! - Transfer bound: at most debtors + creditors - 1 transfers
//! - Determinism: same obligations → same transfers

use ledger_core::{Balances, Obligation, PartyId};
use proptest::prelude::*;
use rust_decimal::Decimal;
use settlement::{
    compute_settlement, verify_settlement, Config, MatchOrdering, NettingConfig,
    SettlementEngine, SettlementMatcher, Transfer,
};
use std::collections::HashMap;

/// Strategy for generating valid amounts (positive decimals)
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1u64..1_000_000_00u64).prop_map(|cents| Decimal::new(cents as i64, 2))
}

/// Strategy for generating obligations between distinct parties
fn obligation_strategy() -> impl Strategy<Value = Obligation> {
    ("[A-H]", "[A-H]", amount_strategy())
        .prop_filter("payer must differ from payee", |(payer, payee, _)| payer != payee)
        .prop_map(|(payer, payee, amount)| Obligation::new(payer, payee, amount))
}

fn ordering_strategy() -> impl Strategy<Value = MatchOrdering> {
    prop_oneof![
        Just(MatchOrdering::FirstAppearance),
        Just(MatchOrdering::LargestFirst),
    ]
}

fn net_positions(transfers: &[Transfer]) -> HashMap<PartyId, Decimal> {
    let mut positions = HashMap::new();
    for t in transfers {
        *positions.entry(t.from.clone()).or_insert(Decimal::ZERO) -= t.amount;
        *positions.entry(t.to.clone()).or_insert(Decimal::ZERO) += t.amount;
    }
    positions
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: Each party's transfer inflow minus outflow equals its balance
    #[test]
    fn prop_settlement_conservation(
        obligations in prop::collection::vec(obligation_strategy(), 0..60),
        ordering in ordering_strategy(),
    ) {
        let balances = ledger_core::compute_balances(&obligations).unwrap();
        let matcher = SettlementMatcher::new(NettingConfig { ordering, ..Default::default() });
        let transfers = matcher.settle(&balances).unwrap();

        let positions = net_positions(&transfers);
        for entry in balances.iter() {
            let actual = positions.get(&entry.party).copied().unwrap_or(Decimal::ZERO);
            prop_assert_eq!(actual, entry.amount);
        }
        prop_assert!(verify_settlement(&balances, &transfers).is_ok());
    }

    /// Property: Transfers are positive, go debtor → creditor, and are bounded in count
    #[test]
    fn prop_transfer_shape(obligations in prop::collection::vec(obligation_strategy(), 0..60)) {
        let balances = ledger_core::compute_balances(&obligations).unwrap();
        let transfers = compute_settlement(&balances).unwrap();

        let debtors = balances.debtors().count();
        let creditors = balances.creditors().count();
        prop_assert!(transfers.len() <= (debtors + creditors).saturating_sub(1));

        for t in &transfers {
            prop_assert!(t.amount > Decimal::ZERO);
            prop_assert!(balances.balance_of(&t.from) < Decimal::ZERO);
            prop_assert!(balances.balance_of(&t.to) > Decimal::ZERO);
        }
    }

    /// Property: Total moved equals total debt (nothing left unmatched)
    #[test]
    fn prop_no_residual(obligations in prop::collection::vec(obligation_strategy(), 0..60)) {
        let balances = ledger_core::compute_balances(&obligations).unwrap();
        let transfers = compute_settlement(&balances).unwrap();

        let moved: Decimal = transfers.iter().map(|t| t.amount).sum();
        prop_assert_eq!(Some(moved), balances.checked_total_debt());
    }

    /// Property: Same obligations always yield the same transfers
    #[test]
    fn prop_deterministic(obligations in prop::collection::vec(obligation_strategy(), 0..40)) {
        let engine = SettlementEngine::new(Config::default()).unwrap();
        let first = engine.net(&obligations).unwrap();
        let second = engine.net(&obligations).unwrap();
        prop_assert_eq!(first.transfers, second.transfers);
    }

    /// Property: Balances off by any amount are rejected
    #[test]
    fn prop_unbalanced_rejected(
        obligations in prop::collection::vec(obligation_strategy(), 0..20),
        skew in amount_strategy(),
    ) {
        let balances = ledger_core::compute_balances(&obligations).unwrap();
        let mut skewed: Balances = balances.iter().map(|e| (e.party.clone(), e.amount)).collect();
        let current = skewed.balance_of(&PartyId::new("Z"));
        skewed.insert(PartyId::new("Z"), current + skew);

        prop_assert!(matches!(
            compute_settlement(&skewed),
            Err(settlement::Error::InvariantViolation(_))
        ));
    }
}

#[test]
fn test_perfect_cycle_cancels() {
    let engine = SettlementEngine::new(Config::default()).unwrap();
    let plan = engine
        .net(&[
            Obligation::new("A", "B", Decimal::from(100)),
            Obligation::new("B", "C", Decimal::from(100)),
            Obligation::new("C", "A", Decimal::from(100)),
        ])
        .unwrap();

    assert!(plan.transfers.is_empty());
}

#[test]
fn test_plan_serializes() {
    let engine = SettlementEngine::new(Config::default()).unwrap();
    let plan = engine
        .net(&[Obligation::new("A", "B", Decimal::new(150, 2))])
        .unwrap();

    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["transfers"][0]["from"], "A");
    assert_eq!(json["transfers"][0]["to"], "B");
    assert_eq!(json["transfers"][0]["amount"], "1.50");
    assert_eq!(json["balances"]["A"], "-1.50");
    assert_eq!(json["ledger"][0]["payer"], "A");
}
