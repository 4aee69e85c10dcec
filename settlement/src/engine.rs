//! Main settlement engine
//!
//! Runs the full pipeline: obligations → ledger → balances → transfers.

use crate::{
    config::Config,
    netting::{verify_settlement, SettlementMatcher},
    types::*,
    Result,
};
use ledger_core::{Balances, LedgerAggregator, Obligation};
use std::collections::BTreeMap;
use tracing::info;

/// Settlement engine
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    /// Obligation aggregator
    aggregator: LedgerAggregator,

    /// Debtor/creditor matcher
    matcher: SettlementMatcher,

    /// Configuration
    config: Config,
}

impl SettlementEngine {
    /// Create new settlement engine
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            aggregator: LedgerAggregator::new(config.aggregation.clone()),
            matcher: SettlementMatcher::new(config.netting.clone()),
            config,
        })
    }

    /// Net balances of every party appearing in the obligations
    pub fn compute_balances(&self, obligations: &[Obligation]) -> Result<Balances> {
        Ok(self.aggregator.compute_balances(obligations)?)
    }

    /// Transfers realizing the given balances
    pub fn compute_settlement(&self, balances: &Balances) -> Result<Vec<Transfer>> {
        self.matcher.settle(balances)
    }

    /// Net one obligation set end to end
    pub fn net(&self, obligations: &[Obligation]) -> Result<SettlementPlan> {
        let ledger = self.aggregator.aggregate(obligations)?;
        let balances = ledger.derive_balances()?;
        let transfers = self.matcher.settle(&balances)?;

        // Exact reconstruction only holds when no tolerance was used
        if balances.is_balanced() {
            verify_settlement(&balances, &transfers)?;
        }

        let stats = NettingStats::compute(obligations.len(), ledger.edges(), &balances, &transfers)?;

        info!(
            "Netting completed: {} obligations -> {} transfers, efficiency: {:.2}%",
            stats.gross_obligation_count,
            stats.net_transfer_count,
            stats.efficiency * 100.0
        );

        Ok(SettlementPlan {
            ledger: ledger.edges().to_vec(),
            balances,
            transfers,
            stats,
        })
    }

    /// Net each group independently, in ascending group order
    ///
    /// Obligations keep their relative order within a group. Any failing
    /// group fails the whole call.
    pub fn net_groups(&self, obligations: &[GroupedObligation]) -> Result<Vec<GroupSettlement>> {
        let mut by_group: BTreeMap<GroupId, Vec<Obligation>> = BTreeMap::new();
        for row in obligations {
            by_group
                .entry(row.group)
                .or_default()
                .push(row.obligation.clone());
        }

        info!("Netting {} groups", by_group.len());

        by_group
            .into_iter()
            .map(|(group, group_obligations)| -> Result<GroupSettlement> {
                let plan = self.net(&group_obligations)?;
                Ok(GroupSettlement { group, plan })
            })
            .collect()
    }

    /// Get configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchOrdering;
    use crate::Error;
    use ledger_core::{PartyId, SelfObligationPolicy};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn obl(payer: &str, payee: &str, amount: Decimal) -> Obligation {
        Obligation::new(payer, payee, amount)
    }

    fn engine() -> SettlementEngine {
        SettlementEngine::new(Config::default()).unwrap()
    }

    #[test]
    fn test_basic_triangle_debt() {
        let plan = engine()
            .net(&[
                obl("A", "B", dec!(100)),
                obl("B", "C", dec!(100)),
                obl("C", "A", dec!(100)),
            ])
            .unwrap();

        assert_eq!(plan.ledger.len(), 3);
        assert!(plan.balances.iter().all(|b| b.amount == Decimal::ZERO));
        assert!(plan.transfers.is_empty());
        assert_eq!(plan.stats.total_gross, dec!(300));
        assert_eq!(plan.stats.efficiency, 1.0);
        assert_eq!(plan.stats.transfers_eliminated, 3);
    }

    #[test]
    fn test_simple_netting_case() {
        let plan = engine()
            .net(&[
                obl("A", "B", dec!(50)),
                obl("B", "C", dec!(30)),
                obl("A", "C", dec!(20)),
            ])
            .unwrap();

        assert_eq!(plan.balances.balance_of(&PartyId::new("A")), dec!(-70));
        assert_eq!(plan.balances.balance_of(&PartyId::new("B")), dec!(20));
        assert_eq!(plan.balances.balance_of(&PartyId::new("C")), dec!(50));
        assert_eq!(
            plan.transfers,
            vec![
                Transfer::new("A", "B", dec!(20)),
                Transfer::new("A", "C", dec!(50)),
            ]
        );
        assert_eq!(plan.stats.total_net, dec!(70));
    }

    #[test]
    fn test_four_person_complex_debt() {
        let plan = engine()
            .net(&[
                obl("A", "B", dec!(40)),
                obl("A", "C", dec!(30)),
                obl("B", "D", dec!(20)),
                obl("C", "D", dec!(50)),
            ])
            .unwrap();

        // Debtors A(70), C(20); creditors B(20), D(70)
        assert_eq!(
            plan.transfers,
            vec![
                Transfer::new("A", "B", dec!(20)),
                Transfer::new("A", "D", dec!(50)),
                Transfer::new("C", "D", dec!(20)),
            ]
        );
        verify_settlement(&plan.balances, &plan.transfers).unwrap();
    }

    #[test]
    fn test_single_obligation() {
        let plan = engine().net(&[obl("A", "B", dec!(1))]).unwrap();
        assert_eq!(plan.transfers, vec![Transfer::new("A", "B", dec!(1))]);
        assert_eq!(plan.stats.efficiency, 0.0);
    }

    #[test]
    fn test_empty_input() {
        let plan = engine().net(&[]).unwrap();
        assert!(plan.balances.is_empty());
        assert!(plan.transfers.is_empty());
    }

    #[test]
    fn test_invalid_amount_surfaces_as_ledger_error() {
        let result = engine().net(&[obl("A", "B", dec!(10)), obl("B", "C", dec!(0))]);
        assert!(matches!(
            result,
            Err(Error::Ledger(ledger_core::Error::InvalidAmount { .. }))
        ));
    }

    #[test]
    fn test_compute_settlement_rejects_unbalanced() {
        let balances: Balances = vec![(PartyId::new("A"), dec!(-5))].into_iter().collect();
        assert!(matches!(
            engine().compute_settlement(&balances),
            Err(Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_balance_overflow_surfaces_as_ledger_error() {
        let obligations = [obl("A", "B", Decimal::MAX), obl("C", "B", Decimal::MAX)];

        assert!(matches!(
            engine().net(&obligations),
            Err(Error::Ledger(ledger_core::Error::BalanceOverflow(_)))
        ));
        assert!(matches!(
            engine().compute_balances(&obligations),
            Err(Error::Ledger(ledger_core::Error::BalanceOverflow(_)))
        ));
    }

    #[test]
    fn test_gross_total_overflow_fails_net() {
        // Balances fit (A: -MAX, B: 0, C: MAX) but the gross total does not
        let obligations = [obl("A", "B", Decimal::MAX), obl("B", "C", Decimal::MAX)];
        let engine = engine();

        let balances = engine.compute_balances(&obligations).unwrap();
        assert_eq!(balances.balance_of(&PartyId::new("B")), Decimal::ZERO);
        let transfers = engine.compute_settlement(&balances).unwrap();
        assert_eq!(transfers, vec![Transfer::new("A", "C", Decimal::MAX)]);

        match engine.net(&obligations) {
            Err(Error::Overflow(msg)) => assert!(msg.contains("gross")),
            other => panic!("expected Overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_config_flows_through() {
        let mut config = Config::default();
        config.aggregation.self_obligations = SelfObligationPolicy::Ignore;
        config.netting.ordering = MatchOrdering::LargestFirst;
        let engine = SettlementEngine::new(config).unwrap();

        let plan = engine
            .net(&[
                obl("A", "B", dec!(10)),
                obl("X", "X", dec!(99)),
                obl("C", "D", dec!(40)),
            ])
            .unwrap();

        assert_eq!(plan.balances.len(), 4);
        assert_eq!(
            plan.transfers,
            vec![
                Transfer::new("C", "D", dec!(40)),
                Transfer::new("A", "B", dec!(10)),
            ]
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.netting.balance_tolerance = dec!(-0.5);
        assert!(SettlementEngine::new(config).is_err());
    }

    #[test]
    fn test_groups_settled_independently() {
        let rows = vec![
            GroupedObligation { group: 2, obligation: obl("A", "B", dec!(5)) },
            GroupedObligation { group: 1, obligation: obl("A", "B", dec!(10)) },
            GroupedObligation { group: 2, obligation: obl("B", "A", dec!(5)) },
            GroupedObligation { group: 1, obligation: obl("B", "C", dec!(10)) },
        ];

        let groups = engine().net_groups(&rows).unwrap();

        let ids: Vec<GroupId> = groups.iter().map(|g| g.group).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(groups[0].plan.transfers, vec![Transfer::new("A", "C", dec!(10))]);
        assert!(groups[1].plan.transfers.is_empty());
    }

    #[test]
    fn test_group_failure_fails_call() {
        let rows = vec![
            GroupedObligation { group: 1, obligation: obl("A", "B", dec!(10)) },
            GroupedObligation { group: 3, obligation: obl("A", "B", dec!(-1)) },
        ];
        assert!(engine().net_groups(&rows).is_err());
    }
}
