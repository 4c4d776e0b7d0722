use crate::{
    model::{Expense, ParticipantId, Settlement},
    services::{
        balance_aggregator::BalanceAggregator, settlement_rounding::SettlementContext,
        transaction_minimizer::minimize_transactions_with,
    },
};

/// Settlement calculation service
///
/// Recomputes balances and transfers from the complete expense history on
/// every call. Nothing is cached between calls.
#[derive(Clone, Copy, Debug, Default)]
pub struct SettlementCalculator {
    context: SettlementContext,
}

impl SettlementCalculator {
    pub fn new(context: SettlementContext) -> Self {
        Self { context }
    }

    pub fn calculate<'a, P, E>(&self, participants: P, expenses: E) -> Settlement
    where
        P: IntoIterator<Item = &'a ParticipantId>,
        E: IntoIterator<Item = &'a Expense>,
    {
        let (balances, unknown_participants) =
            BalanceAggregator::from_expenses(participants, expenses).into_parts();
        let transactions = minimize_transactions_with(&balances, self.context);

        Settlement {
            balances,
            transactions,
            unknown_participants,
        }
    }
}

/// Balances plus minimized transfers under the default context.
pub fn compute_settlement<'a, P, E>(participants: P, expenses: E) -> Settlement
where
    P: IntoIterator<Item = &'a ParticipantId>,
    E: IntoIterator<Item = &'a Expense>,
{
    SettlementCalculator::default().calculate(participants, expenses)
}

pub fn compute_settlement_with<'a, P, E>(
    participants: P,
    expenses: E,
    context: SettlementContext,
) -> Settlement
where
    P: IntoIterator<Item = &'a ParticipantId>,
    E: IntoIterator<Item = &'a Expense>,
{
    SettlementCalculator::new(context).calculate(participants, expenses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Money, SplitEntry, SplitRule, Transaction};
    use rstest::{fixture, rstest};

    fn id(name: &str) -> ParticipantId {
        ParticipantId::new(name)
    }

    fn transfer(from: &str, to: &str, amount: Money) -> Transaction {
        Transaction {
            from: id(from),
            to: id(to),
            amount,
        }
    }

    #[fixture]
    fn calculator() -> SettlementCalculator {
        SettlementCalculator::default()
    }

    #[rstest]
    fn equal_split_between_two(calculator: SettlementCalculator) {
        let roster = [id("A"), id("B")];
        let expense = Expense::new(
            "A",
            Money::from_i64(100),
            vec![
                SplitEntry::new("A", SplitRule::equal(2)),
                SplitEntry::new("B", SplitRule::equal(2)),
            ],
        );

        let settlement = calculator.calculate(&roster, [&expense]);

        assert_eq!(settlement.balances[&id("A")], Money::from_i64(50));
        assert_eq!(settlement.balances[&id("B")], Money::from_i64(-50));
        assert_eq!(settlement.transactions, vec![transfer("B", "A", Money::from_i64(50))]);
    }

    #[rstest]
    fn percentage_split_between_three(calculator: SettlementCalculator) {
        let roster = [id("A"), id("B"), id("C")];
        let expense = Expense::new(
            "A",
            Money::from_i64(200),
            vec![
                SplitEntry::new("A", SplitRule::percentage(50)),
                SplitEntry::new("B", SplitRule::percentage(30)),
                SplitEntry::new("C", SplitRule::percentage(20)),
            ],
        );

        let settlement = calculator.calculate(&roster, [&expense]);

        assert_eq!(settlement.balances[&id("A")], Money::from_i64(100));
        assert_eq!(settlement.balances[&id("B")], Money::from_i64(-60));
        assert_eq!(settlement.balances[&id("C")], Money::from_i64(-40));
        assert_eq!(
            settlement.transactions,
            vec![
                transfer("B", "A", Money::from_i64(60)),
                transfer("C", "A", Money::from_i64(40)),
            ]
        );
    }

    #[rstest]
    fn three_way_cycle_needs_no_transfers(calculator: SettlementCalculator) {
        let roster = [id("A"), id("B"), id("C")];
        let owed_by = |payer: &str, debtor: &str| {
            Expense::new(
                payer,
                Money::from_i64(30),
                vec![SplitEntry::new(debtor, SplitRule::exact(Money::from_i64(30)))],
            )
        };
        let expenses = [owed_by("A", "B"), owed_by("B", "C"), owed_by("C", "A")];

        let settlement = calculator.calculate(&roster, &expenses);

        assert!(settlement.balances.values().all(|balance| balance.is_zero()));
        assert!(settlement.transactions.is_empty());
    }

    #[rstest]
    fn thirds_settle_within_tolerance(calculator: SettlementCalculator) {
        let roster = [id("A"), id("B"), id("C")];
        let expense = Expense::new(
            "A",
            Money::from_i64(100),
            ["A", "B", "C"]
                .into_iter()
                .map(|name| SplitEntry::new(name, SplitRule::equal(3)))
                .collect(),
        );

        let settlement = calculator.calculate(&roster, [&expense]);

        let sum: Money = settlement.balances.values().sum();
        assert!(sum.abs() <= Money::new(1, 2));
        assert_eq!(
            settlement.transactions,
            vec![
                transfer("B", "A", Money::new(3333, 2)),
                transfer("C", "A", Money::new(3333, 2)),
            ]
        );
        for residual in settlement.residuals().values() {
            assert!(residual.abs() < Money::new(1, 2), "residual {residual}");
        }
    }

    #[rstest]
    fn unknown_participants_are_carried_through(calculator: SettlementCalculator) {
        let roster = [id("A")];
        let expense = Expense::new(
            "A",
            Money::from_i64(10),
            vec![SplitEntry::new("Z", SplitRule::exact(Money::from_i64(10)))],
        );

        let settlement = calculator.calculate(&roster, [&expense]);

        assert_eq!(settlement.unknown_participants, vec![id("Z")]);
        assert_eq!(settlement.transactions, vec![transfer("Z", "A", Money::from_i64(10))]);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let roster = [id("A"), id("B"), id("C"), id("D")];
        let expenses = [
            Expense::new(
                "B",
                Money::from_i64(120),
                ["A", "B", "C", "D"]
                    .into_iter()
                    .map(|name| SplitEntry::new(name, SplitRule::equal(4)))
                    .collect(),
            ),
            Expense::new(
                "D",
                Money::from_i64(45),
                vec![
                    SplitEntry::new("A", SplitRule::exact(Money::from_i64(15))),
                    SplitEntry::new("C", SplitRule::exact(Money::from_i64(30))),
                ],
            ),
        ];

        let first = compute_settlement(&roster, &expenses);
        let second = compute_settlement(&roster, &expenses);

        assert_eq!(first, second);
    }

    #[rstest]
    fn cleared_settlement_has_nothing_outstanding(calculator: SettlementCalculator) {
        let roster = [id("A"), id("B")];
        let expense = Expense::new(
            "A",
            Money::from_i64(100),
            vec![
                SplitEntry::new("A", SplitRule::equal(2)),
                SplitEntry::new("B", SplitRule::equal(2)),
            ],
        );

        let settlement = calculator.calculate(&roster, [&expense]);

        assert_eq!(settlement.outstanding(), Money::ZERO);
    }

    #[rstest]
    fn dust_debtors_leave_creditor_outstanding(calculator: SettlementCalculator) {
        let members: Vec<String> = (0..10).map(|n| format!("p{n}")).collect();
        let roster: Vec<ParticipantId> = std::iter::once(id("d"))
            .chain(members.iter().map(|name| id(name)))
            .collect();
        let expense = Expense::new(
            "d",
            Money::new(10, 2),
            members
                .iter()
                .map(|name| SplitEntry::new(name.as_str(), SplitRule::exact(Money::new(1, 2))))
                .collect(),
        );

        let settlement = calculator.calculate(&roster, [&expense]);

        assert!(settlement.transactions.is_empty());
        assert_eq!(settlement.balances[&id("d")], Money::new(10, 2));
        assert_eq!(settlement.outstanding(), Money::new(10, 2));
    }
}
