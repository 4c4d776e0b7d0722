use crate::{
    labels,
    text_table::{Alignment, TextTableBuilder},
};
use std::{borrow::Cow, fmt};
use tripsplit_application::{
    BalanceStatus, ParticipantBalance, ParticipantDirectory, ParticipantSummary, SettlementReport,
    SettlementWarning,
};
use tripsplit_domain::{Money, ParticipantId, SettlementContext, Transaction};

/// Renders amounts with the same rounding the transfers were computed with.
#[derive(Clone, Copy, Debug, Default)]
pub struct SettlementPresenter {
    context: SettlementContext,
}

pub struct SettlementView {
    pub totals: String,
    pub balance_table: String,
    pub summary_table: String,
    pub transfer_table: Option<String>,
    pub warnings: Vec<String>,
}

impl fmt::Display for SettlementView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.totals)?;
        writeln!(f, "{}", self.balance_table)?;
        writeln!(f, "{}", self.summary_table)?;
        match &self.transfer_table {
            Some(table) => write!(f, "{table}")?,
            None => writeln!(f, "{}", labels::ALL_SETTLED)?,
        }
        for warning in &self.warnings {
            writeln!(f, "{}: {warning}", labels::WARNING)?;
        }
        Ok(())
    }
}

impl SettlementPresenter {
    pub fn new(context: SettlementContext) -> Self {
        Self { context }
    }

    pub fn render(&self, report: &SettlementReport) -> SettlementView {
        self.render_with_participants(report, &EmptyDirectory)
    }

    pub fn render_with_participants(
        &self,
        report: &SettlementReport,
        directory: &dyn ParticipantDirectory,
    ) -> SettlementView {
        let transfer_table = if report.transactions.is_empty() {
            None
        } else {
            Some(self.build_transfer_table(&report.transactions, directory))
        };

        SettlementView {
            totals: self.build_totals(report),
            balance_table: self.build_balance_table(&report.balances, directory),
            summary_table: self.build_summary_table(&report.participant_summaries, directory),
            transfer_table,
            warnings: report
                .warnings
                .iter()
                .map(|warning| self.format_warning(warning, directory))
                .collect(),
        }
    }

    pub fn build_totals(&self, report: &SettlementReport) -> String {
        let currency = report
            .currency
            .as_deref()
            .map(|code| format!(" {code}"))
            .unwrap_or_default();
        format!(
            "{}: {}{currency}\n{}: {}{currency}",
            labels::TOTAL_EXPENSES,
            self.format_amount(report.total_expenses),
            labels::PER_PERSON_SHARE,
            self.format_amount(report.per_person_share),
        )
    }

    pub fn build_balance_table(
        &self,
        balances: &[ParticipantBalance],
        directory: &dyn ParticipantDirectory,
    ) -> String {
        let headers = [Cow::Borrowed(labels::MEMBER), Cow::Borrowed(labels::BALANCE)];
        TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&headers)
            .rows(balances.iter().map(|entry| {
                vec![
                    format_participant(&entry.participant, directory),
                    Cow::Owned(self.format_signed(entry.balance)),
                ]
            }))
            .build()
    }

    pub fn build_summary_table(
        &self,
        summaries: &[ParticipantSummary],
        directory: &dyn ParticipantDirectory,
    ) -> String {
        let headers = [
            Cow::Borrowed(labels::MEMBER),
            Cow::Borrowed(labels::PAID),
            Cow::Borrowed(labels::SHARE),
            Cow::Borrowed(labels::STATUS),
        ];
        TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Right,
                Alignment::Right,
                Alignment::Left,
            ])
            .headers(&headers)
            .rows(summaries.iter().map(|summary| {
                vec![
                    format_participant(&summary.participant, directory),
                    Cow::Owned(self.format_amount(summary.paid)),
                    Cow::Owned(self.format_amount(summary.owed)),
                    Cow::Borrowed(match summary.status {
                        BalanceStatus::Owed => labels::OWED,
                        BalanceStatus::Owes => labels::OWES,
                        BalanceStatus::Settled => labels::SETTLED,
                    }),
                ]
            }))
            .build()
    }

    pub fn build_transfer_table(
        &self,
        transactions: &[Transaction],
        directory: &dyn ParticipantDirectory,
    ) -> String {
        let headers = [
            Cow::Borrowed(labels::FROM),
            Cow::Borrowed(labels::TO),
            Cow::Borrowed(labels::AMOUNT),
        ];
        TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers(&headers)
            .rows(transactions.iter().map(|transaction| {
                vec![
                    format_participant(&transaction.from, directory),
                    format_participant(&transaction.to, directory),
                    Cow::Owned(self.format_amount(transaction.amount)),
                ]
            }))
            .build()
    }

    fn display_amount(&self, amount: Money) -> Money {
        let rounded = self.context.round(amount);
        if rounded.is_zero() { Money::ZERO } else { rounded }
    }

    fn format_amount(&self, amount: Money) -> String {
        let scale = self.context.scale as usize;
        format!("{:.scale$}", self.display_amount(amount))
    }

    fn format_signed(&self, amount: Money) -> String {
        let sign = if self.display_amount(amount).is_negative() { "" } else { "+" };
        format!("{sign}{}", self.format_amount(amount))
    }

    fn format_warning(
        &self,
        warning: &SettlementWarning,
        directory: &dyn ParticipantDirectory,
    ) -> String {
        match warning {
            SettlementWarning::UnknownParticipantInExpense { participant } => {
                labels::unknown_participant(&format_participant(participant, directory))
            }
            SettlementWarning::ResidualImbalance { residual } => {
                labels::residual_imbalance(&self.format_amount(*residual))
            }
        }
    }
}

struct EmptyDirectory;

impl ParticipantDirectory for EmptyDirectory {
    fn display_name(&self, _participant: &ParticipantId) -> Option<&str> {
        None
    }
}

fn format_participant<'a>(
    participant: &'a ParticipantId,
    directory: &'a dyn ParticipantDirectory,
) -> Cow<'a, str> {
    match directory.display_name(participant) {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Borrowed(participant.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::collections::HashMap;

    fn id(name: &str) -> ParticipantId {
        ParticipantId::new(name)
    }

    #[fixture]
    fn report() -> SettlementReport {
        SettlementReport {
            currency: Some("USD".to_owned()),
            balances: vec![
                ParticipantBalance {
                    participant: id("u1"),
                    balance: Money::from_i64(50),
                },
                ParticipantBalance {
                    participant: id("u2"),
                    balance: Money::from_i64(-50),
                },
            ],
            transactions: vec![Transaction {
                from: id("u2"),
                to: id("u1"),
                amount: Money::from_i64(50),
            }],
            participant_summaries: vec![
                ParticipantSummary {
                    participant: id("u1"),
                    paid: Money::from_i64(100),
                    owed: Money::from_i64(50),
                    net: Money::from_i64(50),
                    status: BalanceStatus::Owed,
                },
                ParticipantSummary {
                    participant: id("u2"),
                    paid: Money::ZERO,
                    owed: Money::from_i64(50),
                    net: Money::from_i64(-50),
                    status: BalanceStatus::Owes,
                },
            ],
            total_expenses: Money::from_i64(100),
            per_person_share: Money::from_i64(50),
            warnings: Vec::new(),
        }
    }

    #[rstest]
    fn render_uses_display_name_when_available(report: SettlementReport) {
        let mut directory = HashMap::new();
        directory.insert(id("u1"), "Alice".to_string());

        let view = SettlementPresenter::default().render_with_participants(&report, &directory);

        assert!(view.balance_table.contains("Alice"));
        assert!(view.balance_table.contains("u2"));
        assert!(
            view.transfer_table
                .as_ref()
                .expect("transfer table")
                .contains("u2    Alice   50.00")
        );
    }

    #[rstest]
    fn amounts_are_signed_and_fixed_point(report: SettlementReport) {
        let view = SettlementPresenter::default().render(&report);

        assert!(view.balance_table.contains("+50.00"));
        assert!(view.balance_table.contains("-50.00"));
        assert!(view.totals.contains("Total expenses: 100.00 USD"));
        assert!(view.summary_table.contains("is owed"));
    }

    #[rstest]
    fn settled_report_has_no_transfer_table(mut report: SettlementReport) {
        report.transactions.clear();

        let view = SettlementPresenter::default().render(&report);

        assert!(view.transfer_table.is_none());
        assert!(view.to_string().contains(labels::ALL_SETTLED));
    }

    #[rstest]
    fn warnings_are_listed(mut report: SettlementReport) {
        report.warnings = vec![
            SettlementWarning::UnknownParticipantInExpense {
                participant: id("ghost"),
            },
            SettlementWarning::ResidualImbalance {
                residual: Money::new(1250, 2),
            },
        ];

        let rendered = SettlementPresenter::default().render(&report).to_string();

        assert!(rendered.contains("warning: ghost appears in expenses"));
        assert!(rendered.contains("unbalanced by 12.50"));
    }

    #[rstest]
    #[case::half_up_midpoint(Money::new(12345, 3), "+12.35")]
    #[case::repeating_thirds(Money::new(66_666_666_667, 9), "+66.67")]
    #[case::negative_midpoint(Money::new(-12345, 3), "-12.35")]
    #[case::negative_drift(Money::new(-1, 28), "+0.00")]
    fn balances_round_like_transfers(
        mut report: SettlementReport,
        #[case] balance: Money,
        #[case] expected: &str,
    ) {
        report.balances[0].balance = balance;

        let view = SettlementPresenter::default().render(&report);

        let rendered = view
            .balance_table
            .lines()
            .find_map(|line| line.strip_prefix("u1"))
            .map(str::trim);
        assert_eq!(rendered, Some(expected));
    }

    #[rstest]
    fn summary_amounts_round_half_up(mut report: SettlementReport) {
        report.participant_summaries[0].paid = Money::new(12345, 3);

        let view = SettlementPresenter::default().render(&report);

        assert!(view.summary_table.contains("12.35"));
        assert!(!view.summary_table.contains("12.34"));
    }
}
