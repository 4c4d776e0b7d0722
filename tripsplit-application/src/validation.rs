use rust_decimal::Decimal;
use tripsplit_domain::{
    Expense, Money, SettlementContext, ShareType, ShareTypeError, SplitEntry, SplitRule,
};

use crate::{
    error::ExpenseValidationError,
    model::{ExpenseRecord, SplitRecord},
};

/// Largest magnitude accepted for an expense total or a single share.
/// Keeps every later sum far inside `Decimal`'s range.
pub const MAX_EXPENSE_AMOUNT: i64 = 1_000_000_000_000_000;

/// Turns stored expense records into domain expenses, rejecting anything
/// the settlement core is allowed to assume never happens.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExpenseValidator {
    context: SettlementContext,
}

impl ExpenseValidator {
    pub fn new(context: SettlementContext) -> Self {
        Self { context }
    }

    pub fn validate_all(
        &self,
        records: &[ExpenseRecord],
    ) -> Result<Vec<Expense>, ExpenseValidationError> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| self.validate(index, record))
            .collect()
    }

    pub fn validate(
        &self,
        index: usize,
        record: &ExpenseRecord,
    ) -> Result<Expense, ExpenseValidationError> {
        let label = expense_label(index, record);

        if record.amount < Decimal::ZERO {
            return Err(ExpenseValidationError::NegativeAmount {
                expense: label,
                amount: record.amount,
            });
        }
        if record.amount > max_amount() {
            return Err(out_of_range(label));
        }
        if record.splits.is_empty() {
            return Err(ExpenseValidationError::EmptySplitSet { expense: label });
        }

        let splits = record
            .splits
            .iter()
            .map(|split| split_entry(&label, split))
            .collect::<Result<Vec<_>, _>>()?;

        let expense = Expense::new(
            record.payer.clone(),
            Money::from_decimal(record.amount),
            splits,
        );

        let in_range = |share: Money| share.abs().as_decimal() <= max_amount();
        let shares_in_range = expense
            .splits
            .iter()
            .all(|split| split.rule.checked_resolve(expense.amount).is_some_and(in_range));
        let Some(split_sum) = expense.split_total().filter(|_| shares_in_range) else {
            return Err(out_of_range(label));
        };
        if (split_sum - expense.amount).abs() > self.context.tolerance {
            return Err(ExpenseValidationError::SplitSumMismatch {
                expense: label,
                total: expense.amount,
                split_sum,
            });
        }

        Ok(expense)
    }
}

fn split_entry(label: &str, record: &SplitRecord) -> Result<SplitEntry, ExpenseValidationError> {
    let share_type = record.share_type.parse::<ShareType>().map_err(
        |ShareTypeError::InvalidShareType(value)| ExpenseValidationError::InvalidShareType {
            expense: label.to_owned(),
            value,
        },
    )?;

    let rule = match (share_type, record.share_value, record.amount) {
        (_, Some(value), _) => SplitRule::from_parts(share_type, value),
        (ShareType::Equal, None, Some(amount)) => {
            SplitRule::equal_precomputed(Money::from_decimal(amount))
        }
        (ShareType::Exact, None, Some(amount)) => SplitRule::exact(Money::from_decimal(amount)),
        _ => {
            return Err(ExpenseValidationError::MissingShareValue {
                expense: label.to_owned(),
                participant: record.participant.clone(),
            });
        }
    };

    Ok(SplitEntry {
        participant: record.participant.clone(),
        rule,
        settled: record.settled,
    })
}

fn max_amount() -> Decimal {
    Decimal::from(MAX_EXPENSE_AMOUNT)
}

fn out_of_range(expense: String) -> ExpenseValidationError {
    ExpenseValidationError::AmountOutOfRange {
        expense,
        limit: max_amount(),
    }
}

fn expense_label(index: usize, record: &ExpenseRecord) -> String {
    match &record.id {
        Some(id) => id.clone(),
        None => format!("#{}", index + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::str::FromStr;
    use tripsplit_domain::ParticipantId;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).expect("valid decimal literal")
    }

    fn split(participant: &str, share_type: &str, share_value: Option<&str>) -> SplitRecord {
        SplitRecord {
            participant: ParticipantId::new(participant),
            share_type: share_type.to_owned(),
            share_value: share_value.map(dec),
            amount: None,
            settled: false,
        }
    }

    fn record(amount: &str, splits: Vec<SplitRecord>) -> ExpenseRecord {
        ExpenseRecord {
            id: None,
            description: None,
            payer: ParticipantId::new("alice"),
            amount: dec(amount),
            splits,
        }
    }

    #[fixture]
    fn validator() -> ExpenseValidator {
        ExpenseValidator::default()
    }

    #[rstest]
    fn accepts_equal_divisor_split(validator: ExpenseValidator) {
        let expense = validator
            .validate(
                0,
                &record(
                    "100",
                    vec![
                        split("alice", "equal", Some("3")),
                        split("bob", "equal", Some("3")),
                        split("carol", "equal", Some("3")),
                    ],
                ),
            )
            .expect("thirds should validate");

        assert_eq!(expense.splits.len(), 3);
        assert_eq!(expense.splits[0].rule, SplitRule::equal(3));
    }

    #[rstest]
    fn accepts_precomputed_equal_amounts(validator: ExpenseValidator) {
        let mut first = split("alice", "equal", None);
        first.amount = Some(dec("33.33"));
        let mut second = split("bob", "equal", None);
        second.amount = Some(dec("33.33"));
        let mut third = split("carol", "equal", None);
        third.amount = Some(dec("33.34"));

        let expense = validator
            .validate(0, &record("100", vec![first, second, third]))
            .expect("pre-divided amounts should validate");

        assert_eq!(
            expense.splits[2].rule,
            SplitRule::equal_precomputed(Money::new(3334, 2))
        );
    }

    #[rstest]
    #[case::empty_splits(
        record("10", vec![]),
        ExpenseValidationError::EmptySplitSet { expense: "#1".to_owned() }
    )]
    #[case::unknown_share_type(
        record("10", vec![split("bob", "shares", Some("1"))]),
        ExpenseValidationError::InvalidShareType { expense: "#1".to_owned(), value: "shares".to_owned() }
    )]
    #[case::negative_amount(
        record("-5", vec![split("bob", "exact", Some("-5"))]),
        ExpenseValidationError::NegativeAmount { expense: "#1".to_owned(), amount: dec("-5") }
    )]
    #[case::missing_value(
        record("10", vec![split("bob", "percentage", None)]),
        ExpenseValidationError::MissingShareValue { expense: "#1".to_owned(), participant: ParticipantId::new("bob") }
    )]
    #[case::percentages_short_of_total(
        record("200", vec![split("alice", "percentage", Some("50")), split("bob", "percentage", Some("30"))]),
        ExpenseValidationError::SplitSumMismatch {
            expense: "#1".to_owned(),
            total: Money::from_i64(200),
            split_sum: Money::from_i64(160),
        }
    )]
    #[case::amount_beyond_limit(
        record(
            "10000000000000000000000000000",
            vec![split("alice", "percentage", Some("50")), split("bob", "percentage", Some("50"))],
        ),
        ExpenseValidationError::AmountOutOfRange {
            expense: "#1".to_owned(),
            limit: Decimal::from(MAX_EXPENSE_AMOUNT),
        }
    )]
    #[case::share_overflows(
        record("1000", vec![split("bob", "equal", Some("0.0000000000000000000000000001"))]),
        ExpenseValidationError::AmountOutOfRange {
            expense: "#1".to_owned(),
            limit: Decimal::from(MAX_EXPENSE_AMOUNT),
        }
    )]
    #[case::offsetting_huge_shares(
        record(
            "10",
            vec![
                split("alice", "exact", Some("-50000000000000000")),
                split("bob", "exact", Some("50000000000000010")),
            ],
        ),
        ExpenseValidationError::AmountOutOfRange {
            expense: "#1".to_owned(),
            limit: Decimal::from(MAX_EXPENSE_AMOUNT),
        }
    )]
    fn rejects_contract_violations(
        validator: ExpenseValidator,
        #[case] input: ExpenseRecord,
        #[case] expected: ExpenseValidationError,
    ) {
        assert_eq!(validator.validate(0, &input), Err(expected));
    }

    #[rstest]
    fn tolerates_sub_cent_mismatch(validator: ExpenseValidator) {
        let input = record(
            "10",
            vec![split("alice", "exact", Some("4.995")), split("bob", "exact", Some("5"))],
        );

        assert!(validator.validate(0, &input).is_ok());
    }

    #[rstest]
    fn labels_errors_with_record_id(validator: ExpenseValidator) {
        let mut input = record("10", vec![]);
        input.id = Some("dinner".to_owned());

        let err = validator.validate_all(&[input]).expect_err("empty splits");

        assert_eq!(err.to_string(), "expense dinner: at least one split is required");
    }

    #[rstest]
    fn keeps_settled_flag(validator: ExpenseValidator) {
        let mut paid = split("bob", "exact", Some("10"));
        paid.settled = true;

        let expense = validator
            .validate(0, &record("10", vec![paid]))
            .expect("valid expense");

        assert!(expense.splits[0].settled);
    }
}
