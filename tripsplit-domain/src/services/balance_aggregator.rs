use crate::model::{Balances, Expense, Money, ParticipantId};

/// Folds expenses into one net balance per participant.
///
/// Every roster member starts at zero, so inactive members still appear.
/// Payers are credited with the full amount and each split participant is
/// debited its resolved share. Values are kept unrounded.
pub struct BalanceAggregator {
    balances: Balances,
    unknown_participants: Vec<ParticipantId>,
}

impl BalanceAggregator {
    pub fn new<'a, I>(participants: I) -> Self
    where
        I: IntoIterator<Item = &'a ParticipantId>,
    {
        let mut balances = Balances::new();
        for participant in participants {
            balances.entry(participant.clone()).or_insert(Money::ZERO);
        }

        Self {
            balances,
            unknown_participants: Vec::new(),
        }
    }

    /// Applies every expense, then warns once per participant missing from
    /// the roster.
    pub fn from_expenses<'a, P, E>(participants: P, expenses: E) -> Self
    where
        P: IntoIterator<Item = &'a ParticipantId>,
        E: IntoIterator<Item = &'a Expense>,
    {
        let mut aggregator = Self::new(participants);
        for expense in expenses {
            aggregator.apply(expense);
        }
        for participant in &aggregator.unknown_participants {
            tracing::warn!(
                participant = %participant,
                "Expense references a participant outside the roster"
            );
        }
        aggregator
    }

    pub fn apply(&mut self, expense: &Expense) {
        *self.balance_mut(&expense.payer) += expense.amount;
        for split in &expense.splits {
            let share = split.rule.resolve(expense.amount);
            *self.balance_mut(&split.participant) -= share;
        }
    }

    // Participants missing from the roster still get an entry.
    fn balance_mut(&mut self, participant: &ParticipantId) -> &mut Money {
        if !self.balances.contains_key(participant) {
            self.unknown_participants.push(participant.clone());
        }
        self.balances.entry(participant.clone()).or_insert(Money::ZERO)
    }

    pub fn balances(&self) -> &Balances {
        &self.balances
    }

    pub fn unknown_participants(&self) -> &[ParticipantId] {
        &self.unknown_participants
    }

    pub fn into_balances(self) -> Balances {
        self.balances
    }

    pub fn into_parts(self) -> (Balances, Vec<ParticipantId>) {
        (self.balances, self.unknown_participants)
    }
}

/// Net balance per participant over the full expense history.
///
/// Participants referenced by an expense but absent from `participants` are
/// included and reported with a warning.
pub fn aggregate_balances<'a, P, E>(participants: P, expenses: E) -> Balances
where
    P: IntoIterator<Item = &'a ParticipantId>,
    E: IntoIterator<Item = &'a Expense>,
{
    BalanceAggregator::from_expenses(participants, expenses).into_balances()
}
