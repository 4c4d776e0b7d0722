pub const MEMBER: &str = "Member";
pub const BALANCE: &str = "Balance";
pub const PAID: &str = "Paid";
pub const SHARE: &str = "Share";
pub const STATUS: &str = "Status";
pub const FROM: &str = "From";
pub const TO: &str = "To";
pub const AMOUNT: &str = "Amount";
pub const OWED: &str = "is owed";
pub const OWES: &str = "owes";
pub const SETTLED: &str = "settled";
pub const TOTAL_EXPENSES: &str = "Total expenses";
pub const PER_PERSON_SHARE: &str = "Per person";
pub const ALL_SETTLED: &str = "No transactions needed - expenses are balanced!";
pub const WARNING: &str = "warning";

pub fn unknown_participant(name: &str) -> String {
    format!("{name} appears in expenses but is not a trip member")
}

pub fn residual_imbalance(residual: &str) -> String {
    format!("settlement may be inaccurate due to inconsistent expense data (unbalanced by {residual})")
}
