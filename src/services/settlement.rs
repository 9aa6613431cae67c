//! Settlement simplification
//!
//! Greedy matching of the largest creditor against the largest debtor. It is
//! not guaranteed to find the minimum number of transfers, but it always
//! needs fewer than the number of unsettled members.

use std::collections::HashMap;
use std::fmt;

use crate::models::{MemberId, Money, NetBalance, SettlementTransaction};

/// Balances at or under this many cents are treated as zero
pub const SETTLEMENT_EPSILON_CENTS: i64 = 1;

/// Compute transfers that clear every outstanding balance
///
/// Positive balances are owed money, negative balances owe it. Each
/// transaction moves money from a debtor to a creditor. Members with equal
/// balances keep their input order.
pub fn simplify_settlements(balances: &[NetBalance]) -> Vec<SettlementTransaction> {
    let mut creditors: Vec<(MemberId, i64)> = balances
        .iter()
        .filter(|b| b.amount.cents() > SETTLEMENT_EPSILON_CENTS)
        .map(|b| (b.member_id, b.amount.cents()))
        .collect();
    let mut debtors: Vec<(MemberId, i64)> = balances
        .iter()
        .filter(|b| b.amount.cents() < -SETTLEMENT_EPSILON_CENTS)
        .map(|b| (b.member_id, -b.amount.cents()))
        .collect();

    // sort_by is stable
    creditors.sort_by(|a, b| b.1.cmp(&a.1));
    debtors.sort_by(|a, b| b.1.cmp(&a.1));

    let mut transactions = Vec::new();
    let (mut c, mut d) = (0, 0);

    while c < creditors.len() && d < debtors.len() {
        let amount = creditors[c].1.min(debtors[d].1);

        transactions.push(SettlementTransaction {
            from: debtors[d].0,
            to: creditors[c].0,
            amount: Money::from_cents(amount),
        });

        creditors[c].1 -= amount;
        debtors[d].1 -= amount;

        if creditors[c].1 < SETTLEMENT_EPSILON_CENTS {
            c += 1;
        }
        if debtors[d].1 < SETTLEMENT_EPSILON_CENTS {
            d += 1;
        }
    }

    transactions
}

/// Why a set of transactions does not settle a set of balances
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimplificationViolation {
    /// Total transferred differs from the total owed
    AmountMismatch { transferred: Money, owed: Money },
    /// A member is left with a balance after applying the transfers
    Unsettled { member_id: MemberId, remaining: Money },
    /// More transfers than unsettled members minus one
    TooManyTransactions { count: usize, max: usize },
}

impl fmt::Display for SimplificationViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmountMismatch { transferred, owed } => write!(
                f,
                "Transfers total {} but outstanding credit is {}",
                transferred, owed
            ),
            Self::Unsettled {
                member_id,
                remaining,
            } => write!(f, "{} is left with a balance of {}", member_id, remaining),
            Self::TooManyTransactions { count, max } => {
                write!(f, "{} transfers where at most {} are needed", count, max)
            }
        }
    }
}

impl std::error::Error for SimplificationViolation {}

/// Check that `transactions` settle `balances`
pub fn validate_simplification(
    balances: &[NetBalance],
    transactions: &[SettlementTransaction],
) -> bool {
    check_simplification(balances, transactions).is_ok()
}

/// Like [`validate_simplification`], reporting the first failed check
pub fn check_simplification(
    balances: &[NetBalance],
    transactions: &[SettlementTransaction],
) -> Result<(), SimplificationViolation> {
    let outstanding: Vec<&NetBalance> = balances
        .iter()
        .filter(|b| b.amount.cents().abs() > SETTLEMENT_EPSILON_CENTS)
        .collect();

    let owed: Money = outstanding
        .iter()
        .filter(|b| b.amount.is_positive())
        .map(|b| b.amount)
        .sum();
    let transferred: Money = transactions.iter().map(|t| t.amount).sum();
    if (transferred - owed).cents().abs() > SETTLEMENT_EPSILON_CENTS {
        return Err(SimplificationViolation::AmountMismatch { transferred, owed });
    }

    let mut remaining: HashMap<MemberId, i64> = HashMap::new();
    let mut order = Vec::new();
    for balance in balances {
        if remaining.insert(balance.member_id, balance.amount.cents()).is_none() {
            order.push(balance.member_id);
        }
    }
    for txn in transactions {
        for (member_id, delta) in [(txn.from, txn.amount.cents()), (txn.to, -txn.amount.cents())] {
            let entry = remaining.entry(member_id).or_insert_with(|| {
                order.push(member_id);
                0
            });
            *entry += delta;
        }
    }
    for member_id in order {
        let left = remaining.get(&member_id).copied().unwrap_or(0);
        if left.abs() > SETTLEMENT_EPSILON_CENTS {
            return Err(SimplificationViolation::Unsettled {
                member_id,
                remaining: Money::from_cents(left),
            });
        }
    }

    let max = outstanding.len().saturating_sub(1);
    if transactions.len() > max {
        return Err(SimplificationViolation::TooManyTransactions {
            count: transactions.len(),
            max,
        });
    }

    Ok(())
}
