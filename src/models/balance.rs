//! Derived balance types
//!
//! None of these are persisted; they are recomputed from raw expense and
//! fund records every time they are requested.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::MemberId;
use super::money::Money;

/// Balances within this many cents of zero count as settled
pub const SETTLED_DEADBAND_CENTS: i64 = 100;

/// Where a member stands with the rest of the mess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceStatus {
    /// Within the deadband of zero
    Settled,
    /// The mess owes this member
    Owed,
    /// This member owes the mess
    Owes,
}

impl BalanceStatus {
    /// Classify a net balance
    pub fn classify(balance: Money) -> Self {
        if balance.cents() > SETTLED_DEADBAND_CENTS {
            Self::Owed
        } else if balance.cents() < -SETTLED_DEADBAND_CENTS {
            Self::Owes
        } else {
            Self::Settled
        }
    }
}

impl fmt::Display for BalanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Settled => write!(f, "settled"),
            Self::Owed => write!(f, "owed"),
            Self::Owes => write!(f, "owes"),
        }
    }
}

/// A member's balance and the three sums it is made of
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceBreakdown {
    pub member_id: MemberId,
    pub member_name: String,
    /// Contributions minus refunds
    pub contributed: Money,
    /// Sum of the member's split amounts
    pub fair_share: Money,
    /// Sum of expenses the member paid for
    pub paid_from_pocket: Money,
    /// `contributed - fair_share + paid_from_pocket`
    pub balance: Money,
    pub status: BalanceStatus,
}

impl BalanceBreakdown {
    /// Build a breakdown from its three components
    pub fn from_parts(
        member_id: MemberId,
        member_name: impl Into<String>,
        contributed: Money,
        fair_share: Money,
        paid_from_pocket: Money,
    ) -> Self {
        let balance = contributed - fair_share + paid_from_pocket;
        Self {
            member_id,
            member_name: member_name.into(),
            contributed,
            fair_share,
            paid_from_pocket,
            balance,
            status: BalanceStatus::classify(balance),
        }
    }

    /// The signed balance as input to settlement simplification
    pub fn net(&self) -> NetBalance {
        NetBalance::new(self.member_id, self.balance)
    }
}

/// Pooled-fund level view of a mess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundBalance {
    /// Contributions minus refunds
    pub total_collected: Money,
    /// Refunds paid out (already subtracted from `total_collected`)
    pub total_refunded: Money,
    /// Sum of all live expenses
    pub total_expenses: Money,
    /// `total_collected - total_expenses`
    pub balance: Money,
}

/// One member's signed balance: positive is owed, negative owes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetBalance {
    pub member_id: MemberId,
    pub amount: Money,
}

impl NetBalance {
    pub fn new(member_id: MemberId, amount: Money) -> Self {
        Self { member_id, amount }
    }
}

/// A suggested payment that reduces outstanding balances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementTransaction {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

/// A settlement transaction with member names attached for presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSuggestion {
    pub from: MemberId,
    pub from_name: String,
    pub to: MemberId,
    pub to_name: String,
    pub amount: Money,
}
