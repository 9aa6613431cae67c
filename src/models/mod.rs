//! Core data models for MessMate
//!
//! This module contains the data structures that represent the shared-living
//! domain: members, messes, expenses, fund records, and derived balances.

pub mod balance;
pub mod expense;
pub mod fund;
pub mod ids;
pub mod member;
pub mod mess;
pub mod money;

pub use balance::{
    BalanceBreakdown, BalanceStatus, FundBalance, NetBalance, SettlementSuggestion,
    SettlementTransaction,
};
pub use expense::{Expense, ExpenseCategory, ExpenseSplit, SplitMethod};
pub use fund::{FundRecord, FundRecordKind};
pub use ids::{ExpenseId, FundRecordId, MemberId, MessId};
pub use member::Member;
pub use mess::{Membership, Mess, MessRole};
pub use money::Money;
