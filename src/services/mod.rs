//! Service layer for MessMate
//!
//! The service layer provides business logic on top of the storage layer:
//! validation, access checks and the balance and settlement computations.
//! `split` and `settlement` are pure and never touch storage.

pub mod balance;
pub mod expense;
pub mod fund;
pub mod member;
pub mod mess;
pub mod settlement;
pub mod split;

pub use balance::BalanceService;
pub use expense::{
    CreateExpenseInput, ExpenseFilter, ExpenseService, SplitRequest, UpdateExpenseInput,
};
pub use fund::{FundFilter, FundRecordInput, FundService};
pub use member::MemberService;
pub use mess::{require_elevated, require_member, MessService};
pub use settlement::{
    check_simplification, simplify_settlements, validate_simplification, SimplificationViolation,
};
pub use split::{calculate_splits, split_method_from_tag, CustomShare, SplitResult};
