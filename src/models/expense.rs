//! Expense model
//!
//! An expense is money fronted by one member of a mess and shared among
//! some of its members according to a split policy.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::ids::{ExpenseId, MemberId, MessId};
use super::money::Money;

/// Per-split rounding tolerance, in cents
pub const SPLIT_TOLERANCE_CENTS: i64 = 2;

/// Allowed deviation of custom percentages from 100
pub const PERCENTAGE_TOLERANCE: f64 = 0.01;

/// Whether a percentage total is 100 within tolerance
///
/// A tiny slack absorbs binary float error on the tolerance boundary.
pub fn percentages_balance(total: f64) -> bool {
    (total - 100.0).abs() <= PERCENTAGE_TOLERANCE + 1e-9
}

/// How an expense is divided among members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    /// Everyone listed pays the same share
    #[default]
    Equal,
    /// Each member pays a given percentage
    Custom,
    /// Equal split among everyone except an explicit exclusion list
    Exclude,
}

impl SplitMethod {
    /// Parse a split method tag
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "equal" => Some(Self::Equal),
            "custom" => Some(Self::Custom),
            "exclude" => Some(Self::Exclude),
            _ => None,
        }
    }

    /// The tag used in storage and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Custom => "custom",
            Self::Exclude => "exclude",
        }
    }
}

impl fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expense category; the well-known ones plus any custom label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum ExpenseCategory {
    Groceries,
    Utilities,
    Rent,
    Internet,
    Household,
    Gas,
    #[default]
    Other,
    Custom(String),
}

impl ExpenseCategory {
    /// Known categories, for help text
    pub fn known() -> &'static [&'static str] {
        &[
            "groceries",
            "utilities",
            "rent",
            "internet",
            "household",
            "gas",
            "other",
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Groceries => "groceries",
            Self::Utilities => "utilities",
            Self::Rent => "rent",
            Self::Internet => "internet",
            Self::Household => "household",
            Self::Gas => "gas",
            Self::Other => "other",
            Self::Custom(label) => label,
        }
    }
}

impl From<String> for ExpenseCategory {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "groceries" => Self::Groceries,
            "utilities" => Self::Utilities,
            "rent" => Self::Rent,
            "internet" => Self::Internet,
            "household" => Self::Household,
            "gas" => Self::Gas,
            "other" | "" => Self::Other,
            _ => Self::Custom(s.trim().to_string()),
        }
    }
}

impl From<&str> for ExpenseCategory {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<ExpenseCategory> for String {
    fn from(category: ExpenseCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One member's portion of an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    /// The member who owes this portion
    pub member_id: MemberId,

    /// Amount owed
    pub amount: Money,

    /// Share of the expense, 0-100, two decimals
    pub percentage: f64,
}

impl ExpenseSplit {
    pub fn new(member_id: MemberId, amount: Money, percentage: f64) -> Self {
        Self {
            member_id,
            amount,
            percentage,
        }
    }
}

/// An expense logged within a mess
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier
    pub id: ExpenseId,

    /// The mess this expense belongs to
    pub mess_id: MessId,

    /// Total amount (always positive)
    pub amount: Money,

    /// What the money was spent on
    pub description: String,

    /// Category
    #[serde(default)]
    pub category: ExpenseCategory,

    /// Date of the expense
    pub date: NaiveDate,

    /// Member who fronted the money
    pub paid_by: MemberId,

    /// Policy used to compute `splits`
    #[serde(default)]
    pub split_method: SplitMethod,

    /// Per-member owed amounts
    #[serde(default)]
    pub splits: Vec<ExpenseSplit>,

    /// Member who logged the expense
    pub created_by: MemberId,

    /// When the expense was created
    pub created_at: DateTime<Utc>,

    /// When the expense was last modified
    pub updated_at: DateTime<Utc>,

    /// Set when the expense is soft-deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Expense {
    /// Create a new expense with no splits
    pub fn new(
        mess_id: MessId,
        amount: Money,
        description: impl Into<String>,
        date: NaiveDate,
        paid_by: MemberId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            mess_id,
            amount,
            description: description.into(),
            category: ExpenseCategory::default(),
            date,
            paid_by,
            split_method: SplitMethod::default(),
            splits: Vec::new(),
            created_by: paid_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Check if this expense has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Soft-delete the expense
    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Replace the splits and the policy that produced them
    pub fn set_splits(&mut self, method: SplitMethod, splits: Vec<ExpenseSplit>) {
        self.split_method = method;
        self.splits = splits;
        self.updated_at = Utc::now();
    }

    /// Sum of all split amounts
    pub fn splits_total(&self) -> Money {
        self.splits.iter().map(|s| s.amount).sum()
    }

    /// The split assigned to a member, if any
    pub fn split_for(&self, member_id: MemberId) -> Option<&ExpenseSplit> {
        self.splits.iter().find(|s| s.member_id == member_id)
    }

    /// Check whether a member shares in this expense
    pub fn involves(&self, member_id: MemberId) -> bool {
        self.split_for(member_id).is_some()
    }

    /// Validate the expense
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if !self.amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount(self.amount));
        }
        if self.amount > Money::MAX_RECORD {
            return Err(ExpenseValidationError::AmountTooLarge(self.amount));
        }

        if self.description.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyDescription);
        }

        if self.splits.is_empty() {
            return Err(ExpenseValidationError::NoSplits);
        }

        let mut seen = HashSet::new();
        for split in &self.splits {
            if !seen.insert(split.member_id) {
                return Err(ExpenseValidationError::DuplicateSplitMember(split.member_id));
            }
            if split.amount.is_negative() {
                return Err(ExpenseValidationError::NegativeSplit(split.member_id));
            }
        }

        let splits_total = self.splits_total();
        let tolerance = SPLIT_TOLERANCE_CENTS * self.splits.len() as i64;
        if (splits_total - self.amount).cents().abs() > tolerance {
            return Err(ExpenseValidationError::SplitsMismatch {
                expense_amount: self.amount,
                splits_total,
            });
        }

        if self.split_method == SplitMethod::Custom {
            let percent_total: f64 = self.splits.iter().map(|s| s.percentage).sum();
            if !percentages_balance(percent_total) {
                return Err(ExpenseValidationError::PercentagesMismatch(percent_total));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount
        )
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseValidationError {
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    EmptyDescription,
    NoSplits,
    DuplicateSplitMember(MemberId),
    NegativeSplit(MemberId),
    SplitsMismatch {
        expense_amount: Money,
        splits_total: Money,
    },
    PercentagesMismatch(f64),
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Expense amount must be positive (got {})", amount)
            }
            Self::AmountTooLarge(amount) => write!(
                f,
                "Expense amount {} exceeds the limit of {}",
                amount,
                Money::MAX_RECORD
            ),
            Self::EmptyDescription => write!(f, "Expense description cannot be empty"),
            Self::NoSplits => write!(f, "Expense must be split among at least one member"),
            Self::DuplicateSplitMember(id) => {
                write!(f, "Member {} appears in more than one split", id)
            }
            Self::NegativeSplit(id) => write!(f, "Split for member {} is negative", id),
            Self::SplitsMismatch {
                expense_amount,
                splits_total,
            } => write!(
                f,
                "Split totals ({}) do not match expense amount ({})",
                splits_total, expense_amount
            ),
            Self::PercentagesMismatch(total) => {
                write!(f, "Split percentages sum to {:.2}, expected 100", total)
            }
        }
    }
}

impl std::error::Error for ExpenseValidationError {}
