//! Fund record model
//!
//! A money movement between one member and the mess's pooled fund. Records
//! are immutable once created; the only change allowed is a soft delete.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{FundRecordId, MemberId, MessId};
use super::money::Money;

/// Direction of a fund movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundRecordKind {
    /// Member pays into the fund
    Contribution,
    /// Fund pays back to the member
    Refund,
}

impl FundRecordKind {
    /// Parse a record kind from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "contribution" | "collection" => Some(Self::Contribution),
            "refund" => Some(Self::Refund),
            _ => None,
        }
    }
}

impl fmt::Display for FundRecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contribution => write!(f, "Contribution"),
            Self::Refund => write!(f, "Refund"),
        }
    }
}

/// A contribution to, or refund from, the pooled fund
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundRecord {
    /// Unique identifier
    pub id: FundRecordId,

    /// The mess whose fund moved
    pub mess_id: MessId,

    /// The member on the other side of the movement
    pub member_id: MemberId,

    /// Contribution or refund
    pub kind: FundRecordKind,

    /// Amount (always positive; direction comes from `kind`)
    pub amount: Money,

    /// Free-form note
    #[serde(default)]
    pub note: String,

    /// Date of the movement
    pub date: NaiveDate,

    /// Member who recorded it
    pub created_by: MemberId,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// Set when the record is soft-deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl FundRecord {
    /// Create a new fund record
    pub fn new(
        mess_id: MessId,
        member_id: MemberId,
        kind: FundRecordKind,
        amount: Money,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: FundRecordId::new(),
            mess_id,
            member_id,
            kind,
            amount,
            note: String::new(),
            date,
            created_by: member_id,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    /// Check if this record has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Soft-delete the record
    pub fn mark_deleted(&mut self) {
        self.deleted_at = Some(Utc::now());
    }

    /// Effect of this record on the member's contributed total
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            FundRecordKind::Contribution => self.amount,
            FundRecordKind::Refund => -self.amount,
        }
    }

    /// Validate the record
    pub fn validate(&self) -> Result<(), FundRecordValidationError> {
        if !self.amount.is_positive() {
            return Err(FundRecordValidationError::NonPositiveAmount(self.amount));
        }
        if self.amount > Money::MAX_RECORD {
            return Err(FundRecordValidationError::AmountTooLarge(self.amount));
        }
        if self.note.len() > 200 {
            return Err(FundRecordValidationError::NoteTooLong(self.note.len()));
        }
        Ok(())
    }
}

impl fmt::Display for FundRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.kind,
            self.amount
        )
    }
}

/// Validation errors for fund records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundRecordValidationError {
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    NoteTooLong(usize),
}

impl fmt::Display for FundRecordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Fund record amount must be positive (got {})", amount)
            }
            Self::AmountTooLarge(amount) => write!(
                f,
                "Fund record amount {} exceeds the limit of {}",
                amount,
                Money::MAX_RECORD
            ),
            Self::NoteTooLong(len) => write!(f, "Note too long ({} chars, max 200)", len),
        }
    }
}

impl std::error::Error for FundRecordValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: FundRecordKind, cents: i64) -> FundRecord {
        FundRecord::new(
            MessId::new(),
            MemberId::new(),
            kind,
            Money::from_cents(cents),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        )
    }

    #[test]
    fn test_signed_amount() {
        assert_eq!(
            record(FundRecordKind::Contribution, 5000).signed_amount().cents(),
            5000
        );
        assert_eq!(
            record(FundRecordKind::Refund, 1200).signed_amount().cents(),
            -1200
        );
    }

    #[test]
    fn test_validation() {
        assert!(record(FundRecordKind::Contribution, 1).validate().is_ok());
        assert_eq!(
            record(FundRecordKind::Refund, 0).validate(),
            Err(FundRecordValidationError::NonPositiveAmount(Money::zero()))
        );

        let cap = Money::MAX_RECORD.cents();
        assert!(record(FundRecordKind::Contribution, cap).validate().is_ok());
        assert_eq!(
            record(FundRecordKind::Contribution, cap + 1).validate(),
            Err(FundRecordValidationError::AmountTooLarge(Money::from_cents(cap + 1)))
        );
    }

    #[test]
    fn test_kind_parse_accepts_legacy_collection() {
        assert_eq!(
            FundRecordKind::parse("collection"),
            Some(FundRecordKind::Contribution)
        );
        assert_eq!(FundRecordKind::parse("Refund"), Some(FundRecordKind::Refund));
        assert_eq!(FundRecordKind::parse("transfer"), None);
    }
}
