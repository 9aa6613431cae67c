//! Member model
//!
//! A person using MessMate. Members are global; their participation in a
//! mess is recorded on the mess roster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::MemberId;

/// A person who can join messes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Unique identifier
    pub id: MemberId,

    /// Display name, unique (case-insensitive)
    pub name: String,

    /// When the member was created
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Create a new member
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: MemberId::new(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// Validate the member
    pub fn validate(&self) -> Result<(), MemberValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(MemberValidationError::EmptyName);
        }
        if name.len() > 50 {
            return Err(MemberValidationError::NameTooLong(name.len()));
        }
        Ok(())
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for members
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for MemberValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Member name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Member name too long ({} chars, max 50)", len)
            }
        }
    }
}

impl std::error::Error for MemberValidationError {}
