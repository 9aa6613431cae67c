//! Custom error types for MessMate
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for MessMate operations
#[derive(Error, Debug)]
pub enum MessMateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed or inconsistent split policy input
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// The member does not belong to the mess
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The member belongs to the mess but lacks an elevated role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// The mess roster is full
    #[error("Mess '{mess}' is full ({limit} members)")]
    MemberLimit { mess: String, limit: usize },

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl MessMateError {
    /// Create a "not found" error for members
    pub fn member_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Member",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for messes
    pub fn mess_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Mess",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for fund records
    pub fn fund_record_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Fund record",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidSplit(_))
    }

    /// Check if this is an access error (unauthorized or forbidden)
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::Forbidden(_))
    }
}

impl From<std::io::Error> for MessMateError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MessMateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for MessMate operations
pub type MessMateResult<T> = Result<T, MessMateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MessMateError::InvalidSplit("percentages sum to 90".into());
        assert_eq!(err.to_string(), "Invalid split: percentages sum to 90");
    }

    #[test]
    fn test_not_found_error() {
        let err = MessMateError::member_not_found("alice");
        assert_eq!(err.to_string(), "Member not found: alice");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_member_limit_error() {
        let err = MessMateError::MemberLimit {
            mess: "Flat 4B".into(),
            limit: 6,
        };
        assert_eq!(err.to_string(), "Mess 'Flat 4B' is full (6 members)");
    }

    #[test]
    fn test_access_denied() {
        assert!(MessMateError::Forbidden("x".into()).is_access_denied());
        assert!(MessMateError::Unauthorized("x".into()).is_access_denied());
        assert!(!MessMateError::Validation("x".into()).is_access_denied());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MessMateError = io_err.into();
        assert!(matches!(err, MessMateError::Io(_)));
    }
}
