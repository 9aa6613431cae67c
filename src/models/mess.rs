//! Mess model
//!
//! A mess is a shared household group. Its roster records which members
//! belong to it and with which role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{MemberId, MessId};

/// Smallest member limit a mess may be configured with
pub const MIN_MEMBER_LIMIT: usize = 6;

/// Largest member limit a mess may be configured with
pub const MAX_MEMBER_LIMIT: usize = 20;

/// Role of a member within a mess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessRole {
    /// Created the mess; exactly one per mess
    Owner,
    /// Can see every member's balance and manage roles
    Admin,
    /// Regular member
    #[default]
    Member,
}

impl MessRole {
    /// Owners and admins may view group-wide aggregates
    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Parse a role from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Some(Self::Owner),
            "admin" => Some(Self::Admin),
            "member" => Some(Self::Member),
            _ => None,
        }
    }
}

impl fmt::Display for MessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "Owner"),
            Self::Admin => write!(f, "Admin"),
            Self::Member => write!(f, "Member"),
        }
    }
}

/// A member's entry on a mess roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub member_id: MemberId,
    pub role: MessRole,
    pub joined_at: DateTime<Utc>,
}

/// A shared household group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mess {
    /// Unique identifier
    pub id: MessId,

    /// Display name
    pub name: String,

    /// Current roster, in join order
    #[serde(default)]
    pub members: Vec<Membership>,

    /// Maximum number of members
    pub member_limit: usize,

    /// When the mess was created
    pub created_at: DateTime<Utc>,

    /// When the mess was last modified
    pub updated_at: DateTime<Utc>,
}

impl Mess {
    /// Create a new mess with `owner` as its only member
    pub fn new(name: impl Into<String>, owner: MemberId, member_limit: usize) -> Self {
        let now = Utc::now();
        Self {
            id: MessId::new(),
            name: name.into(),
            members: vec![Membership {
                member_id: owner,
                role: MessRole::Owner,
                joined_at: now,
            }],
            member_limit,
            created_at: now,
            updated_at: now,
        }
    }

    /// Look up a member's roster entry
    pub fn membership(&self, member_id: MemberId) -> Option<&Membership> {
        self.members.iter().find(|m| m.member_id == member_id)
    }

    /// Check whether a member is on the roster
    pub fn is_member(&self, member_id: MemberId) -> bool {
        self.membership(member_id).is_some()
    }

    /// Role of a member, if on the roster
    pub fn role_of(&self, member_id: MemberId) -> Option<MessRole> {
        self.membership(member_id).map(|m| m.role)
    }

    /// IDs of all current members in roster order
    pub fn member_ids(&self) -> Vec<MemberId> {
        self.members.iter().map(|m| m.member_id).collect()
    }

    /// Check whether the roster has reached its limit
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.member_limit
    }

    /// Add a member with the given role
    pub fn add_member(&mut self, member_id: MemberId, role: MessRole) {
        self.members.push(Membership {
            member_id,
            role,
            joined_at: Utc::now(),
        });
        self.updated_at = Utc::now();
    }

    /// Remove a member from the roster; returns whether they were present
    pub fn remove_member(&mut self, member_id: MemberId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.member_id != member_id);
        let removed = self.members.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Change a member's role; returns whether the member was found
    pub fn set_role(&mut self, member_id: MemberId, role: MessRole) -> bool {
        match self.members.iter_mut().find(|m| m.member_id == member_id) {
            Some(entry) => {
                entry.role = role;
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Validate the mess
    pub fn validate(&self) -> Result<(), MessValidationError> {
        if self.name.trim().is_empty() {
            return Err(MessValidationError::EmptyName);
        }

        if !(MIN_MEMBER_LIMIT..=MAX_MEMBER_LIMIT).contains(&self.member_limit) {
            return Err(MessValidationError::MemberLimitOutOfRange(self.member_limit));
        }

        if self.members.len() > self.member_limit {
            return Err(MessValidationError::TooManyMembers {
                count: self.members.len(),
                limit: self.member_limit,
            });
        }

        let owners = self
            .members
            .iter()
            .filter(|m| m.role == MessRole::Owner)
            .count();
        if owners != 1 {
            return Err(MessValidationError::OwnerCount(owners));
        }

        Ok(())
    }
}

impl fmt::Display for Mess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for messes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessValidationError {
    EmptyName,
    MemberLimitOutOfRange(usize),
    TooManyMembers { count: usize, limit: usize },
    OwnerCount(usize),
}

impl fmt::Display for MessValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Mess name cannot be empty"),
            Self::MemberLimitOutOfRange(limit) => write!(
                f,
                "Member limit {} must be between {} and {}",
                limit, MIN_MEMBER_LIMIT, MAX_MEMBER_LIMIT
            ),
            Self::TooManyMembers { count, limit } => {
                write!(f, "Mess has {} members but the limit is {}", count, limit)
            }
            Self::OwnerCount(count) => {
                write!(f, "Mess must have exactly one owner (found {})", count)
            }
        }
    }
}

impl std::error::Error for MessValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_mess_has_owner() {
        let owner = MemberId::new();
        let mess = Mess::new("Flat 4B", owner, 8);

        assert_eq!(mess.role_of(owner), Some(MessRole::Owner));
        assert_eq!(mess.member_ids(), vec![owner]);
        assert!(mess.validate().is_ok());
    }

    #[test]
    fn test_roster_changes() {
        let owner = MemberId::new();
        let other = MemberId::new();
        let mut mess = Mess::new("Flat 4B", owner, 6);

        mess.add_member(other, MessRole::Member);
        assert!(mess.is_member(other));
        assert!(!mess.role_of(other).unwrap().is_elevated());

        assert!(mess.set_role(other, MessRole::Admin));
        assert!(mess.role_of(other).unwrap().is_elevated());

        assert!(mess.remove_member(other));
        assert!(!mess.is_member(other));
        assert!(!mess.remove_member(other));
    }

    #[test]
    fn test_is_full() {
        let mut mess = Mess::new("Tiny", MemberId::new(), 6);
        for _ in 0..5 {
            mess.add_member(MemberId::new(), MessRole::Member);
        }
        assert!(mess.is_full());
    }

    #[test]
    fn test_validation() {
        let owner = MemberId::new();
        let mut mess = Mess::new("Flat", owner, 30);
        assert_eq!(
            mess.validate(),
            Err(MessValidationError::MemberLimitOutOfRange(30))
        );

        mess.member_limit = 6;
        mess.set_role(owner, MessRole::Admin);
        assert_eq!(mess.validate(), Err(MessValidationError::OwnerCount(0)));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(MessRole::parse("Admin"), Some(MessRole::Admin));
        assert_eq!(MessRole::parse(" owner "), Some(MessRole::Owner));
        assert_eq!(MessRole::parse("guest"), None);
    }
}
