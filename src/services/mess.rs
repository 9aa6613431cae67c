//! Mess service
//!
//! Creating messes, managing the roster and answering the access questions
//! every other service asks before touching a mess's records.

use tracing::info;

use crate::error::{MessMateError, MessMateResult};
use crate::models::{BalanceStatus, MemberId, Mess, MessId, MessRole};
use crate::storage::Storage;

use super::balance::BalanceService;

/// Role of `member_id` in `mess`, failing with `Unauthorized` for outsiders
pub fn require_member(mess: &Mess, member_id: MemberId) -> MessMateResult<MessRole> {
    mess.role_of(member_id).ok_or_else(|| {
        MessMateError::Unauthorized(format!("{} is not a member of '{}'", member_id, mess.name))
    })
}

/// Require an owner or admin, failing with `Forbidden` for plain members
pub fn require_elevated(mess: &Mess, member_id: MemberId) -> MessMateResult<MessRole> {
    let role = require_member(mess, member_id)?;
    if role.is_elevated() {
        Ok(role)
    } else {
        Err(MessMateError::Forbidden(format!(
            "Only owners and admins of '{}' can do this",
            mess.name
        )))
    }
}

/// Service for mess and roster management
pub struct MessService<'a> {
    storage: &'a Storage,
}

impl<'a> MessService<'a> {
    /// Create a new mess service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a mess owned by `owner`
    pub fn create(&self, name: &str, owner: MemberId, member_limit: usize) -> MessMateResult<Mess> {
        let name = name.trim();

        self.storage
            .members
            .get(owner)?
            .ok_or_else(|| MessMateError::member_not_found(owner.to_string()))?;

        if self.storage.messes.get_by_name(name)?.is_some() {
            return Err(MessMateError::Duplicate {
                entity_type: "Mess",
                identifier: name.to_string(),
            });
        }

        let mess = Mess::new(name, owner, member_limit);
        mess.validate()
            .map_err(|e| MessMateError::Validation(e.to_string()))?;

        self.storage.messes.upsert(mess.clone())?;
        self.storage.messes.save()?;

        info!(mess = %mess.id, name = %mess.name, owner = %owner, "mess created");
        Ok(mess)
    }

    /// Get a mess by ID
    pub fn get(&self, id: MessId) -> MessMateResult<Option<Mess>> {
        self.storage.messes.get(id)
    }

    /// Get a mess by ID, failing if it does not exist
    pub fn require(&self, id: MessId) -> MessMateResult<Mess> {
        self.storage
            .messes
            .get(id)?
            .ok_or_else(|| MessMateError::mess_not_found(id.to_string()))
    }

    /// Find a mess by name or ID
    pub fn find(&self, identifier: &str) -> MessMateResult<Option<Mess>> {
        if let Some(mess) = self.storage.messes.get_by_name(identifier)? {
            return Ok(Some(mess));
        }
        if let Ok(id) = identifier.parse::<MessId>() {
            return self.storage.messes.get(id);
        }
        Ok(None)
    }

    /// List messes, optionally only those a member belongs to
    pub fn list(&self, member: Option<MemberId>) -> MessMateResult<Vec<Mess>> {
        match member {
            Some(id) => self.storage.messes.get_for_member(id),
            None => self.storage.messes.get_all(),
        }
    }

    /// Add `member_id` to the roster as a regular member
    pub fn join(&self, mess_id: MessId, member_id: MemberId) -> MessMateResult<Mess> {
        let mut mess = self.require(mess_id)?;

        self.storage
            .members
            .get(member_id)?
            .ok_or_else(|| MessMateError::member_not_found(member_id.to_string()))?;

        if mess.is_member(member_id) {
            return Err(MessMateError::Duplicate {
                entity_type: "Membership",
                identifier: format!("{} in '{}'", member_id, mess.name),
            });
        }

        if mess.is_full() {
            return Err(MessMateError::MemberLimit {
                mess: mess.name.clone(),
                limit: mess.member_limit,
            });
        }

        mess.add_member(member_id, MessRole::Member);
        self.storage.messes.upsert(mess.clone())?;
        self.storage.messes.save()?;

        info!(mess = %mess.id, member = %member_id, "member joined mess");
        Ok(mess)
    }

    /// Change a member's role; only the owner may do this
    pub fn set_role(
        &self,
        mess_id: MessId,
        requester: MemberId,
        member_id: MemberId,
        role: MessRole,
    ) -> MessMateResult<Mess> {
        let mut mess = self.require(mess_id)?;

        if require_member(&mess, requester)? != MessRole::Owner {
            return Err(MessMateError::Forbidden(format!(
                "Only the owner of '{}' can change roles",
                mess.name
            )));
        }

        if role == MessRole::Owner {
            return Err(MessMateError::Validation(
                "A mess has exactly one owner; ownership cannot be assigned".into(),
            ));
        }

        match mess.role_of(member_id) {
            None => {
                return Err(MessMateError::Validation(format!(
                    "{} is not a member of '{}'",
                    member_id, mess.name
                )))
            }
            Some(MessRole::Owner) => {
                return Err(MessMateError::Validation(
                    "The owner's role cannot be changed".into(),
                ))
            }
            Some(_) => {}
        }

        mess.set_role(member_id, role);
        self.storage.messes.upsert(mess.clone())?;
        self.storage.messes.save()?;

        info!(mess = %mess.id, member = %member_id, role = %role, "role changed");
        Ok(mess)
    }

    /// Remove `member_id` from the roster
    ///
    /// Only a settled member may leave. Their past expenses and fund records
    /// stay in the mess but no longer appear in roster-wide balance views.
    pub fn leave(&self, mess_id: MessId, member_id: MemberId) -> MessMateResult<Mess> {
        let mut mess = self.require(mess_id)?;

        if require_member(&mess, member_id)? == MessRole::Owner {
            return Err(MessMateError::Validation(
                "The owner cannot leave the mess".into(),
            ));
        }

        let balance =
            BalanceService::new(self.storage).calculate_member_balance(mess_id, member_id)?;
        if balance.status != BalanceStatus::Settled {
            return Err(MessMateError::Validation(format!(
                "{} has an unsettled balance of {} in '{}'; settle up before leaving",
                balance.member_name, balance.balance, mess.name
            )));
        }

        mess.remove_member(member_id);
        self.storage.messes.upsert(mess.clone())?;
        self.storage.messes.save()?;

        info!(mess = %mess.id, member = %member_id, "member left mess");
        Ok(mess)
    }
}
