//! Member service
//!
//! Members are global; which messes they belong to is tracked on each mess.

use tracing::info;

use crate::error::{MessMateError, MessMateResult};
use crate::models::{Member, MemberId};
use crate::storage::Storage;

/// Service for member management
pub struct MemberService<'a> {
    storage: &'a Storage,
}

impl<'a> MemberService<'a> {
    /// Create a new member service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Register a new member
    pub fn add(&self, name: &str) -> MessMateResult<Member> {
        let name = name.trim();

        if self.storage.members.name_exists(name, None)? {
            return Err(MessMateError::Duplicate {
                entity_type: "Member",
                identifier: name.to_string(),
            });
        }

        let member = Member::new(name);
        member
            .validate()
            .map_err(|e| MessMateError::Validation(e.to_string()))?;

        self.storage.members.upsert(member.clone())?;
        self.storage.members.save()?;

        info!(member = %member.id, name = %member.name, "member added");
        Ok(member)
    }

    /// Get a member by ID
    pub fn get(&self, id: MemberId) -> MessMateResult<Option<Member>> {
        self.storage.members.get(id)
    }

    /// Find a member by name or ID
    pub fn find(&self, identifier: &str) -> MessMateResult<Option<Member>> {
        if let Some(member) = self.storage.members.get_by_name(identifier)? {
            return Ok(Some(member));
        }
        if let Ok(id) = identifier.parse::<MemberId>() {
            return self.storage.members.get(id);
        }
        Ok(None)
    }

    /// Find a member, failing if there is none
    pub fn require(&self, identifier: &str) -> MessMateResult<Member> {
        self.find(identifier)?
            .ok_or_else(|| MessMateError::member_not_found(identifier))
    }

    /// Display name for a member, falling back to the ID
    pub fn name_of(&self, id: MemberId) -> MessMateResult<String> {
        Ok(self
            .storage
            .members
            .get(id)?
            .map(|m| m.name)
            .unwrap_or_else(|| id.to_string()))
    }

    /// List all members sorted by name
    pub fn list(&self) -> MessMateResult<Vec<Member>> {
        self.storage.members.get_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MessMatePaths;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MessMatePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_add_member() {
        let (_temp_dir, storage) = create_test_storage();
        let service = MemberService::new(&storage);

        let member = service.add("  Alice ").unwrap();
        assert_eq!(member.name, "Alice");
        assert_eq!(service.list().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_name_is_case_insensitive() {
        let (_temp_dir, storage) = create_test_storage();
        let service = MemberService::new(&storage);

        service.add("Alice").unwrap();
        let err = service.add("alice").unwrap_err();
        assert!(matches!(err, MessMateError::Duplicate { .. }));
    }

    #[test]
    fn test_empty_name_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = MemberService::new(&storage);

        assert!(service.add("   ").unwrap_err().is_validation());
    }

    #[test]
    fn test_find_by_name_or_id() {
        let (_temp_dir, storage) = create_test_storage();
        let service = MemberService::new(&storage);
        let alice = service.add("Alice").unwrap();

        assert_eq!(service.find("ALICE").unwrap().unwrap().id, alice.id);
        let by_id = alice.id.as_uuid().to_string();
        assert_eq!(service.find(&by_id).unwrap().unwrap().id, alice.id);
        assert!(service.require("Bob").unwrap_err().is_not_found());
    }
}
