//! Member repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::MessMateError;
use crate::models::{Member, MemberId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct MemberData {
    members: Vec<Member>,
}

/// Repository for member persistence
pub struct MemberRepository {
    path: PathBuf,
    data: RwLock<HashMap<MemberId, Member>>,
}

impl MemberRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load members from disk
    pub fn load(&self) -> Result<(), MessMateError> {
        let file_data: MemberData = read_json(&self.path)?;

        let mut data = write_lock(&self.data)?;
        data.clear();
        for member in file_data.members {
            data.insert(member.id, member);
        }

        Ok(())
    }

    /// Save members to disk, sorted by name
    pub fn save(&self) -> Result<(), MessMateError> {
        let members = self.get_all()?;
        write_json_atomic(&self.path, &MemberData { members })
    }

    pub fn get(&self, id: MemberId) -> Result<Option<Member>, MessMateError> {
        let data = read_lock(&self.data)?;
        Ok(data.get(&id).cloned())
    }

    /// Find a member by name, ignoring case
    pub fn get_by_name(&self, name: &str) -> Result<Option<Member>, MessMateError> {
        let data = read_lock(&self.data)?;
        let needle = name.trim().to_lowercase();
        Ok(data
            .values()
            .find(|m| m.name.to_lowercase() == needle)
            .cloned())
    }

    /// All members sorted by name
    pub fn get_all(&self) -> Result<Vec<Member>, MessMateError> {
        let data = read_lock(&self.data)?;
        let mut members: Vec<_> = data.values().cloned().collect();
        members.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(members)
    }

    pub fn upsert(&self, member: Member) -> Result<(), MessMateError> {
        let mut data = write_lock(&self.data)?;
        data.insert(member.id, member);
        Ok(())
    }

    /// Check whether a name is taken by a member other than `exclude`
    pub fn name_exists(&self, name: &str, exclude: Option<MemberId>) -> Result<bool, MessMateError> {
        Ok(self
            .get_by_name(name)?
            .is_some_and(|m| Some(m.id) != exclude))
    }

    pub fn count(&self) -> Result<usize, MessMateError> {
        let data = read_lock(&self.data)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, MemberRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = MemberRepository::new(temp_dir.path().join("members.json"));
        repo.load().unwrap();
        (temp_dir, repo)
    }

    #[test]
    fn test_get_by_name_ignores_case() {
        let (_temp_dir, repo) = create_test_repo();
        let member = Member::new("Alice");
        let id = member.id;
        repo.upsert(member).unwrap();

        assert_eq!(repo.get_by_name("alice").unwrap().unwrap().id, id);
        assert_eq!(repo.get_by_name(" ALICE ").unwrap().unwrap().id, id);
        assert!(repo.get_by_name("bob").unwrap().is_none());
    }

    #[test]
    fn test_name_exists_with_exclusion() {
        let (_temp_dir, repo) = create_test_repo();
        let member = Member::new("Alice");
        let id = member.id;
        repo.upsert(member).unwrap();

        assert!(repo.name_exists("Alice", None).unwrap());
        assert!(!repo.name_exists("Alice", Some(id)).unwrap());
    }

    #[test]
    fn test_get_all_sorted() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(Member::new("carol")).unwrap();
        repo.upsert(Member::new("Alice")).unwrap();
        repo.upsert(Member::new("bob")).unwrap();

        let names: Vec<_> = repo
            .get_all()
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Alice", "bob", "carol"]);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.upsert(Member::new("Alice")).unwrap();
        repo.save().unwrap();

        let repo2 = MemberRepository::new(temp_dir.path().join("members.json"));
        repo2.load().unwrap();
        assert_eq!(repo2.count().unwrap(), 1);
    }
}
