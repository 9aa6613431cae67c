//! Mess repository for JSON storage
//!
//! Messes carry their memberships inline, so this repository is also the
//! source of truth for who belongs to which group.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::MessMateError;
use crate::models::{MemberId, Mess, MessId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct MessData {
    messes: Vec<Mess>,
}

/// Repository for mess persistence
pub struct MessRepository {
    path: PathBuf,
    data: RwLock<HashMap<MessId, Mess>>,
}

impl MessRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load messes from disk
    pub fn load(&self) -> Result<(), MessMateError> {
        let file_data: MessData = read_json(&self.path)?;

        let mut data = write_lock(&self.data)?;
        data.clear();
        for mess in file_data.messes {
            data.insert(mess.id, mess);
        }

        Ok(())
    }

    /// Save messes to disk
    pub fn save(&self) -> Result<(), MessMateError> {
        let messes = self.get_all()?;
        write_json_atomic(&self.path, &MessData { messes })
    }

    pub fn get(&self, id: MessId) -> Result<Option<Mess>, MessMateError> {
        let data = read_lock(&self.data)?;
        Ok(data.get(&id).cloned())
    }

    /// Find a mess by name, ignoring case
    pub fn get_by_name(&self, name: &str) -> Result<Option<Mess>, MessMateError> {
        let data = read_lock(&self.data)?;
        let needle = name.trim().to_lowercase();
        Ok(data
            .values()
            .find(|m| m.name.to_lowercase() == needle)
            .cloned())
    }

    /// All messes, oldest first
    pub fn get_all(&self) -> Result<Vec<Mess>, MessMateError> {
        let data = read_lock(&self.data)?;
        let mut messes: Vec<_> = data.values().cloned().collect();
        messes.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));
        Ok(messes)
    }

    /// Messes the given member belongs to
    pub fn get_for_member(&self, member_id: MemberId) -> Result<Vec<Mess>, MessMateError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|m| m.is_member(member_id))
            .collect())
    }

    pub fn upsert(&self, mess: Mess) -> Result<(), MessMateError> {
        let mut data = write_lock(&self.data)?;
        data.insert(mess.id, mess);
        Ok(())
    }

    pub fn count(&self) -> Result<usize, MessMateError> {
        let data = read_lock(&self.data)?;
        Ok(data.len())
    }
}
