//! Fund record repository for JSON storage
//!
//! Manages loading and saving contributions and refunds to fund_records.json.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::MessMateError;
use crate::models::{FundRecord, FundRecordId, FundRecordKind, MemberId, MessId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct FundRecordData {
    records: Vec<FundRecord>,
}

/// Query over the fund records of one mess
#[derive(Debug, Clone)]
pub struct FundRecordQuery {
    /// Mess to search; always required
    pub mess_id: MessId,
    /// Only records for this member
    pub member_id: Option<MemberId>,
    /// Only records of this kind
    pub kind: Option<FundRecordKind>,
    /// Include soft-deleted records
    pub include_deleted: bool,
}

impl FundRecordQuery {
    /// Live records of a mess
    pub fn for_mess(mess_id: MessId) -> Self {
        Self {
            mess_id,
            member_id: None,
            kind: None,
            include_deleted: false,
        }
    }

    pub fn member(mut self, member_id: MemberId) -> Self {
        self.member_id = Some(member_id);
        self
    }

    pub fn kind(mut self, kind: FundRecordKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    fn matches(&self, record: &FundRecord) -> bool {
        record.mess_id == self.mess_id
            && (self.include_deleted || !record.is_deleted())
            && self.member_id.map_or(true, |id| record.member_id == id)
            && self.kind.map_or(true, |kind| record.kind == kind)
    }
}

/// Repository for fund record persistence
pub struct FundRecordRepository {
    path: PathBuf,
    data: RwLock<HashMap<FundRecordId, FundRecord>>,
    /// Index: mess_id -> record ids
    by_mess: RwLock<HashMap<MessId, Vec<FundRecordId>>>,
}

impl FundRecordRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_mess: RwLock::new(HashMap::new()),
        }
    }

    /// Load records from disk and build the index
    pub fn load(&self) -> Result<(), MessMateError> {
        let file_data: FundRecordData = read_json(&self.path)?;

        let mut data = write_lock(&self.data)?;
        let mut by_mess = write_lock(&self.by_mess)?;

        data.clear();
        by_mess.clear();

        for record in file_data.records {
            by_mess.entry(record.mess_id).or_default().push(record.id);
            data.insert(record.id, record);
        }

        Ok(())
    }

    /// Save records to disk
    pub fn save(&self) -> Result<(), MessMateError> {
        let data = read_lock(&self.data)?;

        let mut records: Vec<_> = data.values().cloned().collect();
        sort_newest_first(&mut records);

        write_json_atomic(&self.path, &FundRecordData { records })
    }

    /// Get a record by ID, including soft-deleted ones
    pub fn get(&self, id: FundRecordId) -> Result<Option<FundRecord>, MessMateError> {
        let data = read_lock(&self.data)?;
        Ok(data.get(&id).cloned())
    }

    /// Run a query, newest records first
    pub fn query(&self, query: &FundRecordQuery) -> Result<Vec<FundRecord>, MessMateError> {
        let data = read_lock(&self.data)?;
        let by_mess = read_lock(&self.by_mess)?;

        let ids = by_mess
            .get(&query.mess_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut records: Vec<_> = ids
            .iter()
            .filter_map(|id| data.get(id))
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        sort_newest_first(&mut records);
        Ok(records)
    }

    /// Insert or update a record
    pub fn upsert(&self, record: FundRecord) -> Result<(), MessMateError> {
        let mut data = write_lock(&self.data)?;
        let mut by_mess = write_lock(&self.by_mess)?;

        if !data.contains_key(&record.id) {
            by_mess.entry(record.mess_id).or_default().push(record.id);
        }
        data.insert(record.id, record);
        Ok(())
    }

    pub fn count(&self) -> Result<usize, MessMateError> {
        let data = read_lock(&self.data)?;
        Ok(data.len())
    }
}

fn sort_newest_first(records: &mut [FundRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
}
