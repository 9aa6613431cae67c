//! Pooled fund service
//!
//! Contributions move money from a member into the mess fund; refunds move it
//! back out. Records are never edited, only soft-deleted and re-entered.

use chrono::NaiveDate;
use tracing::info;

use crate::error::{MessMateError, MessMateResult};
use crate::models::{FundRecord, FundRecordId, FundRecordKind, MemberId, MessId, Money};
use crate::storage::{FundRecordQuery, Storage};

use super::mess::{require_elevated, require_member, MessService};

/// Input for recording a fund movement
#[derive(Debug, Clone)]
pub struct FundRecordInput {
    pub mess_id: MessId,
    /// Member recording the movement
    pub requester: MemberId,
    /// Member whose money moved
    pub member_id: MemberId,
    pub amount: Money,
    pub date: NaiveDate,
    pub note: Option<String>,
}

/// Filters for listing fund records
#[derive(Debug, Clone, Default)]
pub struct FundFilter {
    pub member_id: Option<MemberId>,
    pub kind: Option<FundRecordKind>,
}

/// Service for pooled fund records
pub struct FundService<'a> {
    storage: &'a Storage,
}

impl<'a> FundService<'a> {
    /// Create a new fund service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a contribution
    ///
    /// Members may record their own contributions; recording one for someone
    /// else takes an owner or admin.
    pub fn contribute(&self, input: FundRecordInput) -> MessMateResult<FundRecord> {
        let mess = MessService::new(self.storage).require(input.mess_id)?;
        require_member(&mess, input.requester)?;
        if input.requester != input.member_id {
            require_elevated(&mess, input.requester)?;
        }
        self.record(input, FundRecordKind::Contribution)
    }

    /// Record a refund paid out of the fund; owners and admins only
    pub fn refund(&self, input: FundRecordInput) -> MessMateResult<FundRecord> {
        let mess = MessService::new(self.storage).require(input.mess_id)?;
        require_elevated(&mess, input.requester)?;
        self.record(input, FundRecordKind::Refund)
    }

    /// List live records of a mess, newest first
    pub fn list(
        &self,
        mess_id: MessId,
        requester: MemberId,
        filter: &FundFilter,
    ) -> MessMateResult<Vec<FundRecord>> {
        let mess = MessService::new(self.storage).require(mess_id)?;
        require_member(&mess, requester)?;

        let mut query = FundRecordQuery::for_mess(mess_id);
        query.member_id = filter.member_id;
        query.kind = filter.kind;
        self.storage.fund_records.query(&query)
    }

    /// Find a live record by full ID or display prefix
    pub fn find(
        &self,
        mess_id: MessId,
        requester: MemberId,
        identifier: &str,
    ) -> MessMateResult<Option<FundRecord>> {
        let records = self.list(mess_id, requester, &FundFilter::default())?;

        if let Ok(id) = identifier.parse::<FundRecordId>() {
            return Ok(records.into_iter().find(|r| r.id == id));
        }

        let needle = identifier.trim().to_lowercase();
        let prefix = needle.strip_prefix("fund-").unwrap_or(&needle).to_string();
        if prefix.is_empty() {
            return Ok(None);
        }
        Ok(records
            .into_iter()
            .find(|r| r.id.as_uuid().to_string().starts_with(&prefix)))
    }

    /// Soft-delete a record; only its recorder or an owner/admin may
    pub fn delete(
        &self,
        mess_id: MessId,
        requester: MemberId,
        id: FundRecordId,
    ) -> MessMateResult<FundRecord> {
        let mess = MessService::new(self.storage).require(mess_id)?;
        let role = require_member(&mess, requester)?;

        let mut record = self
            .storage
            .fund_records
            .get(id)?
            .filter(|r| r.mess_id == mess_id && !r.is_deleted())
            .ok_or_else(|| MessMateError::fund_record_not_found(id.to_string()))?;

        if record.created_by != requester && !role.is_elevated() {
            return Err(MessMateError::Forbidden(
                "Only the member who recorded this or an owner/admin can delete it".into(),
            ));
        }

        record.mark_deleted();
        self.storage.fund_records.upsert(record.clone())?;
        self.storage.fund_records.save()?;

        info!(mess = %mess_id, record = %record.id, "fund record deleted");
        Ok(record)
    }

    fn record(&self, input: FundRecordInput, kind: FundRecordKind) -> MessMateResult<FundRecord> {
        let mess = MessService::new(self.storage).require(input.mess_id)?;
        if !mess.is_member(input.member_id) {
            return Err(MessMateError::Validation(format!(
                "{} is not a member of '{}'",
                input.member_id, mess.name
            )));
        }

        let mut record = FundRecord::new(
            input.mess_id,
            input.member_id,
            kind,
            input.amount,
            input.date,
        );
        record.created_by = input.requester;
        if let Some(note) = input.note {
            record.note = note.trim().to_string();
        }

        record
            .validate()
            .map_err(|e| MessMateError::Validation(e.to_string()))?;

        self.storage.fund_records.upsert(record.clone())?;
        self.storage.fund_records.save()?;

        info!(
            mess = %record.mess_id,
            member = %record.member_id,
            kind = %record.kind,
            amount = %record.amount,
            "fund record created"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MessMatePaths;
    use crate::services::MemberService;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Storage, MessId, Vec<MemberId>) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MessMatePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        let members = MemberService::new(&storage);
        let ids: Vec<MemberId> = ["Owner", "Bob", "Carol"]
            .iter()
            .map(|n| members.add(n).unwrap().id)
            .collect();

        let messes = MessService::new(&storage);
        let mess = messes.create("Flat", ids[0], 6).unwrap().id;
        messes.join(mess, ids[1]).unwrap();
        messes.join(mess, ids[2]).unwrap();

        (temp_dir, storage, mess, ids)
    }

    fn input(mess_id: MessId, requester: MemberId, member_id: MemberId, cents: i64) -> FundRecordInput {
        FundRecordInput {
            mess_id,
            requester,
            member_id,
            amount: Money::from_cents(cents),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            note: Some("March".into()),
        }
    }

    #[test]
    fn test_member_contributes_for_self() {
        let (_temp_dir, storage, mess, ids) = setup();
        let service = FundService::new(&storage);

        let record = service.contribute(input(mess, ids[1], ids[1], 5000)).unwrap();
        assert_eq!(record.kind, FundRecordKind::Contribution);
        assert_eq!(record.note, "March");
    }

    #[test]
    fn test_recording_for_others_needs_elevated_role() {
        let (_temp_dir, storage, mess, ids) = setup();
        let service = FundService::new(&storage);

        let err = service
            .contribute(input(mess, ids[1], ids[2], 5000))
            .unwrap_err();
        assert!(matches!(err, MessMateError::Forbidden(_)));

        assert!(service.contribute(input(mess, ids[0], ids[2], 5000)).is_ok());
    }

    #[test]
    fn test_refund_is_elevated_only() {
        let (_temp_dir, storage, mess, ids) = setup();
        let service = FundService::new(&storage);

        let err = service.refund(input(mess, ids[1], ids[1], 500)).unwrap_err();
        assert!(matches!(err, MessMateError::Forbidden(_)));

        let record = service.refund(input(mess, ids[0], ids[1], 500)).unwrap();
        assert_eq!(record.signed_amount().cents(), -500);
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let (_temp_dir, storage, mess, ids) = setup();
        let service = FundService::new(&storage);

        assert!(service
            .contribute(input(mess, ids[1], ids[1], 0))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_list_and_delete() {
        let (_temp_dir, storage, mess, ids) = setup();
        let service = FundService::new(&storage);

        let first = service.contribute(input(mess, ids[1], ids[1], 5000)).unwrap();
        service.contribute(input(mess, ids[2], ids[2], 3000)).unwrap();
        service.refund(input(mess, ids[0], ids[2], 1000)).unwrap();

        let carol = FundFilter {
            member_id: Some(ids[2]),
            ..Default::default()
        };
        assert_eq!(service.list(mess, ids[0], &carol).unwrap().len(), 2);

        let err = service.delete(mess, ids[2], first.id).unwrap_err();
        assert!(matches!(err, MessMateError::Forbidden(_)));

        service.delete(mess, ids[1], first.id).unwrap();
        assert_eq!(
            service.list(mess, ids[0], &FundFilter::default()).unwrap().len(),
            2
        );
        assert!(service
            .delete(mess, ids[1], first.id)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_find_by_display_id() {
        let (_temp_dir, storage, mess, ids) = setup();
        let service = FundService::new(&storage);
        let record = service.contribute(input(mess, ids[1], ids[1], 5000)).unwrap();

        let found = service
            .find(mess, ids[1], &record.id.to_string())
            .unwrap()
            .unwrap();
        assert_eq!(found.id, record.id);
    }
}
