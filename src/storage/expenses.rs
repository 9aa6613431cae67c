//! Expense repository for JSON storage
//!
//! Manages loading and saving expenses to expenses.json. Expenses are indexed
//! by mess so that every query is partitioned by mess id.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::MessMateError;
use crate::models::{Expense, ExpenseId, MemberId, MessId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

/// Serializable expense data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    expenses: Vec<Expense>,
}

/// Query over the expenses of one mess
#[derive(Debug, Clone)]
pub struct ExpenseQuery {
    /// Mess to search; always required
    pub mess_id: MessId,
    /// Only expenses paid by this member
    pub paid_by: Option<MemberId>,
    /// Only expenses this member shares in
    pub split_member: Option<MemberId>,
    /// Include soft-deleted expenses
    pub include_deleted: bool,
}

impl ExpenseQuery {
    /// Live expenses of a mess
    pub fn for_mess(mess_id: MessId) -> Self {
        Self {
            mess_id,
            paid_by: None,
            split_member: None,
            include_deleted: false,
        }
    }

    /// Restrict to expenses paid by a member
    pub fn paid_by(mut self, member_id: MemberId) -> Self {
        self.paid_by = Some(member_id);
        self
    }

    /// Restrict to expenses a member shares in
    pub fn split_member(mut self, member_id: MemberId) -> Self {
        self.split_member = Some(member_id);
        self
    }

    /// Include soft-deleted expenses
    pub fn with_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    fn matches(&self, expense: &Expense) -> bool {
        expense.mess_id == self.mess_id
            && (self.include_deleted || !expense.is_deleted())
            && self.paid_by.map_or(true, |id| expense.paid_by == id)
            && self.split_member.map_or(true, |id| expense.involves(id))
    }
}

/// Repository for expense persistence with a per-mess index
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<HashMap<ExpenseId, Expense>>,
    /// Index: mess_id -> expense_ids
    by_mess: RwLock<HashMap<MessId, Vec<ExpenseId>>>,
}

impl ExpenseRepository {
    /// Create a new expense repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_mess: RwLock::new(HashMap::new()),
        }
    }

    /// Load expenses from disk and build the index
    pub fn load(&self) -> Result<(), MessMateError> {
        let file_data: ExpenseData = read_json(&self.path)?;

        let mut data = write_lock(&self.data)?;
        let mut by_mess = write_lock(&self.by_mess)?;

        data.clear();
        by_mess.clear();

        for expense in file_data.expenses {
            by_mess.entry(expense.mess_id).or_default().push(expense.id);
            data.insert(expense.id, expense);
        }

        Ok(())
    }

    /// Save expenses to disk
    pub fn save(&self) -> Result<(), MessMateError> {
        let data = read_lock(&self.data)?;

        let mut expenses: Vec<_> = data.values().cloned().collect();
        sort_newest_first(&mut expenses);

        write_json_atomic(&self.path, &ExpenseData { expenses })
    }

    /// Get an expense by ID, including soft-deleted ones
    pub fn get(&self, id: ExpenseId) -> Result<Option<Expense>, MessMateError> {
        let data = read_lock(&self.data)?;
        Ok(data.get(&id).cloned())
    }

    /// Run a query, newest expenses first
    pub fn query(&self, query: &ExpenseQuery) -> Result<Vec<Expense>, MessMateError> {
        let data = read_lock(&self.data)?;
        let by_mess = read_lock(&self.by_mess)?;

        let ids = by_mess
            .get(&query.mess_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut expenses: Vec<_> = ids
            .iter()
            .filter_map(|id| data.get(id))
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        sort_newest_first(&mut expenses);
        Ok(expenses)
    }

    /// Insert or update an expense
    pub fn upsert(&self, expense: Expense) -> Result<(), MessMateError> {
        let mut data = write_lock(&self.data)?;
        let mut by_mess = write_lock(&self.by_mess)?;

        if let Some(old) = data.get(&expense.id) {
            if let Some(ids) = by_mess.get_mut(&old.mess_id) {
                ids.retain(|&id| id != expense.id);
            }
        }

        by_mess.entry(expense.mess_id).or_default().push(expense.id);
        data.insert(expense.id, expense);
        Ok(())
    }

    /// Count stored expenses, soft-deleted included
    pub fn count(&self) -> Result<usize, MessMateError> {
        let data = read_lock(&self.data)?;
        Ok(data.len())
    }
}

fn sort_newest_first(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
}
