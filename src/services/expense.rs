//! Expense service
//!
//! Logging, editing and soft-deleting expenses. Splits are always computed
//! here through the split calculator so a stored expense never disagrees with
//! its own policy.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::error::{MessMateError, MessMateResult};
use crate::models::{
    Expense, ExpenseCategory, ExpenseId, ExpenseSplit, MemberId, Mess, MessId, Money,
    SplitMethod,
};
use crate::storage::{ExpenseQuery, Storage};

use super::mess::{require_member, MessService};
use super::split::{calculate_splits, custom_split, equal_split, CustomShare};

/// How an expense should be divided
#[derive(Debug, Clone, Default)]
pub struct SplitRequest {
    pub method: SplitMethod,
    /// Members sharing the expense; empty means the whole roster
    pub participants: Vec<MemberId>,
    /// Percentages for a custom split
    pub custom: Vec<CustomShare>,
    /// Members left out of an equal or exclude split
    pub excluded: Vec<MemberId>,
}

impl SplitRequest {
    /// Equal split among the whole roster
    pub fn equal() -> Self {
        Self::default()
    }

    /// Custom percentages
    pub fn custom(shares: Vec<CustomShare>) -> Self {
        Self {
            method: SplitMethod::Custom,
            custom: shares,
            ..Self::default()
        }
    }

    /// Equal split among the roster minus `excluded`
    pub fn excluding(excluded: Vec<MemberId>) -> Self {
        Self {
            method: SplitMethod::Exclude,
            excluded,
            ..Self::default()
        }
    }

    /// Restrict the split to the given members
    pub fn among(mut self, participants: Vec<MemberId>) -> Self {
        self.participants = participants;
        self
    }
}

/// Input for logging a new expense
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    pub mess_id: MessId,
    /// Member logging the expense
    pub requester: MemberId,
    pub paid_by: MemberId,
    pub amount: Money,
    pub description: String,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
    pub split: SplitRequest,
}

/// Changes to an existing expense; `None` leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    pub amount: Option<Money>,
    pub description: Option<String>,
    pub category: Option<ExpenseCategory>,
    pub date: Option<NaiveDate>,
    pub paid_by: Option<MemberId>,
    pub split: Option<SplitRequest>,
}

/// Filters for listing expenses
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub paid_by: Option<MemberId>,
    pub split_member: Option<MemberId>,
    pub limit: Option<usize>,
}

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

impl<'a> ExpenseService<'a> {
    /// Create a new expense service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Log a new expense
    pub fn create(&self, input: CreateExpenseInput) -> MessMateResult<Expense> {
        let mess = MessService::new(self.storage).require(input.mess_id)?;
        require_member(&mess, input.requester)?;
        require_on_roster(&mess, input.paid_by, "Payer")?;

        let splits = resolve_splits(&mess, input.amount, &input.split)?;

        let mut expense = Expense::new(
            mess.id,
            input.amount,
            input.description.trim(),
            input.date,
            input.paid_by,
        );
        expense.category = input.category;
        expense.created_by = input.requester;
        expense.set_splits(input.split.method, splits);

        expense
            .validate()
            .map_err(|e| MessMateError::Validation(e.to_string()))?;

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        info!(
            mess = %mess.id,
            expense = %expense.id,
            amount = %expense.amount,
            method = %expense.split_method,
            "expense created"
        );
        Ok(expense)
    }

    /// Get a live expense of a mess
    pub fn get(
        &self,
        mess_id: MessId,
        requester: MemberId,
        id: ExpenseId,
    ) -> MessMateResult<Expense> {
        let mess = MessService::new(self.storage).require(mess_id)?;
        require_member(&mess, requester)?;
        self.live_expense(mess_id, id)
    }

    /// Find a live expense by full ID or display prefix
    pub fn find(
        &self,
        mess_id: MessId,
        requester: MemberId,
        identifier: &str,
    ) -> MessMateResult<Option<Expense>> {
        if let Ok(id) = identifier.parse::<ExpenseId>() {
            return match self.get(mess_id, requester, id) {
                Ok(expense) => Ok(Some(expense)),
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(e),
            };
        }

        let needle = identifier.trim().to_lowercase();
        let prefix = needle.strip_prefix("exp-").unwrap_or(&needle).to_string();
        if prefix.is_empty() {
            return Ok(None);
        }

        Ok(self
            .list(mess_id, requester, &ExpenseFilter::default())?
            .into_iter()
            .find(|e| e.id.as_uuid().to_string().starts_with(&prefix)))
    }

    /// List live expenses of a mess, newest first
    pub fn list(
        &self,
        mess_id: MessId,
        requester: MemberId,
        filter: &ExpenseFilter,
    ) -> MessMateResult<Vec<Expense>> {
        let mess = MessService::new(self.storage).require(mess_id)?;
        require_member(&mess, requester)?;

        let mut query = ExpenseQuery::for_mess(mess_id);
        query.paid_by = filter.paid_by;
        query.split_member = filter.split_member;

        let mut expenses = self.storage.expenses.query(&query)?;
        if let Some(limit) = filter.limit {
            expenses.truncate(limit);
        }

        debug!(mess = %mess_id, count = expenses.len(), "listed expenses");
        Ok(expenses)
    }

    /// Edit an expense; only its creator or an owner/admin may
    ///
    /// Changing the amount without a new split request re-runs the stored
    /// policy over the same members.
    pub fn update(
        &self,
        mess_id: MessId,
        requester: MemberId,
        id: ExpenseId,
        input: UpdateExpenseInput,
    ) -> MessMateResult<Expense> {
        let mess = MessService::new(self.storage).require(mess_id)?;
        let mut expense = self.live_expense(mess_id, id)?;
        require_can_modify(&mess, requester, expense.created_by)?;

        if let Some(paid_by) = input.paid_by {
            require_on_roster(&mess, paid_by, "Payer")?;
            expense.paid_by = paid_by;
        }
        if let Some(description) = input.description {
            expense.description = description.trim().to_string();
        }
        if let Some(category) = input.category {
            expense.category = category;
        }
        if let Some(date) = input.date {
            expense.date = date;
        }

        let amount_changed = input.amount.is_some_and(|a| a != expense.amount);
        if let Some(amount) = input.amount {
            expense.amount = amount;
        }

        match input.split {
            Some(request) => {
                let splits = resolve_splits(&mess, expense.amount, &request)?;
                expense.set_splits(request.method, splits);
            }
            None if amount_changed => {
                let splits = rescale_splits(&expense)?;
                expense.set_splits(expense.split_method, splits);
            }
            None => expense.updated_at = Utc::now(),
        }

        expense
            .validate()
            .map_err(|e| MessMateError::Validation(e.to_string()))?;

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        info!(mess = %mess_id, expense = %expense.id, "expense updated");
        Ok(expense)
    }

    /// Soft-delete an expense; only its creator or an owner/admin may
    pub fn delete(
        &self,
        mess_id: MessId,
        requester: MemberId,
        id: ExpenseId,
    ) -> MessMateResult<Expense> {
        let mess = MessService::new(self.storage).require(mess_id)?;
        let mut expense = self.live_expense(mess_id, id)?;
        require_can_modify(&mess, requester, expense.created_by)?;

        expense.mark_deleted();
        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        info!(mess = %mess_id, expense = %expense.id, "expense deleted");
        Ok(expense)
    }

    fn live_expense(&self, mess_id: MessId, id: ExpenseId) -> MessMateResult<Expense> {
        self.storage
            .expenses
            .get(id)?
            .filter(|e| e.mess_id == mess_id && !e.is_deleted())
            .ok_or_else(|| MessMateError::expense_not_found(id.to_string()))
    }
}

fn require_on_roster(mess: &Mess, member_id: MemberId, what: &str) -> MessMateResult<()> {
    if mess.is_member(member_id) {
        Ok(())
    } else {
        Err(MessMateError::Validation(format!(
            "{} {} is not a member of '{}'",
            what, member_id, mess.name
        )))
    }
}

fn require_can_modify(mess: &Mess, requester: MemberId, creator: MemberId) -> MessMateResult<()> {
    let role = require_member(mess, requester)?;
    if requester == creator || role.is_elevated() {
        Ok(())
    } else {
        Err(MessMateError::Forbidden(
            "Only the member who logged this expense or an owner/admin can change it".into(),
        ))
    }
}

fn resolve_splits(
    mess: &Mess,
    amount: Money,
    request: &SplitRequest,
) -> MessMateResult<Vec<ExpenseSplit>> {
    let participants = if request.participants.is_empty() {
        mess.member_ids()
    } else {
        for id in &request.participants {
            require_on_roster(mess, *id, "Participant")?;
        }
        request.participants.clone()
    };

    let custom = (!request.custom.is_empty()).then_some(request.custom.as_slice());
    let excluded = (!request.excluded.is_empty()).then_some(request.excluded.as_slice());

    calculate_splits(request.method, amount, &participants, custom, excluded)
}

/// Re-apply an expense's stored policy to its new amount
fn rescale_splits(expense: &Expense) -> MessMateResult<Vec<ExpenseSplit>> {
    match expense.split_method {
        SplitMethod::Custom => {
            let shares: Vec<CustomShare> = expense
                .splits
                .iter()
                .map(|s| CustomShare::new(s.member_id, s.percentage))
                .collect();
            custom_split(expense.amount, &shares)
        }
        // exclusions are already reflected in who holds a split
        SplitMethod::Equal | SplitMethod::Exclude => {
            let members: Vec<MemberId> = expense.splits.iter().map(|s| s.member_id).collect();
            equal_split(expense.amount, &members, &[])
        }
    }
}
