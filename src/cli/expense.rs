//! Expense CLI commands
//!
//! Implements CLI commands for logging, listing, editing and deleting
//! shared expenses.

use clap::{Args, Subcommand};

use crate::config::settings::Settings;
use crate::display::{format_expense_details, format_expense_list};
use crate::error::{MessMateError, MessMateResult};
use crate::models::{Expense, ExpenseCategory, MemberId, Mess, SplitMethod};
use crate::services::{
    split_method_from_tag, CreateExpenseInput, CustomShare, ExpenseFilter, ExpenseService,
    SplitRequest, UpdateExpenseInput,
};
use crate::storage::Storage;

use super::{
    member_names, parse_amount, parse_date_or_today, require_actor, resolve_member,
    resolve_members, resolve_mess,
};

/// Split policy arguments shared by `add` and `edit`
#[derive(Args, Debug, Default)]
pub struct SplitArgs {
    /// Split method: equal, custom or exclude
    #[arg(short, long)]
    split: Option<String>,
    /// Custom share as NAME=PERCENT (repeatable)
    #[arg(long = "share", value_name = "NAME=PERCENT")]
    shares: Vec<String>,
    /// Member left out of the split (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "MEMBER")]
    excluded: Vec<String>,
    /// Only split among these members (repeatable)
    #[arg(long = "among", value_name = "MEMBER")]
    participants: Vec<String>,
}

impl SplitArgs {
    fn is_empty(&self) -> bool {
        self.split.is_none()
            && self.shares.is_empty()
            && self.excluded.is_empty()
            && self.participants.is_empty()
    }

    /// Build a split request, inferring the method from the flags given
    fn to_request(&self, storage: &Storage, default: SplitMethod) -> MessMateResult<SplitRequest> {
        let method = match &self.split {
            Some(tag) => split_method_from_tag(tag)?,
            None if !self.shares.is_empty() => SplitMethod::Custom,
            None if !self.excluded.is_empty() => SplitMethod::Exclude,
            None => default,
        };

        let mut request = match method {
            SplitMethod::Equal => SplitRequest::equal(),
            SplitMethod::Custom => SplitRequest::custom(
                self.shares
                    .iter()
                    .map(|s| parse_share(storage, s))
                    .collect::<MessMateResult<_>>()?,
            ),
            SplitMethod::Exclude => SplitRequest::excluding(Vec::new()),
        };
        request.excluded = resolve_members(storage, &self.excluded)?;

        Ok(request.among(resolve_members(storage, &self.participants)?))
    }
}

/// Parse a NAME=PERCENT share
fn parse_share(storage: &Storage, share: &str) -> MessMateResult<CustomShare> {
    let (name, pct) = share.rsplit_once('=').ok_or_else(|| {
        MessMateError::InvalidSplit(format!("Expected NAME=PERCENT, got '{}'", share))
    })?;
    let percentage: f64 = pct.trim().trim_end_matches('%').parse().map_err(|_| {
        MessMateError::InvalidSplit(format!("Invalid percentage in '{}'", share))
    })?;

    let member = resolve_member(storage, name.trim())?;
    Ok(CustomShare::new(member.id, percentage))
}

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Log a new expense
    Add {
        /// Mess name or ID
        mess: String,
        /// Amount (e.g. 45.20)
        amount: String,
        /// What the money was spent on
        description: String,
        /// Member who paid (defaults to the acting member)
        #[arg(short, long)]
        paid_by: Option<String>,
        /// Category (groceries, utilities, rent, internet, household, gas, other or custom)
        #[arg(short, long)]
        category: Option<String>,
        /// Expense date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        #[command(flatten)]
        split: SplitArgs,
    },
    /// List expenses of a mess
    List {
        /// Mess name or ID
        mess: String,
        /// Only expenses paid by this member
        #[arg(short, long)]
        paid_by: Option<String>,
        /// Only expenses shared by this member
        #[arg(short, long)]
        member: Option<String>,
        /// Number of expenses to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show an expense and its splits
    Show {
        /// Mess name or ID
        mess: String,
        /// Expense ID
        expense: String,
    },
    /// Edit an expense
    Edit {
        /// Mess name or ID
        mess: String,
        /// Expense ID
        expense: String,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// New payer
        #[arg(short, long)]
        paid_by: Option<String>,
        #[command(flatten)]
        split: SplitArgs,
    },
    /// Delete an expense
    Delete {
        /// Mess name or ID
        mess: String,
        /// Expense ID
        expense: String,
    },
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    actor: Option<&str>,
    cmd: ExpenseCommands,
) -> MessMateResult<()> {
    let actor = require_actor(storage, actor)?;
    let service = ExpenseService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        ExpenseCommands::Add {
            mess,
            amount,
            description,
            paid_by,
            category,
            date,
            split,
        } => {
            let mess = resolve_mess(storage, &mess)?;
            let paid_by = match paid_by {
                Some(p) => resolve_member(storage, &p)?.id,
                None => actor.id,
            };

            let expense = service.create(CreateExpenseInput {
                mess_id: mess.id,
                requester: actor.id,
                paid_by,
                amount: parse_amount(&amount)?,
                description,
                category: category
                    .as_deref()
                    .map(ExpenseCategory::from)
                    .unwrap_or_default(),
                date: parse_date_or_today(date.as_deref())?,
                split: split.to_request(storage, settings.default_split_method)?,
            })?;

            println!(
                "Logged {} in '{}': {}",
                expense.amount.format_with_symbol(symbol),
                mess.name,
                expense.description
            );
            println!("  ID:    {}", expense.id);
            println!("  Split: {} among {}", expense.split_method, expense.splits.len());
        }

        ExpenseCommands::List {
            mess,
            paid_by,
            member,
            limit,
        } => {
            let mess = resolve_mess(storage, &mess)?;
            let filter = ExpenseFilter {
                paid_by: paid_by
                    .map(|p| resolve_member(storage, &p).map(|m| m.id))
                    .transpose()?,
                split_member: member
                    .map(|m| resolve_member(storage, &m).map(|m| m.id))
                    .transpose()?,
                limit: Some(limit),
            };

            let expenses = service.list(mess.id, actor.id, &filter)?;
            print!(
                "{}",
                format_expense_list(&expenses, &member_names(storage)?, symbol)
            );
        }

        ExpenseCommands::Show { mess, expense } => {
            let mess = resolve_mess(storage, &mess)?;
            let expense = find_expense(&service, &mess, actor.id, &expense)?;
            print!(
                "{}",
                format_expense_details(&expense, &member_names(storage)?, symbol)
            );
        }

        ExpenseCommands::Edit {
            mess,
            expense,
            amount,
            description,
            category,
            date,
            paid_by,
            split,
        } => {
            let mess = resolve_mess(storage, &mess)?;
            let existing = find_expense(&service, &mess, actor.id, &expense)?;

            let input = UpdateExpenseInput {
                amount: amount.as_deref().map(parse_amount).transpose()?,
                description,
                category: category.as_deref().map(ExpenseCategory::from),
                date: date
                    .as_deref()
                    .map(|d| parse_date_or_today(Some(d)))
                    .transpose()?,
                paid_by: paid_by
                    .map(|p| resolve_member(storage, &p).map(|m| m.id))
                    .transpose()?,
                split: if split.is_empty() {
                    None
                } else {
                    Some(split.to_request(storage, existing.split_method)?)
                },
            };

            let updated = service.update(mess.id, actor.id, existing.id, input)?;
            println!("Updated expense: {}", updated.id);
            print!(
                "{}",
                format_expense_details(&updated, &member_names(storage)?, symbol)
            );
        }

        ExpenseCommands::Delete { mess, expense } => {
            let mess = resolve_mess(storage, &mess)?;
            let existing = find_expense(&service, &mess, actor.id, &expense)?;

            let deleted = service.delete(mess.id, actor.id, existing.id)?;
            println!("Deleted expense: {} ({})", deleted.description, deleted.id);
        }
    }

    Ok(())
}

fn find_expense(
    service: &ExpenseService<'_>,
    mess: &Mess,
    requester: MemberId,
    identifier: &str,
) -> MessMateResult<Expense> {
    service
        .find(mess.id, requester, identifier)?
        .ok_or_else(|| MessMateError::expense_not_found(identifier))
}
