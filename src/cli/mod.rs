//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod balance;
pub mod expense;
pub mod export;
pub mod fund;
pub mod member;
pub mod mess;
pub mod settle;

pub use balance::{handle_balance_command, BalanceCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportCommands};
pub use fund::{handle_fund_command, FundCommands};
pub use member::{handle_member_command, MemberCommands};
pub use mess::{handle_mess_command, MessCommands};
pub use settle::{handle_settle_command, SettleCommands};

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::{MessMateError, MessMateResult};
use crate::models::{Member, MemberId, Mess, Money};
use crate::services::{MemberService, MessService};
use crate::storage::Storage;

/// Resolve the member running the command from `--as` / `MESSMATE_MEMBER`
pub(crate) fn require_actor(storage: &Storage, actor: Option<&str>) -> MessMateResult<Member> {
    let actor = actor.ok_or_else(|| {
        MessMateError::Validation(
            "This command acts on behalf of a member; pass --as <name> or set MESSMATE_MEMBER"
                .into(),
        )
    })?;
    resolve_member(storage, actor)
}

/// Resolve a member by name or ID
pub(crate) fn resolve_member(storage: &Storage, identifier: &str) -> MessMateResult<Member> {
    MemberService::new(storage).require(identifier)
}

/// Resolve several members by name or ID
pub(crate) fn resolve_members(
    storage: &Storage,
    identifiers: &[String],
) -> MessMateResult<Vec<MemberId>> {
    identifiers
        .iter()
        .map(|i| resolve_member(storage, i).map(|m| m.id))
        .collect()
}

/// Resolve a mess by name or ID
pub(crate) fn resolve_mess(storage: &Storage, identifier: &str) -> MessMateResult<Mess> {
    MessService::new(storage)
        .find(identifier)?
        .ok_or_else(|| MessMateError::mess_not_found(identifier))
}

/// Parse a user-entered amount such as "12.50"
pub(crate) fn parse_amount(amount: &str) -> MessMateResult<Money> {
    Money::parse(amount).map_err(|e| MessMateError::Validation(e.to_string()))
}

/// Parse a YYYY-MM-DD date, defaulting to today
pub(crate) fn parse_date_or_today(date_str: Option<&str>) -> MessMateResult<NaiveDate> {
    if let Some(date_str) = date_str {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| {
            MessMateError::Validation(format!(
                "Invalid date format: '{}'. Use YYYY-MM-DD",
                date_str
            ))
        })
    } else {
        Ok(chrono::Local::now().date_naive())
    }
}

/// Display names of every registered member
pub(crate) fn member_names(storage: &Storage) -> MessMateResult<HashMap<MemberId, String>> {
    Ok(MemberService::new(storage)
        .list()?
        .into_iter()
        .map(|m| (m.id, m.name))
        .collect())
}
