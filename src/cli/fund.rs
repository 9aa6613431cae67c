//! Fund CLI commands
//!
//! Contributions into and refunds out of a mess's pooled fund.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::format_fund_records;
use crate::error::{MessMateError, MessMateResult};
use crate::models::FundRecordKind;
use crate::services::{FundFilter, FundRecordInput, FundService};
use crate::storage::Storage;

use super::{
    member_names, parse_amount, parse_date_or_today, require_actor, resolve_member, resolve_mess,
};

/// Fund subcommands
#[derive(Subcommand)]
pub enum FundCommands {
    /// Record money paid into the fund
    Contribute {
        /// Mess name or ID
        mess: String,
        /// Amount (e.g. 50.00)
        amount: String,
        /// Contributing member (defaults to the acting member)
        #[arg(short, long)]
        member: Option<String>,
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Note
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Record money paid back out of the fund (owner/admin)
    Refund {
        /// Mess name or ID
        mess: String,
        /// Member receiving the refund
        member: String,
        /// Amount (e.g. 10.00)
        amount: String,
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Note
        #[arg(short, long)]
        note: Option<String>,
    },
    /// List fund records
    List {
        /// Mess name or ID
        mess: String,
        /// Only records of this member
        #[arg(short, long)]
        member: Option<String>,
        /// Only this kind: contribution or refund
        #[arg(short, long)]
        kind: Option<String>,
    },
    /// Delete a fund record
    Delete {
        /// Mess name or ID
        mess: String,
        /// Record ID
        record: String,
    },
}

/// Handle a fund command
pub fn handle_fund_command(
    storage: &Storage,
    settings: &Settings,
    actor: Option<&str>,
    cmd: FundCommands,
) -> MessMateResult<()> {
    let actor = require_actor(storage, actor)?;
    let service = FundService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        FundCommands::Contribute {
            mess,
            amount,
            member,
            date,
            note,
        } => {
            let mess = resolve_mess(storage, &mess)?;
            let member = match member {
                Some(m) => resolve_member(storage, &m)?,
                None => actor.clone(),
            };

            let record = service.contribute(FundRecordInput {
                mess_id: mess.id,
                requester: actor.id,
                member_id: member.id,
                amount: parse_amount(&amount)?,
                date: parse_date_or_today(date.as_deref())?,
                note,
            })?;

            println!(
                "{} contributed {} to '{}'",
                member.name,
                record.amount.format_with_symbol(symbol),
                mess.name
            );
            println!("  ID: {}", record.id);
        }

        FundCommands::Refund {
            mess,
            member,
            amount,
            date,
            note,
        } => {
            let mess = resolve_mess(storage, &mess)?;
            let member = resolve_member(storage, &member)?;

            let record = service.refund(FundRecordInput {
                mess_id: mess.id,
                requester: actor.id,
                member_id: member.id,
                amount: parse_amount(&amount)?,
                date: parse_date_or_today(date.as_deref())?,
                note,
            })?;

            println!(
                "Refunded {} to {} from '{}'",
                record.amount.format_with_symbol(symbol),
                member.name,
                mess.name
            );
            println!("  ID: {}", record.id);
        }

        FundCommands::List { mess, member, kind } => {
            let mess = resolve_mess(storage, &mess)?;
            let filter = FundFilter {
                member_id: member
                    .map(|m| resolve_member(storage, &m).map(|m| m.id))
                    .transpose()?,
                kind: kind
                    .map(|k| {
                        FundRecordKind::parse(&k).ok_or_else(|| {
                            MessMateError::Validation(format!(
                                "Invalid record kind: '{}'. Use contribution or refund",
                                k
                            ))
                        })
                    })
                    .transpose()?,
            };

            let records = service.list(mess.id, actor.id, &filter)?;
            print!(
                "{}",
                format_fund_records(&records, &member_names(storage)?, symbol)
            );
        }

        FundCommands::Delete { mess, record } => {
            let mess = resolve_mess(storage, &mess)?;
            let existing = service
                .find(mess.id, actor.id, &record)?
                .ok_or_else(|| MessMateError::fund_record_not_found(&record))?;

            let deleted = service.delete(mess.id, actor.id, existing.id)?;
            println!("Deleted fund record: {} ({})", deleted, deleted.id);
        }
    }

    Ok(())
}
