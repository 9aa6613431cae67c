//! Balance CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_balance_details, format_balance_table, format_fund_balance};
use crate::error::MessMateResult;
use crate::services::{require_elevated, require_member, BalanceService};
use crate::storage::Storage;

use super::{require_actor, resolve_member, resolve_mess};

/// Balance subcommands
#[derive(Subcommand)]
pub enum BalanceCommands {
    /// Show one member's balance breakdown
    Show {
        /// Mess name or ID
        mess: String,
        /// Member to inspect (defaults to the acting member; others need owner/admin)
        #[arg(short, long)]
        member: Option<String>,
    },
    /// Show every member's balance (owner/admin)
    All {
        /// Mess name or ID
        mess: String,
    },
    /// Show the pooled fund of a mess
    Fund {
        /// Mess name or ID
        mess: String,
    },
}

/// Handle a balance command
pub fn handle_balance_command(
    storage: &Storage,
    settings: &Settings,
    actor: Option<&str>,
    cmd: BalanceCommands,
) -> MessMateResult<()> {
    let actor = require_actor(storage, actor)?;
    let service = BalanceService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        BalanceCommands::Show { mess, member } => {
            let mess = resolve_mess(storage, &mess)?;
            require_member(&mess, actor.id)?;

            let member = match member {
                Some(m) => resolve_member(storage, &m)?,
                None => actor.clone(),
            };
            if member.id != actor.id {
                require_elevated(&mess, actor.id)?;
            }

            let breakdown = service.calculate_member_balance(mess.id, member.id)?;
            print!("{}", format_balance_details(&breakdown, symbol));
        }

        BalanceCommands::All { mess } => {
            let mess = resolve_mess(storage, &mess)?;
            let balances = service.get_all_balances(mess.id, actor.id)?;

            println!("Balances for '{}'", mess.name);
            println!();
            print!("{}", format_balance_table(&balances, symbol));
        }

        BalanceCommands::Fund { mess } => {
            let mess = resolve_mess(storage, &mess)?;
            require_member(&mess, actor.id)?;

            let fund = service.get_mess_fund_balance(mess.id)?;
            print!("{}", format_fund_balance(&mess.name, &fund, symbol));
        }
    }

    Ok(())
}
