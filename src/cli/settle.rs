//! Settlement CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::format_settlements;
use crate::error::{MessMateError, MessMateResult};
use crate::models::{NetBalance, SettlementTransaction};
use crate::services::{check_simplification, BalanceService};
use crate::storage::Storage;

use super::{require_actor, resolve_mess};

/// Settlement subcommands
#[derive(Subcommand)]
pub enum SettleCommands {
    /// Suggest transfers that settle everyone up (owner/admin)
    Suggest {
        /// Mess name or ID
        mess: String,
        /// Re-check the plan against the current balances
        #[arg(long)]
        verify: bool,
    },
}

/// Handle a settlement command
pub fn handle_settle_command(
    storage: &Storage,
    settings: &Settings,
    actor: Option<&str>,
    cmd: SettleCommands,
) -> MessMateResult<()> {
    let actor = require_actor(storage, actor)?;
    let service = BalanceService::new(storage);

    match cmd {
        SettleCommands::Suggest { mess, verify } => {
            let mess = resolve_mess(storage, &mess)?;
            let suggestions = service.settlement_suggestions(mess.id, actor.id)?;

            println!("Settlement plan for '{}'", mess.name);
            println!();
            print!(
                "{}",
                format_settlements(&suggestions, &settings.currency_symbol)
            );

            if verify {
                let balances: Vec<NetBalance> = service
                    .get_all_balances(mess.id, actor.id)?
                    .iter()
                    .map(|b| b.net())
                    .collect();
                let transactions: Vec<SettlementTransaction> = suggestions
                    .iter()
                    .map(|s| SettlementTransaction {
                        from: s.from,
                        to: s.to,
                        amount: s.amount,
                    })
                    .collect();

                check_simplification(&balances, &transactions).map_err(|v| {
                    MessMateError::Validation(format!("Settlement plan does not balance: {}", v))
                })?;
                println!();
                println!("Verified: the plan clears every balance.");
            }
        }
    }

    Ok(())
}
