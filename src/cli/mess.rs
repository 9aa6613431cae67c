//! Mess CLI commands
//!
//! Creating messes and managing their rosters. Every command except `list`
//! acts on behalf of the member given with `--as`.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_mess_details, format_mess_list};
use crate::error::{MessMateError, MessMateResult};
use crate::models::MessRole;
use crate::services::{require_elevated, require_member, MessService};
use crate::storage::Storage;

use super::{member_names, require_actor, resolve_member, resolve_mess};

/// Mess subcommands
#[derive(Subcommand)]
pub enum MessCommands {
    /// Create a new mess owned by the acting member
    Create {
        /// Mess name
        name: String,
        /// Maximum number of members (6-20)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List messes
    List {
        /// Show every mess, not only those the acting member belongs to
        #[arg(short, long)]
        all: bool,
    },
    /// Show a mess and its roster
    Show {
        /// Mess name or ID
        mess: String,
    },
    /// Join a mess, or add another member as an owner/admin
    Join {
        /// Mess name or ID
        mess: String,
        /// Member to add (defaults to the acting member)
        #[arg(short, long)]
        member: Option<String>,
    },
    /// Change a member's role (owner only)
    Role {
        /// Mess name or ID
        mess: String,
        /// Member name or ID
        member: String,
        /// New role: admin or member
        role: String,
    },
    /// Leave a mess
    Leave {
        /// Mess name or ID
        mess: String,
    },
}

/// Handle a mess command
pub fn handle_mess_command(
    storage: &Storage,
    settings: &Settings,
    actor: Option<&str>,
    cmd: MessCommands,
) -> MessMateResult<()> {
    let service = MessService::new(storage);

    match cmd {
        MessCommands::Create { name, limit } => {
            let owner = require_actor(storage, actor)?;
            let limit = limit.unwrap_or_else(|| settings.member_limit());
            let mess = service.create(&name, owner.id, limit)?;

            println!("Created mess: {}", mess.name);
            println!("  ID:     {}", mess.id);
            println!("  Owner:  {}", owner.name);
            println!("  Limit:  {} members", mess.member_limit);
        }

        MessCommands::List { all } => {
            let member = match (all, actor) {
                (false, Some(actor)) => Some(resolve_member(storage, actor)?.id),
                _ => None,
            };
            print!("{}", format_mess_list(&service.list(member)?));
        }

        MessCommands::Show { mess } => {
            let actor = require_actor(storage, actor)?;
            let mess = resolve_mess(storage, &mess)?;
            require_member(&mess, actor.id)?;

            print!("{}", format_mess_details(&mess, &member_names(storage)?));
        }

        MessCommands::Join { mess, member } => {
            let actor = require_actor(storage, actor)?;
            let mess = resolve_mess(storage, &mess)?;
            let member = match member {
                Some(m) => resolve_member(storage, &m)?,
                None => actor.clone(),
            };

            if member.id != actor.id {
                require_elevated(&mess, actor.id)?;
            }

            let mess = service.join(mess.id, member.id)?;
            println!(
                "{} joined '{}' ({}/{} members)",
                member.name,
                mess.name,
                mess.members.len(),
                mess.member_limit
            );
        }

        MessCommands::Role { mess, member, role } => {
            let actor = require_actor(storage, actor)?;
            let mess = resolve_mess(storage, &mess)?;
            let member = resolve_member(storage, &member)?;
            let role = MessRole::parse(&role).ok_or_else(|| {
                MessMateError::Validation(format!(
                    "Invalid role: '{}'. Use admin or member",
                    role
                ))
            })?;

            let mess = service.set_role(mess.id, actor.id, member.id, role)?;
            println!("{} is now {} of '{}'", member.name, role, mess.name);
        }

        MessCommands::Leave { mess } => {
            let actor = require_actor(storage, actor)?;
            let mess = resolve_mess(storage, &mess)?;

            let mess = service.leave(mess.id, actor.id)?;
            println!("{} left '{}'", actor.name, mess.name);
        }
    }

    Ok(())
}
