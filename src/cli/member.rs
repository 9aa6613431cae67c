//! Member CLI commands

use clap::Subcommand;

use crate::display::format_member_list;
use crate::error::MessMateResult;
use crate::services::MemberService;
use crate::storage::Storage;

/// Member subcommands
#[derive(Subcommand)]
pub enum MemberCommands {
    /// Register a new member
    Add {
        /// Member name
        name: String,
    },
    /// List all registered members
    List,
}

/// Handle a member command
pub fn handle_member_command(storage: &Storage, cmd: MemberCommands) -> MessMateResult<()> {
    let service = MemberService::new(storage);

    match cmd {
        MemberCommands::Add { name } => {
            let member = service.add(&name)?;
            println!("Added member: {}", member.name);
            println!("  ID: {}", member.id);
        }
        MemberCommands::List => {
            print!("{}", format_member_list(&service.list()?));
        }
    }

    Ok(())
}
