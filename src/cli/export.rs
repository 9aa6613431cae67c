//! CLI commands for data export
//!
//! Writes balance and settlement reports of a mess to a file or stdout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::error::{MessMateError, MessMateResult};
use crate::export::{export_balances, export_settlements, ExportFormat};
use crate::models::{MemberId, MessId};
use crate::storage::Storage;

use super::{require_actor, resolve_mess};

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export every member's balance (owner/admin)
    Balances {
        /// Mess name or ID
        mess: String,
        /// Export format: csv, json or yaml
        #[arg(short, long, default_value = "csv")]
        format: String,
        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export the suggested settlements (owner/admin)
    Settlements {
        /// Mess name or ID
        mess: String,
        /// Export format: csv, json or yaml
        #[arg(short, long, default_value = "csv")]
        format: String,
        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Which report an export command writes
#[derive(Debug, Clone, Copy)]
enum Report {
    Balances,
    Settlements,
}

impl Report {
    fn write<W: Write>(
        self,
        storage: &Storage,
        mess_id: MessId,
        requester: MemberId,
        format: ExportFormat,
        writer: &mut W,
    ) -> MessMateResult<()> {
        match self {
            Self::Balances => export_balances(storage, mess_id, requester, format, writer),
            Self::Settlements => export_settlements(storage, mess_id, requester, format, writer),
        }
    }
}

/// Handle export commands
pub fn handle_export_command(
    storage: &Storage,
    actor: Option<&str>,
    cmd: ExportCommands,
) -> MessMateResult<()> {
    let actor = require_actor(storage, actor)?;

    let (report, mess, format, output) = match cmd {
        ExportCommands::Balances {
            mess,
            format,
            output,
        } => (Report::Balances, mess, format, output),
        ExportCommands::Settlements {
            mess,
            format,
            output,
        } => (Report::Settlements, mess, format, output),
    };

    let mess = resolve_mess(storage, &mess)?;
    let format = ExportFormat::parse(&format)?;

    match output {
        Some(path) => {
            let mut writer = create_output(&path)?;
            report.write(storage, mess.id, actor.id, format, &mut writer)?;
            writer.flush()?;
            println!(
                "{:?} of '{}' exported as {} to: {}",
                report,
                mess.name,
                format,
                path.display()
            );
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            report.write(storage, mess.id, actor.id, format, &mut writer)?;
            writer.flush()?;
        }
    }

    Ok(())
}

fn create_output(path: &Path) -> MessMateResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        MessMateError::Export(format!(
            "Failed to create file {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MessMatePaths;
    use crate::services::{MemberService, MessService};
    use tempfile::TempDir;

    #[test]
    fn test_export_balances_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MessMatePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        let alice = MemberService::new(&storage).add("Alice").unwrap();
        MessService::new(&storage)
            .create("Flat", alice.id, 6)
            .unwrap();

        let output = temp_dir.path().join("balances.json");
        handle_export_command(
            &storage,
            Some("Alice"),
            ExportCommands::Balances {
                mess: "Flat".into(),
                format: "json".into(),
                output: Some(output.clone()),
            },
        )
        .unwrap();

        let contents = std::fs::read_to_string(output).unwrap();
        assert!(contents.contains("\"mess_name\": \"Flat\""));
        assert!(contents.contains("Alice"));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MessMatePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        let alice = MemberService::new(&storage).add("Alice").unwrap();
        MessService::new(&storage)
            .create("Flat", alice.id, 6)
            .unwrap();

        let err = handle_export_command(
            &storage,
            Some("Alice"),
            ExportCommands::Settlements {
                mess: "Flat".into(),
                format: "xml".into(),
                output: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, MessMateError::Export(_)));
    }
}
