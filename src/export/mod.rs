//! Export module for MessMate
//!
//! Balance and settlement reports of one mess, in three formats:
//! - CSV: one row per member or transfer (spreadsheet-compatible)
//! - JSON: machine-readable, with a versioned header
//! - YAML: human-readable, same structure as JSON

pub mod csv;
pub mod json;
pub mod yaml;

use std::fmt;
use std::io::Write;

use crate::error::{MessMateError, MessMateResult};
use crate::models::{MemberId, MessId};
use crate::storage::Storage;

pub use self::csv::{write_balances_csv, write_settlements_csv};
pub use json::{write_json, BalanceExport, ExportHeader, SettlementExport, EXPORT_SCHEMA_VERSION};
pub use yaml::write_yaml;

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Yaml,
}

impl ExportFormat {
    /// Parse a format name
    pub fn parse(s: &str) -> MessMateResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(MessMateError::Export(format!(
                "Unknown format '{}'. Valid formats: csv, json, yaml",
                other
            ))),
        }
    }

    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Export every member's balance in a mess
pub fn export_balances<W: Write>(
    storage: &Storage,
    mess_id: MessId,
    requester: MemberId,
    format: ExportFormat,
    writer: &mut W,
) -> MessMateResult<()> {
    let report = BalanceExport::build(storage, mess_id, requester)?;
    match format {
        ExportFormat::Csv => write_balances_csv(&report.balances, writer),
        ExportFormat::Json => write_json(&report, writer),
        ExportFormat::Yaml => write_yaml(&report.header, &report, writer),
    }
}

/// Export the suggested settlements of a mess
pub fn export_settlements<W: Write>(
    storage: &Storage,
    mess_id: MessId,
    requester: MemberId,
    format: ExportFormat,
    writer: &mut W,
) -> MessMateResult<()> {
    let report = SettlementExport::build(storage, mess_id, requester)?;
    match format {
        ExportFormat::Csv => write_settlements_csv(&report.settlements, writer),
        ExportFormat::Json => write_json(&report, writer),
        ExportFormat::Yaml => write_yaml(&report.header, &report, writer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MessMatePaths;
    use crate::services::{MemberService, MessService};
    use tempfile::TempDir;

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::parse("JSON").unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::parse("yml").unwrap(), ExportFormat::Yaml);
        assert!(ExportFormat::parse("xml").is_err());
    }

    #[test]
    fn test_export_requires_elevated_role() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MessMatePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        let members = MemberService::new(&storage);
        let owner = members.add("Alice").unwrap().id;
        let bob = members.add("Bob").unwrap().id;
        let messes = MessService::new(&storage);
        let mess = messes.create("Flat", owner, 6).unwrap().id;
        messes.join(mess, bob).unwrap();

        let mut out = Vec::new();
        let err = export_settlements(&storage, mess, bob, ExportFormat::Csv, &mut out).unwrap_err();
        assert!(err.is_access_denied());

        export_balances(&storage, mess, owner, ExportFormat::Csv, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
