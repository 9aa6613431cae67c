//! YAML export
//!
//! Same reports as the JSON export, with a short comment header.

use serde::Serialize;
use std::io::Write;

use crate::error::{MessMateError, MessMateResult};

use super::json::ExportHeader;

/// Write a report as YAML
pub fn write_yaml<T: Serialize, W: Write>(
    header: &ExportHeader,
    report: &T,
    writer: &mut W,
) -> MessMateResult<()> {
    let io_err = |e: std::io::Error| MessMateError::Export(e.to_string());

    writeln!(writer, "# MessMate export for {}", header.mess_name).map_err(io_err)?;
    writeln!(writer, "# Generated: {}", header.exported_at).map_err(io_err)?;
    writeln!(writer, "# App Version: {}", header.app_version).map_err(io_err)?;
    writeln!(writer).map_err(io_err)?;

    serde_yaml::to_writer(writer, report).map_err(|e| MessMateError::Export(e.to_string()))
}
