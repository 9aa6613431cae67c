//! Reading and saving the MessMate data files
//!
//! Each ledger collection lives in one JSON document under the data
//! directory: `members.json`, `messes.json`, `expenses.json` and
//! `fund_records.json`. A missing file is an empty collection, which is the
//! state of a fresh install before the first `messmate init`.
//!
//! Saves write `<name>.json.tmp` next to the data file, sync it and rename it
//! over the original, so a crash mid-save leaves either the old ledger or the
//! new one on disk.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::MessMateError;

/// Load a ledger collection, or its empty default when the file is absent
pub fn read_json<T, P>(path: P) -> Result<T, MessMateError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path).map_err(|e| {
        MessMateError::Storage(format!("Cannot open data file {}: {}", path.display(), e))
    })?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| {
        MessMateError::Storage(format!(
            "Data file {} is not a valid MessMate ledger ({}); restore it or move it aside",
            path.display(),
            e
        ))
    })
}

/// Save a ledger collection through a temp file and rename
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), MessMateError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let save_error = |step: &str, e: &dyn std::fmt::Display| {
        MessMateError::Storage(format!(
            "Cannot save data file {}: {} failed ({})",
            path.display(),
            step,
            e
        ))
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            MessMateError::Storage(format!(
                "Cannot create data directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| save_error("creating the temp file", &e))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data).map_err(|e| save_error("serializing", &e))?;
    writer.flush().map_err(|e| save_error("flushing", &e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| save_error("syncing", &e))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        save_error("replacing the previous version", &e)
    })?;

    Ok(())
}
