//! Path management for MessMate
//!
//! ## Path Resolution Order
//!
//! 1. `MESSMATE_DATA_DIR` environment variable (if set)
//! 2. The platform config directory reported by `directories`
//!    (e.g. `~/.config/messmate` on Linux)
//! 3. `$HOME/.config/messmate` when no platform directory can be found

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::MessMateError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "MESSMATE_DATA_DIR";

/// Manages all paths used by MessMate
#[derive(Debug, Clone)]
pub struct MessMatePaths {
    /// Base directory for all MessMate data
    base_dir: PathBuf,
}

impl MessMatePaths {
    /// Create a new MessMatePaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no base directory can be determined.
    pub fn new() -> Result<Self, MessMateError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create MessMatePaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the default export directory
    pub fn export_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to members.json
    pub fn members_file(&self) -> PathBuf {
        self.data_dir().join("members.json")
    }

    /// Get the path to messes.json
    pub fn messes_file(&self) -> PathBuf {
        self.data_dir().join("messes.json")
    }

    /// Get the path to expenses.json
    pub fn expenses_file(&self) -> PathBuf {
        self.data_dir().join("expenses.json")
    }

    /// Get the path to fund_records.json
    pub fn fund_records_file(&self) -> PathBuf {
        self.data_dir().join("fund_records.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), MessMateError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| MessMateError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| MessMateError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if MessMate has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, MessMateError> {
    if let Some(dirs) = ProjectDirs::from("", "", "messmate") {
        return Ok(dirs.config_dir().to_path_buf());
    }

    let home = std::env::var("HOME").map_err(|_| {
        MessMateError::Config(format!(
            "Could not determine a data directory; set {}",
            DATA_DIR_ENV
        ))
    })?;
    Ok(PathBuf::from(home).join(".config").join("messmate"))
}
