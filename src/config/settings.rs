//! User settings for MessMate
//!
//! Manages display preferences and the defaults applied to new messes and
//! expenses.

use serde::{Deserialize, Serialize};

use super::paths::MessMatePaths;
use crate::error::MessMateError;
use crate::models::mess::{MAX_MEMBER_LIMIT, MIN_MEMBER_LIMIT};
use crate::models::SplitMethod;

/// User settings for MessMate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used for display
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Member limit given to newly created messes
    #[serde(default = "default_member_limit")]
    pub default_member_limit: usize,

    /// Split method used when an expense does not name one
    #[serde(default)]
    pub default_split_method: SplitMethod,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_member_limit() -> usize {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            default_member_limit: default_member_limit(),
            default_split_method: SplitMethod::default(),
        }
    }
}

impl Settings {
    /// Member limit for new messes, clamped to the supported range
    pub fn member_limit(&self) -> usize {
        self.default_member_limit
            .clamp(MIN_MEMBER_LIMIT, MAX_MEMBER_LIMIT)
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &MessMatePaths) -> Result<Self, MessMateError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| MessMateError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                MessMateError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &MessMatePaths) -> Result<(), MessMateError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| MessMateError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| MessMateError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
