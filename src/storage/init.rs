//! Storage initialization
//!
//! Handles first-run setup: directories, default settings and empty data
//! files.

use tracing::info;

use crate::config::paths::MessMatePaths;
use crate::config::settings::Settings;
use crate::error::MessMateError;

use super::Storage;

/// Initialize storage for a fresh installation
///
/// Returns `true` when this call created the configuration, `false` when the
/// data directory was already set up. Existing data files are never
/// overwritten.
pub fn initialize_storage(paths: &MessMatePaths) -> Result<bool, MessMateError> {
    let fresh = !paths.is_initialized();
    paths.ensure_directories()?;

    if fresh {
        Settings::default().save(paths)?;
        info!(base_dir = %paths.base_dir().display(), "created default settings");
    }

    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;
    storage.save_all()?;

    Ok(fresh)
}
