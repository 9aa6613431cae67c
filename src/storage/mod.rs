//! Storage layer for MessMate
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation. Each entity type lives in its own file under `data/`.

pub mod expenses;
pub mod file_io;
pub mod fund_records;
pub mod init;
pub mod members;
pub mod messes;

pub use expenses::{ExpenseQuery, ExpenseRepository};
pub use file_io::{read_json, write_json_atomic};
pub use fund_records::{FundRecordQuery, FundRecordRepository};
pub use init::initialize_storage;
pub use members::MemberRepository;
pub use messes::MessRepository;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::paths::MessMatePaths;
use crate::error::MessMateError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: MessMatePaths,
    pub members: MemberRepository,
    pub messes: MessRepository,
    pub expenses: ExpenseRepository,
    pub fund_records: FundRecordRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: MessMatePaths) -> Result<Self, MessMateError> {
        paths.ensure_directories()?;

        Ok(Self {
            members: MemberRepository::new(paths.members_file()),
            messes: MessRepository::new(paths.messes_file()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            fund_records: FundRecordRepository::new(paths.fund_records_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &MessMatePaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), MessMateError> {
        self.members.load()?;
        self.messes.load()?;
        self.expenses.load()?;
        self.fund_records.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), MessMateError> {
        self.members.save()?;
        self.messes.save()?;
        self.expenses.save()?;
        self.fund_records.save()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, MessMateError> {
    lock.read()
        .map_err(|e| MessMateError::Storage(format!("Failed to acquire read lock: {}", e)))
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, MessMateError> {
    lock.write()
        .map_err(|e| MessMateError::Storage(format!("Failed to acquire write lock: {}", e)))
}
