//! MessMate - shared-living expense tracker
//!
//! This library provides the core functionality for MessMate. A group of
//! people sharing a household (a "mess") keeps a pooled fund, logs shared
//! expenses with a split policy, and gets each member's running balance plus
//! a short list of transfers that settles everyone up.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (members, messes, expenses, fund records)
//! - `storage`: JSON file storage layer
//! - `services`: Business logic layer (splits, balances, settlements)
//! - `display`: Terminal formatting
//! - `export`: CSV, JSON and YAML reports
//! - `cli`: Command handlers for the binary
//!
//! # Example
//!
//! ```rust,ignore
//! use messmate::config::paths::MessMatePaths;
//! use messmate::services::{BalanceService, MemberService, MessService};
//! use messmate::storage::Storage;
//!
//! let storage = Storage::new(MessMatePaths::new()?)?;
//! storage.load_all()?;
//!
//! let alice = MemberService::new(&storage).add("Alice")?;
//! let mess = MessService::new(&storage).create("Flat 4B", alice.id, 6)?;
//! let balance = BalanceService::new(&storage).calculate_member_balance(mess.id, alice.id)?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::MessMateError;
