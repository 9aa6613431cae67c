//! Configuration module for MessMate
//!
//! This module provides configuration management including:
//! - data directory resolution
//! - user settings persistence

pub mod paths;
pub mod settings;

pub use paths::MessMatePaths;
pub use settings::Settings;
