//! Shared helpers for resolving command settings
//!
//! CLI flags take precedence over file configuration, which takes
//! precedence over built-in defaults.

use std::path::Path;

use crate::account::Runtime;
use crate::config::FileConfig;
use crate::error::{Result, SyncError};

/// Load the optional configuration file; no path means empty defaults.
pub fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
    match path {
        Some(path) => FileConfig::load(path),
        None => Ok(FileConfig::default()),
    }
}

/// The account URL is required, from flag or file.
pub fn require_account_url(flag: Option<String>, file: &FileConfig) -> Result<String> {
    flag.or_else(|| file.account_url.clone())
        .ok_or_else(|| SyncError::ConfigInvalid {
            message: "no account URL given (use --account-url or the config file)".to_string(),
        })
}

/// Resolve the target runtime, defaulting to 5.1.
pub fn resolve_runtime(flag: Option<&str>, file: &FileConfig) -> Result<Runtime> {
    match flag.or(file.runtime.as_deref()) {
        Some(raw) => raw.parse(),
        None => Ok(Runtime::default()),
    }
}
