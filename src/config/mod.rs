//! Configuration file handling for modsync
//!
//! An optional YAML file (`modsync.yaml`) supplies connection and tuning
//! settings; every field can also be given on the command line, and CLI
//! flags win over file values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Settings loadable from `modsync.yaml`. All fields optional; unset fields
/// fall back to CLI flags or built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    /// Fully qualified automation account resource URL.
    pub account_url: Option<String>,

    /// Registry feed base URL.
    pub registry_url: Option<String>,

    /// Target runtime version ("5.1" or "7.2").
    pub runtime: Option<String>,

    /// Dependency recursion depth limit.
    pub max_depth: Option<usize>,

    /// Redirect hop bound for artifact location.
    pub max_redirects: Option<usize>,

    /// Seconds between provisioning-state polls.
    pub poll_interval_secs: Option<u64>,

    /// Bound on polls before an import counts as timed out.
    pub max_polls: Option<u32>,
}

impl FileConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(SyncError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|err| SyncError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: err.to_string(),
        })
    }
}
