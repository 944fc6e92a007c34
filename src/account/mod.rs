//! Automation account boundary
//!
//! Types describing modules installed in the target automation account and
//! the trait the sync engine uses to talk to it. The HTTP implementation
//! lives in [`http`]; tests substitute an in-memory fake.

pub mod http;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::{Result, SyncError};
use crate::version::ModuleVersion;

/// Lifecycle status of a module import as reported by the account.
///
/// The account reports a handful of in-progress states while extracting and
/// validating an archive; the poller only cares which states are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningState {
    /// No import has been observed for this module yet.
    Unset,
    Created,
    Succeeded,
    Failed,
    /// Any in-progress state (e.g. "ContentDownloaded", "ModuleImportRunbookComplete").
    Other(String),
}

impl ProvisioningState {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "" => ProvisioningState::Unset,
            "Created" => ProvisioningState::Created,
            "Succeeded" => ProvisioningState::Succeeded,
            "Failed" => ProvisioningState::Failed,
            other => ProvisioningState::Other(other.to_string()),
        }
    }

    /// Terminal states stop the import poller: Created and Succeeded count
    /// as a completed import, Failed as a failed one.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProvisioningState::Created | ProvisioningState::Succeeded | ProvisioningState::Failed
        )
    }
}

impl Default for ProvisioningState {
    fn default() -> Self {
        ProvisioningState::Unset
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisioningState::Unset => write!(f, "(none)"),
            ProvisioningState::Created => write!(f, "Created"),
            ProvisioningState::Succeeded => write!(f, "Succeeded"),
            ProvisioningState::Failed => write!(f, "Failed"),
            ProvisioningState::Other(label) => write!(f, "{}", label),
        }
    }
}

impl<'de> Deserialize<'de> for ProvisioningState {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(ProvisioningState::from_label(raw.as_deref().unwrap_or("")))
    }
}

/// Which module execution environment an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Runtime {
    #[default]
    PowerShell51,
    PowerShell72,
}

impl Runtime {
    /// The runtime version string used on the wire ("5.1" / "7.2").
    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::PowerShell51 => "5.1",
            Runtime::PowerShell72 => "7.2",
        }
    }
}

impl FromStr for Runtime {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "5.1" => Ok(Runtime::PowerShell51),
            "7.2" => Ok(Runtime::PowerShell72),
            other => Err(SyncError::InvalidRuntime {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A module currently present in the automation account.
#[derive(Debug, Clone)]
pub struct InstalledModule {
    /// Module name as the account reports it.
    pub name: String,

    /// Installed version, when the account knows it. Modules whose last
    /// import never completed may have no version.
    pub version: Option<ModuleVersion>,

    /// Provisioning state of the last import attempt.
    pub provisioning_state: ProvisioningState,

    /// Platform-global modules ship with the hosting platform and cannot
    /// be imported or replaced by the user.
    pub is_global: bool,
}

/// Operations the sync engine needs from the target automation account.
///
/// All calls are blocking; the engine is single-threaded by design.
pub trait AutomationAccount {
    /// Enumerate every module in the account, global ones included.
    fn list_modules(&self, runtime: Runtime) -> Result<Vec<InstalledModule>>;

    /// Look up a single module by exact name, `None` when absent.
    fn find_module(&self, name: &str, runtime: Runtime) -> Result<Option<InstalledModule>>;

    /// Ask the account to import `content_url` as module `name`, returning
    /// the initial provisioning state of the new import job.
    fn begin_import(
        &self,
        name: &str,
        runtime: Runtime,
        content_url: &str,
    ) -> Result<ProvisioningState>;

    /// Fetch the current provisioning state of an in-flight import.
    fn import_state(&self, name: &str, runtime: Runtime) -> Result<ProvisioningState>;
}
