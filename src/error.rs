//! Error types and handling for modsync
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Propagation policy (mirrored by the sync driver): registry failures while
//! resolving a dependency abort the whole run, while failures updating a
//! top-level module are isolated to that module and the pass continues.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for modsync operations
#[derive(Error, Diagnostic, Debug)]
pub enum SyncError {
    // Registry errors
    #[error("Registry query failed for module '{module}': {reason}")]
    #[diagnostic(
        code(modsync::registry::query_failed),
        help("Check that the registry URL is reachable and the feed responds to OData queries")
    )]
    RegistryQueryFailed { module: String, reason: String },

    #[error("Failed to parse registry feed response: {reason}")]
    #[diagnostic(code(modsync::registry::feed_parse_failed))]
    FeedParseFailed { reason: String },

    // Version errors
    #[error("Invalid module version: '{value}'")]
    #[diagnostic(
        code(modsync::version::invalid),
        help("Module versions are dotted numeric strings, e.g. 1.0.0 or 1.2.3.4")
    )]
    InvalidVersion { value: String },

    // Artifact errors
    #[error("Could not resolve a downloadable archive for module '{module}'")]
    #[diagnostic(
        code(modsync::artifact::resolution_failed),
        help("The package content endpoint never yielded an archive URL; nothing to import")
    )]
    ArtifactResolutionFailed { module: String },

    #[error("Redirect chain for '{url}' exceeded {limit} hops")]
    #[diagnostic(
        code(modsync::artifact::redirect_limit),
        help("The content endpoint is redirecting in a loop or through an unusually long chain")
    )]
    RedirectLimitExceeded { url: String, limit: usize },

    // Account errors
    #[error("Automation account query failed: {reason}")]
    #[diagnostic(code(modsync::account::query_failed))]
    AccountQueryFailed { reason: String },

    // Import errors
    #[error("Failed to submit import for module '{module}': {reason}")]
    #[diagnostic(code(modsync::import::submission_failed))]
    ImportSubmissionFailed { module: String, reason: String },

    #[error("Import of module '{module}' did not reach a terminal state after {polls} polls")]
    #[diagnostic(
        code(modsync::import::timeout),
        help("The account reported a non-terminal provisioning state for too long; retry later")
    )]
    ImportTimeout { module: String, polls: u32 },

    // Dependency resolution errors
    #[error("Failed to resolve dependency '{module}': {reason}")]
    #[diagnostic(
        code(modsync::deps::resolution_failed),
        help("A module whose dependency cannot be imported is unlikely to work; the run is aborted")
    )]
    DependencyResolutionFailed { module: String, reason: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(modsync::config::not_found))]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(modsync::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(modsync::config::invalid))]
    ConfigInvalid { message: String },

    #[error("Invalid runtime version: '{value}'")]
    #[diagnostic(
        code(modsync::config::invalid_runtime),
        help("Supported runtime versions: 5.1, 7.2")
    )]
    InvalidRuntime { value: String },

    // Transport / IO
    #[error("HTTP request failed: {message}")]
    #[diagnostic(code(modsync::http::request_failed))]
    HttpError { message: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(modsync::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for SyncError {
    fn from(err: serde_yaml::Error) -> Self {
        SyncError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::FeedParseFailed {
            reason: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::HttpError {
            message: err.to_string(),
        }
    }
}

impl SyncError {
    /// Whether this error must abort the whole synchronization pass.
    ///
    /// Dependency failures mean the requesting module cannot function either,
    /// so they are fatal; everything else is reported and the pass moves on
    /// to the next module.
    pub fn aborts_run(&self) -> bool {
        matches!(
            self,
            SyncError::DependencyResolutionFailed { .. } | SyncError::RegistryQueryFailed { .. }
        )
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::ArtifactResolutionFailed {
            module: "Az.Accounts".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Could not resolve a downloadable archive for module 'Az.Accounts'"
        );
    }

    #[test]
    fn test_error_code() {
        let err = SyncError::ImportTimeout {
            module: "Az.Compute".to_string(),
            polls: 120,
        };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("modsync::import::timeout".to_string())
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let sync_err: SyncError = io_err.into();
        assert!(matches!(sync_err, SyncError::IoError { .. }));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("not json");
        let sync_err: SyncError = parse_result.unwrap_err().into();
        assert!(matches!(sync_err, SyncError::FeedParseFailed { .. }));
    }

    #[test]
    fn test_dependency_failures_abort_the_run() {
        let dep = SyncError::DependencyResolutionFailed {
            module: "Az.Accounts".to_string(),
            reason: "registry timeout".to_string(),
        };
        assert!(dep.aborts_run());

        let registry = SyncError::RegistryQueryFailed {
            module: "Az.Compute".to_string(),
            reason: "503".to_string(),
        };
        assert!(registry.aborts_run());
    }

    #[test]
    fn test_per_module_failures_do_not_abort_the_run() {
        let submission = SyncError::ImportSubmissionFailed {
            module: "Az.Storage".to_string(),
            reason: "409 conflict".to_string(),
        };
        assert!(!submission.aborts_run());

        let artifact = SyncError::ArtifactResolutionFailed {
            module: "Az.Storage".to_string(),
        };
        assert!(!artifact.aborts_run());

        let timeout = SyncError::ImportTimeout {
            module: "Az.Storage".to_string(),
            polls: 5,
        };
        assert!(!timeout.aborts_run());
    }
}
