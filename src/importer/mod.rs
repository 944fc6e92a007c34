//! Import submission and provisioning poller
//!
//! Submits an import request to the account and polls the module's
//! provisioning state until it settles. Polling is bounded: the platform
//! occasionally leaves an import stuck in an in-progress state, and an
//! unbounded loop would block the whole run.

use std::thread;
use std::time::Duration;

use crate::account::{AutomationAccount, ProvisioningState, Runtime};
use crate::error::{Result, SyncError};
use crate::progress::ImportProgress;
use crate::ui;

/// Default seconds between provisioning-state polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default bound on polls before an import counts as timed out (10 minutes
/// at the default interval).
pub const DEFAULT_MAX_POLLS: u32 = 120;

/// Terminal outcome of one import attempt.
///
/// A failed import is a per-module condition, reported but deliberately not
/// an error: one module's bad archive must not abort the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Succeeded,
    Failed,
}

/// Submits imports and waits for them to settle, one at a time.
pub struct ImportOrchestrator<'a, A: AutomationAccount> {
    account: &'a A,
    runtime: Runtime,
    poll_interval: Duration,
    max_polls: u32,
}

impl<'a, A: AutomationAccount> ImportOrchestrator<'a, A> {
    pub fn new(account: &'a A, runtime: Runtime, poll_interval: Duration, max_polls: u32) -> Self {
        Self {
            account,
            runtime,
            poll_interval,
            max_polls,
        }
    }

    /// Submit an import of `artifact_url` as module `module` and poll until
    /// the account reports a terminal provisioning state.
    ///
    /// Submission failures and poll exhaustion surface as errors; a Failed
    /// provisioning state and status-fetch errors mid-poll surface as
    /// `ImportOutcome::Failed`.
    pub fn submit_and_wait(&self, module: &str, artifact_url: &str) -> Result<ImportOutcome> {
        ui::status(&format!("Importing module '{}' from {}", module, artifact_url));

        let mut state = self.account.begin_import(module, self.runtime, artifact_url)?;

        let progress = ImportProgress::new(module);
        let mut polls = 0;

        while !state.is_terminal() {
            if polls >= self.max_polls {
                progress.finish();
                return Err(SyncError::ImportTimeout {
                    module: module.to_string(),
                    polls,
                });
            }

            thread::sleep(self.poll_interval);
            polls += 1;

            state = match self.account.import_state(module, self.runtime) {
                Ok(state) => state,
                Err(err) => {
                    progress.finish();
                    ui::error(&format!(
                        "Lost track of import for '{}': {}",
                        module, err
                    ));
                    return Ok(ImportOutcome::Failed);
                }
            };
            progress.observe(module, &state.to_string());
        }

        progress.finish();

        match state {
            ProvisioningState::Failed => {
                ui::error(&format!("Import of module '{}' failed", module));
                Ok(ImportOutcome::Failed)
            }
            _ => {
                ui::success(&format!("Imported module '{}'", module));
                Ok(ImportOutcome::Succeeded)
            }
        }
    }
}
