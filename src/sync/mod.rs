//! Top-level synchronization pass
//!
//! Enumerates the modules currently installed in the account and, for each
//! one the registry knows about, decides whether an update is warranted.
//! Updates delegate to the dependency resolver so prerequisites land first.
//!
//! Failure isolation: a module that cannot be updated is reported and the
//! pass moves on, but a failure underneath a dependency aborts the whole
//! run — a module whose dependency is missing is unlikely to work anyway.

use std::time::Duration;

use console::Style;

use crate::account::{AutomationAccount, ProvisioningState, Runtime};
use crate::artifact::{ArtifactLocator, RedirectProbe};
use crate::error::Result;
use crate::importer::ImportOrchestrator;
use crate::registry::{ModuleRegistry, QueryFailureMode};
use crate::resolver::{DependencyResolver, ResolutionContext, ResolveOutcome};
use crate::ui;

/// Publisher identity marking modules shipped by the platform SDK team.
pub const PLATFORM_OWNER: &str = "azure-sdk";

/// Which installed modules a sync pass considers for updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateScope {
    /// Every user-imported module with a registry match.
    All,
    /// Only modules published by the platform SDK owner.
    PlatformOnly,
}

/// Tunables for one synchronization pass.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub scope: UpdateScope,
    /// Retry modules whose last import failed, even when versions match.
    pub force: bool,
    pub runtime: Runtime,
    pub max_depth: usize,
    pub poll_interval: Duration,
    pub max_polls: u32,
}

/// Counters reported at the end of a pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncSummary {
    pub checked: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Runs one synchronization pass over the account.
pub struct SyncDriver<'a, R, A, P>
where
    R: ModuleRegistry,
    A: AutomationAccount,
    P: RedirectProbe,
{
    registry: &'a R,
    account: &'a A,
    locator: &'a ArtifactLocator<P>,
    options: SyncOptions,
}

impl<'a, R, A, P> SyncDriver<'a, R, A, P>
where
    R: ModuleRegistry,
    A: AutomationAccount,
    P: RedirectProbe,
{
    pub fn new(
        registry: &'a R,
        account: &'a A,
        locator: &'a ArtifactLocator<P>,
        options: SyncOptions,
    ) -> Self {
        Self {
            registry,
            account,
            locator,
            options,
        }
    }

    /// Run the pass to completion, or abort on the first dependency failure.
    pub fn run(&self) -> Result<SyncSummary> {
        let installed = self.account.list_modules(self.options.runtime)?;
        let user_modules: Vec<_> = installed
            .into_iter()
            .filter(|module| !module.is_global)
            .collect();

        let mut summary = SyncSummary::default();
        if user_modules.is_empty() {
            ui::status("No user-imported modules found in the account; nothing to sync");
            return Ok(summary);
        }

        let importer = ImportOrchestrator::new(
            self.account,
            self.options.runtime,
            self.options.poll_interval,
            self.options.max_polls,
        );
        let resolver = DependencyResolver::new(
            self.registry,
            self.account,
            self.locator,
            &importer,
            self.options.runtime,
        );

        // One context for the whole pass: a dependency imported for one
        // module is never re-imported for another.
        let mut ctx = ResolutionContext::new(self.options.max_depth);
        let mut any_registry_match = false;

        for module in &user_modules {
            summary.checked += 1;

            // Freshness checks tolerate registry outages; the module is
            // simply skipped. The same query inside the resolver is fatal.
            let Some(latest) = self
                .registry
                .find_latest(&module.name, QueryFailureMode::SkipModule)?
            else {
                ui::detail(&format!(
                    "'{}' has no registry match (possibly side-loaded)",
                    module.name
                ));
                summary.skipped += 1;
                continue;
            };

            if self.options.scope == UpdateScope::PlatformOnly
                && !latest.owned_by(PLATFORM_OWNER)
            {
                ui::detail(&format!(
                    "'{}' is not a platform SDK module; out of scope",
                    module.name
                ));
                summary.skipped += 1;
                continue;
            }
            any_registry_match = true;

            let failed_before = module.provisioning_state == ProvisioningState::Failed;
            if failed_before && !self.options.force {
                ui::status(&format!(
                    "Skipping '{}': last import failed (pass --force to retry)",
                    module.name
                ));
                summary.skipped += 1;
                continue;
            }

            let up_to_date = module.version.as_ref() == Some(&latest.version);
            if up_to_date && !(failed_before && self.options.force) {
                ui::detail(&format!(
                    "'{}' is up to date at {}",
                    module.name, latest.version
                ));
                summary.skipped += 1;
                continue;
            }

            let installed_label = module
                .version
                .as_ref()
                .map_or_else(|| "(unknown)".to_string(), ToString::to_string);
            ui::status(&format!(
                "Updating '{}' {} -> {}",
                module.name, installed_label, latest.version
            ));

            match resolver.ensure_imported(&mut ctx, &module.name, None) {
                Ok(ResolveOutcome::Imported) => summary.updated += 1,
                Ok(ResolveOutcome::ImportFailed) => summary.failed += 1,
                Ok(ResolveOutcome::NotInRegistry) => summary.skipped += 1,
                Err(err) if err.aborts_run() => return Err(err),
                Err(err) => {
                    ui::error(&format!("Update of '{}' failed: {}", module.name, err));
                    summary.failed += 1;
                }
            }
        }

        if self.options.scope == UpdateScope::All && !any_registry_match {
            ui::status("No installed module matched the registry");
        }

        report(&summary);
        Ok(summary)
    }
}

fn report(summary: &SyncSummary) {
    ui::status(&format!(
        "{} {} checked, {} updated, {} skipped, {} failed",
        Style::new().bold().apply_to("Sync complete:"),
        summary.checked,
        summary.updated,
        summary.skipped,
        summary.failed
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::DEFAULT_MAX_HOPS;
    use crate::error::SyncError;
    use crate::resolver::DEFAULT_MAX_DEPTH;
    use crate::test_fixtures::{FakeAccount, FakeRegistry, PassthroughProbe, descriptor, installed};

    fn options(scope: UpdateScope, force: bool) -> SyncOptions {
        SyncOptions {
            scope,
            force,
            runtime: Runtime::PowerShell51,
            max_depth: DEFAULT_MAX_DEPTH,
            poll_interval: Duration::ZERO,
            max_polls: 10,
        }
    }

    fn run_sync(
        registry: &FakeRegistry,
        account: &FakeAccount,
        opts: SyncOptions,
    ) -> Result<SyncSummary> {
        let locator = ArtifactLocator::new(PassthroughProbe, DEFAULT_MAX_HOPS);
        SyncDriver::new(registry, account, &locator, opts).run()
    }

    #[test]
    fn test_equal_versions_trigger_no_update() {
        let registry =
            FakeRegistry::new().with_module(descriptor("Foo", "1.0.0", "", "someone"));
        let account = FakeAccount::new().with_installed(installed(
            "Foo",
            Some("1.0.0"),
            ProvisioningState::Succeeded,
        ));

        let summary = run_sync(&registry, &account, options(UpdateScope::All, false)).unwrap();
        assert!(account.submitted().is_empty());
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_version_mismatch_triggers_update() {
        let registry =
            FakeRegistry::new().with_module(descriptor("Foo", "1.0.1", "", "someone"));
        let account = FakeAccount::new().with_installed(installed(
            "Foo",
            Some("1.0.0"),
            ProvisioningState::Succeeded,
        ));

        let summary = run_sync(&registry, &account, options(UpdateScope::All, false)).unwrap();
        assert_eq!(
            account
                .submitted()
                .iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>(),
            vec!["Foo"]
        );
        assert_eq!(summary.updated, 1);
    }

    #[test]
    fn test_failed_module_skipped_without_force() {
        // Known-bad import, newer version available: still skipped
        let registry =
            FakeRegistry::new().with_module(descriptor("Baz", "2.0.0", "", "someone"));
        let account = FakeAccount::new().with_installed(installed(
            "Baz",
            Some("1.0.0"),
            ProvisioningState::Failed,
        ));

        let summary = run_sync(&registry, &account, options(UpdateScope::All, false)).unwrap();
        assert!(account.submitted().is_empty());
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_failed_module_retried_with_force_even_when_versions_match() {
        let registry =
            FakeRegistry::new().with_module(descriptor("Baz", "1.0.0", "", "someone"));
        let account = FakeAccount::new().with_installed(installed(
            "Baz",
            Some("1.0.0"),
            ProvisioningState::Failed,
        ));

        let summary = run_sync(&registry, &account, options(UpdateScope::All, true)).unwrap();
        assert_eq!(account.submitted().len(), 1);
        assert_eq!(account.submitted()[0].0, "Baz");
        assert_eq!(summary.updated, 1);
    }

    #[test]
    fn test_platform_scope_ignores_third_party_modules() {
        let registry = FakeRegistry::new()
            .with_module(descriptor("Az.Accounts", "2.0.0", "", "azure-sdk"))
            .with_module(descriptor("Pester", "5.5.0", "", "pester-team"));
        let account = FakeAccount::new()
            .with_installed(installed(
                "Az.Accounts",
                Some("1.0.0"),
                ProvisioningState::Succeeded,
            ))
            .with_installed(installed(
                "Pester",
                Some("4.0.0"),
                ProvisioningState::Succeeded,
            ));

        run_sync(&registry, &account, options(UpdateScope::PlatformOnly, false)).unwrap();

        let submitted = account.submitted();
        let names: Vec<&str> = submitted.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Az.Accounts"]);
    }

    #[test]
    fn test_registry_outage_skips_module_and_continues() {
        let registry = FakeRegistry::failing();
        let account = FakeAccount::new().with_installed(installed(
            "Foo",
            Some("1.0.0"),
            ProvisioningState::Succeeded,
        ));

        let summary = run_sync(&registry, &account, options(UpdateScope::All, false)).unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(account.submitted().is_empty());
    }

    #[test]
    fn test_dependency_failure_aborts_the_pass() {
        let registry = FakeRegistry::new()
            .with_module(descriptor("Foo", "2.0", "Bar:1.5:", "someone"))
            .failing_for("Bar");
        let account = FakeAccount::new().with_installed(installed(
            "Foo",
            Some("1.0"),
            ProvisioningState::Succeeded,
        ));

        let err = run_sync(&registry, &account, options(UpdateScope::All, false)).unwrap_err();
        assert!(matches!(err, SyncError::DependencyResolutionFailed { .. }));
    }

    #[test]
    fn test_top_level_submission_failure_is_isolated() {
        let registry = FakeRegistry::new()
            .with_module(descriptor("Alpha", "2.0", "", "someone"))
            .with_module(descriptor("Beta", "2.0", "", "someone"));
        let account = FakeAccount::new()
            .with_installed(installed(
                "Alpha",
                Some("1.0"),
                ProvisioningState::Succeeded,
            ))
            .with_installed(installed(
                "Beta",
                Some("1.0"),
                ProvisioningState::Succeeded,
            ));
        account.fail_submission_for("Alpha");

        let summary = run_sync(&registry, &account, options(UpdateScope::All, false)).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(account.submitted().len(), 1);
        assert_eq!(account.submitted()[0].0, "Beta");
    }

    #[test]
    fn test_failed_provisioning_is_counted_as_failure() {
        let registry =
            FakeRegistry::new().with_module(descriptor("Foo", "2.0", "", "someone"));
        let account = FakeAccount::new().with_installed(installed(
            "Foo",
            Some("1.0"),
            ProvisioningState::Succeeded,
        ));
        account.script_states("Foo", &[ProvisioningState::Failed]);

        let summary = run_sync(&registry, &account, options(UpdateScope::All, false)).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.updated, 0);
    }

    #[test]
    fn test_global_modules_are_not_considered() {
        let registry =
            FakeRegistry::new().with_module(descriptor("Az.Builtin", "9.9", "", "azure-sdk"));
        let mut global = installed("Az.Builtin", Some("1.0"), ProvisioningState::Succeeded);
        global.is_global = true;
        let account = FakeAccount::new().with_installed(global);

        let summary = run_sync(&registry, &account, options(UpdateScope::All, false)).unwrap();
        assert_eq!(summary.checked, 0);
        assert!(registry.queries().is_empty());
    }

    #[test]
    fn test_outdated_module_pulls_dependency_first() {
        let registry = FakeRegistry::new()
            .with_module(descriptor("Foo", "2.0", "Bar:1.5:", "someone"))
            .with_module(descriptor("Bar", "1.5", "", "someone"));
        let account = FakeAccount::new()
            .with_installed(installed("Foo", Some("1.0"), ProvisioningState::Succeeded))
            .with_installed(installed("Bar", Some("1.0"), ProvisioningState::Succeeded));

        run_sync(&registry, &account, options(UpdateScope::All, false)).unwrap();

        let names: Vec<String> = account
            .submitted()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        // Bar may also be updated as a top-level module afterwards, but the
        // first two submissions must be dependency-then-module.
        assert_eq!(&names[..2], &["Bar".to_string(), "Foo".to_string()]);
    }
}
