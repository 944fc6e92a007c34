//! Recursive dependency resolution
//!
//! Before a module is imported, every transitive dependency must already be
//! present in the account at a version no lower than required. The resolver
//! walks the dependency tree depth-first, importing what is missing or too
//! old, guarded by a per-run processed set (a dependency shared by several
//! modules is handled once) and a recursion depth limit (cycles and
//! pathological trees stop recursing instead of erroring).
//!
//! A module absent from the registry is not an error: private modules are
//! side-loaded into accounts all the time, and the resolver assumes those
//! are adequate as installed.

use std::collections::HashSet;

use crate::account::{AutomationAccount, InstalledModule, Runtime};
use crate::artifact::{ArtifactLocator, RedirectProbe};
use crate::error::{Result, SyncError};
use crate::importer::{ImportOrchestrator, ImportOutcome};
use crate::registry::deps::{self, DependencySpec};
use crate::registry::{ModuleRegistry, QueryFailureMode};
use crate::ui;
use crate::version::ModuleVersion;

/// Default bound on dependency recursion depth.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Shared mutable state for one synchronization run.
///
/// Passed by reference through every recursive call; deliberately never
/// reset between modules so a dependency required by two different modules
/// is imported at most once per run.
#[derive(Debug)]
pub struct ResolutionContext {
    processed: HashSet<String>,
    depth: usize,
    max_depth: usize,
}

impl ResolutionContext {
    pub fn new(max_depth: usize) -> Self {
        Self {
            processed: HashSet::new(),
            depth: 0,
            max_depth,
        }
    }

    fn is_processed(&self, name: &str) -> bool {
        self.processed.contains(&name.to_lowercase())
    }

    fn mark_processed(&mut self, name: &str) {
        self.processed.insert(name.to_lowercase());
    }

    fn within_limit(&self) -> bool {
        self.depth <= self.max_depth
    }

    fn enter(&mut self) {
        self.depth += 1;
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// What happened to a requested module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Imported and settled successfully.
    Imported,
    /// Import submitted but settled as Failed.
    ImportFailed,
    /// Not in the registry; assumed side-loaded and left alone.
    NotInRegistry,
}

/// Ensures modules and their transitive dependencies are imported.
pub struct DependencyResolver<'a, R, A, P>
where
    R: ModuleRegistry,
    A: AutomationAccount,
    P: RedirectProbe,
{
    registry: &'a R,
    account: &'a A,
    locator: &'a ArtifactLocator<P>,
    importer: &'a ImportOrchestrator<'a, A>,
    runtime: Runtime,
}

impl<'a, R, A, P> DependencyResolver<'a, R, A, P>
where
    R: ModuleRegistry,
    A: AutomationAccount,
    P: RedirectProbe,
{
    pub fn new(
        registry: &'a R,
        account: &'a A,
        locator: &'a ArtifactLocator<P>,
        importer: &'a ImportOrchestrator<'a, A>,
        runtime: Runtime,
    ) -> Self {
        Self {
            registry,
            account,
            locator,
            importer,
            runtime,
        }
    }

    /// Import `name` (and first its unsatisfied dependencies) into the
    /// account. `min_version` pins a dependency's required version; `None`
    /// means "latest".
    ///
    /// Errors are logged here before propagating so the failing module is
    /// visible even when an outer caller swallows the chain.
    pub fn ensure_imported(
        &self,
        ctx: &mut ResolutionContext,
        name: &str,
        min_version: Option<&ModuleVersion>,
    ) -> Result<ResolveOutcome> {
        self.ensure_imported_inner(ctx, name, min_version)
            .map_err(|err| {
                ui::error(&format!("Could not import module '{}': {}", name, err));
                err
            })
    }

    fn ensure_imported_inner(
        &self,
        ctx: &mut ResolutionContext,
        name: &str,
        min_version: Option<&ModuleVersion>,
    ) -> Result<ResolveOutcome> {
        let Some(descriptor) = self.registry.find_latest(name, QueryFailureMode::Fatal)? else {
            ui::status(&format!(
                "Module '{}' is not in the registry; assuming it was side-loaded",
                name
            ));
            return Ok(ResolveOutcome::NotInRegistry);
        };

        // With an explicit version the package URL can be synthesized
        // directly; otherwise start from the descriptor's content reference.
        let start_url = match min_version {
            Some(version) => self.registry.package_url(&descriptor.name, version),
            None => descriptor.content_url.clone(),
        };

        let specs = deps::parse_dependencies(&descriptor.dependencies);
        if !specs.is_empty() {
            ctx.enter();
            let outcome = self.import_dependencies(ctx, &descriptor.name, &specs);
            ctx.leave();
            outcome?;
        }

        let archive_url = self.locator.resolve(&descriptor.name, &start_url)?;
        match self.importer.submit_and_wait(&descriptor.name, &archive_url)? {
            ImportOutcome::Succeeded => Ok(ResolveOutcome::Imported),
            ImportOutcome::Failed => Ok(ResolveOutcome::ImportFailed),
        }
    }

    /// Handle one module's direct dependencies, recursing where needed.
    fn import_dependencies(
        &self,
        ctx: &mut ResolutionContext,
        parent: &str,
        specs: &[DependencySpec],
    ) -> Result<()> {
        for spec in specs {
            if ctx.is_processed(&spec.name) {
                ui::detail(&format!(
                    "Dependency '{}' already handled in this run",
                    spec.name
                ));
                continue;
            }

            // Re-query current installed state right before deciding; the
            // enumeration done at the start of the run may be stale by now.
            let existing = self
                .account
                .find_module(&spec.name, self.runtime)?
                .filter(|module| !module.is_global);

            if !ctx.within_limit() {
                ui::status(&format!(
                    "Recursion limit reached under '{}'; assuming installed '{}' is adequate",
                    parent, spec.name
                ));
                continue;
            }

            if dependency_satisfied(existing.as_ref(), spec.min_version.as_ref()) {
                ui::detail(&format!(
                    "Dependency '{}' of '{}' already satisfied",
                    spec.name, parent
                ));
            } else {
                self.ensure_imported(ctx, &spec.name, spec.min_version.as_ref())
                    .map_err(|err| SyncError::DependencyResolutionFailed {
                        module: spec.name.clone(),
                        reason: err.to_string(),
                    })?;
            }

            ctx.mark_processed(&spec.name);
        }
        Ok(())
    }
}

/// A dependency is satisfied when installed at a version not lower than
/// required. No required version means any installation will do; an
/// installation with an unknown version never satisfies a requirement.
fn dependency_satisfied(
    existing: Option<&InstalledModule>,
    required: Option<&ModuleVersion>,
) -> bool {
    match (existing, required) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(module), Some(required)) => module
            .version
            .as_ref()
            .is_some_and(|installed| installed >= required),
    }
}
