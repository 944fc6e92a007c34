//! Shared in-memory fakes for unit tests.
//!
//! The sync engine touches two external services (the package registry and
//! the automation account) plus a redirect-probing HTTP client. These fakes
//! implement the same traits with scripted data so resolver, importer, and
//! driver behavior can be tested without any network.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::account::{AutomationAccount, InstalledModule, ProvisioningState, Runtime};
use crate::artifact::RedirectProbe;
use crate::error::{Result, SyncError};
use crate::registry::{ModuleDescriptor, ModuleRegistry, QueryFailureMode};
use crate::version::ModuleVersion;

/// Build a registry descriptor for tests.
pub fn descriptor(name: &str, version: &str, dependencies: &str, owners: &str) -> ModuleDescriptor {
    ModuleDescriptor {
        name: name.to_string(),
        version: ModuleVersion::parse(version).expect("test version must parse"),
        content_url: format!("https://gallery.test/api/v2/package/{}/{}", name, version),
        dependencies: dependencies.to_string(),
        owners: owners.to_string(),
    }
}

/// Build an installed-module record for tests.
pub fn installed(name: &str, version: Option<&str>, state: ProvisioningState) -> InstalledModule {
    InstalledModule {
        name: name.to_string(),
        version: version.map(|v| ModuleVersion::parse(v).expect("test version must parse")),
        provisioning_state: state,
        is_global: false,
    }
}

/// In-memory registry keyed by lowercased module name.
pub struct FakeRegistry {
    modules: HashMap<String, ModuleDescriptor>,
    fail_all: bool,
    fail_for: HashSet<String>,
    queries: RefCell<Vec<String>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
            fail_all: false,
            fail_for: HashSet::new(),
            queries: RefCell::new(Vec::new()),
        }
    }

    pub fn with_module(mut self, descriptor: ModuleDescriptor) -> Self {
        self.modules
            .insert(descriptor.name.to_lowercase(), descriptor);
        self
    }

    /// Make every query fail at the transport level.
    pub fn failing() -> Self {
        let mut registry = Self::new();
        registry.fail_all = true;
        registry
    }

    /// Make queries for one module fail at the transport level.
    pub fn failing_for(mut self, name: &str) -> Self {
        self.fail_for.insert(name.to_lowercase());
        self
    }

    /// Names queried so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }
}

impl ModuleRegistry for FakeRegistry {
    fn find_latest(
        &self,
        name: &str,
        on_failure: QueryFailureMode,
    ) -> Result<Option<ModuleDescriptor>> {
        self.queries.borrow_mut().push(name.to_string());

        if self.fail_all || self.fail_for.contains(&name.to_lowercase()) {
            let err = SyncError::RegistryQueryFailed {
                module: name.to_string(),
                reason: "scripted transport failure".to_string(),
            };
            return match on_failure {
                QueryFailureMode::Fatal => Err(err),
                QueryFailureMode::SkipModule => Ok(None),
            };
        }

        Ok(self.modules.get(&name.to_lowercase()).cloned())
    }

    fn package_url(&self, name: &str, version: &ModuleVersion) -> String {
        format!("https://gallery.test/api/v2/package/{}/{}", name, version)
    }
}

#[derive(Default)]
struct FakeAccountState {
    modules: HashMap<String, InstalledModule>,
    submitted: Vec<(String, String)>,
    scripted_states: HashMap<String, VecDeque<ProvisioningState>>,
    fail_submission: HashSet<String>,
    fail_status: HashSet<String>,
    lookups: Vec<String>,
}

/// In-memory automation account with scripted provisioning sequences.
///
/// `begin_import` records the submission and yields the first scripted state
/// for the module; each `import_state` call yields the next one. A module
/// with no script settles as Succeeded immediately.
pub struct FakeAccount {
    state: RefCell<FakeAccountState>,
}

impl FakeAccount {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(FakeAccountState::default()),
        }
    }

    pub fn with_installed(self, module: InstalledModule) -> Self {
        self.state
            .borrow_mut()
            .modules
            .insert(module.name.to_lowercase(), module);
        self
    }

    pub fn script_states(&self, module: &str, states: &[ProvisioningState]) {
        self.state
            .borrow_mut()
            .scripted_states
            .insert(module.to_lowercase(), states.iter().cloned().collect());
    }

    pub fn fail_submission_for(&self, module: &str) {
        self.state
            .borrow_mut()
            .fail_submission
            .insert(module.to_lowercase());
    }

    pub fn fail_status_for(&self, module: &str) {
        self.state
            .borrow_mut()
            .fail_status
            .insert(module.to_lowercase());
    }

    /// Import submissions recorded so far, in order.
    pub fn submitted(&self) -> Vec<(String, String)> {
        self.state.borrow().submitted.clone()
    }

    /// Per-module lookups (`find_module`) recorded so far, in order.
    pub fn lookups(&self) -> Vec<String> {
        self.state.borrow().lookups.clone()
    }

    fn next_state(state: &mut FakeAccountState, module: &str) -> ProvisioningState {
        state
            .scripted_states
            .get_mut(&module.to_lowercase())
            .and_then(VecDeque::pop_front)
            .unwrap_or(ProvisioningState::Succeeded)
    }
}

impl AutomationAccount for FakeAccount {
    fn list_modules(&self, _runtime: Runtime) -> Result<Vec<InstalledModule>> {
        let mut modules: Vec<InstalledModule> =
            self.state.borrow().modules.values().cloned().collect();
        modules.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(modules)
    }

    fn find_module(&self, name: &str, _runtime: Runtime) -> Result<Option<InstalledModule>> {
        let mut state = self.state.borrow_mut();
        state.lookups.push(name.to_string());
        Ok(state.modules.get(&name.to_lowercase()).cloned())
    }

    fn begin_import(
        &self,
        name: &str,
        _runtime: Runtime,
        content_url: &str,
    ) -> Result<ProvisioningState> {
        let mut state = self.state.borrow_mut();

        if state.fail_submission.contains(&name.to_lowercase()) {
            return Err(SyncError::ImportSubmissionFailed {
                module: name.to_string(),
                reason: "scripted submission failure".to_string(),
            });
        }

        state.submitted.push((name.to_string(), content_url.to_string()));

        // Keep the fake account's view current: later lookups in the same
        // run must see the version just imported, as the real account would.
        let imported_version = content_url
            .rsplit('/')
            .next()
            .and_then(|segment| ModuleVersion::parse(segment).ok());
        if let Some(version) = imported_version {
            state.modules.insert(
                name.to_lowercase(),
                InstalledModule {
                    name: name.to_string(),
                    version: Some(version),
                    provisioning_state: ProvisioningState::Succeeded,
                    is_global: false,
                },
            );
        }

        Ok(Self::next_state(&mut state, name))
    }

    fn import_state(&self, name: &str, _runtime: Runtime) -> Result<ProvisioningState> {
        let mut state = self.state.borrow_mut();

        if state.fail_status.contains(&name.to_lowercase()) {
            return Err(SyncError::AccountQueryFailed {
                reason: format!("scripted status failure for '{}'", name),
            });
        }

        Ok(Self::next_state(&mut state, name))
    }
}

/// Probe that never redirects: every URL resolves to itself.
pub struct PassthroughProbe;

impl RedirectProbe for PassthroughProbe {
    fn redirect_target(&self, _url: &str) -> Result<Option<String>> {
        Ok(None)
    }
}
