//! Package registry boundary
//!
//! Queries an OData-style package feed for "latest version" metadata. The
//! server-side search is a substring filter and can return superset matches
//! ("Az.Account" also matches "Az.Accounts"), so candidates are re-filtered
//! client-side for an exact case-insensitive name match.

pub mod deps;
pub mod feed;

use reqwest::blocking::Client;

use crate::error::{Result, SyncError};
use crate::ui;
use crate::version::ModuleVersion;
use self::feed::{FeedEntry, FeedEnvelope};

/// Default public registry feed.
pub const DEFAULT_REGISTRY_URL: &str = "https://www.powershellgallery.com/api/v2";

/// Latest-version metadata for one module, fresh per query.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    /// Canonical module name as published.
    pub name: String,

    /// Latest published version.
    pub version: ModuleVersion,

    /// Content reference URL; may be an indirect link that redirects to the
    /// actual archive.
    pub content_url: String,

    /// Raw dependency field, parsed on demand via [`deps::parse_dependencies`].
    pub dependencies: String,

    /// Comma-separated publisher identities.
    pub owners: String,
}

impl ModuleDescriptor {
    /// Whether the module is published by the given platform SDK owner.
    pub fn owned_by(&self, owner: &str) -> bool {
        self.owners
            .split(',')
            .any(|entry| entry.trim().eq_ignore_ascii_case(owner))
    }
}

/// How a transport/query failure should be reported to the caller.
///
/// The same lookup is fatal when issued while importing a dependency (the
/// requesting module cannot work without it) but recoverable when merely
/// checking whether an installed module is fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFailureMode {
    /// Propagate the failure; the run aborts.
    Fatal,
    /// Log the failure and report the module as not found; the caller skips it.
    SkipModule,
}

/// Read access to the package registry.
pub trait ModuleRegistry {
    /// Find the latest published version of `name`.
    ///
    /// `Ok(None)` means the module is not in the registry, which is not an
    /// error: it may be private or side-loaded into the account.
    fn find_latest(
        &self,
        name: &str,
        on_failure: QueryFailureMode,
    ) -> Result<Option<ModuleDescriptor>>;

    /// Direct content URL for an explicit name + version pair.
    fn package_url(&self, name: &str, version: &ModuleVersion) -> String;
}

/// Registry client over the OData HTTP feed.
pub struct HttpRegistry {
    client: Client,
    base_url: String,
}

impl HttpRegistry {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn query_latest(&self, name: &str) -> Result<Option<ModuleDescriptor>> {
        let url = format!(
            "{}/Search()?$filter=IsLatestVersion&searchTerm='{}'&targetFramework=''&includePrerelease=false",
            self.base_url, name
        );

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|e| SyncError::RegistryQueryFailed {
                module: name.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(SyncError::RegistryQueryFailed {
                module: name.to_string(),
                reason: format!("search returned {}", response.status()),
            });
        }

        let envelope: FeedEnvelope =
            response
                .json()
                .map_err(|e| SyncError::RegistryQueryFailed {
                    module: name.to_string(),
                    reason: format!("feed parse error: {}", e),
                })?;

        Ok(select_exact_match(name, envelope.d.into_entries()))
    }
}

/// Narrow substring-filter candidates to the exact case-insensitive match.
fn select_exact_match(name: &str, entries: Vec<FeedEntry>) -> Option<ModuleDescriptor> {
    for entry in entries {
        let Some(entry_name) = entry.name() else {
            continue;
        };
        if !entry_name.eq_ignore_ascii_case(name) {
            continue;
        }

        let version = match ModuleVersion::parse(&entry.version) {
            Ok(version) => version,
            Err(_) => {
                ui::warn(&format!(
                    "Registry entry for '{}' carries unparseable version '{}'",
                    entry_name, entry.version
                ));
                continue;
            }
        };

        return Some(ModuleDescriptor {
            name: entry_name.to_string(),
            version,
            content_url: entry
                .metadata
                .as_ref()
                .and_then(|m| m.media_src.clone())
                .unwrap_or_default(),
            dependencies: entry.dependencies.clone().unwrap_or_default(),
            owners: entry.owners.clone().unwrap_or_default(),
        });
    }
    None
}

impl ModuleRegistry for HttpRegistry {
    fn find_latest(
        &self,
        name: &str,
        on_failure: QueryFailureMode,
    ) -> Result<Option<ModuleDescriptor>> {
        match self.query_latest(name) {
            Ok(descriptor) => Ok(descriptor),
            Err(err) => match on_failure {
                QueryFailureMode::Fatal => Err(err),
                QueryFailureMode::SkipModule => {
                    ui::warn(&format!("Skipping module '{}': {}", name, err));
                    Ok(None)
                }
            },
        }
    }

    fn package_url(&self, name: &str, version: &ModuleVersion) -> String {
        format!("{}/package/{}/{}", self.base_url, name, version)
    }
}
