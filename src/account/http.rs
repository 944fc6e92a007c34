//! HTTP implementation of the automation account boundary
//!
//! Talks to the account's REST management API with a bearer token. Modules
//! for the two runtimes live under different resource collections
//! (`modules` for 5.1, `powerShell72Modules` for 7.2), mirroring how the
//! hosting platform exposes them.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use super::{AutomationAccount, InstalledModule, ProvisioningState, Runtime};
use crate::error::{Result, SyncError};
use crate::ui;
use crate::version::ModuleVersion;

const API_VERSION: &str = "2019-06-01";

/// Automation account client over the management REST API.
pub struct HttpAutomationAccount {
    client: Client,
    /// Fully qualified account resource URL, without a trailing slash.
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ModuleListResponse {
    #[serde(default)]
    value: Vec<ModuleResource>,
}

#[derive(Debug, Deserialize)]
struct ModuleResource {
    name: String,
    #[serde(default)]
    properties: ModuleProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModuleProperties {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    provisioning_state: ProvisioningState,
    #[serde(default)]
    is_global: bool,
}

impl HttpAutomationAccount {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Resource collection for the runtime's modules.
    fn collection(runtime: Runtime) -> &'static str {
        match runtime {
            Runtime::PowerShell51 => "modules",
            Runtime::PowerShell72 => "powerShell72Modules",
        }
    }

    fn module_url(&self, runtime: Runtime, name: Option<&str>) -> String {
        match name {
            Some(name) => format!(
                "{}/{}/{}?api-version={}",
                self.base_url,
                Self::collection(runtime),
                name,
                API_VERSION
            ),
            None => format!(
                "{}/{}?api-version={}",
                self.base_url,
                Self::collection(runtime),
                API_VERSION
            ),
        }
    }

    fn get_module_resource(&self, name: &str, runtime: Runtime) -> Result<Option<ModuleResource>> {
        let response = self
            .client
            .get(self.module_url(runtime, Some(name)))
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| SyncError::AccountQueryFailed {
                reason: e.to_string(),
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SyncError::AccountQueryFailed {
                reason: format!("module lookup for '{}' returned {}", name, response.status()),
            });
        }

        let resource: ModuleResource =
            response.json().map_err(|e| SyncError::AccountQueryFailed {
                reason: e.to_string(),
            })?;
        Ok(Some(resource))
    }
}

impl From<ModuleResource> for InstalledModule {
    fn from(resource: ModuleResource) -> Self {
        let version = resource.properties.version.as_deref().and_then(|raw| {
            let parsed = ModuleVersion::parse(raw);
            if parsed.is_err() {
                ui::detail(&format!(
                    "Ignoring unparseable installed version '{}' for module '{}'",
                    raw, resource.name
                ));
            }
            parsed.ok()
        });

        InstalledModule {
            name: resource.name,
            version,
            provisioning_state: resource.properties.provisioning_state,
            is_global: resource.properties.is_global,
        }
    }
}

impl AutomationAccount for HttpAutomationAccount {
    fn list_modules(&self, runtime: Runtime) -> Result<Vec<InstalledModule>> {
        let response = self
            .client
            .get(self.module_url(runtime, None))
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| SyncError::AccountQueryFailed {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(SyncError::AccountQueryFailed {
                reason: format!("module enumeration returned {}", response.status()),
            });
        }

        let listing: ModuleListResponse =
            response.json().map_err(|e| SyncError::AccountQueryFailed {
                reason: e.to_string(),
            })?;

        Ok(listing.value.into_iter().map(InstalledModule::from).collect())
    }

    fn find_module(&self, name: &str, runtime: Runtime) -> Result<Option<InstalledModule>> {
        Ok(self
            .get_module_resource(name, runtime)?
            .map(InstalledModule::from))
    }

    fn begin_import(
        &self,
        name: &str,
        runtime: Runtime,
        content_url: &str,
    ) -> Result<ProvisioningState> {
        let body = json!({
            "properties": {
                "contentLink": { "uri": content_url }
            }
        });

        let response = self
            .client
            .put(self.module_url(runtime, Some(name)))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .map_err(|e| SyncError::ImportSubmissionFailed {
                module: name.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(SyncError::ImportSubmissionFailed {
                module: name.to_string(),
                reason: format!("import submission returned {}", response.status()),
            });
        }

        let resource: ModuleResource =
            response
                .json()
                .map_err(|e| SyncError::ImportSubmissionFailed {
                    module: name.to_string(),
                    reason: e.to_string(),
                })?;
        Ok(resource.properties.provisioning_state)
    }

    fn import_state(&self, name: &str, runtime: Runtime) -> Result<ProvisioningState> {
        match self.get_module_resource(name, runtime)? {
            Some(resource) => Ok(resource.properties.provisioning_state),
            None => Ok(ProvisioningState::Unset),
        }
    }
}
