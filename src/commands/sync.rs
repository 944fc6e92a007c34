//! Sync command implementation
//!
//! Wires the HTTP clients together and runs one synchronization pass.

use std::time::Duration;

use crate::account::http::HttpAutomationAccount;
use crate::artifact::{ArtifactLocator, DEFAULT_MAX_HOPS, HttpProbe};
use crate::cli::SyncArgs;
use crate::error::Result;
use crate::importer::{DEFAULT_MAX_POLLS, DEFAULT_POLL_INTERVAL_SECS};
use crate::registry::{DEFAULT_REGISTRY_URL, HttpRegistry};
use crate::resolver::DEFAULT_MAX_DEPTH;
use crate::sync::{SyncDriver, SyncOptions, UpdateScope};
use crate::ui;

use super::helpers;

/// Run sync command
pub fn run(args: SyncArgs) -> Result<()> {
    let file = helpers::load_file_config(args.config.as_deref())?;

    let account_url = helpers::require_account_url(args.account_url, &file)?;
    let runtime = helpers::resolve_runtime(args.runtime.as_deref(), &file)?;
    let registry_url = args
        .registry_url
        .or_else(|| file.registry_url.clone())
        .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string());

    let options = SyncOptions {
        scope: if args.platform_only {
            UpdateScope::PlatformOnly
        } else {
            UpdateScope::All
        },
        force: args.force,
        runtime,
        max_depth: args.max_depth.or(file.max_depth).unwrap_or(DEFAULT_MAX_DEPTH),
        poll_interval: Duration::from_secs(
            args.poll_interval
                .or(file.poll_interval_secs)
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        ),
        max_polls: args.max_polls.or(file.max_polls).unwrap_or(DEFAULT_MAX_POLLS),
    };
    let max_redirects = args
        .max_redirects
        .or(file.max_redirects)
        .unwrap_or(DEFAULT_MAX_HOPS);

    ui::detail(&format!(
        "Syncing account {} against {} (runtime {})",
        account_url, registry_url, runtime
    ));

    let registry = HttpRegistry::new(registry_url);
    let account = HttpAutomationAccount::new(account_url, args.token);
    let locator = ArtifactLocator::new(HttpProbe::new()?, max_redirects);

    let driver = SyncDriver::new(&registry, &account, &locator, options);
    driver.run()?;
    Ok(())
}
