//! List command implementation
//!
//! Lists the modules installed in the account with their versions and the
//! provisioning state of their last import.

use console::Style;

use crate::account::{AutomationAccount, InstalledModule, ProvisioningState};
use crate::account::http::HttpAutomationAccount;
use crate::cli::ListArgs;
use crate::error::Result;

use super::helpers;

/// Run list command
pub fn run(args: ListArgs) -> Result<()> {
    let file = helpers::load_file_config(args.config.as_deref())?;
    let account_url = helpers::require_account_url(args.account_url, &file)?;
    let runtime = helpers::resolve_runtime(args.runtime.as_deref(), &file)?;

    let account = HttpAutomationAccount::new(account_url, args.token);
    let mut modules = account.list_modules(runtime)?;
    if !args.global {
        modules.retain(|module| !module.is_global);
    }
    modules.sort_by(|a, b| a.name.cmp(&b.name));

    display_modules(&modules, runtime.as_str());
    Ok(())
}

fn display_modules(modules: &[InstalledModule], runtime: &str) {
    if modules.is_empty() {
        println!("No modules installed for runtime {}.", runtime);
        return;
    }

    println!("Installed modules for runtime {} ({}):", runtime, modules.len());
    println!();

    for module in modules {
        let version = module
            .version
            .as_ref()
            .map_or_else(|| "(unknown)".to_string(), ToString::to_string);

        let state = state_style(&module.provisioning_state)
            .apply_to(module.provisioning_state.to_string());

        let global_marker = if module.is_global { "  [global]" } else { "" };

        println!(
            "  {}  {}  {}{}",
            Style::new().bold().yellow().apply_to(&module.name),
            version,
            state,
            global_marker
        );
    }
}

fn state_style(state: &ProvisioningState) -> Style {
    match state {
        ProvisioningState::Succeeded | ProvisioningState::Created => Style::new().green(),
        ProvisioningState::Failed => Style::new().red().bold(),
        ProvisioningState::Unset => Style::new().dim(),
        ProvisioningState::Other(_) => Style::new().cyan(),
    }
}
