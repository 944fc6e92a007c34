//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// modsync - automation account module synchronizer
///
/// Keep the modules installed in an automation account in sync with the
/// latest versions published on the package gallery.
#[derive(Parser, Debug)]
#[command(
    name = "modsync",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Keep automation account modules in sync with the package gallery",
    long_about = "modsync enumerates the modules installed in an automation account, compares \
                  them against the latest versions published on the gallery feed, and imports \
                  updates with their transitive dependencies resolved first.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  modsync sync --account-url https://.../automationAccounts/acct\n    \
                  modsync sync --platform-only --runtime 7.2\n    \
                  modsync sync --force\n    \
                  modsync list --account-url https://.../automationAccounts/acct\n\n\
                  \x1b[1m\x1b[32mAuthentication:\x1b[0m\n    \
                  Pass a bearer token via --token or the MODSYNC_TOKEN environment variable."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize installed modules with the registry
    Sync(SyncArgs),

    /// List modules installed in the account
    List(ListArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the sync command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Update every module with a gallery match:\n    modsync sync --account-url <URL>\n\n\
                  Update only platform SDK modules:\n    modsync sync --account-url <URL> --platform-only\n\n\
                  Retry modules whose last import failed:\n    modsync sync --account-url <URL> --force\n\n\
                  Target the 7.2 runtime:\n    modsync sync --account-url <URL> --runtime 7.2\n\n\
                  Read connection settings from a file:\n    modsync sync --config modsync.yaml")]
pub struct SyncArgs {
    /// Fully qualified automation account resource URL
    #[arg(long)]
    pub account_url: Option<String>,

    /// Bearer token for the account management API
    #[arg(long, env = "MODSYNC_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Registry feed base URL (defaults to the public gallery)
    #[arg(long)]
    pub registry_url: Option<String>,

    /// Target runtime version (5.1 or 7.2)
    #[arg(long)]
    pub runtime: Option<String>,

    /// Update only modules published by the platform SDK owner
    #[arg(long)]
    pub platform_only: bool,

    /// Retry modules whose last import failed, even if versions match
    #[arg(long)]
    pub force: bool,

    /// Configuration file with connection and tuning settings
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Dependency recursion depth limit
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Redirect hop bound when locating archives
    #[arg(long)]
    pub max_redirects: Option<usize>,

    /// Seconds between provisioning-state polls
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Bound on polls before an import counts as timed out
    #[arg(long)]
    pub max_polls: Option<u32>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Fully qualified automation account resource URL
    #[arg(long)]
    pub account_url: Option<String>,

    /// Bearer token for the account management API
    #[arg(long, env = "MODSYNC_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Target runtime version (5.1 or 7.2)
    #[arg(long)]
    pub runtime: Option<String>,

    /// Configuration file with connection settings
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Include platform-global modules in the listing
    #[arg(long)]
    pub global: bool,
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
