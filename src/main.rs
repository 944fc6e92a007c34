//! modsync - automation account module synchronizer
//!
//! A command line tool that keeps the modules installed in an automation
//! account synchronized with the latest compatible versions published on
//! the package gallery, resolving transitive dependencies before each
//! import.

use clap::Parser;

mod account;
mod artifact;
mod cli;
mod commands;
mod config;
mod error;
mod importer;
mod progress;
mod registry;
mod resolver;
mod sync;
mod ui;
mod version;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    ui::set_verbose(cli.verbose);

    let result = match cli.command {
        Commands::Sync(args) => commands::sync::run(args),
        Commands::List(args) => commands::list::run(args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
