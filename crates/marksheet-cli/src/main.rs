//! Marksheet CLI - batch report-card generation.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            roster,
            profile,
            overrides,
            output,
            merged_name,
            no_individual,
            parallel,
        } => commands::generate::run(
            roster,
            profile,
            overrides,
            output,
            merged_name,
            no_individual,
            parallel,
            cli.verbose,
        ),

        Commands::Validate { roster, json } => commands::validate::run(roster, json, cli.verbose),

        Commands::Register {
            store,
            username,
            password,
            confirm,
        } => commands::register::run(store, username, password, confirm),

        Commands::Login {
            store,
            username,
            password,
        } => commands::login::run(store, username, password),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` wins over the `-v` default.
fn init_logging(verbose: bool) {
    let default = if verbose { "marksheet=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .without_time()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}
