//! Crossvault - cross-environment secrets synchronization.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crossvault::cli::output;
use crossvault::cli::{execute, Cli};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("CROSSVAULT_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("crossvault=debug")
        } else {
            EnvFilter::new("crossvault=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time())
        .init();

    if let Err(e) = execute(cli.command) {
        // Format error with suggestion if available
        let suggestion = match &e {
            crossvault::error::Error::Config(crossvault::error::ConfigError::NotInitialized) => {
                Some("run: crossvault init")
            }
            crossvault::error::Error::Validation(
                crossvault::error::ValidationError::KeyAndPattern,
            ) => Some("use either a key or --only/--except, not both"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
