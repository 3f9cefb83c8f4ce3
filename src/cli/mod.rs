//! Command-line interface.

pub mod completions;
pub mod copy;
pub mod diff;
pub mod init;
pub mod merge;
pub mod output;
pub mod secrets;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::config::Settings;
use crate::core::driver::DriverRegistry;
use crate::core::template::{MissingValue, OutputFormat};
use crate::core::vaults::VaultPool;
use crate::error::Result;

/// Crossvault - promote secrets safely between environments.
#[derive(Parser)]
#[command(
    name = "crossvault",
    about = "Cross-environment secrets synchronization for pluggable vault backends",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Initialize crossvault in the current directory
    Init,

    /// Set a secret value
    Set {
        /// Secret key (e.g., DATABASE_URL)
        key: String,
        /// Secret value
        value: String,
        /// Context as vault:environment or bare environment
        #[arg(short, long)]
        context: String,
        /// Mark the value as sensitive
        #[arg(long)]
        secure: bool,
        /// Overwrite if exists
        #[arg(short, long)]
        force: bool,
    },

    /// Get a secret value (masked unless --reveal)
    Get {
        /// Secret key
        key: String,
        /// Context as vault:environment or bare environment
        #[arg(short, long)]
        context: String,
        /// Print the real value instead of the masked one
        #[arg(long)]
        reveal: bool,
    },

    /// Remove a secret
    Rm {
        /// Secret key
        key: String,
        /// Context as vault:environment or bare environment
        #[arg(short, long)]
        context: String,
    },

    /// List secrets in a context
    List {
        /// Context as vault:environment or bare environment
        #[arg(short, long)]
        context: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a secret's version history
    History {
        /// Secret key
        key: String,
        /// Context as vault:environment or bare environment
        #[arg(short, long)]
        context: String,
        /// Maximum number of versions to show
        #[arg(long, default_value_t = crate::core::constants::HISTORY_LIMIT)]
        limit: usize,
    },

    /// Copy a secret (or a pattern of secrets) between contexts
    Copy {
        /// Secret key; omit when using --only/--except patterns
        key: Option<String>,
        /// Source context
        #[arg(long)]
        from: String,
        /// Destination context
        #[arg(long)]
        to: String,
        /// Comma-separated glob patterns selecting keys to copy
        #[arg(long)]
        only: Option<String>,
        /// Comma-separated glob patterns excluding keys
        #[arg(long)]
        except: Option<String>,
        /// Overwrite keys that already exist at the destination
        #[arg(long)]
        overwrite: bool,
        /// Validate and preview without writing
        #[arg(long)]
        dry_run: bool,
        /// Show real values in dry-run previews
        #[arg(long)]
        reveal: bool,
        /// Output the bulk result table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare secrets across contexts
    Diff {
        /// Comma-separated vault slugs (default: the default vault)
        #[arg(long)]
        vault: Option<String>,
        /// Comma-separated environments (default: all configured)
        #[arg(long)]
        environment: Option<String>,
        /// Comma-separated glob patterns selecting keys
        #[arg(long)]
        only: Option<String>,
        /// Comma-separated glob patterns excluding keys
        #[arg(long)]
        except: Option<String>,
        /// Show real values instead of masked ones
        #[arg(long)]
        unmask: bool,
        /// Output the comparison as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a template with resolved secrets
    #[command(alias = "export")]
    Merge {
        /// Template file
        #[arg(long)]
        template: PathBuf,
        /// Overlay template appended after the base
        #[arg(long)]
        overlay: Option<PathBuf>,
        /// Strategy for placeholders with no value
        #[arg(long, value_enum, default_value_t = MissingArg::Fail)]
        missing: MissingArg,
        /// Append unreferenced secrets from every touched vault
        #[arg(long)]
        all: bool,
        /// Comma-separated vault slugs, replacing placeholder discovery
        #[arg(long)]
        vault: Option<String>,
        /// Environment to resolve placeholders at
        #[arg(short, long)]
        environment: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = FormatArg::Env)]
        format: FormatArg,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Replace an existing output file
        #[arg(long, conflicts_with = "append")]
        overwrite: bool,
        /// Append to an existing output file
        #[arg(long)]
        append: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Missing-value strategy flag.
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum MissingArg {
    Fail,
    Remove,
    Blank,
    Skip,
}

impl From<MissingArg> for MissingValue {
    fn from(arg: MissingArg) -> Self {
        match arg {
            MissingArg::Fail => MissingValue::Fail,
            MissingArg::Remove => MissingValue::Remove,
            MissingArg::Blank => MissingValue::Blank,
            MissingArg::Skip => MissingValue::Skip,
        }
    }
}

/// Output format flag.
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum FormatArg {
    Env,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Env => OutputFormat::Env,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Execute a command.
///
/// Settings, the driver registry, and the vault pool are constructed here
/// once and passed by reference into the command handlers; nothing is
/// resolved through globals.
pub fn execute(command: Command) -> Result<()> {
    match command {
        Command::Init => init::execute(),
        Command::Completions { shell } => completions::execute(shell),
        command => {
            let settings = Settings::load()?;
            let registry = DriverRegistry::builtin();
            let pool = VaultPool::from_settings(&settings, &registry)?;
            dispatch(command, &pool)
        }
    }
}

fn dispatch(command: Command, pool: &VaultPool) -> Result<()> {
    match command {
        Command::Set {
            key,
            value,
            context,
            secure,
            force,
        } => secrets::set(pool, &key, &value, &context, secure, force),
        Command::Get {
            key,
            context,
            reveal,
        } => secrets::get(pool, &key, &context, reveal),
        Command::Rm { key, context } => secrets::rm(pool, &key, &context),
        Command::List { context, json } => secrets::list(pool, &context, json),
        Command::History {
            key,
            context,
            limit,
        } => secrets::history(pool, &key, &context, limit),
        Command::Copy {
            key,
            from,
            to,
            only,
            except,
            overwrite,
            dry_run,
            reveal,
            json,
        } => copy::execute(
            pool,
            copy::Args {
                key,
                from,
                to,
                only,
                except,
                overwrite,
                dry_run,
                reveal,
                json,
            },
        ),
        Command::Diff {
            vault,
            environment,
            only,
            except,
            unmask,
            json,
        } => diff::execute(pool, vault, environment, only, except, unmask, json),
        Command::Merge {
            template,
            overlay,
            missing,
            all,
            vault,
            environment,
            format,
            output,
            overwrite,
            append,
        } => merge::execute(
            pool,
            merge::Args {
                template,
                overlay,
                missing: missing.into(),
                all,
                vault,
                environment,
                format: format.into(),
                output,
                overwrite,
                append,
            },
        ),
        Command::Init | Command::Completions { .. } => unreachable!("handled in execute"),
    }
}
