//! Copy command - promote secrets between contexts.

use crate::cli::output;
use crate::core::copy::{copy_key, copy_matching, BulkStatus, CopyRequest};
use crate::core::filter::KeyFilter;
use crate::core::mask::mask_unless;
use crate::core::vaults::VaultPool;
use crate::error::{Result, ValidationError};

/// Parsed copy flags.
pub struct Args {
    pub key: Option<String>,
    pub from: String,
    pub to: String,
    pub only: Option<String>,
    pub except: Option<String>,
    pub overwrite: bool,
    pub dry_run: bool,
    pub reveal: bool,
    pub json: bool,
}

/// Run a single-key or bulk copy.
pub fn execute(pool: &VaultPool, args: Args) -> Result<()> {
    let has_patterns = args.only.is_some() || args.except.is_some();
    if args.key.is_some() && has_patterns {
        return Err(ValidationError::KeyAndPattern.into());
    }

    let request = CopyRequest {
        source: pool.parse_context(&args.from)?,
        destination: pool.parse_context(&args.to)?,
        overwrite: args.overwrite,
        dry_run: args.dry_run,
    };

    match &args.key {
        Some(key) => single(pool, key, &request, args.reveal),
        None if has_patterns => bulk(pool, &args, &request),
        None => Err(ValidationError::NoKeyOrPattern.into()),
    }
}

fn single(pool: &VaultPool, key: &str, request: &CopyRequest, reveal: bool) -> Result<()> {
    let outcome = copy_key(pool, key, request)?;

    if outcome.is_dry_run() {
        output::section("Dry run");
        output::kv("source:", outcome.source_path());
        output::kv("destination:", outcome.destination_path());
        output::kv("action:", outcome.action());
        output::kv("value:", mask_unless(outcome.value(), reveal));
        output::kv("secure:", outcome.secure());
        return Ok(());
    }

    let version = outcome.version().unwrap_or_default();
    output::success(&format!(
        "copied {} {} → {} ({}, v{})",
        output::key(key),
        output::context(&request.source.to_string()),
        output::context(&request.destination.to_string()),
        outcome.action(),
        version
    ));
    Ok(())
}

fn bulk(pool: &VaultPool, args: &Args, request: &CopyRequest) -> Result<()> {
    let filter = KeyFilter::parse(args.only.as_deref(), args.except.as_deref())?;
    let report = copy_matching(pool, &filter, request)?;

    if args.json {
        print_json(&report, request)?;
    } else {
        print_table(&report, request, args.dry_run);
    }

    // Partial success still fails the command.
    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_table(
    report: &crate::core::copy::BulkCopyReport,
    request: &CopyRequest,
    dry_run: bool,
) {
    if report.is_empty() {
        output::dimmed("no keys matched");
        return;
    }

    let verb = if dry_run { "would copy" } else { "copied" };
    for entry in report.entries() {
        match entry.status() {
            BulkStatus::Done(outcome) => {
                let version = outcome
                    .version()
                    .map(|v| format!(" v{}", v))
                    .unwrap_or_default();
                output::success(&format!(
                    "{} {} ({}{})",
                    verb,
                    output::key(entry.key()),
                    outcome.action(),
                    version
                ));
            }
            BulkStatus::Failed { message, .. } => {
                output::error(&format!("{}: {}", entry.key(), message));
            }
        }
    }

    println!();
    let succeeded = report.len() - report.failed();
    output::dimmed(&format!(
        "{} → {}: {} succeeded, {} failed",
        request.source, request.destination, succeeded, report.failed()
    ));
}

fn print_json(report: &crate::core::copy::BulkCopyReport, request: &CopyRequest) -> Result<()> {
    let entries: Vec<_> = report
        .entries()
        .iter()
        .map(|entry| match entry.status() {
            BulkStatus::Done(outcome) => serde_json::json!({
                "key": entry.key(),
                "status": "done",
                "action": outcome.action().to_string(),
                "version": outcome.version(),
                "dry_run": outcome.is_dry_run(),
            }),
            BulkStatus::Failed { kind, message } => serde_json::json!({
                "key": entry.key(),
                "status": "failed",
                "error_kind": kind,
                "error": message,
            }),
        })
        .collect();

    let doc = serde_json::json!({
        "from": request.source.to_string(),
        "to": request.destination.to_string(),
        "entries": entries,
        "failed": report.failed(),
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
