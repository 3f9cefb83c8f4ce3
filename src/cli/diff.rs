//! Diff command - compare secrets across contexts.

use crate::cli::output;
use crate::core::context::Context;
use crate::core::diff::{Classification, Comparison};
use crate::core::filter::KeyFilter;
use crate::core::mask::mask_unless;
use crate::core::vaults::VaultPool;
use crate::error::Result;

/// Run a comparison over the vault × environment cross product.
#[allow(clippy::too_many_arguments)]
pub fn execute(
    pool: &VaultPool,
    vault: Option<String>,
    environment: Option<String>,
    only: Option<String>,
    except: Option<String>,
    unmask: bool,
    json: bool,
) -> Result<()> {
    let contexts = build_contexts(pool, vault.as_deref(), environment.as_deref());
    let filter = KeyFilter::parse(only.as_deref(), except.as_deref())?;
    let comparison = Comparison::compute(pool, &contexts, &filter)?;

    if json {
        print_json(&comparison, unmask)?;
    } else {
        print_report(&comparison, unmask);
    }

    // A dropped context is a failed unit; the report is still produced
    // but the command exits non-zero.
    if !comparison.warnings().is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

/// Contexts are the cross product of the vault list (default: the default
/// vault) and the environment list (default: all configured), in flag
/// order.
fn build_contexts(
    pool: &VaultPool,
    vault: Option<&str>,
    environment: Option<&str>,
) -> Vec<Context> {
    let vaults: Vec<String> = match vault {
        Some(csv) => split_csv(csv),
        None => vec![pool.default_vault().to_string()],
    };
    let environments: Vec<String> = match environment {
        Some(csv) => split_csv(csv),
        None => pool.environments().to_vec(),
    };

    vaults
        .iter()
        .flat_map(|v| environments.iter().map(move |e| Context::new(v, e)))
        .collect()
}

fn split_csv(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn print_report(comparison: &Comparison, unmask: bool) {
    for warning in comparison.warnings() {
        output::warn(warning);
    }

    let contexts: Vec<String> = comparison.contexts().iter().map(|c| c.to_string()).collect();
    output::header(&format!("Comparing {}", contexts.join(", ")));

    if comparison.rows().is_empty() {
        output::dimmed("no secrets found");
        return;
    }

    let width = contexts.iter().map(String::len).max().unwrap_or(0);
    for row in comparison.rows() {
        let symbol = match row.classification() {
            Classification::Identical => "✓",
            Classification::Different => "~",
            Classification::Incomplete => "!",
        };
        println!("{} {} ({})", symbol, output::key(row.key()), row.classification());

        if row.classification() != Classification::Identical {
            for (context, cell) in contexts.iter().zip(row.cells()) {
                let shown = match cell.value() {
                    Some(value) => mask_unless(value, unmask),
                    None => "(missing)".to_string(),
                };
                println!("    {:width$}  {}", context, shown, width = width);
            }
        }
    }

    let summary = comparison.summary();
    output::section("Summary");
    output::kv(
        "identical:",
        format!("{} ({}%)", summary.identical(), summary.percent(summary.identical())),
    );
    output::kv(
        "different:",
        format!("{} ({}%)", summary.different(), summary.percent(summary.different())),
    );
    output::kv(
        "incomplete:",
        format!("{} ({}%)", summary.incomplete(), summary.percent(summary.incomplete())),
    );
}

fn print_json(comparison: &Comparison, unmask: bool) -> Result<()> {
    let contexts: Vec<String> = comparison.contexts().iter().map(|c| c.to_string()).collect();

    let keys: Vec<_> = comparison
        .rows()
        .iter()
        .map(|row| {
            let cells: Vec<_> = contexts
                .iter()
                .zip(row.cells())
                .map(|(context, cell)| {
                    serde_json::json!({
                        "context": context,
                        "present": cell.is_present(),
                        "value": cell.value().map(|v| mask_unless(v, unmask)),
                    })
                })
                .collect();
            serde_json::json!({
                "key": row.key(),
                "classification": row.classification().to_string(),
                "cells": cells,
            })
        })
        .collect();

    let summary = comparison.summary();
    let doc = serde_json::json!({
        "contexts": contexts,
        "warnings": comparison.warnings(),
        "keys": keys,
        "summary": {
            "identical": summary.identical(),
            "different": summary.different(),
            "incomplete": summary.incomplete(),
            "total": summary.total(),
        },
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
