//! Merge command - render a template with resolved secrets.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::output;
use crate::core::template::{self, MissingValue, OutputFormat, RenderOptions, Template};
use crate::core::vaults::VaultPool;
use crate::error::{ConflictError, Result};

/// Parsed merge flags.
pub struct Args {
    pub template: PathBuf,
    pub overlay: Option<PathBuf>,
    pub missing: MissingValue,
    pub all: bool,
    pub vault: Option<String>,
    pub environment: String,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub overwrite: bool,
    pub append: bool,
}

/// Render the template and write it to stdout or a file.
pub fn execute(pool: &VaultPool, args: Args) -> Result<()> {
    let mut template = Template::from_file(&args.template)?;
    if let Some(overlay_path) = &args.overlay {
        let overlay = Template::from_file(overlay_path)?;
        template.append_overlay(overlay, &display_name(overlay_path));
    }

    let options = RenderOptions {
        environment: args.environment.clone(),
        missing: args.missing,
        vaults: args.vault.as_deref().map(split_csv),
        include_all: args.all,
    };

    let rendered = template::render(pool, &template, &options)?;
    let text = rendered.serialize(args.format)?;

    match &args.output {
        None => {
            print!("{}", text);
        }
        Some(path) => {
            write_output(path, &text, args.overwrite, args.append)?;
            output::success(&format!(
                "wrote {} values to {}",
                rendered.resolved().len(),
                path.display()
            ));
        }
    }
    Ok(())
}

/// Write to the output path, refusing to clobber without `--overwrite`.
fn write_output(path: &Path, text: &str, overwrite: bool, append: bool) -> Result<()> {
    if append {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        file.write_all(text.as_bytes())?;
        return Ok(());
    }

    if path.exists() && !overwrite {
        return Err(ConflictError::OutputExists(path.display().to_string()).into());
    }
    std::fs::write(path, text)?;
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn split_csv(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
