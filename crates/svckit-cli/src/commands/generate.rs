//! Generate command implementation.
//!
//! Runs every generator against a project on disk:
//! 1. Loads `svckit.toml` (or the `--config` file)
//! 2. Discovers the service interface in the message directory
//! 3. Merges each generated file into the project, appending only missing
//!    declarations
//!
//! With `--dry-run` the run writes into an in-memory overlay of the project
//! and only reports what would change.

use super::{output_format, project_root};
use crate::config::Config;
use crate::formatters;
use anyhow::{Context, Result};
use std::path::Path;
use svckit_codegen::{GenerateOptions, GenerationReport, ServiceFactory};
use svckit_core::cli::{ExitCode, OutputFormat};
use svckit_files::{DiskStore, FileStore, OverlayStore};
use tracing::info;

/// Runs the generate command.
///
/// # Arguments
///
/// * `root` - Project root directory
/// * `config` - Explicit configuration file, instead of `<root>/svckit.toml`
/// * `interface` - Service trait name, overriding the configuration
/// * `dry_run` - Report changes without writing them
/// * `format` - Output format; falls back to `output.format`
///
/// # Errors
///
/// Returns an error if:
/// - The root does not exist or the configuration is invalid
/// - No usable service interface is found
/// - An existing target file does not parse
/// - A file cannot be read or written
///
/// Files written before a failure keep their merged content.
pub fn run(
    root: &Path,
    config: Option<&Path>,
    interface: Option<String>,
    dry_run: bool,
    format: Option<OutputFormat>,
) -> Result<ExitCode> {
    let root = project_root(root)?;
    let config = Config::load(&root, config)?;
    let format = output_format(format, &config)?;
    let options = config.generate_options(interface);

    info!(
        "Generating in {}{}",
        root.display(),
        if dry_run { " (dry run)" } else { "" }
    );

    let disk = DiskStore::new(&root);
    let report = if dry_run {
        let mut overlay = OverlayStore::new(&disk);
        generate(&root, &options, &mut overlay)?
    } else {
        let mut disk = disk;
        generate(&root, &options, &mut disk)?
    };

    println!("{}", formatters::format_report(&report, format, dry_run)?);
    Ok(ExitCode::SUCCESS)
}

/// Runs the orchestrator against any store.
///
/// # Errors
///
/// Returns the first model, merge, generation or store error.
pub fn generate<S: FileStore + ?Sized>(
    root: &Path,
    options: &GenerateOptions,
    store: &mut S,
) -> Result<GenerationReport> {
    let mut factory = ServiceFactory::new(root, options, store)
        .with_context(|| format!("failed to load the service interface in {}", root.display()))?;
    let report = factory
        .create()
        .with_context(|| format!("generation failed in {}", root.display()))?;
    Ok(report)
}
