//! Inspect command implementation.
//!
//! Runs interface discovery alone and prints the service trait that
//! `generate` would use, with every method signature. Nothing is written.

use super::{output_format, project_root};
use crate::config::Config;
use crate::formatters;
use anyhow::{Context, Result};
use std::path::Path;
use svckit_core::cli::{ExitCode, OutputFormat};
use svckit_files::{DiskStore, FileStore};
use svckit_introspector::{InterfaceModel, Introspector};
use tracing::info;

/// Runs the inspect command.
///
/// # Arguments
///
/// * `root` - Project root directory
/// * `config` - Explicit configuration file, instead of `<root>/svckit.toml`
/// * `interface` - Service trait name, overriding the configuration
/// * `format` - Output format; falls back to `output.format`
///
/// # Errors
///
/// Returns an error if the configuration is invalid or no usable service
/// interface is found.
pub fn run(
    root: &Path,
    config: Option<&Path>,
    interface: Option<String>,
    format: Option<OutputFormat>,
) -> Result<ExitCode> {
    let root = project_root(root)?;
    let config = Config::load(&root, config)?;
    let format = output_format(format, &config)?;
    let options = config.generate_options(interface);

    let model = inspect(&Introspector::new(options.introspector_options()), &DiskStore::new(&root))?;
    info!(
        "Found {} with {} methods",
        model.interface.qualified_name(),
        model.interface.methods.len()
    );

    println!("{}", formatters::format_interface(&model, format)?);
    Ok(ExitCode::SUCCESS)
}

/// Discovers the interface model in a store.
///
/// # Errors
///
/// Returns the discovery error with the searched directory attached.
pub fn inspect<S: FileStore + ?Sized>(introspector: &Introspector, store: &S) -> Result<InterfaceModel> {
    introspector.discover(store).with_context(|| {
        format!(
            "failed to discover the service interface in {}",
            introspector.options().source_dir.display()
        )
    })
}
