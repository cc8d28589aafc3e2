//! Command implementations for the svckit CLI.
//!
//! Each command module loads what it needs, runs the operation and formats
//! its result according to the requested output format.

pub mod completions;
pub mod generate;
pub mod inspect;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use svckit_core::cli::{ExitCode, OutputFormat};

use crate::config::Config;

/// Maps a command failure to an exit code.
///
/// Problems with the user's input (a bad interface, an unparsable existing
/// file, bad configuration or arguments) yield `INVALID_INPUT`; anything
/// else yields `ERROR`.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<svckit_core::Error>() {
        Some(e)
            if e.is_model_error()
                || e.is_merge_error()
                || e.is_config_error()
                || matches!(e, svckit_core::Error::InvalidArgument(_)) =>
        {
            ExitCode::INVALID_INPUT
        }
        _ => ExitCode::ERROR,
    }
}

/// Resolves the project root to an absolute directory.
fn project_root(root: &Path) -> Result<PathBuf> {
    let root = root
        .canonicalize()
        .with_context(|| format!("project root not found: {}", root.display()))?;
    if !root.is_dir() {
        anyhow::bail!("project root is not a directory: {}", root.display());
    }
    Ok(root)
}

/// The output format: the command line flag wins over the configuration.
fn output_format(flag: Option<OutputFormat>, config: &Config) -> Result<OutputFormat> {
    if let Some(format) = flag {
        return Ok(format);
    }
    Ok(config.output_format()?)
}
