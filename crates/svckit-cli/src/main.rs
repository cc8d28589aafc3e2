//! svckit command-line interface.
//!
//! Scaffolds a service crate around a service trait: transport adapters,
//! registries, a runtime, command entry points and a service skeleton.
//! Re-running it after the trait grows appends only what is missing and
//! leaves hand-written code alone.
//!
//! # Architecture
//!
//! - `generate` - Run every generator and merge the results into the project
//! - `inspect` - Show the service interface that `generate` would use
//! - `completions` - Generate shell completions
//!
//! # Examples
//!
//! ```bash
//! # Scaffold or refresh the project in the current directory
//! svckit generate
//!
//! # Preview what a run would change
//! svckit generate ../kv --dry-run
//!
//! # Show the discovered interface as JSON
//! svckit --format json inspect
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use std::path::PathBuf;
use svckit_cli::commands;
use svckit_core::cli::{ExitCode, OutputFormat};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// svckit - merge-aware service scaffolding.
#[derive(Parser, Debug)]
#[command(name = "svckit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, text, pretty); defaults to `output.format`
    /// from the configuration
    #[arg(long = "format", global = true)]
    format: Option<String>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate or refresh the service scaffolding.
    ///
    /// Discovers the service trait in the message directory and merges the
    /// generated files into the project. Declarations that already exist
    /// are never modified; only missing ones are appended.
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Generate in the current directory
    /// svckit generate
    ///
    /// # Pick the trait explicitly
    /// svckit generate --interface KvService
    ///
    /// # Report changes without writing
    /// svckit generate --dry-run
    /// ```
    Generate {
        /// Project root directory
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Configuration file (defaults to <ROOT>/svckit.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Service trait name, overriding the configuration
        #[arg(long)]
        interface: Option<String>,

        /// Compute the changes without writing them to disk
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the discovered service interface.
    ///
    /// Runs discovery alone and prints the trait with its method
    /// signatures. Nothing is written.
    ///
    /// # Examples
    ///
    /// ```bash
    /// svckit inspect
    /// svckit --format json inspect ../kv
    /// ```
    Inspect {
        /// Project root directory
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Configuration file (defaults to <ROOT>/svckit.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Service trait name, overriding the configuration
        #[arg(long)]
        interface: Option<String>,
    },

    /// Generate shell completions.
    ///
    /// # Examples
    ///
    /// ```bash
    /// svckit completions bash > ~/.local/share/bash-completion/completions/svckit
    /// svckit completions zsh > ~/.zfunc/_svckit
    /// ```
    Completions {
        /// Target shell for completion generation
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.verbose) {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(ExitCode::ERROR.as_i32());
    }

    let exit_code = execute(cli).unwrap_or_else(|err| {
        eprintln!("{} {err:#}", "error:".red().bold());
        commands::exit_code(&err)
    });

    std::process::exit(exit_code.as_i32());
}

/// Initializes logging infrastructure.
///
/// `--verbose` forces the debug level; otherwise `RUST_LOG` applies, with
/// `warn` as the default so command output stays readable.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}

/// Routes the parsed command line to its command.
///
/// # Errors
///
/// Returns an error if the output format is unknown or the command fails.
fn execute(cli: Cli) -> Result<ExitCode> {
    let format = cli
        .format
        .as_deref()
        .map(str::parse::<OutputFormat>)
        .transpose()?;

    match cli.command {
        Commands::Generate {
            root,
            config,
            interface,
            dry_run,
        } => commands::generate::run(&root, config.as_deref(), interface, dry_run, format),
        Commands::Inspect {
            root,
            config,
            interface,
        } => commands::inspect::run(&root, config.as_deref(), interface, format),
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            commands::completions::run(shell, &mut cmd)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_generate_defaults() {
        let cli = Cli::parse_from(["svckit", "generate"]);
        if let Commands::Generate {
            root,
            config,
            interface,
            dry_run,
        } = cli.command
        {
            assert_eq!(root, PathBuf::from("."));
            assert_eq!(config, None);
            assert_eq!(interface, None);
            assert!(!dry_run);
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn test_cli_parsing_generate_all_flags() {
        let cli = Cli::parse_from([
            "svckit",
            "generate",
            "../kv",
            "--config",
            "kv.toml",
            "--interface",
            "KvServer",
            "--dry-run",
        ]);
        if let Commands::Generate {
            root,
            config,
            interface,
            dry_run,
        } = cli.command
        {
            assert_eq!(root, PathBuf::from("../kv"));
            assert_eq!(config, Some(PathBuf::from("kv.toml")));
            assert_eq!(interface.as_deref(), Some("KvServer"));
            assert!(dry_run);
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn test_cli_parsing_inspect() {
        let cli = Cli::parse_from(["svckit", "inspect", "/work/kv"]);
        assert!(matches!(cli.command, Commands::Inspect { ref root, .. } if root == &PathBuf::from("/work/kv")));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["svckit", "inspect", "--verbose", "--format", "json"]);
        assert!(cli.verbose);
        assert_eq!(cli.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_cli_format_defaults_to_config() {
        let cli = Cli::parse_from(["svckit", "inspect"]);
        assert_eq!(cli.format, None);
    }

    #[test]
    fn test_cli_invalid_format_is_input_error() {
        let cli = Cli::parse_from(["svckit", "--format", "yaml", "inspect"]);
        let err = execute(cli).unwrap_err();
        assert_eq!(commands::exit_code(&err), ExitCode::INVALID_INPUT);
    }

    #[test]
    fn test_cli_parsing_completions() {
        let cli = Cli::parse_from(["svckit", "completions", "zsh"]);
        assert!(matches!(cli.command, Commands::Completions { shell: Shell::Zsh }));
    }

    #[test]
    fn test_cli_rejects_unknown_shell() {
        assert!(Cli::try_parse_from(["svckit", "completions", "tcsh"]).is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
