//! Project configuration.
//!
//! Read from `svckit.toml` at the project root, or from the file given with
//! `--config`. Every key is optional.
//!
//! ```toml
//! [generate]
//! app_name = "hello"
//! interface = "HelloService"
//! interface_suffix = "Service"
//! service_impl = "ServiceImpl"
//!
//! [layout]
//! src = "src"
//! pb = "src/pb"
//! autogen = "src/autogen"
//! service = "src/service"
//! global = "src/global"
//! cmd = "src/cmd"
//!
//! [output]
//! format = "pretty"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use svckit_codegen::{GenerateOptions, Layout};
use svckit_core::AppName;
use svckit_core::cli::OutputFormat;
use tracing::debug;

/// Default configuration file name, looked up at the project root.
pub const CONFIG_FILE: &str = "svckit.toml";

/// svckit configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    /// Generation settings
    #[serde(default)]
    pub generate: GenerateConfig,

    /// Directory layout
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenerateConfig {
    /// Application name; defaults to the root directory name
    pub app_name: Option<String>,

    /// Exact service trait name
    pub interface: Option<String>,

    /// Trait name suffix used when `interface` is unset
    pub interface_suffix: String,

    /// Name of the generated service implementation
    pub service_impl: String,
}

/// Directory layout, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Crate source root
    pub src: PathBuf,
    /// Message directory
    pub pb: PathBuf,
    /// Transport runtime directory
    pub autogen: PathBuf,
    /// Service skeleton directory
    pub service: PathBuf,
    /// Configuration directory
    pub global: PathBuf,
    /// Command directory
    pub cmd: PathBuf,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (json, text, pretty)
    pub format: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        let options = GenerateOptions::default();
        Self {
            app_name: None,
            interface: None,
            interface_suffix: options.interface_suffix,
            service_impl: options.service_impl,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Layout::default().into()
    }
}

impl From<Layout> for LayoutConfig {
    fn from(layout: Layout) -> Self {
        Self {
            src: layout.src,
            pb: layout.pb,
            autogen: layout.autogen,
            service: layout.service,
            global: layout.global,
            cmd: layout.cmd,
        }
    }
}

impl From<LayoutConfig> for Layout {
    fn from(layout: LayoutConfig) -> Self {
        Self {
            src: layout.src,
            pb: layout.pb,
            autogen: layout.autogen,
            service: layout.service,
            global: layout.global,
            cmd: layout.cmd,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default().as_str().to_string(),
        }
    }
}

fn config_error(message: impl Into<String>) -> svckit_core::Error {
    svckit_core::Error::ConfigError {
        message: message.into(),
    }
}

impl Config {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the document is not valid TOML or
    /// does not match the schema.
    ///
    /// # Examples
    ///
    /// ```
    /// use svckit_cli::config::Config;
    ///
    /// let config = Config::parse("[generate]\napp_name = \"kvd\"\n").unwrap();
    /// assert_eq!(config.generate.app_name.as_deref(), Some("kvd"));
    /// assert_eq!(config.generate.service_impl, "ServiceImpl");
    /// ```
    pub fn parse(content: &str) -> svckit_core::Result<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("invalid configuration: {e}")))
    }

    /// Loads and validates the configuration of a project.
    ///
    /// An explicit path must exist. Without one, `svckit.toml` under `root`
    /// is used when present and defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or
    /// fails validation.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = root.join(CONFIG_FILE);
                if !path.is_file() {
                    debug!("No {} in {}, using defaults", CONFIG_FILE, root.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Checks names, layout and output format.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` describing the first problem found.
    pub fn validate(&self) -> svckit_core::Result<()> {
        let generate = &self.generate;

        if let Some(app_name) = &generate.app_name {
            AppName::new(app_name.as_str())
                .map_err(|e| config_error(format!("generate.app_name: {e}")))?;
        }
        if generate.interface.as_deref().is_some_and(str::is_empty) {
            return Err(config_error("generate.interface cannot be empty"));
        }
        if generate.interface.is_none() && generate.interface_suffix.is_empty() {
            return Err(config_error(
                "generate.interface_suffix cannot be empty when generate.interface is unset",
            ));
        }
        if generate.service_impl.is_empty() {
            return Err(config_error("generate.service_impl cannot be empty"));
        }

        Layout::from(self.layout.clone()).validate()?;

        self.output
            .format
            .parse::<OutputFormat>()
            .map_err(|e| config_error(format!("output.format: {e}")))?;

        Ok(())
    }

    /// Output format configured for the project.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for an unknown format.
    pub fn output_format(&self) -> svckit_core::Result<OutputFormat> {
        self.output
            .format
            .parse()
            .map_err(|e| config_error(format!("output.format: {e}")))
    }

    /// Generation options, with `interface` overriding the configured trait
    /// name when given.
    #[must_use]
    pub fn generate_options(&self, interface: Option<String>) -> GenerateOptions {
        GenerateOptions {
            app_name: self.generate.app_name.clone(),
            interface: interface.or_else(|| self.generate.interface.clone()),
            interface_suffix: self.generate.interface_suffix.clone(),
            service_impl: self.generate.service_impl.clone(),
            layout: self.layout.clone().into(),
        }
    }
}
