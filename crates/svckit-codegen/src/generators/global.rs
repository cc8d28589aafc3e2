//! Configuration loader (`src/global/`).

use crate::builder::CodeBuilder;
use crate::generator::Generator;
use crate::meta::{Meta, Role};
use quote::quote;
use std::path::PathBuf;
use svckit_core::Result;

/// Default RPC listen address of generated projects.
pub const DEFAULT_RPC_ADDRESS: &str = "127.0.0.1:8888";

/// Default HTTP listen address of generated projects.
pub const DEFAULT_HTTP_ADDRESS: &str = "127.0.0.1:8080";

/// Generates `src/global/config.rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigGenerator;

impl Generator for ConfigGenerator {
    fn name(&self) -> &'static str {
        "config"
    }

    fn target(&self, meta: &Meta) -> PathBuf {
        meta.target(Role::Global, "config.rs")
    }

    fn generate(&self, meta: &Meta, builder: &mut CodeBuilder<'_>) -> Result<()> {
        let app_name = meta.app_name().as_str();

        builder.append_use("serde::Deserialize")?;
        builder.append_use("std::path::Path")?;

        builder.append_tokens(quote! {
            #[derive(Debug, Clone, Deserialize)]
            #[serde(default)]
            pub struct Config {
                pub app_name: String,
                pub rpc_address: String,
                pub http_address: String,
            }
        })?;

        builder.append_tokens(quote! {
            impl Default for Config {
                fn default() -> Self {
                    Self {
                        app_name: #app_name.to_string(),
                        rpc_address: #DEFAULT_RPC_ADDRESS.to_string(),
                        http_address: #DEFAULT_HTTP_ADDRESS.to_string(),
                    }
                }
            }
        })?;

        builder.comment("Reads the TOML configuration file, falling back to defaults when it is absent.");
        builder.append_tokens(quote! {
            pub fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
                if !path.exists() {
                    return Ok(Config::default());
                }
                let content = std::fs::read_to_string(path)?;
                Ok(toml::from_str(&content)?)
            }
        })?;

        Ok(())
    }
}

/// Generates `src/global/mod.rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalModGenerator;

impl Generator for GlobalModGenerator {
    fn name(&self) -> &'static str {
        "global_mod"
    }

    fn target(&self, meta: &Meta) -> PathBuf {
        meta.target(Role::Global, "mod.rs")
    }

    fn generate(&self, _meta: &Meta, builder: &mut CodeBuilder<'_>) -> Result<()> {
        builder.append_mod("config")?;
        builder.append_tokens(quote!(pub use config::Config;))?;
        builder.append_tokens(quote!(pub use config::load_config;))?;
        Ok(())
    }
}
