//! Command-line entry points of the generated project (`src/cmd/`).
//!
//! The generated commands parse arguments with `clap`, load the
//! configuration and build the handler tables. Binding a network listener
//! is left to the project.

use super::{Transport, item_in, module_path, service_impl_path};
use crate::builder::CodeBuilder;
use crate::generator::Generator;
use crate::meta::{Meta, Role};
use quote::{format_ident, quote};
use std::path::PathBuf;
use svckit_core::Result;

/// Generates `src/cmd/mod.rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmdRootGenerator;

impl Generator for CmdRootGenerator {
    fn name(&self) -> &'static str {
        "cmd_root"
    }

    fn target(&self, meta: &Meta) -> PathBuf {
        meta.target(Role::Cmd, "mod.rs")
    }

    fn generate(&self, meta: &Meta, builder: &mut CodeBuilder<'_>) -> Result<()> {
        let app_name = meta.app_name().as_str();
        let about = format!("{app_name} service");
        let global = module_path(meta, Role::Global)?;

        for module in ["client", "run", "run_http", "run_rpc"] {
            builder.append_mod(module)?;
        }

        builder.append_use("clap::Parser")?;
        builder.append_use("clap::Subcommand")?;
        builder.append_use("std::path::PathBuf")?;

        builder.append_tokens(quote! {
            #[derive(Debug, Parser)]
            #[command(name = #app_name, version, about = #about)]
            pub struct Cli {
                /// Configuration file
                #[arg(short, long, global = true, default_value = "config.toml")]
                pub config: PathBuf,

                #[command(subcommand)]
                pub command: Commands,
            }
        })?;

        builder.append_tokens(quote! {
            #[derive(Debug, Subcommand)]
            pub enum Commands {
                /// Run the servers
                Run(run::RunArgs),
                /// Call the service through the in-process client
                Client(client::ClientArgs),
            }
        })?;

        builder.append_tokens(quote! {
            pub fn execute() -> Result<(), Box<dyn std::error::Error>> {
                let cli = Cli::parse();
                let config = #global::load_config(&cli.config)?;
                match cli.command {
                    Commands::Run(args) => run::execute(&config, args),
                    Commands::Client(args) => client::execute(&config, args),
                }
            }
        })?;

        Ok(())
    }
}

/// Generates `src/cmd/run.rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunCmdGenerator;

impl Generator for RunCmdGenerator {
    fn name(&self) -> &'static str {
        "run_cmd"
    }

    fn target(&self, meta: &Meta) -> PathBuf {
        meta.target(Role::Cmd, "run.rs")
    }

    fn generate(&self, meta: &Meta, builder: &mut CodeBuilder<'_>) -> Result<()> {
        builder.append_use("clap::Args")?;
        builder.append_use("clap::Subcommand")?;
        builder.append_use(&item_in(meta, Role::Global, "Config"))?;

        builder.append_tokens(quote! {
            #[derive(Debug, Args)]
            pub struct RunArgs {
                #[command(subcommand)]
                pub server: Option<Server>,
            }
        })?;

        builder.append_tokens(quote! {
            #[derive(Debug, Subcommand)]
            pub enum Server {
                /// Run the RPC server
                Rpc(super::run_rpc::RunRpcArgs),
                /// Run the HTTP server
                Http(super::run_http::RunHttpArgs),
            }
        })?;

        builder.comment("Without a subcommand both servers are started.");
        builder.append_tokens(quote! {
            pub fn execute(config: &Config, args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
                match args.server {
                    Some(Server::Rpc(args)) => super::run_rpc::execute(config, args),
                    Some(Server::Http(args)) => super::run_http::execute(config, args),
                    None => {
                        super::run_rpc::execute(config, super::run_rpc::RunRpcArgs::default())?;
                        super::run_http::execute(config, super::run_http::RunHttpArgs::default())
                    }
                }
            }
        })?;

        Ok(())
    }
}

/// Generates `src/cmd/run_rpc.rs` or `src/cmd/run_http.rs`.
#[derive(Debug, Clone, Copy)]
pub struct RunServerCmdGenerator {
    transport: Transport,
}

impl RunServerCmdGenerator {
    /// Creates the server command generator for `transport`.
    #[must_use]
    pub const fn new(transport: Transport) -> Self {
        Self { transport }
    }
}

impl Generator for RunServerCmdGenerator {
    fn name(&self) -> &'static str {
        match self.transport {
            Transport::Rpc => "run_rpc_cmd",
            Transport::Http => "run_http_cmd",
        }
    }

    fn target(&self, meta: &Meta) -> PathBuf {
        meta.target(Role::Cmd, &format!("run_{}.rs", self.transport))
    }

    fn generate(&self, meta: &Meta, builder: &mut CodeBuilder<'_>) -> Result<()> {
        let transport = self.transport.as_str();
        let args = format_ident!("Run{}Args", if self.transport == Transport::Rpc { "Rpc" } else { "Http" });
        let address_field = format_ident!("{}_address", transport);
        let registry = module_path(meta, self.transport.role())?;
        let service_impl = service_impl_path(meta)?;
        let banner = format!("{{}} {transport} server listening on {{}}");

        builder.append_use("std::any::Any")?;
        builder.append_use("std::sync::Arc")?;
        builder.append_use("clap::Args")?;
        builder.append_use(&item_in(meta, Role::Global, "Config"))?;

        builder.append_tokens(quote! {
            #[derive(Debug, Default, Args)]
            pub struct #args {
                /// Listen address, overrides the configuration
                #[arg(short, long)]
                pub address: Option<String>,
            }
        })?;

        let listing = match self.transport {
            Transport::Rpc => quote! {
                for handler in #registry::handlers() {
                    let _endpoint = handler.endpoint(Arc::clone(&service));
                    println!("  {}", handler.method_name());
                }
            },
            Transport::Http => quote! {
                for (path, handler) in #registry::routes() {
                    let _endpoint = handler.endpoint(Arc::clone(&service));
                    println!("  {} -> {}", path, handler.method_name());
                }
            },
        };

        builder.comment(&format!("Builds the {transport} endpoints. Attach them to a listener here."));
        builder.append_tokens(quote! {
            pub fn execute(config: &Config, args: #args) -> Result<(), Box<dyn std::error::Error>> {
                let address = args.address.unwrap_or_else(|| config.#address_field.clone());
                let service: Arc<dyn Any + Send + Sync> = Arc::new(#service_impl::new());
                println!(#banner, config.app_name, address);
                #listing
                Ok(())
            }
        })?;

        Ok(())
    }
}

/// Generates `src/cmd/client.rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientCmdGenerator;

impl Generator for ClientCmdGenerator {
    fn name(&self) -> &'static str {
        "client_cmd"
    }

    fn target(&self, meta: &Meta) -> PathBuf {
        meta.target(Role::Cmd, "client.rs")
    }

    fn generate(&self, meta: &Meta, builder: &mut CodeBuilder<'_>) -> Result<()> {
        let registry = module_path(meta, Role::Rpc)?;
        let service_impl = service_impl_path(meta)?;

        builder.append_use("std::sync::Arc")?;
        builder.append_use("clap::Args")?;
        builder.append_use(&item_in(meta, Role::Global, "Config"))?;

        builder.append_tokens(quote! {
            #[derive(Debug, Args)]
            pub struct ClientArgs {
                /// Method to call
                pub method: String,
            }
        })?;

        builder.append_tokens(quote! {
            pub fn execute(config: &Config, args: ClientArgs) -> Result<(), Box<dyn std::error::Error>> {
                let Some(handler) = #registry::find(&args.method) else {
                    return Err(format!("unknown method {}", args.method).into());
                };
                let client = #registry::client::Client::connect(Arc::new(#service_impl::new()));
                println!("{}: {} ready on {:?}", config.app_name, handler.method_name(), client);
                Ok(())
            }
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::fixtures;
    use crate::merge::MergeFile;
    use svckit_files::VirtualPath;

    fn run(generator: &dyn Generator) -> String {
        let meta = fixtures::meta();
        let path = VirtualPath::new(generator.target(&meta)).unwrap();
        let mut file = MergeFile::from_source(path, None).unwrap();
        generator
            .generate(&meta, &mut CodeBuilder::new(&mut file))
            .unwrap();
        file.into_outcome().content
    }

    #[test]
    fn test_cmd_root() {
        let content = run(&CmdRootGenerator);
        assert!(content.starts_with("pub mod client;\n\npub mod run;\n\npub mod run_http;\n\npub mod run_rpc;\n"));
        assert!(content.contains("#[command(name = \"kv\", version, about = \"kv service\")]"));
        assert!(content.contains("crate::global::load_config(&cli.config)?"));
        assert!(content.contains("/// Configuration file"));
    }

    #[test]
    fn test_run_servers() {
        let rpc = RunServerCmdGenerator::new(Transport::Rpc);
        let http = RunServerCmdGenerator::new(Transport::Http);
        let meta = fixtures::meta();
        assert_eq!(rpc.target(&meta), PathBuf::from("src/cmd/run_rpc.rs"));
        assert_eq!(http.target(&meta), PathBuf::from("src/cmd/run_http.rs"));

        let content = run(&rpc);
        assert!(content.contains("pub struct RunRpcArgs"));
        assert!(content.contains("config.rpc_address.clone()"));
        assert!(content.contains("crate::autogen::rpc::handlers()"));

        let content = run(&http);
        assert!(content.contains("pub struct RunHttpArgs"));
        assert!(content.contains("crate::autogen::http::routes()"));
    }

    #[test]
    fn test_run_defaults_to_both_servers() {
        let content = run(&RunCmdGenerator);
        assert!(content.contains("// Without a subcommand both servers are started."));
        assert!(content.contains("RunRpcArgs::default()"));
        assert!(content.contains("RunHttpArgs::default()"));
    }

    #[test]
    fn test_client_command() {
        let content = run(&ClientCmdGenerator);
        assert!(content.contains("crate::autogen::rpc::client::Client::connect("));
        assert!(content.contains("unknown method"));
    }
}
