//! Crate wiring: the message module index and `main.rs`.

use crate::builder::{CodeBuilder, ident};
use crate::generator::Generator;
use crate::meta::{Meta, Role};
use quote::quote;
use std::path::PathBuf;
use svckit_core::Result;

/// Generates `src/pb/mod.rs`, declaring every module of the message tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct PbModGenerator;

impl Generator for PbModGenerator {
    fn name(&self) -> &'static str {
        "pb_mod"
    }

    fn target(&self, meta: &Meta) -> PathBuf {
        meta.target(Role::Pb, "mod.rs")
    }

    fn generate(&self, meta: &Meta, builder: &mut CodeBuilder<'_>) -> Result<()> {
        for module in &meta.model().source_modules {
            builder.append_mod(module)?;
        }
        Ok(())
    }
}

/// Generates `src/main.rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MainGenerator;

impl MainGenerator {
    const MODULES: [Role; 5] = [Role::Autogen, Role::Cmd, Role::Global, Role::Pb, Role::Service];
}

impl Generator for MainGenerator {
    fn name(&self) -> &'static str {
        "main"
    }

    fn target(&self, meta: &Meta) -> PathBuf {
        meta.target(Role::Root, "main.rs")
    }

    fn generate(&self, meta: &Meta, builder: &mut CodeBuilder<'_>) -> Result<()> {
        let mut modules: Vec<String> = Self::MODULES.iter().map(|role| meta.module_name(*role)).collect();
        modules.sort();

        for module in &modules {
            let module = ident(module)?;
            builder.append_tokens(quote!(mod #module;))?;
        }

        let cmd = ident(&meta.module_name(Role::Cmd))?;
        builder.append_tokens(quote! {
            fn main() {
                if let Err(err) = #cmd::execute() {
                    eprintln!("error: {err}");
                    std::process::exit(1);
                }
            }
        })?;

        Ok(())
    }
}
