//! Concrete generators.
//!
//! Fixed-shape generators own one file each; method adapters are
//! instantiated once per interface method and transport.

mod adapter;
mod bootstrap;
mod cmd;
mod global;
mod registry;
mod runtime;
mod service;

pub use adapter::{MethodAdapterGenerator, Transport};
pub use bootstrap::{MainGenerator, PbModGenerator};
pub use cmd::{ClientCmdGenerator, CmdRootGenerator, RunCmdGenerator, RunServerCmdGenerator};
pub use global::{ConfigGenerator, GlobalModGenerator};
pub use registry::{HttpRegistryGenerator, RpcClientGenerator, RpcRegistryGenerator};
pub use runtime::RuntimeGenerator;
pub use service::ServiceGenerator;

use crate::builder::{ident, parse_type};
use crate::generator::Generator;
use crate::meta::{Meta, Role};
use proc_macro2::TokenStream;
use quote::quote;
use svckit_core::{GenerationError, Result};
use svckit_introspector::Method;

/// Fixed-shape generators in run order.
#[must_use]
pub fn fixed() -> Vec<Box<dyn Generator>> {
    vec![
        Box::new(ServiceGenerator),
        Box::new(RuntimeGenerator),
        Box::new(RpcRegistryGenerator),
        Box::new(RpcClientGenerator),
        Box::new(HttpRegistryGenerator),
        Box::new(ConfigGenerator),
        Box::new(GlobalModGenerator),
        Box::new(CmdRootGenerator),
        Box::new(RunCmdGenerator),
        Box::new(RunServerCmdGenerator::new(Transport::Rpc)),
        Box::new(RunServerCmdGenerator::new(Transport::Http)),
        Box::new(ClientCmdGenerator),
        Box::new(PbModGenerator),
        Box::new(MainGenerator),
    ]
}

/// One adapter generator per method for `transport`, in method order.
#[must_use]
pub fn adapters(meta: &Meta, transport: Transport) -> Vec<Box<dyn Generator>> {
    meta.methods()
        .iter()
        .map(|method| Box::new(MethodAdapterGenerator::new(transport, method.clone())) as Box<dyn Generator>)
        .collect()
}

pub(crate) fn parse_path(text: &str) -> Result<syn::Path> {
    syn::parse_str::<syn::Path>(text).map_err(|e| {
        GenerationError::InvalidType {
            ty: text.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Module path of a role directory as a `syn::Path`.
pub(crate) fn module_path(meta: &Meta, role: Role) -> Result<syn::Path> {
    parse_path(&meta.module(role))
}

/// `crate::<module>::<name>` rendered as text for `use` items.
pub(crate) fn item_in(meta: &Meta, role: Role, name: &str) -> String {
    format!("{}::{name}", meta.module(role))
}

pub(crate) fn service_trait_path(meta: &Meta) -> Result<syn::Path> {
    parse_path(&meta.interface().qualified_name())
}

pub(crate) fn service_impl_path(meta: &Meta) -> Result<syn::Path> {
    parse_path(&item_in(meta, Role::Service, meta.service_impl()))
}

/// Generated view of one interface method.
#[derive(Debug, Clone)]
pub(crate) struct MethodShape {
    pub name: syn::Ident,
    pub canonical: String,
    pub stem: String,
    pub request: syn::Type,
    pub response: syn::Type,
    pub error: syn::Type,
    pub context: syn::Type,
    ctx_by_ref: bool,
}

impl MethodShape {
    pub fn new(meta: &Meta, method: &Method) -> Result<Self> {
        let runtime = meta.module(Role::Autogen);
        let ctx_by_ref = method.context().is_ref();
        let context = if ctx_by_ref {
            parse_type(&format!("&{runtime}::Context"))?
        } else {
            parse_type(&format!("{runtime}::Context"))?
        };

        Ok(Self {
            name: ident(method.name().as_str())?,
            canonical: method.canonical_name(),
            stem: method.name().file_stem(),
            request: meta.qualify(method.request().parsed()),
            response: meta.qualify(method.response().parsed()),
            error: meta.qualify(method.error().parsed()),
            context,
            ctx_by_ref,
        })
    }

    pub fn module(&self) -> Result<syn::Ident> {
        ident(&self.stem)
    }

    /// Context argument for a call made from inside an endpoint, where
    /// `ctx` is a `&Context`.
    pub fn ctx_arg(&self) -> TokenStream {
        if self.ctx_by_ref {
            quote!(ctx)
        } else {
            quote!(ctx.clone())
        }
    }
}

pub(crate) fn shapes(meta: &Meta) -> Result<Vec<MethodShape>> {
    meta.methods()
        .iter()
        .map(|method| MethodShape::new(meta, method))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use svckit_introspector::type_text;

    #[test]
    fn test_method_shape() {
        let meta = fixtures::meta();
        let shapes = shapes(&meta).unwrap();
        assert_eq!(shapes.len(), 2);

        let fetch = &shapes[0];
        assert_eq!(fetch.canonical, "Fetch");
        assert_eq!(type_text(&fetch.request), "crate::pb::store::FetchRequest");
        assert_eq!(type_text(&fetch.context), "&crate::autogen::Context");
        assert_eq!(fetch.ctx_arg().to_string(), "ctx");

        let put = &shapes[1];
        assert_eq!(put.canonical, "PutRecord");
        assert_eq!(put.stem, "put_record");
        assert_eq!(type_text(&put.context), "crate::autogen::Context");
        assert!(put.ctx_arg().to_string().contains("clone"));
    }

    #[test]
    fn test_fixed_order() {
        let names: Vec<_> = fixed().iter().map(|g| g.name()).collect();
        assert_eq!(
            names,
            vec![
                "service",
                "runtime",
                "rpc_registry",
                "rpc_client",
                "http_registry",
                "config",
                "global_mod",
                "cmd_root",
                "run_cmd",
                "run_rpc_cmd",
                "run_http_cmd",
                "client_cmd",
                "pb_mod",
                "main",
            ]
        );
    }

    #[test]
    fn test_adapters_follow_method_order() {
        let meta = fixtures::meta();
        let targets: Vec<_> = adapters(&meta, Transport::Http)
            .iter()
            .map(|g| g.target(&meta))
            .collect();
        assert_eq!(
            targets,
            vec![
                std::path::PathBuf::from("src/autogen/http/fetch.rs"),
                std::path::PathBuf::from("src/autogen/http/put_record.rs"),
            ]
        );
    }
}
