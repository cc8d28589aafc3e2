//! Handler registries and the RPC client stub.
//!
//! Module declarations and client call methods are offered per method, so
//! they grow as the interface grows. The registry functions are offered
//! whole and stay as first written.

use super::{MethodShape, Transport, item_in, module_path, shapes};
use crate::builder::{CodeBuilder, ident};
use crate::generator::Generator;
use crate::meta::{Meta, Role};
use quote::quote;
use std::path::PathBuf;
use svckit_core::Result;

const REFRESH_HINT: &str = "Delete this function and re-run svckit to refresh the list.";

fn adapter_paths(shapes: &[MethodShape], transport: Transport) -> Result<Vec<proc_macro2::TokenStream>> {
    shapes
        .iter()
        .map(|shape| {
            let module = shape.module()?;
            let adapter = ident(&transport.adapter_name(&shape.canonical))?;
            Ok(quote!(#module::#adapter))
        })
        .collect()
}

/// Generates `src/autogen/rpc/mod.rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcRegistryGenerator;

impl Generator for RpcRegistryGenerator {
    fn name(&self) -> &'static str {
        "rpc_registry"
    }

    fn target(&self, meta: &Meta) -> PathBuf {
        meta.target(Role::Rpc, "mod.rs")
    }

    fn listings(&self) -> &'static [&'static str] {
        &["handlers"]
    }

    fn generate(&self, meta: &Meta, builder: &mut CodeBuilder<'_>) -> Result<()> {
        let shapes = shapes(meta)?;

        builder.append_mod("client")?;
        for shape in &shapes {
            builder.append_mod(&shape.stem)?;
        }

        builder.append_use(&item_in(meta, Role::Autogen, "Handler"))?;

        let adapters = adapter_paths(&shapes, Transport::Rpc)?;
        builder.comment(REFRESH_HINT);
        builder.append_tokens(quote! {
            pub fn handlers() -> Vec<Box<dyn Handler>> {
                vec![#(Box::new(#adapters)),*]
            }
        })?;

        builder.append_tokens(quote! {
            pub fn find(name: &str) -> Option<Box<dyn Handler>> {
                handlers().into_iter().find(|h| h.method_name() == name)
            }
        })?;

        Ok(())
    }
}

/// Generates `src/autogen/http/mod.rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpRegistryGenerator;

impl Generator for HttpRegistryGenerator {
    fn name(&self) -> &'static str {
        "http_registry"
    }

    fn target(&self, meta: &Meta) -> PathBuf {
        meta.target(Role::Http, "mod.rs")
    }

    fn listings(&self) -> &'static [&'static str] {
        &["routes"]
    }

    fn generate(&self, meta: &Meta, builder: &mut CodeBuilder<'_>) -> Result<()> {
        let shapes = shapes(meta)?;

        for shape in &shapes {
            builder.append_mod(&shape.stem)?;
        }

        builder.append_use(&item_in(meta, Role::Autogen, "Handler"))?;

        let adapters = adapter_paths(&shapes, Transport::Http)?;
        let paths: Vec<String> = shapes.iter().map(|s| format!("/{}", s.stem)).collect();
        builder.comment(REFRESH_HINT);
        builder.append_tokens(quote! {
            pub fn routes() -> Vec<(&'static str, Box<dyn Handler>)> {
                vec![#((#paths, Box::new(#adapters) as Box<dyn Handler>)),*]
            }
        })?;

        builder.append_tokens(quote! {
            pub fn handlers() -> Vec<Box<dyn Handler>> {
                routes().into_iter().map(|(_, handler)| handler).collect()
            }
        })?;

        builder.append_tokens(quote! {
            pub fn route(name: &str) -> Option<&'static str> {
                routes()
                    .into_iter()
                    .find(|(_, handler)| handler.method_name() == name)
                    .map(|(path, _)| path)
            }
        })?;

        Ok(())
    }
}

/// Generates `src/autogen/rpc/client.rs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcClientGenerator;

impl Generator for RpcClientGenerator {
    fn name(&self) -> &'static str {
        "rpc_client"
    }

    fn target(&self, meta: &Meta) -> PathBuf {
        meta.target(Role::Rpc, "client.rs")
    }

    fn generate(&self, meta: &Meta, builder: &mut CodeBuilder<'_>) -> Result<()> {
        let runtime = module_path(meta, Role::Autogen)?;
        let registry = module_path(meta, Role::Rpc)?;

        builder.append_use("std::any::Any")?;
        builder.append_use("std::sync::Arc")?;
        builder.append_use(&item_in(meta, Role::Autogen, "Context"))?;
        builder.append_use(&item_in(meta, Role::Autogen, "EndpointError"))?;

        builder.comment("In-process client calling the service through the RPC handlers.");
        builder.append_tokens(quote! {
            #[derive(Debug, Clone)]
            pub struct Client {
                service: Arc<dyn Any + Send + Sync>,
                ctx: Context,
            }
        })?;

        builder.append_tokens(quote! {
            impl Client {
                pub fn connect(service: Arc<dyn Any + Send + Sync>) -> Self {
                    Self {
                        service,
                        ctx: Context::default(),
                    }
                }
            }
        })?;

        builder.append_tokens(quote! {
            impl Client {
                fn call(
                    &self,
                    method: &str,
                    request: Box<dyn Any + Send>,
                ) -> Result<Box<dyn Any + Send>, EndpointError> {
                    let Some(handler) = #registry::find(method) else {
                        return Err(EndpointError::new(format!("unknown method {method}")));
                    };
                    let ctx = Context {
                        method: method.to_string(),
                        ..self.ctx.clone()
                    };
                    #runtime::dispatch(handler.as_ref(), Arc::clone(&self.service), &ctx, request)
                }
            }
        })?;

        for shape in shapes(meta)? {
            let MethodShape {
                name,
                canonical,
                request,
                response,
                ..
            } = &shape;
            builder.append_tokens(quote! {
                impl Client {
                    pub fn #name(&self, request: #request) -> Result<#response, EndpointError> {
                        let response = self.call(#canonical, Box::new(request))?;
                        match response.downcast::<#response>() {
                            Ok(resp) => Ok(*resp),
                            Err(_) => Err(EndpointError::new("invalid service response")),
                        }
                    }
                }
            })?;
        }

        Ok(())
    }
}
