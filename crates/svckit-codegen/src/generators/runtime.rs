//! Transport runtime (`src/autogen/mod.rs`).

use crate::builder::CodeBuilder;
use crate::generator::Generator;
use crate::meta::{Meta, Role};
use quote::quote;
use std::path::PathBuf;
use svckit_core::Result;

/// Generates the shared runtime: `Context`, `EndpointError`, the `Endpoint`
/// alias, the `Handler` trait and `dispatch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeGenerator;

impl Generator for RuntimeGenerator {
    fn name(&self) -> &'static str {
        "runtime"
    }

    fn target(&self, meta: &Meta) -> PathBuf {
        meta.target(Role::Autogen, "mod.rs")
    }

    fn generate(&self, meta: &Meta, builder: &mut CodeBuilder<'_>) -> Result<()> {
        builder.append_mod(&meta.module_name(Role::Http))?;
        builder.append_mod(&meta.module_name(Role::Rpc))?;

        builder.append_use("std::any::Any")?;
        builder.append_use("std::collections::BTreeMap")?;
        builder.append_use("std::fmt")?;
        builder.append_use("std::sync::Arc")?;

        builder.comment("Request-scoped values passed to every service method.");
        builder.append_tokens(quote! {
            #[derive(Debug, Clone, Default)]
            pub struct Context {
                pub method: String,
                pub metadata: BTreeMap<String, String>,
            }
        })?;

        builder.append_tokens(quote! {
            impl Context {
                pub fn new(method: impl Into<String>) -> Self {
                    Self {
                        method: method.into(),
                        metadata: BTreeMap::new(),
                    }
                }
            }
        })?;

        builder.comment("Failure raised by an endpoint, including type mismatches.");
        builder.append_tokens(quote! {
            #[derive(Debug, Clone, PartialEq, Eq)]
            pub struct EndpointError {
                pub message: String,
            }
        })?;

        builder.append_tokens(quote! {
            impl EndpointError {
                pub fn new(message: impl Into<String>) -> Self {
                    Self {
                        message: message.into(),
                    }
                }
            }
        })?;

        builder.append_tokens(quote! {
            impl EndpointError {
                pub fn service(err: impl fmt::Display) -> Self {
                    Self::new(err.to_string())
                }
            }
        })?;

        builder.append_tokens(quote! {
            impl fmt::Display for EndpointError {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.message)
                }
            }
        })?;

        builder.append_tokens(quote! {
            impl std::error::Error for EndpointError {}
        })?;

        builder.comment("A type-erased call into the service.");
        builder.append_tokens(quote! {
            pub type Endpoint = Box<
                dyn Fn(&Context, Box<dyn Any + Send>) -> Result<Box<dyn Any + Send>, EndpointError>
                    + Send
                    + Sync,
            >;
        })?;

        builder.append_tokens(quote! {
            pub trait Handler: Send + Sync {
                fn method_name(&self) -> &'static str;

                fn endpoint(&self, svc: Arc<dyn Any + Send + Sync>) -> Endpoint;

                fn decode(&self, request: Box<dyn Any + Send>) -> Result<Box<dyn Any + Send>, EndpointError>;

                fn encode(&self, response: Box<dyn Any + Send>) -> Result<Box<dyn Any + Send>, EndpointError>;
            }
        })?;

        builder.append_tokens(quote! {
            pub fn dispatch(
                handler: &dyn Handler,
                svc: Arc<dyn Any + Send + Sync>,
                ctx: &Context,
                request: Box<dyn Any + Send>,
            ) -> Result<Box<dyn Any + Send>, EndpointError> {
                let request = handler.decode(request)?;
                let endpoint = handler.endpoint(svc);
                let response = endpoint(ctx, request)?;
                handler.encode(response)
            }
        })?;

        Ok(())
    }
}
