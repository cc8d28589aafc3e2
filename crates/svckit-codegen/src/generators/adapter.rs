//! Per-method transport adapters.
//!
//! Every interface method gets one adapter file per transport. The adapter
//! narrows the type-erased service handle and request back to their
//! concrete types at runtime and reports a mismatch as an `EndpointError`
//! instead of panicking.

use super::{MethodShape, item_in, service_impl_path};
use crate::builder::{CodeBuilder, ident};
use crate::generator::Generator;
use crate::meta::{Meta, Role};
use quote::quote;
use std::fmt;
use std::path::PathBuf;
use svckit_core::Result;
use svckit_introspector::Method;

/// Transport an adapter is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// RPC adapters (`MEndpoint`)
    Rpc,
    /// HTTP adapters (`MHandler`)
    Http,
}

impl Transport {
    /// Output role of the adapter files.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Rpc => Role::Rpc,
            Self::Http => Role::Http,
        }
    }

    /// Suffix of the adapter type name.
    #[must_use]
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Rpc => "Endpoint",
            Self::Http => "Handler",
        }
    }

    /// Transport name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rpc => "rpc",
            Self::Http => "http",
        }
    }

    /// Adapter type name for a canonical method name.
    #[must_use]
    pub fn adapter_name(&self, canonical: &str) -> String {
        format!("{canonical}{}", self.suffix())
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generates `src/autogen/<transport>/<method>.rs`.
#[derive(Debug, Clone)]
pub struct MethodAdapterGenerator {
    transport: Transport,
    method: Method,
}

impl MethodAdapterGenerator {
    /// Creates the adapter generator of `method` for `transport`.
    #[must_use]
    pub const fn new(transport: Transport, method: Method) -> Self {
        Self { transport, method }
    }
}

impl Generator for MethodAdapterGenerator {
    fn name(&self) -> &'static str {
        match self.transport {
            Transport::Rpc => "rpc_method",
            Transport::Http => "http_method",
        }
    }

    fn target(&self, meta: &Meta) -> PathBuf {
        meta.target(
            self.transport.role(),
            &format!("{}.rs", self.method.name().file_stem()),
        )
    }

    fn generate(&self, meta: &Meta, builder: &mut CodeBuilder<'_>) -> Result<()> {
        let shape = MethodShape::new(meta, &self.method)?;
        let adapter_name = self.transport.adapter_name(&shape.canonical);
        let adapter = ident(&adapter_name)?;
        let service_impl = service_impl_path(meta)?;
        let MethodShape {
            name: method,
            canonical,
            request,
            response,
            ..
        } = &shape;
        let ctx_arg = shape.ctx_arg();

        builder.append_use("std::any::Any")?;
        builder.append_use("std::sync::Arc")?;
        for name in ["Context", "Endpoint", "EndpointError", "Handler"] {
            builder.append_use(&item_in(meta, Role::Autogen, name))?;
        }
        builder.append_use(&meta.interface().qualified_name())?;

        for line in self.method.docs() {
            builder.comment(line.trim());
        }
        builder.append_tokens(quote! {
            #[derive(Debug, Clone, Copy, Default)]
            pub struct #adapter;
        })?;

        builder.append_function(
            "name",
            Some(&adapter_name),
            &[],
            &["&'static str"],
            quote!(#canonical),
        )?;

        if self.transport == Transport::Http {
            let route = format!("/{}", shape.stem);
            builder.append_function("path", Some(&adapter_name), &[], &["&'static str"], quote!(#route))?;
        }

        builder.append_tokens(quote! {
            impl #adapter {
                pub fn make_endpoint(&self, svc: Arc<dyn Any + Send + Sync>) -> Endpoint {
                    Box::new(move |ctx: &Context, request: Box<dyn Any + Send>| {
                        let Some(s) = svc.downcast_ref::<#service_impl>() else {
                            return Err(EndpointError::new("invalid service"));
                        };
                        let Ok(req) = request.downcast::<#request>() else {
                            return Err(EndpointError::new("invalid service request"));
                        };
                        let resp = s.#method(#ctx_arg, *req).map_err(EndpointError::service)?;
                        Ok(Box::new(resp) as Box<dyn Any + Send>)
                    })
                }
            }
        })?;

        builder.append_tokens(quote! {
            impl #adapter {
                pub fn decode_request(
                    &self,
                    request: Box<dyn Any + Send>,
                ) -> Result<Box<dyn Any + Send>, EndpointError> {
                    match request.downcast::<#request>() {
                        Ok(req) => Ok(req as Box<dyn Any + Send>),
                        Err(_) => Err(EndpointError::new("invalid service request")),
                    }
                }
            }
        })?;

        builder.append_tokens(quote! {
            impl #adapter {
                pub fn encode_response(
                    &self,
                    response: Box<dyn Any + Send>,
                ) -> Result<Box<dyn Any + Send>, EndpointError> {
                    match response.downcast::<#response>() {
                        Ok(resp) => Ok(resp as Box<dyn Any + Send>),
                        Err(_) => Err(EndpointError::new("invalid service response")),
                    }
                }
            }
        })?;

        builder.append_tokens(quote! {
            impl Handler for #adapter {
                fn method_name(&self) -> &'static str {
                    self.name()
                }

                fn endpoint(&self, svc: Arc<dyn Any + Send + Sync>) -> Endpoint {
                    self.make_endpoint(svc)
                }

                fn decode(&self, request: Box<dyn Any + Send>) -> Result<Box<dyn Any + Send>, EndpointError> {
                    self.decode_request(request)
                }

                fn encode(&self, response: Box<dyn Any + Send>) -> Result<Box<dyn Any + Send>, EndpointError> {
                    self.encode_response(response)
                }
            }
        })?;

        Ok(())
    }
}
