//! Service implementation skeleton (`src/service/mod.rs`).

use super::{MethodShape, service_trait_path, shapes};
use crate::builder::{CodeBuilder, ident};
use crate::generator::Generator;
use crate::meta::{Meta, Role};
use quote::quote;
use std::path::PathBuf;
use svckit_core::Result;

/// Generates the struct the adapters dispatch into and a trait impl with
/// one `todo!()` body per method.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceGenerator;

impl Generator for ServiceGenerator {
    fn name(&self) -> &'static str {
        "service"
    }

    fn target(&self, meta: &Meta) -> PathBuf {
        meta.target(Role::Service, "mod.rs")
    }

    fn generate(&self, meta: &Meta, builder: &mut CodeBuilder<'_>) -> Result<()> {
        let service_impl = ident(meta.service_impl())?;
        let service_trait = service_trait_path(meta)?;

        builder.append_tokens(quote! {
            #[derive(Debug, Default)]
            pub struct #service_impl;
        })?;

        builder.append_tokens(quote! {
            impl #service_impl {
                pub fn new() -> Self {
                    Self
                }
            }
        })?;

        let methods = shapes(meta)?
            .into_iter()
            .map(|shape| {
                let MethodShape {
                    name,
                    request,
                    response,
                    error,
                    context,
                    ..
                } = shape;
                let todo = format!("implement {name}");
                quote! {
                    fn #name(&self, _ctx: #context, _request: #request) -> Result<#response, #error> {
                        todo!(#todo)
                    }
                }
            })
            .collect::<Vec<_>>();

        builder.comment(&format!(
            "Fill in the methods of {}. Methods added to the trait later are not\nappended here; add them by hand.",
            meta.interface().name
        ));
        builder.append_tokens(quote! {
            impl #service_trait for #service_impl {
                #(#methods)*
            }
        })?;

        Ok(())
    }
}
