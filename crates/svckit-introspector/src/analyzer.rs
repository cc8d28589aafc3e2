//! Method signature analysis.
//!
//! Turns the methods of a service trait into [`Method`] records, rejecting
//! every shape the transport adapters cannot call.

use crate::types::{Method, Param, strip_references};
use svckit_core::ModelError;
use syn::{FnArg, GenericArgument, Pat, PathArguments, ReturnType, TraitItem, Type};

fn unsupported(method: &str, reason: impl Into<String>) -> ModelError {
    ModelError::UnsupportedSignature {
        method: method.to_string(),
        reason: reason.into(),
    }
}

/// Last path segment of a type, with references stripped.
fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match strip_references(ty) {
        Type::Path(p) if p.qself.is_none() => p.path.segments.last(),
        _ => None,
    }
}

/// Returns `true` if the type is context-like (`Context`, `&Context`,
/// `crate::autogen::Context`).
#[must_use]
pub fn is_context_type(ty: &Type) -> bool {
    last_segment(ty).is_some_and(|seg| seg.ident == "Context")
}

fn doc_lines(attrs: &[syn::Attribute]) -> Vec<String> {
    attrs
        .iter()
        .filter(|a| a.path().is_ident("doc"))
        .filter_map(|a| match &a.meta {
            syn::Meta::NameValue(nv) => match &nv.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s),
                    ..
                }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

fn binding_name(pat: &Pat, position: usize) -> String {
    match pat {
        Pat::Ident(id) => id.ident.to_string(),
        _ => format!("arg{position}"),
    }
}

/// Splits `Result<S, E>` into its two type arguments.
fn result_types<'a>(method: &str, output: &'a ReturnType) -> Result<(&'a Type, &'a Type), ModelError> {
    let ReturnType::Type(_, ty) = output else {
        return Err(unsupported(method, "must return Result<Response, Error>"));
    };

    let segment = last_segment(ty)
        .filter(|seg| seg.ident == "Result")
        .ok_or_else(|| unsupported(method, "must return Result<Response, Error>"))?;

    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return Err(unsupported(method, "Result must name both response and error types"));
    };

    let types: Vec<&Type> = args
        .args
        .iter()
        .filter_map(|arg| match arg {
            GenericArgument::Type(t) => Some(t),
            _ => None,
        })
        .collect();

    match types.as_slice() {
        [response, error] => Ok((*response, *error)),
        _ => Err(unsupported(method, "Result must name both response and error types")),
    }
}

/// Analyzes one trait method.
///
/// # Errors
///
/// Returns `ModelError::UnsupportedSignature` when the method is not of the
/// form `fn m(&self, ctx: &Context, request: R) -> Result<S, E>`.
pub fn analyze_method(item: &syn::TraitItemFn) -> Result<Method, ModelError> {
    let sig = &item.sig;
    let name = sig.ident.to_string();

    if sig.asyncness.is_some() {
        return Err(unsupported(&name, "async methods are not supported"));
    }
    if !sig.generics.params.is_empty() {
        return Err(unsupported(&name, "generic methods are not supported"));
    }

    let mut inputs = sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(recv)) if recv.reference.is_some() && recv.mutability.is_none() => {}
        Some(FnArg::Receiver(_)) => return Err(unsupported(&name, "receiver must be &self")),
        _ => return Err(unsupported(&name, "must take &self")),
    }

    let mut params = Vec::new();
    for (position, arg) in inputs.enumerate() {
        let FnArg::Typed(typed) = arg else {
            return Err(unsupported(&name, "unexpected receiver"));
        };
        params.push(Param::new(
            binding_name(&typed.pat, position),
            (*typed.ty).clone(),
        ));
    }

    match params.as_slice() {
        [ctx, request, ..] => {
            if !is_context_type(ctx.parsed()) {
                return Err(unsupported(
                    &name,
                    format!("first parameter must be a Context, found {}", ctx.ty),
                ));
            }
            if matches!(ctx.parsed(), Type::Reference(r) if r.mutability.is_some()) {
                return Err(unsupported(&name, "context must not be taken by &mut"));
            }
            if request.is_ref() {
                return Err(unsupported(&name, "request must be taken by value"));
            }
            if is_context_type(request.parsed()) {
                return Err(unsupported(&name, "second parameter must be the request"));
            }
        }
        _ => {
            return Err(unsupported(
                &name,
                "expected a Context parameter followed by a request parameter",
            ));
        }
    }
    if params.len() > 2 {
        return Err(unsupported(&name, "only a context and a request parameter are supported"));
    }

    let (response, error) = result_types(&name, &sig.output)?;
    let results = vec![
        Param::new("response", response.clone()),
        Param::new("err", error.clone()),
    ];

    Method::new(name, params, results, doc_lines(&item.attrs))
}

/// Analyzes every method of a trait, in declaration order.
///
/// Associated types and constants are skipped.
///
/// # Errors
///
/// Returns the first `ModelError::UnsupportedSignature` encountered.
pub fn analyze_trait(item: &syn::ItemTrait) -> Result<Vec<Method>, ModelError> {
    let mut methods = Vec::new();
    for trait_item in &item.items {
        match trait_item {
            TraitItem::Fn(f) => methods.push(analyze_method(f)?),
            other => {
                tracing::warn!(
                    "skipping non-method item in {}: {}",
                    item.ident,
                    quote::ToTokens::to_token_stream(other)
                );
            }
        }
    }
    Ok(methods)
}
