//! Declarations and their identity keys.
//!
//! A declaration is one top-level item of a target file. Its identity key
//! (kind, name, receiver) decides whether it is already present; content is
//! never compared.
//!
//! # Examples
//!
//! ```
//! use svckit_codegen::decl::{DeclKey, DeclKind, Declaration};
//!
//! let item: syn::Item = syn::parse_str("impl FetchEndpoint { pub fn name(&self) -> &'static str { \"Fetch\" } }").unwrap();
//! let decl = Declaration::new(item).unwrap();
//!
//! assert_eq!(decl.key(), &DeclKey::associated(DeclKind::Fn, "name", "FetchEndpoint"));
//! ```

use proc_macro2::TokenStream;
use quote::ToTokens;
use serde::Serialize;
use std::fmt;
use svckit_core::{GenerationError, Result};
use svckit_introspector::tokens_text;

/// Kind of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    /// `fn`
    Fn,
    /// `struct`
    Struct,
    /// `enum`
    Enum,
    /// `union`
    Union,
    /// `type` alias, free or associated
    TypeAlias,
    /// `const`
    Const,
    /// `static`
    Static,
    /// `trait`
    Trait,
    /// `mod`
    Mod,
    /// `use`
    Use,
    /// trait `impl` block
    Impl,
    /// `macro_rules!`
    Macro,
}

impl DeclKind {
    /// Returns the keyword used when rendering keys.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fn => "fn",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Union => "union",
            Self::TypeAlias => "type",
            Self::Const => "const",
            Self::Static => "static",
            Self::Trait => "trait",
            Self::Mod => "mod",
            Self::Use => "use",
            Self::Impl => "impl",
            Self::Macro => "macro_rules!",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity key of a declaration.
///
/// `receiver` is the `impl` self type for associated items and trait impls.
/// Two keys with the same name and different receivers are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DeclKey {
    /// Declaration kind
    pub kind: DeclKind,
    /// Item name, trait name for impls, normalized path for uses
    pub name: String,
    /// Self type of the enclosing impl
    pub receiver: Option<String>,
}

impl DeclKey {
    /// Key of a free item.
    #[must_use]
    pub fn free(kind: DeclKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            receiver: None,
        }
    }

    /// Key of an item inside `impl receiver`.
    #[must_use]
    pub fn associated(kind: DeclKind, name: impl Into<String>, receiver: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            receiver: Some(receiver.into()),
        }
    }
}

impl fmt::Display for DeclKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.receiver) {
            (DeclKind::Impl, Some(receiver)) => write!(f, "impl {} for {receiver}", self.name),
            (kind, Some(receiver)) => write!(f, "{kind} {receiver}::{}", self.name),
            (kind, None) => write!(f, "{kind} {}", self.name),
        }
    }
}

/// Last path segment of a type (`crate::a::Foo<T>` is `Foo`).
fn type_name(ty: &syn::Type) -> String {
    match ty {
        syn::Type::Path(p) if p.qself.is_none() => p
            .path
            .segments
            .last()
            .map_or_else(|| tokens_text(&ty.to_token_stream()), |s| s.ident.to_string()),
        syn::Type::Reference(r) => type_name(&r.elem),
        syn::Type::Paren(p) => type_name(&p.elem),
        other => tokens_text(&other.to_token_stream()),
    }
}

fn path_name(path: &syn::Path) -> String {
    path.segments
        .last()
        .map_or_else(|| tokens_text(&path.to_token_stream()), |s| s.ident.to_string())
}

/// Expands a use tree into one normalized path per leaf.
///
/// `std::{fmt, sync::Arc as A}` yields `std::fmt` and `std::sync::Arc as A`.
fn use_leaves(prefix: &str, tree: &syn::UseTree, out: &mut Vec<String>) {
    let join = |tail: &str| {
        if prefix.is_empty() || prefix.ends_with("::") {
            format!("{prefix}{tail}")
        } else {
            format!("{prefix}::{tail}")
        }
    };
    match tree {
        syn::UseTree::Path(p) => use_leaves(&join(&p.ident.to_string()), &p.tree, out),
        syn::UseTree::Name(n) => out.push(join(&n.ident.to_string())),
        syn::UseTree::Rename(r) => out.push(format!("{} as {}", join(&r.ident.to_string()), r.rename)),
        syn::UseTree::Glob(_) => out.push(join("*")),
        syn::UseTree::Group(g) => {
            for inner in &g.items {
                use_leaves(prefix, inner, out);
            }
        }
    }
}

fn leading_colon(item: &syn::ItemUse) -> &'static str {
    if item.leading_colon.is_some() { "::" } else { "" }
}

/// Every key an existing item contributes to a declaration index.
///
/// Trait impls contribute their own key plus one per associated item.
/// Inherent impls contribute one key per associated item. Nested modules
/// are keyed as a whole. Items without a name contribute nothing.
#[must_use]
pub fn index_keys(item: &syn::Item) -> Vec<DeclKey> {
    match item {
        syn::Item::Fn(f) => vec![DeclKey::free(DeclKind::Fn, f.sig.ident.to_string())],
        syn::Item::Struct(s) => vec![DeclKey::free(DeclKind::Struct, s.ident.to_string())],
        syn::Item::Enum(e) => vec![DeclKey::free(DeclKind::Enum, e.ident.to_string())],
        syn::Item::Union(u) => vec![DeclKey::free(DeclKind::Union, u.ident.to_string())],
        syn::Item::Type(t) => vec![DeclKey::free(DeclKind::TypeAlias, t.ident.to_string())],
        syn::Item::Const(c) => vec![DeclKey::free(DeclKind::Const, c.ident.to_string())],
        syn::Item::Static(s) => vec![DeclKey::free(DeclKind::Static, s.ident.to_string())],
        syn::Item::Trait(t) => vec![DeclKey::free(DeclKind::Trait, t.ident.to_string())],
        syn::Item::TraitAlias(t) => vec![DeclKey::free(DeclKind::Trait, t.ident.to_string())],
        syn::Item::Mod(m) => vec![DeclKey::free(DeclKind::Mod, m.ident.to_string())],
        syn::Item::Macro(m) => m
            .ident
            .as_ref()
            .map(|ident| DeclKey::free(DeclKind::Macro, ident.to_string()))
            .into_iter()
            .collect(),
        syn::Item::Use(u) => {
            let mut leaves = Vec::new();
            use_leaves(leading_colon(u), &u.tree, &mut leaves);
            leaves
                .into_iter()
                .map(|leaf| DeclKey::free(DeclKind::Use, leaf))
                .collect()
        }
        syn::Item::Impl(i) => impl_keys(i),
        _ => Vec::new(),
    }
}

fn impl_keys(item: &syn::ItemImpl) -> Vec<DeclKey> {
    let receiver = type_name(&item.self_ty);
    let mut keys = Vec::new();

    if let Some((_, trait_path, _)) = &item.trait_ {
        keys.push(DeclKey::associated(DeclKind::Impl, path_name(trait_path), &receiver));
    }

    for inner in &item.items {
        let key = match inner {
            syn::ImplItem::Fn(f) => DeclKey::associated(DeclKind::Fn, f.sig.ident.to_string(), &receiver),
            syn::ImplItem::Const(c) => DeclKey::associated(DeclKind::Const, c.ident.to_string(), &receiver),
            syn::ImplItem::Type(t) => DeclKey::associated(DeclKind::TypeAlias, t.ident.to_string(), &receiver),
            _ => continue,
        };
        keys.push(key);
    }

    keys
}

/// The identity key of an item offered for insertion.
///
/// # Errors
///
/// Returns `GenerationError::UnsupportedItem` if the item has no identity:
/// unnamed macros, verbatim tokens, extern blocks, `use` items with more
/// than one leaf, and inherent impls that do not hold exactly one item.
pub fn identity(item: &syn::Item) -> Result<DeclKey> {
    let unsupported = |reason: &str| -> svckit_core::Error {
        GenerationError::UnsupportedItem {
            reason: reason.to_string(),
        }
        .into()
    };

    match item {
        syn::Item::Impl(i) if i.trait_.is_none() => {
            let keys = impl_keys(i);
            match <[DeclKey; 1]>::try_from(keys) {
                Ok([key]) => Ok(key),
                Err(_) => Err(unsupported("inherent impl blocks must hold exactly one item")),
            }
        }
        syn::Item::Use(_) => {
            let keys = index_keys(item);
            match <[DeclKey; 1]>::try_from(keys) {
                Ok([key]) => Ok(key),
                Err(_) => Err(unsupported("use items must import exactly one path")),
            }
        }
        _ => index_keys(item)
            .into_iter()
            .next()
            .ok_or_else(|| unsupported("item has no name")),
    }
}

/// One generated declaration: an item plus the comment lines above it.
#[derive(Debug, Clone)]
pub struct Declaration {
    key: DeclKey,
    item: syn::Item,
    leading: Vec<String>,
}

impl Declaration {
    /// Wraps an item, computing its identity key.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::UnsupportedItem` if the item has no
    /// identity (see [`identity`]).
    pub fn new(item: syn::Item) -> Result<Self> {
        let key = identity(&item)?;
        Ok(Self {
            key,
            item,
            leading: Vec::new(),
        })
    }

    /// Attaches comment lines (already prefixed with `//`) or blank lines.
    #[must_use]
    pub fn with_leading(mut self, lines: Vec<String>) -> Self {
        self.leading = lines;
        self
    }

    /// Returns the identity key.
    #[must_use]
    pub const fn key(&self) -> &DeclKey {
        &self.key
    }

    /// Returns the item.
    #[must_use]
    pub const fn item(&self) -> &syn::Item {
        &self.item
    }

    /// Renders the declaration as formatted source text without a trailing
    /// newline.
    ///
    /// Leading and trailing blank comment lines are dropped.
    #[must_use]
    pub fn render(&self) -> String {
        let file = syn::File {
            shebang: None,
            attrs: Vec::new(),
            items: vec![self.item.clone()],
        };
        let body = prettyplease::unparse(&file);

        let start = self.leading.iter().position(|l| !l.is_empty());
        let end = self.leading.iter().rposition(|l| !l.is_empty());
        let mut out = String::new();
        if let (Some(start), Some(end)) = (start, end) {
            for line in &self.leading[start..=end] {
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push_str(body.trim_end());
        out
    }
}

/// Parses a token stream as exactly one item.
///
/// # Errors
///
/// Returns `GenerationError::MalformedFragment` if the tokens are not a
/// single item.
pub fn parse_item(tokens: TokenStream) -> Result<syn::Item> {
    syn::parse2::<syn::Item>(tokens).map_err(|e| {
        GenerationError::MalformedFragment {
            message: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(src: &str) -> syn::Item {
        syn::parse_str(src).unwrap()
    }

    #[test]
    fn test_free_items() {
        assert_eq!(
            index_keys(&item("pub fn handlers() {}")),
            vec![DeclKey::free(DeclKind::Fn, "handlers")]
        );
        assert_eq!(
            index_keys(&item("pub struct FetchEndpoint;")),
            vec![DeclKey::free(DeclKind::Struct, "FetchEndpoint")]
        );
        assert_eq!(
            index_keys(&item("pub type Endpoint = Box<dyn Fn()>;")),
            vec![DeclKey::free(DeclKind::TypeAlias, "Endpoint")]
        );
        assert_eq!(
            index_keys(&item("pub mod rpc;")),
            vec![DeclKey::free(DeclKind::Mod, "rpc")]
        );
        assert_eq!(
            index_keys(&item("macro_rules! m { () => {}; }")),
            vec![DeclKey::free(DeclKind::Macro, "m")]
        );
    }

    #[test]
    fn test_use_tree_expanded() {
        let keys = index_keys(&item("use std::{fmt, sync::{Arc, Mutex as M}, io::*};"));
        let names: Vec<_> = keys.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["std::fmt", "std::sync::Arc", "std::sync::Mutex as M", "std::io::*"]
        );
    }

    #[test]
    fn test_use_leading_colon() {
        let keys = index_keys(&item("use ::serde::Deserialize;"));
        assert_eq!(keys, vec![DeclKey::free(DeclKind::Use, "::serde::Deserialize")]);
    }

    #[test]
    fn test_use_visibility_ignored() {
        assert_eq!(
            index_keys(&item("pub use crate::autogen::Context;")),
            index_keys(&item("use crate::autogen::Context;"))
        );
    }

    #[test]
    fn test_inherent_impl_contributes_each_item() {
        let keys = index_keys(&item(
            "impl<T> crate::x::Foo<T> { fn a(&self) {} const B: u8 = 0; type C = u8; }",
        ));
        assert_eq!(
            keys,
            vec![
                DeclKey::associated(DeclKind::Fn, "a", "Foo"),
                DeclKey::associated(DeclKind::Const, "B", "Foo"),
                DeclKey::associated(DeclKind::TypeAlias, "C", "Foo"),
            ]
        );
    }

    #[test]
    fn test_trait_impl_keys() {
        let keys = index_keys(&item("impl fmt::Display for EndpointError { fn fmt(&self) {} }"));
        assert_eq!(
            keys,
            vec![
                DeclKey::associated(DeclKind::Impl, "Display", "EndpointError"),
                DeclKey::associated(DeclKind::Fn, "fmt", "EndpointError"),
            ]
        );
    }

    #[test]
    fn test_nested_module_not_descended() {
        let keys = index_keys(&item("mod tests { fn helper() {} }"));
        assert_eq!(keys, vec![DeclKey::free(DeclKind::Mod, "tests")]);
    }

    #[test]
    fn test_unnamed_items_ignored() {
        assert!(index_keys(&item("extern crate alloc;")).is_empty());
        assert!(index_keys(&item("extern \"C\" { fn abs(x: i32) -> i32; }")).is_empty());
        assert!(index_keys(&item("lazy_static! { static ref X: u8 = 0; }")).is_empty());
    }

    #[test]
    fn test_identity_rejects_multi_item_inherent_impl() {
        let err = identity(&item("impl Foo { fn a() {} fn b() {} }")).unwrap_err();
        assert!(err.is_generation_error());
    }

    #[test]
    fn test_identity_rejects_grouped_use() {
        assert!(identity(&item("use std::{fmt, io};")).is_err());
        assert!(identity(&item("use std::fmt;")).is_ok());
    }

    #[test]
    fn test_identity_of_trait_impl() {
        let key = identity(&item("impl Handler for FetchEndpoint { fn method_name(&self) {} }")).unwrap();
        assert_eq!(key, DeclKey::associated(DeclKind::Impl, "Handler", "FetchEndpoint"));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(DeclKey::free(DeclKind::Mod, "rpc").to_string(), "mod rpc");
        assert_eq!(
            DeclKey::associated(DeclKind::Fn, "name", "FetchEndpoint").to_string(),
            "fn FetchEndpoint::name"
        );
        assert_eq!(
            DeclKey::associated(DeclKind::Impl, "Handler", "FetchEndpoint").to_string(),
            "impl Handler for FetchEndpoint"
        );
    }

    #[test]
    fn test_render_with_comments() {
        let decl = Declaration::new(item("pub struct Client;"))
            .unwrap()
            .with_leading(vec![
                String::new(),
                "// first".to_string(),
                String::new(),
                "// second".to_string(),
                String::new(),
            ]);
        assert_eq!(decl.render(), "// first\n\n// second\npub struct Client;");
    }

    #[test]
    fn test_parse_item_rejects_two_items() {
        let tokens: TokenStream = "struct A; struct B;".parse().unwrap();
        assert!(parse_item(tokens).is_err());
    }
}
