//! Structural code builder.
//!
//! Generators assemble declarations through a [`CodeBuilder`], which
//! validates names and types through `syn`, attaches pending comment lines
//! and offers the result to the merge pass of the current target file.
//!
//! # Examples
//!
//! ```
//! use quote::quote;
//! use svckit_codegen::CodeBuilder;
//! use svckit_codegen::merge::{MergeFile, Offer};
//! use svckit_files::VirtualPath;
//!
//! let path = VirtualPath::new("src/service/mod.rs").unwrap();
//! let mut file = MergeFile::from_source(path, None).unwrap();
//! let mut builder = CodeBuilder::new(&mut file);
//!
//! builder.comment("Service implementation.");
//! builder.append_struct("ServiceImpl", &[]).unwrap();
//! let offer = builder
//!     .append_function("new", Some("ServiceImpl"), &[], &["Self"], quote!(Self))
//!     .unwrap();
//! assert_eq!(offer, Offer::Queued);
//!
//! let outcome = file.into_outcome();
//! assert!(outcome.content.starts_with(
//!     "// Service implementation.\n#[derive(Debug, Clone, Copy, Default)]\npub struct ServiceImpl;"
//! ));
//! ```

use crate::decl::{DeclKey, Declaration, parse_item};
use crate::merge::{MergeFile, Offer};
use proc_macro2::TokenStream;
use quote::quote;
use svckit_core::{GenerationError, Result};

/// Parses `name` as an identifier.
///
/// # Errors
///
/// Returns `GenerationError::InvalidIdentifier` for anything that is not a
/// plain identifier, including keywords.
pub fn ident(name: &str) -> Result<syn::Ident> {
    syn::parse_str::<syn::Ident>(name).map_err(|_| {
        GenerationError::InvalidIdentifier {
            name: name.to_string(),
        }
        .into()
    })
}

/// Parses `ty` as a type.
///
/// # Errors
///
/// Returns `GenerationError::InvalidType` if it does not parse.
pub fn parse_type(ty: &str) -> Result<syn::Type> {
    syn::parse_str::<syn::Type>(ty).map_err(|e| {
        GenerationError::InvalidType {
            ty: ty.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Assembles declarations for one merge pass.
#[derive(Debug)]
pub struct CodeBuilder<'a> {
    file: &'a mut MergeFile,
    pending: Vec<String>,
}

impl<'a> CodeBuilder<'a> {
    /// Creates a builder over an open merge pass.
    pub fn new(file: &'a mut MergeFile) -> Self {
        Self {
            file,
            pending: Vec::new(),
        }
    }

    /// Returns `true` if a declaration with this key already exists in the
    /// target file.
    #[must_use]
    pub fn find(&self, key: &DeclKey) -> bool {
        self.file.find(key)
    }

    /// Queues a `//` comment for the next declaration.
    ///
    /// Multi-line text becomes one comment line per line.
    pub fn comment(&mut self, text: &str) -> &mut Self {
        for line in text.lines() {
            if line.is_empty() {
                self.pending.push("//".to_string());
            } else {
                self.pending.push(format!("// {line}"));
            }
        }
        self
    }

    /// Queues a blank line for the next declaration.
    ///
    /// Blank lines only separate comment lines; separators between
    /// declarations are fixed at one blank line.
    pub fn new_line(&mut self) -> &mut Self {
        self.pending.push(String::new());
        self
    }

    /// Offers a pre-built item.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::UnsupportedItem` if the item has no
    /// identity and `GenerationError::DuplicateDeclaration` if its key was
    /// already offered in this pass.
    pub fn append_item(&mut self, item: syn::Item) -> Result<Offer> {
        let leading = std::mem::take(&mut self.pending);
        let decl = Declaration::new(item)?.with_leading(leading);
        self.file.offer(decl)
    }

    /// Offers an item built with `quote!`.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::MalformedFragment` if the tokens are not
    /// exactly one item, plus the errors of [`append_item`](Self::append_item).
    pub fn append_tokens(&mut self, tokens: TokenStream) -> Result<Offer> {
        let item = parse_item(tokens)?;
        self.append_item(item)
    }

    /// Offers a source fragment holding exactly one item.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::MalformedFragment` if the fragment does not
    /// parse as one item.
    pub fn append_raw(&mut self, source: &str) -> Result<Offer> {
        let item = syn::parse_str::<syn::Item>(source).map_err(|e| GenerationError::MalformedFragment {
            message: e.to_string(),
        })?;
        self.append_item(item)
    }

    /// Offers `use <path>;`.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::InvalidType` if the path does not parse.
    pub fn append_use(&mut self, path: &str) -> Result<Offer> {
        let tree = syn::parse_str::<syn::UseTree>(path).map_err(|e| GenerationError::InvalidType {
            ty: path.to_string(),
            message: e.to_string(),
        })?;
        self.append_tokens(quote!(use #tree;))
    }

    /// Offers `pub mod <name>;`.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::InvalidIdentifier` if `name` is not an
    /// identifier.
    pub fn append_mod(&mut self, name: &str) -> Result<Offer> {
        let name = ident(name)?;
        self.append_tokens(quote!(pub mod #name;))
    }

    /// Offers a public struct: a unit struct when `fields` is empty,
    /// otherwise one with named public fields.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::InvalidIdentifier` or `InvalidType` for bad
    /// names or field types.
    pub fn append_struct(&mut self, name: &str, fields: &[(&str, &str)]) -> Result<Offer> {
        let name = ident(name)?;
        if fields.is_empty() {
            return self.append_tokens(quote! {
                #[derive(Debug, Clone, Copy, Default)]
                pub struct #name;
            });
        }

        let fields = fields
            .iter()
            .map(|(field, ty)| {
                let field = ident(field)?;
                let ty = parse_type(ty)?;
                Ok(quote!(pub #field: #ty))
            })
            .collect::<Result<Vec<_>>>()?;

        self.append_tokens(quote! {
            #[derive(Debug, Clone, Default)]
            pub struct #name {
                #(#fields,)*
            }
        })
    }

    /// Offers a public function.
    ///
    /// With a receiver the function becomes a `&self` method wrapped in an
    /// `impl Receiver` block holding exactly that method. `results` lists
    /// return types: none is unit, one is returned as is, more form a
    /// tuple. `body` holds the statements.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::InvalidIdentifier` or `InvalidType` for bad
    /// names or types.
    pub fn append_function(
        &mut self,
        name: &str,
        receiver: Option<&str>,
        params: &[(&str, &str)],
        results: &[&str],
        body: TokenStream,
    ) -> Result<Offer> {
        let fn_name = ident(name)?;
        let params = params
            .iter()
            .map(|(param, ty)| {
                let param = ident(param)?;
                let ty = parse_type(ty)?;
                Ok(quote!(#param: #ty))
            })
            .collect::<Result<Vec<_>>>()?;
        let results = results
            .iter()
            .map(|ty| parse_type(ty))
            .collect::<Result<Vec<_>>>()?;

        let output = match results.as_slice() {
            [] => quote!(),
            [single] => quote!(-> #single),
            many => quote!(-> (#(#many),*)),
        };

        match receiver {
            None => self.append_tokens(quote! {
                pub fn #fn_name(#(#params),*) #output {
                    #body
                }
            }),
            Some(receiver) => {
                let receiver = parse_type(receiver)?;
                self.append_tokens(quote! {
                    impl #receiver {
                        pub fn #fn_name(&self #(, #params)*) #output {
                            #body
                        }
                    }
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::DeclKind;
    use crate::merge::FileStatus;
    use svckit_files::VirtualPath;

    fn file(existing: Option<&str>) -> MergeFile {
        MergeFile::from_source(
            VirtualPath::new("src/lib.rs").unwrap(),
            existing.map(str::to_string),
        )
        .unwrap()
    }

    #[test]
    fn test_free_function_results() {
        let mut f = file(None);
        let mut b = CodeBuilder::new(&mut f);
        b.append_function("unit", None, &[], &[], quote!()).unwrap();
        b.append_function("one", None, &[("x", "u8")], &["u8"], quote!(x))
            .unwrap();
        b.append_function("two", None, &[], &["u8", "String"], quote!((1, String::new())))
            .unwrap();

        let content = f.into_outcome().content;
        assert!(content.contains("pub fn unit() {}"));
        assert!(content.contains("pub fn one(x: u8) -> u8 {\n    x\n}"));
        assert!(content.contains("pub fn two() -> (u8, String) {"));
    }

    #[test]
    fn test_method_wrapped_in_single_impl() {
        let mut f = file(None);
        let mut b = CodeBuilder::new(&mut f);
        b.append_function(
            "name",
            Some("FetchEndpoint"),
            &[],
            &["&'static str"],
            quote!("Fetch"),
        )
        .unwrap();

        let outcome = f.into_outcome();
        assert_eq!(
            outcome.added,
            vec![DeclKey::associated(DeclKind::Fn, "name", "FetchEndpoint")]
        );
        assert!(outcome.content.contains("impl FetchEndpoint {\n    pub fn name(&self) -> &'static str {"));
    }

    #[test]
    fn test_comment_precedes_unit_struct_derive() {
        let mut f = file(None);
        let mut b = CodeBuilder::new(&mut f);
        b.comment("Service implementation.");
        b.append_struct("ServiceImpl", &[]).unwrap();

        assert_eq!(
            f.into_outcome().content,
            "// Service implementation.\n#[derive(Debug, Clone, Copy, Default)]\npub struct ServiceImpl;\n"
        );
    }

    #[test]
    fn test_invalid_identifier() {
        let mut f = file(None);
        let mut b = CodeBuilder::new(&mut f);
        let err = b.append_struct("not valid", &[]).unwrap_err();
        assert!(err.is_generation_error());
        assert!(b.append_mod("match").is_err());
    }

    #[test]
    fn test_invalid_type() {
        let mut f = file(None);
        let mut b = CodeBuilder::new(&mut f);
        let err = b
            .append_function("f", None, &[("x", "Vec<")], &[], quote!())
            .unwrap_err();
        assert!(err.to_string().contains("Vec<"));
    }

    #[test]
    fn test_malformed_raw_fragment() {
        let mut f = file(None);
        let mut b = CodeBuilder::new(&mut f);
        assert!(b.append_raw("struct A; struct B;").is_err());
        assert!(b.append_raw("fn (").is_err());
        assert_eq!(b.append_raw("struct A;").unwrap(), Offer::Queued);
    }

    #[test]
    fn test_struct_with_fields() {
        let mut f = file(None);
        let mut b = CodeBuilder::new(&mut f);
        b.append_struct("Config", &[("address", "String"), ("port", "u16")])
            .unwrap();
        let content = f.into_outcome().content;
        assert!(content.contains("pub address: String,"));
        assert!(content.contains("pub port: u16,"));
    }

    #[test]
    fn test_comments_dropped_with_skipped_declaration() {
        let mut f = file(Some("pub mod rpc;\n"));
        let mut b = CodeBuilder::new(&mut f);
        b.comment("transport modules");
        assert_eq!(b.append_mod("rpc").unwrap(), Offer::AlreadyPresent);
        b.append_mod("http").unwrap();
        b.comment("dangling");

        let outcome = f.into_outcome();
        assert_eq!(outcome.content, "pub mod rpc;\n\npub mod http;\n");
        assert_eq!(outcome.status, FileStatus::Updated { added: 1 });
    }

    #[test]
    fn test_use_idempotent() {
        let mut f = file(Some("use std::sync::Arc;\n"));
        let mut b = CodeBuilder::new(&mut f);
        assert_eq!(b.append_use("std::sync::Arc").unwrap(), Offer::AlreadyPresent);
        assert_eq!(b.append_use("std::any::Any").unwrap(), Offer::Queued);
    }
}
