//! Interface model types.
//!
//! The model is built once per run and shared read-only by every generator.

use serde::Serialize;
use std::collections::BTreeMap;
use svckit_core::{MethodName, ModelError};

/// A typed parameter or result of a service method.
#[derive(Debug, Clone, Serialize)]
pub struct Param {
    /// Binding name (`ctx`, `request`) or role name for results
    /// (`response`, `err`).
    pub name: String,
    /// Type as written in the trait, normalized to compact source text.
    pub ty: String,
    #[serde(skip)]
    parsed: syn::Type,
}

impl Param {
    /// Creates a parameter from a parsed type.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: syn::Type) -> Self {
        Self {
            name: name.into(),
            ty: type_text(&ty),
            parsed: ty,
        }
    }

    /// Returns the parsed type.
    #[must_use]
    pub const fn parsed(&self) -> &syn::Type {
        &self.parsed
    }

    /// Returns the type with any outer references stripped.
    #[must_use]
    pub fn base_type(&self) -> &syn::Type {
        strip_references(&self.parsed)
    }

    /// Returns `true` if the parameter is taken by reference.
    #[must_use]
    pub const fn is_ref(&self) -> bool {
        matches!(self.parsed, syn::Type::Reference(_))
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

impl Eq for Param {}

/// One method of the service interface.
///
/// Always has a context parameter, a request parameter, a response type and
/// an error type. The constructor enforces this, so the accessors never
/// fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Method {
    name: MethodName,
    params: Vec<Param>,
    results: Vec<Param>,
    docs: Vec<String>,
}

impl Method {
    /// Creates a method from its parameters (excluding `self`) and its
    /// `Ok`/`Err` result types.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::UnsupportedSignature` if there are fewer than
    /// two parameters or the results are not exactly a response and an
    /// error.
    pub fn new(
        name: impl Into<MethodName>,
        params: Vec<Param>,
        results: Vec<Param>,
        docs: Vec<String>,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        if params.len() < 2 {
            return Err(ModelError::UnsupportedSignature {
                method: name.to_string(),
                reason: "expected a Context parameter followed by a request parameter".to_string(),
            });
        }
        if results.len() != 2 {
            return Err(ModelError::UnsupportedSignature {
                method: name.to_string(),
                reason: "expected a response type and an error type".to_string(),
            });
        }
        Ok(Self {
            name,
            params,
            results,
            docs,
        })
    }

    /// Returns the method name as written in the trait.
    #[must_use]
    pub const fn name(&self) -> &MethodName {
        &self.name
    }

    /// Returns the canonical `PascalCase` name (`fetch` becomes `Fetch`).
    #[must_use]
    pub fn canonical_name(&self) -> String {
        self.name.canonical()
    }

    /// All parameters in declaration order, excluding `self`.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Results in order: response, then error.
    #[must_use]
    pub fn results(&self) -> &[Param] {
        &self.results
    }

    /// Doc comment lines of the method.
    #[must_use]
    pub fn docs(&self) -> &[String] {
        &self.docs
    }

    /// The context parameter.
    #[must_use]
    pub fn context(&self) -> &Param {
        &self.params[0]
    }

    /// The request parameter.
    #[must_use]
    pub fn request(&self) -> &Param {
        &self.params[1]
    }

    /// The success type.
    #[must_use]
    pub fn response(&self) -> &Param {
        &self.results[0]
    }

    /// The error type.
    #[must_use]
    pub fn error(&self) -> &Param {
        &self.results[1]
    }
}

/// The discovered service interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInterface {
    /// Trait name
    pub name: String,
    /// Module path of the trait (`crate::pb::hello`)
    pub module: String,
    /// Store path of the defining file
    pub source: String,
    /// Methods in source declaration order
    pub methods: Vec<Method>,
}

impl ServiceInterface {
    /// Returns the fully qualified trait path.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.module, self.name)
    }
}

/// Index of message types (structs and enums) found in the message tree.
///
/// Maps a bare type name to the module that defines it, so generated code
/// can refer to `FetchRequest` as `crate::pb::FetchRequest`.
///
/// # Examples
///
/// ```
/// use svckit_introspector::MessageIndex;
///
/// let mut index = MessageIndex::default();
/// index.insert("FetchRequest", "crate::pb");
///
/// assert_eq!(index.qualify("FetchRequest").as_deref(), Some("crate::pb::FetchRequest"));
/// assert_eq!(index.qualify("String"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageIndex {
    types: BTreeMap<String, String>,
}

impl MessageIndex {
    /// Records that `name` is defined in `module`.
    ///
    /// The first definition wins when a name appears in several modules.
    pub fn insert(&mut self, name: impl Into<String>, module: impl Into<String>) {
        self.types.entry(name.into()).or_insert_with(|| module.into());
    }

    /// Returns the module defining `name`.
    #[must_use]
    pub fn module_of(&self, name: &str) -> Option<&str> {
        self.types.get(name).map(String::as_str)
    }

    /// Returns the qualified path of `name`, if it is a known message type.
    #[must_use]
    pub fn qualify(&self, name: &str) -> Option<String> {
        self.module_of(name).map(|m| format!("{m}::{name}"))
    }

    /// Number of known message types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no message types are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Everything the generators need to know about the source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceModel {
    /// The service interface
    pub interface: ServiceInterface,
    /// Message types next to it
    pub messages: MessageIndex,
    /// Top-level modules of the message directory (file stems and
    /// subdirectories), in path order.
    pub source_modules: Vec<String>,
}

/// Removes outer `&` / `&mut` and parentheses from a type.
#[must_use]
pub fn strip_references(ty: &syn::Type) -> &syn::Type {
    match ty {
        syn::Type::Reference(r) => strip_references(&r.elem),
        syn::Type::Paren(p) => strip_references(&p.elem),
        syn::Type::Group(g) => strip_references(&g.elem),
        other => other,
    }
}

/// Renders a type as compact source text (`Vec<u8>`, `&Context`).
///
/// # Examples
///
/// ```
/// use svckit_introspector::type_text;
///
/// let ty: syn::Type = syn::parse_str("& std :: vec :: Vec < u8 >").unwrap();
/// assert_eq!(type_text(&ty), "&std::vec::Vec<u8>");
/// ```
#[must_use]
pub fn type_text(ty: &syn::Type) -> String {
    tokens_text(&quote::ToTokens::to_token_stream(ty))
}

/// Renders a token stream as compact source text.
///
/// Drops the spaces `proc_macro2` puts around path separators, generic
/// brackets, commas and braces.
#[must_use]
pub fn tokens_text(tokens: &proc_macro2::TokenStream) -> String {
    let raw = tokens.to_string();
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut prev: Option<char> = None;

    while let Some(ch) = chars.next() {
        if ch == ' ' {
            let next = chars.peek().copied();
            let glue_prev = matches!(prev, Some('&' | '<' | ':' | '(' | '[' | '{'));
            let glue_next = matches!(next, Some('<' | '>' | ':' | ',' | ';' | ')' | ']' | '}'));
            if glue_prev || glue_next {
                continue;
            }
        }
        out.push(ch);
        prev = Some(ch);
    }

    out
}
