//! Service interface introspection for svckit.
//!
//! Parses the hand-written message tree of a project, locates the service
//! trait and extracts its method signatures into an immutable model that
//! drives code generation.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod analyzer;
pub mod discovery;
pub mod types;

pub use discovery::{Introspector, IntrospectorOptions, module_path};
pub use types::{
    InterfaceModel, MessageIndex, Method, Param, ServiceInterface, strip_references, tokens_text, type_text,
};
