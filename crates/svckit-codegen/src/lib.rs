//! Merge-aware code generation for svckit.
//!
//! Generates the transport adapters, runtime, command entry points and
//! service skeleton of a project from its service trait, and merges them
//! into files that may already exist without touching anything a developer
//! wrote.
//!
//! # Architecture
//!
//! - [`decl`]: declaration identity keys and rendering
//! - [`merge`]: the declaration index and the merge engine
//! - [`builder`]: structural assembly of declarations
//! - [`meta`]: the immutable run context
//! - [`generators`]: one generator per target file
//! - [`factory`]: the orchestrator and its report
//!
//! # Examples
//!
//! ```
//! use svckit_codegen::{GenerateOptions, ServiceFactory};
//! use svckit_files::{FileStore, MemoryStore, VirtualPath};
//!
//! let mut store = MemoryStore::new();
//! store
//!     .add_file(
//!         "src/pb/greeter.rs",
//!         "use crate::autogen::Context;
//!          pub struct GreetRequest { pub name: String }
//!          pub struct GreetResponse { pub text: String }
//!          pub struct Status;
//!          pub trait GreeterService {
//!              fn greet(&self, ctx: &Context, request: GreetRequest) -> Result<GreetResponse, Status>;
//!          }",
//!     )
//!     .unwrap();
//!
//! let mut factory = ServiceFactory::new("/work/greeter", &GenerateOptions::default(), &mut store).unwrap();
//! factory.create().unwrap();
//!
//! let adapter = store
//!     .read(&VirtualPath::new("src/autogen/rpc/greet.rs").unwrap())
//!     .unwrap()
//!     .unwrap();
//! assert!(adapter.contains("pub struct GreetEndpoint;"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod builder;
pub mod decl;
pub mod factory;
pub mod generator;
pub mod generators;
pub mod merge;
pub mod meta;

pub use builder::CodeBuilder;
pub use decl::{DeclKey, DeclKind, Declaration};
pub use factory::{FileReport, GenerationReport, ServiceFactory};
pub use generator::Generator;
pub use generators::Transport;
pub use merge::{FileStatus, MergeOutcome, Offer, merge};
pub use meta::{GenerateOptions, Layout, Meta, Role};
