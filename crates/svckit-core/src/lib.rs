//! Core types and errors for svckit.
//!
//! This crate provides the foundational types shared by every other crate
//! in the workspace.
//!
//! # Architecture
//!
//! - Error taxonomy: model, merge and generation failures
//! - Strong domain types (`AppName`, `MethodName`)
//! - Identifier case conversions
//! - CLI value types (`OutputFormat`, `ExitCode`)

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod error;
mod types;

pub mod cli;
pub mod naming;

pub use error::{Error, GenerationError, MergeError, ModelError, Result};
pub use types::{AppName, MethodName};
