//! svckit CLI library.
//!
//! Exposes the configuration loader, the commands and the output
//! formatters so they can be tested without spawning the binary.

#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::unnecessary_wraps)]

pub mod commands;
pub mod config;
pub mod formatters;

pub use config::{CONFIG_FILE, Config};
