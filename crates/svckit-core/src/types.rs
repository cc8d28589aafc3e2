//! Strong domain types for svckit.
//!
//! Names flow from the parsed interface into file names, type names and
//! string literals of generated code. Wrapping them keeps a method's source
//! name from being confused with its canonical or file-system form.
//!
//! # Examples
//!
//! ```
//! use svckit_core::{AppName, MethodName};
//!
//! let app = AppName::new("hello-world").unwrap();
//! assert_eq!(app.as_crate_ident(), "hello_world");
//!
//! let method = MethodName::new("get_user");
//! assert_eq!(method.canonical(), "GetUser");
//! assert_eq!(method.file_stem(), "get_user");
//! ```

use crate::naming::{to_pascal_case, to_snake_case};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Application name (newtype over String).
///
/// Used to derive the binary name and crate identifier of the generated
/// project. Only ASCII alphanumerics, `-` and `_` are accepted, and the
/// name must start with a letter.
///
/// # Examples
///
/// ```
/// use svckit_core::AppName;
///
/// let app = AppName::new("orders").unwrap();
/// assert_eq!(app.as_str(), "orders");
///
/// assert!(AppName::new("").is_err());
/// assert!(AppName::new("9lives").is_err());
/// assert!(AppName::new("rm -rf").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppName(String);

impl AppName {
    /// Creates a validated application name.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the name is empty, does not start
    /// with an ASCII letter, or contains characters other than ASCII
    /// alphanumerics, `-` and `_`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim();

        let Some(first) = trimmed.chars().next() else {
            return Err(Error::InvalidArgument(
                "application name cannot be empty".to_string(),
            ));
        };

        if !first.is_ascii_alphabetic() {
            return Err(Error::InvalidArgument(format!(
                "application name '{trimmed}' must start with a letter"
            )));
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::InvalidArgument(format!(
                "application name '{trimmed}' contains invalid characters (allowed: a-z, A-Z, 0-9, -, _)"
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as written.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the name as a Rust identifier (`my-app` becomes `my_app`).
    #[must_use]
    pub fn as_crate_ident(&self) -> String {
        self.0.replace('-', "_")
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Service method name (newtype over String).
///
/// Holds the identifier exactly as written in the trait. The canonical name
/// (`PascalCase`) is what generated name accessors return and what adapter
/// types are named after; the file stem (`snake_case`) names per-method
/// files and modules.
///
/// # Examples
///
/// ```
/// use svckit_core::MethodName;
///
/// let name = MethodName::new("fetch");
/// assert_eq!(name.as_str(), "fetch");
/// assert_eq!(name.canonical(), "Fetch");
/// assert_eq!(name.file_stem(), "fetch");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodName(String);

impl MethodName {
    /// Creates a new method name.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as written in the trait.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the canonical `PascalCase` name used for dispatch.
    #[must_use]
    pub fn canonical(&self) -> String {
        to_pascal_case(&self.0)
    }

    /// Returns the `snake_case` stem used for file and module names.
    #[must_use]
    pub fn file_stem(&self) -> String {
        to_snake_case(&self.0)
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MethodName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MethodName {
    fn from(s: String) -> Self {
        Self(s)
    }
}
