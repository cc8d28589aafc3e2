//! Error types for svckit.
//!
//! Generation distinguishes three kinds of defects, each fatal for the run:
//!
//! - [`ModelError`]: the service interface could not be located or one of its
//!   methods has a shape the generators cannot adapt. Raised before any file
//!   is written.
//! - [`MergeError`]: an existing target file could not be parsed back into
//!   declarations. The file is left untouched.
//! - [`GenerationError`]: a generator could not produce a well-formed
//!   declaration for its inputs.
//!
//! All of them are wrapped by the workspace-wide [`Error`].
//!
//! # Examples
//!
//! ```
//! use svckit_core::{Error, ModelError, Result};
//!
//! fn locate(found: bool) -> Result<()> {
//!     if !found {
//!         return Err(ModelError::InterfaceNotFound {
//!             suffix: "Service".to_string(),
//!             searched: "src/pb".to_string(),
//!         }
//!         .into());
//!     }
//!     Ok(())
//! }
//!
//! let err = locate(false).unwrap_err();
//! assert!(err.is_model_error());
//! ```

use thiserror::Error;

/// Main error type for svckit.
///
/// Every library crate in the workspace returns this type so the CLI can
/// classify failures without knowing which crate produced them.
#[derive(Error, Debug)]
pub enum Error {
    /// The interface model could not be built.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// An existing target file could not be merged.
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// A generator could not produce a declaration.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Reading or writing a file failed.
    #[error("File store error at {path}")]
    Store {
        /// Path that was being accessed
        path: String,
        /// Underlying error cause
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration error.
    ///
    /// Raised when a configuration file is malformed or contains values
    /// outside their accepted range.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Invalid argument error.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Failure to build the interface model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The message directory does not exist.
    #[error("Source directory not found: {path}")]
    SourceMissing {
        /// Directory that was expected to hold the interface
        path: String,
    },

    /// A source file could not be parsed.
    #[error("Failed to parse {path}: {message}")]
    SourceParse {
        /// File that failed to parse
        path: String,
        /// Parser diagnostic
        message: String,
    },

    /// No trait matched the naming convention.
    #[error("No service interface ending with '{suffix}' found in {searched}")]
    InterfaceNotFound {
        /// Name or suffix that was searched for
        suffix: String,
        /// Directory that was searched
        searched: String,
    },

    /// More than one trait matched the naming convention.
    #[error("Ambiguous service interface, candidates: {}", candidates.join(", "))]
    AmbiguousInterface {
        /// Every trait that matched
        candidates: Vec<String>,
    },

    /// A method signature cannot be adapted to the transports.
    #[error("Unsupported signature for method '{method}': {reason}")]
    UnsupportedSignature {
        /// Method name as written in the trait
        method: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Failure to load an existing target file into a declaration index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The existing file is not valid source.
    #[error("Cannot merge into {path}: existing file does not parse: {message}")]
    Unparsable {
        /// Target file
        path: String,
        /// Parser diagnostic
        message: String,
    },
}

/// Failure to produce a well-formed declaration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The same identity key was offered twice in one merge pass.
    #[error("Declaration {key} offered twice for {path}")]
    DuplicateDeclaration {
        /// Rendered identity key
        key: String,
        /// Target file
        path: String,
    },

    /// A raw source fragment is not exactly one item.
    #[error("Malformed source fragment: {message}")]
    MalformedFragment {
        /// Parser diagnostic
        message: String,
    },

    /// A name is not a valid identifier.
    #[error("Invalid identifier '{name}'")]
    InvalidIdentifier {
        /// The rejected name
        name: String,
    },

    /// A type does not parse.
    #[error("Invalid type '{ty}': {message}")]
    InvalidType {
        /// The rejected type text
        ty: String,
        /// Parser diagnostic
        message: String,
    },

    /// The item kind has no identity key and cannot be offered.
    #[error("Unsupported declaration: {reason}")]
    UnsupportedItem {
        /// Why the item was rejected
        reason: String,
    },
}

impl Error {
    /// Returns `true` if this is an interface model error.
    ///
    /// # Examples
    ///
    /// ```
    /// use svckit_core::{Error, ModelError};
    ///
    /// let err: Error = ModelError::AmbiguousInterface {
    ///     candidates: vec!["AService".into(), "BService".into()],
    /// }
    /// .into();
    /// assert!(err.is_model_error());
    /// assert!(!err.is_merge_error());
    /// ```
    #[must_use]
    pub const fn is_model_error(&self) -> bool {
        matches!(self, Self::Model(_))
    }

    /// Returns `true` if this is a merge error.
    ///
    /// # Examples
    ///
    /// ```
    /// use svckit_core::{Error, MergeError};
    ///
    /// let err: Error = MergeError::Unparsable {
    ///     path: "src/main.rs".into(),
    ///     message: "expected `;`".into(),
    /// }
    /// .into();
    /// assert!(err.is_merge_error());
    /// ```
    #[must_use]
    pub const fn is_merge_error(&self) -> bool {
        matches!(self, Self::Merge(_))
    }

    /// Returns `true` if this is a generation error.
    #[must_use]
    pub const fn is_generation_error(&self) -> bool {
        matches!(self, Self::Generation(_))
    }

    /// Returns `true` if this is a file store error.
    #[must_use]
    pub const fn is_store_error(&self) -> bool {
        matches!(self, Self::Store { .. })
    }

    /// Returns `true` if this is a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use svckit_core::Error;
    ///
    /// let err = Error::ConfigError {
    ///     message: "layout.pb must be relative".to_string(),
    /// };
    /// assert!(err.is_config_error());
    /// ```
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }
}

/// Result type alias for svckit operations.
///
/// # Examples
///
/// ```
/// use svckit_core::{Error, Result};
///
/// fn non_empty(name: &str) -> Result<&str> {
///     if name.is_empty() {
///         return Err(Error::InvalidArgument("name cannot be empty".into()));
///     }
///     Ok(name)
/// }
///
/// assert!(non_empty("hello").is_ok());
/// assert!(non_empty("").is_err());
/// ```
pub type Result<T> = std::result::Result<T, Error>;
