//! Core types for file stores.
//!
//! Defines the store error type and the validated virtual path used as the
//! key of in-memory stores.
//!
//! # Examples
//!
//! ```
//! use svckit_files::VirtualPath;
//!
//! let path = VirtualPath::new("src/autogen/rpc/fetch.rs").unwrap();
//! assert_eq!(path.as_str(), "/src/autogen/rpc/fetch.rs");
//! ```

use std::fmt;
use std::path::{Component, Path};
use thiserror::Error;

/// Errors that can occur during store operations.
///
/// # Examples
///
/// ```
/// use svckit_files::StoreError;
///
/// let error = StoreError::FileNotFound {
///     path: "/missing.rs".to_string(),
/// };
///
/// assert!(error.is_not_found());
/// ```
#[derive(Error, Debug)]
pub enum StoreError {
    /// File or directory not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// Path is empty or not valid UTF-8
    #[error("Invalid path: {path}")]
    InvalidPath {
        /// The invalid path
        path: String,
    },

    /// Path escapes the store root ('..' components or absolute disk paths)
    #[error("Path escapes the store root: {path}")]
    InvalidPathComponent {
        /// The path with invalid components
        path: String,
    },

    /// Path exists but is a file where a directory was expected
    #[error("Not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory
        path: String,
    },

    /// Underlying I/O failure
    #[error("I/O error at {path}: {source}")]
    IoError {
        /// Path being accessed
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Returns `true` if this is a file not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }

    /// Returns `true` if this is an invalid path error.
    ///
    /// # Examples
    ///
    /// ```
    /// use svckit_files::StoreError;
    ///
    /// let error = StoreError::InvalidPathComponent {
    ///     path: "../outside.rs".to_string(),
    /// };
    /// assert!(error.is_invalid_path());
    /// ```
    #[must_use]
    pub const fn is_invalid_path(&self) -> bool {
        matches!(
            self,
            Self::InvalidPath { .. } | Self::InvalidPathComponent { .. }
        )
    }

    /// Returns the path the failed operation was working on.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::FileNotFound { path }
            | Self::InvalidPath { path }
            | Self::InvalidPathComponent { path }
            | Self::NotADirectory { path }
            | Self::IoError { path, .. } => path,
        }
    }
}

impl From<StoreError> for svckit_core::Error {
    fn from(error: StoreError) -> Self {
        Self::Store {
            path: error.path().to_string(),
            source: Box::new(error),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A validated store path.
///
/// Store paths are relative to the store root, use forward slashes on every
/// platform and never leave the root. Internally they are kept in absolute
/// Unix form (`/src/main.rs`) so that lexical ordering groups directories.
///
/// # Examples
///
/// ```
/// use svckit_files::VirtualPath;
///
/// let path = VirtualPath::new("/src/main.rs").unwrap();
/// assert_eq!(path.as_str(), "/src/main.rs");
/// assert_eq!(path.relative(), "src/main.rs");
///
/// assert!(VirtualPath::new("src/../../etc/passwd").is_err());
/// assert!(VirtualPath::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualPath(String);

impl VirtualPath {
    /// Creates a new `VirtualPath`.
    ///
    /// Leading `/` is optional; `.` components are dropped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` if the path is empty or not UTF-8,
    /// and `StoreError::InvalidPathComponent` if it contains `..` or a
    /// platform prefix.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let mut normalized = String::new();
        for component in path.components() {
            match component {
                Component::RootDir | Component::CurDir => {}
                Component::Normal(part) => {
                    let part = part.to_str().ok_or_else(|| StoreError::InvalidPath {
                        path: display.clone(),
                    })?;
                    normalized.push('/');
                    normalized.push_str(part);
                }
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(StoreError::InvalidPathComponent { path: display });
                }
            }
        }

        if normalized.is_empty() {
            return Err(StoreError::InvalidPath { path: display });
        }

        Ok(Self(normalized))
    }

    /// Returns the path as a string slice (with leading `/`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the path relative to the store root (without leading `/`).
    #[must_use]
    pub fn relative(&self) -> &str {
        &self.0[1..]
    }

    /// Returns `true` if this path lies strictly below `dir`.
    ///
    /// # Examples
    ///
    /// ```
    /// use svckit_files::VirtualPath;
    ///
    /// let dir = VirtualPath::new("src/pb").unwrap();
    /// let file = VirtualPath::new("src/pb/hello.rs").unwrap();
    /// let other = VirtualPath::new("src/pbx/hello.rs").unwrap();
    /// assert!(file.is_under(&dir));
    /// assert!(!other.is_under(&dir));
    /// ```
    #[must_use]
    pub fn is_under(&self, dir: &Self) -> bool {
        self.0
            .strip_prefix(dir.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
