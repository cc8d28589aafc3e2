//! In-memory file store.
//!
//! Files live in a `HashMap` keyed by [`VirtualPath`]. Directories are
//! implicit (any prefix of a file path) or explicit (created through
//! [`FileStore::create_dir_all`]).
//!
//! # Examples
//!
//! ```
//! use svckit_files::MemoryStore;
//!
//! let mut store = MemoryStore::new();
//! store.add_file("src/pb/hello.rs", "pub trait HelloService {}").unwrap();
//!
//! assert_eq!(store.read_file("src/pb/hello.rs").unwrap(), "pub trait HelloService {}");
//! assert_eq!(store.file_count(), 1);
//! ```

use crate::store::FileStore;
use crate::types::{Result, StoreError, VirtualPath};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// An in-memory file store.
///
/// Used by tests, benches and as the upper layer of dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: HashMap<VirtualPath, String>,
    dirs: BTreeSet<VirtualPath>,
}

impl MemoryStore {
    /// Creates a new empty store.
    ///
    /// # Examples
    ///
    /// ```
    /// use svckit_files::MemoryStore;
    ///
    /// let store = MemoryStore::new();
    /// assert_eq!(store.file_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, replacing any existing file at the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Result<()> {
        let path = VirtualPath::new(path)?;
        self.files.insert(path, content.into());
        Ok(())
    }

    /// Reads the content of a file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::FileNotFound` if the file does not exist and
    /// `StoreError::InvalidPath` if the path is invalid.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<&str> {
        let path = VirtualPath::new(path)?;
        self.files
            .get(&path)
            .map(String::as_str)
            .ok_or_else(|| StoreError::FileNotFound {
                path: path.as_str().to_string(),
            })
    }

    /// Lists the direct children (files and directories) of a directory.
    ///
    /// Returns an empty vector if the directory is empty or does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotADirectory` if the path points to a file.
    ///
    /// # Examples
    ///
    /// ```
    /// use svckit_files::MemoryStore;
    ///
    /// let mut store = MemoryStore::new();
    /// store.add_file("src/autogen/rpc/fetch.rs", "").unwrap();
    /// store.add_file("src/autogen/mod.rs", "").unwrap();
    ///
    /// let entries = store.list_dir("src/autogen").unwrap();
    /// assert_eq!(entries.len(), 2);
    /// ```
    pub fn list_dir(&self, path: impl AsRef<Path>) -> Result<Vec<VirtualPath>> {
        let dir = VirtualPath::new(path)?;

        if self.files.contains_key(&dir) {
            return Err(StoreError::NotADirectory {
                path: dir.as_str().to_string(),
            });
        }

        let prefix = format!("{}/", dir.as_str());
        let mut children = BTreeSet::new();

        for entry in self.files.keys().chain(self.dirs.iter()) {
            let Some(relative) = entry.as_str().strip_prefix(&prefix) else {
                continue;
            };
            let child = match relative.find('/') {
                Some(idx) => VirtualPath::new(format!("{prefix}{}", &relative[..idx]))?,
                None => entry.clone(),
            };
            children.insert(child);
        }

        Ok(children.into_iter().collect())
    }

    /// Returns all file paths, sorted.
    #[must_use]
    pub fn all_paths(&self) -> Vec<&VirtualPath> {
        let mut paths: Vec<_> = self.files.keys().collect();
        paths.sort();
        paths
    }

    /// Returns the number of files in the store.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Removes every file and directory.
    pub fn clear(&mut self) {
        self.files.clear();
        self.dirs.clear();
    }

    fn is_dir(&self, path: &VirtualPath) -> bool {
        self.dirs.contains(path)
            || self.dirs.iter().any(|d| d.is_under(path))
            || self.files.keys().any(|f| f.is_under(path))
    }
}

impl FileStore for MemoryStore {
    fn read(&self, path: &VirtualPath) -> Result<Option<String>> {
        Ok(self.files.get(path).cloned())
    }

    fn write(&mut self, path: &VirtualPath, content: &str) -> Result<()> {
        if self.is_dir(path) {
            return Err(StoreError::InvalidPath {
                path: path.as_str().to_string(),
            });
        }
        self.files.insert(path.clone(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &VirtualPath) -> bool {
        self.files.contains_key(path) || self.is_dir(path)
    }

    fn create_dir_all(&mut self, path: &VirtualPath) -> Result<()> {
        if self.files.contains_key(path) {
            return Err(StoreError::NotADirectory {
                path: path.as_str().to_string(),
            });
        }
        self.dirs.insert(path.clone());
        Ok(())
    }

    fn list_files(&self, dir: &VirtualPath) -> Result<Vec<VirtualPath>> {
        let mut files: Vec<_> = self
            .files
            .keys()
            .filter(|f| f.is_under(dir))
            .cloned()
            .collect();
        files.sort();
        Ok(files)
    }
}
