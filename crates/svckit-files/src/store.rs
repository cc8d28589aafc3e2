//! The `FileStore` abstraction.
//!
//! Generators never touch the filesystem directly. Every read and write goes
//! through a `FileStore`, so a whole generation run can execute against the
//! disk, an in-memory map, or a dry-run overlay.

use crate::types::{Result, VirtualPath};

/// Storage backend for source files.
///
/// Paths are [`VirtualPath`]s relative to the store root.
///
/// # Examples
///
/// ```
/// use svckit_files::{FileStore, MemoryStore, VirtualPath};
///
/// let mut store = MemoryStore::new();
/// let path = VirtualPath::new("src/main.rs").unwrap();
///
/// assert_eq!(store.read(&path).unwrap(), None);
/// store.write(&path, "fn main() {}\n").unwrap();
/// assert_eq!(store.read(&path).unwrap().as_deref(), Some("fn main() {}\n"));
/// ```
pub trait FileStore {
    /// Reads a file, returning `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    fn read(&self, path: &VirtualPath) -> Result<Option<String>>;

    /// Writes a file, replacing any previous content.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write(&mut self, path: &VirtualPath, content: &str) -> Result<()>;

    /// Returns `true` if a file or directory exists at `path`.
    fn exists(&self, path: &VirtualPath) -> bool;

    /// Creates a directory and all of its parents.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn create_dir_all(&mut self, path: &VirtualPath) -> Result<()>;

    /// Lists every file below `dir`, recursively, sorted by path.
    ///
    /// Returns an empty list when `dir` does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be traversed.
    fn list_files(&self, dir: &VirtualPath) -> Result<Vec<VirtualPath>>;
}

impl<S: FileStore + ?Sized> FileStore for &mut S {
    fn read(&self, path: &VirtualPath) -> Result<Option<String>> {
        (**self).read(path)
    }

    fn write(&mut self, path: &VirtualPath, content: &str) -> Result<()> {
        (**self).write(path, content)
    }

    fn exists(&self, path: &VirtualPath) -> bool {
        (**self).exists(path)
    }

    fn create_dir_all(&mut self, path: &VirtualPath) -> Result<()> {
        (**self).create_dir_all(path)
    }

    fn list_files(&self, dir: &VirtualPath) -> Result<Vec<VirtualPath>> {
        (**self).list_files(dir)
    }
}
