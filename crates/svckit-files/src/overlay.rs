//! Copy-on-write overlay store for dry runs.
//!
//! Reads fall through to the lower store unless the overlay already holds a
//! newer version; writes only ever land in memory.

use crate::memory::MemoryStore;
use crate::store::FileStore;
use crate::types::{Result, VirtualPath};

/// A store that reads from `lower` and writes into memory.
///
/// # Examples
///
/// ```
/// use svckit_files::{FileStore, MemoryStore, OverlayStore, VirtualPath};
///
/// let mut disk = MemoryStore::new();
/// disk.add_file("src/main.rs", "fn main() {}\n").unwrap();
///
/// let mut overlay = OverlayStore::new(&disk);
/// let path = VirtualPath::new("src/main.rs").unwrap();
/// overlay.write(&path, "// changed\n").unwrap();
///
/// assert_eq!(overlay.read(&path).unwrap().as_deref(), Some("// changed\n"));
/// assert_eq!(disk.read_file("src/main.rs").unwrap(), "fn main() {}\n");
/// ```
#[derive(Debug)]
pub struct OverlayStore<'a, S: FileStore + ?Sized> {
    lower: &'a S,
    upper: MemoryStore,
}

impl<'a, S: FileStore + ?Sized> OverlayStore<'a, S> {
    /// Creates an empty overlay on top of `lower`.
    pub fn new(lower: &'a S) -> Self {
        Self {
            lower,
            upper: MemoryStore::new(),
        }
    }

    /// Returns the files written through the overlay.
    #[must_use]
    pub const fn changes(&self) -> &MemoryStore {
        &self.upper
    }
}

impl<S: FileStore + ?Sized> FileStore for OverlayStore<'_, S> {
    fn read(&self, path: &VirtualPath) -> Result<Option<String>> {
        match self.upper.read(path)? {
            Some(content) => Ok(Some(content)),
            None => self.lower.read(path),
        }
    }

    fn write(&mut self, path: &VirtualPath, content: &str) -> Result<()> {
        self.upper.write(path, content)
    }

    fn exists(&self, path: &VirtualPath) -> bool {
        self.upper.exists(path) || self.lower.exists(path)
    }

    fn create_dir_all(&mut self, path: &VirtualPath) -> Result<()> {
        self.upper.create_dir_all(path)
    }

    fn list_files(&self, dir: &VirtualPath) -> Result<Vec<VirtualPath>> {
        let mut files = self.lower.list_files(dir)?;
        files.extend(self.upper.list_files(dir)?);
        files.sort();
        files.dedup();
        Ok(files)
    }
}
