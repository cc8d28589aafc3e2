//! Disk-backed file store.
//!
//! Writes are atomic: content goes to a sibling temp file which is synced
//! and renamed over the target, so a crash never leaves a half-written
//! source file behind.
//!
//! # Examples
//!
//! ```no_run
//! use svckit_files::{DiskStore, FileStore, VirtualPath};
//!
//! let mut store = DiskStore::new("/tmp/project");
//! let path = VirtualPath::new("src/main.rs")?;
//! store.write(&path, "fn main() {}\n")?;
//! # Ok::<(), svckit_files::StoreError>(())
//! ```

use crate::store::FileStore;
use crate::types::{Result, StoreError, VirtualPath};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file store rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Creates a store rooted at `root`.
    ///
    /// The directory does not need to exist yet.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a virtual path to its location on disk.
    #[must_use]
    pub fn resolve(&self, path: &VirtualPath) -> PathBuf {
        self.root.join(path.relative())
    }
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::IoError {
        path: path.display().to_string(),
        source,
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".svckit.tmp");
    path.with_file_name(name)
}

/// Writes `content` to `path` through a synced temp file and a rename.
fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }

    let temp_path = temp_path_for(path);

    let mut file = fs::File::create(&temp_path).map_err(|e| io_error(&temp_path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| io_error(&temp_path, e))?;
    file.sync_all().map_err(|e| io_error(&temp_path, e))?;
    drop(file);

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(io_error(path, e));
    }

    Ok(())
}

impl FileStore for DiskStore {
    fn read(&self, path: &VirtualPath) -> Result<Option<String>> {
        let disk_path = self.resolve(path);
        match fs::read_to_string(&disk_path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&disk_path, e)),
        }
    }

    fn write(&mut self, path: &VirtualPath, content: &str) -> Result<()> {
        let disk_path = self.resolve(path);
        tracing::trace!("writing {}", disk_path.display());
        write_file_atomic(&disk_path, content)
    }

    fn exists(&self, path: &VirtualPath) -> bool {
        self.resolve(path).exists()
    }

    fn create_dir_all(&mut self, path: &VirtualPath) -> Result<()> {
        let disk_path = self.resolve(path);
        fs::create_dir_all(&disk_path).map_err(|e| io_error(&disk_path, e))
    }

    fn list_files(&self, dir: &VirtualPath) -> Result<Vec<VirtualPath>> {
        let disk_dir = self.resolve(dir);
        if !disk_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&disk_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map_or_else(|| disk_dir.display().to_string(), |p| p.display().to_string());
                StoreError::IoError {
                    path,
                    source: e.into(),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|_| StoreError::InvalidPathComponent {
                    path: entry.path().display().to_string(),
                })?;
            files.push(VirtualPath::new(relative)?);
        }

        files.sort();
        Ok(files)
    }
}
