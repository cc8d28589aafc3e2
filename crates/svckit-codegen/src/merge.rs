//! Merge engine.
//!
//! Loads an existing target file into a [`DeclIndex`], accepts offered
//! declarations and appends only the ones whose identity is missing. The
//! original text is never rewritten: new declarations go after it, in offer
//! order, separated by one blank line.
//!
//! The core is the pure [`merge`] function; [`MergeFile`] wraps the same
//! state machine around a [`FileStore`].
//!
//! # Examples
//!
//! ```
//! use svckit_codegen::decl::Declaration;
//! use svckit_codegen::merge::{FileStatus, merge};
//!
//! let existing = "pub struct FetchEndpoint;\n";
//! let offered = vec![
//!     Declaration::new(syn::parse_str("pub struct FetchEndpoint;").unwrap()).unwrap(),
//!     Declaration::new(syn::parse_str("pub fn handlers() {}").unwrap()).unwrap(),
//! ];
//!
//! let outcome = merge("src/autogen/rpc/fetch.rs", Some(existing), offered).unwrap();
//! assert_eq!(outcome.content, "pub struct FetchEndpoint;\n\npub fn handlers() {}\n");
//! assert_eq!(outcome.status, FileStatus::Updated { added: 1 });
//! ```

use crate::decl::{DeclKey, Declaration, index_keys};
use serde::Serialize;
use std::collections::HashSet;
use svckit_core::{GenerationError, MergeError, Result};
use svckit_files::{FileStore, VirtualPath};
use tracing::debug;

/// Identity keys of every declaration in an existing file.
#[derive(Debug, Clone, Default)]
pub struct DeclIndex {
    keys: HashSet<DeclKey>,
}

impl DeclIndex {
    /// Parses source text and indexes its top-level declarations.
    ///
    /// # Errors
    ///
    /// Returns `MergeError::Unparsable` if the text is not a valid file.
    pub fn parse(path: &str, source: &str) -> Result<Self> {
        let file = syn::parse_file(source).map_err(|e| MergeError::Unparsable {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let keys = file.items.iter().flat_map(index_keys).collect();
        Ok(Self { keys })
    }

    /// Returns `true` if a declaration with this key exists.
    #[must_use]
    pub fn contains(&self, key: &DeclKey) -> bool {
        self.keys.contains(key)
    }

    /// Number of indexed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Result of offering a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// The declaration was absent and will be appended.
    Queued,
    /// A declaration with the same identity exists; the offer was dropped.
    AlreadyPresent,
}

/// What a merge pass did to its target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileStatus {
    /// The file did not exist and was written.
    Created,
    /// The file existed and declarations were appended.
    Updated {
        /// Number of appended declarations
        added: usize,
    },
    /// Nothing was written.
    Unchanged,
}

impl FileStatus {
    /// Returns `true` if the file was written.
    #[must_use]
    pub const fn is_written(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    /// Short label for text output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated { .. } => "updated",
            Self::Unchanged => "unchanged",
        }
    }
}

/// New file state computed by a merge pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Full file content after the merge. Equal to the original when
    /// nothing was added.
    pub content: String,
    /// Status of the file
    pub status: FileStatus,
    /// Keys appended, in order
    pub added: Vec<DeclKey>,
    /// Keys offered but already present
    pub skipped: Vec<DeclKey>,
}

/// Report of a flushed [`MergeFile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    /// Target path
    pub path: String,
    /// Status of the file
    pub status: FileStatus,
    /// Keys appended, in order
    pub added: Vec<DeclKey>,
    /// Keys offered but already present
    pub skipped: Vec<DeclKey>,
}

/// One merge pass over one target file.
#[derive(Debug)]
pub struct MergeFile {
    path: VirtualPath,
    existing: Option<String>,
    index: DeclIndex,
    offered: HashSet<DeclKey>,
    queued: Vec<Declaration>,
    skipped: Vec<DeclKey>,
}

impl MergeFile {
    /// Starts a merge pass from the file's current content (`None` if it
    /// does not exist).
    ///
    /// # Errors
    ///
    /// Returns `MergeError::Unparsable` if the existing content does not
    /// parse.
    pub fn from_source(path: VirtualPath, existing: Option<String>) -> Result<Self> {
        let index = match &existing {
            Some(source) => DeclIndex::parse(path.relative(), source)?,
            None => DeclIndex::default(),
        };

        Ok(Self {
            path,
            existing,
            index,
            offered: HashSet::new(),
            queued: Vec::new(),
            skipped: Vec::new(),
        })
    }

    /// Opens the target file in `store`.
    ///
    /// # Errors
    ///
    /// Returns `MergeError::Unparsable` if the file exists but does not
    /// parse, or a store error if it cannot be read.
    pub fn open<S: FileStore + ?Sized>(store: &S, path: VirtualPath) -> Result<Self> {
        let existing = store.read(&path)?;
        debug!(
            "opened {} ({})",
            path,
            if existing.is_some() { "existing" } else { "new" }
        );
        Self::from_source(path, existing)
    }

    /// Returns the target path.
    #[must_use]
    pub const fn path(&self) -> &VirtualPath {
        &self.path
    }

    /// Returns `true` if the target file did not exist.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.existing.is_none()
    }

    /// Returns `true` if a declaration with this key exists in the file.
    #[must_use]
    pub fn find(&self, key: &DeclKey) -> bool {
        self.index.contains(key)
    }

    /// Offers a declaration for insertion.
    ///
    /// First writer wins: a key already in the file is dropped.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::DuplicateDeclaration` if the same key was
    /// already offered in this pass.
    pub fn offer(&mut self, decl: Declaration) -> Result<Offer> {
        let key = decl.key().clone();

        if !self.offered.insert(key.clone()) {
            return Err(GenerationError::DuplicateDeclaration {
                key: key.to_string(),
                path: self.path.relative().to_string(),
            }
            .into());
        }

        if self.index.contains(&key) {
            debug!("{}: {} already present", self.path, key);
            self.skipped.push(key);
            return Ok(Offer::AlreadyPresent);
        }

        debug!("{}: queued {}", self.path, key);
        self.queued.push(decl);
        Ok(Offer::Queued)
    }

    /// Computes the merged file state without touching any store.
    #[must_use]
    pub fn into_outcome(self) -> MergeOutcome {
        let added: Vec<DeclKey> = self.queued.iter().map(|d| d.key().clone()).collect();

        if self.queued.is_empty() {
            return MergeOutcome {
                content: self.existing.unwrap_or_default(),
                status: FileStatus::Unchanged,
                added,
                skipped: self.skipped,
            };
        }

        let status = if self.existing.is_some() {
            FileStatus::Updated { added: added.len() }
        } else {
            FileStatus::Created
        };

        let original = self.existing.as_deref().unwrap_or_default();
        let original = original.trim_end_matches(['\n', '\r']);

        let mut content = String::with_capacity(original.len() + 256 * self.queued.len());
        if !original.trim().is_empty() {
            content.push_str(original);
            content.push_str("\n\n");
        }
        let rendered: Vec<String> = self.queued.iter().map(Declaration::render).collect();
        content.push_str(&rendered.join("\n\n"));
        content.push('\n');

        MergeOutcome {
            content,
            status,
            added,
            skipped: self.skipped,
        }
    }

    /// Writes the merged file if anything was queued.
    ///
    /// # Errors
    ///
    /// Returns a store error if the write fails.
    pub fn flush<S: FileStore + ?Sized>(self, store: &mut S) -> Result<FlushReport> {
        let path = self.path.clone();
        let outcome = self.into_outcome();

        if outcome.status.is_written() {
            store.write(&path, &outcome.content)?;
        }

        Ok(FlushReport {
            path: path.relative().to_string(),
            status: outcome.status,
            added: outcome.added,
            skipped: outcome.skipped,
        })
    }
}

/// Merges offered declarations into a file's content.
///
/// `existing` is `None` when the file does not exist. The result is a pure
/// function of its inputs.
///
/// # Errors
///
/// Returns `MergeError::Unparsable` if `existing` does not parse, and
/// `GenerationError::DuplicateDeclaration` if two offers share a key.
pub fn merge(
    path: &str,
    existing: Option<&str>,
    offered: impl IntoIterator<Item = Declaration>,
) -> Result<MergeOutcome> {
    let path = VirtualPath::new(path)?;
    let mut file = MergeFile::from_source(path, existing.map(str::to_string))?;
    for decl in offered {
        file.offer(decl)?;
    }
    Ok(file.into_outcome())
}
