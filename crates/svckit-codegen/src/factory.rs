//! Generation orchestrator.
//!
//! [`ServiceFactory`] builds the run context once, then runs every
//! generator in a fixed order. Each target is opened, merged and flushed
//! before the next generator starts, and the first error aborts the run.

use crate::builder::CodeBuilder;
use crate::decl::{DeclKey, DeclKind};
use crate::generator::Generator;
use crate::generators::{self, Transport};
use crate::merge::{FileStatus, FlushReport, MergeFile};
use crate::meta::{GenerateOptions, Meta};
use serde::Serialize;
use std::path::Path;
use svckit_core::Result;
use svckit_files::{FileStore, VirtualPath};
use tracing::{debug, info, warn};

/// Outcome of one target file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Target path relative to the project root
    pub path: String,
    /// Generator that owns the file
    pub generator: &'static str,
    /// What the run did to the file
    pub status: FileStatus,
    /// Number of declarations appended
    pub added: usize,
    /// Number of declarations already present
    pub skipped: usize,
    /// blake3 digest of the file content after the run, if it exists
    pub digest: Option<String>,
    /// Listing functions that predate declarations added by this run
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stale: Vec<String>,
}

/// Outcome of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// Application name
    pub app_name: String,
    /// Qualified name of the service trait
    pub interface: String,
    /// Number of interface methods
    pub methods: usize,
    /// Every target, in generation order
    pub files: Vec<FileReport>,
}

impl GenerationReport {
    /// Number of files created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Created))
    }

    /// Number of existing files that gained declarations.
    #[must_use]
    pub fn updated(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Updated { .. }))
    }

    /// Number of files left untouched.
    #[must_use]
    pub fn unchanged(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Unchanged))
    }

    /// Total number of declarations appended.
    #[must_use]
    pub fn declarations_added(&self) -> usize {
        self.files.iter().map(|f| f.added).sum()
    }

    /// Returns `true` if the run wrote nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.files.iter().all(|f| !f.status.is_written())
    }

    /// Looks up the report of a target path.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&FileReport> {
        self.files.iter().find(|f| f.path == path)
    }

    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.status)).count()
    }
}

/// Runs every generator against a store.
///
/// # Examples
///
/// ```
/// use svckit_codegen::{GenerateOptions, ServiceFactory};
/// use svckit_files::MemoryStore;
///
/// let mut store = MemoryStore::new();
/// store
///     .add_file(
///         "src/pb/hello.rs",
///         "use crate::autogen::Context;
///          pub struct HelloRequest; pub struct HelloResponse; pub struct Status;
///          pub trait HelloService {
///              fn hello(&self, ctx: &Context, request: HelloRequest) -> Result<HelloResponse, Status>;
///          }",
///     )
///     .unwrap();
///
/// let mut factory = ServiceFactory::new("/work/hello", &GenerateOptions::default(), &mut store).unwrap();
/// let report = factory.create().unwrap();
/// assert!(report.created() > 0);
///
/// let mut factory = ServiceFactory::new("/work/hello", &GenerateOptions::default(), &mut store).unwrap();
/// assert!(factory.create().unwrap().is_noop());
/// ```
#[derive(Debug)]
pub struct ServiceFactory<'s, S: FileStore + ?Sized> {
    meta: Meta,
    store: &'s mut S,
}

impl<'s, S: FileStore + ?Sized> ServiceFactory<'s, S> {
    /// Builds the run context: discovers the interface in `store` and
    /// creates the output directories.
    ///
    /// # Errors
    ///
    /// Returns configuration errors for bad options, model errors from
    /// discovery and store errors from directory creation.
    pub fn new(root: impl AsRef<Path>, options: &GenerateOptions, store: &'s mut S) -> Result<Self> {
        let meta = Meta::build(root.as_ref(), options, &mut *store)?;
        Ok(Self { meta, store })
    }

    /// Returns the run context.
    #[must_use]
    pub const fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Every generator of the run, in execution order: fixed-shape
    /// generators, then RPC adapters per method, then HTTP adapters per
    /// method.
    #[must_use]
    pub fn plan(&self) -> Vec<Box<dyn Generator>> {
        let mut plan = generators::fixed();
        plan.extend(generators::adapters(&self.meta, Transport::Rpc));
        plan.extend(generators::adapters(&self.meta, Transport::Http));
        plan
    }

    /// Runs the generators.
    ///
    /// # Errors
    ///
    /// Returns the first error. Files flushed before it keep their merged
    /// content; later files are not touched.
    pub fn create(&mut self) -> Result<GenerationReport> {
        let interface = self.meta.interface().qualified_name();
        info!(
            "Generating {} from {} ({} methods)",
            self.meta.app_name(),
            interface,
            self.meta.methods().len()
        );

        let plan = self.plan();
        let mut files = Vec::with_capacity(plan.len());
        for generator in &plan {
            files.push(self.run(generator.as_ref())?);
        }

        let report = GenerationReport {
            app_name: self.meta.app_name().to_string(),
            interface,
            methods: self.meta.methods().len(),
            files,
        };

        info!(
            "Generation complete: {} created, {} updated, {} unchanged",
            report.created(),
            report.updated(),
            report.unchanged()
        );
        Ok(report)
    }

    fn run(&mut self, generator: &dyn Generator) -> Result<FileReport> {
        let path = VirtualPath::new(generator.target(&self.meta))?;
        debug!("{}: {}", generator.name(), path);

        let mut file = MergeFile::open(&*self.store, path.clone())?;
        generator.generate(&self.meta, &mut CodeBuilder::new(&mut file))?;
        let flushed = file.flush(&mut *self.store)?;

        let digest = self
            .store
            .read(&path)?
            .map(|content| blake3::hash(content.as_bytes()).to_hex().to_string());

        match flushed.status {
            FileStatus::Unchanged => debug!("{} unchanged", flushed.path),
            status => info!(
                "{} {} ({} declarations)",
                status.label(),
                flushed.path,
                flushed.added.len()
            ),
        }

        let stale = stale_listings(generator, &flushed);
        if !stale.is_empty() {
            warn!(
                "{} gained module declarations but {} still lists the old methods; delete it and re-run to refresh",
                flushed.path,
                stale.join(", ")
            );
        }

        Ok(FileReport {
            path: flushed.path,
            generator: generator.name(),
            status: flushed.status,
            added: flushed.added.len(),
            skipped: flushed.skipped.len(),
            digest,
            stale,
        })
    }
}

/// Listings of `generator` that were already present while the same pass
/// appended `mod` declarations.
fn stale_listings(generator: &dyn Generator, flushed: &FlushReport) -> Vec<String> {
    if !flushed.added.iter().any(|key| key.kind == DeclKind::Mod) {
        return Vec::new();
    }
    generator
        .listings()
        .iter()
        .filter(|name| flushed.skipped.contains(&DeclKey::free(DeclKind::Fn, **name)))
        .map(|name| format!("{name}()"))
        .collect()
}
