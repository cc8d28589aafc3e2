//! Service interface discovery.
//!
//! Walks the message directory of a project, parses every `.rs` file and
//! locates the service trait by naming convention.

use crate::analyzer::analyze_trait;
use crate::types::{InterfaceModel, MessageIndex, ServiceInterface};
use std::path::PathBuf;
use svckit_core::{ModelError, Result};
use svckit_files::{FileStore, VirtualPath};
use tracing::{debug, info};

/// Where and how to look for the service interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntrospectorOptions {
    /// Message directory relative to the project root.
    pub source_dir: PathBuf,
    /// Exact trait name to use. Overrides the suffix convention.
    pub interface: Option<String>,
    /// Trait name suffix identifying the interface.
    pub suffix: String,
}

impl Default for IntrospectorOptions {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src/pb"),
            interface: None,
            suffix: "Service".to_string(),
        }
    }
}

struct Candidate {
    item: syn::ItemTrait,
    module: String,
    source: VirtualPath,
}

/// Builds the interface model from a source tree.
///
/// # Examples
///
/// ```
/// use svckit_files::MemoryStore;
/// use svckit_introspector::Introspector;
///
/// let mut store = MemoryStore::new();
/// store
///     .add_file(
///         "src/pb/mod.rs",
///         "pub struct HelloRequest; pub struct HelloResponse; pub struct Status;
///          pub trait HelloService {
///              fn hello(&self, ctx: &Context, request: HelloRequest) -> Result<HelloResponse, Status>;
///          }",
///     )
///     .unwrap();
///
/// let model = Introspector::default().discover(&store).unwrap();
/// assert_eq!(model.interface.name, "HelloService");
/// assert_eq!(model.interface.module, "crate::pb");
/// assert_eq!(model.interface.methods.len(), 1);
/// assert_eq!(model.messages.qualify("HelloRequest").as_deref(), Some("crate::pb::HelloRequest"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Introspector {
    options: IntrospectorOptions,
}

impl Introspector {
    /// Creates an introspector with the given options.
    #[must_use]
    pub const fn new(options: IntrospectorOptions) -> Self {
        Self { options }
    }

    /// Returns the options in use.
    #[must_use]
    pub const fn options(&self) -> &IntrospectorOptions {
        &self.options
    }

    /// Discovers the service interface and the message types next to it.
    ///
    /// Files are visited in path order; methods keep their declaration
    /// order.
    ///
    /// # Errors
    ///
    /// - `ModelError::SourceMissing` if the message directory does not exist
    /// - `ModelError::SourceParse` if a file in it does not parse
    /// - `ModelError::InterfaceNotFound` / `AmbiguousInterface` if zero or
    ///   several traits match
    /// - `ModelError::UnsupportedSignature` for a method that cannot be
    ///   adapted
    /// - `Error::Store` if a file cannot be read
    pub fn discover<S: FileStore + ?Sized>(&self, store: &S) -> Result<InterfaceModel> {
        let dir = VirtualPath::new(&self.options.source_dir)?;
        if !store.exists(&dir) {
            return Err(ModelError::SourceMissing {
                path: dir.relative().to_string(),
            }
            .into());
        }

        let mut candidates = Vec::new();
        let mut messages = MessageIndex::default();
        let mut source_modules: Vec<String> = Vec::new();

        for path in store.list_files(&dir)? {
            if !path.as_str().ends_with(".rs") {
                continue;
            }
            if let Some(name) = top_level_module(&dir, &path)
                && !source_modules.contains(&name)
            {
                source_modules.push(name);
            }
            let Some(content) = store.read(&path)? else {
                continue;
            };
            let file = syn::parse_file(&content).map_err(|e| ModelError::SourceParse {
                path: path.relative().to_string(),
                message: e.to_string(),
            })?;
            debug!("parsed {} ({} items)", path, file.items.len());

            let module = module_path(&path);
            collect(&file.items, &module, &path, &mut candidates, &mut messages);
        }

        let chosen = self.select(candidates, &dir)?;
        let methods = analyze_trait(&chosen.item)?;

        let interface = ServiceInterface {
            name: chosen.item.ident.to_string(),
            module: chosen.module,
            source: chosen.source.relative().to_string(),
            methods,
        };

        info!(
            "Discovered service interface {} with {} methods in {}",
            interface.name,
            interface.methods.len(),
            interface.source
        );

        Ok(InterfaceModel {
            interface,
            messages,
            source_modules,
        })
    }

    fn select(&self, candidates: Vec<Candidate>, dir: &VirtualPath) -> Result<Candidate> {
        let (wanted, mut matching): (String, Vec<Candidate>) = match &self.options.interface {
            Some(name) => (
                name.clone(),
                candidates
                    .into_iter()
                    .filter(|c| c.item.ident == name.as_str())
                    .collect(),
            ),
            None => (
                self.options.suffix.clone(),
                candidates
                    .into_iter()
                    .filter(|c| c.item.ident.to_string().ends_with(&self.options.suffix))
                    .collect(),
            ),
        };

        match matching.len() {
            0 => Err(ModelError::InterfaceNotFound {
                suffix: wanted,
                searched: dir.relative().to_string(),
            }
            .into()),
            1 => Ok(matching.remove(0)),
            _ => Err(ModelError::AmbiguousInterface {
                candidates: matching
                    .iter()
                    .map(|c| format!("{}::{}", c.module, c.item.ident))
                    .collect(),
            }
            .into()),
        }
    }
}

/// Derives the module path of a source file (`src/pb/hello.rs` is
/// `crate::pb::hello`, `src/pb/mod.rs` is `crate::pb`).
#[must_use]
pub fn module_path(path: &VirtualPath) -> String {
    let relative = path.relative();
    let relative = relative.strip_prefix("src/").unwrap_or(relative);
    let relative = relative.strip_suffix(".rs").unwrap_or(relative);

    let mut segments: Vec<&str> = relative.split('/').collect();
    if matches!(segments.last(), Some(&("mod" | "lib" | "main"))) {
        segments.pop();
    }

    std::iter::once("crate")
        .chain(segments)
        .collect::<Vec<_>>()
        .join("::")
}

/// Name of the module a file contributes directly below `dir`.
fn top_level_module(dir: &VirtualPath, path: &VirtualPath) -> Option<String> {
    let rest = path.as_str().strip_prefix(dir.as_str())?.strip_prefix('/')?;
    let name = match rest.split_once('/') {
        Some((subdir, _)) => subdir,
        None => rest.strip_suffix(".rs")?,
    };
    (name != "mod").then(|| name.to_string())
}

fn collect(
    items: &[syn::Item],
    module: &str,
    source: &VirtualPath,
    candidates: &mut Vec<Candidate>,
    messages: &mut MessageIndex,
) {
    for item in items {
        match item {
            syn::Item::Trait(t) => candidates.push(Candidate {
                item: t.clone(),
                module: module.to_string(),
                source: source.clone(),
            }),
            syn::Item::Struct(s) => messages.insert(s.ident.to_string(), module),
            syn::Item::Enum(e) => messages.insert(e.ident.to_string(), module),
            syn::Item::Mod(m) => {
                if let Some((_, inner)) = &m.content {
                    let nested = format!("{module}::{}", m.ident);
                    collect(inner, &nested, source, candidates, messages);
                }
            }
            _ => {}
        }
    }
}
