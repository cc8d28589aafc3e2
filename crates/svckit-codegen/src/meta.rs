//! Run-wide generation context.
//!
//! [`Meta`] is built once per run from the options and the interface model
//! and passed by reference to every generator. Nothing in it changes after
//! construction.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use svckit_core::{AppName, Error, Result};
use svckit_files::{FileStore, VirtualPath};
use svckit_introspector::{
    InterfaceModel, Introspector, IntrospectorOptions, MessageIndex, Method, ServiceInterface,
};
use syn::{GenericArgument, PathArguments, Type};

/// Output role of a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Hand-written message types and the service trait
    Pb,
    /// Transport runtime
    Autogen,
    /// RPC adapters
    Rpc,
    /// HTTP adapters
    Http,
    /// Service implementation skeleton
    Service,
    /// Configuration loader
    Global,
    /// Command-line entry points
    Cmd,
    /// Crate source root (`main.rs`)
    Root,
}

impl Role {
    /// Every role, in directory creation order.
    pub const ALL: [Self; 8] = [
        Self::Root,
        Self::Pb,
        Self::Autogen,
        Self::Rpc,
        Self::Http,
        Self::Service,
        Self::Global,
        Self::Cmd,
    ];

    /// Returns the role name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pb => "pb",
            Self::Autogen => "autogen",
            Self::Rpc => "rpc",
            Self::Http => "http",
            Self::Service => "service",
            Self::Global => "global",
            Self::Cmd => "cmd",
            Self::Root => "root",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directory layout of the generated project, relative to its root.
///
/// Every role directory must sit directly below `src` so that `main.rs` can
/// declare it with a single `mod` item.
///
/// # Examples
///
/// ```
/// use svckit_codegen::Layout;
///
/// let layout = Layout::default();
/// assert!(layout.validate().is_ok());
/// assert_eq!(layout.autogen.to_str(), Some("src/autogen"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    /// Crate source root
    pub src: PathBuf,
    /// Message directory
    pub pb: PathBuf,
    /// Transport runtime directory (holds `rpc/` and `http/`)
    pub autogen: PathBuf,
    /// Service skeleton directory
    pub service: PathBuf,
    /// Configuration directory
    pub global: PathBuf,
    /// Command directory
    pub cmd: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            src: PathBuf::from("src"),
            pb: PathBuf::from("src/pb"),
            autogen: PathBuf::from("src/autogen"),
            service: PathBuf::from("src/service"),
            global: PathBuf::from("src/global"),
            cmd: PathBuf::from("src/cmd"),
        }
    }
}

fn is_relative_clean(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

impl Layout {
    /// Role directories other than `src`, with their field names.
    fn role_dirs(&self) -> [(&'static str, &Path); 5] {
        [
            ("pb", self.pb.as_path()),
            ("autogen", self.autogen.as_path()),
            ("service", self.service.as_path()),
            ("global", self.global.as_path()),
            ("cmd", self.cmd.as_path()),
        ]
    }

    /// Checks that every directory is relative, free of `..`, directly
    /// below `src`, named like a module, and distinct.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` naming the first offending entry.
    pub fn validate(&self) -> Result<()> {
        let config_error = |message: String| Error::ConfigError { message };

        if !is_relative_clean(&self.src) {
            return Err(config_error(format!(
                "layout.src must be a relative path without '..': {}",
                self.src.display()
            )));
        }

        let mut seen = Vec::new();
        for (field, dir) in self.role_dirs() {
            if !is_relative_clean(dir) {
                return Err(config_error(format!(
                    "layout.{field} must be a relative path without '..': {}",
                    dir.display()
                )));
            }
            if dir.parent() != Some(self.src.as_path()) {
                return Err(config_error(format!(
                    "layout.{field} must be a directory directly below {}: {}",
                    self.src.display(),
                    dir.display()
                )));
            }
            let name = dir.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if syn::parse_str::<syn::Ident>(name).is_err() {
                return Err(config_error(format!(
                    "layout.{field} must be a valid module name: {name}"
                )));
            }
            if seen.contains(&dir) {
                return Err(config_error(format!(
                    "layout.{field} reuses directory {}",
                    dir.display()
                )));
            }
            seen.push(dir);
        }

        Ok(())
    }
}

/// Options for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Application name; defaults to the root directory name.
    pub app_name: Option<String>,
    /// Exact service trait name.
    pub interface: Option<String>,
    /// Service trait suffix used when no name is given.
    pub interface_suffix: String,
    /// Name of the generated service implementation struct.
    pub service_impl: String,
    /// Directory layout.
    pub layout: Layout,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            app_name: None,
            interface: None,
            interface_suffix: "Service".to_string(),
            service_impl: "ServiceImpl".to_string(),
            layout: Layout::default(),
        }
    }
}

impl GenerateOptions {
    /// Introspector options derived from these options.
    #[must_use]
    pub fn introspector_options(&self) -> IntrospectorOptions {
        IntrospectorOptions {
            source_dir: self.layout.pb.clone(),
            interface: self.interface.clone(),
            suffix: self.interface_suffix.clone(),
        }
    }
}

/// Immutable context shared by every generator.
#[derive(Debug, Clone)]
pub struct Meta {
    root: PathBuf,
    app_name: AppName,
    service_impl: String,
    dirs: BTreeMap<Role, PathBuf>,
    model: InterfaceModel,
}

impl Meta {
    /// Builds the context: validates the options, runs the interface model
    /// builder against `store`, then creates every role directory.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for bad options, any model error from
    /// discovery, and store errors from directory creation.
    pub fn build<S: FileStore + ?Sized>(
        root: &Path,
        options: &GenerateOptions,
        store: &mut S,
    ) -> Result<Self> {
        options.layout.validate()?;
        let model = Introspector::new(options.introspector_options()).discover(&*store)?;
        let meta = Self::from_model(root, options, model)?;

        for role in Role::ALL {
            store.create_dir_all(&VirtualPath::new(meta.dir(role))?)?;
        }

        Ok(meta)
    }

    /// Builds the context from an already discovered model.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the application name cannot be
    /// derived or the service implementation name is not an identifier.
    pub fn from_model(root: &Path, options: &GenerateOptions, model: InterfaceModel) -> Result<Self> {
        let app_name = match &options.app_name {
            Some(name) => AppName::new(name.as_str())?,
            None => {
                let dir_name = root
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| {
                        Error::InvalidArgument(format!(
                            "cannot derive an application name from {}; set generate.app_name",
                            root.display()
                        ))
                    })?;
                AppName::new(dir_name)?
            }
        };

        if syn::parse_str::<syn::Ident>(&options.service_impl).is_err() {
            return Err(Error::InvalidArgument(format!(
                "service implementation name '{}' is not a valid identifier",
                options.service_impl
            )));
        }

        let layout = &options.layout;
        let dirs = BTreeMap::from([
            (Role::Root, layout.src.clone()),
            (Role::Pb, layout.pb.clone()),
            (Role::Autogen, layout.autogen.clone()),
            (Role::Rpc, layout.autogen.join("rpc")),
            (Role::Http, layout.autogen.join("http")),
            (Role::Service, layout.service.clone()),
            (Role::Global, layout.global.clone()),
            (Role::Cmd, layout.cmd.clone()),
        ]);

        Ok(Self {
            root: root.to_path_buf(),
            app_name,
            service_impl: options.service_impl.clone(),
            dirs,
            model,
        })
    }

    /// Project root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Application name.
    #[must_use]
    pub const fn app_name(&self) -> &AppName {
        &self.app_name
    }

    /// Name of the service implementation struct.
    #[must_use]
    pub fn service_impl(&self) -> &str {
        &self.service_impl
    }

    /// Directory of a role, relative to the project root.
    #[must_use]
    pub fn dir(&self, role: Role) -> &Path {
        self.dirs
            .get(&role)
            .map_or_else(|| Path::new(""), PathBuf::as_path)
    }

    /// Path of `file` inside the directory of `role`.
    #[must_use]
    pub fn target(&self, role: Role, file: &str) -> PathBuf {
        self.dir(role).join(file)
    }

    /// Module path of a role directory (`crate::autogen::rpc`).
    #[must_use]
    pub fn module(&self, role: Role) -> String {
        let src = self.dir(Role::Root);
        let dir = self.dir(role);
        let relative = dir.strip_prefix(src).unwrap_or(dir);

        let mut module = String::from("crate");
        for component in relative.components() {
            if let Component::Normal(part) = component {
                module.push_str("::");
                module.push_str(&part.to_string_lossy());
            }
        }
        module
    }

    /// Name of the top-level module a role directory declares in `main.rs`.
    #[must_use]
    pub fn module_name(&self, role: Role) -> String {
        self.dir(role)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The discovered interface model.
    #[must_use]
    pub const fn model(&self) -> &InterfaceModel {
        &self.model
    }

    /// The service interface.
    #[must_use]
    pub const fn interface(&self) -> &ServiceInterface {
        &self.model.interface
    }

    /// Interface methods in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.model.interface.methods
    }

    /// Message types next to the interface.
    #[must_use]
    pub const fn messages(&self) -> &MessageIndex {
        &self.model.messages
    }

    /// Returns `ty` with message type names replaced by their qualified
    /// paths, and `self::`/`super::` paths resolved against the interface
    /// module.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use svckit_codegen::{GenerateOptions, Meta};
    /// use svckit_introspector::{InterfaceModel, MessageIndex, ServiceInterface, type_text};
    ///
    /// let mut messages = MessageIndex::default();
    /// messages.insert("FetchRequest", "crate::pb");
    /// let model = InterfaceModel {
    ///     interface: ServiceInterface {
    ///         name: "StoreService".into(),
    ///         module: "crate::pb".into(),
    ///         source: "src/pb/mod.rs".into(),
    ///         methods: vec![],
    ///     },
    ///     messages,
    ///     source_modules: vec![],
    /// };
    /// let meta = Meta::from_model(Path::new("/work/store"), &GenerateOptions::default(), model).unwrap();
    ///
    /// let ty: syn::Type = syn::parse_str("Vec<FetchRequest>").unwrap();
    /// assert_eq!(type_text(&meta.qualify(&ty)), "Vec<crate::pb::FetchRequest>");
    /// ```
    #[must_use]
    pub fn qualify(&self, ty: &Type) -> Type {
        let mut ty = ty.clone();
        self.qualify_in_place(&mut ty);
        ty
    }

    fn qualify_in_place(&self, ty: &mut Type) {
        match ty {
            Type::Path(p) if p.qself.is_none() => {
                if let Some(path) = self.resolve_path(&p.path) {
                    p.path = path;
                }
                for segment in &mut p.path.segments {
                    if let PathArguments::AngleBracketed(args) = &mut segment.arguments {
                        for arg in &mut args.args {
                            if let GenericArgument::Type(inner) = arg {
                                self.qualify_in_place(inner);
                            }
                        }
                    }
                }
            }
            Type::Reference(r) => self.qualify_in_place(&mut r.elem),
            Type::Paren(p) => self.qualify_in_place(&mut p.elem),
            Type::Slice(s) => self.qualify_in_place(&mut s.elem),
            Type::Array(a) => self.qualify_in_place(&mut a.elem),
            Type::Tuple(t) => {
                for elem in &mut t.elems {
                    self.qualify_in_place(elem);
                }
            }
            _ => {}
        }
    }

    fn resolve_path(&self, path: &syn::Path) -> Option<syn::Path> {
        if path.leading_colon.is_some() {
            return None;
        }
        let first = path.segments.first()?;
        let first_name = first.ident.to_string();

        let prefix = if path.segments.len() == 1 {
            self.model.messages.module_of(&first_name)?.to_string()
        } else if first_name == "self" || first_name == "super" {
            let mut module: Vec<&str> = self.model.interface.module.split("::").collect();
            let mut skip = 0;
            for segment in &path.segments {
                match segment.ident.to_string().as_str() {
                    "self" => {}
                    "super" => {
                        if module.len() > 1 {
                            module.pop();
                        }
                    }
                    _ => break,
                }
                skip += 1;
            }
            let rest: Vec<String> = path
                .segments
                .iter()
                .skip(skip)
                .map(|s| quote::ToTokens::to_token_stream(s).to_string())
                .collect();
            return syn::parse_str(&format!("{}::{}", module.join("::"), rest.join("::"))).ok();
        } else {
            return None;
        };

        let mut resolved: syn::Path = syn::parse_str(&prefix).ok()?;
        resolved.segments.push(first.clone());
        Some(resolved)
    }
}
