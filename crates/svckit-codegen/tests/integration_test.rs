//! End-to-end tests for svckit-codegen.
//!
//! Runs the whole orchestrator against in-memory and on-disk projects and
//! checks the properties a rerun must hold:
//! 1. A second run writes nothing
//! 2. Hand edits survive a rerun
//! 3. Adding a method only adds what belongs to it
//! 4. An unparsable target aborts the run without touching it

use svckit_codegen::{FileStatus, GenerateOptions, Layout, ServiceFactory};
use svckit_core::Error;
use svckit_files::{DiskStore, FileStore, MemoryStore, VirtualPath};
use tempfile::TempDir;

const ROOT: &str = "/work/kv";

const PB_TWO_METHODS: &str = r"use crate::autogen::Context;

pub struct FetchRequest {
    pub key: String,
}

pub struct FetchResponse {
    pub value: Vec<u8>,
}

pub struct StoreRequest {
    pub key: String,
    pub value: Vec<u8>,
}

pub struct StoreResponse;

#[derive(Debug)]
pub struct Status {
    pub code: u32,
}

pub trait KvService {
    /// Fetches a value.
    fn fetch(&self, ctx: &Context, request: FetchRequest) -> Result<FetchResponse, Status>;

    /// Stores a value.
    fn store(&self, ctx: &Context, request: StoreRequest) -> Result<StoreResponse, Status>;
}
";

const PB_THREE_METHODS: &str = r"use crate::autogen::Context;

pub struct FetchRequest {
    pub key: String,
}

pub struct FetchResponse {
    pub value: Vec<u8>,
}

pub struct StoreRequest {
    pub key: String,
    pub value: Vec<u8>,
}

pub struct StoreResponse;

pub struct DeleteRequest {
    pub key: String,
}

pub struct DeleteResponse;

#[derive(Debug)]
pub struct Status {
    pub code: u32,
}

pub trait KvService {
    /// Fetches a value.
    fn fetch(&self, ctx: &Context, request: FetchRequest) -> Result<FetchResponse, Status>;

    /// Stores a value.
    fn store(&self, ctx: &Context, request: StoreRequest) -> Result<StoreResponse, Status>;

    fn delete(&self, ctx: &Context, request: DeleteRequest) -> Result<DeleteResponse, Status>;
}
";

fn project(pb: &str) -> MemoryStore {
    let mut store = MemoryStore::new();
    store.add_file("src/pb/kv.rs", pb).unwrap();
    store
}

fn generate<S: FileStore + ?Sized>(store: &mut S) -> svckit_core::Result<svckit_codegen::GenerationReport> {
    ServiceFactory::new(ROOT, &GenerateOptions::default(), store)?.create()
}

fn read(store: &MemoryStore, path: &str) -> String {
    store.read_file(path).unwrap().to_string()
}

#[test]
fn test_first_run_creates_every_file() {
    let mut store = project(PB_TWO_METHODS);
    let report = generate(&mut store).unwrap();

    let expected = [
        "src/service/mod.rs",
        "src/autogen/mod.rs",
        "src/autogen/rpc/mod.rs",
        "src/autogen/rpc/client.rs",
        "src/autogen/http/mod.rs",
        "src/global/config.rs",
        "src/global/mod.rs",
        "src/cmd/mod.rs",
        "src/cmd/run.rs",
        "src/cmd/run_rpc.rs",
        "src/cmd/run_http.rs",
        "src/cmd/client.rs",
        "src/pb/mod.rs",
        "src/main.rs",
        "src/autogen/rpc/fetch.rs",
        "src/autogen/rpc/store.rs",
        "src/autogen/http/fetch.rs",
        "src/autogen/http/store.rs",
    ];
    let paths: Vec<&str> = report.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, expected);
    assert_eq!(report.created(), expected.len());
    assert_eq!(report.interface, "crate::pb::kv::KvService");
    assert_eq!(report.methods, 2);

    for path in expected {
        assert!(store.read_file(path).is_ok(), "{path} was not written");
    }
    assert_eq!(read(&store, "src/pb/kv.rs"), PB_TWO_METHODS);
}

#[test]
fn test_second_run_is_noop() {
    let mut store = project(PB_TWO_METHODS);
    let first = generate(&mut store).unwrap();
    let snapshot: Vec<(String, String)> = store
        .all_paths()
        .into_iter()
        .map(|p| (p.to_string(), store.read_file(p.as_str()).unwrap().to_string()))
        .collect();

    let second = generate(&mut store).unwrap();
    assert!(second.is_noop());
    assert_eq!(second.unchanged(), first.files.len());

    for (path, content) in snapshot {
        assert_eq!(read(&store, &path), content, "{path} changed on rerun");
    }
    for (a, b) in first.files.iter().zip(&second.files) {
        assert_eq!(a.digest, b.digest);
    }
}

#[test]
fn test_hand_edits_survive_rerun() {
    let mut store = project(PB_TWO_METHODS);
    generate(&mut store).unwrap();

    let edited = "// Hand-written service.\npub struct ServiceImpl {\n    db: std::collections::HashMap<String, Vec<u8>>,\n}\n\nimpl ServiceImpl {\n    pub fn new() -> Self {\n        Self { db: Default::default() }\n    }\n}\n\nimpl crate::pb::kv::KvService for ServiceImpl {\n    fn fetch(&self, _ctx: &crate::autogen::Context, request: crate::pb::kv::FetchRequest) -> Result<crate::pb::kv::FetchResponse, crate::pb::kv::Status> {\n        self.db.get(&request.key).map(|v| crate::pb::kv::FetchResponse { value: v.clone() }).ok_or(crate::pb::kv::Status { code: 404 })\n    }\n\n    fn store(&self, _ctx: &crate::autogen::Context, _request: crate::pb::kv::StoreRequest) -> Result<crate::pb::kv::StoreResponse, crate::pb::kv::Status> {\n        Ok(crate::pb::kv::StoreResponse)\n    }\n}\n";
    store.add_file("src/service/mod.rs", edited).unwrap();

    let report = generate(&mut store).unwrap();
    assert_eq!(
        report.file("src/service/mod.rs").unwrap().status,
        FileStatus::Unchanged
    );
    assert_eq!(read(&store, "src/service/mod.rs"), edited);
}

#[test]
fn test_edited_file_keeps_prefix_and_gains_missing_declarations() {
    let mut store = project(PB_TWO_METHODS);
    generate(&mut store).unwrap();

    let custom = "// routing tweaks\npub mod fetch;\n\npub fn extra() {}\n";
    store.add_file("src/autogen/http/mod.rs", custom).unwrap();

    let report = generate(&mut store).unwrap();
    let after = read(&store, "src/autogen/http/mod.rs");
    assert!(after.starts_with(custom.trim_end()));
    assert!(after.contains("pub mod store;"));
    assert!(after.contains("pub fn routes()"));
    assert!(!after[custom.len()..].contains("pub mod fetch;"));
    assert!(matches!(
        report.file("src/autogen/http/mod.rs").unwrap().status,
        FileStatus::Updated { .. }
    ));
}

#[test]
fn test_new_method_is_added_incrementally() {
    let mut store = project(PB_TWO_METHODS);
    let first = generate(&mut store).unwrap();

    store.add_file("src/pb/kv.rs", PB_THREE_METHODS).unwrap();
    let second = generate(&mut store).unwrap();

    assert!(second.file("src/autogen/rpc/delete.rs").unwrap().status == FileStatus::Created);
    assert!(second.file("src/autogen/http/delete.rs").unwrap().status == FileStatus::Created);

    let registry = second.file("src/autogen/rpc/mod.rs").unwrap();
    assert_eq!(registry.status, FileStatus::Updated { added: 1 });
    assert!(read(&store, "src/autogen/rpc/mod.rs").ends_with("\n\npub mod delete;\n"));

    let client = second.file("src/autogen/rpc/client.rs").unwrap();
    assert_eq!(client.status, FileStatus::Updated { added: 1 });

    for path in [
        "src/autogen/rpc/fetch.rs",
        "src/autogen/rpc/store.rs",
        "src/autogen/http/fetch.rs",
        "src/autogen/mod.rs",
        "src/main.rs",
    ] {
        let before = first.file(path).unwrap().digest.clone();
        let after = second.file(path).unwrap().digest.clone();
        assert_eq!(before, after, "{path} changed");
    }
}

#[test]
fn test_listings_flagged_stale_after_new_method() {
    let mut store = project(PB_TWO_METHODS);
    let first = generate(&mut store).unwrap();
    assert!(first.files.iter().all(|f| f.stale.is_empty()));

    store.add_file("src/pb/kv.rs", PB_THREE_METHODS).unwrap();
    let second = generate(&mut store).unwrap();

    assert_eq!(second.file("src/autogen/rpc/mod.rs").unwrap().stale, vec!["handlers()"]);
    assert_eq!(second.file("src/autogen/http/mod.rs").unwrap().stale, vec!["routes()"]);
    assert!(second.file("src/autogen/rpc/client.rs").unwrap().stale.is_empty());
    assert!(!read(&store, "src/autogen/rpc/mod.rs").contains("delete::DeleteEndpoint"));

    // Removing the listing lets the next run write it with every method.
    let registry = read(&store, "src/autogen/rpc/mod.rs");
    let start = registry
        .find("// Delete this function and re-run svckit to refresh the list.\npub fn handlers()")
        .unwrap();
    let end = start + registry[start..].find("}\n").unwrap() + 2;
    store
        .add_file("src/autogen/rpc/mod.rs", format!("{}{}", &registry[..start], &registry[end..]))
        .unwrap();

    let third = generate(&mut store).unwrap();
    let registry = third.file("src/autogen/rpc/mod.rs").unwrap();
    assert_eq!(registry.status, FileStatus::Updated { added: 1 });
    assert!(registry.stale.is_empty());
    assert!(read(&store, "src/autogen/rpc/mod.rs").contains("delete::DeleteEndpoint"));
    assert!(third.file("src/autogen/http/mod.rs").unwrap().stale.is_empty());
}

#[test]
fn test_report_serializes_tagged_status() {
    let mut store = project(PB_TWO_METHODS);
    generate(&mut store).unwrap();
    store.add_file("src/pb/kv.rs", PB_THREE_METHODS).unwrap();
    let report = generate(&mut store).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["app_name"], "kv");
    assert_eq!(json["methods"], 3);

    let files = json["files"].as_array().unwrap();
    let entry = |path: &str| files.iter().find(|f| f["path"] == path).unwrap().clone();

    let registry = entry("src/autogen/rpc/mod.rs");
    assert_eq!(registry["status"], serde_json::json!({"kind": "updated", "added": 1}));
    assert_eq!(registry["generator"], "rpc_registry");
    assert_eq!(registry["stale"], serde_json::json!(["handlers()"]));

    assert_eq!(
        entry("src/autogen/rpc/delete.rs")["status"],
        serde_json::json!({"kind": "created"})
    );

    let main = entry("src/main.rs");
    assert_eq!(main["status"], serde_json::json!({"kind": "unchanged"}));
    assert!(main.get("stale").is_none());

    let digest = main["digest"].as_str().unwrap();
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_unparsable_target_aborts_run() {
    let mut store = project(PB_TWO_METHODS);
    let broken = "pub struct ServiceImpl {\n";
    store.add_file("src/autogen/rpc/mod.rs", broken).unwrap();

    let err = generate(&mut store).unwrap_err();
    assert!(err.is_merge_error());
    assert!(err.to_string().contains("src/autogen/rpc/mod.rs"));

    // Earlier targets were flushed, the broken one is untouched, later ones
    // were never written.
    assert!(store.read_file("src/service/mod.rs").is_ok());
    assert!(store.read_file("src/autogen/mod.rs").is_ok());
    assert_eq!(read(&store, "src/autogen/rpc/mod.rs"), broken);
    assert!(store.read_file("src/autogen/rpc/client.rs").is_err());
    assert!(store.read_file("src/main.rs").is_err());
    assert!(store.read_file("src/autogen/rpc/fetch.rs").is_err());
}

#[test]
fn test_method_named_like_registry_module_is_rejected() {
    let pb = "use crate::autogen::Context;\npub struct Req;\npub struct Resp;\npub struct Status;\npub trait ToolService {\n    fn client(&self, ctx: &Context, request: Req) -> Result<Resp, Status>;\n}\n";
    let mut store = MemoryStore::new();
    store.add_file("src/pb/tool.rs", pb).unwrap();

    let err = generate(&mut store).unwrap_err();
    assert!(err.is_generation_error());
    assert!(err.to_string().contains("mod client"));
}

#[test]
fn test_missing_interface_is_model_error() {
    let mut store = MemoryStore::new();
    store.add_file("src/pb/kv.rs", "pub struct Nothing;").unwrap();
    let err = ServiceFactory::new(ROOT, &GenerateOptions::default(), &mut store).unwrap_err();
    assert!(err.is_model_error());
    assert!(store.read_file("src/main.rs").is_err());
}

#[test]
fn test_invalid_layout_is_config_error() {
    let mut store = project(PB_TWO_METHODS);
    let options = GenerateOptions {
        layout: Layout {
            cmd: "bin/cmd".into(),
            ..Layout::default()
        },
        ..GenerateOptions::default()
    };
    let err = ServiceFactory::new(ROOT, &options, &mut store).unwrap_err();
    assert!(matches!(err, Error::ConfigError { .. }));
}

#[test]
fn test_custom_layout_and_names() {
    let mut store = MemoryStore::new();
    store.add_file("src/proto/kv.rs", PB_TWO_METHODS).unwrap();
    let options = GenerateOptions {
        app_name: Some("kvd".to_string()),
        service_impl: "KvServer".to_string(),
        layout: Layout {
            pb: "src/proto".into(),
            autogen: "src/transport".into(),
            ..Layout::default()
        },
        ..GenerateOptions::default()
    };

    let report = ServiceFactory::new(ROOT, &options, &mut store)
        .unwrap()
        .create()
        .unwrap();
    assert_eq!(report.app_name, "kvd");
    assert!(report.file("src/transport/rpc/fetch.rs").is_some());

    let adapter = read(&store, "src/transport/rpc/fetch.rs");
    assert!(adapter.contains("downcast_ref::<crate::service::KvServer>()"));
    assert!(adapter.contains("use crate::transport::Context;"));
    assert!(adapter.contains("crate::proto::kv::FetchRequest"));

    let main = read(&store, "src/main.rs");
    assert!(main.contains("mod proto;"));
    assert!(main.contains("mod transport;"));
    assert_eq!(read(&store, "src/proto/mod.rs"), "pub mod kv;\n");
}

#[test]
fn test_disk_project_roundtrip() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("kv");
    std::fs::create_dir_all(root.join("src/pb")).unwrap();
    std::fs::write(root.join("src/pb/kv.rs"), PB_TWO_METHODS).unwrap();

    let mut disk = DiskStore::new(&root);
    let report = ServiceFactory::new(&root, &GenerateOptions::default(), &mut disk)
        .unwrap()
        .create()
        .unwrap();
    assert_eq!(report.app_name, "kv");
    assert!(root.join("src/autogen/http/store.rs").is_file());
    assert!(root.join("src/main.rs").is_file());

    let main = std::fs::read_to_string(root.join("src/main.rs")).unwrap();
    assert!(main.contains("fn main()"));

    let mut disk = DiskStore::new(&root);
    let again = ServiceFactory::new(&root, &GenerateOptions::default(), &mut disk)
        .unwrap()
        .create()
        .unwrap();
    assert!(again.is_noop());

    let leftovers: Vec<_> = walk(&root).into_iter().filter(|p| p.ends_with(".tmp")).collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
}

#[test]
fn test_dry_run_overlay_leaves_disk_untouched() {
    use svckit_files::OverlayStore;

    let temp = TempDir::new().unwrap();
    let root = temp.path().join("kv");
    std::fs::create_dir_all(root.join("src/pb")).unwrap();
    std::fs::write(root.join("src/pb/kv.rs"), PB_TWO_METHODS).unwrap();

    let disk = DiskStore::new(&root);
    let mut overlay = OverlayStore::new(&disk);
    let report = ServiceFactory::new(&root, &GenerateOptions::default(), &mut overlay)
        .unwrap()
        .create()
        .unwrap();

    assert!(report.created() > 0);
    assert!(!root.join("src/main.rs").exists());
    assert!(
        overlay
            .read(&VirtualPath::new("src/main.rs").unwrap())
            .unwrap()
            .is_some()
    );
}

fn walk(dir: &std::path::Path) -> Vec<String> {
    let mut out = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                out.extend(walk(&path));
            } else {
                out.push(path.display().to_string());
            }
        }
    }
    out
}
