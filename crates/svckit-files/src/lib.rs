//! File stores for svckit.
//!
//! All generated output flows through the [`FileStore`] trait:
//!
//! - [`DiskStore`]: the real project directory, with atomic writes
//! - [`MemoryStore`]: an in-memory map, for tests and benches
//! - [`OverlayStore`]: reads from another store, writes into memory (dry runs)
//!
//! # Examples
//!
//! ```
//! use svckit_files::{FileStore, MemoryStore, VirtualPath};
//!
//! let mut store = MemoryStore::new();
//! let dir = VirtualPath::new("src/pb").unwrap();
//! store.add_file("src/pb/hello.rs", "pub struct Hello;").unwrap();
//!
//! assert_eq!(store.list_files(&dir).unwrap().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod disk;
mod memory;
mod overlay;
mod store;
mod types;

pub use disk::DiskStore;
pub use memory::MemoryStore;
pub use overlay::OverlayStore;
pub use store::FileStore;
pub use types::{Result, StoreError, VirtualPath};
