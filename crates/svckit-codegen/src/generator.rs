//! Generator trait.
//!
//! A generator owns exactly one target file. The orchestrator opens the
//! target, hands the generator a [`CodeBuilder`] over the merge pass and
//! flushes the result before moving on to the next generator.

use crate::builder::CodeBuilder;
use crate::meta::Meta;
use std::path::PathBuf;
use svckit_core::Result;

/// Produces the declarations of one target file.
///
/// Implementations offer every declaration they own on every run; the merge
/// pass decides which ones are missing. Offering the same identity twice is
/// an error, so generators must not rely on duplicates being ignored.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use svckit_codegen::{CodeBuilder, Generator, Meta};
///
/// struct Marker;
///
/// impl Generator for Marker {
///     fn name(&self) -> &'static str {
///         "marker"
///     }
///
///     fn target(&self, meta: &Meta) -> PathBuf {
///         meta.target(svckit_codegen::Role::Root, "marker.rs")
///     }
///
///     fn generate(&self, _meta: &Meta, builder: &mut CodeBuilder<'_>) -> svckit_core::Result<()> {
///         builder.append_raw("pub const GENERATED: bool = true;")?;
///         Ok(())
///     }
/// }
/// ```
pub trait Generator {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Target file, relative to the project root.
    fn target(&self, meta: &Meta) -> PathBuf;

    /// Offers the declarations of the target file.
    ///
    /// # Errors
    ///
    /// Returns a generation error if a declaration cannot be built or is
    /// offered twice.
    fn generate(&self, meta: &Meta, builder: &mut CodeBuilder<'_>) -> Result<()>;

    /// Free functions of the target that enumerate every method.
    ///
    /// They are offered whole, so once written they do not pick up methods
    /// added later.
    fn listings(&self) -> &'static [&'static str] {
        &[]
    }
}
