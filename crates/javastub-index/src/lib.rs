//! Source-root scanning and the read-only `ContextIndex` (spec C1).
//!
//! This crate only observes the repository; it never writes anything.
//! Everything it produces is immutable once built, which is what lets two
//! concurrent workers targeting different methods of the same repository
//! share one `ContextIndex` safely.

mod error;
mod index;
mod jarindex;
mod scanner;

pub use error::{Error, Result};
pub use index::{build_from_sources, ContextIndex, IndexedMethod, IndexedType};
pub use jarindex::{index_classpath, index_jar};
pub use scanner::{filter_source_roots, scan_source_root, scan_roots, ScannedFile, SOURCE_EXTENSION};
