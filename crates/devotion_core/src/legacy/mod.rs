//! Browser local-storage interop.
//!
//! # Responsibility
//! - Recognize the flat legacy key families and map them to structured keys.
//! - Import and export `(key, value)` pairs in that flat format.

mod local_storage;

pub use local_storage::{
    export_local_storage, import_local_storage, parse_legacy_key, LegacyImportReport,
};
