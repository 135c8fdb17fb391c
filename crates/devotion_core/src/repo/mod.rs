//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the structured key-value contract (`KvRepository`).
//! - Provide typed stores for each persisted record family.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Every write is a full overwrite of one `(kind, section, slot)` entry.
//! - Reads that fail to decode behave like missing records.

mod codec;
pub mod assessment_store;
pub mod completion_store;
pub mod draft_store;
pub mod identity_store;
pub mod kv_repo;
