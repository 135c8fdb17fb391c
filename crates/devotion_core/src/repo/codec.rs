//! JSON encoding boundary for stored values.
//!
//! # Invariants
//! - Encode failures are errors; decode failures are logged and read as
//!   "no record", never surfaced to callers as a distinct error.

use crate::repo::kv_repo::{RepoResult, StorageKey};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) fn encode_value<T: Serialize>(value: &T) -> RepoResult<String> {
    Ok(serde_json::to_string(value)?)
}

pub(crate) fn decode_value<T: DeserializeOwned>(key: &StorageKey, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            // Key metadata and serde position only: values hold user reflections.
            warn!(
                "event=kv_decode module=repo status=error kind={} section={} slot={} line={} column={}",
                key.kind().as_str(),
                key.section_key(),
                key.slot(),
                err.line(),
                err.column()
            );
            None
        }
    }
}
