//! Day completion and identity statement records.
//!
//! # Invariants
//! - At most one `DayCompletion` per (section, day); presence is the flag and
//!   `completed_at` is informational only.
//! - At most one `IdentityStatement` per section; saves overwrite.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker that a user finished one numbered day of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCompletion {
    pub section_key: String,
    pub day: u32,
    pub completed_at: DateTime<Utc>,
}

impl DayCompletion {
    /// Creates a completion stamped with the current time.
    pub fn now(section_key: impl Into<String>, day: u32) -> Self {
        Self {
            section_key: section_key.into(),
            day,
            completed_at: Utc::now(),
        }
    }
}

/// "I am ..." statement written at the end of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityStatement {
    pub section_key: String,
    pub section_title: String,
    pub statement: String,
    pub completed_at: DateTime<Utc>,
}
