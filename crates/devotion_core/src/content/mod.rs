//! Static curriculum content loading.
//!
//! # Responsibility
//! - Load the three section documents (overviews, daily exercises,
//!   summaries) wholesale from JSON.
//! - Answer read-only lookups by section key and day.
//!
//! # Invariants
//! - Loaded content is immutable.
//! - Every document has the shape `{ "sections": { <key>: ... } }`.

mod library;

pub use library::{
    ContentError, ContentLibrary, ContentResult, DAILY_EXERCISES_FILE, SECTION_OVERVIEWS_FILE,
    SECTION_SUMMARIES_FILE,
};
