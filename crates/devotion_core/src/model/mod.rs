//! Domain model for devotional sections and user-entered state.
//!
//! # Responsibility
//! - Define curriculum content shapes loaded from static JSON.
//! - Define persisted records (assessments, completions, identity, drafts).
//! - Keep scoring rules pure and independent of storage.
//!
//! # Invariants
//! - Persisted records are identified by (section, phase/day/field) and are
//!   only ever replaced wholesale.

pub mod assessment;
pub mod completion;
pub mod content;
pub mod draft;
