//! Per-exercise free-text draft persistence.
//!
//! # Invariants
//! - One draft per (section, day, field, index); saves overwrite.
//! - Drafts of one day never leak into another day's listing.

use crate::model::draft::{DraftField, ExerciseDraft};
use crate::repo::codec::{decode_value, encode_value};
use crate::repo::kv_repo::{draft_day_prefix, KvRepository, RecordKind, RepoResult, StorageKey};
use chrono::Utc;
use std::collections::BTreeMap;

/// Answers of one day keyed by `(field, index)`.
pub type DayAnswers = BTreeMap<(DraftField, usize), String>;

/// Typed store for exercise drafts.
pub struct DraftStore<K: KvRepository> {
    kv: K,
}

impl<K: KvRepository> DraftStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Saves one answer draft, blank text included.
    pub fn save(
        &self,
        section_key: &str,
        day: u32,
        field: DraftField,
        index: usize,
        text: &str,
    ) -> RepoResult<ExerciseDraft> {
        let key = StorageKey::draft(section_key, day, field, index)?;
        let draft = ExerciseDraft {
            section_key: key.section_key().to_string(),
            day,
            field,
            index,
            text: text.to_string(),
            updated_at: Utc::now(),
        };
        self.kv.set(&key, &encode_value(&draft)?)?;
        Ok(draft)
    }

    /// Loads every decodable draft of one day.
    pub fn load_day(&self, section_key: &str, day: u32) -> RepoResult<DayAnswers> {
        let prefix = draft_day_prefix(day);
        let mut answers = DayAnswers::new();
        for entry in self.kv.list(RecordKind::Draft, Some(section_key))? {
            if !entry.key.slot().starts_with(prefix.as_str()) {
                continue;
            }
            if let Some(draft) = decode_value::<ExerciseDraft>(&entry.key, &entry.value) {
                answers.insert((draft.field, draft.index), draft.text);
            }
        }
        Ok(answers)
    }

    /// Deletes every draft of one day.
    pub fn clear_day(&self, section_key: &str, day: u32) -> RepoResult<usize> {
        let prefix = draft_day_prefix(day);
        let mut removed = 0;
        for entry in self.kv.list(RecordKind::Draft, Some(section_key))? {
            if entry.key.slot().starts_with(prefix.as_str()) && self.kv.delete(&entry.key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Deletes every draft of one section.
    pub fn clear_section(&self, section_key: &str) -> RepoResult<usize> {
        self.kv.delete_matching(RecordKind::Draft, Some(section_key))
    }
}
