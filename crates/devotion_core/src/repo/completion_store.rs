//! Day completion persistence.
//!
//! # Invariants
//! - At most one entry per (section, day); presence is the completion flag.
//! - Listed days are strictly ascending and duplicate-free regardless of
//!   insertion order.

use crate::model::completion::DayCompletion;
use crate::repo::codec::{decode_value, encode_value};
use crate::repo::kv_repo::{KvEntry, KvRepository, RecordKind, RepoResult, StorageKey};
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Typed store for day completion flags.
pub struct CompletionStore<K: KvRepository> {
    kv: K,
}

impl<K: KvRepository> CompletionStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Marks one day complete, stamped with the current time.
    ///
    /// Re-marking overwrites the timestamp; the flag stays set.
    pub fn mark_complete(&self, section_key: &str, day: u32) -> RepoResult<DayCompletion> {
        let key = StorageKey::day_completion(section_key, day)?;
        let completion = DayCompletion::now(key.section_key(), day);
        self.kv.set(&key, &encode_value(&completion)?)?;
        info!(
            "event=day_complete module=repo status=ok section={} day={day}",
            key.section_key()
        );
        Ok(completion)
    }

    /// Stores a completion record keeping its timestamp (legacy import).
    pub fn put(&self, completion: &DayCompletion) -> RepoResult<()> {
        let key = StorageKey::day_completion(&completion.section_key, completion.day)?;
        let mut normalized = completion.clone();
        normalized.section_key = key.section_key().to_string();
        self.kv.set(&key, &encode_value(&normalized)?)
    }

    /// Removes one completion flag. Returns whether it was set.
    pub fn mark_incomplete(&self, section_key: &str, day: u32) -> RepoResult<bool> {
        let key = StorageKey::day_completion(section_key, day)?;
        let removed = self.kv.delete(&key)?;
        info!(
            "event=day_incomplete module=repo status=ok section={} day={day} removed={removed}",
            key.section_key()
        );
        Ok(removed)
    }

    /// Presence check; the stored value is not decoded.
    pub fn is_complete(&self, section_key: &str, day: u32) -> RepoResult<bool> {
        let key = StorageKey::day_completion(section_key, day)?;
        Ok(self.kv.get(&key)?.is_some())
    }

    pub fn get_completion(&self, section_key: &str, day: u32) -> RepoResult<Option<DayCompletion>> {
        let key = StorageKey::day_completion(section_key, day)?;
        Ok(self
            .kv
            .get(&key)?
            .and_then(|raw| decode_value(&key, &raw)))
    }

    /// Completed days of one section, ascending and unique.
    pub fn list_completed_days(&self, section_key: &str) -> RepoResult<Vec<u32>> {
        let entries = self
            .kv
            .list(RecordKind::DayCompletion, Some(section_key))?;
        let days: BTreeSet<u32> = entries.iter().filter_map(day_from_entry).collect();
        Ok(days.into_iter().collect())
    }

    /// Share of `total_days` that is complete, in percent.
    pub fn completion_percentage(&self, section_key: &str, total_days: u32) -> RepoResult<f64> {
        if total_days == 0 {
            return Ok(0.0);
        }
        let completed = self.list_completed_days(section_key)?.len();
        Ok(completed as f64 * 100.0 / f64::from(total_days))
    }

    /// Clears one day, or every day of the section when `day` is `None`.
    pub fn clear(&self, section_key: &str, day: Option<u32>) -> RepoResult<usize> {
        match day {
            Some(day) => Ok(usize::from(self.mark_incomplete(section_key, day)?)),
            None => self
                .kv
                .delete_matching(RecordKind::DayCompletion, Some(section_key)),
        }
    }

    /// Completed days per section, each list ascending.
    pub fn list_all(&self) -> RepoResult<BTreeMap<String, Vec<u32>>> {
        let mut grouped: BTreeMap<String, BTreeSet<u32>> = BTreeMap::new();
        for entry in self.kv.list(RecordKind::DayCompletion, None)? {
            if let Some(day) = day_from_entry(&entry) {
                grouped
                    .entry(entry.key.section_key().to_string())
                    .or_default()
                    .insert(day);
            }
        }
        Ok(grouped
            .into_iter()
            .map(|(section, days)| (section, days.into_iter().collect()))
            .collect())
    }

    pub fn clear_all(&self) -> RepoResult<usize> {
        self.kv.delete_matching(RecordKind::DayCompletion, None)
    }
}

fn day_from_entry(entry: &KvEntry) -> Option<u32> {
    match entry.key.slot().parse::<u32>() {
        Ok(day) => Some(day),
        Err(_) => {
            warn!(
                "event=day_list module=repo status=skip section={} slot={}",
                entry.key.section_key(),
                entry.key.slot()
            );
            None
        }
    }
}
