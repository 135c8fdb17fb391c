//! Assessment persistence over the key-value repository.
//!
//! # Responsibility
//! - Save/load one `StoredAssessment` per (section, phase).
//! - Provide the double lookup used by the week-review comparison.
//!
//! # Invariants
//! - `save` overwrites; no history is kept.
//! - Undecodable records read as `None` and are skipped in listings.

use crate::model::assessment::{AssessmentPhase, StoredAssessment};
use crate::repo::codec::{decode_value, encode_value};
use crate::repo::kv_repo::{KvRepository, RecordKind, RepoResult, StorageKey};
use log::info;
use std::collections::BTreeMap;

/// Both sittings of one section, either of which may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssessmentPair {
    pub initial: Option<StoredAssessment>,
    pub final_: Option<StoredAssessment>,
}

impl AssessmentPair {
    pub fn get(&self, phase: AssessmentPhase) -> Option<&StoredAssessment> {
        match phase {
            AssessmentPhase::Initial => self.initial.as_ref(),
            AssessmentPhase::Final => self.final_.as_ref(),
        }
    }

    fn set(&mut self, record: StoredAssessment) {
        match record.assessment_type {
            AssessmentPhase::Initial => self.initial = Some(record),
            AssessmentPhase::Final => self.final_ = Some(record),
        }
    }

    /// Both sittings are present.
    pub fn is_complete(&self) -> bool {
        self.initial.is_some() && self.final_.is_some()
    }
}

/// Typed store for assessment records.
pub struct AssessmentStore<K: KvRepository> {
    kv: K,
}

impl<K: KvRepository> AssessmentStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Saves a record under its own `(section_key, assessment_type)`.
    ///
    /// The stored record carries the trimmed section key of its storage key.
    pub fn save(&self, record: &StoredAssessment) -> RepoResult<()> {
        let key = StorageKey::assessment(&record.section_key, record.assessment_type)?;
        let mut normalized = record.clone();
        normalized.section_key = key.section_key().to_string();
        self.kv.set(&key, &encode_value(&normalized)?)?;
        info!(
            "event=assessment_save module=repo status=ok section={} phase={} items={} rated={}",
            key.section_key(),
            record.assessment_type,
            record.results.total_items,
            record.results.completed_items
        );
        Ok(())
    }

    /// Loads one record; missing and undecodable records both yield `None`.
    pub fn load(
        &self,
        section_key: &str,
        phase: AssessmentPhase,
    ) -> RepoResult<Option<StoredAssessment>> {
        let key = StorageKey::assessment(section_key, phase)?;
        Ok(self
            .kv
            .get(&key)?
            .and_then(|raw| decode_value(&key, &raw)))
    }

    pub fn has(&self, section_key: &str, phase: AssessmentPhase) -> RepoResult<bool> {
        Ok(self.load(section_key, phase)?.is_some())
    }

    /// Loads both sittings of a section. No joint validation is applied.
    pub fn load_pair(&self, section_key: &str) -> RepoResult<AssessmentPair> {
        Ok(AssessmentPair {
            initial: self.load(section_key, AssessmentPhase::Initial)?,
            final_: self.load(section_key, AssessmentPhase::Final)?,
        })
    }

    /// Groups every decodable record by section.
    ///
    /// Grouping uses the decoded record fields, matching what was saved.
    pub fn list_all(&self) -> RepoResult<BTreeMap<String, AssessmentPair>> {
        let mut grouped: BTreeMap<String, AssessmentPair> = BTreeMap::new();
        for entry in self.kv.list(RecordKind::Assessment, None)? {
            let Some(record) = decode_value::<StoredAssessment>(&entry.key, &entry.value) else {
                continue;
            };
            grouped
                .entry(record.section_key.clone())
                .or_default()
                .set(record);
        }
        Ok(grouped)
    }

    /// Deletes both sittings of one section.
    pub fn clear_section(&self, section_key: &str) -> RepoResult<usize> {
        let removed = self
            .kv
            .delete_matching(RecordKind::Assessment, Some(section_key))?;
        info!("event=assessment_clear module=repo status=ok scope=section removed={removed}");
        Ok(removed)
    }

    /// Deletes every stored assessment.
    pub fn clear_all(&self) -> RepoResult<usize> {
        let removed = self.kv.delete_matching(RecordKind::Assessment, None)?;
        info!("event=assessment_clear module=repo status=ok scope=all removed={removed}");
        Ok(removed)
    }
}
