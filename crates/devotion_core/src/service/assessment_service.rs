//! Assessment use-case service.
//!
//! # Responsibility
//! - Gate submission on readiness (all items rated, all prompts answered).
//! - Score, persist and read back one sitting.
//! - Assemble the week-review comparison for a section.
//!
//! # Invariants
//! - Nothing is written unless the draft is ready.
//! - Every stored rating belongs to an evaluation item, so completed items
//!   never exceed total items.
//! - `submit` returns the record as read back from storage, so callers
//!   refresh from persisted state instead of their in-memory input.

use crate::model::assessment::{
    answered_reflections, score_assessment, AssessmentDraft, AssessmentPhase, StoredAssessment,
};
use crate::repo::assessment_store::{AssessmentPair, AssessmentStore};
use crate::repo::kv_repo::{KvRepository, RepoError, RepoResult};
use crate::service::comparison::{compare_pair, ComparisonReport};
use chrono::Utc;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for assessment use-cases.
#[derive(Debug)]
pub enum AssessmentServiceError {
    /// A rating targets an index with no evaluation item.
    RatingIndexOutOfRange { index: usize, total: usize },
    /// Not every evaluation item has a rating.
    RatingsIncomplete { rated: usize, total: usize },
    /// Not every reflection prompt has a non-blank answer.
    ReflectionsIncomplete { answered: usize, total: usize },
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for AssessmentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RatingIndexOutOfRange { index, total } => write!(
                f,
                "rating for item {index} has no matching item; sitting has {total} items"
            ),
            Self::RatingsIncomplete { rated, total } => {
                write!(f, "assessment incomplete: {rated} of {total} items rated")
            }
            Self::ReflectionsIncomplete { answered, total } => write!(
                f,
                "assessment incomplete: {answered} of {total} reflections answered"
            ),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent assessment state: {details}")
            }
        }
    }
}

impl Error for AssessmentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AssessmentServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// What is being assessed: one phase of one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentSitting {
    pub section_key: String,
    pub section_title: String,
    pub phase: AssessmentPhase,
    pub evaluation_items: Vec<String>,
    pub reflection_prompts: Vec<String>,
}

/// Comparison view state for one section.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentComparison {
    pub pair: AssessmentPair,
    /// `None` until both sittings exist.
    pub report: Option<ComparisonReport>,
}

/// Assessment service facade over the assessment store.
pub struct AssessmentService<K: KvRepository> {
    store: AssessmentStore<K>,
}

impl<K: KvRepository> AssessmentService<K> {
    pub fn new(kv: K) -> Self {
        Self {
            store: AssessmentStore::new(kv),
        }
    }

    /// Submits one sitting.
    ///
    /// # Errors
    /// - `RatingIndexOutOfRange` when a rating has no matching item.
    /// - `RatingsIncomplete` / `ReflectionsIncomplete` when not ready.
    /// - Nothing is persisted in any of these cases.
    /// - `Repo` for storage failures.
    pub fn submit(
        &self,
        sitting: &AssessmentSitting,
        draft: &AssessmentDraft,
    ) -> Result<StoredAssessment, AssessmentServiceError> {
        let total_items = sitting.evaluation_items.len();
        let prompt_count = sitting.reflection_prompts.len();

        if let Some(&index) = draft.ratings().keys().find(|index| **index >= total_items) {
            warn!(
                "event=assessment_submit module=service status=rejected phase={} reason=rating_index index={} total={}",
                sitting.phase, index, total_items
            );
            return Err(AssessmentServiceError::RatingIndexOutOfRange {
                index,
                total: total_items,
            });
        }

        if !draft.is_ready(total_items, prompt_count) {
            let rated = (0..total_items)
                .filter(|index| draft.ratings().contains_key(index))
                .count();
            warn!(
                "event=assessment_submit module=service status=rejected phase={} rated={} total={}",
                sitting.phase, rated, total_items
            );
            if rated < total_items {
                return Err(AssessmentServiceError::RatingsIncomplete {
                    rated,
                    total: total_items,
                });
            }
            return Err(AssessmentServiceError::ReflectionsIncomplete {
                answered: answered_reflections(prompt_count, draft.reflection_answers()),
                total: prompt_count,
            });
        }

        let results = score_assessment(
            &sitting.evaluation_items,
            draft.ratings(),
            draft.reflection_answers(),
        );
        let record = StoredAssessment {
            section_key: sitting.section_key.trim().to_string(),
            section_title: sitting.section_title.clone(),
            assessment_type: sitting.phase,
            results,
            completed_at: Utc::now(),
            evaluation_items: sitting.evaluation_items.clone(),
        };
        self.store.save(&record)?;

        let saved = self
            .store
            .load(&record.section_key, record.assessment_type)?
            .ok_or(AssessmentServiceError::InconsistentState(
                "submitted assessment not found in read-back",
            ))?;
        info!(
            "event=assessment_submit module=service status=ok phase={} percentage={:.1}",
            saved.assessment_type, saved.results.percentage_score
        );
        Ok(saved)
    }

    pub fn load(
        &self,
        section_key: &str,
        phase: AssessmentPhase,
    ) -> RepoResult<Option<StoredAssessment>> {
        self.store.load(section_key, phase)
    }

    /// Loads both sittings and compares them against `evaluation_items`.
    pub fn comparison(
        &self,
        section_key: &str,
        evaluation_items: &[String],
    ) -> RepoResult<AssessmentComparison> {
        let pair = self.store.load_pair(section_key)?;
        let report = compare_pair(&pair, evaluation_items);
        Ok(AssessmentComparison { pair, report })
    }

    /// Removes both sittings of a section (retake from scratch).
    pub fn reset_section(&self, section_key: &str) -> RepoResult<usize> {
        self.store.clear_section(section_key)
    }

    pub fn store(&self) -> &AssessmentStore<K> {
        &self.store
    }
}
