//! Daily exercise progress use-case service.
//!
//! # Responsibility
//! - Save free-text answers for a day's questions and reflection prompts.
//! - Auto-complete a day once every required field is non-blank.
//! - Report section progress (completed days and percentage).
//!
//! # Invariants
//! - Auto-completion is monotonic: clearing an answer never un-marks a day.
//!   Only `mark_day_incomplete` removes the flag.
//! - Days and field indexes must exist in loaded content.

use crate::content::ContentLibrary;
use crate::model::completion::DayCompletion;
use crate::model::content::DailyExercise;
use crate::model::draft::DraftField;
use crate::repo::completion_store::CompletionStore;
use crate::repo::draft_store::{DayAnswers, DraftStore};
use crate::repo::kv_repo::{KvRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for progress use-cases.
#[derive(Debug)]
pub enum ProgressServiceError {
    /// Section has no exercises in loaded content.
    UnknownSection(String),
    /// Section has no exercise for this day.
    UnknownDay { section_key: String, day: u32 },
    /// Field index is outside the exercise's question/prompt list.
    InvalidFieldIndex {
        field: DraftField,
        index: usize,
        len: usize,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ProgressServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownSection(section_key) => write!(f, "unknown section: `{section_key}`"),
            Self::UnknownDay { section_key, day } => {
                write!(f, "section `{section_key}` has no exercise for day {day}")
            }
            Self::InvalidFieldIndex { field, index, len } => {
                write!(f, "{field} index {index} is out of range (len {len})")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProgressServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProgressServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Progress of one day after an answer was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayProgress {
    pub day: u32,
    /// Required fields with a non-blank answer.
    pub answered: usize,
    pub required: usize,
    pub completed: bool,
    /// This call flipped the day to complete.
    pub newly_completed: bool,
}

/// Progress of one section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionProgress {
    pub completed_days: Vec<u32>,
    pub total_days: u32,
    pub percentage: f64,
}

/// Day progress service over drafts, completions and loaded content.
pub struct ProgressService<'lib, K: KvRepository> {
    content: &'lib ContentLibrary,
    drafts: DraftStore<K>,
    completions: CompletionStore<K>,
}

impl<'lib, K: KvRepository + Clone> ProgressService<'lib, K> {
    pub fn new(kv: K, content: &'lib ContentLibrary) -> Self {
        Self {
            content,
            drafts: DraftStore::new(kv.clone()),
            completions: CompletionStore::new(kv),
        }
    }

    /// Saves one answer and auto-completes the day when all required fields
    /// are answered.
    ///
    /// # Errors
    /// - `UnknownDay` / `InvalidFieldIndex` when the slot is not in content.
    pub fn record_answer(
        &self,
        section_key: &str,
        day: u32,
        field: DraftField,
        index: usize,
        text: &str,
    ) -> Result<DayProgress, ProgressServiceError> {
        let exercise = self.exercise(section_key, day)?;
        let len = exercise.field_len(field);
        if index >= len {
            return Err(ProgressServiceError::InvalidFieldIndex { field, index, len });
        }

        self.drafts.save(section_key, day, field, index, text)?;
        let answers = self.drafts.load_day(section_key, day)?;
        let (answered, required) = count_answered(exercise, &answers);

        let mut completed = self.completions.is_complete(section_key, day)?;
        let mut newly_completed = false;
        if !completed && required > 0 && answered == required {
            self.completions.mark_complete(section_key, day)?;
            completed = true;
            newly_completed = true;
            info!(
                "event=day_auto_complete module=service status=ok day={day} required={required}"
            );
        }

        Ok(DayProgress {
            day,
            answered,
            required,
            completed,
            newly_completed,
        })
    }

    /// Saved answers of one day.
    pub fn answers(&self, section_key: &str, day: u32) -> Result<DayAnswers, ProgressServiceError> {
        self.exercise(section_key, day)?;
        Ok(self.drafts.load_day(section_key, day)?)
    }

    /// Explicitly marks a day complete (days without free-text fields).
    pub fn mark_day_complete(
        &self,
        section_key: &str,
        day: u32,
    ) -> Result<DayCompletion, ProgressServiceError> {
        self.exercise(section_key, day)?;
        Ok(self.completions.mark_complete(section_key, day)?)
    }

    /// Removes the completion flag of a day. Drafts are kept.
    pub fn mark_day_incomplete(
        &self,
        section_key: &str,
        day: u32,
    ) -> Result<bool, ProgressServiceError> {
        Ok(self.completions.mark_incomplete(section_key, day)?)
    }

    pub fn is_day_complete(&self, section_key: &str, day: u32) -> Result<bool, ProgressServiceError> {
        Ok(self.completions.is_complete(section_key, day)?)
    }

    /// Completed days against the number of exercises in content.
    pub fn section_progress(
        &self,
        section_key: &str,
    ) -> Result<SectionProgress, ProgressServiceError> {
        let section = self
            .content
            .exercises(section_key)
            .ok_or_else(|| ProgressServiceError::UnknownSection(section_key.to_string()))?;
        let total_days = u32::try_from(section.daily_exercises.len()).unwrap_or(u32::MAX);
        let completed_days = self.completions.list_completed_days(section_key)?;
        let percentage = self
            .completions
            .completion_percentage(section_key, total_days)?;

        Ok(SectionProgress {
            completed_days,
            total_days,
            percentage,
        })
    }

    fn exercise(&self, section_key: &str, day: u32) -> Result<&'lib DailyExercise, ProgressServiceError> {
        self.content
            .exercise(section_key, day)
            .ok_or_else(|| ProgressServiceError::UnknownDay {
                section_key: section_key.to_string(),
                day,
            })
    }
}

fn count_answered(exercise: &DailyExercise, answers: &DayAnswers) -> (usize, usize) {
    let required = exercise.required_fields();
    let answered = required
        .iter()
        .filter(|slot| {
            answers
                .get(*slot)
                .is_some_and(|text| !text.trim().is_empty())
        })
        .count();
    (answered, required.len())
}
