//! Curriculum content shapes.
//!
//! # Responsibility
//! - Mirror the three static JSON documents (overviews, daily exercises,
//!   summaries) as typed, read-only structures.
//! - Expose which free-text fields of an exercise must be filled before the
//!   day counts as complete.
//!
//! # Invariants
//! - Content is never mutated after load.
//! - Missing optional fields deserialize to empty values instead of failing.
//! - Unknown exercise `type` strings map to `ExerciseType::Other`.

use crate::model::draft::DraftField;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Static catalogue entry for one curriculum section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurriculumSection {
    /// Storage and content lookup key, e.g. `relationship`.
    pub key: &'static str,
    pub name: &'static str,
    pub number: u32,
}

const CURRICULUM: [CurriculumSection; 9] = [
    CurriculumSection { key: "relationship", name: "Relationship", number: 1 },
    CurriculumSection { key: "rhythm", name: "Rhythm", number: 2 },
    CurriculumSection { key: "reconciliation", name: "Reconciliation", number: 3 },
    CurriculumSection { key: "radiance", name: "Radiance", number: 4 },
    CurriculumSection { key: "response", name: "Response", number: 5 },
    CurriculumSection { key: "resistance", name: "Resistance", number: 6 },
    CurriculumSection { key: "resources", name: "Resources", number: 7 },
    CurriculumSection { key: "refuel", name: "Refuel", number: 8 },
    CurriculumSection { key: "replication", name: "Replication", number: 9 },
];

/// Returns all curriculum sections in teaching order.
pub fn curriculum() -> &'static [CurriculumSection] {
    &CURRICULUM
}

/// Looks up one curriculum section by key.
pub fn curriculum_section(key: &str) -> Option<&'static CurriculumSection> {
    let key = key.trim();
    CURRICULUM.iter().find(|section| section.key == key)
}

/// Group meeting block of a section overview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meeting {
    pub title: String,
    pub scripture: String,
    pub introduction: String,
    pub key_concepts: Vec<String>,
    pub discussion_points: Vec<String>,
}

/// Entry of `section-overviews.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionOverview {
    pub section_number: u32,
    pub title: String,
    #[serde(default)]
    pub core_habit: String,
    #[serde(default)]
    pub meeting: Option<Meeting>,
}

/// Exercise category. Drives how a day is presented and completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    Assessment,
    ScriptureStudy,
    PracticalExercise,
    #[serde(other)]
    Other,
}

impl ExerciseType {
    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Assessment => "Self-Assessment",
            Self::ScriptureStudy => "Scripture Study",
            Self::PracticalExercise => "Practical Exercise",
            Self::Other => "Exercise",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    #[serde(default)]
    pub author: String,
}

/// One numbered day of a section.
///
/// Type-specific shapes that are only rendered (action items, nested
/// exercises) are kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyExercise {
    pub day: u32,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ExerciseType,
    #[serde(default)]
    pub scripture: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub evaluation_items: Vec<String>,
    #[serde(default)]
    pub reflection_prompts: Vec<String>,
    #[serde(default)]
    pub quotes: Vec<Quote>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DailyExercise {
    /// Number of free-text slots for `field`.
    pub fn field_len(&self, field: DraftField) -> usize {
        match field {
            DraftField::Question => self.questions.len(),
            DraftField::Reflection => self.reflection_prompts.len(),
        }
    }

    /// Free-text slots that must be non-blank before the day auto-completes.
    ///
    /// Assessment days are answered through the assessment flow, so their
    /// reflection prompts are not drafts and nothing is required here.
    pub fn required_fields(&self) -> Vec<(DraftField, usize)> {
        if self.kind == ExerciseType::Assessment {
            return Vec::new();
        }

        let questions = (0..self.questions.len()).map(|index| (DraftField::Question, index));
        let reflections =
            (0..self.reflection_prompts.len()).map(|index| (DraftField::Reflection, index));
        questions.chain(reflections).collect()
    }
}

/// Entry of `daily-exercises.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionExercises {
    #[serde(default)]
    pub section_number: u32,
    pub title: String,
    #[serde(default)]
    pub core_habit: String,
    #[serde(default)]
    pub daily_exercises: Vec<DailyExercise>,
}

impl SectionExercises {
    pub fn exercise(&self, day: u32) -> Option<&DailyExercise> {
        self.daily_exercises.iter().find(|exercise| exercise.day == day)
    }

    /// First assessment-type exercise, which defines the weekly item set.
    pub fn assessment_exercise(&self) -> Option<&DailyExercise> {
        self.daily_exercises
            .iter()
            .find(|exercise| exercise.kind == ExerciseType::Assessment)
    }
}

/// Body of a section summary. Section-specific frameworks land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryBody {
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub key_thoughts: Vec<String>,
    #[serde(default)]
    pub identity_statement: String,
    #[serde(default)]
    pub habit_tracker_items: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Entry of `section-summaries.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub core_habit: String,
    #[serde(default)]
    pub summary: SummaryBody,
}
