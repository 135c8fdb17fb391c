//! Free-text drafts for daily exercise questions and reflection prompts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Which free-text list of an exercise a draft answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    /// Answer to `questions[index]`.
    Question,
    /// Answer to `reflection_prompts[index]`.
    Reflection,
}

impl DraftField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Reflection => "reflection",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "question" => Some(Self::Question),
            "reflection" => Some(Self::Reflection),
            _ => None,
        }
    }
}

impl Display for DraftField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One saved answer draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDraft {
    pub section_key: String,
    pub day: u32,
    pub field: DraftField,
    pub index: usize,
    pub text: String,
    pub updated_at: DateTime<Utc>,
}
