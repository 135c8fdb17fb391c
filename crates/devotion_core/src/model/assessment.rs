//! Self-assessment domain model and scoring.
//!
//! # Responsibility
//! - Define evaluation items, per-item ratings and aggregate results.
//! - Compute `AssessmentResult` from partial rating/reflection input.
//! - Decide submission readiness for an in-progress sitting.
//!
//! # Invariants
//! - Unrated items are absent from `Ratings`, never stored as `0`.
//! - Scoring is pure and does not clamp or validate rating values; the
//!   [`AssessmentDraft`] input boundary is where 1..=10 is enforced.
//! - Strongest/weakest areas hold at most three items and keep original item
//!   order among equal ratings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lowest rating a user can give one evaluation item.
pub const MIN_RATING: u8 = 1;
/// Highest rating a user can give one evaluation item.
pub const MAX_RATING: u8 = 10;

const AREA_LIMIT: usize = 3;

/// Item index -> rating. Missing keys mean "not rated yet".
pub type Ratings = BTreeMap<usize, u8>;
/// Reflection prompt index -> free-text answer.
pub type ReflectionAnswers = BTreeMap<usize, String>;

/// Which of the two weekly sittings an assessment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentPhase {
    /// Taken on the first day of a section.
    Initial,
    /// Taken during the end-of-week review.
    Final,
}

impl AssessmentPhase {
    pub const ALL: [AssessmentPhase; 2] = [AssessmentPhase::Initial, AssessmentPhase::Final];

    /// Stable storage/wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Final => "final",
        }
    }

    /// Parses a storage/wire label. Case-insensitive, whitespace-tolerant.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "initial" => Some(Self::Initial),
            "final" => Some(Self::Final),
            _ => None,
        }
    }
}

impl Display for AssessmentPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One labeled self-rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationItem {
    pub text: String,
    pub rating: u8,
}

/// Aggregate statistics for one completed (or partially completed) sitting.
///
/// Serialized with camelCase field names; this is the persisted shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub total_score: u32,
    pub average_score: f64,
    pub max_possible_score: u32,
    pub percentage_score: f64,
    pub strongest_areas: Vec<EvaluationItem>,
    pub weakest_areas: Vec<EvaluationItem>,
    pub completed_items: usize,
    pub total_items: usize,
    #[serde(default)]
    pub ratings: Ratings,
    #[serde(default)]
    pub reflection_answers: ReflectionAnswers,
}

impl AssessmentResult {
    /// Overall label derived from `percentage_score`.
    pub fn overall_rating(&self) -> OverallRating {
        OverallRating::from_percentage(self.percentage_score)
    }

    /// Band for the per-item average.
    pub fn average_band(&self) -> ScoreBand {
        ScoreBand::from_score(self.average_score)
    }
}

/// Persisted record for one (section, phase) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAssessment {
    pub section_key: String,
    pub section_title: String,
    pub assessment_type: AssessmentPhase,
    pub results: AssessmentResult,
    pub completed_at: DateTime<Utc>,
    /// Item texts as shown at the time of the sitting.
    pub evaluation_items: Vec<String>,
}

/// Computes aggregate results for the given items and partial input.
///
/// Rules:
/// - `total_score`/`completed_items` cover every present rating.
/// - `average_score` is `0.0` when nothing is rated.
/// - `percentage_score` is `0.0` when there are no items.
/// - Areas rank items with rating > 0; stable descending sort, strongest are
///   the first three, weakest are the last three reversed (lowest first).
pub fn score_assessment(
    evaluation_items: &[String],
    ratings: &Ratings,
    reflection_answers: &ReflectionAnswers,
) -> AssessmentResult {
    let completed_items = ratings.len();
    let total_score: u32 = ratings.values().map(|rating| u32::from(*rating)).sum();
    let total_items = evaluation_items.len();
    let max_possible_score = u32::try_from(total_items)
        .unwrap_or(u32::MAX)
        .saturating_mul(u32::from(MAX_RATING));

    let average_score = if completed_items > 0 {
        f64::from(total_score) / completed_items as f64
    } else {
        0.0
    };
    let percentage_score = if max_possible_score > 0 {
        f64::from(total_score) * 100.0 / f64::from(max_possible_score)
    } else {
        0.0
    };

    let mut ranked: Vec<EvaluationItem> = evaluation_items
        .iter()
        .enumerate()
        .map(|(index, text)| EvaluationItem {
            text: text.clone(),
            rating: ratings.get(&index).copied().unwrap_or(0),
        })
        .filter(|item| item.rating > 0)
        .collect();
    // `sort_by` is stable: equal ratings keep item order.
    ranked.sort_by(|a, b| b.rating.cmp(&a.rating));

    let strongest_areas = ranked.iter().take(AREA_LIMIT).cloned().collect();
    let weakest_areas = ranked.iter().rev().take(AREA_LIMIT).cloned().collect();

    AssessmentResult {
        total_score,
        average_score,
        max_possible_score,
        percentage_score,
        strongest_areas,
        weakest_areas,
        completed_items,
        total_items,
        ratings: ratings.clone(),
        reflection_answers: reflection_answers.clone(),
    }
}

/// Returns `true` when every item index in `0..total_items` has a rating.
pub fn ratings_complete(total_items: usize, ratings: &Ratings) -> bool {
    (0..total_items).all(|index| ratings.contains_key(&index))
}

/// Returns `true` when there are no prompts, or every prompt index has a
/// non-blank answer.
pub fn reflections_complete(prompt_count: usize, answers: &ReflectionAnswers) -> bool {
    (0..prompt_count).all(|index| is_answered(answers.get(&index)))
}

/// Counts prompt indexes in `0..prompt_count` with a non-blank answer.
pub fn answered_reflections(prompt_count: usize, answers: &ReflectionAnswers) -> usize {
    (0..prompt_count)
        .filter(|index| is_answered(answers.get(index)))
        .count()
}

fn is_answered(answer: Option<&String>) -> bool {
    answer.is_some_and(|text| !text.trim().is_empty())
}

/// Input validation error raised while filling in an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentInputError {
    /// Rating outside `MIN_RATING..=MAX_RATING`.
    RatingOutOfRange { index: usize, rating: u8 },
}

impl Display for AssessmentInputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RatingOutOfRange { index, rating } => write!(
                f,
                "rating {rating} for item {index} is outside {MIN_RATING}..={MAX_RATING}"
            ),
        }
    }
}

impl Error for AssessmentInputError {}

/// In-progress answers for one sitting.
///
/// Mirrors what the rating buttons and reflection text boxes collect before
/// submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssessmentDraft {
    ratings: Ratings,
    reflection_answers: ReflectionAnswers,
}

impl AssessmentDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or replaces) one item rating.
    pub fn rate(&mut self, index: usize, rating: u8) -> Result<(), AssessmentInputError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AssessmentInputError::RatingOutOfRange { index, rating });
        }
        self.ratings.insert(index, rating);
        Ok(())
    }

    /// Sets (or replaces) one reflection answer. Blank text is kept but does
    /// not count as answered.
    pub fn answer(&mut self, prompt_index: usize, text: impl Into<String>) {
        self.reflection_answers.insert(prompt_index, text.into());
    }

    pub fn ratings(&self) -> &Ratings {
        &self.ratings
    }

    pub fn reflection_answers(&self) -> &ReflectionAnswers {
        &self.reflection_answers
    }

    /// Submission gate: all items rated and all prompts answered.
    pub fn is_ready(&self, total_items: usize, prompt_count: usize) -> bool {
        ratings_complete(total_items, &self.ratings)
            && reflections_complete(prompt_count, &self.reflection_answers)
    }

    /// Live preview of the results for the current input.
    pub fn preview(&self, evaluation_items: &[String]) -> AssessmentResult {
        score_assessment(evaluation_items, &self.ratings, &self.reflection_answers)
    }
}

/// Display band for one rating or an average rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// 8 and above.
    Strong,
    /// 6 up to 8.
    Moderate,
    /// Below 6.
    Weak,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            Self::Strong
        } else if score >= 6.0 {
            Self::Moderate
        } else {
            Self::Weak
        }
    }
}

/// Overall label for a sitting, derived from percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallRating {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
    NeedsSignificantGrowth,
}

impl OverallRating {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            Self::Excellent
        } else if percentage >= 70.0 {
            Self::Good
        } else if percentage >= 60.0 {
            Self::Fair
        } else if percentage >= 50.0 {
            Self::NeedsImprovement
        } else {
            Self::NeedsSignificantGrowth
        }
    }

    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::NeedsImprovement => "Needs Improvement",
            Self::NeedsSignificantGrowth => "Needs Significant Growth",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ratings_complete, reflections_complete, score_assessment, AssessmentDraft,
        AssessmentInputError, OverallRating, Ratings, ReflectionAnswers, ScoreBand,
    };

    fn items(count: usize) -> Vec<String> {
        (0..count).map(|index| format!("item {index}")).collect()
    }

    fn ratings(pairs: &[(usize, u8)]) -> Ratings {
        pairs.iter().copied().collect()
    }

    #[test]
    fn empty_input_scores_zero_without_dividing() {
        let result = score_assessment(&[], &Ratings::new(), &ReflectionAnswers::new());
        assert_eq!(result.total_score, 0);
        assert_eq!(result.average_score, 0.0);
        assert_eq!(result.max_possible_score, 0);
        assert_eq!(result.percentage_score, 0.0);
        assert!(result.strongest_areas.is_empty());
        assert!(result.weakest_areas.is_empty());
    }

    #[test]
    fn partial_ratings_average_over_rated_items_only() {
        let result = score_assessment(
            &items(4),
            &ratings(&[(0, 4), (2, 8)]),
            &ReflectionAnswers::new(),
        );
        assert_eq!(result.completed_items, 2);
        assert_eq!(result.total_items, 4);
        assert_eq!(result.total_score, 12);
        assert_eq!(result.average_score, 6.0);
        assert_eq!(result.max_possible_score, 40);
        assert_eq!(result.percentage_score, 30.0);
    }

    #[test]
    fn areas_use_stable_order_for_ties() {
        let result = score_assessment(
            &items(5),
            &ratings(&[(0, 5), (1, 9), (2, 5), (3, 5), (4, 2)]),
            &ReflectionAnswers::new(),
        );
        let strongest: Vec<_> = result
            .strongest_areas
            .iter()
            .map(|item| item.text.as_str())
            .collect();
        assert_eq!(strongest, ["item 1", "item 0", "item 2"]);

        let weakest: Vec<_> = result
            .weakest_areas
            .iter()
            .map(|item| item.text.as_str())
            .collect();
        assert_eq!(weakest, ["item 4", "item 3", "item 2"]);
    }

    #[test]
    fn areas_overlap_when_few_items_are_rated() {
        let result = score_assessment(
            &items(2),
            &ratings(&[(0, 3), (1, 7)]),
            &ReflectionAnswers::new(),
        );
        assert_eq!(result.strongest_areas.len(), 2);
        assert_eq!(result.weakest_areas.len(), 2);
        assert_eq!(result.weakest_areas[0].rating, 3);
        assert_eq!(result.strongest_areas[0].rating, 7);
    }

    #[test]
    fn readiness_requires_every_index_and_non_blank_reflections() {
        assert!(!ratings_complete(3, &ratings(&[(0, 1), (1, 1), (5, 1)])));
        assert!(ratings_complete(2, &ratings(&[(0, 1), (1, 1)])));

        let mut answers = ReflectionAnswers::new();
        assert!(reflections_complete(0, &answers));
        answers.insert(0, "   ".to_string());
        assert!(!reflections_complete(1, &answers));
        answers.insert(0, "grateful".to_string());
        assert!(reflections_complete(1, &answers));
    }

    #[test]
    fn draft_rejects_out_of_range_ratings() {
        let mut draft = AssessmentDraft::new();
        assert_eq!(
            draft.rate(0, 0),
            Err(AssessmentInputError::RatingOutOfRange {
                index: 0,
                rating: 0
            })
        );
        assert!(draft.rate(0, 11).is_err());
        draft.rate(0, 10).unwrap();
        assert_eq!(draft.ratings().get(&0), Some(&10));
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(ScoreBand::from_score(8.0), ScoreBand::Strong);
        assert_eq!(ScoreBand::from_score(7.9), ScoreBand::Moderate);
        assert_eq!(ScoreBand::from_score(5.5), ScoreBand::Weak);
        assert_eq!(OverallRating::from_percentage(80.0).label(), "Excellent");
        assert_eq!(OverallRating::from_percentage(60.0), OverallRating::Fair);
        assert_eq!(
            OverallRating::from_percentage(49.9),
            OverallRating::NeedsSignificantGrowth
        );
    }
}
