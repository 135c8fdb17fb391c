//! Initial-vs-final assessment comparison.
//!
//! # Responsibility
//! - Diff the two sittings of a section item by item.
//! - Summarize the diff (average delta, per-change-type counts).
//!
//! # Invariants
//! - Rows follow the canonical item list; a missing rating on either side
//!   counts as `0`.
//! - No rows are produced unless both sittings exist.
//! - Item alignment is reported, not enforced: rows are index-matched even
//!   when the stored item lists differ from the canonical one.

use crate::model::assessment::StoredAssessment;
use crate::repo::assessment_store::AssessmentPair;
use log::warn;
use serde::{Deserialize, Serialize};

/// Direction of change for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Improved,
    Declined,
    Same,
}

impl ChangeType {
    pub fn from_change(change: i16) -> Self {
        match change {
            c if c > 0 => Self::Improved,
            c if c < 0 => Self::Declined,
            _ => Self::Same,
        }
    }
}

/// One compared evaluation item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub text: String,
    pub initial_rating: u8,
    pub final_rating: u8,
    pub change: i16,
    pub change_type: ChangeType,
}

/// Week-review comparison of one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub rows: Vec<ComparisonRow>,
    pub initial_average: f64,
    pub final_average: f64,
    /// `final_average - initial_average`.
    pub average_delta: f64,
    pub improved: usize,
    pub declined: usize,
    pub unchanged: usize,
    /// Both stored item lists equal the canonical list.
    pub items_aligned: bool,
}

impl ComparisonReport {
    /// Averages moved up.
    pub fn overall_change(&self) -> ChangeType {
        if self.average_delta > 0.0 {
            ChangeType::Improved
        } else if self.average_delta < 0.0 {
            ChangeType::Declined
        } else {
            ChangeType::Same
        }
    }
}

/// Compares two sittings against the canonical item list.
pub fn compare_assessments(
    initial: &StoredAssessment,
    final_: &StoredAssessment,
    evaluation_items: &[String],
) -> ComparisonReport {
    let items_aligned = initial.evaluation_items.as_slice() == evaluation_items
        && final_.evaluation_items.as_slice() == evaluation_items;
    if !items_aligned {
        warn!(
            "event=assessment_compare module=service status=misaligned section={} canonical={} initial={} final={}",
            initial.section_key,
            evaluation_items.len(),
            initial.evaluation_items.len(),
            final_.evaluation_items.len()
        );
    }

    let rows: Vec<ComparisonRow> = evaluation_items
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let initial_rating = initial.results.ratings.get(&index).copied().unwrap_or(0);
            let final_rating = final_.results.ratings.get(&index).copied().unwrap_or(0);
            let change = i16::from(final_rating) - i16::from(initial_rating);
            ComparisonRow {
                text: text.clone(),
                initial_rating,
                final_rating,
                change,
                change_type: ChangeType::from_change(change),
            }
        })
        .collect();

    let count = |kind: ChangeType| rows.iter().filter(|row| row.change_type == kind).count();
    let improved = count(ChangeType::Improved);
    let declined = count(ChangeType::Declined);
    let unchanged = count(ChangeType::Same);

    let initial_average = initial.results.average_score;
    let final_average = final_.results.average_score;

    ComparisonReport {
        rows,
        initial_average,
        final_average,
        average_delta: final_average - initial_average,
        improved,
        declined,
        unchanged,
        items_aligned,
    }
}

/// Compares a stored pair; `None` while either sitting is missing.
pub fn compare_pair(pair: &AssessmentPair, evaluation_items: &[String]) -> Option<ComparisonReport> {
    match (&pair.initial, &pair.final_) {
        (Some(initial), Some(final_)) => {
            Some(compare_assessments(initial, final_, evaluation_items))
        }
        _ => None,
    }
}
