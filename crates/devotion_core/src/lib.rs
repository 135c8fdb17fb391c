//! Core domain logic for the devotional section tracker.
//! This crate is the single source of truth for scoring rules and for every
//! piece of persisted user state.

pub mod content;
pub mod db;
pub mod legacy;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use content::{ContentError, ContentLibrary, ContentResult};
pub use legacy::{export_local_storage, import_local_storage, LegacyImportReport};
pub use logging::{
    active_log_settings, init_logging, init_logging_from_env, start_logging, LogLevel, LogSettings,
    LoggingError,
};
pub use model::assessment::{
    score_assessment, AssessmentDraft, AssessmentInputError, AssessmentPhase, AssessmentResult,
    EvaluationItem, OverallRating, Ratings, ReflectionAnswers, ScoreBand, StoredAssessment,
    MAX_RATING, MIN_RATING,
};
pub use model::completion::{DayCompletion, IdentityStatement};
pub use model::content::{
    curriculum, curriculum_section, CurriculumSection, DailyExercise, ExerciseType,
    SectionExercises, SectionOverview, SectionSummary,
};
pub use model::draft::{DraftField, ExerciseDraft};
pub use repo::assessment_store::{AssessmentPair, AssessmentStore};
pub use repo::completion_store::CompletionStore;
pub use repo::draft_store::{DayAnswers, DraftStore};
pub use repo::identity_store::IdentityStore;
pub use repo::kv_repo::{
    KvEntry, KvRepository, RecordKind, RepoError, RepoResult, SqliteKvRepository, StorageKey,
};
pub use service::assessment_service::{
    AssessmentComparison, AssessmentService, AssessmentServiceError, AssessmentSitting,
};
pub use service::comparison::{
    compare_assessments, compare_pair, ChangeType, ComparisonReport, ComparisonRow,
};
pub use service::progress_service::{
    DayProgress, ProgressService, ProgressServiceError, SectionProgress,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
