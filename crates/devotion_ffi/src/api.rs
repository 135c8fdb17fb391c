//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose assessment, day progress, identity and legacy-import use-cases
//!   to Dart via FRB.
//! - Flatten core records into plain envelopes the UI renders directly.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures surface as `ok=false` plus a diagnostic message. User free text
//!   is never echoed into messages.
//!
//! # See also
//! - `devotion_core::logging` for the log contract.

use devotion_core::db::open_db;
use devotion_core::{
    core_version as core_version_inner, export_local_storage, import_local_storage,
    init_logging as init_logging_inner, ping as ping_inner, AssessmentComparison, AssessmentDraft,
    AssessmentPhase, AssessmentService, AssessmentSitting, AssessmentStore, ChangeType,
    CompletionStore, ContentLibrary, DraftField, DraftStore, EvaluationItem, IdentityStore,
    KvRepository, ProgressService, RepoError, ScoreBand, SqliteKvRepository, StoredAssessment,
};
use log::warn;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const DB_FILE_NAME: &str = "devotion.sqlite3";
const DB_PATH_ENV: &str = "DEVOTION_DB_PATH";
const CONTENT_DIR_ENV: &str = "DEVOTION_CONTENT_DIR";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static CONTENT: OnceLock<LoadedContent> = OnceLock::new();

struct LoadedContent {
    dir: PathBuf,
    library: ContentLibrary,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Loads the three curriculum documents from `content_dir` once per process.
///
/// # FFI contract
/// - Repeating the call with the same directory is a no-op.
/// - A different directory after a successful load returns error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn content_load(content_dir: String) -> String {
    let dir = PathBuf::from(content_dir.trim());
    if dir.as_os_str().is_empty() {
        return "content_dir must not be empty".to_string();
    }
    if let Some(loaded) = CONTENT.get() {
        return same_content_dir(loaded, &dir);
    }

    match ContentLibrary::load_dir(&dir) {
        Ok(library) => {
            let loaded = CONTENT.get_or_init(|| LoadedContent {
                dir: dir.clone(),
                library,
            });
            same_content_dir(loaded, &dir)
        }
        Err(err) => err.to_string(),
    }
}

/// Plain success/failure envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// One ranked evaluation item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaItem {
    pub text: String,
    pub rating: u8,
}

/// Flattened stored assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentView {
    pub section_key: String,
    pub section_title: String,
    /// `initial|final`.
    pub phase: String,
    pub total_score: u32,
    pub average_score: f64,
    pub max_possible_score: u32,
    pub percentage_score: f64,
    /// Overall label such as `Good` or `Needs Improvement`.
    pub overall_label: String,
    /// `strong|moderate|weak` band of `average_score`.
    pub average_band: String,
    pub strongest_areas: Vec<AreaItem>,
    pub weakest_areas: Vec<AreaItem>,
    pub completed_items: u32,
    pub total_items: u32,
    /// RFC 3339 UTC timestamp.
    pub completed_at: String,
}

/// Assessment submit/get envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentResponse {
    pub ok: bool,
    /// Stored record; `None` on failure or when nothing is saved yet.
    pub record: Option<AssessmentView>,
    pub message: String,
}

impl AssessmentResponse {
    fn success(message: impl Into<String>, record: Option<&StoredAssessment>) -> Self {
        Self {
            ok: true,
            record: record.map(to_assessment_view),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            record: None,
            message: message.into(),
        }
    }
}

/// One compared evaluation item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRowItem {
    pub text: String,
    pub initial_rating: u8,
    pub final_rating: u8,
    pub change: i32,
    /// `improved|declined|same`.
    pub change_type: String,
}

/// Week-review comparison envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResponse {
    pub ok: bool,
    pub has_initial: bool,
    pub has_final: bool,
    /// Empty until both sittings exist.
    pub rows: Vec<ComparisonRowItem>,
    pub initial_average: f64,
    pub final_average: f64,
    pub average_delta: f64,
    pub items_aligned: bool,
    pub message: String,
}

impl ComparisonResponse {
    fn from_comparison(comparison: &AssessmentComparison) -> Self {
        let has_initial = comparison.pair.initial.is_some();
        let has_final = comparison.pair.final_.is_some();
        match &comparison.report {
            Some(report) => Self {
                ok: true,
                has_initial,
                has_final,
                rows: report
                    .rows
                    .iter()
                    .map(|row| ComparisonRowItem {
                        text: row.text.clone(),
                        initial_rating: row.initial_rating,
                        final_rating: row.final_rating,
                        change: i32::from(row.change),
                        change_type: change_type_label(row.change_type).to_string(),
                    })
                    .collect(),
                initial_average: report.initial_average,
                final_average: report.final_average,
                average_delta: report.average_delta,
                items_aligned: report.items_aligned,
                message: "Comparison ready.".to_string(),
            },
            None => Self {
                ok: true,
                has_initial,
                has_final,
                message: "Both assessments are required for comparison.".to_string(),
                ..Self::failure(String::new())
            },
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            has_initial: false,
            has_final: false,
            rows: Vec::new(),
            initial_average: 0.0,
            final_average: 0.0,
            average_delta: 0.0,
            items_aligned: false,
            message: message.into(),
        }
    }
}

/// Completed day list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaysResponse {
    pub ok: bool,
    /// Ascending, duplicate-free.
    pub completed_days: Vec<u32>,
    pub message: String,
}

impl DaysResponse {
    fn from_result(result: Result<Vec<u32>, String>, operation: &str) -> Self {
        match result {
            Ok(completed_days) => Self {
                ok: true,
                message: format!("{} day(s) complete.", completed_days.len()),
                completed_days,
            },
            Err(err) => Self {
                ok: false,
                completed_days: Vec::new(),
                message: format!("{operation} failed: {err}"),
            },
        }
    }
}

/// Identity statement envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityResponse {
    pub ok: bool,
    pub statement: Option<String>,
    pub message: String,
}

/// Saved answer of one exercise field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseAnswer {
    /// `question|reflection`.
    pub field: String,
    pub index: u32,
    pub text: String,
}

/// Saved answers of one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseAnswersResponse {
    pub ok: bool,
    pub answers: Vec<ExerciseAnswer>,
    pub message: String,
}

/// Day progress after one recorded answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayProgressResponse {
    pub ok: bool,
    pub answered: u32,
    pub required: u32,
    pub completed: bool,
    /// This call flipped the day to complete.
    pub newly_completed: bool,
    pub message: String,
}

/// Section progress envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionProgressResponse {
    pub ok: bool,
    pub completed_days: Vec<u32>,
    pub total_days: u32,
    pub percentage: f64,
    pub message: String,
}

/// One browser local-storage pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyEntry {
    pub key: String,
    pub value: String,
}

/// Legacy import counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyImportResponse {
    pub ok: bool,
    pub imported: u32,
    pub skipped_unrecognized: u32,
    pub skipped_invalid: u32,
    pub message: String,
}

/// Legacy export envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyExportResponse {
    pub ok: bool,
    pub entries: Vec<LegacyEntry>,
    pub message: String,
}

/// Submits one assessment sitting.
///
/// Input semantics:
/// - `phase`: `initial|final` (case-insensitive).
/// - `ratings[i]` rates `evaluation_items[i]`; `None` means not rated yet.
/// - `reflection_answers[i]` answers `reflection_prompts[i]`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Nothing is written unless every item is rated 1..=10 and every prompt
///   has a non-blank answer.
/// - More ratings than evaluation items is rejected.
/// - Returns the record as read back from storage.
#[flutter_rust_bridge::frb(sync)]
pub fn assessment_submit(
    section_key: String,
    section_title: String,
    phase: String,
    evaluation_items: Vec<String>,
    reflection_prompts: Vec<String>,
    ratings: Vec<Option<u8>>,
    reflection_answers: Vec<String>,
) -> AssessmentResponse {
    let Some(parsed_phase) = AssessmentPhase::parse(&phase) else {
        return AssessmentResponse::failure(format!(
            "assessment_submit failed: unknown phase `{}`",
            phase.trim()
        ));
    };

    if ratings.len() > evaluation_items.len() {
        return AssessmentResponse::failure(format!(
            "assessment_submit failed: {} ratings given for {} items",
            ratings.len(),
            evaluation_items.len()
        ));
    }

    let mut draft = AssessmentDraft::new();
    for (index, rating) in ratings.into_iter().enumerate() {
        if let Some(rating) = rating {
            if let Err(err) = draft.rate(index, rating) {
                return AssessmentResponse::failure(format!("assessment_submit failed: {err}"));
            }
        }
    }
    for (index, answer) in reflection_answers.into_iter().enumerate() {
        draft.answer(index, answer);
    }

    let sitting = AssessmentSitting {
        section_key: section_key.trim().to_string(),
        section_title: section_title.trim().to_string(),
        phase: parsed_phase,
        evaluation_items,
        reflection_prompts,
    };
    match with_kv(|kv| AssessmentService::new(kv).submit(&sitting, &draft)) {
        Ok(record) => AssessmentResponse::success("Assessment saved.", Some(&record)),
        Err(err) => AssessmentResponse::failure(format!("assessment_submit failed: {err}")),
    }
}

/// Loads one stored sitting.
///
/// # FFI contract
/// - Never panics.
/// - `ok=true` with `record=None` when nothing is saved for this phase.
#[flutter_rust_bridge::frb(sync)]
pub fn assessment_get(section_key: String, phase: String) -> AssessmentResponse {
    let Some(parsed_phase) = AssessmentPhase::parse(&phase) else {
        return AssessmentResponse::failure(format!(
            "assessment_get failed: unknown phase `{}`",
            phase.trim()
        ));
    };

    match with_kv(|kv| AssessmentStore::new(kv).load(&section_key, parsed_phase)) {
        Ok(Some(record)) => AssessmentResponse::success("Assessment found.", Some(&record)),
        Ok(None) => AssessmentResponse::success("No assessment saved.", None),
        Err(err) => AssessmentResponse::failure(format!("assessment_get failed: {err}")),
    }
}

/// Compares both sittings of a section against `evaluation_items`.
///
/// # FFI contract
/// - Never panics.
/// - `rows` stays empty until both sittings exist.
#[flutter_rust_bridge::frb(sync)]
pub fn assessment_comparison(
    section_key: String,
    evaluation_items: Vec<String>,
) -> ComparisonResponse {
    match with_kv(|kv| AssessmentService::new(kv).comparison(&section_key, &evaluation_items)) {
        Ok(comparison) => ComparisonResponse::from_comparison(&comparison),
        Err(err) => ComparisonResponse::failure(format!("assessment_comparison failed: {err}")),
    }
}

/// Marks one day complete and returns the section's completed days.
#[flutter_rust_bridge::frb(sync)]
pub fn day_mark_complete(section_key: String, day: u32) -> DaysResponse {
    let result = validate_day(day).and_then(|day| {
        with_kv(|kv| {
            let store = CompletionStore::new(kv);
            store.mark_complete(&section_key, day)?;
            store.list_completed_days(&section_key)
        })
    });
    DaysResponse::from_result(result, "day_mark_complete")
}

/// Removes one completion flag and returns the section's completed days.
#[flutter_rust_bridge::frb(sync)]
pub fn day_mark_incomplete(section_key: String, day: u32) -> DaysResponse {
    let result = validate_day(day).and_then(|day| {
        with_kv(|kv| {
            let store = CompletionStore::new(kv);
            store.mark_incomplete(&section_key, day)?;
            store.list_completed_days(&section_key)
        })
    });
    DaysResponse::from_result(result, "day_mark_incomplete")
}

/// Completed days of one section, ascending.
#[flutter_rust_bridge::frb(sync)]
pub fn day_list_completed(section_key: String) -> DaysResponse {
    let result = with_kv(|kv| CompletionStore::new(kv).list_completed_days(&section_key));
    DaysResponse::from_result(result, "day_list_completed")
}

/// Saves the identity statement of a section, replacing any previous one.
///
/// # FFI contract
/// - Never panics.
/// - Blank statements are rejected without writing.
#[flutter_rust_bridge::frb(sync)]
pub fn identity_save(
    section_key: String,
    section_title: String,
    statement: String,
) -> IdentityResponse {
    let statement = statement.trim();
    if statement.is_empty() {
        return IdentityResponse {
            ok: false,
            statement: None,
            message: "identity_save failed: statement must not be blank".to_string(),
        };
    }

    match with_kv(|kv| IdentityStore::new(kv).save(&section_key, section_title.trim(), statement)) {
        Ok(record) => IdentityResponse {
            ok: true,
            statement: Some(record.statement),
            message: "Identity statement saved.".to_string(),
        },
        Err(err) => IdentityResponse {
            ok: false,
            statement: None,
            message: format!("identity_save failed: {err}"),
        },
    }
}

/// Loads the identity statement of a section.
#[flutter_rust_bridge::frb(sync)]
pub fn identity_get(section_key: String) -> IdentityResponse {
    match with_kv(|kv| IdentityStore::new(kv).load_statement(&section_key)) {
        Ok(statement) => IdentityResponse {
            ok: true,
            message: if statement.is_some() {
                "Identity statement found.".to_string()
            } else {
                "No identity statement saved.".to_string()
            },
            statement,
        },
        Err(err) => IdentityResponse {
            ok: false,
            statement: None,
            message: format!("identity_get failed: {err}"),
        },
    }
}

/// Records one free-text answer and auto-completes the day when every
/// required field is answered.
///
/// # FFI contract
/// - Requires loaded content (`content_load` or `DEVOTION_CONTENT_DIR`).
/// - `field`: `question|reflection`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn exercise_record_answer(
    section_key: String,
    day: u32,
    field: String,
    index: u32,
    text: String,
) -> DayProgressResponse {
    let result = parse_field(&field).and_then(|field| {
        let content = loaded_content()?;
        with_kv(|kv| {
            ProgressService::new(kv, content).record_answer(
                &section_key,
                day,
                field,
                index as usize,
                &text,
            )
        })
    });

    match result {
        Ok(progress) => DayProgressResponse {
            ok: true,
            answered: to_u32(progress.answered),
            required: to_u32(progress.required),
            completed: progress.completed,
            newly_completed: progress.newly_completed,
            message: if progress.newly_completed {
                "Day complete.".to_string()
            } else {
                "Answer saved.".to_string()
            },
        },
        Err(err) => DayProgressResponse {
            ok: false,
            answered: 0,
            required: 0,
            completed: false,
            newly_completed: false,
            message: format!("exercise_record_answer failed: {err}"),
        },
    }
}

/// Saved answers of one day, ordered by field then index.
#[flutter_rust_bridge::frb(sync)]
pub fn exercise_answers(section_key: String, day: u32) -> ExerciseAnswersResponse {
    match with_kv(|kv| DraftStore::new(kv).load_day(&section_key, day)) {
        Ok(answers) => ExerciseAnswersResponse {
            ok: true,
            message: format!("{} answer(s) saved.", answers.len()),
            answers: answers
                .into_iter()
                .map(|((field, index), text)| ExerciseAnswer {
                    field: field.as_str().to_string(),
                    index: to_u32(index),
                    text,
                })
                .collect(),
        },
        Err(err) => ExerciseAnswersResponse {
            ok: false,
            answers: Vec::new(),
            message: format!("exercise_answers failed: {err}"),
        },
    }
}

/// Completed days and percentage over the section's exercise count.
#[flutter_rust_bridge::frb(sync)]
pub fn section_progress(section_key: String) -> SectionProgressResponse {
    let result = loaded_content().and_then(|content| {
        with_kv(|kv| ProgressService::new(kv, content).section_progress(&section_key))
    });

    match result {
        Ok(progress) => SectionProgressResponse {
            ok: true,
            message: format!("{:.0}% complete.", progress.percentage),
            completed_days: progress.completed_days,
            total_days: progress.total_days,
            percentage: progress.percentage,
        },
        Err(err) => SectionProgressResponse {
            ok: false,
            completed_days: Vec::new(),
            total_days: 0,
            percentage: 0.0,
            message: format!("section_progress failed: {err}"),
        },
    }
}

/// Removes every record of one section: assessments, completions, drafts
/// and identity statement.
#[flutter_rust_bridge::frb(sync)]
pub fn section_reset(section_key: String) -> ActionResponse {
    let result = with_kv(|kv| {
        let assessments = AssessmentStore::new(kv).clear_section(&section_key)?;
        let days = CompletionStore::new(kv).clear(&section_key, None)?;
        let drafts = DraftStore::new(kv).clear_section(&section_key)?;
        let identity = IdentityStore::new(kv).clear(&section_key)?;
        Ok::<_, RepoError>(assessments + days + drafts + usize::from(identity))
    });

    match result {
        Ok(removed) => ActionResponse::success(format!("Removed {removed} record(s).")),
        Err(err) => ActionResponse::failure(format!("section_reset failed: {err}")),
    }
}

/// Removes every stored record of every section.
#[flutter_rust_bridge::frb(sync)]
pub fn storage_clear_all() -> ActionResponse {
    match with_kv(|kv| kv.clear_all()) {
        Ok(removed) => {
            warn!("event=storage_clear module=ffi status=ok removed={removed}");
            ActionResponse::success(format!("Removed {removed} record(s)."))
        }
        Err(err) => ActionResponse::failure(format!("storage_clear_all failed: {err}")),
    }
}

/// Imports browser local-storage pairs, overwriting existing records.
///
/// # FFI contract
/// - Never panics.
/// - Unrecognized or undecodable entries are skipped and counted.
#[flutter_rust_bridge::frb(sync)]
pub fn legacy_import(entries: Vec<LegacyEntry>) -> LegacyImportResponse {
    let pairs: Vec<(String, String)> = entries
        .into_iter()
        .map(|entry| (entry.key, entry.value))
        .collect();

    match with_kv(|kv| import_local_storage(&kv, &pairs)) {
        Ok(report) => LegacyImportResponse {
            ok: true,
            imported: to_u32(report.imported),
            skipped_unrecognized: to_u32(report.skipped_unrecognized),
            skipped_invalid: to_u32(report.skipped_invalid),
            message: format!("Imported {} record(s).", report.imported),
        },
        Err(err) => LegacyImportResponse {
            ok: false,
            imported: 0,
            skipped_unrecognized: 0,
            skipped_invalid: 0,
            message: format!("legacy_import failed: {err}"),
        },
    }
}

/// Exports assessments, completions and identity statements as
/// local-storage pairs.
#[flutter_rust_bridge::frb(sync)]
pub fn legacy_export() -> LegacyExportResponse {
    match with_kv(|kv| export_local_storage(&kv)) {
        Ok(pairs) => LegacyExportResponse {
            ok: true,
            message: format!("Exported {} record(s).", pairs.len()),
            entries: pairs
                .into_iter()
                .map(|(key, value)| LegacyEntry { key, value })
                .collect(),
        },
        Err(err) => LegacyExportResponse {
            ok: false,
            entries: Vec::new(),
            message: format!("legacy_export failed: {err}"),
        },
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_kv<T, E: Display>(
    f: impl FnOnce(SqliteKvRepository<'_>) -> Result<T, E>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("DB open failed: {err}"))?;
    let kv =
        SqliteKvRepository::try_new(&conn).map_err(|err| format!("repo init failed: {err}"))?;
    f(kv).map_err(|err| err.to_string())
}

fn loaded_content() -> Result<&'static ContentLibrary, String> {
    if CONTENT.get().is_none() {
        let dir = std::env::var(CONTENT_DIR_ENV).unwrap_or_default();
        if dir.trim().is_empty() {
            return Err(format!(
                "content not loaded; call content_load or set {CONTENT_DIR_ENV}"
            ));
        }
        let error = content_load(dir);
        if !error.is_empty() {
            return Err(error);
        }
    }
    CONTENT
        .get()
        .map(|loaded| &loaded.library)
        .ok_or_else(|| "content not loaded".to_string())
}

fn same_content_dir(loaded: &LoadedContent, dir: &Path) -> String {
    if loaded.dir.as_path() == dir {
        String::new()
    } else {
        format!("content already loaded from `{}`", loaded.dir.display())
    }
}

fn validate_day(day: u32) -> Result<u32, String> {
    if day == 0 {
        return Err("day must be 1 or greater".to_string());
    }
    Ok(day)
}

fn parse_field(field: &str) -> Result<DraftField, String> {
    DraftField::parse(field).ok_or_else(|| format!("unknown field `{}`", field.trim()))
}

fn to_assessment_view(record: &StoredAssessment) -> AssessmentView {
    let results = &record.results;
    AssessmentView {
        section_key: record.section_key.clone(),
        section_title: record.section_title.clone(),
        phase: record.assessment_type.as_str().to_string(),
        total_score: results.total_score,
        average_score: results.average_score,
        max_possible_score: results.max_possible_score,
        percentage_score: results.percentage_score,
        overall_label: results.overall_rating().label().to_string(),
        average_band: score_band_label(results.average_band()).to_string(),
        strongest_areas: results.strongest_areas.iter().map(to_area_item).collect(),
        weakest_areas: results.weakest_areas.iter().map(to_area_item).collect(),
        completed_items: to_u32(results.completed_items),
        total_items: to_u32(results.total_items),
        completed_at: record.completed_at.to_rfc3339(),
    }
}

fn to_area_item(item: &EvaluationItem) -> AreaItem {
    AreaItem {
        text: item.text.clone(),
        rating: item.rating,
    }
}

fn score_band_label(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Strong => "strong",
        ScoreBand::Moderate => "moderate",
        ScoreBand::Weak => "weak",
    }
}

fn change_type_label(change_type: ChangeType) -> &'static str {
    match change_type {
        ChangeType::Improved => "improved",
        ChangeType::Declined => "declined",
        ChangeType::Same => "same",
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
