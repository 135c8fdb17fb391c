//! Import/export of browser local-storage entries.
//!
//! # Invariants
//! - Only `cost_assessment_*`, `cost_day_completion_*_day<N>` and
//!   `cost_identity_*` keys are recognized.
//! - Values are decoded into typed records and written through the typed
//!   stores, so the store never holds a value its typed readers would reject.
//! - A record is only stored under the key naming its own section.
//! - A bad entry is skipped and counted; it never aborts the import.

use crate::model::assessment::{AssessmentPhase, StoredAssessment};
use crate::model::completion::{DayCompletion, IdentityStatement};
use crate::repo::assessment_store::AssessmentStore;
use crate::repo::completion_store::CompletionStore;
use crate::repo::identity_store::IdentityStore;
use crate::repo::kv_repo::{KvRepository, RecordKind, RepoResult, StorageKey};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

static ASSESSMENT_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^cost_assessment_(.+)_(initial|final)$").expect("valid assessment key regex")
});
static DAY_COMPLETION_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^cost_day_completion_(.+)_day(\d+)$").expect("valid day completion key regex")
});
static IDENTITY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^cost_identity_(.+)$").expect("valid identity key regex"));

/// Outcome counters of one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyImportReport {
    pub imported: usize,
    /// Key did not match any known family.
    pub skipped_unrecognized: usize,
    /// Key matched but the value could not be decoded or disagreed with it.
    pub skipped_invalid: usize,
}

/// Maps one flat legacy key to a structured key.
pub fn parse_legacy_key(key: &str) -> Option<StorageKey> {
    if let Some(caps) = ASSESSMENT_KEY_RE.captures(key) {
        let phase = AssessmentPhase::parse(&caps[2])?;
        return StorageKey::assessment(&caps[1], phase).ok();
    }
    if let Some(caps) = DAY_COMPLETION_KEY_RE.captures(key) {
        let day = caps[2].parse::<u32>().ok()?;
        return StorageKey::day_completion(&caps[1], day).ok();
    }
    if let Some(caps) = IDENTITY_KEY_RE.captures(key) {
        return StorageKey::identity(&caps[1]).ok();
    }
    None
}

/// Imports flat `(key, value)` pairs, overwriting existing entries.
///
/// Records are written through the typed stores. A record whose own section,
/// phase or day disagrees with its key is skipped as invalid.
pub fn import_local_storage<K: KvRepository + Clone>(
    kv: &K,
    entries: &[(String, String)],
) -> RepoResult<LegacyImportReport> {
    let assessments = AssessmentStore::new(kv.clone());
    let completions = CompletionStore::new(kv.clone());
    let identities = IdentityStore::new(kv.clone());
    let mut report = LegacyImportReport::default();

    for (raw_key, raw_value) in entries {
        let Some(key) = parse_legacy_key(raw_key) else {
            report.skipped_unrecognized += 1;
            continue;
        };

        let stored = match key.kind() {
            RecordKind::Assessment => {
                let decoded = decode_matching::<StoredAssessment>(&key, raw_value, |record| {
                    names_section(&record.section_key, &key)
                        && record.assessment_type.as_str() == key.slot()
                });
                write_decoded(decoded, |record| assessments.save(record))?
            }
            RecordKind::DayCompletion => {
                let decoded = decode_matching::<DayCompletion>(&key, raw_value, |record| {
                    names_section(&record.section_key, &key) && record.day.to_string() == key.slot()
                });
                write_decoded(decoded, |record| completions.put(record))?
            }
            RecordKind::Identity => {
                let decoded = decode_matching::<IdentityStatement>(&key, raw_value, |record| {
                    names_section(&record.section_key, &key)
                });
                write_decoded(decoded, |record| identities.put(record))?
            }
            RecordKind::Draft => false,
        };

        if stored {
            report.imported += 1;
        } else {
            warn!(
                "event=legacy_import module=legacy status=skip kind={} section={}",
                key.kind().as_str(),
                key.section_key()
            );
            report.skipped_invalid += 1;
        }
    }

    info!(
        "event=legacy_import module=legacy status=ok imported={} unrecognized={} invalid={}",
        report.imported, report.skipped_unrecognized, report.skipped_invalid
    );
    Ok(report)
}

/// Exports assessments, completions and identity statements as flat pairs.
///
/// Drafts have no legacy counterpart and are not exported.
pub fn export_local_storage<K: KvRepository>(kv: &K) -> RepoResult<Vec<(String, String)>> {
    let mut exported = Vec::new();
    for kind in [
        RecordKind::Assessment,
        RecordKind::DayCompletion,
        RecordKind::Identity,
    ] {
        for entry in kv.list(kind, None)? {
            exported.push((entry.key.legacy_key(), entry.value));
        }
    }
    Ok(exported)
}

fn names_section(record_section: &str, key: &StorageKey) -> bool {
    record_section.trim() == key.section_key()
}

fn write_decoded<T>(
    decoded: Option<T>,
    write: impl FnOnce(&T) -> RepoResult<()>,
) -> RepoResult<bool> {
    match decoded {
        Some(record) => write(&record).map(|()| true),
        None => Ok(false),
    }
}

fn decode_matching<T: DeserializeOwned>(
    key: &StorageKey,
    raw: &str,
    matches_key: impl FnOnce(&T) -> bool,
) -> Option<T> {
    let record: T = serde_json::from_str(raw).ok()?;
    if !matches_key(&record) {
        warn!(
            "event=legacy_import module=legacy status=mismatch kind={} section={}",
            key.kind().as_str(),
            key.section_key()
        );
        return None;
    }
    Some(record)
}
