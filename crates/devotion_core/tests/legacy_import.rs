use devotion_core::db::open_db_in_memory;
use devotion_core::{
    export_local_storage, import_local_storage, AssessmentPhase, AssessmentStore,
    CompletionStore, IdentityStore, LegacyImportReport, SqliteKvRepository,
};
use serde_json::json;

fn legacy_assessment(phase: &str) -> String {
    json!({
        "sectionKey": "relationship",
        "sectionTitle": "Relationship",
        "assessmentType": phase,
        "results": {
            "totalScore": 15,
            "averageScore": 7.5,
            "maxPossibleScore": 20,
            "percentageScore": 75.0,
            "strongestAreas": [{ "text": "I pray", "rating": 8 }],
            "weakestAreas": [{ "text": "I listen", "rating": 7 }],
            "completedItems": 2,
            "totalItems": 2,
            "ratings": { "0": 8, "1": 7 },
            "reflectionAnswers": { "0": "Keep going" }
        },
        "completedAt": "2024-03-01T09:30:00.000Z",
        "evaluationItems": ["I pray", "I listen"]
    })
    .to_string()
}

fn entry(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}

#[test]
fn imports_known_families_and_counts_skips() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();

    let entries = vec![
        entry(
            "cost_assessment_relationship_initial",
            legacy_assessment("initial"),
        ),
        entry(
            "cost_assessment_relationship_final",
            legacy_assessment("initial"),
        ),
        entry(
            "cost_day_completion_relationship_day3",
            json!({
                "sectionKey": "relationship",
                "day": 3,
                "completedAt": "2024-03-03T07:00:00.000Z"
            })
            .to_string(),
        ),
        entry(
            "cost_identity_relationship",
            json!({
                "sectionKey": "relationship",
                "sectionTitle": "Relationship",
                "statement": "I am loved.",
                "completedAt": "2024-03-07T20:00:00.000Z"
            })
            .to_string(),
        ),
        entry("cost_identity_rhythm", "not json"),
        entry("theme", "dark"),
    ];

    let report = import_local_storage(&kv, &entries).unwrap();
    assert_eq!(
        report,
        LegacyImportReport {
            imported: 3,
            skipped_unrecognized: 1,
            skipped_invalid: 2,
        }
    );

    let assessments = AssessmentStore::new(kv);
    let initial = assessments
        .load("relationship", AssessmentPhase::Initial)
        .unwrap()
        .unwrap();
    assert_eq!(initial.results.ratings.get(&1), Some(&7));
    assert_eq!(initial.completed_at.to_rfc3339(), "2024-03-01T09:30:00+00:00");
    assert!(!assessments
        .has("relationship", AssessmentPhase::Final)
        .unwrap());

    let completions = CompletionStore::new(kv);
    assert_eq!(completions.list_completed_days("relationship").unwrap(), [3]);
    let identities = IdentityStore::new(kv);
    assert_eq!(
        identities.load_statement("relationship").unwrap().as_deref(),
        Some("I am loved.")
    );
    assert!(!identities.has("rhythm").unwrap());
}

#[test]
fn export_uses_legacy_key_names() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();

    CompletionStore::new(kv).mark_complete("rhythm", 12).unwrap();
    IdentityStore::new(kv)
        .save("rhythm", "Rhythm", "I am steady.")
        .unwrap();

    let keys: Vec<String> = export_local_storage(&kv)
        .unwrap()
        .into_iter()
        .map(|(key, _)| key)
        .collect();
    assert_eq!(
        keys,
        ["cost_day_completion_rhythm_day12", "cost_identity_rhythm"]
    );
}

#[test]
fn exported_entries_import_into_fresh_database() {
    let source_conn = open_db_in_memory().unwrap();
    let source = SqliteKvRepository::try_new(&source_conn).unwrap();
    CompletionStore::new(source).mark_complete("refuel", 2).unwrap();
    let exported = export_local_storage(&source).unwrap();

    let target_conn = open_db_in_memory().unwrap();
    let target = SqliteKvRepository::try_new(&target_conn).unwrap();
    let report = import_local_storage(&target, &exported).unwrap();

    assert_eq!(report.imported, 1);
    assert!(CompletionStore::new(target).is_complete("refuel", 2).unwrap());
}

#[test]
fn record_naming_another_section_is_skipped() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();

    let misplaced_assessment = legacy_assessment("final").replace("relationship", "other");
    let entries = vec![
        entry("cost_assessment_rhythm_final", misplaced_assessment),
        entry(
            "cost_day_completion_rhythm_day2",
            json!({
                "sectionKey": "other",
                "day": 2,
                "completedAt": "2024-03-03T07:00:00.000Z"
            })
            .to_string(),
        ),
        entry(
            "cost_identity_rhythm",
            json!({
                "sectionKey": "other",
                "sectionTitle": "Other",
                "statement": "I am elsewhere.",
                "completedAt": "2024-03-07T20:00:00.000Z"
            })
            .to_string(),
        ),
    ];

    let report = import_local_storage(&kv, &entries).unwrap();
    assert_eq!(
        report,
        LegacyImportReport {
            imported: 0,
            skipped_unrecognized: 0,
            skipped_invalid: 3,
        }
    );

    let assessments = AssessmentStore::new(kv);
    assert!(assessments.list_all().unwrap().is_empty());
    assert_eq!(
        assessments.load("rhythm", AssessmentPhase::Final).unwrap(),
        None
    );
    assert!(CompletionStore::new(kv).list_all().unwrap().is_empty());
    assert!(IdentityStore::new(kv).list_all().unwrap().is_empty());
}

#[test]
fn imported_records_keep_their_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let entries = vec![entry(
        "cost_day_completion_refuel_day5",
        json!({
            "sectionKey": "refuel",
            "day": 5,
            "completedAt": "2024-04-05T06:00:00.000Z"
        })
        .to_string(),
    )];

    assert_eq!(import_local_storage(&kv, &entries).unwrap().imported, 1);
    let completion = CompletionStore::new(kv)
        .get_completion("refuel", 5)
        .unwrap()
        .unwrap();
    assert_eq!(
        completion.completed_at.to_rfc3339(),
        "2024-04-05T06:00:00+00:00"
    );
}
