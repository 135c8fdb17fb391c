use devotion_core::db::open_db_in_memory;
use devotion_core::{
    AssessmentDraft, AssessmentPhase, AssessmentService, AssessmentServiceError,
    AssessmentSitting, AssessmentStore, ChangeType, KvRepository, OverallRating, ScoreBand,
    SqliteKvRepository, StorageKey,
};
use std::thread;
use std::time::Duration;

fn items() -> Vec<String> {
    ["pray daily", "read scripture", "listen in silence"]
        .iter()
        .map(|text| text.to_string())
        .collect()
}

fn sitting(phase: AssessmentPhase) -> AssessmentSitting {
    AssessmentSitting {
        section_key: "relationship".to_string(),
        section_title: "Relationship".to_string(),
        phase,
        evaluation_items: items(),
        reflection_prompts: vec!["What stood out?".to_string()],
    }
}

fn draft(ratings: &[u8]) -> AssessmentDraft {
    let mut draft = AssessmentDraft::new();
    for (index, rating) in ratings.iter().enumerate() {
        draft.rate(index, *rating).unwrap();
    }
    draft.answer(0, "More consistency.");
    draft
}

#[test]
fn submit_persists_and_reads_back_scored_record() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let service = AssessmentService::new(kv);

    let saved = service
        .submit(&sitting(AssessmentPhase::Initial), &draft(&[8, 5, 6]))
        .unwrap();

    assert_eq!(saved.assessment_type, AssessmentPhase::Initial);
    assert_eq!(saved.results.total_score, 19);
    assert_eq!(saved.results.max_possible_score, 30);
    assert_eq!(saved.results.completed_items, 3);
    assert_eq!(saved.results.strongest_areas[0].text, "pray daily");
    assert_eq!(saved.results.weakest_areas[0].text, "read scripture");
    assert_eq!(
        saved.results.reflection_answers.get(&0).map(String::as_str),
        Some("More consistency.")
    );
    assert_eq!(
        service
            .load("relationship", AssessmentPhase::Initial)
            .unwrap()
            .as_ref(),
        Some(&saved)
    );
    assert_eq!(
        service.load("relationship", AssessmentPhase::Final).unwrap(),
        None
    );
}

#[test]
fn submit_rejects_partial_ratings_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let service = AssessmentService::new(kv);

    let err = service
        .submit(&sitting(AssessmentPhase::Initial), &draft(&[8, 5]))
        .unwrap_err();

    assert!(matches!(
        err,
        AssessmentServiceError::RatingsIncomplete { rated: 2, total: 3 }
    ));
    assert!(!service
        .store()
        .has("relationship", AssessmentPhase::Initial)
        .unwrap());
}

#[test]
fn submit_rejects_blank_reflection_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let service = AssessmentService::new(kv);

    let mut draft = draft(&[8, 5, 6]);
    draft.answer(0, "   ");
    let err = service
        .submit(&sitting(AssessmentPhase::Initial), &draft)
        .unwrap_err();

    assert!(matches!(
        err,
        AssessmentServiceError::ReflectionsIncomplete {
            answered: 0,
            total: 1
        }
    ));
    assert_eq!(
        service.load("relationship", AssessmentPhase::Initial).unwrap(),
        None
    );
}

#[test]
fn submit_rejects_rating_for_missing_item() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let service = AssessmentService::new(kv);

    let mut draft = draft(&[10, 10, 10]);
    draft.rate(7, 10).unwrap();
    let err = service
        .submit(&sitting(AssessmentPhase::Initial), &draft)
        .unwrap_err();

    assert!(matches!(
        err,
        AssessmentServiceError::RatingIndexOutOfRange { index: 7, total: 3 }
    ));
    assert!(service.store().list_all().unwrap().is_empty());
}

#[test]
fn store_save_trims_record_section_key() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let service = AssessmentService::new(kv);
    let mut record = service
        .submit(&sitting(AssessmentPhase::Final), &draft(&[6, 6, 6]))
        .unwrap();

    record.section_key = "  relationship ".to_string();
    service.store().save(&record).unwrap();

    let loaded = service
        .load("relationship", AssessmentPhase::Final)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.section_key, "relationship");
    let keys: Vec<String> = service.store().list_all().unwrap().into_keys().collect();
    assert_eq!(keys, ["relationship"]);
}

#[test]
fn resubmitting_overwrites_single_record() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let service = AssessmentService::new(kv);

    let first = service
        .submit(&sitting(AssessmentPhase::Initial), &draft(&[2, 2, 2]))
        .unwrap();
    thread::sleep(Duration::from_millis(5));
    let second = service
        .submit(&sitting(AssessmentPhase::Initial), &draft(&[9, 9, 9]))
        .unwrap();

    assert!(second.completed_at > first.completed_at);
    assert_eq!(second.results.total_score, 27);
    assert_eq!(second.results.overall_rating(), OverallRating::Excellent);
    let all = service.store().list_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all["relationship"].initial.as_ref(), Some(&second));
}

#[test]
fn comparison_appears_once_both_sittings_exist() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let service = AssessmentService::new(kv);

    service
        .submit(&sitting(AssessmentPhase::Initial), &draft(&[5, 8, 6]))
        .unwrap();
    let pending = service.comparison("relationship", &items()).unwrap();
    assert!(pending.pair.initial.is_some());
    assert!(pending.report.is_none());

    service
        .submit(&sitting(AssessmentPhase::Final), &draft(&[7, 8, 4]))
        .unwrap();
    let comparison = service.comparison("relationship", &items()).unwrap();
    let report = comparison.report.unwrap();

    let changes: Vec<i16> = report.rows.iter().map(|row| row.change).collect();
    assert_eq!(changes, [2, 0, -2]);
    assert_eq!(report.rows[0].change_type, ChangeType::Improved);
    assert_eq!(report.rows[1].change_type, ChangeType::Same);
    assert_eq!(report.rows[2].change_type, ChangeType::Declined);
    assert_eq!((report.improved, report.declined, report.unchanged), (1, 1, 1));
    assert_eq!(report.average_delta, 0.0);
    assert!(report.items_aligned);
}

#[test]
fn reset_section_removes_both_sittings_only_for_that_section() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let service = AssessmentService::new(kv);

    for phase in AssessmentPhase::ALL {
        service.submit(&sitting(phase), &draft(&[5, 5, 5])).unwrap();
    }
    let mut other = sitting(AssessmentPhase::Initial);
    other.section_key = "rhythm".to_string();
    service.submit(&other, &draft(&[5, 5, 5])).unwrap();

    assert_eq!(service.reset_section("relationship").unwrap(), 2);
    assert!(!service.store().load_pair("relationship").unwrap().is_complete());
    assert!(service.store().has("rhythm", AssessmentPhase::Initial).unwrap());
}

#[test]
fn corrupt_stored_value_reads_as_absent() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let key = StorageKey::assessment("relationship", AssessmentPhase::Final).unwrap();
    kv.set(&key, "{not json").unwrap();

    let store = AssessmentStore::new(kv);
    assert_eq!(store.load("relationship", AssessmentPhase::Final).unwrap(), None);
    assert!(store.list_all().unwrap().is_empty());
}

#[test]
fn rating_outside_scale_is_rejected_at_input() {
    let mut draft = AssessmentDraft::new();

    assert!(draft.rate(0, 0).is_err());
    assert!(draft.rate(0, 11).is_err());
    assert!(draft.ratings().is_empty());
}

#[test]
fn two_item_sitting_scores_sixty_percent_once_fully_answered() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let service = AssessmentService::new(kv);
    let sitting = AssessmentSitting {
        section_key: "response".to_string(),
        section_title: "Response".to_string(),
        phase: AssessmentPhase::Initial,
        evaluation_items: vec!["I obey quickly".to_string(), "I give freely".to_string()],
        reflection_prompts: vec!["Where?".to_string(), "When?".to_string()],
    };

    let mut draft = AssessmentDraft::new();
    draft.rate(0, 3).unwrap();
    draft.rate(1, 9).unwrap();
    draft.answer(0, "At work");
    assert!(service.submit(&sitting, &draft).is_err());

    draft.answer(1, "Mornings");
    let saved = service.submit(&sitting, &draft).unwrap();
    assert_eq!(saved.results.total_score, 12);
    assert_eq!(saved.results.average_score, 6.0);
    assert_eq!(saved.results.percentage_score, 60.0);
    assert_eq!(saved.results.overall_rating(), OverallRating::Fair);
    assert_eq!(saved.results.average_band(), ScoreBand::Moderate);
}
