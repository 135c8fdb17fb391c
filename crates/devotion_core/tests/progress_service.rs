use devotion_core::db::open_db_in_memory;
use devotion_core::{
    ContentLibrary, DraftField, DraftStore, ExerciseType, ProgressService, ProgressServiceError,
    SqliteKvRepository,
};
use serde_json::json;

fn library() -> ContentLibrary {
    let overviews = json!({
        "sections": {
            "rhythm": {
                "section_number": 2,
                "title": "Rhythm",
                "core_habit": "Daily time with God"
            }
        }
    });
    let exercises = json!({
        "sections": {
            "rhythm": {
                "section_number": 2,
                "title": "Rhythm",
                "daily_exercises": [
                    {
                        "day": 1,
                        "title": "Where am I now?",
                        "type": "assessment",
                        "evaluation_items": ["I pray daily", "I rest weekly"],
                        "reflection_prompts": ["What surprised you?"]
                    },
                    {
                        "day": 2,
                        "title": "Morning watch",
                        "type": "scripture_study",
                        "scripture": "Mark 1:35",
                        "questions": ["When did Jesus pray?", "Where did He go?"],
                        "reflection_prompts": ["What will you change?"]
                    },
                    {
                        "day": 3,
                        "title": "Plan the week",
                        "type": "practical_exercise",
                        "action_items": ["Pick a time", "Pick a place"]
                    }
                ]
            }
        }
    });
    let summaries = json!({
        "sections": {
            "rhythm": {
                "id": 2,
                "title": "Rhythm",
                "summary": {
                    "introduction": "Rhythm is about consistency.",
                    "identity_statement": "I am a person of prayer."
                }
            }
        }
    });
    ContentLibrary::from_json(
        &overviews.to_string(),
        &exercises.to_string(),
        &summaries.to_string(),
    )
    .unwrap()
}

#[test]
fn day_auto_completes_when_every_field_is_answered() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let content = library();
    let service = ProgressService::new(kv, &content);

    let first = service
        .record_answer("rhythm", 2, DraftField::Question, 0, "Early morning")
        .unwrap();
    assert_eq!((first.answered, first.required), (1, 3));
    assert!(!first.completed);

    service
        .record_answer("rhythm", 2, DraftField::Question, 1, "A solitary place")
        .unwrap();
    let last = service
        .record_answer("rhythm", 2, DraftField::Reflection, 0, "Wake earlier")
        .unwrap();

    assert!(last.completed);
    assert!(last.newly_completed);
    assert!(service.is_day_complete("rhythm", 2).unwrap());
    assert_eq!(service.answers("rhythm", 2).unwrap().len(), 3);
}

#[test]
fn clearing_an_answer_keeps_day_complete() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let content = library();
    let service = ProgressService::new(kv, &content);

    for (field, index) in [
        (DraftField::Question, 0),
        (DraftField::Question, 1),
        (DraftField::Reflection, 0),
    ] {
        service
            .record_answer("rhythm", 2, field, index, "answer")
            .unwrap();
    }
    let cleared = service
        .record_answer("rhythm", 2, DraftField::Question, 0, "")
        .unwrap();

    assert_eq!(cleared.answered, 2);
    assert!(cleared.completed);
    assert!(!cleared.newly_completed);

    assert!(service.mark_day_incomplete("rhythm", 2).unwrap());
    assert!(!service.is_day_complete("rhythm", 2).unwrap());
}

#[test]
fn blank_answers_do_not_complete_a_day() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let content = library();
    let service = ProgressService::new(kv, &content);

    service
        .record_answer("rhythm", 2, DraftField::Question, 0, "Early")
        .unwrap();
    service
        .record_answer("rhythm", 2, DraftField::Question, 1, "Alone")
        .unwrap();
    let progress = service
        .record_answer("rhythm", 2, DraftField::Reflection, 0, "  \n")
        .unwrap();

    assert_eq!(progress.answered, 2);
    assert!(!progress.completed);
}

#[test]
fn days_without_free_text_need_explicit_completion() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let content = library();
    let service = ProgressService::new(kv, &content);

    assert_eq!(
        content.exercise("rhythm", 1).map(|exercise| exercise.kind),
        Some(ExerciseType::Assessment)
    );
    assert!(matches!(
        service.record_answer("rhythm", 3, DraftField::Question, 0, "text"),
        Err(ProgressServiceError::InvalidFieldIndex { len: 0, .. })
    ));

    service.mark_day_complete("rhythm", 1).unwrap();
    service.mark_day_complete("rhythm", 3).unwrap();

    let progress = service.section_progress("rhythm").unwrap();
    assert_eq!(progress.completed_days, [1, 3]);
    assert_eq!(progress.total_days, 3);
    assert!((progress.percentage - 200.0 / 3.0).abs() < 1e-9);
}

#[test]
fn unknown_section_and_day_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let content = library();
    let service = ProgressService::new(kv, &content);

    assert!(matches!(
        service.section_progress("refuel"),
        Err(ProgressServiceError::UnknownSection(_))
    ));
    assert!(matches!(
        service.mark_day_complete("rhythm", 9),
        Err(ProgressServiceError::UnknownDay { day: 9, .. })
    ));
}

#[test]
fn drafts_stay_scoped_to_their_day() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvRepository::try_new(&conn).unwrap();
    let drafts = DraftStore::new(kv);

    drafts
        .save("rhythm", 1, DraftField::Question, 0, "day one")
        .unwrap();
    drafts
        .save("rhythm", 11, DraftField::Question, 0, "day eleven")
        .unwrap();

    let day_one = drafts.load_day("rhythm", 1).unwrap();
    assert_eq!(day_one.len(), 1);
    assert_eq!(
        day_one.get(&(DraftField::Question, 0)).map(String::as_str),
        Some("day one")
    );
    assert_eq!(drafts.clear_day("rhythm", 1).unwrap(), 1);
    assert_eq!(drafts.load_day("rhythm", 11).unwrap().len(), 1);
    assert_eq!(drafts.clear_section("rhythm").unwrap(), 1);
}
