// End-to-end flows through the content engine: merge pipeline, write
// accessors, degraded mode, rotation, and the restore collaborator path.

use serde_json::json;
use trainer_core::core::engine::{ContentEngine, LoadState, WriteError};
use trainer_core::core::types::{Kind, RawRecord, Record};

fn raw(value: serde_json::Value) -> RawRecord {
    serde_json::from_value(value).unwrap()
}

fn engine_in(dir: &tempfile::TempDir) -> ContentEngine {
    let mut engine = ContentEngine::new(dir.path().join("store"));
    engine.initialize(Some("u1"));
    engine
}

#[test]
fn bundled_words_load_with_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);

    let words = engine.get_all(Kind::Word);
    assert!(!words.is_empty());
    let hello = engine.get_by_id(Kind::Word, "word-0").unwrap();
    assert_eq!(hello.english(), "hello");
    assert!(hello.is_predefined());
}

#[test]
fn bundled_verbs_are_never_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(&dir);

    assert!(engine.get_all(Kind::Verb).is_empty());

    // A user-authored verb appears; bundled verbs still never do.
    engine
        .add(
            Kind::Verb,
            raw(json!({"english": "to eat", "infinitive": "manger"})),
        )
        .unwrap();
    let verbs = engine.get_all(Kind::Verb);
    assert_eq!(verbs.len(), 1);
    assert!(!verbs[0].is_predefined());
}

#[test]
fn add_coerces_string_french_and_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(&dir);

    let added = engine
        .add(Kind::Word, raw(json!({"english": "cat", "french": "chat"})))
        .unwrap();
    assert!(added.id().starts_with("user-"));

    let stored = engine.get_by_id(Kind::Word, added.id()).unwrap();
    match stored {
        Record::Word(w) => assert_eq!(w.french, vec!["chat"]),
        other => panic!("expected word, got {other:?}"),
    }

    // Exactly one record with that id after the merge.
    let count = engine
        .get_all(Kind::Word)
        .iter()
        .filter(|r| r.id() == added.id())
        .count();
    assert_eq!(count, 1);

    // A fresh engine over the same store sees it too.
    let engine2 = engine_in(&dir);
    assert!(engine2.get_by_id(Kind::Word, added.id()).is_some());
}

#[test]
fn half_formed_verb_is_repaired_on_add() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(&dir);

    let added = engine
        .add(
            Kind::Verb,
            raw(json!({
                "english": "to be",
                "infinitive": "être",
                "conjugations": {"je": ["suis"]}
            })),
        )
        .unwrap();
    match engine.get_by_id(Kind::Verb, added.id()).unwrap() {
        Record::Verb(v) => {
            assert_eq!(v.conjugations.je, vec!["suis"]);
            for subject in ["tu", "il", "nous", "vous", "ils"] {
                assert_eq!(v.conjugations.get(subject).unwrap(), &[String::new()]);
            }
        }
        other => panic!("expected verb, got {other:?}"),
    }
}

#[test]
fn write_failures_are_structured_and_leave_snapshots_alone() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(&dir);
    let before = engine.get_all(Kind::Word).len();

    let err = engine.delete(Kind::Word, "user-ghost").unwrap_err();
    assert!(matches!(err, WriteError::NotFound(_)));
    assert_eq!(engine.get_all(Kind::Word).len(), before);

    let err = engine
        .update(Kind::Word, "user-ghost", raw(json!({"english": "x", "french": "y"})))
        .unwrap_err();
    assert!(matches!(err, WriteError::NotFound(_)));

    let err = engine
        .add(
            Kind::Word,
            raw(json!({"id": "word-999", "english": "x", "french": "y"})),
        )
        .unwrap_err();
    assert!(matches!(err, WriteError::ReservedId(_)));

    let err = engine
        .add(Kind::Word, raw(json!({"english": "", "french": "y"})))
        .unwrap_err();
    assert!(matches!(err, WriteError::Invalid(_)));
}

#[test]
fn duplicate_user_id_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(&dir);

    engine
        .add(
            Kind::Sentence,
            raw(json!({"id": "user-s1", "english": "Hi.", "french": "Salut."})),
        )
        .unwrap();
    let err = engine
        .add(
            Kind::Sentence,
            raw(json!({"id": "user-s1", "english": "Hi.", "french": "Salut."})),
        )
        .unwrap_err();
    assert!(matches!(err, WriteError::DuplicateId(_)));
}

#[test]
fn update_preserves_creation_time_and_predefined_flag() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(&dir);

    let added = engine
        .add(Kind::Word, raw(json!({"english": "cat", "french": "chat"})))
        .unwrap();
    let updated = engine
        .update(
            Kind::Word,
            added.id(),
            raw(json!({"english": "cat", "french": ["chat", "matou"]})),
        )
        .unwrap();

    assert_eq!(updated.created_at(), added.created_at());
    assert!(!updated.is_predefined());
    match engine.get_by_id(Kind::Word, added.id()).unwrap() {
        Record::Word(w) => assert_eq!(w.french, vec!["chat", "matou"]),
        other => panic!("expected word, got {other:?}"),
    }
}

#[test]
fn update_without_category_keeps_the_stored_one() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(&dir);

    let added = engine
        .add(
            Kind::Word,
            raw(json!({"english": "bread", "french": "pain", "category": "food"})),
        )
        .unwrap();
    engine
        .update(
            Kind::Word,
            added.id(),
            raw(json!({"english": "bread", "french": ["pain", "baguette"]})),
        )
        .unwrap();
    match engine.get_by_id(Kind::Word, added.id()).unwrap() {
        Record::Word(w) => {
            assert_eq!(w.category, "food");
            assert_eq!(w.french, vec!["pain", "baguette"]);
        }
        other => panic!("expected word, got {other:?}"),
    }

    // An explicit category still changes it.
    engine
        .update(
            Kind::Word,
            added.id(),
            raw(json!({"english": "bread", "french": "pain", "category": "general"})),
        )
        .unwrap();
    match engine.get_by_id(Kind::Word, added.id()).unwrap() {
        Record::Word(w) => assert_eq!(w.category, "general"),
        other => panic!("expected word, got {other:?}"),
    }
}

#[test]
fn unopenable_store_serves_fallback_content() {
    let dir = tempfile::tempdir().unwrap();
    // Occupy the store path with a plain file so the directory can't exist.
    let blocked = dir.path().join("store");
    std::fs::write(&blocked, "not a directory").unwrap();

    let mut engine = ContentEngine::new(&blocked);
    engine.initialize(Some("u1"));

    let words = engine.get_all(Kind::Word);
    assert!((2..=3).contains(&words.len()));
    assert!(words.iter().all(|w| w.id().starts_with("fallback-")));
    for status in engine.cache_status() {
        assert_eq!(status.state, LoadState::Degraded);
        assert!(status.count > 0);
    }

    // Writes fail structurally, not by panic.
    let err = engine
        .add(Kind::Word, raw(json!({"english": "x", "french": "y"})))
        .unwrap_err();
    assert!(matches!(err, WriteError::Store(_)));
}

#[test]
fn force_refresh_recovers_once_the_store_is_back() {
    let dir = tempfile::tempdir().unwrap();
    let blocked = dir.path().join("store");
    std::fs::write(&blocked, "not a directory").unwrap();

    let mut engine = ContentEngine::new(&blocked);
    engine.initialize(Some("u1"));
    assert!(engine
        .cache_status()
        .iter()
        .all(|s| s.state == LoadState::Degraded));

    // Storage denial clears; an explicit refresh re-enters the pipeline.
    std::fs::remove_file(&blocked).unwrap();
    engine.force_refresh();

    assert!(engine
        .cache_status()
        .iter()
        .all(|s| s.state == LoadState::Ready));
    assert!(engine.get_by_id(Kind::Word, "word-0").is_some());
    assert!(engine
        .get_all(Kind::Word)
        .iter()
        .all(|w| !w.id().starts_with("fallback-")));

    // Writes work again too.
    engine
        .add(Kind::Word, raw(json!({"english": "cat", "french": "chat"})))
        .unwrap();
}

#[test]
fn merge_keeps_first_occurrence_of_a_duplicated_id() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(&dir);

    // A restore can land a record sharing a bundled id; the write
    // accessors can't (reserved prefixes), so go through the adapter.
    let outcome = engine
        .store_mut()
        .unwrap()
        .bulk_add(
            "words",
            vec![json!({"id": "word-0", "english": "imposter", "french": ["faux"]})],
        )
        .unwrap();
    assert_eq!(outcome.inserted, 1);
    engine.force_refresh();

    let matches: Vec<_> = engine
        .get_all(Kind::Word)
        .iter()
        .filter(|r| r.id() == "word-0")
        .collect();
    assert_eq!(matches.len(), 1);
    // Bundled records come first in the merge, so the bundled one wins.
    assert_eq!(matches[0].english(), "hello");
    assert!(matches[0].is_predefined());
}

#[test]
fn corrupt_collection_degrades_only_that_kind() {
    let dir = tempfile::tempdir().unwrap();
    let store_dir = dir.path().join("store");
    {
        let mut engine = ContentEngine::new(&store_dir);
        engine.initialize(Some("u1"));
    }
    std::fs::write(store_dir.join("numbers.json"), "{broken").unwrap();

    let mut engine = ContentEngine::new(&store_dir);
    engine.initialize(Some("u1"));

    let by_kind: std::collections::HashMap<_, _> = engine
        .cache_status()
        .into_iter()
        .map(|s| (s.kind, s.state))
        .collect();
    assert_eq!(by_kind[&Kind::Number], LoadState::Degraded);
    assert_eq!(by_kind[&Kind::Word], LoadState::Ready);
    assert!(engine
        .get_all(Kind::Number)
        .iter()
        .all(|r| r.id().starts_with("fallback-")));
}

#[test]
fn rotation_covers_pool_before_repeats_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(&dir);

    let pool_size = engine.get_all(Kind::Word).len();
    let mut seen_ids = std::collections::HashSet::new();
    for _ in 0..pool_size {
        let item = engine.next_item(Kind::Word).unwrap();
        assert!(
            seen_ids.insert(item.id().to_string()),
            "repeat before full coverage"
        );
        engine.mark_seen(Kind::Word, item.id());
    }

    // Everything seen; the tracker still serves items (by recency).
    assert!(engine.next_item(Kind::Word).is_some());

    // Seen-state survives an engine restart for the same user.
    let mut engine2 = engine_in(&dir);
    let item = engine2.next_item(Kind::Word).unwrap();
    engine2.mark_seen(Kind::Word, item.id());
}

#[test]
fn switching_user_resets_rotation() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(&dir);

    let item = engine.next_item(Kind::Word).unwrap();
    engine.mark_seen(Kind::Word, item.id());

    engine.initialize(Some("u2"));
    // u2 starts with full coverage available: draws never repeat until the
    // whole pool is exhausted, regardless of u1's history.
    let pool_size = engine.get_all(Kind::Word).len();
    let mut ids = std::collections::HashSet::new();
    for _ in 0..pool_size {
        let item = engine.next_item(Kind::Word).unwrap();
        assert!(ids.insert(item.id().to_string()));
        engine.mark_seen(Kind::Word, item.id());
    }
}

#[test]
fn restore_via_bulk_add_then_force_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(&dir);
    let before = engine.get_all(Kind::Sentence).len();

    // The backup/restore collaborator writes straight to the adapter.
    let outcome = engine
        .store_mut()
        .unwrap()
        .bulk_add(
            "sentences",
            vec![
                json!({"id": "user-r1", "english": "Good night.", "french": ["Bonne nuit."]}),
                json!({"id": "user-r2", "english": "Good luck.", "french": ["Bonne chance."]}),
                json!({"id": "user-r1", "english": "dup", "french": ["dup"]}),
            ],
        )
        .unwrap();
    assert_eq!(outcome.inserted, 2);
    assert_eq!(outcome.skipped, vec!["user-r1"]);

    // Snapshot is stale until the refresh.
    assert_eq!(engine.get_all(Kind::Sentence).len(), before);
    engine.force_refresh();
    assert_eq!(engine.get_all(Kind::Sentence).len(), before + 2);
}

#[test]
fn category_filtering_over_the_word_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(&dir);

    engine
        .add(
            Kind::Word,
            raw(json!({"english": "croissant", "french": "croissant", "category": "food"})),
        )
        .unwrap();
    let food = engine.get_words_by_category("food");
    assert!(food.iter().any(|r| r.english() == "croissant"));
    assert!(food.iter().all(|r| matches!(r, Record::Word(w) if w.category == "food")));
}
