//! Save -> LoadAll must reproduce the dictionary and predicate index exactly.

use triplestore_core::database::{Database, DatabaseBuilder};

#[tokio::test]
async fn round_trip_preserves_counts_and_pairs() {
    let tmp = tempfile::tempdir().unwrap();
    let mut db = Database::empty(tmp.path().to_path_buf(), "roundtrip".to_string());
    db.insert("alice", "knows", "bob");
    db.insert("alice", "knows", "carol");
    db.insert("bob", "likes", "carol");
    db.insert("alice", "knows", "bob");

    db.save().await.unwrap();

    let loaded = DatabaseBuilder::load_all(tmp.path().to_path_buf(), "roundtrip").await.unwrap();

    assert_eq!(loaded.triple_count(), db.triple_count());
    assert_eq!(loaded.entity_count(loaded.id_of_entity("alice").unwrap()), 3);

    let knows = loaded.id_of_predicate("knows").unwrap();
    let likes = loaded.id_of_predicate("likes").unwrap();
    assert_eq!(loaded.predicate_count(knows), 3);
    assert_eq!(loaded.predicate_count(likes), 1);

    let alice = loaded.id_of_entity("alice").unwrap();
    let bob = loaded.id_of_entity("bob").unwrap();
    let mut knows_objects = loaded.pairs(knows).unwrap().get(&alice).unwrap().clone();
    knows_objects.sort_by_key(|e| e.get());
    let mut expected = vec![bob, bob, loaded.id_of_entity("carol").unwrap()];
    expected.sort_by_key(|e| e.get());
    assert_eq!(knows_objects, expected);
}

#[tokio::test]
async fn round_trip_then_unload_then_reload_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let mut db = Database::empty(tmp.path().to_path_buf(), "unload".to_string());
    db.insert("a", "p", "b");
    db.save().await.unwrap();

    let mut loaded = DatabaseBuilder::load_all(tmp.path().to_path_buf(), "unload").await.unwrap();
    loaded.unload();
    assert_eq!(loaded.triple_count(), 0);

    let reloaded = DatabaseBuilder::load_all(tmp.path().to_path_buf(), "unload").await.unwrap();
    assert_eq!(reloaded.triple_count(), 1);
}
