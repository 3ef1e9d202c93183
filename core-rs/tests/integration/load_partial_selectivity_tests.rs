//! LoadPartial must page in only the requested predicates' triples while
//! every predicate's dictionary statistics remain fully populated.

use triplestore_core::database::{Database, DatabaseBuilder};

#[tokio::test]
async fn load_partial_leaves_unselected_predicates_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let mut db = Database::empty(tmp.path().to_path_buf(), "selectivity".to_string());

    for i in 0..100 {
        db.insert(&format!("s{i}"), "p", &format!("o{i}"));
        db.insert(&format!("s{i}"), "q", &format!("o{i}"));
        db.insert(&format!("s{i}"), "r", &format!("o{i}"));
    }
    db.save().await.unwrap();

    let loaded = DatabaseBuilder::load_partial(
        tmp.path().to_path_buf(),
        "selectivity",
        &["p".to_string(), "r".to_string()],
    )
    .await
    .unwrap();

    let p = loaded.id_of_predicate("p").unwrap();
    let q = loaded.id_of_predicate("q").unwrap();
    let r = loaded.id_of_predicate("r").unwrap();

    assert_eq!(loaded.predicate_count(q), 100);
    assert!(loaded.pairs(q).is_none());

    assert_eq!(loaded.pairs(p).unwrap().values().map(Vec::len).sum::<usize>(), 100);
    assert_eq!(loaded.pairs(r).unwrap().values().map(Vec::len).sum::<usize>(), 100);
}
