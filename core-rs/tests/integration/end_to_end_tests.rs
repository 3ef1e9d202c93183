//! End-to-end parse -> plan -> execute -> project scenarios.

use triplestore_core::database::Database;
use triplestore_core::{executor, parser, planner};

fn run(db: &Database, sparql: &str) -> (bool, Vec<String>, Vec<Vec<String>>) {
    let query = match parser::parse(sparql).unwrap() {
        parser::ParsedStatement::Select(q) => q,
        parser::ParsedStatement::Insert(_) => panic!("expected a SELECT"),
    };
    let query_plan = planner::plan(db, &query.patterns).unwrap();
    let outcome = executor::execute(db, query_plan.steps);
    let rows =
        executor::project(db, &outcome.rows, &query_plan.var_ids, &query.variables, query.distinct).unwrap();
    (query.distinct, query.variables, rows)
}

#[test]
fn two_hop_join_scenario() {
    let mut db = Database::empty(std::path::PathBuf::from("/tmp"), "e2e".to_string());
    db.insert("a", "p", "b");
    db.insert("b", "q", "c");
    db.insert("b", "q", "d");

    let (_, _, mut rows) = run(&db, "SELECT ?y ?z WHERE { <a> p ?y . ?y q ?z . }");
    rows.sort();
    assert_eq!(
        rows,
        vec![vec!["b".to_string(), "c".to_string()], vec!["b".to_string(), "d".to_string()]]
    );
}

#[test]
fn filter_with_ground_object_scenario() {
    let mut db = Database::empty(std::path::PathBuf::from("/tmp"), "e2e".to_string());
    db.insert("a", "p", "x");
    db.insert("b", "p", "x");
    db.insert("c", "p", "y");

    let (_, _, mut rows) = run(&db, "SELECT ?s WHERE { ?s p <x> . }");
    rows.sort();
    assert_eq!(rows, vec![vec!["a".to_string()], vec!["b".to_string()]]);
}

#[test]
fn filter_so_scenario() {
    let mut db = Database::empty(std::path::PathBuf::from("/tmp"), "e2e".to_string());
    db.insert("a", "p", "b");
    db.insert("a", "q", "b");
    db.insert("a", "q", "c");

    let (_, _, rows) = run(&db, "SELECT ?s ?o WHERE { ?s p ?o . ?s q ?o . }");
    assert_eq!(rows, vec![vec!["a".to_string(), "b".to_string()]]);
}

#[test]
fn insert_data_scenario_preserves_order() {
    let parsed = parser::parse("INSERT DATA { A :likes B . A :likes C . B :follows D . D :follows E . }").unwrap();
    match parsed {
        parser::ParsedStatement::Insert(q) => assert_eq!(q.triples.len(), 4),
        _ => panic!("expected an insert"),
    }
}

#[test]
fn variable_predicate_is_rejected_before_execution() {
    let db = Database::empty(std::path::PathBuf::from("/tmp"), "e2e".to_string());
    let query = match parser::parse("SELECT ?s ?o WHERE { ?s ?p ?o . }").unwrap() {
        parser::ParsedStatement::Select(q) => q,
        _ => unreachable!(),
    };
    let result = planner::plan(&db, &query.patterns);
    assert!(result.is_err());
}
