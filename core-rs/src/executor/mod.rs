//! Consumes a [`crate::planner::Plan`] left-to-right, maintaining an
//! intermediate relation of variable-id -> entity-id bindings, then
//! projects the final relation back into strings.

use std::collections::HashMap;
use std::time::Instant;

use crate::database::Database;
use crate::errors::{Result, StoreError};
use crate::ids::{EntityId, VarId};
use crate::planner::{Kind, Plan, PlanStep, Slot};

pub type Binding = HashMap<VarId, EntityId>;

#[derive(Debug)]
pub struct ExecutionOutcome {
    pub rows: Vec<Binding>,
    pub last_query_time_ms: f64,
}

/// Runs `plan` against `db`, returning the binding rows and elapsed time.
/// Stops as soon as the intermediate relation becomes empty.
pub fn execute(db: &Database, mut plan: Plan) -> ExecutionOutcome {
    let start = Instant::now();
    let mut rows: Vec<Binding> = Vec::new();

    while let Some(step) = plan.pop_front() {
        rows = match step.kind {
            Kind::SingleS | Kind::SingleO | Kind::SingleSo => single_step(db, &step, &rows),
            Kind::JoinS => join_s(db, &step, &rows),
            Kind::JoinO => join_o(db, &step, &rows),
            Kind::FilterS => filter_s(db, &step, &rows),
            Kind::FilterO => filter_o(db, &step, &rows),
            Kind::FilterSo => filter_so(db, &step, &rows),
        };
        if rows.is_empty() {
            break;
        }
    }

    let last_query_time_ms = start.elapsed().as_secs_f64() * 1000.0;
    ExecutionOutcome { rows, last_query_time_ms }
}

/// Handles SINGLE_S/O/SO (and the degenerate both-ground case) uniformly:
/// scan `pairs(p)`, keep pairs matching any constant slot, bind variable
/// slots. If an incoming relation already exists (a forced restart after
/// a disconnected component), the cartesian product is preserved by
/// merging every existing row into every newly emitted one.
fn single_step(db: &Database, step: &PlanStep, incoming: &[Binding]) -> Vec<Binding> {
    let Some(forward) = db.pairs(step.pid) else { return Vec::new() };
    let mut out = Vec::new();
    for (&sid, objects) in forward {
        if let Slot::Entity(c) = step.s {
            if c != sid {
                continue;
            }
        }
        for &oid in objects {
            if let Slot::Entity(c) = step.o {
                if c != oid {
                    continue;
                }
            }
            let mut binding = Binding::new();
            if let Slot::Var(v) = step.s {
                binding.insert(v, sid);
            }
            if let Slot::Var(v) = step.o {
                binding.insert(v, oid);
            }
            if incoming.is_empty() {
                out.push(binding);
            } else {
                for row in incoming {
                    let mut merged = row.clone();
                    merged.extend(binding.iter().map(|(&k, &v)| (k, v)));
                    out.push(merged);
                }
            }
        }
    }
    out
}

fn join_s(db: &Database, step: &PlanStep, rows: &[Binding]) -> Vec<Binding> {
    let (Slot::Var(s_var), Slot::Var(o_var)) = (step.s, step.o) else {
        return Vec::new();
    };
    let Some(forward) = db.pairs(step.pid) else { return Vec::new() };
    let mut out = Vec::new();
    for row in rows {
        let Some(&sid) = row.get(&s_var) else { continue };
        if let Some(objects) = forward.get(&sid) {
            for &oid in objects {
                let mut merged = row.clone();
                merged.insert(o_var, oid);
                out.push(merged);
            }
        }
    }
    out
}

fn join_o(db: &Database, step: &PlanStep, rows: &[Binding]) -> Vec<Binding> {
    let (Slot::Var(s_var), Slot::Var(o_var)) = (step.s, step.o) else {
        return Vec::new();
    };
    let reverse = db.reverse_pairs(step.pid);
    let mut out = Vec::new();
    for row in rows {
        let Some(&oid) = row.get(&o_var) else { continue };
        if let Some(subjects) = reverse.get(&oid) {
            for &sid in subjects {
                let mut merged = row.clone();
                merged.insert(s_var, sid);
                out.push(merged);
            }
        }
    }
    out
}

fn filter_s(db: &Database, step: &PlanStep, rows: &[Binding]) -> Vec<Binding> {
    let (Slot::Var(s_var), Slot::Entity(o_const)) = (step.s, step.o) else {
        return Vec::new();
    };
    let subjects = db.subjects_with(step.pid, o_const);
    rows.iter().filter(|row| row.get(&s_var).map(|sid| subjects.contains(sid)).unwrap_or(false)).cloned().collect()
}

fn filter_o(db: &Database, step: &PlanStep, rows: &[Binding]) -> Vec<Binding> {
    let (Slot::Entity(s_const), Slot::Var(o_var)) = (step.s, step.o) else {
        return Vec::new();
    };
    let objects = db.objects_with(s_const, step.pid);
    rows.iter().filter(|row| row.get(&o_var).map(|oid| objects.contains(oid)).unwrap_or(false)).cloned().collect()
}

fn filter_so(db: &Database, step: &PlanStep, rows: &[Binding]) -> Vec<Binding> {
    let (Slot::Var(s_var), Slot::Var(o_var)) = (step.s, step.o) else {
        return Vec::new();
    };
    let Some(forward) = db.pairs(step.pid) else { return Vec::new() };
    rows.iter()
        .filter(|row| {
            let (Some(&sid), Some(&oid)) = (row.get(&s_var), row.get(&o_var)) else { return false };
            forward.get(&sid).map(|objects| objects.contains(&oid)).unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Projects `rows` onto `vars` (in order), replacing each entity id with
/// its string via the dictionary. Deduplicates iff `distinct` is set —
/// the executor's intermediate relation may hold duplicate binding rows
/// regardless of whether the query asked for DISTINCT.
pub fn project(
    db: &Database,
    rows: &[Binding],
    var_ids: &HashMap<String, VarId>,
    vars: &[String],
    distinct: bool,
) -> Result<Vec<Vec<String>>> {
    let projection: Vec<VarId> = vars
        .iter()
        .map(|name| {
            let key = name.strip_prefix('?').unwrap_or(name);
            var_ids.get(key).copied().ok_or_else(|| StoreError::NotFound(name.clone()))
        })
        .collect::<Result<_>>()?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut tuple = Vec::with_capacity(projection.len());
        for var in &projection {
            let eid = row.get(var).copied().unwrap_or(EntityId::NONE);
            tuple.push(db.entity_of_id(eid).unwrap_or_default().to_string());
        }
        out.push(tuple);
    }

    if distinct {
        let mut seen = std::collections::HashSet::new();
        out.retain(|tuple| seen.insert(tuple.clone()));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::planner::plan;
    use std::path::PathBuf;

    fn fixture_db() -> Database {
        let mut db = Database::empty(PathBuf::from("/tmp"), "t".to_string());
        db.insert("a", "p", "b");
        db.insert("b", "q", "c");
        db.insert("b", "q", "d");
        db
    }

    fn pattern(s: &str, p: &str, o: &str) -> crate::parser::TriplePattern {
        crate::parser::TriplePattern {
            s: crate::parser::Term::from_token(s),
            p: p.to_string(),
            o: crate::parser::Term::from_token(o),
        }
    }

    #[test]
    fn two_hop_join_end_to_end() {
        let db = fixture_db();
        let query_plan = plan(&db, &[pattern("a", "p", "?y"), pattern("?y", "q", "?z")]).unwrap();
        let outcome = execute(&db, query_plan.steps);
        let rows = project(
            &db,
            &outcome.rows,
            &query_plan.var_ids,
            &["?y".to_string(), "?z".to_string()],
            false,
        )
        .unwrap();
        let mut rows = rows;
        rows.sort();
        assert_eq!(
            rows,
            vec![vec!["b".to_string(), "c".to_string()], vec!["b".to_string(), "d".to_string()]]
        );
    }

    #[test]
    fn filter_with_ground_object() {
        let mut db = Database::empty(PathBuf::from("/tmp"), "t".to_string());
        db.insert("a", "p", "x");
        db.insert("b", "p", "x");
        db.insert("c", "p", "y");

        let query_plan = plan(&db, &[pattern("?s", "p", "x")]).unwrap();
        let outcome = execute(&db, query_plan.steps);
        let mut rows = project(&db, &outcome.rows, &query_plan.var_ids, &["?s".to_string()], false).unwrap();
        rows.sort();
        assert_eq!(rows, vec![vec!["a".to_string()], vec!["b".to_string()]]);
    }

    #[test]
    fn filter_so_path() {
        let mut db = Database::empty(PathBuf::from("/tmp"), "t".to_string());
        db.insert("a", "p", "b");
        db.insert("a", "q", "b");
        db.insert("a", "q", "c");

        let query_plan = plan(&db, &[pattern("?s", "p", "?o"), pattern("?s", "q", "?o")]).unwrap();
        let outcome = execute(&db, query_plan.steps);
        let rows =
            project(&db, &outcome.rows, &query_plan.var_ids, &["?s".to_string(), "?o".to_string()], false)
                .unwrap();
        assert_eq!(rows, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn distinct_dedupes_projection() {
        let mut db = Database::empty(PathBuf::from("/tmp"), "t".to_string());
        db.insert("a", "p", "x");
        db.insert("a", "p", "x");

        let query_plan = plan(&db, &[pattern("a", "p", "?o")]).unwrap();
        let outcome = execute(&db, query_plan.steps);
        let rows = project(&db, &outcome.rows, &query_plan.var_ids, &["?o".to_string()], true).unwrap();
        assert_eq!(rows, vec![vec!["x".to_string()]]);
    }

    #[test]
    fn empty_relation_short_circuits() {
        let db = fixture_db();
        let query_plan = plan(&db, &[pattern("nonexistent", "p", "?y")]).unwrap();
        let outcome = execute(&db, query_plan.steps);
        assert!(outcome.rows.is_empty());
    }
}
