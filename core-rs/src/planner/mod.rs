//! Orders triple patterns by estimated selectivity and tags each with a
//! [`Kind`] describing how the executor should fold it into the
//! intermediate relation.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::warn;

use crate::database::Database;
use crate::errors::{Result, StoreError};
use crate::ids::{EntityId, PredId, VarId};
use crate::parser::{Term, TriplePattern};

/// Execution strategy for one plan step, relative to the set of variables
/// already bound by earlier steps. Precedence when several apply to the
/// same pattern: `FilterSo > FilterS > FilterO > JoinS > JoinO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    SingleS,
    SingleO,
    SingleSo,
    JoinS,
    JoinO,
    FilterS,
    FilterO,
    FilterSo,
}

/// One position of a plan step's triple: either a per-query variable slot
/// or a dictionary entity id resolved from a ground term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Var(VarId),
    Entity(EntityId),
}

#[derive(Debug, Clone, Copy)]
pub struct PlanStep {
    pub s: Slot,
    pub pid: PredId,
    pub o: Slot,
    pub kind: Kind,
}

pub type Plan = VecDeque<PlanStep>;

/// A plan queue plus the variable-name -> [`VarId`] table assigned while
/// building it, so [`crate::executor::project`] can translate projection
/// variable names back into binding keys.
#[derive(Debug)]
pub struct QueryPlan {
    pub steps: Plan,
    pub var_ids: HashMap<String, VarId>,
}

struct VarTable {
    ids: HashMap<String, VarId>,
    next: u32,
}

impl VarTable {
    fn new() -> Self {
        Self { ids: HashMap::new(), next: 0 }
    }

    fn id_of(&mut self, name: &str) -> VarId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = VarId::from(self.next);
        self.next += 1;
        self.ids.insert(name.to_string(), id);
        id
    }
}

fn resolve_slot(db: &Database, term: &Term, vars: &mut VarTable) -> Slot {
    match term {
        Term::Var(name) => Slot::Var(vars.id_of(name)),
        Term::Const(s) => match db.id_of_entity(s) {
            Ok(id) => Slot::Entity(id),
            Err(_) => {
                warn!(term = %s, "query term not found in dictionary, pattern will match nothing");
                Slot::Entity(EntityId::NONE)
            }
        },
    }
}

fn resolve_predicate(db: &Database, p: &str) -> PredId {
    match db.id_of_predicate(p) {
        Ok(id) => id,
        Err(_) => {
            warn!(predicate = %p, "predicate not found in dictionary, pattern will match nothing");
            PredId::NONE
        }
    }
}

fn cardinality_key(db: &Database, pattern: &TriplePattern) -> u32 {
    let pid = match db.id_of_predicate(&pattern.p) {
        Ok(id) => id,
        Err(_) => return 0,
    };
    let mut key = db.predicate_count(pid);
    if let Term::Const(s) = &pattern.s {
        if let Ok(eid) = db.id_of_entity(s) {
            key = key.min(db.entity_count(eid));
        }
    } else if let Term::Const(o) = &pattern.o {
        if let Ok(eid) = db.id_of_entity(o) {
            key = key.min(db.entity_count(eid));
        }
    }
    key
}

fn single_kind(s: &Term, o: &Term) -> Kind {
    match (s.is_var(), o.is_var()) {
        (true, true) => Kind::SingleSo,
        (true, false) => Kind::SingleS,
        (false, true) => Kind::SingleO,
        (false, false) => Kind::SingleSo,
    }
}

fn emit_single(
    db: &Database,
    pattern: &TriplePattern,
    vars: &mut VarTable,
    bound: &mut HashSet<VarId>,
) -> PlanStep {
    let kind = single_kind(&pattern.s, &pattern.o);
    let pid = resolve_predicate(db, &pattern.p);
    let s = resolve_slot(db, &pattern.s, vars);
    let o = resolve_slot(db, &pattern.o, vars);
    if let Slot::Var(v) = s {
        bound.insert(v);
    }
    if let Slot::Var(v) = o {
        bound.insert(v);
    }
    PlanStep { s, pid, o, kind }
}

/// Builds an ordered queue of plan steps for `patterns` against `db`.
///
/// 1. Patterns are sorted (stably) by estimated cardinality.
/// 2. The head becomes the first `Single*` step.
/// 3. The remaining patterns are repeatedly scanned for one whose S or O
///    is already bound; the first such pattern found is emitted and the
///    scan restarts from the beginning. If a full pass makes no
///    progress, the current head is forced out as a fresh `Single*` step,
///    starting a new disconnected component.
pub fn plan(db: &Database, patterns: &[TriplePattern]) -> Result<QueryPlan> {
    let mut remaining: Vec<TriplePattern> = patterns.to_vec();
    if remaining.is_empty() {
        return Ok(QueryPlan { steps: Plan::new(), var_ids: HashMap::new() });
    }
    for pattern in &remaining {
        if !pattern.p.starts_with('?') {
            continue;
        }
        return Err(StoreError::UnsupportedPattern(pattern.p.clone()));
    }

    remaining.sort_by_key(|pattern| cardinality_key(db, pattern));

    let mut vars = VarTable::new();
    let mut bound: HashSet<VarId> = HashSet::new();
    let mut queue = Plan::new();

    let head = remaining.remove(0);
    queue.push_back(emit_single(db, &head, &mut vars, &mut bound));

    while !remaining.is_empty() {
        let before = remaining.len();
        let mut i = 0;
        while i < remaining.len() {
            let pattern = &remaining[i];
            let s_var = match &pattern.s {
                Term::Var(name) => Some(vars.id_of(name)),
                Term::Const(_) => None,
            };
            let o_var = match &pattern.o {
                Term::Var(name) => Some(vars.id_of(name)),
                Term::Const(_) => None,
            };
            let s_in = s_var.map(|v| bound.contains(&v)).unwrap_or(false);
            let o_in = o_var.map(|v| bound.contains(&v)).unwrap_or(false);

            let kind = match (s_var, o_var, s_in, o_in) {
                (Some(_), Some(_), true, true) => Some(Kind::FilterSo),
                (Some(_), Some(_), true, false) => Some(Kind::JoinS),
                (Some(_), Some(_), false, true) => Some(Kind::JoinO),
                (Some(_), None, true, _) => Some(Kind::FilterS),
                (None, Some(_), _, true) => Some(Kind::FilterO),
                _ => None,
            };

            let Some(kind) = kind else {
                i += 1;
                continue;
            };

            let pid = resolve_predicate(db, &pattern.p);
            let s = resolve_slot(db, &pattern.s, &mut vars);
            let o = resolve_slot(db, &pattern.o, &mut vars);
            if let Slot::Var(v) = s {
                bound.insert(v);
            }
            if let Slot::Var(v) = o {
                bound.insert(v);
            }
            queue.push_back(PlanStep { s, pid, o, kind });
            remaining.remove(i);
            break;
        }

        if remaining.len() == before {
            let forced = remaining.remove(0);
            queue.push_back(emit_single(db, &forced, &mut vars, &mut bound));
        }
    }

    Ok(QueryPlan { steps: queue, var_ids: vars.ids })
}
