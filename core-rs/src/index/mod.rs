//! The predicate-indexed storage layer: for each predicate id, a
//! multi-valued `sid -> [oid]` mapping holding every `(s, o)` pair known
//! for that predicate.
//!
//! Grouping by subject in a `HashMap<EntityId, Vec<EntityId>>` gives the
//! executor's JOIN_S an O(1) `equal_range` via `get(&sid)`, and the `Vec`
//! preserves duplicate `(s, o)` pairs exactly as the multiset semantics in
//! spec §3 require — nothing here deduplicates on insert.

use std::collections::{HashMap, HashSet};

use crate::ids::{EntityId, PredId};

pub type SubjectToObjects = HashMap<EntityId, Vec<EntityId>>;

#[derive(Debug, Default)]
pub struct PredicateIndex {
    by_predicate: HashMap<PredId, SubjectToObjects>,
}

impl PredicateIndex {
    pub fn new() -> Self {
        Self { by_predicate: HashMap::new() }
    }

    pub fn insert(&mut self, pid: PredId, sid: EntityId, oid: EntityId) {
        self.by_predicate.entry(pid).or_default().entry(sid).or_default().push(oid);
    }

    /// Read-only S -> O multimap for `pid`. Returns `None` if the
    /// predicate has no (or no loaded) triples.
    pub fn pairs(&self, pid: PredId) -> Option<&SubjectToObjects> {
        self.by_predicate.get(&pid)
    }

    /// Materialises the inverted O -> S view on demand.
    pub fn reverse_pairs(&self, pid: PredId) -> HashMap<EntityId, Vec<EntityId>> {
        let mut reverse: HashMap<EntityId, Vec<EntityId>> = HashMap::new();
        if let Some(forward) = self.by_predicate.get(&pid) {
            for (&sid, objects) in forward {
                for &oid in objects {
                    reverse.entry(oid).or_default().push(sid);
                }
            }
        }
        reverse
    }

    /// Every `s` such that `(s, oid)` is present under `pid`.
    pub fn subjects_with(&self, pid: PredId, oid: EntityId) -> HashSet<EntityId> {
        let mut out = HashSet::new();
        if let Some(forward) = self.by_predicate.get(&pid) {
            for (&sid, objects) in forward {
                if objects.contains(&oid) {
                    out.insert(sid);
                }
            }
        }
        out
    }

    /// Every `o` such that `(sid, o)` is present under `pid`.
    pub fn objects_with(&self, sid: EntityId, pid: PredId) -> HashSet<EntityId> {
        self.by_predicate
            .get(&pid)
            .and_then(|forward| forward.get(&sid))
            .map(|objects| objects.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of `(s, o)` pairs stored for `pid`.
    pub fn pair_count(&self, pid: PredId) -> usize {
        self.by_predicate
            .get(&pid)
            .map(|forward| forward.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn set_predicate(&mut self, pid: PredId, forward: SubjectToObjects) {
        self.by_predicate.insert(pid, forward);
    }

    pub fn is_loaded(&self, pid: PredId) -> bool {
        self.by_predicate.contains_key(&pid)
    }
}
