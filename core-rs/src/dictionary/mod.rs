//! Bidirectional string <-> id mappings for predicates and entities.
//!
//! Predicates and entities live in disjoint namespaces but share the same
//! assignment discipline: ids are assigned monotonically starting at 1,
//! id 0 is reserved as "no entry", and a per-id occurrence count is kept
//! alongside the mapping so the planner can use it as a selectivity hint.

use std::collections::HashMap;

use crate::errors::{Result, StoreError};
use crate::ids::{EntityId, PredId};

/// The predicate and entity dictionaries of one [`crate::database::Database`].
#[derive(Debug, Default)]
pub struct Dictionary {
    predicate_to_id: HashMap<String, PredId>,
    id_to_predicate: Vec<String>,
    predicate_count: Vec<u32>,

    entity_to_id: HashMap<String, EntityId>,
    id_to_entity: Vec<String>,
    entity_count: Vec<u32>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self {
            predicate_to_id: HashMap::new(),
            id_to_predicate: vec![String::new()],
            predicate_count: vec![0],
            entity_to_id: HashMap::new(),
            id_to_entity: vec![String::new()],
            entity_count: vec![0],
        }
    }

    /// Returns the existing id for `s`, or assigns the next one. Increments
    /// the predicate's occurrence count by one (the caller does this once
    /// per inserted triple).
    pub fn intern_predicate(&mut self, s: &str) -> PredId {
        if let Some(&id) = self.predicate_to_id.get(s) {
            self.predicate_count[id.get() as usize] += 1;
            return id;
        }
        let id = PredId::from(self.id_to_predicate.len() as u32);
        self.predicate_to_id.insert(s.to_string(), id);
        self.id_to_predicate.push(s.to_string());
        self.predicate_count.push(1);
        id
    }

    /// Returns the existing id for `s`, or assigns the next one. Increments
    /// the entity's occurrence count by one per call — callers increment
    /// twice (subject and object) for a triple where the same term fills
    /// both positions.
    pub fn intern_entity(&mut self, s: &str) -> EntityId {
        if let Some(&id) = self.entity_to_id.get(s) {
            self.entity_count[id.get() as usize] += 1;
            return id;
        }
        let id = EntityId::from(self.id_to_entity.len() as u32);
        self.entity_to_id.insert(s.to_string(), id);
        self.id_to_entity.push(s.to_string());
        self.entity_count.push(1);
        id
    }

    pub fn id_of_predicate(&self, s: &str) -> Result<PredId> {
        self.predicate_to_id
            .get(s)
            .copied()
            .ok_or_else(|| StoreError::NotFound(s.to_string()))
    }

    pub fn id_of_entity(&self, s: &str) -> Result<EntityId> {
        self.entity_to_id
            .get(s)
            .copied()
            .ok_or_else(|| StoreError::NotFound(s.to_string()))
    }

    pub fn predicate_of_id(&self, pid: PredId) -> Result<&str> {
        self.id_to_predicate
            .get(pid.get() as usize)
            .map(String::as_str)
            .ok_or_else(|| StoreError::NotFound(pid.to_string()))
    }

    pub fn entity_of_id(&self, eid: EntityId) -> Result<&str> {
        self.id_to_entity
            .get(eid.get() as usize)
            .map(String::as_str)
            .ok_or_else(|| StoreError::NotFound(eid.to_string()))
    }

    pub fn predicate_count(&self, pid: PredId) -> u32 {
        self.predicate_count.get(pid.get() as usize).copied().unwrap_or(0)
    }

    pub fn entity_count(&self, eid: EntityId) -> u32 {
        self.entity_count.get(eid.get() as usize).copied().unwrap_or(0)
    }

    /// Full per-predicate count vector, indexed by id (entry 0 is the
    /// reserved slot).
    pub fn predicate_statistics(&self) -> &[u32] {
        &self.predicate_count
    }

    pub fn predicate_len(&self) -> u32 {
        (self.id_to_predicate.len() - 1) as u32
    }

    pub fn entity_len(&self) -> u32 {
        (self.id_to_entity.len() - 1) as u32
    }

    /// Rebuilds the dictionary from an ordered `(id, count, string)` listing
    /// as read from `id_predicates` / `id_entities` on load. `rows` must be
    /// sorted by id ascending starting at 1, with no gaps.
    pub fn restore_predicates(&mut self, rows: Vec<(u32, u32, String)>) {
        self.id_to_predicate = vec![String::new(); rows.len() + 1];
        self.predicate_count = vec![0; rows.len() + 1];
        self.predicate_to_id = HashMap::with_capacity(rows.len());
        for (pid, count, s) in rows {
            self.id_to_predicate[pid as usize] = s.clone();
            self.predicate_count[pid as usize] = count;
            self.predicate_to_id.insert(s, PredId::from(pid));
        }
    }

    pub fn restore_entities(&mut self, rows: Vec<(u32, u32, String)>) {
        self.id_to_entity = vec![String::new(); rows.len() + 1];
        self.entity_count = vec![0; rows.len() + 1];
        self.entity_to_id = HashMap::with_capacity(rows.len());
        for (eid, count, s) in rows {
            self.id_to_entity[eid as usize] = s.clone();
            self.entity_count[eid as usize] = count;
            self.entity_to_id.insert(s, EntityId::from(eid));
        }
    }

    /// Ordered `(id, count, string)` rows for `id_predicates` persistence,
    /// 1..predicate_count.
    pub fn predicate_rows(&self) -> Vec<(u32, u32, &str)> {
        (1..self.id_to_predicate.len())
            .map(|i| (i as u32, self.predicate_count[i], self.id_to_predicate[i].as_str()))
            .collect()
    }

    pub fn entity_rows(&self) -> Vec<(u32, u32, &str)> {
        (1..self.id_to_entity.len())
            .map(|i| (i as u32, self.entity_count[i], self.id_to_entity[i].as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut dict = Dictionary::new();
        let a = dict.intern_entity("A");
        let b = dict.intern_entity("A");
        assert_eq!(a, b);
        assert_eq!(dict.entity_count(a), 2);
    }

    #[test]
    fn predicates_and_entities_are_disjoint_namespaces() {
        let mut dict = Dictionary::new();
        let p = dict.intern_predicate("likes");
        let e = dict.intern_entity("likes");
        assert_eq!(p.get(), 1);
        assert_eq!(e.get(), 1);
        assert!(dict.id_of_predicate("likes").is_ok());
        assert!(dict.id_of_entity("likes").is_ok());
    }

    #[test]
    fn lookup_of_unknown_string_fails() {
        let dict = Dictionary::new();
        assert!(dict.id_of_entity("nope").is_err());
        assert!(dict.id_of_predicate("nope").is_err());
    }

    #[test]
    fn bijection_holds_after_inserts() {
        let mut dict = Dictionary::new();
        let ids: Vec<EntityId> = ["a", "b", "c", "b"].iter().map(|s| dict.intern_entity(s)).collect();
        for (i, s) in ["a", "b", "c", "b"].iter().enumerate() {
            assert_eq!(dict.entity_of_id(ids[i]).unwrap(), *s);
            assert_eq!(dict.id_of_entity(s).unwrap(), ids[i]);
        }
        assert_eq!(dict.entity_count(ids[1]), 2);
    }

    #[test]
    fn predicate_statistics_includes_reserved_zero_entry() {
        let mut dict = Dictionary::new();
        dict.intern_predicate("p");
        let stats = dict.predicate_statistics();
        assert_eq!(stats[0], 0);
        assert_eq!(stats[1], 1);
    }

    #[test]
    fn restore_round_trips_rows() {
        let mut dict = Dictionary::new();
        dict.intern_entity("a");
        dict.intern_entity("b");
        dict.intern_entity("a");
        let rows: Vec<(u32, u32, String)> = dict
            .entity_rows()
            .into_iter()
            .map(|(id, c, s)| (id, c, s.to_string()))
            .collect();

        let mut restored = Dictionary::new();
        restored.restore_entities(rows);
        assert_eq!(restored.id_of_entity("a").unwrap().get(), 1);
        assert_eq!(restored.entity_count(EntityId::from(1)), 2);
        assert_eq!(restored.entity_len(), 2);
    }
}
