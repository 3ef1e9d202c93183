//! The façade that ties the [`Dictionary`] and [`PredicateIndex`] to a
//! directory on disk. A `Database` is a plain struct — the original's
//! `DatabaseBuilder::Create`/`Load*` builder convention is echoed here, but
//! there is no pimpl/opaque-pointer split: only one engine is ever
//! instantiated, so the indirection the original kept for that purpose is
//! dropped.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::dictionary::Dictionary;
use crate::errors::Result;
use crate::ids::{EntityId, PredId};
use crate::index::{PredicateIndex, SubjectToObjects};
use crate::storage::{self, DbPaths};

#[derive(Debug)]
pub struct Database {
    name: String,
    root: PathBuf,
    dictionary: Dictionary,
    index: PredicateIndex,
    triple_count: u64,
}

impl Database {
    /// An empty, unsaved database — useful for tests and for building up
    /// triples programmatically before the first `save()`.
    pub fn empty(root: PathBuf, name: String) -> Self {
        Self { name, root, dictionary: Dictionary::new(), index: PredicateIndex::new(), triple_count: 0 }
    }

    fn paths(&self) -> DbPaths {
        DbPaths::new(self.root.clone(), &self.name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interns `s`/`p`/`o`, increments their counts, and appends `(s, o)`
    /// to the predicate index. Does not persist — call [`Database::save`].
    pub fn insert(&mut self, s: &str, p: &str, o: &str) {
        let pid = self.dictionary.intern_predicate(p);
        let sid = self.dictionary.intern_entity(s);
        let oid = self.dictionary.intern_entity(o);
        self.index.insert(pid, sid, oid);
        self.triple_count += 1;
    }

    pub async fn save(&self) -> Result<()> {
        storage::save(&self.paths(), &self.dictionary, &self.index).await
    }

    /// Clears all in-memory state. Idempotent.
    pub fn unload(&mut self) {
        self.dictionary = Dictionary::new();
        self.index = PredicateIndex::new();
        self.triple_count = 0;
    }

    pub fn triple_count(&self) -> u64 {
        self.triple_count
    }

    pub fn predicate_count(&self, pid: PredId) -> u32 {
        self.dictionary.predicate_count(pid)
    }

    pub fn entity_count(&self, eid: EntityId) -> u32 {
        self.dictionary.entity_count(eid)
    }

    pub fn predicate_statistics(&self) -> &[u32] {
        self.dictionary.predicate_statistics()
    }

    pub fn id_of_predicate(&self, s: &str) -> Result<PredId> {
        self.dictionary.id_of_predicate(s)
    }

    pub fn id_of_entity(&self, s: &str) -> Result<EntityId> {
        self.dictionary.id_of_entity(s)
    }

    pub fn entity_of_id(&self, eid: EntityId) -> Result<&str> {
        self.dictionary.entity_of_id(eid)
    }

    pub fn pairs(&self, pid: PredId) -> Option<&SubjectToObjects> {
        self.index.pairs(pid)
    }

    pub fn reverse_pairs(&self, pid: PredId) -> std::collections::HashMap<EntityId, Vec<EntityId>> {
        self.index.reverse_pairs(pid)
    }

    pub fn subjects_with(&self, pid: PredId, oid: EntityId) -> std::collections::HashSet<EntityId> {
        self.index.subjects_with(pid, oid)
    }

    pub fn objects_with(&self, sid: EntityId, pid: PredId) -> std::collections::HashSet<EntityId> {
        self.index.objects_with(sid, pid)
    }
}

pub struct DatabaseBuilder;

impl DatabaseBuilder {
    /// Reads `data_file` (whitespace-separated triples, one per line;
    /// object runs to end-of-line with a trailing `.` and spaces
    /// stripped) and inserts every triple into a fresh `Database`.
    pub async fn create(root: PathBuf, name: &str, data_file: &Path) -> Result<Database> {
        let body = tokio::fs::read_to_string(data_file).await?;
        let mut db = Database::empty(root, name.to_string());
        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.splitn(3, char::is_whitespace);
            let Some(s) = parts.next() else { continue };
            let Some(rest) = parts.next() else { continue };
            let Some(o_raw) = parts.next() else { continue };
            let p = rest.trim();
            let o = o_raw.trim().trim_end_matches('.').trim();
            if s.is_empty() || p.is_empty() || o.is_empty() {
                continue;
            }
            db.insert(s, p, o);
        }
        info!(triples = db.triple_count, name, "database created from data file");
        Ok(db)
    }

    pub async fn load_basic(root: PathBuf, name: &str) -> Result<Database> {
        let paths = DbPaths::new(root.clone(), name);
        let (dictionary, triple_count) = storage::load_basic(&paths).await?;
        Ok(Database { name: name.to_string(), root, dictionary, index: PredicateIndex::new(), triple_count })
    }

    pub async fn load_all(root: PathBuf, name: &str) -> Result<Database> {
        let paths = DbPaths::new(root.clone(), name);
        let (dictionary, index, triple_count) = storage::load_all(&paths).await?;
        Ok(Database { name: name.to_string(), root, dictionary, index, triple_count })
    }

    pub async fn load_partial(root: PathBuf, name: &str, predicates: &[String]) -> Result<Database> {
        let paths = DbPaths::new(root.clone(), name);
        let (dictionary, index, triple_count) = storage::load_partial(&paths, predicates).await?;
        Ok(Database { name: name.to_string(), root, dictionary, index, triple_count })
    }
}
