//! Directory-based persistence for a [`Dictionary`]/[`PredicateIndex`] pair.
//!
//! Layout under `<base>/<name>.db/`:
//!
//! ```text
//! info            -- "<triple_count>\n<predicate_len>\n<entity_len>\n"
//! id_predicates   -- one "<id>\t<count>\t<string>" row per predicate
//! id_entities     -- one "<id>\t<count>\t<string>" row per entity
//! triplet/<pid>   -- one "<sid>\t<oid>" row per stored pair
//! ```
//!
//! Save fans every artefact out across `tokio::task::JoinSet`, each task
//! wrapping synchronous `std::fs` calls in `spawn_blocking` — mirroring the
//! original's `std::async` fan-out over the same four artefact kinds.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::task::JoinSet;
use tracing::warn;

use crate::dictionary::Dictionary;
use crate::errors::{Result, StoreError};
use crate::ids::{EntityId, PredId};
use crate::index::PredicateIndex;

#[derive(Debug, Clone)]
pub struct DbPaths {
    root: PathBuf,
}

impl DbPaths {
    pub fn new(base_dir: PathBuf, name: &str) -> Self {
        Self { root: base_dir.join(format!("{name}.db")) }
    }

    pub fn root(&self) -> PathBuf {
        self.root.clone()
    }

    pub fn info(&self) -> PathBuf {
        self.root.join("info")
    }

    pub fn id_predicates(&self) -> PathBuf {
        self.root.join("id_predicates")
    }

    pub fn id_entities(&self) -> PathBuf {
        self.root.join("id_entities")
    }

    pub fn triplet_dir(&self) -> PathBuf {
        self.root.join("triplet")
    }

    pub fn triplet_file(&self, pid: u32) -> PathBuf {
        self.triplet_dir().join(pid.to_string())
    }
}

fn write_rows(path: &Path, rows: &[(u32, u32, &str)]) -> Result<()> {
    let mut body = String::new();
    for (id, count, s) in rows {
        body.push_str(&format!("{id}\t{count}\t{s}\n"));
    }
    std::fs::write(path, body)?;
    Ok(())
}

fn read_rows(path: &Path) -> Result<Vec<(u32, u32, String)>> {
    let body = std::fs::read_to_string(path)?;
    let mut rows = Vec::new();
    for line in body.lines() {
        let mut parts = line.splitn(3, '\t');
        let id: u32 = parts.next().unwrap_or_default().parse().unwrap_or(0);
        let count: u32 = parts.next().unwrap_or_default().parse().unwrap_or(0);
        let s = parts.next().unwrap_or_default().to_string();
        rows.push((id, count, s));
    }
    Ok(rows)
}

fn write_triplet_file(path: &Path, forward: &HashMap<EntityId, Vec<EntityId>>) -> Result<()> {
    let mut body = String::new();
    for (sid, objects) in forward {
        for oid in objects {
            body.push_str(&format!("{}\t{}\n", sid.get(), oid.get()));
        }
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, body)?;
    Ok(())
}

fn read_triplet_file(path: &Path) -> Result<HashMap<EntityId, Vec<EntityId>>> {
    let body = std::fs::read_to_string(path)?;
    let mut forward: HashMap<EntityId, Vec<EntityId>> = HashMap::new();
    for line in body.lines() {
        let mut parts = line.splitn(2, '\t');
        let sid: u32 = parts.next().unwrap_or_default().parse().unwrap_or(0);
        let oid: u32 = parts.next().unwrap_or_default().parse().unwrap_or(0);
        forward.entry(EntityId::from(sid)).or_default().push(EntityId::from(oid));
    }
    Ok(forward)
}

/// Persists `dict`/`index` under `paths`, overwriting any existing contents.
/// Every predicate file, plus the three dictionary artefacts, is written by
/// its own `spawn_blocking` task; the first task failure fails the whole
/// save once every task has been joined.
pub async fn save(paths: &DbPaths, dict: &Dictionary, index: &PredicateIndex) -> Result<()> {
    std::fs::create_dir_all(paths.triplet_dir())?;

    let mut tasks: JoinSet<Result<()>> = JoinSet::new();

    let info_path = paths.info();
    let predicate_len = dict.predicate_len();
    let entity_len = dict.entity_len();
    let triple_count: u64 = dict.predicate_statistics().iter().map(|&c| c as u64).sum();
    tasks.spawn_blocking(move || {
        std::fs::write(&info_path, format!("{triple_count}\n{predicate_len}\n{entity_len}\n"))?;
        Ok(())
    });

    let id_predicates_path = paths.id_predicates();
    let predicate_rows: Vec<(u32, u32, String)> =
        dict.predicate_rows().into_iter().map(|(id, c, s)| (id, c, s.to_string())).collect();
    tasks.spawn_blocking(move || {
        let rows: Vec<(u32, u32, &str)> =
            predicate_rows.iter().map(|(id, c, s)| (*id, *c, s.as_str())).collect();
        write_rows(&id_predicates_path, &rows)
    });

    let id_entities_path = paths.id_entities();
    let entity_rows: Vec<(u32, u32, String)> =
        dict.entity_rows().into_iter().map(|(id, c, s)| (id, c, s.to_string())).collect();
    tasks.spawn_blocking(move || {
        let rows: Vec<(u32, u32, &str)> =
            entity_rows.iter().map(|(id, c, s)| (*id, *c, s.as_str())).collect();
        write_rows(&id_entities_path, &rows)
    });

    for pid in 1..=dict.predicate_len() {
        let pid = PredId::from(pid);
        let Some(forward) = index.pairs(pid) else { continue };
        let forward = forward.clone();
        let path = paths.triplet_file(pid.get());
        tasks.spawn_blocking(move || write_triplet_file(&path, &forward));
    }

    while let Some(joined) = tasks.join_next().await {
        joined.map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))??;
    }
    Ok(())
}

/// Loads only the dictionaries (predicate/entity id tables), no triples.
/// Returns the dictionary plus the persisted `triple_count` from `info`.
pub async fn load_basic(paths: &DbPaths) -> Result<(Dictionary, u64)> {
    if !paths.root().is_dir() {
        return Err(StoreError::DatabaseMissing(paths.root().display().to_string()));
    }
    let info_path = paths.info();
    let id_predicates_path = paths.id_predicates();
    let id_entities_path = paths.id_entities();

    let info_body = tokio::task::spawn_blocking(move || std::fs::read_to_string(&info_path))
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))??;
    let triple_count: u64 = info_body.lines().next().and_then(|l| l.parse().ok()).unwrap_or(0);

    let predicate_rows = tokio::task::spawn_blocking(move || read_rows(&id_predicates_path))
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))??;
    let entity_rows = tokio::task::spawn_blocking(move || read_rows(&id_entities_path))
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))??;

    let mut dict = Dictionary::new();
    dict.restore_predicates(predicate_rows);
    dict.restore_entities(entity_rows);
    Ok((dict, triple_count))
}

/// Loads the dictionaries plus every predicate's triples.
pub async fn load_all(paths: &DbPaths) -> Result<(Dictionary, PredicateIndex, u64)> {
    let (dict, triple_count) = load_basic(paths).await?;
    let pids: Vec<u32> = (1..=dict.predicate_len()).collect();
    let index = load_predicate_files(paths, &pids).await?;
    Ok((dict, index, triple_count))
}

/// Loads the dictionaries plus only the named predicates' triples. Unknown
/// predicate names are skipped with a warning, matching the original's
/// "best-effort" selective load.
pub async fn load_partial(
    paths: &DbPaths,
    predicates: &[String],
) -> Result<(Dictionary, PredicateIndex, u64)> {
    let (dict, triple_count) = load_basic(paths).await?;
    let mut pids = Vec::with_capacity(predicates.len());
    for name in predicates {
        match dict.id_of_predicate(name) {
            Ok(pid) => pids.push(pid.get()),
            Err(_) => warn!(predicate = %name, "load_partial: unknown predicate, skipping"),
        }
    }
    let index = load_predicate_files(paths, &pids).await?;
    Ok((dict, index, triple_count))
}

/// Loads `triplet/<pid>` for each id in `pids` concurrently. A missing file
/// for one predicate is logged and leaves that predicate unloaded; it does
/// not fail the other loads.
async fn load_predicate_files(paths: &DbPaths, pids: &[u32]) -> Result<PredicateIndex> {
    let mut tasks: JoinSet<(u32, Result<HashMap<EntityId, Vec<EntityId>>>)> = JoinSet::new();
    for &pid in pids {
        let path = paths.triplet_file(pid);
        tasks.spawn_blocking(move || (pid, read_triplet_file(&path)));
    }

    let mut index = PredicateIndex::new();
    while let Some(joined) = tasks.join_next().await {
        let (pid, result) = joined.map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))?;
        match result {
            Ok(forward) => index.set_predicate(PredId::from(pid), forward),
            Err(err) => warn!(pid, %err, "failed to load predicate triples, skipping"),
        }
    }
    Ok(index)
}
