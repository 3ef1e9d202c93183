//! Resolves the on-disk database root and default database name shared by
//! the façade and the CLI. The `<name>.db` suffix itself is joined by
//! [`crate::storage::DbPaths::new`], not here.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_root: PathBuf,
    pub db_name: Option<String>,
}

impl Config {
    pub fn new(db_root: PathBuf, db_name: Option<String>) -> Self {
        Self { db_root, db_name }
    }

    /// Resolution order: explicit values passed in (from CLI flags) take
    /// priority over `TRIPLESTORE_DB_ROOT` / `TRIPLESTORE_DB_NAME`, which
    /// take priority over the current directory / no default name.
    pub fn resolve(db_root: Option<PathBuf>, db_name: Option<String>) -> Self {
        let db_root = db_root
            .or_else(|| std::env::var("TRIPLESTORE_DB_ROOT").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        let db_name = db_name.or_else(|| std::env::var("TRIPLESTORE_DB_NAME").ok());
        Self { db_root, db_name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_falls_back_to_current_directory() {
        std::env::remove_var("TRIPLESTORE_DB_ROOT");
        std::env::remove_var("TRIPLESTORE_DB_NAME");
        let cfg = Config::resolve(None, None);
        assert_eq!(cfg.db_root, PathBuf::from("."));
        assert_eq!(cfg.db_name, None);
    }

    #[test]
    fn resolve_prefers_explicit_over_env() {
        std::env::set_var("TRIPLESTORE_DB_ROOT", "/env-root");
        let cfg = Config::resolve(Some(PathBuf::from("/explicit")), None);
        assert_eq!(cfg.db_root, PathBuf::from("/explicit"));
        std::env::remove_var("TRIPLESTORE_DB_ROOT");
    }
}
