//! Shared fixtures for jot_core integration tests.

use jot_core::db::open_db_in_memory;
use jot_core::{FsJotStore, JotService, JotStore, SqliteJotStore};
use tempfile::TempDir;

/// One storage backend under test, keeping its scratch directory alive.
pub struct Backend {
    pub name: &'static str,
    pub store: Box<dyn JotStore>,
    _dir: Option<TempDir>,
}

impl Backend {
    pub fn into_service(self) -> (&'static str, JotService, Option<TempDir>) {
        (self.name, JotService::from_boxed(self.store), self._dir)
    }
}

/// Both interchangeable backends: in-memory SQLite and a temp directory tree.
pub fn backends() -> Vec<Backend> {
    let sqlite = SqliteJotStore::try_new(open_db_in_memory().unwrap()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let fs = FsJotStore::open(dir.path().join("store")).unwrap();

    vec![
        Backend {
            name: "sqlite",
            store: Box::new(sqlite),
            _dir: None,
        },
        Backend {
            name: "fs",
            store: Box::new(fs),
            _dir: Some(dir),
        },
    ]
}
