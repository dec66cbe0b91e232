//! SQLite implementation of the namespace and entry stores.
//!
//! # Responsibility
//! - Persist namespaces and entries in the `namespaces` / `entries` tables.
//! - Translate SQLite constraint failures into semantic store errors using
//!   extended result codes.
//!
//! # Invariants
//! - The connection has `foreign_keys=ON`, so deleting a namespace row
//!   cascades to its entries.
//! - Each write is a single statement and therefore atomic.

use crate::db::open_db;
use crate::model::entry::{now_millis, Entry, EntryId, EntrySummary};
use crate::model::namespace::{Namespace, NamespaceId};
use crate::repo::{
    canonical_path, checked_title, path_to_text, EntryStore, NamespaceStore, StoreError,
    StoreResult,
};
use rusqlite::{ffi, params, params_from_iter, Connection};
use std::os::raw::c_int;
use std::path::{Path, PathBuf};

/// SQLite-backed jot store.
pub struct SqliteJotStore {
    conn: Connection,
}

impl SqliteJotStore {
    /// Wraps a migrated connection after checking the expected schema exists.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Opens (or creates) the database file and wraps it.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = open_db(path)?;
        Self::try_new(conn)
    }

    /// Underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl NamespaceStore for SqliteJotStore {
    fn track(&self, path: &Path) -> StoreResult<Namespace> {
        let path = canonical_path(path)?;
        let inserted = self.conn.execute(
            "INSERT INTO namespaces (path) VALUES (?1);",
            [path_to_text(&path)?],
        );

        match inserted {
            Ok(_) => Ok(Namespace {
                id: NamespaceId(self.conn.last_insert_rowid()),
                path,
            }),
            Err(err) if constraint_kind(&err) == Some(ffi::SQLITE_CONSTRAINT_UNIQUE) => {
                Err(StoreError::AlreadyTracked(path))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn untrack(&self, path: &Path) -> StoreResult<()> {
        let path = canonical_path(path)?;
        let changed = self.conn.execute(
            "DELETE FROM namespaces WHERE path = ?1;",
            [path_to_text(&path)?],
        )?;

        if changed == 0 {
            return Err(StoreError::NotTracked(path));
        }

        Ok(())
    }

    fn list_tracked(&self) -> StoreResult<Vec<PathBuf>> {
        let mut stmt = self
            .conn
            .prepare("SELECT path FROM namespaces ORDER BY path ASC;")?;
        let mut rows = stmt.query([])?;
        let mut paths = Vec::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get("path")?;
            paths.push(PathBuf::from(value));
        }
        Ok(paths)
    }

    fn find_longest_tracked(&self, candidates: &[PathBuf]) -> StoreResult<Option<Namespace>> {
        let texts = candidates
            .iter()
            .filter_map(|candidate| candidate.to_str())
            .collect::<Vec<_>>();
        if texts.is_empty() {
            return Ok(None);
        }

        let placeholders = vec!["?"; texts.len()].join(", ");
        let sql = format!(
            "SELECT id, path
             FROM namespaces
             WHERE path IN ({placeholders})
             ORDER BY length(path) DESC
             LIMIT 1;"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(texts))?;
        if let Some(row) = rows.next()? {
            let path: String = row.get("path")?;
            return Ok(Some(Namespace {
                id: NamespaceId(row.get("id")?),
                path: PathBuf::from(path),
            }));
        }

        Ok(None)
    }
}

impl EntryStore for SqliteJotStore {
    fn get(&self, namespace_id: NamespaceId, title: &str) -> StoreResult<Entry> {
        let mut stmt = self.conn.prepare(
            "SELECT title, content, updated_at
             FROM entries
             WHERE namespace_id = ?1
               AND title = ?2;",
        )?;

        let mut rows = stmt.query(params![namespace_id.0, title])?;
        match rows.next()? {
            Some(row) => Ok(Entry {
                namespace_id,
                title: row.get("title")?,
                content: row.get("content")?,
                updated_at: row.get("updated_at")?,
            }),
            None => Err(StoreError::EntryNotFound(title.to_string())),
        }
    }

    fn create(
        &self,
        namespace_id: NamespaceId,
        title: &str,
        content: &str,
    ) -> StoreResult<EntryId> {
        checked_title(title)?;

        let inserted = self.conn.execute(
            "INSERT INTO entries (namespace_id, title, content, updated_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![namespace_id.0, title, content, now_millis()],
        );

        match inserted {
            Ok(_) => Ok(EntryId {
                namespace_id,
                title: title.to_string(),
            }),
            Err(err) => Err(match constraint_kind(&err) {
                Some(ffi::SQLITE_CONSTRAINT_UNIQUE) => StoreError::DuplicateEntry(title.to_string()),
                Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
                    StoreError::UnknownNamespace(namespace_id)
                }
                _ => err.into(),
            }),
        }
    }

    fn update(&self, namespace_id: NamespaceId, title: &str, content: &str) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE entries
             SET
                content = ?3,
                updated_at = MAX(updated_at, ?4)
             WHERE namespace_id = ?1
               AND title = ?2;",
            params![namespace_id.0, title, content, now_millis()],
        )?;

        if changed == 0 {
            return Err(StoreError::EntryNotFound(title.to_string()));
        }

        Ok(())
    }

    fn delete(&self, namespace_id: NamespaceId, title: &str) -> StoreResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM entries WHERE namespace_id = ?1 AND title = ?2;",
            params![namespace_id.0, title],
        )?;

        if changed == 0 {
            return Err(StoreError::EntryNotFound(title.to_string()));
        }

        Ok(())
    }

    fn list_by_namespace(&self, namespace_id: NamespaceId) -> StoreResult<Vec<EntrySummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, updated_at
             FROM entries
             WHERE namespace_id = ?1
             ORDER BY updated_at DESC, title ASC;",
        )?;

        let mut rows = stmt.query([namespace_id.0])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(EntrySummary {
                title: row.get("title")?,
                updated_at: row.get("updated_at")?,
            });
        }
        Ok(entries)
    }
}

/// Extended constraint code carried by a failed statement, if any.
fn constraint_kind(err: &rusqlite::Error) -> Option<c_int> {
    match err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Some(failure.extended_code)
        }
        _ => None,
    }
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let required: [(&str, &[&str]); 2] = [
        ("namespaces", &["id", "path"]),
        (
            "entries",
            &["id", "namespace_id", "title", "content", "updated_at"],
        ),
    ];

    for (table, columns) in required {
        if !table_exists(conn, table)? {
            return Err(StoreError::InvalidData(format!(
                "required table `{table}` is missing"
            )));
        }
        for column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(StoreError::InvalidData(format!(
                    "required column `{table}.{column}` is missing"
                )));
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::SqliteJotStore;
    use crate::repo::StoreError;
    use rusqlite::Connection;

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteJotStore::try_new(conn).err().unwrap();
        assert!(matches!(err, StoreError::InvalidData(message) if message.contains("namespaces")));
    }
}
