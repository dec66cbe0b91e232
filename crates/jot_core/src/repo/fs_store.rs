//! Filesystem implementation of the namespace and entry stores.
//!
//! # Responsibility
//! - Lay namespaces out as hashed directories under one storage root.
//! - Store every entry as one JSON document named by the hash of its title.
//!
//! # Layout
//! ```text
//! <root>/namespaces/<id as 016x>/namespace.json
//! <root>/namespaces/<id as 016x>/entries/<sha1(title) hex>.json
//! ```
//!
//! # Invariants
//! - A namespace id is derived from the SHA-1 of its canonical path, so the
//!   same path always maps to the same directory.
//! - Writes go to a temp file in the target directory and are renamed into
//!   place; readers never observe a half-written document.
//! - `create_dir` and no-clobber renames are the uniqueness guards; an
//!   `AlreadyExists` io error is the duplicate signal.

use crate::model::entry::{now_millis, Entry, EntryId, EntrySummary};
use crate::model::namespace::{Namespace, NamespaceId};
use crate::repo::{
    canonical_path, checked_title, path_to_text, EntryStore, NamespaceStore, StoreError,
    StoreResult,
};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const NAMESPACES_DIR: &str = "namespaces";
const NAMESPACE_FILE: &str = "namespace.json";
const ENTRIES_DIR: &str = "entries";
const DOCUMENT_EXTENSION: &str = "json";

#[derive(Debug, Serialize, Deserialize)]
struct NamespaceRecord {
    id: i64,
    path: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryRecord {
    title: String,
    content: String,
    updated_at: i64,
}

/// Directory-tree jot store.
pub struct FsJotStore {
    root: PathBuf,
}

impl FsJotStore {
    /// Opens a store rooted at `root`, creating the directory skeleton.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(NAMESPACES_DIR))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespaces_dir(&self) -> PathBuf {
        self.root.join(NAMESPACES_DIR)
    }

    fn namespace_dir(&self, id: NamespaceId) -> PathBuf {
        self.namespaces_dir().join(format!("{:016x}", id.0))
    }

    fn entries_dir(&self, id: NamespaceId) -> PathBuf {
        self.namespace_dir(id).join(ENTRIES_DIR)
    }

    fn entry_path(&self, id: NamespaceId, title: &str) -> PathBuf {
        self.entries_dir(id)
            .join(format!("{}.{DOCUMENT_EXTENSION}", sha1_hex(title)))
    }

    fn read_namespace(&self, id: NamespaceId) -> StoreResult<Option<NamespaceRecord>> {
        read_document(&self.namespace_dir(id).join(NAMESPACE_FILE))
    }

    /// Returns the namespace record only when it belongs to `path_text`.
    fn tracked_at(&self, path_text: &str) -> StoreResult<Option<NamespaceRecord>> {
        let id = namespace_id_for(path_text);
        Ok(self
            .read_namespace(id)?
            .filter(|record| record.path == path_text))
    }

    fn read_entry(&self, namespace_id: NamespaceId, title: &str) -> StoreResult<EntryRecord> {
        let record: EntryRecord = read_document(&self.entry_path(namespace_id, title))?
            .ok_or_else(|| StoreError::EntryNotFound(title.to_string()))?;
        if record.title != title {
            return Err(StoreError::InvalidData(format!(
                "entry document for `{title}` holds title `{}`",
                record.title
            )));
        }
        Ok(record)
    }
}

impl NamespaceStore for FsJotStore {
    fn track(&self, path: &Path) -> StoreResult<Namespace> {
        let path = canonical_path(path)?;
        let path_text = path_to_text(&path)?;
        let id = namespace_id_for(path_text);
        let dir = self.namespace_dir(id);

        match fs::create_dir(&dir) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                match self.read_namespace(id)? {
                    Some(record) if record.path == path_text => {
                        return Err(StoreError::AlreadyTracked(path));
                    }
                    Some(record) => {
                        return Err(StoreError::InvalidData(format!(
                            "namespace id {id} already belongs to `{}`",
                            record.path
                        )));
                    }
                    // Directory left behind by an interrupted track; reclaim it.
                    None => {}
                }
            }
            Err(err) => return Err(err.into()),
        }

        let record = NamespaceRecord {
            id: id.0,
            path: path_text.to_string(),
        };
        if let Err(err) = write_document(&dir, &dir.join(NAMESPACE_FILE), &record, true) {
            let _ = fs::remove_dir_all(&dir);
            return Err(err);
        }

        Ok(Namespace { id, path })
    }

    fn untrack(&self, path: &Path) -> StoreResult<()> {
        let path = canonical_path(path)?;
        let path_text = path_to_text(&path)?;
        let Some(record) = self.tracked_at(path_text)? else {
            return Err(StoreError::NotTracked(path));
        };

        // Renaming first makes the untrack visible atomically; the tree is
        // removed afterwards.
        let id = NamespaceId(record.id);
        let tombstone = self
            .namespaces_dir()
            .join(format!(".{:016x}.untracked", id.0));
        match fs::remove_dir_all(&tombstone) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        fs::rename(self.namespace_dir(id), &tombstone)?;
        fs::remove_dir_all(&tombstone)?;
        Ok(())
    }

    fn list_tracked(&self) -> StoreResult<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for dir_entry in fs::read_dir(self.namespaces_dir())? {
            let dir_entry = dir_entry?;
            if dir_entry.file_name().to_string_lossy().starts_with('.')
                || !dir_entry.file_type()?.is_dir()
            {
                continue;
            }
            let record: Option<NamespaceRecord> =
                read_document(&dir_entry.path().join(NAMESPACE_FILE))?;
            if let Some(record) = record {
                paths.push(PathBuf::from(record.path));
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn find_longest_tracked(&self, candidates: &[PathBuf]) -> StoreResult<Option<Namespace>> {
        let mut best: Option<NamespaceRecord> = None;
        for candidate in candidates {
            let Some(path_text) = candidate.to_str() else {
                continue;
            };
            if let Some(record) = self.tracked_at(path_text)? {
                let longer = best
                    .as_ref()
                    .map_or(true, |current| record.path.len() > current.path.len());
                if longer {
                    best = Some(record);
                }
            }
        }

        Ok(best.map(|record| Namespace {
            id: NamespaceId(record.id),
            path: PathBuf::from(record.path),
        }))
    }
}

impl EntryStore for FsJotStore {
    fn get(&self, namespace_id: NamespaceId, title: &str) -> StoreResult<Entry> {
        let record = self.read_entry(namespace_id, title)?;
        Ok(Entry {
            namespace_id,
            title: record.title,
            content: record.content,
            updated_at: record.updated_at,
        })
    }

    fn create(
        &self,
        namespace_id: NamespaceId,
        title: &str,
        content: &str,
    ) -> StoreResult<EntryId> {
        checked_title(title)?;
        if self.read_namespace(namespace_id)?.is_none() {
            return Err(StoreError::UnknownNamespace(namespace_id));
        }

        let entries_dir = self.entries_dir(namespace_id);
        fs::create_dir_all(&entries_dir)?;
        let record = EntryRecord {
            title: title.to_string(),
            content: content.to_string(),
            updated_at: now_millis(),
        };

        match write_document(
            &entries_dir,
            &self.entry_path(namespace_id, title),
            &record,
            false,
        ) {
            Ok(()) => Ok(EntryId {
                namespace_id,
                title: title.to_string(),
            }),
            Err(StoreError::Io(err)) if err.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::DuplicateEntry(title.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    fn update(&self, namespace_id: NamespaceId, title: &str, content: &str) -> StoreResult<()> {
        let previous = self.read_entry(namespace_id, title)?;
        let record = EntryRecord {
            title: previous.title,
            content: content.to_string(),
            updated_at: previous.updated_at.max(now_millis()),
        };
        write_document(
            &self.entries_dir(namespace_id),
            &self.entry_path(namespace_id, title),
            &record,
            true,
        )
    }

    fn delete(&self, namespace_id: NamespaceId, title: &str) -> StoreResult<()> {
        // Verifies the title actually owns this document before removing it.
        self.read_entry(namespace_id, title)?;
        match fs::remove_file(self.entry_path(namespace_id, title)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StoreError::EntryNotFound(title.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn list_by_namespace(&self, namespace_id: NamespaceId) -> StoreResult<Vec<EntrySummary>> {
        let dir = match fs::read_dir(self.entries_dir(namespace_id)) {
            Ok(dir) => dir,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut entries = Vec::new();
        for dir_entry in dir {
            let path = dir_entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            if let Some(record) = read_document::<EntryRecord>(&path)? {
                entries.push(EntrySummary {
                    title: record.title,
                    updated_at: record.updated_at,
                });
            }
        }

        entries.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(entries)
    }
}

/// Derives the stable namespace id for a canonical path.
pub fn namespace_id_for(path_text: &str) -> NamespaceId {
    let digest = Sha1::digest(path_text.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    NamespaceId(i64::from_be_bytes(head) & i64::MAX)
}

fn sha1_hex(value: &str) -> String {
    hex::encode(Sha1::digest(value.as_bytes()))
}

/// Reads and parses a JSON document; a missing file yields `None`.
fn read_document<T: for<'de> Deserialize<'de>>(path: &Path) -> StoreResult<Option<T>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Writes a JSON document through a temp file in `dir`.
///
/// With `overwrite == false` the final rename refuses to replace an existing
/// file and surfaces `ErrorKind::AlreadyExists`.
fn write_document<T: Serialize>(
    dir: &Path,
    target: &Path,
    value: &T,
    overwrite: bool,
) -> StoreResult<()> {
    let mut scratch = NamedTempFile::new_in(dir)?;
    serde_json::to_writer(&mut scratch, value)?;
    scratch.flush()?;
    scratch.as_file().sync_all()?;

    let persisted = if overwrite {
        scratch.persist(target)
    } else {
        scratch.persist_noclobber(target)
    };
    persisted.map_err(|err| StoreError::Io(io::Error::from(err)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{namespace_id_for, sha1_hex};

    #[test]
    fn namespace_id_is_stable_and_non_negative() {
        let first = namespace_id_for("/home/me/proj");
        let second = namespace_id_for("/home/me/proj");
        assert_eq!(first, second);
        assert!(first.0 >= 0);
        assert_ne!(first, namespace_id_for("/home/me/proj/sub"));
    }

    #[test]
    fn title_hash_is_filename_safe() {
        let hashed = sha1_hex("docs/api notes");
        assert_eq!(hashed.len(), 40);
        assert!(hashed.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
