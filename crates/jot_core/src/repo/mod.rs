//! Storage contracts for namespaces and entries, plus their backends.
//!
//! # Responsibility
//! - Define the `NamespaceStore` / `EntryStore` contracts shared by every
//!   backend.
//! - Map backend failures into semantic errors (`AlreadyTracked`,
//!   `DuplicateEntry`, ...) so callers never inspect engine messages.
//!
//! # Invariants
//! - A path is tracked at most once.
//! - `(namespace, title)` is unique; untracking cascades to entries.
//! - Failed writes leave storage unchanged.

use crate::db::DbError;
use crate::model::entry::{validate_title, Entry, EntryId, EntrySummary, TitleValidationError};
use crate::model::namespace::{normalize_path, Namespace, NamespaceId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub mod fs_store;
pub mod sqlite_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Semantic and transport errors raised by storage backends.
#[derive(Debug)]
pub enum StoreError {
    AlreadyTracked(PathBuf),
    NotTracked(PathBuf),
    NamespaceNotFound(PathBuf),
    UnknownNamespace(NamespaceId),
    EntryNotFound(String),
    DuplicateEntry(String),
    InvalidPath(PathBuf),
    InvalidTitle {
        title: String,
        reason: TitleValidationError,
    },
    InvalidData(String),
    Db(DbError),
    Io(io::Error),
    Serde(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyTracked(path) => {
                write!(f, "directory already tracked: {}", path.display())
            }
            Self::NotTracked(path) => write!(
                f,
                "directory not tracked: {} (run untrack from the tracked directory itself)",
                path.display()
            ),
            Self::NamespaceNotFound(path) => {
                write!(f, "jot dir not initialized: {}", path.display())
            }
            Self::UnknownNamespace(id) => write!(f, "namespace {id} does not exist"),
            Self::EntryNotFound(title) => write!(f, "jot not found: {title}"),
            Self::DuplicateEntry(title) => write!(f, "jot already exists: {title}"),
            Self::InvalidPath(path) => {
                write!(f, "path must be absolute UTF-8: {}", path.display())
            }
            Self::InvalidTitle { title, reason } => write!(f, "invalid title `{title}`: {reason}"),
            Self::InvalidData(message) => write!(f, "invalid persisted jot data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Serde(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTitle { reason, .. } => Some(reason),
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Serde(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<io::Error> for StoreError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Registry of tracked directory roots.
pub trait NamespaceStore {
    /// Registers `path` as a namespace root.
    fn track(&self, path: &Path) -> StoreResult<Namespace>;
    /// Removes the namespace at exactly `path` together with its entries.
    fn untrack(&self, path: &Path) -> StoreResult<()>;
    /// Returns every tracked path, sorted ascending.
    fn list_tracked(&self) -> StoreResult<Vec<PathBuf>>;
    /// Returns the tracked candidate with the longest path, if any.
    fn find_longest_tracked(&self, candidates: &[PathBuf]) -> StoreResult<Option<Namespace>>;
}

/// Named text entries scoped to a namespace.
pub trait EntryStore {
    fn get(&self, namespace_id: NamespaceId, title: &str) -> StoreResult<Entry>;
    /// Inserts a new entry; fails with `DuplicateEntry` when the title exists.
    fn create(&self, namespace_id: NamespaceId, title: &str, content: &str)
        -> StoreResult<EntryId>;
    /// Replaces content of an existing entry; fails with `EntryNotFound`.
    fn update(&self, namespace_id: NamespaceId, title: &str, content: &str) -> StoreResult<()>;
    /// Removes an entry; fails with `EntryNotFound` when absent.
    fn delete(&self, namespace_id: NamespaceId, title: &str) -> StoreResult<()>;
    /// Lists entries ordered by `updated_at DESC, title ASC`.
    fn list_by_namespace(&self, namespace_id: NamespaceId) -> StoreResult<Vec<EntrySummary>>;
}

/// Complete storage backend: one handle serving both contracts.
pub trait JotStore: NamespaceStore + EntryStore {}

impl<T: NamespaceStore + EntryStore> JotStore for T {}

/// Converts a namespace path into the UTF-8 text persisted by backends.
pub(crate) fn path_to_text(path: &Path) -> StoreResult<&str> {
    path.to_str()
        .ok_or_else(|| StoreError::InvalidPath(path.to_path_buf()))
}

/// Normalizes a namespace path, rejecting relative input.
pub(crate) fn canonical_path(path: &Path) -> StoreResult<PathBuf> {
    normalize_path(path).ok_or_else(|| StoreError::InvalidPath(path.to_path_buf()))
}

/// Applies title validation ahead of any write.
pub(crate) fn checked_title(title: &str) -> StoreResult<()> {
    validate_title(title).map_err(|reason| StoreError::InvalidTitle {
        title: title.to_string(),
        reason,
    })
}
