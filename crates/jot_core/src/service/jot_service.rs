//! Jot lifecycle service.
//!
//! # Responsibility
//! - Expose namespace tracking and resolution to callers.
//! - Decide whether an edit session creates or updates an entry
//!   (fetch-or-create) and commit the result.
//! - Attach the offending title or path to every failure.
//!
//! # Invariants
//! - `EntryNotFound` during fetch selects the `New` branch and is never
//!   surfaced.
//! - The editor is not run when fetch fails for any other reason.
//! - A failed edit writes nothing back.
//! - The service is storage-agnostic: it only sees `dyn JotStore`.

use crate::editor::{Editor, EditorError};
use crate::model::entry::{Entry, EntrySummary};
use crate::model::namespace::{Namespace, NamespaceId};
use crate::repo::{checked_title, JotStore, StoreError};
use crate::service::resolver::resolve_namespace;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Service error for jot use-cases.
#[derive(Debug)]
pub enum JotError {
    /// Storage could not be opened; nothing else was attempted.
    StorageUnavailable { home: PathBuf, source: StoreError },
    /// Namespace or entry operation failed.
    Store(StoreError),
    /// The editing collaborator failed; nothing was written.
    EditorFailed { title: String, source: EditorError },
    /// Persisting edited content failed.
    Save { title: String, source: StoreError },
}

impl JotError {
    /// Underlying store error, when there is one.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::StorageUnavailable { source, .. } | Self::Save { source, .. } => Some(source),
            Self::Store(err) => Some(err),
            Self::EditorFailed { .. } => None,
        }
    }
}

impl Display for JotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable { home, source } => {
                write!(f, "jot storage unavailable at {}: {source}", home.display())
            }
            Self::Store(err) => write!(f, "{err}"),
            Self::EditorFailed { title, source } => {
                write!(f, "couldn't edit jot `{title}`: {source}")
            }
            Self::Save { title, source } => write!(f, "couldn't save `{title}`: {source}"),
        }
    }
}

impl Error for JotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable { source, .. } | Self::Save { source, .. } => Some(source),
            Self::Store(err) => Some(err),
            Self::EditorFailed { source, .. } => Some(source),
        }
    }
}

impl From<StoreError> for JotError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub type JotResult<T> = Result<T, JotError>;

/// Whether an edit session targets a stored entry or a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JotState {
    Existing,
    New,
}

/// Resolved edit session: the initial buffer and which write will follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JotDraft {
    pub namespace_id: NamespaceId,
    pub title: String,
    pub initial_content: String,
    pub state: JotState,
}

impl JotDraft {
    pub fn is_new(&self) -> bool {
        self.state == JotState::New
    }
}

/// Which write a successful commit performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Created,
    Updated,
}

/// Jot service facade over a storage backend.
pub struct JotService {
    store: Box<dyn JotStore>,
}

impl JotService {
    /// Creates a service over the provided backend.
    pub fn new(store: impl JotStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Creates a service over a backend chosen at runtime.
    pub fn from_boxed(store: Box<dyn JotStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn JotStore {
        self.store.as_ref()
    }

    /// Resolves `path` to the namespace of its deepest tracked ancestor.
    pub fn resolve_namespace(&self, path: &Path) -> JotResult<Namespace> {
        Ok(resolve_namespace(&*self.store, path)?)
    }

    /// Tracks `path` as a new namespace root.
    pub fn track_path(&self, path: &Path) -> JotResult<Namespace> {
        let namespace = self.store.track(path)?;
        info!(
            "event=namespace_track module=service status=ok namespace_id={}",
            namespace.id
        );
        Ok(namespace)
    }

    /// Untracks the namespace rooted exactly at `path`, deleting its jots.
    pub fn untrack_path(&self, path: &Path) -> JotResult<()> {
        self.store.untrack(path)?;
        info!("event=namespace_untrack module=service status=ok");
        Ok(())
    }

    pub fn list_tracked_paths(&self) -> JotResult<Vec<PathBuf>> {
        Ok(self.store.list_tracked()?)
    }

    /// Loads the initial buffer for an edit session.
    ///
    /// An existing entry yields its content with `JotState::Existing`; a
    /// missing one yields an empty buffer with `JotState::New`.
    pub fn fetch_or_create(&self, namespace_id: NamespaceId, title: &str) -> JotResult<JotDraft> {
        checked_title(title)?;
        match self.store.get(namespace_id, title) {
            Ok(entry) => Ok(JotDraft {
                namespace_id,
                title: entry.title,
                initial_content: entry.content,
                state: JotState::Existing,
            }),
            Err(StoreError::EntryNotFound(_)) => Ok(JotDraft {
                namespace_id,
                title: title.to_string(),
                initial_content: String::new(),
                state: JotState::New,
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Persists edited content: creates when `is_new`, updates otherwise.
    pub fn commit(
        &self,
        namespace_id: NamespaceId,
        title: &str,
        is_new: bool,
        content: &str,
    ) -> JotResult<EditOutcome> {
        let saved = if is_new {
            self.store
                .create(namespace_id, title, content)
                .map(|_| EditOutcome::Created)
        } else {
            self.store
                .update(namespace_id, title, content)
                .map(|()| EditOutcome::Updated)
        };

        match saved {
            Ok(outcome) => {
                info!(
                    "event=jot_save module=service status=ok namespace_id={namespace_id} outcome={outcome:?} bytes={}",
                    content.len()
                );
                Ok(outcome)
            }
            Err(source) => {
                error!(
                    "event=jot_save module=service status=error namespace_id={namespace_id} is_new={is_new} error={source}"
                );
                Err(JotError::Save {
                    title: title.to_string(),
                    source,
                })
            }
        }
    }

    /// Runs one full edit session: fetch-or-create, edit, commit.
    pub fn edit<E>(
        &self,
        namespace_id: NamespaceId,
        title: &str,
        editor: &mut E,
    ) -> JotResult<EditOutcome>
    where
        E: Editor + ?Sized,
    {
        let draft = self.fetch_or_create(namespace_id, title)?;
        let edited = editor
            .edit(&draft.initial_content)
            .map_err(|source| JotError::EditorFailed {
                title: draft.title.clone(),
                source,
            })?;
        self.commit(namespace_id, &draft.title, draft.is_new(), &edited)
    }

    /// Reads one entry for display.
    pub fn show(&self, namespace_id: NamespaceId, title: &str) -> JotResult<Entry> {
        Ok(self.store.get(namespace_id, title)?)
    }

    /// Deletes one entry; a missing title fails with `EntryNotFound`.
    pub fn delete_entry(&self, namespace_id: NamespaceId, title: &str) -> JotResult<()> {
        self.store.delete(namespace_id, title)?;
        info!("event=jot_delete module=service status=ok namespace_id={namespace_id}");
        Ok(())
    }

    pub fn list_entries(&self, namespace_id: NamespaceId) -> JotResult<Vec<EntrySummary>> {
        Ok(self.store.list_by_namespace(namespace_id)?)
    }

    /// Copies an entry into the namespace resolved for `destination`.
    ///
    /// The copy keeps the source title unless `new_title` is given. An
    /// existing destination entry has its content replaced.
    pub fn copy_entry(
        &self,
        namespace_id: NamespaceId,
        title: &str,
        destination: &Path,
        new_title: Option<&str>,
    ) -> JotResult<EditOutcome> {
        let source = self.store.get(namespace_id, title)?;
        let target = self.resolve_namespace(destination)?;
        let target_title = new_title.unwrap_or(title);

        let draft = self.fetch_or_create(target.id, target_title)?;
        self.commit(target.id, target_title, draft.is_new(), &source.content)
    }
}
