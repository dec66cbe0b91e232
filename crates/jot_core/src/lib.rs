//! Core domain logic for jot: directory-scoped notes.
//! This crate owns namespace tracking, longest-prefix resolution and the
//! jot storage engine; the CLI is a thin layer on top.

pub mod config;
pub mod db;
pub mod editor;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use config::{ConfigOverrides, JotConfig, StorageBackend};
pub use editor::{Editor, EditorError, ExternalEditor};
pub use logging::{default_log_level, init_logging, logging_status, shutdown_logging};
pub use model::entry::{validate_title, Entry, EntryId, EntrySummary, TitleValidationError};
pub use model::namespace::{normalize_path, Namespace, NamespaceId};
pub use repo::fs_store::FsJotStore;
pub use repo::sqlite_store::SqliteJotStore;
pub use repo::{EntryStore, JotStore, NamespaceStore, StoreError, StoreResult};
pub use service::jot_service::{
    EditOutcome, JotDraft, JotError, JotResult, JotService, JotState,
};
pub use service::resolver::{ancestor_prefixes, resolve_namespace, MAX_ANCESTOR_DEPTH};
pub use storage::{open_store, purge_storage, storage_path};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
