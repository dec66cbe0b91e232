//! Backend selection and whole-store maintenance.
//!
//! # Responsibility
//! - Open the backend named by `JotConfig` under its storage root.
//! - Remove every jot of a backend on explicit request.
//!
//! # Invariants
//! - A failure to open storage is `StorageUnavailable` and happens before any
//!   namespace or entry operation.
//! - Callers receive `dyn JotStore` and never learn which backend is active.

use crate::config::{JotConfig, StorageBackend};
use crate::repo::fs_store::FsJotStore;
use crate::repo::sqlite_store::SqliteJotStore;
use crate::repo::{JotStore, StoreResult};
use crate::service::jot_service::{JotError, JotResult};
use log::{error, info};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

const DB_FILE_NAME: &str = "jot.db";
const FS_STORE_DIR: &str = "store";

/// Location of the selected backend's data under the storage root.
pub fn storage_path(config: &JotConfig) -> PathBuf {
    match config.backend {
        StorageBackend::Sqlite => config.home.join(DB_FILE_NAME),
        StorageBackend::Fs => config.home.join(FS_STORE_DIR),
    }
}

/// Opens the configured backend, creating the storage root if needed.
pub fn open_store(config: &JotConfig) -> JotResult<Box<dyn JotStore>> {
    match open_backend(config) {
        Ok(store) => {
            info!(
                "event=store_open module=storage status=ok backend={}",
                config.backend
            );
            Ok(store)
        }
        Err(source) => {
            error!(
                "event=store_open module=storage status=error backend={} error={}",
                config.backend, source
            );
            Err(JotError::StorageUnavailable {
                home: config.home.clone(),
                source,
            })
        }
    }
}

fn open_backend(config: &JotConfig) -> StoreResult<Box<dyn JotStore>> {
    fs::create_dir_all(&config.home)?;
    let path = storage_path(config);
    let store: Box<dyn JotStore> = match config.backend {
        StorageBackend::Sqlite => Box::new(SqliteJotStore::open(path)?),
        StorageBackend::Fs => Box::new(FsJotStore::open(path)?),
    };
    Ok(store)
}

/// Deletes every namespace and jot held by the configured backend.
///
/// Returns `false` when there was nothing to remove.
pub fn purge_storage(config: &JotConfig) -> JotResult<bool> {
    let path = storage_path(config);
    let removed = match config.backend {
        StorageBackend::Sqlite => fs::remove_file(&path),
        StorageBackend::Fs => fs::remove_dir_all(&path),
    };

    match removed {
        Ok(()) => {
            info!(
                "event=store_purge module=storage status=ok backend={}",
                config.backend
            );
            Ok(true)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(JotError::StorageUnavailable {
            home: config.home.clone(),
            source: err.into(),
        }),
    }
}
