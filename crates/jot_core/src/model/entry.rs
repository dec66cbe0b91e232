//! Entry ("jot") domain model.
//!
//! # Responsibility
//! - Define the stored record and its list projection.
//! - Validate user-supplied titles before they reach storage.
//!
//! # Invariants
//! - `(namespace_id, title)` identifies exactly one entry.
//! - `content` is never absent; a fresh jot holds the empty string.
//! - `updated_at` is refreshed on every write and never moves backwards.

use crate::model::namespace::NamespaceId;
use chrono::{DateTime, Local, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Composite identity of a stored entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryId {
    pub namespace_id: NamespaceId,
    pub title: String,
}

/// Full entry as read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub namespace_id: NamespaceId,
    pub title: String,
    pub content: String,
    /// Last write time in epoch milliseconds.
    pub updated_at: i64,
}

impl Entry {
    pub fn id(&self) -> EntryId {
        EntryId {
            namespace_id: self.namespace_id,
            title: self.title.clone(),
        }
    }

    /// Last write time in the local timezone.
    pub fn last_modified(&self) -> DateTime<Local> {
        local_time(self.updated_at)
    }
}

/// List projection: title plus last-modified time, without content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySummary {
    pub title: String,
    pub updated_at: i64,
}

impl EntrySummary {
    pub fn last_modified(&self) -> DateTime<Local> {
        local_time(self.updated_at)
    }
}

/// Reason a title was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleValidationError {
    Empty,
    ControlCharacter,
}

impl Display for TitleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "title cannot be empty"),
            Self::ControlCharacter => write!(f, "title cannot contain control characters"),
        }
    }
}

impl Error for TitleValidationError {}

/// Checks a user-supplied title.
///
/// Titles are stored verbatim; only blank titles and titles carrying control
/// characters are rejected.
pub fn validate_title(title: &str) -> Result<(), TitleValidationError> {
    if title.trim().is_empty() {
        return Err(TitleValidationError::Empty);
    }
    if title.chars().any(char::is_control) {
        return Err(TitleValidationError::ControlCharacter);
    }
    Ok(())
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Local::now().timestamp_millis()
}

fn local_time(epoch_ms: i64) -> DateTime<Local> {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .with_timezone(&Local)
}
