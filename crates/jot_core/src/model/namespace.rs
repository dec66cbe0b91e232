//! Namespace domain model.
//!
//! # Responsibility
//! - Represent one tracked directory root and its stable identifier.
//! - Normalize candidate paths before they reach storage or resolution.
//!
//! # Invariants
//! - `path` is absolute, contains no `.`/`..` components and no trailing
//!   separator.
//! - `id` never changes for the lifetime of the namespace.

use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf};

/// Opaque, stable handle for a tracked namespace.
///
/// The SQLite backend uses the row key; the filesystem backend derives it
/// from a hash of the canonical path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(pub i64);

impl Display for NamespaceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One tracked directory root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub id: NamespaceId,
    /// Canonical absolute path this namespace was tracked at.
    pub path: PathBuf,
}

/// Lexically normalizes an absolute path.
///
/// Returns `None` for relative paths. `..` never climbs above the root, so
/// `/../a` normalizes to `/a`. Symlinks are not resolved here; callers that
/// need that canonicalize against the filesystem first.
pub fn normalize_path(path: &Path) -> Option<PathBuf> {
    if !path.is_absolute() {
        return None;
    }

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::normalize_path;
    use std::path::{Path, PathBuf};

    #[test]
    fn normalize_path_collapses_redundant_components() {
        assert_eq!(
            normalize_path(Path::new("/proj//sub/./deep/../")),
            Some(PathBuf::from("/proj/sub"))
        );
    }

    #[test]
    fn normalize_path_keeps_root() {
        assert_eq!(normalize_path(Path::new("/")), Some(PathBuf::from("/")));
        assert_eq!(normalize_path(Path::new("/..")), Some(PathBuf::from("/")));
    }

    #[test]
    fn normalize_path_rejects_relative_paths() {
        assert_eq!(normalize_path(Path::new("proj/sub")), None);
        assert_eq!(normalize_path(Path::new("")), None);
    }
}
