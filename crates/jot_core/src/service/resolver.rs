//! Working-directory to namespace resolution.
//!
//! # Responsibility
//! - Expand a directory into its ancestor prefixes, deepest first.
//! - Ask the store for the longest tracked prefix.
//!
//! # Invariants
//! - A tracked path resolves to itself.
//! - A path inside a tracked root resolves to the deepest tracked ancestor.
//! - Prefix generation is bounded by `MAX_ANCESTOR_DEPTH` and never panics on
//!   the filesystem root.

use crate::model::namespace::{normalize_path, Namespace};
use crate::repo::{NamespaceStore, StoreError, StoreResult};
use std::path::{Path, PathBuf};

/// Upper bound on the number of ancestor prefixes considered per lookup.
///
/// Paths nested deeper than this only match their nearest 256 ancestors.
pub const MAX_ANCESTOR_DEPTH: usize = 256;

/// Lists `path` and each of its ancestors, most specific first.
///
/// `/a/b/c` yields `/a/b/c`, `/a/b`, `/a`, `/`. Relative input yields
/// `InvalidPath`.
pub fn ancestor_prefixes(path: &Path) -> StoreResult<Vec<PathBuf>> {
    let normalized =
        normalize_path(path).ok_or_else(|| StoreError::InvalidPath(path.to_path_buf()))?;
    Ok(normalized
        .ancestors()
        .take(MAX_ANCESTOR_DEPTH)
        .map(Path::to_path_buf)
        .collect())
}

/// Resolves `path` to the namespace of its deepest tracked ancestor.
///
/// Fails with `NamespaceNotFound` naming the original `path` when no
/// ancestor is tracked.
pub fn resolve_namespace<S>(store: &S, path: &Path) -> StoreResult<Namespace>
where
    S: NamespaceStore + ?Sized,
{
    let candidates = ancestor_prefixes(path)?;
    store
        .find_longest_tracked(&candidates)?
        .ok_or_else(|| StoreError::NamespaceNotFound(path.to_path_buf()))
}
