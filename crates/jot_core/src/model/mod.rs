//! Domain model for directory namespaces and the jots they own.
//!
//! # Responsibility
//! - Define the records shared by both storage backends.
//! - Own path and title normalization rules.
//!
//! # Invariants
//! - A namespace path is absolute and lexically normalized.
//! - An entry always belongs to exactly one namespace.

pub mod entry;
pub mod namespace;
