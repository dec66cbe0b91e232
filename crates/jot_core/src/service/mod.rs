//! Core use-case services.
//!
//! # Responsibility
//! - Resolve working directories to namespaces.
//! - Orchestrate the jot edit lifecycle over a storage backend.
//! - Keep CLI layers decoupled from storage details.

pub mod jot_service;
pub mod resolver;
