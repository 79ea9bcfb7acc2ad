//! # notesbe-core
//!
//! Core types, traits, and access rules for the notesbe note-sharing backend.
//!
//! This crate provides the domain model (users, notes, share grants), the
//! repository traits that storage backends implement, and the
//! [`AccessResolver`] that decides which notes a user may read or mutate.

pub mod access;
pub mod error;
pub mod logging;
#[cfg(any(test, feature = "mock"))]
pub mod memory;
pub mod models;
pub mod password;
pub mod query;
pub mod traits;

// Re-export commonly used types at crate root
pub use access::AccessResolver;
pub use error::{Error, Result};
#[cfg(any(test, feature = "mock"))]
pub use memory::MemoryStore;
pub use models::*;
pub use query::normalize_query;
pub use traits::*;
