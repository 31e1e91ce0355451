//! # toth-core
//!
//! Core types, traits, and abstractions for the toth document backend.
//!
//! This crate provides the domain models, the shared error type, the
//! repository traits other crates implement, and the storage-root path
//! resolver that guards every file-system access.

pub mod defaults;
pub mod error;
pub mod file_safety;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use file_safety::{clean_filename, content_type_for, StorageRoot};
pub use models::*;
pub use traits::*;
