//! Storage abstraction and implementations for Dojo progress.
//!
//! This crate provides the trait-based interfaces the progress core consumes
//! (user store and requirement catalog) with an in-memory and a JSON file
//! implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod memory;
#[cfg(feature = "json")]
pub mod json_storage;

pub use trait_::{ProgressCommit, RequirementCatalog, Result, StorageError, UserStore};
pub use memory::MemoryStorage;
#[cfg(feature = "json")]
pub use json_storage::JsonStorage;
