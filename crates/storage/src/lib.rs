//! Persistence for peer groups.
//!
//! This crate provides:
//! - The async `Storage` seam over a key-value engine
//! - An in-memory engine and a JSON file engine
//! - `GroupStore`, the typed group/peer repository and its key layout

pub mod backend;
pub mod error;
pub mod file;
pub mod memory;
pub mod repository;

pub use backend::Storage;
pub use error::{Result, StorageError};
pub use file::JsonFileStorage;
pub use memory::InMemoryStorage;
pub use repository::GroupStore;
