//! Storage Module
//!
//! Persistence for review states and review logs:
//! - Store contracts the scheduler depends on
//! - SQLite implementation with a transactional grade commit
//! - In-process implementation
//! - Schema migrations

mod error;
mod memory;
mod migrations;
mod sqlite;
mod store;

pub use error::{Result, StorageError};
pub use memory::MemoryStore;
pub use migrations::MIGRATIONS;
pub use sqlite::Storage;
pub use store::{GradeRecorder, ItemLookup, ReviewLogStore, ReviewStateStore};
