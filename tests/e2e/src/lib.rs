//! Cadence end-to-end test support
//!
//! - [`harness`]: isolated on-disk databases
//! - [`mocks`]: test data factories and fault-injecting stores

pub mod harness;
pub mod mocks;

pub use harness::TestDatabaseManager;
pub use mocks::{LogFailingStore, TestDataFactory, TestScenario};
