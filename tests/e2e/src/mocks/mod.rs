//! Test data and store doubles

mod failing_store;

pub use failing_store::LogFailingStore;
pub use fixtures::{TestDataFactory, TestScenario};
