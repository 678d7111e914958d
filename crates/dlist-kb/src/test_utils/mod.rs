//! Fixtures and fake stores shared by unit and integration tests

pub mod fakes;
pub mod fixtures;

pub use fakes::FailingGraphStore;
pub use fixtures::{poetry_scenario, write_fallback_poems, ScenarioIds};
