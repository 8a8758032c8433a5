mod loader;

pub use loader::{ScenarioError, ScenarioLoader, run, write_results};
