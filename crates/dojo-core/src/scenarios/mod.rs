pub mod generator;
pub mod loader;
mod patterns;

pub use generator::ScenarioGenerator;
pub use loader::load_external_scenarios;
