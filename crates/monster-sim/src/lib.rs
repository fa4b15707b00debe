//! Headless driver for the monster AI.
//!
//! Pits a [`monster_ai::MonsterBrain`] against a scripted player on an ASCII
//! map, persisting what the brain learns between runs.
pub mod config;
pub mod dirs;
pub mod loader;
pub mod logging;
pub mod repository;
pub mod scenario;

pub use config::SimConfig;
pub use loader::{BUILTIN_ARENA, load_ai_config, load_map, parse_ai_config};
pub use repository::{FileLearnedStateRepository, LearnedStateRepository, RepositoryError};
pub use scenario::{PlayerProfile, ScenarioConfig, SimulationSummary, run_scenario};
