//! Adaptive monster decision stack.
//!
//! Four cooperating algorithms pick a monster's movement, combat action and
//! loadout each simulation tick while learning from the player:
//!
//! - [`pathfinding`]: cached A* over a versioned [`map::MapOracle`]
//! - [`prediction`]: online Naive Bayes over discretized player features
//! - [`optimization`]: simulated annealing of stats and equipment
//! - [`tactics`]: minimax with alpha-beta pruning under a deadline
//!
//! [`MonsterBrain`] runs them in order every tick. Rendering, dungeon
//! generation and combat resolution stay with the caller; the brain consumes
//! a map, a [`PlayerObservation`] and the monster's vitals and returns a
//! [`TacticalAction`].
pub mod brain;
pub mod budget;
pub mod config;
pub mod error;
pub mod map;
pub mod optimization;
pub mod pathfinding;
pub mod persistence;
pub mod prediction;
pub mod tactics;
pub mod workers;

pub use brain::{BrainStats, DecisionMode, EncounterResult, MonsterBrain, TickInput, TickOutcome};
pub use budget::Deadline;
pub use config::{
    AiConfig, Heuristic, OptimizationConfig, OrchestratorConfig, PathfindingConfig,
    PredictionConfig, TacticsConfig,
};
pub use error::{
    AiError, BrainError, ConfigError, Endpoint, ErrorSeverity, ImportError, PathError,
    PredictionError,
};
pub use map::{
    CellKind, Direction, GridMap, HazardKind, MapDimensions, MapOracle, MapParseError, MapVersion,
    Position,
};
pub use optimization::{
    AbilityKind, ArmorKind, Loadout, MonsterStats, MoveCadence, OptimizationReport,
    OutcomeHistory, OutcomeRecord, StatOptimizer, WeaponKind,
};
pub use pathfinding::{Path, PathSearch, Pathfinder, PathfinderStats, SearchStatus};
pub use persistence::{LEARNED_STATE_VERSION, LearnedState, LoadoutRecord};
pub use prediction::{
    BehaviorModel, BehaviorPredictor, FeatureVector, PlayerAction, PlayerObservation, Prediction,
};
pub use tactics::{ActionKind, GameStateSnapshot, TacticalAction, TacticalPlanner};
