//! Adversarial look-ahead for the monster's immediate action.
//!
//! The [`TacticalPlanner`] runs minimax with alpha-beta pruning over
//! [`GameStateSnapshot`]s. Plies alternate monster and player; every legal
//! player response is searched, with the predicted one ordered first. Leaves
//! are scored by an [`Evaluator`], by default the weighted sum of health,
//! position, ability, distance and efficiency terms.
mod eval;
mod navigator;
mod search;
mod state;

pub use eval::{EvaluationWeights, Evaluator, TERMINAL_SCORE, WeightedEvaluator};
pub use navigator::Navigator;
pub use search::{Decision, SearchReport, TacticalPlanner};
pub use state::{
    ActionKind, GameStateSnapshot, MAX_MONSTER_ACTIONS, MAX_PLAYER_ACTIONS, MonsterActions,
    MonsterSide, PlayerActions, PlayerSide, TacticalAction, hit_damage,
};
