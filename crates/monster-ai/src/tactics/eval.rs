//! Leaf evaluation from the monster's point of view.
use super::state::GameStateSnapshot;
use crate::optimization::AbilityKind;
use crate::prediction::PlayerAction;

/// Score of decided games; dominates every heuristic score.
pub const TERMINAL_SCORE: f64 = 100_000.0;

/// Scores search leaves; higher favors the monster.
pub trait Evaluator {
    fn evaluate(&self, state: &GameStateSnapshot) -> f64;
}

impl<F> Evaluator for F
where
    F: Fn(&GameStateSnapshot) -> f64,
{
    fn evaluate(&self, state: &GameStateSnapshot) -> f64 {
        self(state)
    }
}

/// Weights of the linear evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvaluationWeights {
    pub health: f64,
    pub position: f64,
    pub ability: f64,
    pub distance: f64,
    pub efficiency: f64,
}

impl Default for EvaluationWeights {
    fn default() -> Self {
        Self {
            health: 10.0,
            position: 5.0,
            ability: 3.0,
            distance: 2.0,
            efficiency: 1.0,
        }
    }
}

/// Weighted sum of health, position, ability, distance and efficiency terms.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WeightedEvaluator {
    pub weights: EvaluationWeights,
}

impl WeightedEvaluator {
    /// Health percentage-point advantage.
    pub fn health_term(state: &GameStateSnapshot) -> f64 {
        (state.monster.health_fraction() - state.player.health_fraction()) * 100.0
    }

    /// +10 when able to strike, falling off by 2 per step beyond reach.
    pub fn position_term(state: &GameStateSnapshot) -> f64 {
        if state.monster_in_reach() {
            return 10.0;
        }
        match state.path_distance {
            Some(d) => (10.0 - 2.0 * f64::from(d.saturating_sub(state.monster.reach))).max(-20.0),
            None => -20.0,
        }
    }

    /// Value of abilities that are ready and useful right now.
    pub fn ability_term(state: &GameStateSnapshot) -> f64 {
        let monster = &state.monster;
        let mut score = 0.0;
        if monster.ability_ready(AbilityKind::Heal) && monster.health_fraction() < 0.7 {
            score += 15.0;
        }
        if monster.ability_ready(AbilityKind::ChargeAttack) && state.grid_distance() <= 2 {
            score += 10.0;
        }
        if monster.ability_ready(AbilityKind::DefensiveStance)
            && state.player.last_action == PlayerAction::Attack
        {
            score += 8.0;
        }
        score
    }

    /// Preference for holding exactly the weapon's reach.
    pub fn distance_term(state: &GameStateSnapshot) -> f64 {
        let Some(d) = state.path_distance else {
            return -5.0;
        };
        match d.abs_diff(state.monster.reach) {
            0 => 10.0,
            1..=2 => 5.0,
            _ => -5.0,
        }
    }

    /// Number of offensive options open to the monster.
    pub fn efficiency_term(state: &GameStateSnapshot) -> f64 {
        let ready = AbilityKind::ALL
            .iter()
            .filter(|a| state.monster.ability_ready(**a))
            .count();
        let attack = usize::from(state.monster_in_reach());
        (ready + attack) as f64
    }
}

impl Evaluator for WeightedEvaluator {
    fn evaluate(&self, state: &GameStateSnapshot) -> f64 {
        if state.player.health == 0 {
            return TERMINAL_SCORE;
        }
        if state.monster.health == 0 {
            return -TERMINAL_SCORE;
        }
        let w = &self.weights;
        w.health * Self::health_term(state)
            + w.position * Self::position_term(state)
            + w.ability * Self::ability_term(state)
            + w.distance * Self::distance_term(state)
            + w.efficiency * Self::efficiency_term(state)
    }
}
