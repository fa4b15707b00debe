//! Between-encounter tuning of the monster's stats and equipment.
//!
//! The [`StatOptimizer`] anneals the current [`Loadout`] against an
//! [`Objective`] built from the player's playstyle and the outcome history.
//! It is too slow for the tick loop and only runs at encounter boundaries.
mod annealer;
mod objective;
mod outcome;
mod stats;

pub use annealer::{Annealer, OptimizationReport, OptimizationState, neighbor};
pub use objective::{EncounterObjective, Objective};
pub use outcome::{OutcomeHistory, OutcomeRecord};
pub use stats::{
    AbilityKind, ArmorKind, Loadout, MonsterStats, MoveCadence, STEP_COST, StatBounds, WeaponKind,
};

use crate::config::OptimizationConfig;
use crate::prediction::PlaystyleProfile;

#[derive(Clone, Debug)]
pub struct StatOptimizer {
    annealer: Annealer,
    seed: u64,
}

impl StatOptimizer {
    pub fn new(config: &OptimizationConfig) -> Self {
        Self {
            annealer: Annealer::new(config),
            seed: config.seed,
        }
    }

    /// Proposes a new loadout from the current one and the outcome history.
    ///
    /// The run seed depends only on the base seed and the number of outcomes
    /// recorded, so identical histories give identical results.
    pub fn optimize(
        &self,
        current: Loadout,
        history: &OutcomeHistory,
        profile: PlaystyleProfile,
    ) -> OptimizationReport {
        let objective = EncounterObjective::new(profile, history);
        self.run(current, &objective, self.seed_for(history))
    }

    pub fn run<O: Objective + ?Sized>(
        &self,
        current: Loadout,
        objective: &O,
        seed: u64,
    ) -> OptimizationReport {
        self.annealer.run(current, objective, seed)
    }

    pub fn seed_for(&self, history: &OutcomeHistory) -> u64 {
        self.seed
            ^ history
                .recorded()
                .wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    pub(crate) fn annealer(&self) -> &Annealer {
        &self.annealer
    }
}
