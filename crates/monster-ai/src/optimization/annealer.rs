//! Simulated annealing over monster loadouts.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strum::EnumCount;

use super::objective::Objective;
use super::stats::{ArmorKind, Loadout, StatBounds, WeaponKind};
use crate::config::OptimizationConfig;

/// Live search state of one annealing run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OptimizationState {
    pub candidate: Loadout,
    pub energy: f64,
    pub temperature: f64,
    pub iteration: u32,
}

/// Summary of a finished run.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationReport {
    /// Lowest-energy loadout seen during the run.
    pub best: Loadout,
    pub best_energy: f64,
    pub initial_energy: f64,
    pub iterations: u32,
    pub accepted: u32,
    pub rejected: u32,
    pub final_temperature: f64,
    pub seed: u64,
}

impl OptimizationReport {
    pub fn acceptance_rate(&self) -> f64 {
        let moves = self.accepted + self.rejected;
        if moves == 0 {
            0.0
        } else {
            f64::from(self.accepted) / f64::from(moves)
        }
    }

    pub fn improved(&self) -> bool {
        self.best_energy < self.initial_energy
    }
}

/// Geometric-cooling simulated annealer.
#[derive(Clone, Debug)]
pub struct Annealer {
    initial_temperature: f64,
    cooling_rate: f64,
    min_temperature: f64,
    max_iterations: u32,
}

impl Annealer {
    pub fn new(config: &OptimizationConfig) -> Self {
        Self {
            initial_temperature: config.initial_temperature,
            cooling_rate: config.cooling_rate,
            min_temperature: config.min_temperature,
            max_iterations: config.max_iterations,
        }
    }

    /// Anneals from `initial`, returning the best loadout seen.
    ///
    /// Runs until the temperature drops below the minimum or the iteration
    /// cap is reached. Identical inputs and seed give identical reports.
    pub fn run<O: Objective + ?Sized>(
        &self,
        initial: Loadout,
        objective: &O,
        seed: u64,
    ) -> OptimizationReport {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let initial_energy = objective.energy(&initial);
        let mut state = OptimizationState {
            candidate: initial,
            energy: initial_energy,
            temperature: self.initial_temperature,
            iteration: 0,
        };
        let mut best = (initial, initial_energy);
        let (mut accepted, mut rejected) = (0u32, 0u32);

        while state.iteration < self.max_iterations && state.temperature >= self.min_temperature
        {
            let neighbor = neighbor(&state.candidate, &mut rng);
            let energy = objective.energy(&neighbor);
            let delta = energy - state.energy;

            let accept = delta < 0.0
                || rng.gen_range(0.0..1.0) < (-delta / state.temperature).exp();
            if accept {
                state.candidate = neighbor;
                state.energy = energy;
                accepted += 1;
                if energy < best.1 {
                    best = (neighbor, energy);
                }
            } else {
                rejected += 1;
            }

            state.temperature *= self.cooling_rate;
            state.iteration += 1;
        }

        OptimizationReport {
            best: best.0,
            best_energy: best.1,
            initial_energy,
            iterations: state.iteration,
            accepted,
            rejected,
            final_temperature: state.temperature,
            seed,
        }
    }
}

/// Copy of `loadout` with exactly one dimension changed, within bounds.
pub fn neighbor(loadout: &Loadout, rng: &mut impl Rng) -> Loadout {
    let mut next = *loadout;
    match rng.gen_range(0..5) {
        0 => next.attack = nudge(loadout.attack, Loadout::ATTACK, 3, rng),
        1 => next.defense = nudge(loadout.defense, Loadout::DEFENSE, 2, rng),
        2 => next.speed = nudge(loadout.speed, Loadout::SPEED, 1, rng),
        3 => {
            let shift = rng.gen_range(1..WeaponKind::COUNT);
            let index = (loadout.weapon as usize + shift) % WeaponKind::COUNT;
            next.weapon = WeaponKind::from_repr(index).unwrap_or_default();
        }
        _ => {
            let shift = rng.gen_range(1..ArmorKind::COUNT);
            let index = (loadout.armor as usize + shift) % ArmorKind::COUNT;
            next.armor = ArmorKind::from_repr(index).unwrap_or_default();
        }
    }
    next
}

/// Moves `value` by up to `max_step` in a random direction, bouncing off the
/// bounds so the value always changes.
fn nudge(value: u32, bounds: StatBounds, max_step: u32, rng: &mut impl Rng) -> u32 {
    let step = i64::from(rng.gen_range(1..=max_step));
    let step = if rng.gen_bool(0.5) { step } else { -step };
    let moved = bounds.clamp(i64::from(value) + step);
    if moved != value {
        moved
    } else {
        bounds.clamp(i64::from(value) - step)
    }
}
