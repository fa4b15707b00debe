//! Energy functions minimized by the annealer.
use super::outcome::{OutcomeHistory, OutcomeRecord};
use super::stats::Loadout;
use crate::prediction::PlaystyleProfile;

/// Energy of a loadout; lower is better.
pub trait Objective: Send + Sync {
    fn energy(&self, loadout: &Loadout) -> f64;
}

impl<F> Objective for F
where
    F: Fn(&Loadout) -> f64 + Send + Sync,
{
    fn energy(&self, loadout: &Loadout) -> f64 {
        self(loadout)
    }
}

/// Scores loadouts against the observed player and past encounters.
///
/// `energy = -(intrinsic + learned) + balance_penalty`, where the intrinsic
/// term counters the player's playstyle and the learned term is a
/// similarity-weighted average of historical outcome scores.
#[derive(Clone, Debug, PartialEq)]
pub struct EncounterObjective {
    profile: PlaystyleProfile,
    history: Vec<OutcomeRecord>,
}

impl EncounterObjective {
    pub fn new(profile: PlaystyleProfile, history: &OutcomeHistory) -> Self {
        Self {
            profile,
            history: history.iter().copied().collect(),
        }
    }

    /// Value of the stat line against the current playstyle.
    pub fn intrinsic(&self, loadout: &Loadout) -> f64 {
        let p = &self.profile;
        let attack = f64::from(loadout.effective_attack());
        let defense = f64::from(loadout.effective_defense());
        let speed = f64::from(loadout.effective_speed());
        let reach = f64::from(loadout.attack_range());

        // Speed pays off through `MoveCadence` when the world resolves moves.
        // Weights shift toward whatever counters the observed playstyle.
        let attack_weight = 1.0 + p.defensiveness;
        let defense_weight = 1.0 + 1.5 * p.aggression;
        let speed_weight = 1.0 + 2.0 * p.mobility;

        attack * attack_weight
            + defense * defense_weight
            + speed * 3.0 * speed_weight
            + reach * 4.0 * p.mobility
    }

    /// Similarity-weighted average outcome score, shrunk toward zero when
    /// little similar history exists.
    pub fn learned(&self, loadout: &Loadout) -> f64 {
        let mut weighted = 0.0;
        let mut weights = 0.0;
        for record in &self.history {
            let w = similarity(loadout, &record.loadout);
            weighted += w * record.score();
            weights += w;
        }
        if weights <= f64::EPSILON {
            return 0.0;
        }
        let support = weights / (weights + 1.0);
        weighted / weights * support
    }

    /// Penalty for extreme stat lines.
    pub fn balance_penalty(loadout: &Loadout) -> f64 {
        let mut penalty = 0.0;
        if loadout.attack > 30 {
            penalty += f64::from(loadout.attack - 30) * 2.0;
        }
        if loadout.defense > 20 {
            penalty += f64::from(loadout.defense - 20) * 2.0;
        }
        if loadout.speed > 8 {
            penalty += f64::from(loadout.speed - 8) * 5.0;
        }
        if loadout.speed as i32 - loadout.armor.speed_penalty() < 2 {
            penalty += 10.0;
        }
        penalty
    }
}

impl Objective for EncounterObjective {
    fn energy(&self, loadout: &Loadout) -> f64 {
        -(self.intrinsic(loadout) + self.learned(loadout)) + Self::balance_penalty(loadout)
    }
}

/// Similarity in `(0, 1]`; identical loadouts score 1.
fn similarity(a: &Loadout, b: &Loadout) -> f64 {
    let span = |bounds: super::stats::StatBounds| f64::from(bounds.max - bounds.min);
    let diff = |x: u32, y: u32| f64::from(x.abs_diff(y));

    let distance = diff(a.attack, b.attack) / span(Loadout::ATTACK)
        + diff(a.defense, b.defense) / span(Loadout::DEFENSE)
        + diff(a.speed, b.speed) / span(Loadout::SPEED)
        + if a.weapon == b.weapon { 0.0 } else { 1.0 }
        + if a.armor == b.armor { 0.0 } else { 1.0 };
    (-2.0 * distance).exp()
}
