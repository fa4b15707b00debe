//! Player observations and the feature extractor that discretizes them.
use std::collections::VecDeque;

use super::features::{
    CombatStyle, DistanceClass, FeatureVector, HealthClass, MovementClass, PlayerAction, Quadrant,
};
use crate::error::PredictionError;
use crate::map::{MapDimensions, Position};

/// Player snapshot reported once per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerObservation {
    pub tick: u64,
    pub position: Position,
    /// Current health over maximum health, in `[0, 1]`.
    pub health_fraction: f64,
    /// Cells moved per tick.
    pub speed: f64,
    /// Action the player took since the previous observation.
    pub last_action: PlayerAction,
}

impl PlayerObservation {
    /// Rejects a health fraction outside `[0, 1]` and a negative or non-finite
    /// speed. NaN fails both checks.
    pub fn validate(&self) -> Result<(), PredictionError> {
        if !(0.0..=1.0).contains(&self.health_fraction) {
            return Err(PredictionError::HealthFraction(self.health_fraction));
        }
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err(PredictionError::Speed(self.speed));
        }
        Ok(())
    }
}

/// Sliding window of recent observations; the oldest entry is evicted first.
#[derive(Clone, Debug)]
pub struct ObservationWindow {
    capacity: usize,
    entries: VecDeque<PlayerObservation>,
}

impl ObservationWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, observation: PlayerObservation) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(observation);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&PlayerObservation> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerObservation> {
        self.entries.iter()
    }

    /// Share of windowed observations whose last action satisfies `predicate`.
    pub fn share(&self, predicate: impl Fn(PlayerAction) -> bool) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let hits = self
            .entries
            .iter()
            .filter(|o| predicate(o.last_action))
            .count();
        hits as f64 / self.entries.len() as f64
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Bucket boundaries used by [`FeatureExtractor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureThresholds {
    /// Below this speed the player counts as stationary.
    pub stationary_speed: f64,
    /// Below this speed the player counts as slow.
    pub slow_speed: f64,
    pub low_health: f64,
    pub medium_health: f64,
    /// Manhattan distance up to which the player is close.
    pub close_distance: u32,
    pub medium_distance: u32,
    /// Attack or defensive share needed to leave the balanced style.
    pub style_share: f64,
}

impl Default for FeatureThresholds {
    fn default() -> Self {
        Self {
            stationary_speed: 0.1,
            slow_speed: 1.5,
            low_health: 0.3,
            medium_health: 0.7,
            close_distance: 2,
            medium_distance: 6,
            style_share: 0.4,
        }
    }
}

/// Maps raw observations to [`FeatureVector`]s.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FeatureExtractor {
    pub thresholds: FeatureThresholds,
}

impl FeatureExtractor {
    pub fn new(thresholds: FeatureThresholds) -> Self {
        Self { thresholds }
    }

    pub fn extract(
        &self,
        observation: &PlayerObservation,
        window: &ObservationWindow,
        monster: Position,
        dimensions: MapDimensions,
    ) -> FeatureVector {
        FeatureVector::new(
            self.movement(observation.speed),
            self.health(observation.health_fraction),
            self.combat_style(window),
            self.distance(observation.position.manhattan(monster)),
            Self::quadrant(observation.position, dimensions),
        )
    }

    pub fn movement(&self, speed: f64) -> MovementClass {
        let t = &self.thresholds;
        if speed < t.stationary_speed {
            MovementClass::Stationary
        } else if speed < t.slow_speed {
            MovementClass::Slow
        } else {
            MovementClass::Fast
        }
    }

    pub fn health(&self, fraction: f64) -> HealthClass {
        let t = &self.thresholds;
        if fraction <= t.low_health {
            HealthClass::Low
        } else if fraction <= t.medium_health {
            HealthClass::Medium
        } else {
            HealthClass::High
        }
    }

    pub fn distance(&self, distance: u32) -> DistanceClass {
        let t = &self.thresholds;
        if distance <= t.close_distance {
            DistanceClass::Close
        } else if distance <= t.medium_distance {
            DistanceClass::Medium
        } else {
            DistanceClass::Far
        }
    }

    /// Style from the attack and defensive shares of the window.
    pub fn combat_style(&self, window: &ObservationWindow) -> CombatStyle {
        let attack = window.share(|a| a == PlayerAction::Attack);
        let defensive = window.share(PlayerAction::is_defensive);
        let threshold = self.thresholds.style_share;

        if attack >= threshold && attack > defensive {
            CombatStyle::Aggressive
        } else if defensive >= threshold && defensive > attack {
            CombatStyle::Cautious
        } else {
            CombatStyle::Balanced
        }
    }

    pub fn quadrant(position: Position, dimensions: MapDimensions) -> Quadrant {
        let top = (position.row as i64) * 2 < dimensions.height as i64;
        let left = (position.col as i64) * 2 < dimensions.width as i64;
        match (top, left) {
            (true, true) => Quadrant::TopLeft,
            (true, false) => Quadrant::TopRight,
            (false, true) => Quadrant::BottomLeft,
            (false, false) => Quadrant::BottomRight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(tick: u64, last_action: PlayerAction) -> PlayerObservation {
        PlayerObservation {
            tick,
            position: Position::new(1, 1),
            health_fraction: 1.0,
            speed: 0.0,
            last_action,
        }
    }

    #[test]
    fn window_evicts_oldest() {
        let mut window = ObservationWindow::new(3);
        for tick in 0..5 {
            window.push(observation(tick, PlayerAction::Idle));
        }
        assert_eq!(window.len(), 3);
        let ticks: Vec<u64> = window.iter().map(|o| o.tick).collect();
        assert_eq!(ticks, vec![2, 3, 4]);
        assert_eq!(window.latest().map(|o| o.tick), Some(4));
    }

    #[test]
    fn combat_style_follows_action_shares() {
        let extractor = FeatureExtractor::default();
        let mut window = ObservationWindow::new(10);
        assert_eq!(extractor.combat_style(&window), CombatStyle::Balanced);

        for tick in 0..4 {
            window.push(observation(tick, PlayerAction::Attack));
        }
        window.push(observation(4, PlayerAction::Move));
        assert_eq!(extractor.combat_style(&window), CombatStyle::Aggressive);

        window.clear();
        window.push(observation(0, PlayerAction::Dodge));
        window.push(observation(1, PlayerAction::Retreat));
        window.push(observation(2, PlayerAction::Attack));
        assert_eq!(extractor.combat_style(&window), CombatStyle::Cautious);
    }

    #[test]
    fn buckets_match_thresholds() {
        let extractor = FeatureExtractor::default();
        assert_eq!(extractor.movement(0.0), MovementClass::Stationary);
        assert_eq!(extractor.movement(1.0), MovementClass::Slow);
        assert_eq!(extractor.movement(2.0), MovementClass::Fast);
        assert_eq!(extractor.health(0.3), HealthClass::Low);
        assert_eq!(extractor.health(0.5), HealthClass::Medium);
        assert_eq!(extractor.health(0.9), HealthClass::High);
        assert_eq!(extractor.distance(2), DistanceClass::Close);
        assert_eq!(extractor.distance(6), DistanceClass::Medium);
        assert_eq!(extractor.distance(7), DistanceClass::Far);
    }

    #[test]
    fn quadrants_split_the_map() {
        let dims = MapDimensions::new(10, 10);
        assert_eq!(FeatureExtractor::quadrant(Position::new(0, 0), dims), Quadrant::TopLeft);
        assert_eq!(FeatureExtractor::quadrant(Position::new(0, 9), dims), Quadrant::TopRight);
        assert_eq!(FeatureExtractor::quadrant(Position::new(5, 4), dims), Quadrant::BottomLeft);
        assert_eq!(FeatureExtractor::quadrant(Position::new(9, 9), dims), Quadrant::BottomRight);
    }
}
