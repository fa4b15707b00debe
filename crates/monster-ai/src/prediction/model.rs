//! Incremental Naive Bayes over dense count tables.
use strum::IntoEnumIterator;

use super::features::{
    ACTION_COUNT, Category, FEATURE_CARDINALITIES, FEATURE_COUNT, FeatureVector,
    MAX_FEATURE_VALUES, PlayerAction,
};

/// Predicted next action with its normalized posterior.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prediction {
    pub action: PlayerAction,
    /// Posterior probability of `action`, in `[0, 1]`.
    pub confidence: f64,
}

impl Prediction {
    /// Default answer of an untrained model.
    pub fn uninformed() -> Self {
        Self {
            action: PlayerAction::default(),
            confidence: 1.0 / ACTION_COUNT as f64,
        }
    }
}

type FeatureTable = [[u64; MAX_FEATURE_VALUES]; FEATURE_COUNT];

/// Laplace-smoothed Naive Bayes classifier.
///
/// Counts only grow; [`BehaviorModel::clear`] is the sole way to reset them.
#[derive(Clone, Debug, PartialEq)]
pub struct BehaviorModel {
    smoothing: f64,
    action_counts: [u64; ACTION_COUNT],
    feature_counts: [FeatureTable; ACTION_COUNT],
    total: u64,
}

impl BehaviorModel {
    pub fn new(smoothing: f64) -> Self {
        Self {
            smoothing,
            action_counts: [0; ACTION_COUNT],
            feature_counts: [[[0; MAX_FEATURE_VALUES]; FEATURE_COUNT]; ACTION_COUNT],
            total: 0,
        }
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_trained(&self) -> bool {
        self.total > 0
    }

    pub fn action_count(&self, action: PlayerAction) -> u64 {
        self.action_counts[action.id()]
    }

    /// Times `action` was observed with value `value` of feature `feature`.
    pub fn feature_count(&self, action: PlayerAction, feature: usize, value: usize) -> u64 {
        self.feature_counts[action.id()]
            .get(feature)
            .and_then(|values| values.get(value))
            .copied()
            .unwrap_or(0)
    }

    /// Records one labelled observation in `O(features)`.
    pub fn observe(&mut self, features: &FeatureVector, action: PlayerAction) {
        let a = action.id();
        self.total += 1;
        self.action_counts[a] += 1;
        for (feature, value) in features.ids().into_iter().enumerate() {
            self.feature_counts[a][feature][value] += 1;
        }
    }

    /// Arg-max action and its posterior. Pure over the current counts.
    ///
    /// Ties resolve to the action with the lowest id.
    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        if !self.is_trained() {
            return Prediction::uninformed();
        }

        let log_posterior = self.log_joint(features);
        let mut best = 0;
        for (index, score) in log_posterior.iter().enumerate() {
            if *score > log_posterior[best] {
                best = index;
            }
        }

        // Log-sum-exp normalization around the maximum.
        let max = log_posterior[best];
        let normalizer: f64 = log_posterior.iter().map(|s| (s - max).exp()).sum();

        Prediction {
            action: PlayerAction::from_id(best).unwrap_or_default(),
            confidence: (1.0 / normalizer).clamp(0.0, 1.0),
        }
    }

    /// Normalized posterior over every action.
    pub fn distribution(&self, features: &FeatureVector) -> [f64; ACTION_COUNT] {
        if !self.is_trained() {
            return [1.0 / ACTION_COUNT as f64; ACTION_COUNT];
        }
        let log_joint = self.log_joint(features);
        let max = log_joint.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut weights = log_joint.map(|s| (s - max).exp());
        let sum: f64 = weights.iter().sum();
        for weight in &mut weights {
            *weight /= sum;
        }
        weights
    }

    /// Forgets every observation.
    pub fn clear(&mut self) {
        *self = Self::new(self.smoothing);
    }

    /// Unnormalized `log P(a) + sum_f log P(v_f | a)` for every action.
    fn log_joint(&self, features: &FeatureVector) -> [f64; ACTION_COUNT] {
        let alpha = self.smoothing;
        let ids = features.ids();
        let prior_denominator = self.total as f64 + alpha * ACTION_COUNT as f64;

        let mut scores = [0.0; ACTION_COUNT];
        for action in PlayerAction::iter() {
            let a = action.id();
            let n_a = self.action_counts[a] as f64;
            let mut score = ((n_a + alpha) / prior_denominator).ln();
            for (feature, value) in ids.iter().enumerate() {
                let n = self.feature_counts[a][feature][*value] as f64;
                let values = FEATURE_CARDINALITIES[feature] as f64;
                score += ((n + alpha) / (n_a + alpha * values)).ln();
            }
            scores[a] = score;
        }
        scores
    }

    /// Replaces every count at once; the caller guarantees consistency.
    pub(crate) fn restore(
        &mut self,
        action_counts: [u64; ACTION_COUNT],
        feature_counts: [FeatureTable; ACTION_COUNT],
    ) {
        self.total = action_counts
            .iter()
            .fold(0u64, |total, n| total.saturating_add(*n));
        self.action_counts = action_counts;
        self.feature_counts = feature_counts;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::features::{
        CombatStyle, DistanceClass, HealthClass, MovementClass, Quadrant,
    };

    fn close_aggressive() -> FeatureVector {
        FeatureVector::new(
            MovementClass::Fast,
            HealthClass::High,
            CombatStyle::Aggressive,
            DistanceClass::Close,
            Quadrant::TopLeft,
        )
    }

    fn far_cautious() -> FeatureVector {
        FeatureVector::new(
            MovementClass::Slow,
            HealthClass::Low,
            CombatStyle::Cautious,
            DistanceClass::Far,
            Quadrant::BottomRight,
        )
    }

    #[test]
    fn untrained_model_predicts_idle_uniformly() {
        let model = BehaviorModel::new(1.0);
        let prediction = model.predict(&close_aggressive());
        assert_eq!(prediction.action, PlayerAction::Idle);
        assert!((prediction.confidence - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn confidence_grows_but_stays_below_one() {
        let mut model = BehaviorModel::new(1.0);
        let mut previous = 0.0;
        for _ in 0..50 {
            model.observe(&close_aggressive(), PlayerAction::Attack);
            let prediction = model.predict(&close_aggressive());
            assert_eq!(prediction.action, PlayerAction::Attack);
            assert!(prediction.confidence > previous);
            assert!(prediction.confidence < 1.0);
            previous = prediction.confidence;
        }
        assert!(previous > 0.99);
    }

    #[test]
    fn features_separate_actions() {
        let mut model = BehaviorModel::new(1.0);
        for _ in 0..10 {
            model.observe(&close_aggressive(), PlayerAction::Attack);
            model.observe(&far_cautious(), PlayerAction::Retreat);
        }
        assert_eq!(model.predict(&close_aggressive()).action, PlayerAction::Attack);
        assert_eq!(model.predict(&far_cautious()).action, PlayerAction::Retreat);
    }

    #[test]
    fn distribution_sums_to_one() {
        let mut model = BehaviorModel::new(0.5);
        model.observe(&close_aggressive(), PlayerAction::Dodge);
        model.observe(&far_cautious(), PlayerAction::Move);
        let distribution = model.distribution(&close_aggressive());
        assert!((distribution.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        let prediction = model.predict(&close_aggressive());
        assert!(
            (distribution[prediction.action.id()] - prediction.confidence).abs() < 1e-9
        );
    }

    #[test]
    fn clear_resets_counts() {
        let mut model = BehaviorModel::new(1.0);
        model.observe(&close_aggressive(), PlayerAction::Attack);
        assert_eq!(model.action_count(PlayerAction::Attack), 1);
        assert_eq!(model.feature_count(PlayerAction::Attack, 3, 0), 1);
        model.clear();
        assert_eq!(model.total(), 0);
        assert_eq!(model, BehaviorModel::new(1.0));
    }
}
