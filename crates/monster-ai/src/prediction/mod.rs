//! Online player-behavior prediction.
//!
//! [`BehaviorPredictor`] wraps the Naive Bayes [`BehaviorModel`] with the
//! observation window, feature extraction, accuracy scoring and the playstyle
//! profile consumed by the stat optimizer.
mod features;
mod model;
mod observation;

use std::collections::VecDeque;

pub use features::{
    ACTION_COUNT, Category, CombatStyle, DistanceClass, FEATURE_CARDINALITIES, FEATURE_COUNT,
    FEATURE_NAMES, FeatureVector, HealthClass, MAX_FEATURE_VALUES, MovementClass, PlayerAction,
    Quadrant, feature_index, value_labels,
};
pub use model::{BehaviorModel, Prediction};
pub use observation::{FeatureExtractor, FeatureThresholds, ObservationWindow, PlayerObservation};

use strum::IntoEnumIterator;

use crate::config::PredictionConfig;
use crate::map::{MapDimensions, Position};

/// Number of scored predictions kept for the accuracy estimate.
const ACCURACY_WINDOW: usize = 1000;

/// Aggregate tendencies of the player, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaystyleProfile {
    /// Share of attacks.
    pub aggression: f64,
    /// Share of moves.
    pub mobility: f64,
    /// Share of defends and dodges.
    pub defensiveness: f64,
    /// One minus the normalized entropy of the action distribution.
    pub predictability: f64,
}

/// Rolling record of how often predictions matched the next real action.
#[derive(Clone, Debug, Default)]
struct AccuracyTracker {
    outcomes: VecDeque<(bool, f64)>,
}

impl AccuracyTracker {
    fn record(&mut self, correct: bool, confidence: f64) {
        if self.outcomes.len() == ACCURACY_WINDOW {
            self.outcomes.pop_front();
        }
        self.outcomes.push_back((correct, confidence));
    }

    fn accuracy(&self) -> Option<f64> {
        (!self.outcomes.is_empty()).then(|| {
            let hits = self.outcomes.iter().filter(|(correct, _)| *correct).count();
            hits as f64 / self.outcomes.len() as f64
        })
    }

    fn mean_confidence(&self) -> Option<f64> {
        (!self.outcomes.is_empty()).then(|| {
            self.outcomes.iter().map(|(_, c)| c).sum::<f64>() / self.outcomes.len() as f64
        })
    }
}

/// Prediction awaiting the player's next reported action.
#[derive(Clone, Copy, Debug)]
struct Pending {
    features: FeatureVector,
    prediction: Prediction,
}

/// Result of [`BehaviorPredictor::step`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepPrediction {
    pub features: FeatureVector,
    pub prediction: Prediction,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PredictorStats {
    pub observations: u64,
    pub scored_predictions: usize,
    pub accuracy: Option<f64>,
    pub mean_confidence: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct BehaviorPredictor {
    model: BehaviorModel,
    window: ObservationWindow,
    extractor: FeatureExtractor,
    accuracy: AccuracyTracker,
    pending: Option<Pending>,
}

impl BehaviorPredictor {
    pub fn new(config: &PredictionConfig) -> Self {
        Self {
            model: BehaviorModel::new(config.smoothing),
            window: ObservationWindow::new(config.observation_window),
            extractor: FeatureExtractor::default(),
            accuracy: AccuracyTracker::default(),
            pending: None,
        }
    }

    pub fn with_extractor(mut self, extractor: FeatureExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn model(&self) -> &BehaviorModel {
        &self.model
    }

    pub(crate) fn model_mut(&mut self) -> &mut BehaviorModel {
        &mut self.model
    }

    pub fn window(&self) -> &ObservationWindow {
        &self.window
    }

    /// Trains the model on one labelled feature vector.
    pub fn observe(&mut self, features: &FeatureVector, action: PlayerAction) {
        self.model.observe(features, action);
    }

    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        self.model.predict(features)
    }

    /// One tick of the learning loop.
    ///
    /// The features captured on the previous step are labelled with the
    /// action the player now reports, the previous prediction is scored, and a
    /// fresh prediction is made from the new observation.
    pub fn step(
        &mut self,
        observation: PlayerObservation,
        monster: Position,
        dimensions: MapDimensions,
    ) -> StepPrediction {
        if let Some(pending) = self.pending.take() {
            self.model.observe(&pending.features, observation.last_action);
            let correct = pending.prediction.action == observation.last_action;
            self.accuracy.record(correct, pending.prediction.confidence);
        }

        self.window.push(observation);
        let features = self
            .extractor
            .extract(&observation, &self.window, monster, dimensions);
        let prediction = self.model.predict(&features);
        self.pending = Some(Pending {
            features,
            prediction,
        });

        StepPrediction {
            features,
            prediction,
        }
    }

    /// Share of scored predictions that matched, if any were scored.
    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy.accuracy()
    }

    pub fn stats(&self) -> PredictorStats {
        PredictorStats {
            observations: self.model.total(),
            scored_predictions: self.accuracy.outcomes.len(),
            accuracy: self.accuracy.accuracy(),
            mean_confidence: self.accuracy.mean_confidence(),
        }
    }

    /// Playstyle derived from the learned action counts.
    pub fn playstyle_profile(&self) -> PlaystyleProfile {
        let total = self.model.total();
        if total == 0 {
            return PlaystyleProfile::default();
        }
        let total = total as f64;
        let share = |action: PlayerAction| self.model.action_count(action) as f64 / total;

        let seen: Vec<f64> = PlayerAction::iter()
            .map(share)
            .filter(|p| *p > 0.0)
            .collect();
        let predictability = if seen.len() <= 1 {
            1.0
        } else {
            let entropy: f64 = seen.iter().map(|p| -p * p.log2()).sum();
            1.0 - entropy / (seen.len() as f64).log2()
        };

        PlaystyleProfile {
            aggression: share(PlayerAction::Attack),
            mobility: share(PlayerAction::Move),
            defensiveness: share(PlayerAction::Defend) + share(PlayerAction::Dodge),
            predictability: predictability.clamp(0.0, 1.0),
        }
    }

    /// Forgets all learned counts, observations and scores.
    pub fn clear(&mut self) {
        self.model.clear();
        self.window.clear();
        self.accuracy = AccuracyTracker::default();
        self.pending = None;
    }
}
