//! Tunable parameters of the decision stack.
//!
//! Defaults mirror the original game tuning (manhattan A*, smoothing 1.0,
//! T0 = 100 with 0.95 cooling, depth-3 minimax). [`AiConfig::validate`] rejects
//! out-of-range values with a descriptive [`ConfigError`]; nothing is clamped.
use crate::error::ConfigError;

/// Distance estimate guiding A*.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Heuristic {
    #[default]
    Manhattan,
    Euclidean,
    Chebyshev,
}

impl Heuristic {
    /// Whether the heuristic never overestimates under the movement model.
    ///
    /// Diagonal steps cost `sqrt(2)`, so Manhattan overestimates them.
    pub const fn is_admissible(self, allow_diagonal: bool) -> bool {
        match self {
            Heuristic::Manhattan => !allow_diagonal,
            Heuristic::Euclidean | Heuristic::Chebyshev => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct PathfindingConfig {
    pub heuristic: Heuristic,
    pub allow_diagonal: bool,
    /// Maximum number of cached paths before LRU eviction.
    pub cache_capacity: usize,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::Manhattan,
            allow_diagonal: false,
            cache_capacity: 1000,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct PredictionConfig {
    /// Laplace smoothing constant added to every count.
    pub smoothing: f64,
    /// Number of player observations kept in the sliding window.
    pub observation_window: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            smoothing: 1.0,
            observation_window: 256,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct OptimizationConfig {
    pub initial_temperature: f64,
    pub cooling_rate: f64,
    pub min_temperature: f64,
    pub max_iterations: u32,
    /// Base seed; each run derives its own seed from this and the run index.
    pub seed: u64,
    /// Optimize every N ticks in addition to explicit encounter boundaries.
    pub interval_ticks: Option<u64>,
    /// Run on a blocking tokio task when a runtime is available.
    pub background: bool,
    /// Number of encounter outcomes remembered for the objective.
    pub outcome_history: usize,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            cooling_rate: 0.95,
            min_temperature: 0.1,
            max_iterations: 1000,
            seed: 0x5EED,
            interval_ticks: None,
            background: true,
            outcome_history: 64,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct TacticsConfig {
    /// Plies searched; monster and player half-moves alternate.
    pub max_depth: u32,
    /// Per-decision search budget in milliseconds.
    pub time_budget_ms: u64,
    /// Player combat stats assumed by the search; observations only carry a
    /// health fraction.
    pub player_attack: u32,
    pub player_defense: u32,
    pub player_reach: u32,
    pub player_max_health: u32,
}

impl Default for TacticsConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            time_budget_ms: 10,
            player_attack: 10,
            player_defense: 5,
            player_reach: 1,
            player_max_health: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct OrchestratorConfig {
    /// Path distance within which the tactical planner takes over from chasing.
    pub engagement_range: u32,
    /// Whole-tick budget in milliseconds.
    pub tick_budget_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            engagement_range: 6,
            tick_budget_ms: 16,
        }
    }
}

/// Complete configuration of one monster brain.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct AiConfig {
    pub pathfinding: PathfindingConfig,
    pub prediction: PredictionConfig,
    pub optimization: OptimizationConfig,
    pub tactics: TacticsConfig,
    pub orchestrator: OrchestratorConfig,
}

impl AiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_heuristic(mut self, heuristic: Heuristic, allow_diagonal: bool) -> Self {
        self.pathfinding.heuristic = heuristic;
        self.pathfinding.allow_diagonal = allow_diagonal;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.tactics.max_depth = max_depth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.optimization.seed = seed;
        self
    }

    /// Checks every tunable, returning the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let path = &self.pathfinding;
        if !path.heuristic.is_admissible(path.allow_diagonal) {
            return Err(ConfigError::InadmissibleHeuristic {
                heuristic: path.heuristic,
            });
        }
        if path.cache_capacity == 0 {
            return Err(ConfigError::Zero {
                field: "pathfinding.cache_capacity",
            });
        }

        let prediction = &self.prediction;
        // NaN fails every comparison, so test for the valid range.
        if !(prediction.smoothing > 0.0 && prediction.smoothing.is_finite()) {
            return Err(ConfigError::Smoothing(prediction.smoothing));
        }
        if prediction.observation_window == 0 {
            return Err(ConfigError::Zero {
                field: "prediction.observation_window",
            });
        }

        let opt = &self.optimization;
        if !(opt.initial_temperature > 0.0 && opt.initial_temperature.is_finite()) {
            return Err(ConfigError::InitialTemperature(opt.initial_temperature));
        }
        if !(opt.cooling_rate > 0.0 && opt.cooling_rate < 1.0) {
            return Err(ConfigError::CoolingRate(opt.cooling_rate));
        }
        if !(opt.min_temperature > 0.0 && opt.min_temperature < opt.initial_temperature) {
            return Err(ConfigError::MinTemperature {
                min: opt.min_temperature,
                initial: opt.initial_temperature,
            });
        }
        if opt.max_iterations == 0 {
            return Err(ConfigError::Zero {
                field: "optimization.max_iterations",
            });
        }
        if opt.outcome_history == 0 {
            return Err(ConfigError::Zero {
                field: "optimization.outcome_history",
            });
        }
        if opt.interval_ticks == Some(0) {
            return Err(ConfigError::Zero {
                field: "optimization.interval_ticks",
            });
        }

        if self.tactics.max_depth == 0 {
            return Err(ConfigError::Depth(self.tactics.max_depth));
        }
        if self.tactics.time_budget_ms == 0 || self.orchestrator.tick_budget_ms == 0 {
            return Err(ConfigError::TimeBudget);
        }
        if self.tactics.player_max_health == 0 {
            return Err(ConfigError::Zero {
                field: "tactics.player_max_health",
            });
        }
        if self.orchestrator.engagement_range == 0 {
            return Err(ConfigError::Zero {
                field: "orchestrator.engagement_range",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(AiConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_cooling_rate_at_or_above_one() {
        let mut config = AiConfig::default();
        config.optimization.cooling_rate = 1.0;
        assert_eq!(config.validate(), Err(ConfigError::CoolingRate(1.0)));
        config.optimization.cooling_rate = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::CoolingRate(0.0)));
    }

    #[test]
    fn rejects_zero_depth_and_budget() {
        let config = AiConfig::default().with_max_depth(0);
        assert_eq!(config.validate(), Err(ConfigError::Depth(0)));

        let mut config = AiConfig::default();
        config.tactics.time_budget_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::TimeBudget));
    }

    #[test]
    fn rejects_non_positive_smoothing_and_temperature() {
        let mut config = AiConfig::default();
        config.prediction.smoothing = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::Smoothing(0.0)));

        let mut config = AiConfig::default();
        config.optimization.initial_temperature = -1.0;
        assert_eq!(config.validate(), Err(ConfigError::InitialTemperature(-1.0)));
    }

    #[test]
    fn manhattan_is_rejected_with_diagonals() {
        let config = AiConfig::default().with_heuristic(Heuristic::Manhattan, true);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InadmissibleHeuristic {
                heuristic: Heuristic::Manhattan
            })
        );
        let config = AiConfig::default().with_heuristic(Heuristic::Chebyshev, true);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn heuristic_parses_from_lowercase() {
        assert_eq!("euclidean".parse::<Heuristic>().unwrap(), Heuristic::Euclidean);
        assert_eq!(Heuristic::Chebyshev.to_string(), "chebyshev");
    }
}
