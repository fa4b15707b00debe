//! Common error infrastructure for monster-ai.
//!
//! Domain-specific errors (e.g. [`PathError`], [`PredictionError`]) live in
//! this module so the brain can wrap them in one [`BrainError`]. Every error
//! type implements [`AiError`], which classifies failures by how a caller is
//! expected to recover.
//!
//! # Taxonomy
//!
//! - **Invalid input**: out-of-bounds or blocked path endpoints, malformed
//!   feature vectors. Surfaced immediately, never substituted.
//! - **No solution**: not an error. An empty [`crate::Path`] or a default
//!   `Defend` action is returned instead.
//! - **Budget exceeded**: not an error. Searches report a timed-out status and
//!   hand back their best-so-far result.
//! - **Configuration**: rejected before any AI component runs.
//! - **Import**: corrupted learned state is rejected as a whole.

use crate::map::Position;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid input, should not retry without changes.
    ///
    /// Examples: start cell outside the map, feature id out of range
    Validation,

    /// Startup or import failure; the component cannot run with this data.
    ///
    /// Examples: cooling rate of 1.0, negative counts in a saved model
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if the caller may continue running after this error.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation)
    }
}

/// Common trait for all monster-ai errors.
pub trait AiError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str;
}

/// Invalid pathfinding queries.
///
/// An unreachable or blocked *goal* is not an error: the pathfinder answers
/// it with an empty path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("{role} {position} lies outside the map")]
    OutOfBounds {
        role: Endpoint,
        position: Position,
    },

    #[error("start {position} is not walkable")]
    BlockedStart { position: Position },
}

/// Which end of a path query an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Endpoint {
    Start,
    Goal,
}

impl AiError for PathError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfBounds { .. } => "PATH_OUT_OF_BOUNDS",
            Self::BlockedStart { .. } => "PATH_BLOCKED_START",
        }
    }
}

/// Malformed input to the behavior predictor.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("feature vector has {actual} values, expected {expected}")]
    Arity { expected: usize, actual: usize },

    #[error("feature `{feature}` has value id {value}, but only {cardinality} values exist")]
    ValueOutOfRange {
        feature: &'static str,
        value: usize,
        cardinality: usize,
    },

    #[error("player health fraction {0} is outside [0, 1]")]
    HealthFraction(f64),

    #[error("player speed {0} is not a finite non-negative number")]
    Speed(f64),
}

impl AiError for PredictionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Arity { .. } => "PREDICT_ARITY",
            Self::ValueOutOfRange { .. } => "PREDICT_VALUE_RANGE",
            Self::HealthFraction(_) => "PREDICT_HEALTH_FRACTION",
            Self::Speed(_) => "PREDICT_SPEED",
        }
    }
}

/// Invalid tunables, detected before any component is built.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("smoothing constant must be > 0 (got {0})")]
    Smoothing(f64),

    #[error("initial temperature must be > 0 (got {0})")]
    InitialTemperature(f64),

    #[error("minimum temperature must be > 0 and below the initial temperature (got {min}, initial {initial})")]
    MinTemperature { min: f64, initial: f64 },

    #[error("cooling rate must lie strictly between 0 and 1 (got {0})")]
    CoolingRate(f64),

    #[error("minimax depth must be >= 1 (got {0})")]
    Depth(u32),

    #[error("per-decision time budget must be > 0 ms")]
    TimeBudget,

    #[error("{heuristic} heuristic overestimates diagonal moves; use euclidean or chebyshev")]
    InadmissibleHeuristic { heuristic: crate::config::Heuristic },

    #[error("{field} must be > 0")]
    Zero { field: &'static str },
}

impl AiError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Smoothing(_) => "CONFIG_SMOOTHING",
            Self::InitialTemperature(_) => "CONFIG_INITIAL_TEMPERATURE",
            Self::MinTemperature { .. } => "CONFIG_MIN_TEMPERATURE",
            Self::CoolingRate(_) => "CONFIG_COOLING_RATE",
            Self::Depth(_) => "CONFIG_DEPTH",
            Self::TimeBudget => "CONFIG_TIME_BUDGET",
            Self::InadmissibleHeuristic { .. } => "CONFIG_HEURISTIC",
            Self::Zero { .. } => "CONFIG_ZERO",
        }
    }
}

/// Corrupted or incompatible learned state.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ImportError {
    #[error("unsupported learned-state format version {found} (expected {expected})")]
    FormatVersion { found: u32, expected: u32 },

    #[error("negative count {value} at `{path}`")]
    NegativeCount { path: String, value: i64 },

    #[error("unknown {kind} label `{label}`")]
    UnknownLabel { kind: &'static str, label: String },

    #[error("counts at `{path}` overflow a signed 64-bit total")]
    CountOverflow { path: String },

    #[error("total observations {recorded} disagree with per-action sum {summed}")]
    TotalMismatch { recorded: i64, summed: i64 },

    #[error("feature `{feature}` counts for action `{action}` sum to {summed}, expected {expected}")]
    FeatureTotalMismatch {
        action: String,
        feature: String,
        summed: i64,
        expected: i64,
    },

    #[error("current health {current} exceeds max health {max}")]
    HealthOutOfRange { current: u32, max: u32 },

    #[error("loadout field `{field}` = {value} is outside {min}..={max}")]
    LoadoutOutOfBounds {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

impl AiError for ImportError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::FormatVersion { .. } => "IMPORT_FORMAT_VERSION",
            Self::NegativeCount { .. } => "IMPORT_NEGATIVE_COUNT",
            Self::UnknownLabel { .. } => "IMPORT_UNKNOWN_LABEL",
            Self::CountOverflow { .. } => "IMPORT_COUNT_OVERFLOW",
            Self::TotalMismatch { .. } => "IMPORT_TOTAL_MISMATCH",
            Self::FeatureTotalMismatch { .. } => "IMPORT_FEATURE_TOTAL_MISMATCH",
            Self::HealthOutOfRange { .. } => "IMPORT_HEALTH_RANGE",
            Self::LoadoutOutOfBounds { .. } => "IMPORT_LOADOUT_BOUNDS",
        }
    }
}

/// Unified error surfaced by [`crate::MonsterBrain`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BrainError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("monster position {position} lies outside the map")]
    MonsterOutOfBounds { position: Position },
}

impl AiError for BrainError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Path(e) => e.severity(),
            Self::Prediction(e) => e.severity(),
            Self::Config(e) => e.severity(),
            Self::Import(e) => e.severity(),
            Self::MonsterOutOfBounds { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Path(e) => e.error_code(),
            Self::Prediction(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Import(e) => e.error_code(),
            Self::MonsterOutOfBounds { .. } => "BRAIN_MONSTER_OUT_OF_BOUNDS",
        }
    }
}
