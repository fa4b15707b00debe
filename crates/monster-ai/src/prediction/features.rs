//! Discretized player features and the action labels they predict.
//!
//! Every feature is a small categorical enum so the behavior model can index
//! dense count tables by `(action id, feature id, value id)`.
use strum::{EnumCount, VariantNames};

use crate::error::PredictionError;

/// Categorical feature with dense integer ids.
pub trait Category: Copy + EnumCount + VariantNames {
    /// Feature name used in errors and persisted state.
    const FEATURE: &'static str;

    fn id(self) -> usize;

    fn from_id(id: usize) -> Option<Self>;

    /// Like [`Category::from_id`], but reports out-of-range ids.
    fn checked(id: usize) -> Result<Self, PredictionError> {
        Self::from_id(id).ok_or(PredictionError::ValueOutOfRange {
            feature: Self::FEATURE,
            value: id,
            cardinality: Self::COUNT,
        })
    }
}

macro_rules! categorical {
    (
        $(#[$meta:meta])* $name:ident => $feature:literal {
            $($(#[$variant_meta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            Debug,
            PartialEq,
            Eq,
            Hash,
            strum::Display,
            strum::EnumString,
            strum::AsRefStr,
            strum::EnumCount,
            strum::EnumIter,
            strum::FromRepr,
            strum::VariantNames,
        )]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
        #[strum(serialize_all = "snake_case")]
        pub enum $name {
            $($(#[$variant_meta])* $variant),+
        }

        impl Category for $name {
            const FEATURE: &'static str = $feature;

            fn id(self) -> usize {
                self as usize
            }

            fn from_id(id: usize) -> Option<Self> {
                Self::from_repr(id)
            }
        }
    };
}

categorical! {
    /// How far the player moved since the previous observation.
    MovementClass => "movement" { Stationary, Slow, Fast }
}

categorical! {
    /// Player health bucket.
    HealthClass => "health" { Low, Medium, High }
}

categorical! {
    /// Attack-versus-defense tendency over the recent observation window.
    CombatStyle => "combat_style" { Cautious, Balanced, Aggressive }
}

categorical! {
    /// Player distance to the monster.
    DistanceClass => "distance" { Close, Medium, Far }
}

categorical! {
    /// Map quadrant the player stands in.
    Quadrant => "quadrant" { TopLeft, TopRight, BottomLeft, BottomRight }
}

categorical! {
    /// Action labels the predictor learns. `Idle` is the default prediction.
    #[derive(Default)]
    PlayerAction => "action" {
        #[default]
        Idle,
        Move,
        Attack,
        Defend,
        Dodge,
        Retreat,
    }
}

impl PlayerAction {
    /// Actions the player uses to avoid damage.
    pub const fn is_defensive(self) -> bool {
        matches!(
            self,
            PlayerAction::Defend | PlayerAction::Dodge | PlayerAction::Retreat
        )
    }
}

/// Number of action labels.
pub const ACTION_COUNT: usize = PlayerAction::COUNT;

/// Number of features in a [`FeatureVector`].
pub const FEATURE_COUNT: usize = 5;

/// Feature names in vector order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    MovementClass::FEATURE,
    HealthClass::FEATURE,
    CombatStyle::FEATURE,
    DistanceClass::FEATURE,
    Quadrant::FEATURE,
];

/// Number of values per feature, in vector order.
pub const FEATURE_CARDINALITIES: [usize; FEATURE_COUNT] = [
    MovementClass::COUNT,
    HealthClass::COUNT,
    CombatStyle::COUNT,
    DistanceClass::COUNT,
    Quadrant::COUNT,
];

/// Widest feature; sizes the dense count tables.
pub const MAX_FEATURE_VALUES: usize = 4;

/// Value labels of the feature at `feature` (vector order).
pub fn value_labels(feature: usize) -> Option<&'static [&'static str]> {
    let labels = match feature {
        0 => MovementClass::VARIANTS,
        1 => HealthClass::VARIANTS,
        2 => CombatStyle::VARIANTS,
        3 => DistanceClass::VARIANTS,
        4 => Quadrant::VARIANTS,
        _ => return None,
    };
    Some(labels)
}

/// Vector index of the feature called `name`.
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|candidate| *candidate == name)
}

/// Discretized snapshot of the player, the predictor's input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureVector {
    pub movement: MovementClass,
    pub health: HealthClass,
    pub combat_style: CombatStyle,
    pub distance: DistanceClass,
    pub quadrant: Quadrant,
}

impl FeatureVector {
    pub const fn new(
        movement: MovementClass,
        health: HealthClass,
        combat_style: CombatStyle,
        distance: DistanceClass,
        quadrant: Quadrant,
    ) -> Self {
        Self {
            movement,
            health,
            combat_style,
            distance,
            quadrant,
        }
    }

    /// Dense value ids in vector order.
    pub fn ids(&self) -> [usize; FEATURE_COUNT] {
        [
            self.movement.id(),
            self.health.id(),
            self.combat_style.id(),
            self.distance.id(),
            self.quadrant.id(),
        ]
    }

    /// Builds a vector from raw value ids.
    ///
    /// # Errors
    ///
    /// [`PredictionError::Arity`] when `ids` does not hold exactly one value per
    /// feature, [`PredictionError::ValueOutOfRange`] when an id exceeds its
    /// feature's cardinality.
    pub fn from_ids(ids: &[usize]) -> Result<Self, PredictionError> {
        let [movement, health, combat_style, distance, quadrant] = ids else {
            return Err(PredictionError::Arity {
                expected: FEATURE_COUNT,
                actual: ids.len(),
            });
        };
        Ok(Self {
            movement: MovementClass::checked(*movement)?,
            health: HealthClass::checked(*health)?,
            combat_style: CombatStyle::checked(*combat_style)?,
            distance: DistanceClass::checked(*distance)?,
            quadrant: Quadrant::checked(*quadrant)?,
        })
    }
}
