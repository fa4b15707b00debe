//! Learned state exchanged with the persistence collaborator.
//!
//! [`LearnedState`] is a plain record of string-keyed counters and scalar
//! fields. Nothing here touches files; storage belongs to the caller.
use std::collections::BTreeMap;

use strum::IntoEnumIterator;

use crate::error::ImportError;
use crate::optimization::{ArmorKind, Loadout, WeaponKind};
use crate::prediction::{
    ACTION_COUNT, BehaviorModel, Category, FEATURE_COUNT, FEATURE_NAMES, MAX_FEATURE_VALUES,
    PlayerAction, feature_index, value_labels,
};

/// Current [`LearnedState::version`].
pub const LEARNED_STATE_VERSION: u32 = 1;

/// `feature -> value -> count` for one action.
pub type FeatureCounts = BTreeMap<String, BTreeMap<String, i64>>;

/// Best loadout, with equipment stored by label.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadoutRecord {
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub weapon: String,
    pub armor: String,
}

impl From<&Loadout> for LoadoutRecord {
    fn from(loadout: &Loadout) -> Self {
        Self {
            attack: loadout.attack,
            defense: loadout.defense,
            speed: loadout.speed,
            weapon: loadout.weapon.to_string(),
            armor: loadout.armor.to_string(),
        }
    }
}

impl TryFrom<&LoadoutRecord> for Loadout {
    type Error = ImportError;

    fn try_from(record: &LoadoutRecord) -> Result<Self, Self::Error> {
        let weapon = record
            .weapon
            .parse::<WeaponKind>()
            .map_err(|_| ImportError::UnknownLabel {
                kind: "weapon",
                label: record.weapon.clone(),
            })?;
        let armor = record
            .armor
            .parse::<ArmorKind>()
            .map_err(|_| ImportError::UnknownLabel {
                kind: "armor",
                label: record.armor.clone(),
            })?;
        let loadout = Loadout::new(record.attack, record.defense, record.speed, weapon, armor);
        loadout.validate()?;
        Ok(loadout)
    }
}

/// Serializable snapshot of everything the brain has learned.
///
/// Counts are signed so that corrupted negative values survive parsing and
/// are rejected by [`LearnedState::validate`] instead of failing opaquely.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LearnedState {
    pub version: u32,
    pub total_observations: i64,
    /// `action -> count`.
    pub action_counts: BTreeMap<String, i64>,
    /// `action -> feature -> value -> count`.
    pub feature_counts: BTreeMap<String, FeatureCounts>,
    pub loadout: LoadoutRecord,
}

/// Dense counts recovered from a validated [`LearnedState`].
#[derive(Clone, Debug, PartialEq)]
pub struct RestoredModel {
    pub action_counts: [u64; ACTION_COUNT],
    pub feature_counts: [[[u64; MAX_FEATURE_VALUES]; FEATURE_COUNT]; ACTION_COUNT],
    pub loadout: Loadout,
}

impl LearnedState {
    /// Captures the model counts and the loadout.
    pub fn capture(model: &BehaviorModel, loadout: &Loadout) -> Self {
        let mut action_counts = BTreeMap::new();
        let mut feature_counts = BTreeMap::new();

        for action in PlayerAction::iter() {
            let count = model.action_count(action);
            action_counts.insert(action.to_string(), count as i64);
            if count == 0 {
                continue;
            }

            let mut features = FeatureCounts::new();
            for (feature, name) in FEATURE_NAMES.iter().enumerate() {
                let labels = value_labels(feature).unwrap_or_default();
                let values = labels
                    .iter()
                    .enumerate()
                    .map(|(value, label)| {
                        let n = model.feature_count(action, feature, value);
                        (label.to_string(), n as i64)
                    })
                    .filter(|(_, n)| *n > 0)
                    .collect();
                features.insert(name.to_string(), values);
            }
            feature_counts.insert(action.to_string(), features);
        }

        Self {
            version: LEARNED_STATE_VERSION,
            total_observations: model.total() as i64,
            action_counts,
            feature_counts,
            loadout: LoadoutRecord::from(loadout),
        }
    }

    /// Checks the record and converts it to dense counts.
    ///
    /// # Errors
    ///
    /// Rejects unknown versions or labels, negative counts, totals that do not
    /// add up, and out-of-bounds loadouts.
    pub fn validate(&self) -> Result<RestoredModel, ImportError> {
        if self.version != LEARNED_STATE_VERSION {
            return Err(ImportError::FormatVersion {
                found: self.version,
                expected: LEARNED_STATE_VERSION,
            });
        }
        check_count("total_observations".to_string(), self.total_observations)?;

        let mut action_counts = [0u64; ACTION_COUNT];
        for (label, count) in &self.action_counts {
            let action = parse_action(label)?;
            action_counts[action.id()] = check_count(format!("action_counts.{label}"), *count)?;
        }

        let summed = checked_sum("action_counts", &action_counts)?;
        if summed != self.total_observations {
            return Err(ImportError::TotalMismatch {
                recorded: self.total_observations,
                summed,
            });
        }

        let mut feature_counts = [[[0u64; MAX_FEATURE_VALUES]; FEATURE_COUNT]; ACTION_COUNT];
        for (action_label, features) in &self.feature_counts {
            let action = parse_action(action_label)?;
            for (feature_name, values) in features {
                let feature = feature_index(feature_name).ok_or_else(|| ImportError::UnknownLabel {
                    kind: "feature",
                    label: feature_name.clone(),
                })?;
                let labels = value_labels(feature).unwrap_or_default();
                for (value_label, count) in values {
                    let value = labels
                        .iter()
                        .position(|l| l == value_label)
                        .ok_or_else(|| ImportError::UnknownLabel {
                            kind: "feature value",
                            label: format!("{feature_name}.{value_label}"),
                        })?;
                    let path =
                        format!("feature_counts.{action_label}.{feature_name}.{value_label}");
                    feature_counts[action.id()][feature][value] = check_count(path, *count)?;
                }
            }
        }

        // Every observation bumps exactly one value of every feature.
        for action in PlayerAction::iter() {
            // Bounded by the checked action sum above.
            let expected = action_counts[action.id()] as i64;
            for (feature, name) in FEATURE_NAMES.iter().enumerate() {
                let path = format!("feature_counts.{action}.{name}");
                let summed = checked_sum(&path, &feature_counts[action.id()][feature])?;
                if summed != expected {
                    return Err(ImportError::FeatureTotalMismatch {
                        action: action.to_string(),
                        feature: name.to_string(),
                        summed,
                        expected,
                    });
                }
            }
        }

        let loadout = Loadout::try_from(&self.loadout)?;

        Ok(RestoredModel {
            action_counts,
            feature_counts,
            loadout,
        })
    }
}

fn parse_action(label: &str) -> Result<PlayerAction, ImportError> {
    label
        .parse::<PlayerAction>()
        .map_err(|_| ImportError::UnknownLabel {
            kind: "action",
            label: label.to_string(),
        })
}

fn check_count(path: String, value: i64) -> Result<u64, ImportError> {
    u64::try_from(value).map_err(|_| ImportError::NegativeCount { path, value })
}

/// Sum that must stay within `i64`, the range of the persisted totals.
fn checked_sum(path: &str, counts: &[u64]) -> Result<i64, ImportError> {
    counts
        .iter()
        .try_fold(0i64, |acc, n| i64::try_from(*n).ok()?.checked_add(acc))
        .ok_or_else(|| ImportError::CountOverflow {
            path: path.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::FeatureVector;

    fn trained() -> BehaviorModel {
        let mut model = BehaviorModel::new(1.0);
        let close = FeatureVector::from_ids(&[0, 2, 1, 0, 3]).unwrap();
        let far = FeatureVector::from_ids(&[2, 1, 0, 2, 0]).unwrap();
        for _ in 0..3 {
            model.observe(&close, PlayerAction::Attack);
        }
        model.observe(&far, PlayerAction::Retreat);
        model
    }

    #[test]
    fn capture_then_validate_restores_counts() {
        let model = trained();
        let state = LearnedState::capture(&model, &Loadout::default());
        assert_eq!(state.action_counts["attack"], 3);
        assert_eq!(state.feature_counts["attack"]["distance"]["close"], 3);

        let restored = state.validate().unwrap();
        let mut copy = BehaviorModel::new(1.0);
        copy.restore(restored.action_counts, restored.feature_counts);
        assert_eq!(copy, model);
        assert_eq!(restored.loadout, Loadout::default());
    }

    #[test]
    fn negative_counts_are_rejected() {
        let mut state = LearnedState::capture(&trained(), &Loadout::default());
        state
            .feature_counts
            .get_mut("attack")
            .unwrap()
            .get_mut("quadrant")
            .unwrap()
            .insert("top_left".to_string(), -2);
        assert_eq!(
            state.validate(),
            Err(ImportError::NegativeCount {
                path: "feature_counts.attack.quadrant.top_left".to_string(),
                value: -2
            })
        );
    }

    #[test]
    fn inconsistent_totals_are_rejected() {
        let mut state = LearnedState::capture(&trained(), &Loadout::default());
        state.total_observations = 9;
        assert_eq!(
            state.validate(),
            Err(ImportError::TotalMismatch {
                recorded: 9,
                summed: 4
            })
        );

        let mut state = LearnedState::capture(&trained(), &Loadout::default());
        state.action_counts.insert("attack".to_string(), 4);
        state.action_counts.insert("retreat".to_string(), 0);
        assert!(matches!(
            state.validate(),
            Err(ImportError::FeatureTotalMismatch { .. })
        ));
    }

    #[test]
    fn unknown_labels_are_rejected() {
        let mut state = LearnedState::capture(&trained(), &Loadout::default());
        state.action_counts.insert("fireball".to_string(), 0);
        assert_eq!(
            state.validate(),
            Err(ImportError::UnknownLabel {
                kind: "action",
                label: "fireball".to_string()
            })
        );

        let mut state = LearnedState::capture(&trained(), &Loadout::default());
        state.loadout.weapon = "trident".to_string();
        assert!(matches!(
            state.validate(),
            Err(ImportError::UnknownLabel { kind: "weapon", .. })
        ));
    }

    #[test]
    fn overflowing_counts_are_rejected() {
        let mut state = LearnedState::capture(&BehaviorModel::new(1.0), &Loadout::default());
        for label in ["idle", "move", "attack"] {
            state.action_counts.insert(label.to_string(), i64::MAX);
        }
        state.total_observations = 5;
        assert_eq!(
            state.validate(),
            Err(ImportError::CountOverflow {
                path: "action_counts".to_string()
            })
        );
    }

    #[test]
    fn overflowing_feature_counts_are_rejected() {
        let mut state = LearnedState::capture(&trained(), &Loadout::default());
        let quadrants = state
            .feature_counts
            .get_mut("attack")
            .unwrap()
            .get_mut("quadrant")
            .unwrap();
        quadrants.insert("top_left".to_string(), i64::MAX);
        quadrants.insert("top_right".to_string(), i64::MAX);
        assert_eq!(
            state.validate(),
            Err(ImportError::CountOverflow {
                path: "feature_counts.attack.quadrant".to_string()
            })
        );
    }

    #[test]
    fn out_of_bounds_loadout_is_rejected() {
        let mut state = LearnedState::capture(&BehaviorModel::new(1.0), &Loadout::default());
        state.loadout.speed = 0;
        assert_eq!(
            state.validate(),
            Err(ImportError::LoadoutOutOfBounds {
                field: "speed",
                value: 0,
                min: 1,
                max: 10
            })
        );
    }
}
