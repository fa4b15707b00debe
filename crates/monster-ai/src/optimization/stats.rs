//! Monster stats, equipment and abilities.
use std::fmt;

use strum::EnumCount;

use crate::error::ImportError;

/// Equipped weapon.
///
/// Weapons trade raw damage against reach and speed:
/// - Claws: no bonus, quick
/// - Axe: heavy hits, slow
/// - Spear and Bow: extended reach
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumCount,
    strum::EnumIter,
    strum::FromRepr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum WeaponKind {
    #[default]
    Claws,
    Sword,
    Axe,
    Spear,
    Bow,
}

impl WeaponKind {
    pub const fn damage_bonus(self) -> u32 {
        match self {
            WeaponKind::Claws => 0,
            WeaponKind::Sword => 4,
            WeaponKind::Axe => 7,
            WeaponKind::Spear => 3,
            WeaponKind::Bow => 2,
        }
    }

    /// Attack range in cells (Chebyshev distance).
    pub const fn reach(self) -> u32 {
        match self {
            WeaponKind::Claws | WeaponKind::Sword | WeaponKind::Axe => 1,
            WeaponKind::Spear => 2,
            WeaponKind::Bow => 4,
        }
    }

    pub const fn speed_modifier(self) -> i32 {
        match self {
            WeaponKind::Claws => 1,
            WeaponKind::Sword | WeaponKind::Spear | WeaponKind::Bow => 0,
            WeaponKind::Axe => -1,
        }
    }
}

/// Equipped armor.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumCount,
    strum::EnumIter,
    strum::FromRepr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ArmorKind {
    #[default]
    Unarmored,
    Leather,
    Chain,
    Plate,
}

impl ArmorKind {
    pub const fn defense_bonus(self) -> u32 {
        match self {
            ArmorKind::Unarmored => 0,
            ArmorKind::Leather => 2,
            ArmorKind::Chain => 5,
            ArmorKind::Plate => 9,
        }
    }

    pub const fn speed_penalty(self) -> i32 {
        match self {
            ArmorKind::Unarmored | ArmorKind::Leather => 0,
            ArmorKind::Chain => 1,
            ArmorKind::Plate => 2,
        }
    }
}

/// Special actions available to the monster.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumCount,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum AbilityKind {
    /// Restores a share of max health.
    Heal,
    /// Double-damage lunge at range 2.
    ChargeAttack,
    /// Halves incoming damage until the next monster turn.
    DefensiveStance,
}

impl AbilityKind {
    pub const ALL: [AbilityKind; AbilityKind::COUNT] = [
        AbilityKind::Heal,
        AbilityKind::ChargeAttack,
        AbilityKind::DefensiveStance,
    ];

    /// Ticks before the ability can be used again.
    pub const fn cooldown(self) -> u32 {
        match self {
            AbilityKind::Heal => 5,
            AbilityKind::ChargeAttack => 3,
            AbilityKind::DefensiveStance => 4,
        }
    }

    /// Maximum Chebyshev distance to the player at which the ability applies.
    pub const fn range(self) -> Option<u32> {
        match self {
            AbilityKind::ChargeAttack => Some(2),
            AbilityKind::Heal | AbilityKind::DefensiveStance => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Inclusive bounds of one optimizable stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatBounds {
    pub min: u32,
    pub max: u32,
}

impl StatBounds {
    pub const fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: i64) -> u32 {
        value.clamp(i64::from(self.min), i64::from(self.max)) as u32
    }
}

/// Optimizable subset of [`MonsterStats`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loadout {
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub weapon: WeaponKind,
    pub armor: ArmorKind,
}

impl Loadout {
    pub const ATTACK: StatBounds = StatBounds { min: 5, max: 40 };
    pub const DEFENSE: StatBounds = StatBounds { min: 3, max: 25 };
    pub const SPEED: StatBounds = StatBounds { min: 1, max: 10 };

    pub const fn new(
        attack: u32,
        defense: u32,
        speed: u32,
        weapon: WeaponKind,
        armor: ArmorKind,
    ) -> Self {
        Self {
            attack,
            defense,
            speed,
            weapon,
            armor,
        }
    }

    /// Attack including the weapon bonus.
    pub const fn effective_attack(&self) -> u32 {
        self.attack + self.weapon.damage_bonus()
    }

    /// Defense including the armor bonus.
    pub const fn effective_defense(&self) -> u32 {
        self.defense + self.armor.defense_bonus()
    }

    /// Speed after equipment modifiers, never below 1.
    pub fn effective_speed(&self) -> u32 {
        let speed =
            self.speed as i32 + self.weapon.speed_modifier() - self.armor.speed_penalty();
        speed.max(1) as u32
    }

    pub const fn attack_range(&self) -> u32 {
        self.weapon.reach()
    }

    /// Checks every stat against its bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::LoadoutOutOfBounds`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), ImportError> {
        let fields = [
            ("attack", self.attack, Self::ATTACK),
            ("defense", self.defense, Self::DEFENSE),
            ("speed", self.speed, Self::SPEED),
        ];
        for (field, value, bounds) in fields {
            if !bounds.contains(value) {
                return Err(ImportError::LoadoutOutOfBounds {
                    field,
                    value,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }
        Ok(())
    }
}

impl Default for Loadout {
    fn default() -> Self {
        Self::new(15, 8, 4, WeaponKind::Claws, ArmorKind::Unarmored)
    }
}

impl fmt::Display for Loadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "atk {} def {} spd {} ({}, {})",
            self.attack, self.defense, self.speed, self.weapon, self.armor
        )
    }
}

/// Movement points one cell of travel costs. The default loadout moves once
/// per tick.
pub const STEP_COST: u32 = 4;

/// Turns [`Loadout::effective_speed`] into cells moved per tick.
///
/// Each tick banks the speed as movement points, capped at two steps' worth.
/// Slow monsters skip ticks; fast ones may take a second step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveCadence {
    points: u32,
}

impl MoveCadence {
    pub const MAX_STEPS: u32 = 2;

    /// Banks one tick of `speed` and returns the cells that may be moved now.
    pub fn bank(&mut self, speed: u32) -> u32 {
        self.points = self
            .points
            .saturating_add(speed)
            .min(Self::MAX_STEPS * STEP_COST);
        self.points / STEP_COST
    }

    /// Pays for `steps` cells actually moved.
    pub fn spend(&mut self, steps: u32) {
        self.points = self.points.saturating_sub(steps * STEP_COST);
    }

    pub fn reset(&mut self) {
        self.points = 0;
    }
}

/// Full monster stat block.
///
/// `current_health` is kept within `[0, max_health]` by every mutator, and
/// deserialization rejects records that break it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawMonsterStats"))]
pub struct MonsterStats {
    pub loadout: Loadout,
    max_health: u32,
    current_health: u32,
}

impl MonsterStats {
    pub fn new(loadout: Loadout, max_health: u32) -> Self {
        Self {
            loadout,
            max_health,
            current_health: max_health,
        }
    }

    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    pub const fn current_health(&self) -> u32 {
        self.current_health
    }

    pub fn set_current_health(&mut self, health: u32) {
        self.current_health = health.min(self.max_health);
    }

    pub fn health_fraction(&self) -> f64 {
        if self.max_health == 0 {
            0.0
        } else {
            f64::from(self.current_health) / f64::from(self.max_health)
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current_health = self.current_health.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.set_current_health(self.current_health.saturating_add(amount));
    }

    /// Swaps in a new loadout, keeping health unchanged.
    pub fn equip(&mut self, loadout: Loadout) {
        self.loadout = loadout;
    }
}

/// Unchecked wire form of [`MonsterStats`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawMonsterStats {
    loadout: Loadout,
    max_health: u32,
    current_health: u32,
}

#[cfg(feature = "serde")]
impl TryFrom<RawMonsterStats> for MonsterStats {
    type Error = ImportError;

    fn try_from(raw: RawMonsterStats) -> Result<Self, Self::Error> {
        raw.loadout.validate()?;
        if raw.current_health > raw.max_health {
            return Err(ImportError::HealthOutOfRange {
                current: raw.current_health,
                max: raw.max_health,
            });
        }
        Ok(Self {
            loadout: raw.loadout,
            max_health: raw.max_health,
            current_health: raw.current_health,
        })
    }
}

impl Default for MonsterStats {
    fn default() -> Self {
        Self::new(Loadout::default(), 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_is_clamped() {
        let mut stats = MonsterStats::default();
        stats.set_current_health(500);
        assert_eq!(stats.current_health(), 100);
        stats.take_damage(130);
        assert_eq!(stats.current_health(), 0);
        assert!(!stats.is_alive());
        stats.heal(40);
        assert_eq!(stats.current_health(), 40);
        assert_eq!(stats.health_fraction(), 0.4);
    }

    #[test]
    fn equipment_modifies_effective_stats() {
        let loadout = Loadout::new(10, 5, 2, WeaponKind::Axe, ArmorKind::Plate);
        assert_eq!(loadout.effective_attack(), 17);
        assert_eq!(loadout.effective_defense(), 14);
        assert_eq!(loadout.effective_speed(), 1);
        assert_eq!(Loadout::new(10, 5, 2, WeaponKind::Bow, ArmorKind::Leather).attack_range(), 4);
    }

    #[test]
    fn cadence_follows_effective_speed() {
        let mut slow = MoveCadence::default();
        let moves: Vec<u32> = (0..4)
            .map(|_| {
                let steps = slow.bank(2);
                slow.spend(steps);
                steps
            })
            .collect();
        assert_eq!(moves, [0, 1, 0, 1]);

        let mut fast = MoveCadence::default();
        assert_eq!(fast.bank(8), 2);
        fast.spend(1);
        // Unused points stay banked but never exceed two steps.
        assert_eq!(fast.bank(8), 2);

        let mut stalled = MoveCadence::default();
        for _ in 0..5 {
            stalled.bank(4);
        }
        assert_eq!(stalled.bank(4), MoveCadence::MAX_STEPS);
        stalled.reset();
        assert_eq!(stalled.bank(1), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialization_enforces_health_invariant() {
        let mut stats = MonsterStats::default();
        stats.take_damage(30);
        let json = serde_json::to_string(&stats).unwrap();
        let back: MonsterStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);

        let overhealed = json.replace("\"current_health\":70", "\"current_health\":250");
        let err = serde_json::from_str::<MonsterStats>(&overhealed).unwrap_err();
        assert!(err.to_string().contains("250"), "{err}");

        let weak = json.replace("\"attack\":15", "\"attack\":1");
        assert!(serde_json::from_str::<MonsterStats>(&weak).is_err());
    }

    #[test]
    fn validate_reports_first_out_of_bounds_field() {
        assert_eq!(Loadout::default().validate(), Ok(()));
        let loadout = Loadout {
            defense: 30,
            ..Loadout::default()
        };
        assert_eq!(
            loadout.validate(),
            Err(ImportError::LoadoutOutOfBounds {
                field: "defense",
                value: 30,
                min: 3,
                max: 25
            })
        );
    }
}
