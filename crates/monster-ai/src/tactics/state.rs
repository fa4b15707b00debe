//! Search nodes and the actions that move between them.
use arrayvec::ArrayVec;
use strum::EnumCount;

use super::navigator::Navigator;
use crate::map::{Direction, MapOracle, Position};
use crate::optimization::{AbilityKind, MonsterStats};
use crate::prediction::PlayerAction;

/// Upper bound on legal monster actions in one state.
pub const MAX_MONSTER_ACTIONS: usize = 4 + AbilityKind::COUNT;
/// Upper bound on legal player responses in one state.
pub const MAX_PLAYER_ACTIONS: usize = PlayerAction::COUNT;

pub type MonsterActions = ArrayVec<ActionKind, MAX_MONSTER_ACTIONS>;
pub type PlayerActions = ArrayVec<PlayerAction, MAX_PLAYER_ACTIONS>;

/// What the monster does this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionKind {
    /// One step toward the player.
    Move(Direction),
    Attack,
    UseAbility(AbilityKind),
    /// One step that increases the path distance to the player.
    Retreat(Direction),
    Defend,
}

impl ActionKind {
    /// Rank in the tie-break order; lower is safer and preferred.
    ///
    /// Defend > Retreat > Move > UseAbility > Attack.
    pub const fn risk_rank(&self) -> u8 {
        match self {
            ActionKind::Defend => 0,
            ActionKind::Retreat(_) => 1,
            ActionKind::Move(_) => 2,
            ActionKind::UseAbility(_) => 3,
            ActionKind::Attack => 4,
        }
    }

    pub const fn direction(&self) -> Option<Direction> {
        match self {
            ActionKind::Move(direction) | ActionKind::Retreat(direction) => Some(*direction),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Move(_) => "move",
            ActionKind::Attack => "attack",
            ActionKind::UseAbility(_) => "use_ability",
            ActionKind::Retreat(_) => "retreat",
            ActionKind::Defend => "defend",
        }
    }
}

/// Chosen action with the utility that selected it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TacticalAction {
    pub kind: ActionKind,
    pub utility: f64,
}

impl TacticalAction {
    pub const fn new(kind: ActionKind, utility: f64) -> Self {
        Self { kind, utility }
    }

    pub const fn defend(utility: f64) -> Self {
        Self::new(ActionKind::Defend, utility)
    }
}

/// Monster half of a search node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterSide {
    pub position: Position,
    pub health: u32,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub reach: u32,
    /// Remaining cooldown per ability, indexed by [`AbilityKind::index`].
    pub cooldowns: [u32; AbilityKind::COUNT],
    /// Next incoming hit is halved.
    pub defending: bool,
}

impl MonsterSide {
    pub fn from_stats(
        position: Position,
        stats: &MonsterStats,
        cooldowns: [u32; AbilityKind::COUNT],
    ) -> Self {
        Self {
            position,
            health: stats.current_health(),
            max_health: stats.max_health(),
            attack: stats.loadout.effective_attack(),
            defense: stats.loadout.effective_defense(),
            reach: stats.loadout.attack_range(),
            cooldowns,
            defending: false,
        }
    }

    pub fn ability_ready(&self, ability: AbilityKind) -> bool {
        self.cooldowns[ability.index()] == 0
    }

    pub fn health_fraction(&self) -> f64 {
        fraction(self.health, self.max_health)
    }
}

/// Player half of a search node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSide {
    pub position: Position,
    pub health: u32,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub reach: u32,
    /// Most recent (or predicted) player action.
    pub last_action: PlayerAction,
    pub defending: bool,
    pub dodging: bool,
}

impl PlayerSide {
    pub fn health_fraction(&self) -> f64 {
        fraction(self.health, self.max_health)
    }
}

fn fraction(value: u32, max: u32) -> f64 {
    if max == 0 {
        0.0
    } else {
        f64::from(value) / f64::from(max)
    }
}

/// Damage of one hit after defense; at least 1.
pub fn hit_damage(attack: u32, defense: u32) -> u32 {
    attack.saturating_sub(defense / 2).max(1)
}

/// Share of max health restored by [`AbilityKind::Heal`], in percent.
const HEAL_PERCENT: u32 = 25;

/// Immutable search node. Applying an action yields a new snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameStateSnapshot {
    pub monster: MonsterSide,
    pub player: PlayerSide,
    /// Path length between the two, `None` if unreachable.
    pub path_distance: Option<u32>,
    pub turn: u32,
}

impl GameStateSnapshot {
    pub fn new<M: MapOracle + ?Sized>(
        monster: MonsterSide,
        player: PlayerSide,
        nav: &mut Navigator<'_, M>,
    ) -> Self {
        let path_distance = nav.path_distance(monster.position, player.position);
        Self {
            monster,
            player,
            path_distance,
            turn: 0,
        }
    }

    /// Chebyshev distance between monster and player.
    pub fn grid_distance(&self) -> u32 {
        self.monster.position.chebyshev(self.player.position)
    }

    pub fn monster_in_reach(&self) -> bool {
        self.grid_distance() <= self.monster.reach
    }

    pub fn player_in_reach(&self) -> bool {
        self.grid_distance() <= self.player.reach
    }

    pub fn is_terminal(&self) -> bool {
        self.monster.health == 0 || self.player.health == 0
    }

    /// Legal monster actions ordered by ascending risk.
    pub fn monster_actions<M: MapOracle + ?Sized>(
        &self,
        nav: &mut Navigator<'_, M>,
    ) -> MonsterActions {
        let mut actions = MonsterActions::new();
        let (monster, player) = (self.monster.position, self.player.position);

        actions.push(ActionKind::Defend);
        if let Some(direction) = nav.retreat_step(monster, player) {
            actions.push(ActionKind::Retreat(direction));
        }
        if !self.monster_in_reach()
            && let Some(direction) = nav.step_toward(monster, player)
        {
            actions.push(ActionKind::Move(direction));
        }
        for ability in AbilityKind::ALL {
            if !self.monster.ability_ready(ability) {
                continue;
            }
            let in_range = ability
                .range()
                .is_none_or(|range| self.grid_distance() <= range);
            if in_range {
                actions.push(ActionKind::UseAbility(ability));
            }
        }
        if self.monster_in_reach() {
            actions.push(ActionKind::Attack);
        }
        actions
    }

    /// Legal player responses; `predicted` is ordered first when legal.
    pub fn player_actions<M: MapOracle + ?Sized>(
        &self,
        nav: &mut Navigator<'_, M>,
        predicted: Option<PlayerAction>,
    ) -> PlayerActions {
        let mut actions = PlayerActions::new();
        let (player, monster) = (self.player.position, self.monster.position);

        for action in [
            PlayerAction::Idle,
            PlayerAction::Move,
            PlayerAction::Attack,
            PlayerAction::Defend,
            PlayerAction::Dodge,
            PlayerAction::Retreat,
        ] {
            let legal = match action {
                PlayerAction::Idle | PlayerAction::Defend | PlayerAction::Dodge => true,
                PlayerAction::Attack => self.player_in_reach(),
                PlayerAction::Move => {
                    !self.player_in_reach() && nav.step_toward(player, monster).is_some()
                }
                PlayerAction::Retreat => nav.retreat_step(player, monster).is_some(),
            };
            if legal {
                actions.push(action);
            }
        }

        if let Some(predicted) = predicted
            && let Some(index) = actions.iter().position(|a| *a == predicted)
        {
            actions[..=index].rotate_right(1);
        }
        actions
    }

    /// Node reached after the monster plays `action`.
    pub fn after_monster<M: MapOracle + ?Sized>(
        &self,
        action: ActionKind,
        nav: &mut Navigator<'_, M>,
    ) -> Self {
        let mut next = *self;
        next.turn += 1;
        next.monster.defending = false;
        for cooldown in &mut next.monster.cooldowns {
            *cooldown = cooldown.saturating_sub(1);
        }

        match action {
            ActionKind::Move(direction) | ActionKind::Retreat(direction) => {
                next.monster.position = self.monster.position.step(direction);
                next.path_distance =
                    nav.path_distance(next.monster.position, next.player.position);
            }
            ActionKind::Attack => {
                let damage =
                    next.incoming_to_player(hit_damage(next.monster.attack, next.player.defense));
                next.player.health = next.player.health.saturating_sub(damage);
            }
            ActionKind::UseAbility(ability) => {
                next.monster.cooldowns[ability.index()] = ability.cooldown();
                match ability {
                    AbilityKind::Heal => {
                        let amount = (next.monster.max_health * HEAL_PERCENT).div_ceil(100);
                        next.monster.health =
                            (next.monster.health + amount).min(next.monster.max_health);
                    }
                    AbilityKind::ChargeAttack => {
                        let base = hit_damage(next.monster.attack, next.player.defense);
                        let damage = next.incoming_to_player(base * 2);
                        next.player.health = next.player.health.saturating_sub(damage);
                    }
                    AbilityKind::DefensiveStance => next.monster.defending = true,
                }
            }
            ActionKind::Defend => next.monster.defending = true,
        }

        next.player.defending = false;
        next.player.dodging = false;
        next
    }

    /// Node reached after the player plays `action`.
    pub fn after_player<M: MapOracle + ?Sized>(
        &self,
        action: PlayerAction,
        nav: &mut Navigator<'_, M>,
    ) -> Self {
        let mut next = *self;
        next.turn += 1;
        next.player.last_action = action;
        next.player.defending = false;
        next.player.dodging = false;

        let (player, monster) = (self.player.position, self.monster.position);
        match action {
            PlayerAction::Idle => {}
            PlayerAction::Defend => next.player.defending = true,
            PlayerAction::Dodge => next.player.dodging = true,
            PlayerAction::Attack => {
                let mut damage = hit_damage(next.player.attack, next.monster.defense);
                if next.monster.defending {
                    damage /= 2;
                }
                next.monster.health = next.monster.health.saturating_sub(damage);
            }
            PlayerAction::Move | PlayerAction::Retreat => {
                let step = if action == PlayerAction::Move {
                    nav.step_toward(player, monster)
                } else {
                    nav.retreat_step(player, monster)
                };
                if let Some(direction) = step {
                    next.player.position = player.step(direction);
                    next.path_distance = nav.path_distance(monster, next.player.position);
                }
            }
        }

        next.monster.defending = false;
        next
    }

    /// Damage that reaches the player after their guard.
    fn incoming_to_player(&self, damage: u32) -> u32 {
        if self.player.defending || self.player.dodging {
            damage / 2
        } else {
            damage
        }
    }
}
