//! Scripted opponent and minimal combat resolution.
//!
//! The player follows a fixed stochastic script (approach, trade blows,
//! retreat when hurt) so the brain has a learnable pattern to adapt to.
//! Combat uses the same hit formula the tactical search assumes.
use anyhow::{Context, Result, bail};
use monster_ai::tactics::hit_damage;
use monster_ai::{
    AbilityKind, ActionKind, Direction, EncounterResult, GridMap, Loadout, MapOracle,
    MonsterBrain, MonsterStats, MoveCadence, Pathfinder, PathfindingConfig, PlayerAction,
    PlayerObservation, Position, TickInput,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

/// Heal restores this share of max health, in percent.
const HEAL_PERCENT: u32 = 25;
/// Reach of the charge attack in cells.
const CHARGE_RANGE: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenarioConfig {
    pub ticks: u64,
    pub seed: u64,
    pub player: PlayerProfile,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            ticks: 500,
            seed: 7,
            player: PlayerProfile::default(),
        }
    }
}

/// Combat stats and temperament of the scripted player.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlayerProfile {
    pub attack: u32,
    pub defense: u32,
    pub max_health: u32,
    /// Chance to attack when adjacent.
    pub aggression: f64,
    /// Health fraction below which the player tends to retreat.
    pub retreat_below: f64,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            attack: 10,
            defense: 5,
            max_health: 100,
            aggression: 0.6,
            retreat_below: 0.3,
        }
    }
}

/// Aggregate results of a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub ticks: u64,
    pub encounters: u64,
    pub monster_wins: u64,
    pub player_wins: u64,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub chase_ticks: u64,
    pub tactical_ticks: u64,
    pub fallback_ticks: u64,
    pub prediction_accuracy: Option<f64>,
    pub optimizations_applied: u64,
    pub final_loadout: Loadout,
}

struct ScriptedPlayer {
    profile: PlayerProfile,
    rng: ChaCha8Rng,
    pathfinder: Pathfinder,
    spawn: Position,
    position: Position,
    health: u32,
}

impl ScriptedPlayer {
    fn new(profile: PlayerProfile, seed: u64, spawn: Position) -> Self {
        Self {
            profile,
            rng: ChaCha8Rng::seed_from_u64(seed),
            pathfinder: Pathfinder::new(&PathfindingConfig::default()),
            spawn,
            position: spawn,
            health: profile.max_health,
        }
    }

    fn health_fraction(&self) -> f64 {
        f64::from(self.health) / f64::from(self.profile.max_health.max(1))
    }

    fn respawn(&mut self) {
        self.position = self.spawn;
        self.health = self.profile.max_health;
    }

    /// Picks this tick's action and moves if it is a movement.
    fn act(&mut self, map: &GridMap, monster: Position) -> PlayerAction {
        let hurt = self.health_fraction() < self.profile.retreat_below;
        if hurt && self.rng.gen_bool(0.7) {
            return match self.retreat_step(map, monster) {
                Some(next) => {
                    self.position = next;
                    PlayerAction::Retreat
                }
                None => PlayerAction::Defend,
            };
        }

        if self.position.chebyshev(monster) <= 1 {
            let roll: f64 = self.rng.gen_range(0.0..1.0);
            let aggression = self.profile.aggression;
            return if roll < aggression {
                PlayerAction::Attack
            } else if roll < aggression + 0.15 {
                PlayerAction::Defend
            } else if roll < aggression + 0.3 {
                PlayerAction::Dodge
            } else {
                PlayerAction::Idle
            };
        }

        if self.rng.gen_bool(0.85) {
            let next = self
                .pathfinder
                .find_path(self.position, monster, map)
                .ok()
                .and_then(|path| path.first_step())
                .filter(|next| *next != monster);
            if let Some(next) = next {
                self.position = next;
                return PlayerAction::Move;
            }
        }
        PlayerAction::Idle
    }

    fn retreat_step(&self, map: &GridMap, monster: Position) -> Option<Position> {
        let current = self.position.manhattan(monster);
        Direction::CARDINAL
            .iter()
            .map(|d| self.position.step(*d))
            .filter(|next| map.is_walkable(*next) && *next != monster)
            .filter(|next| next.manhattan(monster) > current)
            .max_by_key(|next| next.manhattan(monster))
    }
}

/// Per-encounter damage tally.
#[derive(Default)]
struct Encounter {
    dealt: u32,
    taken: u32,
}

/// Runs the brain against the scripted player for `config.ticks` ticks.
///
/// Any optimization still running at the end is awaited so the final
/// loadout reflects it.
pub async fn run_scenario(
    brain: &mut MonsterBrain,
    map: &GridMap,
    config: &ScenarioConfig,
) -> Result<SimulationSummary> {
    let (monster_spawn, player_spawn) = spawn_points(map)?;
    let mut player = ScriptedPlayer::new(config.player, config.seed, player_spawn);
    let mut monster = MonsterStats::new(brain.loadout(), brain.monster().max_health());
    let mut monster_position = monster_spawn;
    let mut cadence = MoveCadence::default();
    let mut encounter = Encounter::default();
    let mut summary = SimulationSummary {
        ticks: 0,
        encounters: 0,
        monster_wins: 0,
        player_wins: 0,
        damage_dealt: 0,
        damage_taken: 0,
        chase_ticks: 0,
        tactical_ticks: 0,
        fallback_ticks: 0,
        prediction_accuracy: None,
        optimizations_applied: 0,
        final_loadout: brain.loadout(),
    };

    info!(
        "Scenario start: monster at {}, player at {}, {} ticks",
        monster_spawn, player_spawn, config.ticks
    );

    for tick in 0..config.ticks {
        monster.equip(brain.loadout());
        let allowed_steps = cadence.bank(monster.loadout.effective_speed());

        let before = player.position;
        let action = player.act(map, monster_position);
        if action == PlayerAction::Attack && player.position.chebyshev(monster_position) <= 1 {
            let mut damage = hit_damage(config.player.attack, monster.loadout.effective_defense());
            if brain.is_defending() {
                damage /= 2;
            }
            monster.take_damage(damage);
            encounter.taken += damage;
        }

        let input = TickInput {
            tick,
            player: PlayerObservation {
                tick,
                position: player.position,
                health_fraction: player.health_fraction(),
                speed: f64::from(before.manhattan(player.position)),
                last_action: action,
            },
            monster_position,
            monster_health: monster.current_health(),
        };
        let outcome = brain
            .tick(map, input)
            .with_context(|| format!("brain failed at tick {}", tick))?;

        let guarded = matches!(action, PlayerAction::Defend | PlayerAction::Dodge);
        let distance = monster_position.chebyshev(player.position);
        match outcome.action.kind {
            ActionKind::Move(direction) | ActionKind::Retreat(direction) => {
                let (reached, moved) =
                    walk(map, monster_position, direction, player.position, allowed_steps);
                monster_position = reached;
                cadence.spend(moved);
            }
            ActionKind::Attack if distance <= monster.loadout.attack_range() => {
                let damage = guard(
                    hit_damage(monster.loadout.effective_attack(), config.player.defense),
                    guarded,
                );
                player.health = player.health.saturating_sub(damage);
                encounter.dealt += damage;
            }
            ActionKind::UseAbility(AbilityKind::Heal) => {
                monster.heal((monster.max_health() * HEAL_PERCENT).div_ceil(100));
            }
            ActionKind::UseAbility(AbilityKind::ChargeAttack) if distance <= CHARGE_RANGE => {
                let base = hit_damage(monster.loadout.effective_attack(), config.player.defense);
                let damage = guard(base * 2, guarded);
                player.health = player.health.saturating_sub(damage);
                encounter.dealt += damage;
            }
            _ => {}
        }

        summary.ticks += 1;

        let monster_won = player.health == 0;
        if monster_won || !monster.is_alive() {
            let result = EncounterResult {
                won: monster_won,
                damage_dealt: encounter.dealt,
                damage_taken: encounter.taken,
            };
            brain.end_encounter(result);
            summary.encounters += 1;
            summary.damage_dealt += u64::from(result.damage_dealt);
            summary.damage_taken += u64::from(result.damage_taken);
            if monster_won {
                summary.monster_wins += 1;
            } else {
                summary.player_wins += 1;
            }
            // Both sides start the next encounter fresh.
            player.respawn();
            monster.set_current_health(monster.max_health());
            monster_position = monster_spawn;
            cadence.reset();
            debug!(
                "Encounter {} over at tick {}: monster_won={}",
                summary.encounters, tick, monster_won
            );
            encounter = Encounter::default();
        }
    }

    brain.settle().await;

    let stats = brain.stats();
    summary.chase_ticks = stats.chase_ticks;
    summary.tactical_ticks = stats.tactical_ticks;
    summary.fallback_ticks = stats.fallback_ticks;
    summary.optimizations_applied = stats.optimizations_applied;
    summary.prediction_accuracy = brain.predictor().accuracy();
    summary.final_loadout = brain.loadout();

    info!(
        "Scenario done: {} encounters ({} won by the monster), loadout {}",
        summary.encounters, summary.monster_wins, summary.final_loadout
    );
    Ok(summary)
}

/// Up to `steps` cells along `direction`, stopping before walls and the
/// player. Returns the end cell and the cells moved.
fn walk(
    map: &GridMap,
    from: Position,
    direction: Direction,
    blocked: Position,
    steps: u32,
) -> (Position, u32) {
    let mut position = from;
    let mut moved = 0;
    while moved < steps {
        let next = position.step(direction);
        if !map.is_walkable(next) || next == blocked {
            break;
        }
        position = next;
        moved += 1;
    }
    (position, moved)
}

fn guard(damage: u32, guarded: bool) -> u32 {
    if guarded { damage / 2 } else { damage }
}

/// First and last walkable cells in row-major order.
fn spawn_points(map: &GridMap) -> Result<(Position, Position)> {
    let dims = map.dimensions();
    let walkable: Vec<Position> = (0..dims.height as i32)
        .flat_map(|row| (0..dims.width as i32).map(move |col| Position::new(row, col)))
        .filter(|position| map.is_walkable(*position))
        .collect();

    match (walkable.first(), walkable.last()) {
        (Some(first), Some(last)) if first != last => Ok((*first, *last)),
        _ => bail!("map needs at least two walkable cells"),
    }
}
