//! Per-monster decision loop.
//!
//! [`MonsterBrain`] owns one instance of every component and runs them in a
//! fixed order each tick: swap in finished optimizations, refresh vitals,
//! learn from the player, then either chase with the pathfinder or hand the
//! engagement to the tactical planner. Encounter boundaries feed the stat
//! optimizer, whose result lands whole at a later tick boundary.
use std::time::{Duration, Instant};

use strum::EnumCount;
use tracing::{debug, info, warn};

use crate::budget::Deadline;
use crate::config::AiConfig;
use crate::error::{BrainError, ConfigError, Endpoint, PathError};
use crate::map::{Direction, MapOracle, Position};
use crate::optimization::{
    AbilityKind, EncounterObjective, Loadout, MonsterStats, OptimizationReport, OutcomeHistory,
    OutcomeRecord, StatOptimizer,
};
use crate::pathfinding::{Pathfinder, PathfinderStats};
use crate::persistence::LearnedState;
use crate::prediction::{BehaviorPredictor, FeatureVector, PlayerObservation, Prediction};
use crate::tactics::{
    ActionKind, GameStateSnapshot, MonsterSide, Navigator, PlayerSide, SearchReport,
    TacticalAction, TacticalPlanner,
};
use crate::workers::{JobStatus, OptimizationJob, OptimizerWorker, PendingOptimization};

/// Everything the brain is told at the start of a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickInput {
    pub tick: u64,
    pub player: PlayerObservation,
    /// Authoritative monster position after combat resolution.
    pub monster_position: Position,
    /// Authoritative monster health; clamped to the stat block's maximum.
    pub monster_health: u32,
}

/// Which branch of the tick produced the action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecisionMode {
    /// First step of the path toward a distant player.
    Chase,
    /// Minimax decision inside the engagement range.
    Tactical,
    /// No usable path: direct movement or Defend.
    Fallback,
}

/// Result of one [`MonsterBrain::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickOutcome {
    pub tick: u64,
    pub action: TacticalAction,
    pub mode: DecisionMode,
    /// Prediction of the player's next action.
    pub prediction: Prediction,
    pub features: FeatureVector,
    /// Monster position once the action is applied.
    pub monster_position: Position,
    /// Present when the tactical planner ran.
    pub search: Option<SearchReport>,
    /// Optimization swapped in at the start of this tick.
    pub optimization: Option<OptimizationReport>,
    pub elapsed: Duration,
}

/// Encounter result reported by the combat collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterResult {
    /// True when the monster defeated the player.
    pub won: bool,
    pub damage_dealt: u32,
    pub damage_taken: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BrainStats {
    pub ticks: u64,
    pub chase_ticks: u64,
    pub tactical_ticks: u64,
    pub fallback_ticks: u64,
    /// Tactical searches cut short by their deadline.
    pub search_timeouts: u64,
    pub tick_overruns: u64,
    pub encounters: u64,
    pub optimizations_scheduled: u64,
    pub optimizations_applied: u64,
    pub optimizations_lost: u64,
}

/// Decision stack of a single monster.
///
/// The brain exclusively owns its predictor, path cache and stats; run one
/// per monster.
#[derive(Debug)]
pub struct MonsterBrain {
    config: AiConfig,
    pathfinder: Pathfinder,
    predictor: BehaviorPredictor,
    planner: TacticalPlanner,
    optimizer: StatOptimizer,
    worker: OptimizerWorker,
    pending: Option<PendingOptimization>,
    monster: MonsterStats,
    position: Option<Position>,
    cooldowns: [u32; AbilityKind::COUNT],
    defending: bool,
    outcomes: OutcomeHistory,
    encounter_started: Option<u64>,
    last_tick: Option<u64>,
    last_optimization_tick: u64,
    stats: BrainStats,
}

impl MonsterBrain {
    /// Builds a brain with default monster stats.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] reported by [`AiConfig::validate`].
    pub fn new(config: AiConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let optimizer = StatOptimizer::new(&config.optimization);
        let worker = OptimizerWorker::new(
            optimizer.annealer().clone(),
            config.optimization.background,
        );

        Ok(Self {
            pathfinder: Pathfinder::new(&config.pathfinding),
            predictor: BehaviorPredictor::new(&config.prediction),
            planner: TacticalPlanner::new(&config.tactics),
            outcomes: OutcomeHistory::new(config.optimization.outcome_history),
            optimizer,
            worker,
            pending: None,
            monster: MonsterStats::default(),
            position: None,
            cooldowns: [0; AbilityKind::COUNT],
            defending: false,
            encounter_started: None,
            last_tick: None,
            last_optimization_tick: 0,
            stats: BrainStats::default(),
            config,
        })
    }

    pub fn with_monster(mut self, monster: MonsterStats) -> Self {
        self.monster = monster;
        self
    }

    /// Runs one decision.
    ///
    /// # Errors
    ///
    /// Fails when the monster or player lies outside the map, the monster
    /// stands on an unwalkable cell, or the player observation carries an
    /// invalid health fraction or speed. No state is changed in that case.
    pub fn tick<M: MapOracle + ?Sized>(
        &mut self,
        map: &M,
        input: TickInput,
    ) -> Result<TickOutcome, BrainError> {
        let started = Instant::now();
        let deadline = Deadline::after(Duration::from_millis(
            self.config.orchestrator.tick_budget_ms,
        ));

        let monster_position = input.monster_position;
        let player_position = input.player.position;
        if !map.contains(monster_position) {
            return Err(BrainError::MonsterOutOfBounds {
                position: monster_position,
            });
        }
        if !map.contains(player_position) {
            return Err(PathError::OutOfBounds {
                role: Endpoint::Goal,
                position: player_position,
            }
            .into());
        }
        if !map.is_walkable(monster_position) {
            return Err(PathError::BlockedStart {
                position: monster_position,
            }
            .into());
        }
        input.player.validate()?;

        let optimization = self.apply_finished_optimization();

        self.position = Some(monster_position);
        self.monster.set_current_health(input.monster_health);
        self.defending = false;
        if self.last_tick.is_some_and(|last| input.tick > last) {
            for cooldown in &mut self.cooldowns {
                *cooldown = cooldown.saturating_sub(1);
            }
        }
        self.last_tick = Some(input.tick);
        self.encounter_started.get_or_insert(input.tick);

        let step = self
            .predictor
            .step(input.player, monster_position, map.dimensions());

        let chase = self
            .pathfinder
            .search(monster_position, player_position, map, deadline)?;
        let distance = (chase.is_complete() && !chase.path.is_empty())
            .then(|| chase.path.steps() as u32);

        let engagement_range = self.config.orchestrator.engagement_range;
        let (action, mode, search) = match distance {
            Some(d) if d <= engagement_range => {
                let budget = Duration::from_millis(self.config.tactics.time_budget_ms);
                let root = self.snapshot(monster_position, &input.player, map, deadline);
                let mut nav =
                    Navigator::new(&mut self.pathfinder, map, deadline.min_budget(budget));
                let decision = self
                    .planner
                    .decide(&root, Some(step.prediction.action), &mut nav);
                (decision.action, DecisionMode::Tactical, Some(decision.report))
            }
            Some(_) => match chase.path.first_direction() {
                Some(direction) => (
                    TacticalAction::new(ActionKind::Move(direction), 0.0),
                    DecisionMode::Chase,
                    None,
                ),
                None => (
                    self.fallback(map, monster_position, player_position),
                    DecisionMode::Fallback,
                    None,
                ),
            },
            None => {
                debug!(
                    "no path from {} to player at {}, falling back",
                    monster_position, player_position
                );
                (
                    self.fallback(map, monster_position, player_position),
                    DecisionMode::Fallback,
                    None,
                )
            }
        };

        self.apply(action.kind, monster_position);
        self.record(mode, search);

        if let Some(interval) = self.config.optimization.interval_ticks
            && input.tick.saturating_sub(self.last_optimization_tick) >= interval
            && self.pending.is_none()
        {
            self.schedule_optimization(input.tick, "interval");
        }

        let elapsed = started.elapsed();
        if deadline.is_expired() {
            self.stats.tick_overruns += 1;
            warn!(
                "tick {} exceeded its {}ms budget ({:?})",
                input.tick, self.config.orchestrator.tick_budget_ms, elapsed
            );
        }

        debug!(
            "tick {}: {} {:?} via {} (player predicted {} at {:.2})",
            input.tick,
            action.kind.label(),
            action.kind,
            mode,
            step.prediction.action,
            step.prediction.confidence
        );

        Ok(TickOutcome {
            tick: input.tick,
            action,
            mode,
            prediction: step.prediction,
            features: step.features,
            monster_position: self.position.unwrap_or(monster_position),
            search,
            optimization,
            elapsed,
        })
    }

    /// Closes the current encounter and schedules an optimization run.
    ///
    /// A run still in flight is superseded by the new one.
    pub fn end_encounter(&mut self, result: EncounterResult) {
        let last = self.last_tick.unwrap_or(0);
        let survival_ticks = self
            .encounter_started
            .map_or(0, |start| last.saturating_sub(start) + 1);

        self.outcomes.push(OutcomeRecord {
            loadout: self.monster.loadout,
            won: result.won,
            survival_ticks,
            damage_dealt: result.damage_dealt,
            damage_taken: result.damage_taken,
        });
        self.stats.encounters += 1;
        info!(
            "encounter {} ended: won={} dealt={} taken={} survived={} ticks",
            self.stats.encounters,
            result.won,
            result.damage_dealt,
            result.damage_taken,
            survival_ticks
        );

        self.encounter_started = None;
        self.cooldowns = [0; AbilityKind::COUNT];
        self.defending = false;
        self.schedule_optimization(last, "encounter end");
    }

    /// Waits for the in-flight optimization, if any, and applies it.
    pub async fn settle(&mut self) -> Option<OptimizationReport> {
        let pending = self.pending.take()?;
        match pending.wait().await {
            Some(report) => {
                self.equip(&report);
                Some(report)
            }
            None => {
                self.stats.optimizations_lost += 1;
                warn!("optimization lost before it could be applied");
                None
            }
        }
    }

    /// Snapshot of the learned model and the current loadout.
    pub fn export_state(&self) -> LearnedState {
        LearnedState::capture(self.predictor.model(), &self.monster.loadout)
    }

    /// Replaces the learned model and loadout.
    ///
    /// Any optimization in flight is discarded since it started from the old
    /// loadout.
    ///
    /// # Errors
    ///
    /// Returns [`BrainError::Import`] and leaves the brain untouched when the
    /// record is inconsistent.
    pub fn import_state(&mut self, state: &LearnedState) -> Result<(), BrainError> {
        let restored = state.validate()?;
        self.predictor
            .model_mut()
            .restore(restored.action_counts, restored.feature_counts);
        self.monster.equip(restored.loadout);
        if self.pending.take().is_some() {
            debug!("pending optimization discarded by import");
        }
        info!(
            "imported learned state: {} observations, loadout {}",
            self.predictor.model().total(),
            restored.loadout
        );
        Ok(())
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn stats(&self) -> BrainStats {
        self.stats
    }

    pub fn monster(&self) -> &MonsterStats {
        &self.monster
    }

    pub fn loadout(&self) -> Loadout {
        self.monster.loadout
    }

    /// Last known monster position, after the last applied action.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn cooldowns(&self) -> [u32; AbilityKind::COUNT] {
        self.cooldowns
    }

    pub fn is_defending(&self) -> bool {
        self.defending
    }

    pub fn predictor(&self) -> &BehaviorPredictor {
        &self.predictor
    }

    pub fn pathfinder_stats(&self) -> PathfinderStats {
        self.pathfinder.stats()
    }

    pub fn outcomes(&self) -> &OutcomeHistory {
        &self.outcomes
    }

    pub fn has_pending_optimization(&self) -> bool {
        self.pending.is_some()
    }

    fn snapshot<M: MapOracle + ?Sized>(
        &mut self,
        monster_position: Position,
        player: &PlayerObservation,
        map: &M,
        deadline: Deadline,
    ) -> GameStateSnapshot {
        let tactics = &self.config.tactics;
        let health = (player.health_fraction.clamp(0.0, 1.0) * f64::from(tactics.player_max_health))
            .round() as u32;
        let player_side = PlayerSide {
            position: player.position,
            health,
            max_health: tactics.player_max_health,
            attack: tactics.player_attack,
            defense: tactics.player_defense,
            reach: tactics.player_reach,
            last_action: player.last_action,
            defending: false,
            dodging: false,
        };
        let monster_side = MonsterSide::from_stats(monster_position, &self.monster, self.cooldowns);
        let mut nav = Navigator::new(&mut self.pathfinder, map, deadline);
        GameStateSnapshot::new(monster_side, player_side, &mut nav)
    }

    /// Direct step toward the player, or Defend when boxed in.
    fn fallback<M: MapOracle + ?Sized>(
        &mut self,
        map: &M,
        from: Position,
        target: Position,
    ) -> TacticalAction {
        let (dr, dc) = ((target.row - from.row).signum(), (target.col - from.col).signum());
        let mut candidates = Vec::with_capacity(3);
        if self.pathfinder.allows_diagonal() && dr != 0 && dc != 0 {
            candidates.push((dr, dc));
        }
        if (target.row - from.row).abs() >= (target.col - from.col).abs() {
            candidates.extend([(dr, 0), (0, dc)]);
        } else {
            candidates.extend([(0, dc), (dr, 0)]);
        }

        let nav = Navigator::new(&mut self.pathfinder, map, Deadline::none());
        let step = candidates
            .into_iter()
            .filter(|delta| *delta != (0, 0))
            .filter_map(|(r, c)| {
                Direction::between(from, Position::new(from.row + r, from.col + c))
            })
            .find(|direction| from.step(*direction) != target && nav.can_step(from, *direction));

        match step {
            Some(direction) => TacticalAction::new(ActionKind::Move(direction), 0.0),
            None => {
                warn!("monster at {} cannot approach {}, defending", from, target);
                TacticalAction::defend(0.0)
            }
        }
    }

    fn apply(&mut self, action: ActionKind, from: Position) {
        match action {
            ActionKind::Move(direction) | ActionKind::Retreat(direction) => {
                self.position = Some(from.step(direction));
            }
            ActionKind::UseAbility(ability) => {
                self.cooldowns[ability.index()] = ability.cooldown();
                if ability == AbilityKind::DefensiveStance {
                    self.defending = true;
                }
            }
            ActionKind::Defend => self.defending = true,
            ActionKind::Attack => {}
        }
    }

    fn record(&mut self, mode: DecisionMode, search: Option<SearchReport>) {
        self.stats.ticks += 1;
        match mode {
            DecisionMode::Chase => self.stats.chase_ticks += 1,
            DecisionMode::Tactical => self.stats.tactical_ticks += 1,
            DecisionMode::Fallback => self.stats.fallback_ticks += 1,
        }
        if search.is_some_and(|report| report.timed_out) {
            self.stats.search_timeouts += 1;
        }
    }

    fn apply_finished_optimization(&mut self) -> Option<OptimizationReport> {
        let status = self.pending.as_mut()?.poll();
        match status {
            JobStatus::Running => None,
            JobStatus::Ready(report) => {
                self.pending = None;
                self.equip(&report);
                Some(report)
            }
            JobStatus::Lost => {
                self.pending = None;
                self.stats.optimizations_lost += 1;
                None
            }
        }
    }

    fn equip(&mut self, report: &OptimizationReport) {
        self.monster.equip(report.best);
        self.stats.optimizations_applied += 1;
        info!(
            "loadout updated to {} (energy {:.2} -> {:.2}, {} iterations, {:.0}% accepted)",
            report.best,
            report.initial_energy,
            report.best_energy,
            report.iterations,
            report.acceptance_rate() * 100.0
        );
    }

    fn schedule_optimization(&mut self, tick: u64, reason: &str) {
        let job = OptimizationJob {
            current: self.monster.loadout,
            objective: EncounterObjective::new(self.predictor.playstyle_profile(), &self.outcomes),
            seed: self.optimizer.seed_for(&self.outcomes),
        };
        if self.pending.is_some() {
            debug!("superseding in-flight optimization");
        }
        debug!("optimization scheduled at tick {} ({})", tick, reason);
        self.pending = Some(self.worker.submit(job));
        self.last_optimization_tick = tick;
        self.stats.optimizations_scheduled += 1;
    }
}
