//! Iterative-deepening minimax with alpha-beta pruning.
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::eval::{Evaluator, WeightedEvaluator};
use super::navigator::Navigator;
use super::state::{GameStateSnapshot, TacticalAction};
use crate::budget::Deadline;
use crate::config::TacticsConfig;
use crate::map::MapOracle;
use crate::prediction::PlayerAction;

/// Nodes visited between deadline checks.
const DEADLINE_STRIDE: u64 = 8;

/// Statistics of one decision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchReport {
    pub nodes: u64,
    pub prunes: u64,
    /// Deepest fully searched iteration; 0 when none completed.
    pub completed_depth: u32,
    pub timed_out: bool,
    pub elapsed: Duration,
}

/// Chosen action plus how the search went.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decision {
    pub action: TacticalAction,
    pub report: SearchReport,
}

/// Depth-limited adversarial planner for the monster's next action.
#[derive(Clone, Debug)]
pub struct TacticalPlanner<E = WeightedEvaluator> {
    max_depth: u32,
    evaluator: E,
}

impl TacticalPlanner<WeightedEvaluator> {
    pub fn new(config: &TacticsConfig) -> Self {
        Self::with_evaluator(config, WeightedEvaluator::default())
    }
}

impl<E: Evaluator> TacticalPlanner<E> {
    pub fn with_evaluator(config: &TacticsConfig, evaluator: E) -> Self {
        Self {
            max_depth: config.max_depth,
            evaluator,
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Picks the monster's action for `root`.
    ///
    /// Iterations deepen from 1 to the configured depth. When the navigator's
    /// deadline expires mid-iteration the result of the deepest completed
    /// iteration is kept; if none completed the monster defends.
    pub fn decide<M: MapOracle + ?Sized>(
        &self,
        root: &GameStateSnapshot,
        predicted: Option<PlayerAction>,
        nav: &mut Navigator<'_, M>,
    ) -> Decision {
        let started = Instant::now();
        let mut search = Search {
            evaluator: &self.evaluator,
            predicted,
            deadline: nav.deadline(),
            nodes: 0,
            prunes: 0,
            aborted: false,
        };

        let mut best: Option<TacticalAction> = None;
        let mut completed_depth = 0;

        for depth in 1..=self.max_depth {
            if search.deadline.is_expired() {
                search.aborted = true;
                break;
            }
            match search.root(root, depth, nav) {
                Some(action) => {
                    best = Some(action);
                    completed_depth = depth;
                }
                None => break,
            }
        }

        let report = SearchReport {
            nodes: search.nodes,
            prunes: search.prunes,
            completed_depth,
            timed_out: search.aborted,
            elapsed: started.elapsed(),
        };

        if report.timed_out {
            warn!(
                "tactical search hit its deadline at depth {}/{} after {} nodes",
                completed_depth, self.max_depth, report.nodes
            );
        }

        let action = best.unwrap_or_else(|| TacticalAction::defend(self.evaluator.evaluate(root)));
        debug!(
            "tactics chose {:?} (utility {:.1}, depth {}, {} nodes, {} prunes)",
            action.kind, action.utility, completed_depth, report.nodes, report.prunes
        );

        Decision { action, report }
    }
}

struct Search<'e, E> {
    evaluator: &'e E,
    predicted: Option<PlayerAction>,
    deadline: Deadline,
    nodes: u64,
    prunes: u64,
    aborted: bool,
}

impl<E: Evaluator> Search<'_, E> {
    /// Full-width root search. `None` when the deadline interrupted it.
    ///
    /// Actions arrive in ascending risk order and only a strictly better value
    /// replaces the incumbent, so ties keep the safer action.
    fn root<M: MapOracle + ?Sized>(
        &mut self,
        state: &GameStateSnapshot,
        depth: u32,
        nav: &mut Navigator<'_, M>,
    ) -> Option<TacticalAction> {
        let mut alpha = f64::NEG_INFINITY;
        let mut best: Option<TacticalAction> = None;

        for action in state.monster_actions(nav) {
            let child = state.after_monster(action, nav);
            let value = self.minimax(&child, depth - 1, alpha, f64::INFINITY, false, nav);
            if self.aborted {
                return None;
            }
            if best.is_none_or(|b| value > b.utility) {
                best = Some(TacticalAction::new(action, value));
                alpha = alpha.max(value);
            }
        }

        Some(best.unwrap_or_else(|| TacticalAction::defend(self.evaluator.evaluate(state))))
    }

    fn minimax<M: MapOracle + ?Sized>(
        &mut self,
        state: &GameStateSnapshot,
        depth: u32,
        mut alpha: f64,
        mut beta: f64,
        monster_turn: bool,
        nav: &mut Navigator<'_, M>,
    ) -> f64 {
        self.nodes += 1;
        if self.nodes % DEADLINE_STRIDE == 0 && self.deadline.is_expired() {
            self.aborted = true;
        }
        if self.aborted {
            return 0.0;
        }

        if depth == 0 || state.is_terminal() {
            return self.evaluator.evaluate(state);
        }

        if monster_turn {
            let mut value = f64::NEG_INFINITY;
            for action in state.monster_actions(nav) {
                let child = state.after_monster(action, nav);
                value = value.max(self.minimax(&child, depth - 1, alpha, beta, false, nav));
                alpha = alpha.max(value);
                if alpha >= beta {
                    self.prunes += 1;
                    break;
                }
            }
            value
        } else {
            let mut value = f64::INFINITY;
            for action in state.player_actions(nav, self.predicted) {
                let child = state.after_player(action, nav);
                value = value.min(self.minimax(&child, depth - 1, alpha, beta, true, nav));
                beta = beta.min(value);
                if alpha >= beta {
                    self.prunes += 1;
                    break;
                }
            }
            value
        }
    }
}
