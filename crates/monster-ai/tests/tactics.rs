use monster_ai::tactics::{
    Evaluator, MonsterSide, Navigator, PlayerSide, TERMINAL_SCORE, WeightedEvaluator,
};
use monster_ai::{
    AbilityKind, ActionKind, Deadline, Direction, GameStateSnapshot, GridMap, MapOracle,
    MonsterStats, Pathfinder, PathfindingConfig, PlayerAction, Position, TacticalPlanner,
    TacticsConfig,
};

fn config(max_depth: u32) -> TacticsConfig {
    TacticsConfig {
        max_depth,
        time_budget_ms: 10_000,
        ..TacticsConfig::default()
    }
}

fn player(position: Position, health: u32) -> PlayerSide {
    PlayerSide {
        position,
        health,
        max_health: 100,
        attack: 10,
        defense: 5,
        reach: 1,
        last_action: PlayerAction::Idle,
        defending: false,
        dodging: false,
    }
}

fn monster(position: Position, cooldowns: [u32; 3]) -> MonsterSide {
    MonsterSide::from_stats(position, &MonsterStats::default(), cooldowns)
}

/// Plain minimax without pruning, used as the reference value.
fn reference<M: MapOracle + ?Sized>(
    state: &GameStateSnapshot,
    depth: u32,
    monster_turn: bool,
    nav: &mut Navigator<'_, M>,
) -> f64 {
    let evaluator = WeightedEvaluator::default();
    if depth == 0 || state.is_terminal() {
        return evaluator.evaluate(state);
    }
    if monster_turn {
        state
            .monster_actions(nav)
            .into_iter()
            .map(|action| {
                let child = state.after_monster(action, nav);
                reference(&child, depth - 1, false, nav)
            })
            .fold(f64::NEG_INFINITY, f64::max)
    } else {
        state
            .player_actions(nav, None)
            .into_iter()
            .map(|action| {
                let child = state.after_player(action, nav);
                reference(&child, depth - 1, true, nav)
            })
            .fold(f64::INFINITY, f64::min)
    }
}

#[test]
fn finishing_blow_dominates() {
    let map = GridMap::parse(".....").unwrap();
    let mut pathfinder = Pathfinder::new(&PathfindingConfig::default());
    let mut nav = Navigator::new(&mut pathfinder, &map, Deadline::none());

    // Charge is on cooldown, so only a plain attack can win this turn.
    let root = GameStateSnapshot::new(
        monster(Position::new(0, 1), [0, 3, 0]),
        player(Position::new(0, 2), 5),
        &mut nav,
    );
    let decision = TacticalPlanner::new(&config(3)).decide(&root, None, &mut nav);
    assert_eq!(decision.action.kind, ActionKind::Attack);
    assert_eq!(decision.action.utility, TERMINAL_SCORE);
}

#[test]
fn ties_resolve_to_the_safest_action() {
    let map = GridMap::parse(".....").unwrap();
    let mut pathfinder = Pathfinder::new(&PathfindingConfig::default());
    let mut nav = Navigator::new(&mut pathfinder, &map, Deadline::none());
    let root = GameStateSnapshot::new(
        monster(Position::new(0, 1), [0; 3]),
        player(Position::new(0, 2), 100),
        &mut nav,
    );

    let planner = TacticalPlanner::with_evaluator(&config(2), |_: &GameStateSnapshot| 0.0);
    let decision = planner.decide(&root, None, &mut nav);
    assert_eq!(decision.action.kind, ActionKind::Defend);
    assert_eq!(decision.report.completed_depth, 2);
}

#[test]
fn ties_below_a_worse_defend_keep_risk_order() {
    let map = GridMap::parse(".....").unwrap();
    let mut pathfinder = Pathfinder::new(&PathfindingConfig::default());
    let mut nav = Navigator::new(&mut pathfinder, &map, Deadline::none());
    let guarding_is_bad = |state: &GameStateSnapshot| {
        if state.monster.defending { -1.0 } else { 0.0 }
    };

    // Out of reach with only the charge ready: Move and Charge tie above Defend.
    let root = GameStateSnapshot::new(
        monster(Position::new(0, 0), [3, 0, 3]),
        player(Position::new(0, 2), 100),
        &mut nav,
    );
    let planner = TacticalPlanner::with_evaluator(&config(1), guarding_is_bad);
    let decision = planner.decide(&root, None, &mut nav);
    assert_eq!(decision.action.kind, ActionKind::Move(Direction::East));
    assert_eq!(decision.action.utility, 0.0);

    // In reach with retreat also penalized: Charge and Attack tie.
    let root = GameStateSnapshot::new(
        monster(Position::new(0, 1), [3, 0, 3]),
        player(Position::new(0, 2), 100),
        &mut nav,
    );
    let planner = TacticalPlanner::with_evaluator(&config(1), |state: &GameStateSnapshot| {
        if state.monster.defending || state.monster.position != Position::new(0, 1) {
            -1.0
        } else {
            0.0
        }
    });
    let decision = planner.decide(&root, None, &mut nav);
    assert_eq!(
        decision.action.kind,
        ActionKind::UseAbility(AbilityKind::ChargeAttack)
    );
}

#[test]
fn strictly_better_risky_action_beats_safer_ones() {
    let map = GridMap::parse(".....").unwrap();
    let mut pathfinder = Pathfinder::new(&PathfindingConfig::default());
    let mut nav = Navigator::new(&mut pathfinder, &map, Deadline::none());
    let root = GameStateSnapshot::new(
        monster(Position::new(0, 1), [3, 3, 3]),
        player(Position::new(0, 2), 100),
        &mut nav,
    );

    let damage_dealt = |state: &GameStateSnapshot| f64::from(100 - state.player.health);
    let decision =
        TacticalPlanner::with_evaluator(&config(1), damage_dealt).decide(&root, None, &mut nav);
    assert_eq!(decision.action.kind, ActionKind::Attack);
    assert!(decision.action.utility > 0.0);
}

#[test]
fn closes_distance_when_out_of_reach() {
    let map = GridMap::parse("..........").unwrap();
    let mut pathfinder = Pathfinder::new(&PathfindingConfig::default());
    let mut nav = Navigator::new(&mut pathfinder, &map, Deadline::none());
    let root = GameStateSnapshot::new(
        monster(Position::new(0, 0), [0; 3]),
        player(Position::new(0, 5), 100),
        &mut nav,
    );
    assert_eq!(root.path_distance, Some(5));

    let decision = TacticalPlanner::new(&config(1)).decide(&root, None, &mut nav);
    assert_eq!(decision.action.kind, ActionKind::Move(Direction::East));
}

#[test]
fn pruning_preserves_the_minimax_value() {
    let map = GridMap::parse(".......\n..#....\n.......").unwrap();
    let mut pathfinder = Pathfinder::new(&PathfindingConfig::default());
    let mut nav = Navigator::new(&mut pathfinder, &map, Deadline::none());
    let root = GameStateSnapshot::new(
        monster(Position::new(1, 1), [0, 0, 2]),
        player(Position::new(1, 3), 60),
        &mut nav,
    );

    for depth in 1..=4 {
        let decision = TacticalPlanner::new(&config(depth)).decide(
            &root,
            Some(PlayerAction::Attack),
            &mut nav,
        );
        let expected = reference(&root, depth, true, &mut nav);
        assert!(
            (decision.action.utility - expected).abs() < 1e-9,
            "depth {depth}: {} != {expected}",
            decision.action.utility
        );
        assert!(!decision.report.timed_out);
        assert_eq!(decision.report.completed_depth, depth);
    }
}

#[test]
fn heal_is_considered_when_hurt() {
    let map = GridMap::parse("...").unwrap();
    let mut pathfinder = Pathfinder::new(&PathfindingConfig::default());
    let mut nav = Navigator::new(&mut pathfinder, &map, Deadline::none());

    let mut hurt = monster(Position::new(0, 0), [0; 3]);
    hurt.health = 20;
    let root = GameStateSnapshot::new(hurt, player(Position::new(0, 1), 100), &mut nav);

    let actions = root.monster_actions(&mut nav);
    assert!(actions.contains(&ActionKind::UseAbility(AbilityKind::Heal)));
    let healed = root.after_monster(ActionKind::UseAbility(AbilityKind::Heal), &mut nav);
    assert_eq!(healed.monster.health, 45);
    assert_eq!(
        healed.monster.cooldowns[AbilityKind::Heal.index()],
        AbilityKind::Heal.cooldown()
    );
}
