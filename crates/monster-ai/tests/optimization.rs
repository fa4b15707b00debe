use monster_ai::optimization::{Annealer, EncounterObjective, Objective, neighbor};
use monster_ai::prediction::PlaystyleProfile;
use monster_ai::{
    ArmorKind, Loadout, OptimizationConfig, OutcomeHistory, OutcomeRecord, StatOptimizer,
    WeaponKind,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn aggressive() -> PlaystyleProfile {
    PlaystyleProfile {
        aggression: 0.7,
        mobility: 0.2,
        defensiveness: 0.1,
        predictability: 0.6,
    }
}

fn history() -> OutcomeHistory {
    let mut history = OutcomeHistory::new(8);
    history.push(OutcomeRecord {
        loadout: Loadout::new(20, 12, 4, WeaponKind::Sword, ArmorKind::Chain),
        won: true,
        survival_ticks: 120,
        damage_dealt: 100,
        damage_taken: 40,
    });
    history.push(OutcomeRecord {
        loadout: Loadout::default(),
        won: false,
        survival_ticks: 30,
        damage_dealt: 15,
        damage_taken: 100,
    });
    history
}

#[test]
fn identical_inputs_give_identical_reports() {
    let optimizer = StatOptimizer::new(&OptimizationConfig::default());
    let history = history();

    let first = optimizer.optimize(Loadout::default(), &history, aggressive());
    let second = optimizer.optimize(Loadout::default(), &history, aggressive());
    assert_eq!(first, second);
}

#[test]
fn best_never_exceeds_initial_energy() {
    let annealer = Annealer::new(&OptimizationConfig::default());
    let objective = EncounterObjective::new(aggressive(), &history());

    for seed in 0..16 {
        let report = annealer.run(Loadout::default(), &objective, seed);
        assert!(report.best_energy <= report.initial_energy);
        assert!(report.best.validate().is_ok());
        assert!((objective.energy(&report.best) - report.best_energy).abs() < 1e-9);
        assert_eq!(report.accepted + report.rejected, report.iterations);
    }
}

#[test]
fn iteration_cap_bounds_the_run() {
    let config = OptimizationConfig {
        max_iterations: 10,
        ..OptimizationConfig::default()
    };
    let objective = |l: &Loadout| f64::from(l.attack);
    let report = Annealer::new(&config).run(Loadout::default(), &objective, 3);
    assert_eq!(report.iterations, 10);
}

#[test]
fn neighbors_change_one_dimension_within_bounds() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut current = Loadout::new(5, 25, 10, WeaponKind::Bow, ArmorKind::Plate);

    for _ in 0..500 {
        let next = neighbor(&current, &mut rng);
        assert!(next.validate().is_ok());
        let changed = [
            next.attack != current.attack,
            next.defense != current.defense,
            next.speed != current.speed,
            next.weapon != current.weapon,
            next.armor != current.armor,
        ];
        assert_eq!(changed.iter().filter(|c| **c).count(), 1);
        current = next;
    }
}

#[test]
fn balance_penalty_discourages_extremes() {
    let balanced = Loadout::new(20, 10, 5, WeaponKind::Sword, ArmorKind::Leather);
    let glass_cannon = Loadout::new(40, 3, 10, WeaponKind::Axe, ArmorKind::Unarmored);
    assert_eq!(EncounterObjective::balance_penalty(&balanced), 0.0);
    assert!(EncounterObjective::balance_penalty(&glass_cannon) > 0.0);
}
