//! Monster AI simulator binary.
//!
//! Runs the brain against a scripted player and keeps the learned model
//! across runs.
//!
//! # Examples
//!
//! ```bash
//! SIM_TICKS=2000 RUST_LOG=monster_ai=debug cargo run -p monster-sim
//! ```

use anyhow::Result;
use monster_ai::MonsterBrain;
use monster_sim::{
    FileLearnedStateRepository, LearnedStateRepository, PlayerProfile, ScenarioConfig, SimConfig,
    load_ai_config, load_map, logging, run_scenario,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // 1. Load configuration from environment
    let sim_config = SimConfig::from_env();

    // 2. Setup logging
    let _guard = logging::setup_logging(&sim_config.session_id)?;

    tracing::info!("Starting monster simulator");
    tracing::info!("Ticks: {}, seed: {}", sim_config.ticks, sim_config.seed);

    // 3. Build the brain
    let ai_config = load_ai_config(sim_config.ai_config_path.as_deref())?;
    let map = load_map(sim_config.map_path.as_deref())?;
    let mut brain = MonsterBrain::new(ai_config)?;

    // 4. Restore what earlier runs learned
    let repository = FileLearnedStateRepository::new(sim_config.learned_state_file())?;
    match repository.load() {
        Ok(Some(state)) => match brain.import_state(&state) {
            Ok(()) => tracing::info!(
                "Restored learned state ({} observations) from {}",
                state.total_observations,
                repository.path().display()
            ),
            Err(e) => tracing::warn!("Ignoring learned state: {}", e),
        },
        Ok(None) => tracing::info!("No learned state yet, starting fresh"),
        Err(e) => tracing::warn!("Failed to load learned state: {}", e),
    }

    // 5. Run
    let tactics = &brain.config().tactics;
    let scenario = ScenarioConfig {
        ticks: sim_config.ticks,
        seed: sim_config.seed,
        player: PlayerProfile {
            attack: tactics.player_attack,
            defense: tactics.player_defense,
            max_health: tactics.player_max_health,
            ..PlayerProfile::default()
        },
    };
    let summary = run_scenario(&mut brain, &map, &scenario).await?;

    repository.save(&brain.export_state())?;
    tracing::info!("Saved learned state to {}", repository.path().display());

    tracing::info!("Summary: {}", serde_json::to_string(&summary)?);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
