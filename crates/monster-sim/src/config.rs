//! Simulation settings read from the process environment.
use std::env;
use std::path::PathBuf;

/// Settings of one headless run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    /// TOML file with the `AiConfig`; defaults apply when unset.
    pub ai_config_path: Option<PathBuf>,
    /// ASCII map file; the built-in arena is used when unset.
    pub map_path: Option<PathBuf>,
    pub ticks: u64,
    pub seed: u64,
    pub session_id: Option<String>,
    /// Where learned state is loaded from and saved to.
    pub learned_state_path: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ai_config_path: None,
            map_path: None,
            ticks: 500,
            seed: 7,
            session_id: None,
            learned_state_path: None,
        }
    }
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `MONSTER_AI_CONFIG` - Path to the AI config TOML (default: built-in defaults)
    /// - `SIM_MAP` - Path to an ASCII map (default: built-in arena)
    /// - `SIM_TICKS` - Ticks to simulate (default: 500)
    /// - `SIM_SEED` - Seed of the scripted player (default: 7)
    /// - `SIM_SESSION_ID` - Session identifier for logs (default: timestamp)
    /// - `LEARNED_STATE_PATH` - Learned state file (default: platform data dir)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.ai_config_path = env::var("MONSTER_AI_CONFIG").ok().map(PathBuf::from);
        config.map_path = env::var("SIM_MAP").ok().map(PathBuf::from);

        if let Some(ticks) = read_env::<u64>("SIM_TICKS") {
            config.ticks = ticks.max(1);
        }
        if let Some(seed) = read_env::<u64>("SIM_SEED") {
            config.seed = seed;
        }

        config.session_id = env::var("SIM_SESSION_ID").ok();
        config.learned_state_path = env::var("LEARNED_STATE_PATH").ok().map(PathBuf::from);

        config
    }

    /// Explicit learned-state path, or `learned_state.json` in the data dir.
    pub fn learned_state_file(&self) -> PathBuf {
        self.learned_state_path
            .clone()
            .unwrap_or_else(|| crate::dirs::data_dir().join("learned_state.json"))
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
