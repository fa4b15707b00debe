//! Loading of the AI configuration and the dungeon map.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use monster_ai::{AiConfig, GridMap};

/// Arena used when no map file is given.
pub const BUILTIN_ARENA: &str = "\
####################
#........#.........#
#..~~....#....^....#
#..~~..........L...#
#......###.........#
#....T...#....$....#
#........+.........#
####.#####...___...#
#........#.........#
#..^.....#....##...#
#..................#
####################";

/// Reads and validates an [`AiConfig`] TOML file; defaults when `path` is
/// `None`.
pub fn load_ai_config(path: Option<&Path>) -> Result<AiConfig> {
    let Some(path) = path else {
        tracing::debug!("No AI config file given, using defaults");
        return Ok(AiConfig::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read AI config {}", path.display()))?;
    let config = parse_ai_config(&text)
        .with_context(|| format!("invalid AI config {}", path.display()))?;

    tracing::info!("Loaded AI config from {}", path.display());
    Ok(config)
}

/// Parses and validates an [`AiConfig`] from TOML text.
pub fn parse_ai_config(text: &str) -> Result<AiConfig> {
    let config: AiConfig = toml::from_str(text).context("failed to parse TOML")?;
    config.validate()?;
    Ok(config)
}

/// Reads an ASCII map; the built-in arena when `path` is `None`.
pub fn load_map(path: Option<&Path>) -> Result<GridMap> {
    let Some(path) = path else {
        return GridMap::parse(BUILTIN_ARENA).context("built-in arena is malformed");
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read map {}", path.display()))?;
    let map = GridMap::parse(&text).with_context(|| format!("invalid map {}", path.display()))?;

    tracing::info!("Loaded map from {}", path.display());
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use monster_ai::{MapOracle, Position};

    #[test]
    fn builtin_arena_parses() {
        let map = load_map(None).unwrap();
        assert_eq!(map.dimensions().width, 20);
        assert_eq!(map.dimensions().height, 12);
        assert!(map.is_walkable(Position::new(1, 1)));
        assert!(!map.is_walkable(Position::new(0, 0)));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = parse_ai_config("[tactics]\nmax_depth = 4\n").unwrap();
        assert_eq!(config.tactics.max_depth, 4);
        assert_eq!(config.prediction, AiConfig::default().prediction);
    }
}
