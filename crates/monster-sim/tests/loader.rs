use monster_ai::{GridMap, MapOracle, Position};
use monster_sim::{load_ai_config, load_map, parse_ai_config};
use tempfile::NamedTempFile;

#[test]
fn config_file_overrides_selected_fields() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        "[orchestrator]\nengagement_range = 5\n\n[optimization]\ninterval_ticks = 50\n",
    )
    .unwrap();

    let config = load_ai_config(Some(file.path())).unwrap();

    assert_eq!(config.orchestrator.engagement_range, 5);
    assert_eq!(config.optimization.interval_ticks, Some(50));
}

#[test]
fn unknown_field_is_rejected() {
    assert!(parse_ai_config("[tactics]\nmax_dept = 3\n").is_err());
}

#[test]
fn out_of_range_value_fails_validation() {
    let err = parse_ai_config("[optimization]\ncooling_rate = 1.5\n").unwrap_err();
    assert!(err.to_string().contains("cooling"), "{err}");
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_ai_config(Some(&dir.path().join("nope.toml"))).is_err());
}

#[test]
fn map_file_is_parsed() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "#####\n#..~#\n#####\n").unwrap();

    let map: GridMap = load_map(Some(file.path())).unwrap();

    assert_eq!(map.dimensions().width, 5);
    assert_eq!(map.dimensions().height, 3);
    assert!(map.is_walkable(Position::new(1, 2)));
}
