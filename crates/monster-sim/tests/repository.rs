use monster_ai::{AiConfig, LearnedState, MonsterBrain};
use monster_sim::{FileLearnedStateRepository, LearnedStateRepository, RepositoryError};
use tempfile::TempDir;

#[test]
fn save_then_load_returns_the_same_state() {
    let dir = TempDir::new().unwrap();
    let repo = FileLearnedStateRepository::new(dir.path().join("state.json")).unwrap();
    let state = MonsterBrain::new(AiConfig::default()).unwrap().export_state();

    repo.save(&state).unwrap();

    assert_eq!(repo.load().unwrap(), Some(state));
    assert!(!dir.path().join("state.json.tmp").exists());
}

#[test]
fn missing_file_loads_as_none() {
    let dir = TempDir::new().unwrap();
    let repo = FileLearnedStateRepository::new(dir.path().join("absent.json")).unwrap();

    assert_eq!(repo.load().unwrap(), None::<LearnedState>);
}

#[test]
fn nested_parent_directories_are_created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a").join("b").join("state.json");
    let repo = FileLearnedStateRepository::new(&path).unwrap();

    repo.save(&MonsterBrain::new(AiConfig::default()).unwrap().export_state())
        .unwrap();

    assert!(path.exists());
}

#[test]
fn corrupt_file_is_a_json_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{ not json").unwrap();
    let repo = FileLearnedStateRepository::new(&path).unwrap();

    assert!(matches!(repo.load(), Err(RepositoryError::Json(_))));
}
