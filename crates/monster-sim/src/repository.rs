//! Storage of the brain's learned state between runs.
use std::fs;
use std::path::{Path, PathBuf};

use monster_ai::LearnedState;
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Loads and saves [`LearnedState`] records.
pub trait LearnedStateRepository {
    fn save(&self, state: &LearnedState) -> Result<()>;

    /// `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<LearnedState>>;
}

/// Pretty-printed JSON file, replaced atomically on save.
pub struct FileLearnedStateRepository {
    path: PathBuf,
}

impl FileLearnedStateRepository {
    /// Creates the parent directory if it does not exist yet.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LearnedStateRepository for FileLearnedStateRepository {
    fn save(&self, state: &LearnedState) -> Result<()> {
        let temp_path = self.path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(state).map_err(|e| {
            RepositoryError::Json(format!("Failed to serialize learned state: {}", e))
        })?;

        fs::write(&temp_path, json)?;

        // Atomic rename
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!("Saved learned state to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<LearnedState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        let state: LearnedState = serde_json::from_str(&json).map_err(|e| {
            RepositoryError::Json(format!("Failed to deserialize learned state: {}", e))
        })?;

        tracing::debug!("Loaded learned state from {}", self.path.display());
        Ok(Some(state))
    }
}
