//! Platform-specific directory utilities.

use std::path::PathBuf;

const APPLICATION: &str = "monster-ai";

/// Platform-specific log directory
///
/// - macOS: `~/Library/Caches/monster-ai/logs`
/// - Linux: `~/.cache/monster-ai/logs` (or `$XDG_CACHE_HOME/monster-ai/logs`)
/// - Windows: `%LOCALAPPDATA%\monster-ai\logs`
/// - Fallback: `/tmp/monster-ai/logs`
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APPLICATION)
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp").join(APPLICATION))
        .join("logs")
}

/// Platform-specific data directory
///
/// - macOS: `~/Library/Application Support/monster-ai`
/// - Linux: `~/.local/share/monster-ai` (or `$XDG_DATA_HOME/monster-ai`)
/// - Windows: `%APPDATA%\monster-ai`
/// - Fallback: `./save_data`
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APPLICATION)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./save_data"))
}
