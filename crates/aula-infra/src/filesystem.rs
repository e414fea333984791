//! Data directory layout.
//!
//! Everything Aula persists lives under one directory: the SQLite database
//! (`aula.db`) and the optional `config.toml`.

use std::path::{Path, PathBuf};

/// Resolve the data directory.
///
/// Priority: `AULA_DATA_DIR`, then `~/.aula`, then `.aula` in the current
/// directory.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AULA_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".aula");
    }

    PathBuf::from(".aula")
}

/// Create the data directory if it does not exist yet.
pub async fn ensure_data_dir(data_dir: &Path) -> Result<(), std::io::Error> {
    tokio::fs::create_dir_all(data_dir).await
}

/// Path of the config file inside a data directory.
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}
