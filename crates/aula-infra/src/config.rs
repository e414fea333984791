//! Configuration loader for Aula.
//!
//! Reads `config.toml` from the data directory (`~/.aula/` in production)
//! and deserializes it into [`AulaConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;

use aula_types::config::AulaConfig;

use crate::filesystem::config_path;

/// Smallest window that can hold one user message and its reply.
const MIN_WINDOW_SIZE: usize = 2;

/// Smallest directory capacity.
const MIN_CAPACITY: usize = 1;

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: defaults (logged at debug).
/// - Unreadable or malformed file: defaults (logged at warn).
///
/// Floors are applied to the memory sizing in every case.
pub async fn load_config(data_dir: &Path) -> AulaConfig {
    let path = config_path(data_dir);

    let config = match tokio::fs::read_to_string(&path).await {
        Ok(content) => match toml::from_str::<AulaConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
                AulaConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", path.display());
            AulaConfig::default()
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            AulaConfig::default()
        }
    };

    apply_floors(config)
}

fn apply_floors(mut config: AulaConfig) -> AulaConfig {
    if config.memory.window_size < MIN_WINDOW_SIZE {
        tracing::warn!(
            configured = config.memory.window_size,
            "memory.window_size below minimum, using {MIN_WINDOW_SIZE}"
        );
        config.memory.window_size = MIN_WINDOW_SIZE;
    }
    if config.memory.capacity < MIN_CAPACITY {
        tracing::warn!(
            configured = config.memory.capacity,
            "memory.capacity below minimum, using {MIN_CAPACITY}"
        );
        config.memory.capacity = MIN_CAPACITY;
    }
    config
}
