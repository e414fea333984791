//! Global configuration types for Aula.
//!
//! `AulaConfig` represents the top-level `config.toml` that sizes the
//! conversation cache, configures the inference endpoint, and sets the
//! server bind address. Every field has a default, so an empty file (or
//! no file at all) yields a working configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.aula/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AulaConfig {
    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Sizing of the in-process conversation cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Messages kept per conversation (`W`).
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Live conversations kept in memory (`N`).
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Idle time after which a conversation is swept.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of recent messages handed to inference.
    #[serde(default = "default_context_messages")]
    pub context_messages: usize,

    /// Period of the background expiry sweep.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_window_size() -> usize {
    20
}

fn default_capacity() -> usize {
    1000
}

fn default_timeout_secs() -> u64 {
    1800
}

fn default_context_messages() -> usize {
    10
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            capacity: default_capacity(),
            timeout_secs: default_timeout_secs(),
            context_messages: default_context_messages(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Settings for the HuggingFace text-generation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_top_p")]
    pub top_p: f64,

    #[serde(default = "default_inference_timeout_secs")]
    pub timeout_secs: u64,

    /// Answer with a canned echo instead of calling any model.
    #[serde(default)]
    pub dummy: bool,
}

fn default_endpoint() -> String {
    "https://api-inference.huggingface.co/models/meta-llama/Llama-3.1-8B-Instruct".to_string()
}

fn default_max_new_tokens() -> u32 {
    200
}

fn default_temperature() -> f64 {
    0.7
}

fn default_top_p() -> f64 {
    0.9
}

fn default_inference_timeout_secs() -> u64 {
    80
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            max_new_tokens: default_max_new_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_secs: default_inference_timeout_secs(),
            dummy: false,
        }
    }
}

/// REST server bind address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = AulaConfig::default();
        assert_eq!(config.memory.window_size, 20);
        assert_eq!(config.memory.capacity, 1000);
        assert_eq!(config.memory.timeout_secs, 1800);
        assert_eq!(config.memory.context_messages, 10);
        assert_eq!(config.inference.max_new_tokens, 200);
        assert!(!config.inference.dummy);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: AulaConfig = toml::from_str("").unwrap();
        assert_eq!(config.memory, MemoryConfig::default());
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_config_deserialize_partial_section() {
        let toml_str = r#"
[memory]
capacity = 2
timeout_secs = 60

[inference]
dummy = true
"#;
        let config: AulaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.memory.capacity, 2);
        assert_eq!(config.memory.timeout_secs, 60);
        // Unset fields keep their defaults
        assert_eq!(config.memory.window_size, 20);
        assert!(config.inference.dummy);
        assert!((config.inference.temperature - 0.7).abs() < f64::EPSILON);
    }
}
