//! Configuration management for the EnemyDown server.
//!
//! Settings are loaded from a TOML file and then overridden by command-line
//! arguments. A missing file is created with the defaults.

use plugin_enemy_down::GameRules;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

fn default_duration() -> i32 {
    20
}

fn default_time_step() -> i32 {
    5
}

fn default_tick_interval_ms() -> u64 {
    5000
}

fn default_store_path() -> String {
    "scores.jsonl".to_string()
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Run timing and randomness
    #[serde(default)]
    pub game: GameSettings,
    /// Score record storage
    #[serde(default)]
    pub store: StoreSettings,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Timing of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Time a run starts with
    #[serde(default = "default_duration")]
    pub duration: i32,
    /// Time removed by each spawning tick
    #[serde(default = "default_time_step")]
    pub time_step: i32,
    /// Milliseconds between ticks
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Fixed spawn seed; fresh entropy when absent
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            time_step: default_time_step(),
            tick_interval_ms: default_tick_interval_ms(),
            rng_seed: None,
        }
    }
}

impl GameSettings {
    pub fn to_game_rules(&self) -> GameRules {
        GameRules::new(
            self.duration,
            self.time_step,
            Duration::from_millis(self.tick_interval_ms),
        )
    }
}

/// Score record storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// JSON-lines file holding every finished run
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Logging system configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
    /// Optional file path for log output (None means stdout only)
    pub file_path: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file_path: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes the default configuration to `path`
    /// and returns it.
    pub async fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.store.path)
    }

    /// Validates the configuration.
    ///
    /// `Ok(())` if the configuration is valid, or an error string describing the issue.
    pub fn validate(&self) -> Result<(), String> {
        if self.game.duration <= 0 {
            return Err(format!("game.duration must be positive, got {}", self.game.duration));
        }
        if self.game.time_step <= 0 {
            return Err(format!("game.time_step must be positive, got {}", self.game.time_step));
        }
        if self.game.tick_interval_ms == 0 {
            return Err("game.tick_interval_ms must be greater than 0".to_string());
        }

        if self.store.path.trim().is_empty() {
            return Err("store.path cannot be empty".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.game.duration, 20);
        assert_eq!(config.game.time_step, 5);
        assert_eq!(config.game.tick_interval_ms, 5000);
        assert_eq!(config.game.rng_seed, None);
        assert_eq!(config.store.path, "scores.jsonl");
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        assert!(config.logging.file_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_rules_match_plugin_defaults() {
        assert_eq!(GameSettings::default().to_game_rules(), GameRules::default());
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file_creates_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());

        let reloaded = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded, config);
    }

    #[tokio::test]
    async fn test_load_from_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let toml_content = r#"
[game]
duration = 30
tick_interval_ms = 250
rng_seed = 7

[store]
path = "/var/lib/enemy_down/scores.jsonl"

[logging]
level = "debug"
json_format = true
"#;
        tokio::fs::write(&path, toml_content).await.unwrap();

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.game.duration, 30);
        assert_eq!(config.game.time_step, 5);
        assert_eq!(config.game.tick_interval_ms, 250);
        assert_eq!(config.game.rng_seed, Some(7));
        assert_eq!(config.store_path(), PathBuf::from("/var/lib/enemy_down/scores.jsonl"));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);

        let rules = config.game.to_game_rules();
        assert_eq!(rules.duration, 30);
        assert_eq!(rules.tick_interval, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "[game\nduration = ").await.unwrap();

        assert!(AppConfig::load_from_file(&path).await.is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.game.duration = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.game.time_step = -5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.game.tick_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.store.path = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }
}
