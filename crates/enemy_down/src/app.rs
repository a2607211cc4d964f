//! Main application logic and lifecycle management.
//!
//! The `Application` wires the arena together: configuration, the score
//! store, the in-memory world, the tokio scheduler, the event bus and the
//! EnemyDown plugin. It then runs the console until the operator quits or a
//! termination signal arrives.

use crate::{cli::CliArgs, config::AppConfig, console::Console, logging::display_banner, signals::wait_for_shutdown_signal};
use arena_event_system::{create_event_system, EventSystem, InMemoryWorld, ShutdownState, SimplePlugin, TokioScheduler};
use plugin_enemy_down::{EnemyDownContext, EnemyDownPlugin, JsonLinesScoreStore, SpawnRng};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Main application struct.
///
/// Owns every long-lived component of the server. Construction fails fast:
/// an invalid configuration or an unusable score store stops the server
/// before any player can start a run.
pub struct Application {
    /// Loaded application configuration, CLI overrides applied
    config: AppConfig,
    world: Arc<InMemoryWorld>,
    events: Arc<EventSystem>,
    plugin: EnemyDownPlugin,
}

impl Application {
    /// Creates a new application instance.
    ///
    /// # Process
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    /// 4. Open the score store
    /// 5. Build the world, scheduler, event bus and plugin
    /// 6. Register the plugin's handlers and initialize it
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(store_path) = args.store_path {
            config.store.path = store_path.to_string_lossy().to_string();
        }

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Some(seed) = args.seed {
            config.game.rng_seed = Some(seed);
        }

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        }
        info!("✅ Configuration loaded and validated successfully");

        display_banner();

        let store = JsonLinesScoreStore::open(config.store_path())
            .map_err(|e| format!("Failed to open score store {}: {e}", config.store.path))?;

        let rng = match config.game.rng_seed {
            Some(seed) => {
                info!("🎲 Spawns seeded with {}", seed);
                SpawnRng::seeded(seed)
            }
            None => SpawnRng::from_entropy(),
        };

        let world = Arc::new(InMemoryWorld::new());
        let events = create_event_system();
        let ctx = EnemyDownContext::new(world.clone(), Arc::new(TokioScheduler::new()), Arc::new(store), rng)
            .with_rules(config.game.to_game_rules());

        let mut plugin = EnemyDownPlugin::new(ctx);
        plugin.register_handlers(events.clone()).await?;
        plugin.on_init().await?;
        info!("🔌 Loaded {} v{}", plugin.name(), plugin.version());

        Ok(Self {
            config,
            world,
            events,
            plugin,
        })
    }

    /// Runs the console until `quit`, end of input, or a shutdown signal,
    /// then shuts the plugin down.
    pub async fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        info!("🌟 Starting EnemyDown Arena Server");
        self.log_configuration_summary();

        let shutdown_state = ShutdownState::new();

        let signal_handle = {
            let shutdown_state = shutdown_state.clone();
            tokio::spawn(async move {
                if let Err(e) = wait_for_shutdown_signal(shutdown_state).await {
                    error!("❌ Failed to install signal handlers: {}", e);
                }
            })
        };

        let console = Console::new(self.world.clone(), self.events.clone(), self.plugin.command().clone());
        let console_handle = {
            let shutdown_state = shutdown_state.clone();
            tokio::spawn(async move {
                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                console.run(stdin, shutdown_state).await;
            })
        };

        info!("✅ EnemyDown Arena is now running!");
        info!("🛑 Type 'quit' or press Ctrl+C to shut down");

        shutdown_state.wait().await;
        info!("🛑 Shutdown requested, stopping the arena...");

        signal_handle.abort();
        // The console may be parked in a blocking stdin read.
        console_handle.abort();

        if let Err(e) = self.plugin.on_shutdown().await {
            warn!("⚠️ Plugin shutdown failed: {}", e);
        }

        let stats = self.events.get_stats().await;
        info!("📊 Final Statistics:");
        info!("  - Events emitted: {}", stats.events_emitted);
        info!("  - Events without handlers: {}", stats.events_unhandled);
        info!("  - Handler failures: {}", stats.handler_failures);
        info!("  - Sessions: {}", self.plugin.context().registry.len());

        info!("✅ EnemyDown Arena shutdown complete");
        Ok(())
    }

    fn log_configuration_summary(&self) {
        let game = &self.config.game;
        info!("📋 Configuration Summary:");
        info!("  ⏱️ Run length: {} ({} per tick)", game.duration, game.time_step);
        info!("  🔁 Tick interval: {}ms", game.tick_interval_ms);
        info!("  💾 Score store: {}", self.config.store.path);
        match game.rng_seed {
            Some(seed) => info!("  🎲 Spawn seed: {}", seed),
            None => info!("  🎲 Spawn seed: random"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(dir: &TempDir) -> CliArgs {
        CliArgs {
            config_path: dir.path().join("config.toml"),
            store_path: Some(dir.path().join("scores.jsonl")),
            log_level: Some("debug".to_string()),
            json_logs: false,
            seed: Some(99),
        }
    }

    #[tokio::test]
    async fn test_application_applies_overrides() {
        let dir = TempDir::new().unwrap();
        let app = Application::new(args(&dir)).await.unwrap();

        assert_eq!(app.config.logging.level, "debug");
        assert_eq!(app.config.game.rng_seed, Some(99));
        assert_eq!(app.config.store_path(), dir.path().join("scores.jsonl"));
        assert!(dir.path().join("config.toml").exists());
        assert!(dir.path().join("scores.jsonl").exists());
        assert_eq!(app.events.get_stats().await.total_handlers, 2);
    }

    #[tokio::test]
    async fn test_unusable_store_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut args = args(&dir);
        args.store_path = Some(dir.path().join("missing").join("scores.jsonl"));

        assert!(Application::new(args).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_override_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut args = args(&dir);
        args.log_level = Some("loud".to_string());

        assert!(Application::new(args).await.is_err());
    }
}
