//! # EnemyDown Arena Plugin
//!
//! A timed arena mini-game. A player picks a difficulty and gets a fixed
//! amount of time; enemies keep spawning around them and every kill is worth
//! points. When the clock runs out the final score is stored with the player's
//! name, the difficulty and a timestamp.
//!
//! ## Overview
//!
//! - **Sessions**: one per player, reset in place on every start
//! - **Game Tasks**: a periodic task per run that spawns enemies and ends the run
//! - **Kill Attribution**: death events from the host are matched against the
//!   killer's own spawn set
//! - **Score Records**: append-only history, listable in game
//!
//! ## Run Timeline
//!
//! With the default rules a run lasts four spawning ticks and ends on the fifth:
//!
//! | Tick | Remaining before | Action                   | Remaining after |
//! |------|------------------|--------------------------|-----------------|
//! | 1    | 20               | spawn                    | 15              |
//! | 2    | 15               | spawn                    | 10              |
//! | 3    | 10               | spawn                    | 5               |
//! | 4    | 5                | spawn                    | 0               |
//! | 5    | 0                | game over, store result  | -               |
//!
//! ## Enemies and Points
//!
//! | Difficulty | Enemies drawn from                  |
//! |------------|-------------------------------------|
//! | easy       | weak melee                          |
//! | normal     | weak melee, ranged undead           |
//! | hard       | weak melee, ranged undead, caster   |
//!
//! Weak melee kills are worth 10 points, ranged undead and casters 20.
//!
//! ## Module Organization
//!
//! - [`difficulty`] - difficulty tokens, enemy tables, points
//! - [`session`] - sessions and the registry
//! - [`spawn`] - seeded spawn placement and enemy choice
//! - [`game_task`] - the periodic task behind a run
//! - [`handlers`] - host event handlers
//! - [`command`] - the `enemydown` command
//! - [`store`] - score record storage

use arena_event_system::{
    async_trait, EntityDeathEvent, EventSystem, PlayerJoinedEvent, PluginError, SimplePlugin,
    ENTITY_DEATH_EVENT, PLAYER_JOINED_EVENT,
};
use std::sync::Arc;
use tracing::{debug, info};

pub mod command;
pub mod context;
pub mod difficulty;
pub mod game_task;
pub mod handlers;
pub mod session;
pub mod spawn;
pub mod store;

pub use command::{CommandError, CommandSender, EnemyDownCommand, GameRequest};
pub use context::EnemyDownContext;
pub use difficulty::{points_for, Difficulty};
pub use game_task::GameTask;
pub use session::{GameRules, Session, SessionPhase, SessionRegistry};
pub use spawn::SpawnRng;
pub use store::{JsonLinesScoreStore, MemoryScoreStore, NewScoreRecord, ScoreRecord, ScoreStore, StoreError};

use handlers::{handle_entity_death, handle_player_joined};

/// The EnemyDown plugin.
///
/// Owns the shared [`EnemyDownContext`] and the command built on top of it.
/// Handlers registered on the event bus hold their own clone of the context,
/// so the plugin can be moved around freely after registration.
#[derive(Debug)]
pub struct EnemyDownPlugin {
    name: String,
    ctx: EnemyDownContext,
    command: EnemyDownCommand,
}

impl EnemyDownPlugin {
    pub fn new(ctx: EnemyDownContext) -> Self {
        debug!("⚔️ EnemyDownPlugin: Creating new instance");
        Self {
            name: "EnemyDownPlugin".to_string(),
            command: EnemyDownCommand::new(ctx.clone()),
            ctx,
        }
    }

    /// The `enemydown` command, for the host to route player input to.
    pub fn command(&self) -> &EnemyDownCommand {
        &self.command
    }

    pub fn context(&self) -> &EnemyDownContext {
        &self.ctx
    }
}

#[async_trait]
impl SimplePlugin for EnemyDownPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    /// Subscribes to entity deaths (kill scoring) and player joins (usage hint).
    async fn register_handlers(&mut self, events: Arc<EventSystem>) -> Result<(), PluginError> {
        let ctx = self.ctx.clone();
        events
            .on_core(ENTITY_DEATH_EVENT, move |event: EntityDeathEvent| {
                handle_entity_death(&ctx, &event);
                Ok(())
            })
            .await?;

        let ctx = self.ctx.clone();
        events
            .on_core(PLAYER_JOINED_EVENT, move |event: PlayerJoinedEvent| {
                handle_player_joined(&ctx, &event);
                Ok(())
            })
            .await?;

        info!("⚔️ {} registered its handlers", self.name);
        Ok(())
    }

    async fn on_init(&mut self) -> Result<(), PluginError> {
        info!(
            "⚔️ {} ready: {}s runs, {} per tick, a tick every {:?}",
            self.name, self.ctx.rules.duration, self.ctx.rules.time_step, self.ctx.rules.tick_interval
        );
        Ok(())
    }

    /// Stops every running game without recording a result.
    async fn on_shutdown(&mut self) -> Result<(), PluginError> {
        let stopped = self.ctx.registry.abandon_all(self.ctx.world.as_ref());
        info!("⚔️ {} shut down, abandoned {} active runs", self.name, stopped);
        Ok(())
    }
}
