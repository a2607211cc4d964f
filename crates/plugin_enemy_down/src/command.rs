//! # The `enemydown` Command
//!
//! Entry point players use to interact with the arena:
//!
//! | Arguments           | Effect                                         | Returns |
//! |---------------------|------------------------------------------------|---------|
//! | `easy`/`normal`/`hard` | resets the player and starts a new timed run | `true`  |
//! | `list`              | sends every stored score record, oldest first  | `false` |
//! | anything else       | sends a usage message, changes nothing         | `false` |
//!
//! Only players may run the command; the console has no position to spawn
//! enemies around.

use crate::context::EnemyDownContext;
use crate::difficulty::Difficulty;
use crate::game_task::GameTask;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const LIST: &str = "list";
pub const INVALID_ARGUMENT_MESSAGE: &str =
    "Cannot start. The first argument must be a difficulty: [easy, normal, hard]";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load score records.";

/// Who issued a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSender {
    Player(String),
    Console,
}

impl CommandSender {
    pub fn player(name: impl Into<String>) -> Self {
        CommandSender::Player(name.into())
    }
}

/// A validated command request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameRequest {
    Start(Difficulty),
    List,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("expected exactly one argument, got {0}")]
    WrongArgumentCount(usize),
    #[error("unknown difficulty '{0}', expected one of [easy, normal, hard]")]
    UnknownDifficulty(String),
}

/// Validates input and starts runs.
#[derive(Debug, Clone)]
pub struct EnemyDownCommand {
    ctx: EnemyDownContext,
}

impl EnemyDownCommand {
    pub const NAME: &'static str = "enemydown";

    pub fn new(ctx: EnemyDownContext) -> Self {
        Self { ctx }
    }

    /// Parses command arguments without touching any state.
    pub fn parse(args: &[&str]) -> Result<GameRequest, CommandError> {
        let [arg] = args else {
            return Err(CommandError::WrongArgumentCount(args.len()));
        };
        if *arg == LIST {
            return Ok(GameRequest::List);
        }
        Difficulty::from_token(arg)
            .map(GameRequest::Start)
            .ok_or_else(|| CommandError::UnknownDifficulty(arg.to_string()))
    }

    /// Runs the command. Returns `true` only when a run was started.
    pub fn execute(&self, sender: &CommandSender, args: &[&str]) -> bool {
        let CommandSender::Player(player_name) = sender else {
            warn!("⚠️ /{} can only be used by players", Self::NAME);
            return false;
        };

        match Self::parse(args) {
            Ok(GameRequest::List) => {
                self.send_records(player_name);
                false
            }
            Ok(GameRequest::Start(difficulty)) => {
                self.start(player_name, difficulty);
                true
            }
            Err(e) => {
                debug!("🚫 Rejected /{} from {}: {}", Self::NAME, player_name, e);
                self.ctx.world.send_message(player_name, INVALID_ARGUMENT_MESSAGE);
                false
            }
        }
    }

    fn start(&self, player_name: &str, difficulty: Difficulty) {
        let ctx = &self.ctx;
        let started = ctx
            .registry
            .start_run(player_name, difficulty, &ctx.rules, ctx.world.as_ref());
        ctx.world.reset_player_status(player_name);

        let run = started.run;
        let task = Arc::new(GameTask::new(
            player_name,
            started,
            difficulty,
            ctx.rules,
            ctx.world.clone(),
            ctx.store.clone(),
            ctx.rng.clone(),
        ));
        ctx.scheduler
            .schedule_repeating(task, Duration::ZERO, ctx.rules.tick_interval);

        info!("⚔️ {} started run {} on {}", player_name, run, difficulty);
    }

    fn send_records(&self, player_name: &str) {
        match self.ctx.store.select_all() {
            Ok(records) => {
                for record in records {
                    self.ctx.world.send_message(player_name, &record.display_line());
                }
            }
            Err(e) => {
                error!("❌ Failed to load score records for {}: {}", player_name, e);
                self.ctx.world.send_message(player_name, LOAD_FAILED_MESSAGE);
            }
        }
    }
}
