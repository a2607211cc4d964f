//! # Interactive Console
//!
//! The server has no network front end; an operator plays the host world from
//! stdin instead. Each line is one console command:
//!
//! | Line                         | Effect                                              |
//! |------------------------------|-----------------------------------------------------|
//! | `join <player> [x y z]`      | puts a player in the world and announces the join    |
//! | `cmd <player> <args..>`      | runs `/enemydown <args..>` as that player            |
//! | `kill [player] <entity-id>`  | kills an entity, credited to `player` when given     |
//! | `entities`                   | lists living entities                                |
//! | `help`                       | lists console commands                               |
//! | `quit`                       | shuts the server down                                |
//!
//! Everything a player would see (chat lines, titles) shows up in the log.

use arena_event_system::{
    EntityId, EventSystem, InMemoryWorld, Position, PlayerJoinedEvent, ShutdownState, ENTITY_DEATH_EVENT,
    PLAYER_JOINED_EVENT,
};
use plugin_enemy_down::{CommandSender, EnemyDownCommand};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info, warn};

const HELP: &[&str] = &[
    "join <player> [x y z]",
    "cmd <player> <easy|normal|hard|list>",
    "kill [player] <entity-id>",
    "entities",
    "help",
    "quit",
];

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Join { player: String, position: Position },
    Cmd { player: String, args: Vec<String> },
    Kill { killer: Option<String>, entity_id: EntityId },
    Entities,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsoleError {
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' is not an entity id")]
    InvalidEntityId(String),
    #[error("'{0}' is not a coordinate")]
    InvalidCoordinate(String),
}

/// Whether the console keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleFlow {
    Continue,
    Quit,
}

impl ConsoleCommand {
    /// Parses one line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, ConsoleError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, rest)) = words.split_first() else {
            return Ok(None);
        };

        let command = match verb {
            "join" => match rest {
                [player] => ConsoleCommand::Join {
                    player: player.to_string(),
                    position: Position::default(),
                },
                [player, x, y, z] => ConsoleCommand::Join {
                    player: player.to_string(),
                    position: Position::new(coordinate(x)?, coordinate(y)?, coordinate(z)?),
                },
                _ => return Err(ConsoleError::Usage(HELP[0])),
            },
            "cmd" => match rest {
                [player, args @ ..] => ConsoleCommand::Cmd {
                    player: player.to_string(),
                    args: args.iter().map(|arg| arg.to_string()).collect(),
                },
                [] => return Err(ConsoleError::Usage(HELP[1])),
            },
            "kill" => match rest {
                [id] => ConsoleCommand::Kill {
                    killer: None,
                    entity_id: entity_id(id)?,
                },
                [killer, id] => ConsoleCommand::Kill {
                    killer: Some(killer.to_string()),
                    entity_id: entity_id(id)?,
                },
                _ => return Err(ConsoleError::Usage(HELP[2])),
            },
            "entities" => ConsoleCommand::Entities,
            "help" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => return Err(ConsoleError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn coordinate(word: &str) -> Result<f64, ConsoleError> {
    word.parse()
        .map_err(|_| ConsoleError::InvalidCoordinate(word.to_string()))
}

fn entity_id(word: &str) -> Result<EntityId, ConsoleError> {
    word.parse()
        .map_err(|_| ConsoleError::InvalidEntityId(word.to_string()))
}

/// Drives the in-memory world and the arena command from text input.
#[derive(Debug, Clone)]
pub struct Console {
    world: Arc<InMemoryWorld>,
    events: Arc<EventSystem>,
    command: EnemyDownCommand,
}

impl Console {
    pub fn new(world: Arc<InMemoryWorld>, events: Arc<EventSystem>, command: EnemyDownCommand) -> Self {
        Self { world, events, command }
    }

    /// Reads lines until EOF, `quit`, or shutdown. Quitting initiates shutdown.
    pub async fn run<R>(&self, input: R, shutdown: ShutdownState)
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        info!("⌨️ Console ready, type 'help' for commands");

        loop {
            let line = tokio::select! {
                _ = shutdown.wait() => break,
                line = lines.next_line() => line,
            };

            let line = match line {
                Ok(Some(line)) => line,
                Ok(None) => {
                    info!("⌨️ Console input closed");
                    break;
                }
                Err(e) => {
                    error!("❌ Failed to read console input: {}", e);
                    break;
                }
            };

            match ConsoleCommand::parse(&line) {
                Ok(Some(command)) => {
                    if self.dispatch(command).await == ConsoleFlow::Quit {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("⌨️ {}", e),
            }
        }

        shutdown.initiate_shutdown();
    }

    /// Executes one console command.
    pub async fn dispatch(&self, command: ConsoleCommand) -> ConsoleFlow {
        match command {
            ConsoleCommand::Join { player, position } => {
                self.world.join_player(&player, position);
                let joined = PlayerJoinedEvent {
                    player_name: player,
                    position,
                };
                if let Err(e) = self.events.emit_core(PLAYER_JOINED_EVENT, &joined).await {
                    error!("❌ Failed to announce join of {}: {}", joined.player_name, e);
                }
            }
            ConsoleCommand::Cmd { player, args } => {
                if self.world.player(&player).is_none() {
                    warn!("⌨️ {} is not in the world, use 'join' first", player);
                    return ConsoleFlow::Continue;
                }
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                let started = self.command.execute(&CommandSender::Player(player.clone()), &args);
                debug!("⌨️ /{} {:?} for {} returned {}", EnemyDownCommand::NAME, args, player, started);
            }
            ConsoleCommand::Kill { killer, entity_id } => {
                let Some(death) = self.world.kill_entity(entity_id, killer.as_deref()) else {
                    warn!("⌨️ No living entity {}", entity_id);
                    return ConsoleFlow::Continue;
                };
                if let Err(e) = self.events.emit_core(ENTITY_DEATH_EVENT, &death).await {
                    error!("❌ Failed to report death of {}: {}", entity_id, e);
                }
            }
            ConsoleCommand::Entities => {
                let entities = self.world.entities();
                info!("🧟 {} living entities", entities.len());
                for (id, entity) in entities {
                    info!("  {} {} at {}", id, entity.kind, entity.position);
                }
            }
            ConsoleCommand::Help => {
                for line in HELP {
                    info!("  {}", line);
                }
            }
            ConsoleCommand::Quit => return ConsoleFlow::Quit,
        }
        ConsoleFlow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_event_system::{create_event_system, EnemyKind, ManualScheduler, SimplePlugin};
    use plugin_enemy_down::{EnemyDownContext, EnemyDownPlugin, MemoryScoreStore, ScoreStore, SpawnRng};

    struct Fixture {
        world: Arc<InMemoryWorld>,
        scheduler: Arc<ManualScheduler>,
        store: Arc<MemoryScoreStore>,
        plugin: EnemyDownPlugin,
        console: Console,
    }

    async fn fixture() -> Fixture {
        let world = Arc::new(InMemoryWorld::new());
        let scheduler = Arc::new(ManualScheduler::new());
        let store = Arc::new(MemoryScoreStore::new());
        let events = create_event_system();
        let ctx = EnemyDownContext::new(world.clone(), scheduler.clone(), store.clone(), SpawnRng::seeded(3));
        let mut plugin = EnemyDownPlugin::new(ctx);
        plugin.register_handlers(events.clone()).await.unwrap();
        let console = Console::new(world.clone(), events, plugin.command().clone());
        Fixture {
            world,
            scheduler,
            store,
            plugin,
            console,
        }
    }

    #[test]
    fn test_parse_lines() {
        assert_eq!(ConsoleCommand::parse("   "), Ok(None));
        assert_eq!(
            ConsoleCommand::parse("join Alice 1 64 -3.5"),
            Ok(Some(ConsoleCommand::Join {
                player: "Alice".to_string(),
                position: Position::new(1.0, 64.0, -3.5),
            }))
        );
        assert_eq!(
            ConsoleCommand::parse("cmd Alice hard"),
            Ok(Some(ConsoleCommand::Cmd {
                player: "Alice".to_string(),
                args: vec!["hard".to_string()],
            }))
        );
        assert_eq!(ConsoleCommand::parse("quit"), Ok(Some(ConsoleCommand::Quit)));
        assert_eq!(ConsoleCommand::parse("join"), Err(ConsoleError::Usage(HELP[0])));
        assert_eq!(
            ConsoleCommand::parse("join Alice 1 two 3"),
            Err(ConsoleError::InvalidCoordinate("two".to_string()))
        );
        assert_eq!(
            ConsoleCommand::parse("kill Alice zombie"),
            Err(ConsoleError::InvalidEntityId("zombie".to_string()))
        );
        assert_eq!(
            ConsoleCommand::parse("dance"),
            Err(ConsoleError::Unknown("dance".to_string()))
        );
    }

    #[test]
    fn test_parse_kill_with_and_without_killer() {
        let id = EntityId::new();
        assert_eq!(
            ConsoleCommand::parse(&format!("kill {id}")),
            Ok(Some(ConsoleCommand::Kill {
                killer: None,
                entity_id: id,
            }))
        );
        assert_eq!(
            ConsoleCommand::parse(&format!("kill Alice {id}")),
            Ok(Some(ConsoleCommand::Kill {
                killer: Some("Alice".to_string()),
                entity_id: id,
            }))
        );
    }

    #[tokio::test]
    async fn test_join_start_and_kill() {
        let fx = fixture().await;
        fx.console
            .dispatch(ConsoleCommand::parse("join Alice 0 64 0").unwrap().unwrap())
            .await;
        assert_eq!(fx.world.messages("Alice").len(), 1);

        fx.console
            .dispatch(ConsoleCommand::parse("cmd Alice easy").unwrap().unwrap())
            .await;
        fx.scheduler.run_pending();
        let (enemy, entity) = fx.world.entities().remove(0);
        assert_eq!(entity.kind, EnemyKind::WeakMelee);

        fx.console
            .dispatch(ConsoleCommand::Kill {
                killer: Some("Alice".to_string()),
                entity_id: enemy,
            })
            .await;

        let session = fx.plugin.context().registry.snapshot("Alice").unwrap();
        assert_eq!(session.score(), 10);
        assert_eq!(
            fx.world.messages("Alice").last().map(String::as_str),
            Some("Enemy down! Current score: 10 points!")
        );
    }

    #[tokio::test]
    async fn test_cmd_for_unknown_player_is_ignored() {
        let fx = fixture().await;
        let flow = fx
            .console
            .dispatch(ConsoleCommand::Cmd {
                player: "Ghost".to_string(),
                args: vec!["hard".to_string()],
            })
            .await;

        assert_eq!(flow, ConsoleFlow::Continue);
        assert!(fx.plugin.context().registry.is_empty());
    }

    #[tokio::test]
    async fn test_run_reads_until_quit() {
        let fx = fixture().await;
        let shutdown = ShutdownState::new();
        let script = b"join Bob\n\nbogus line\ncmd Bob normal\nquit\ncmd Bob hard\n";

        fx.console.run(&script[..], shutdown.clone()).await;

        assert!(shutdown.is_shutdown_initiated());
        let session = fx.plugin.context().registry.snapshot("Bob").unwrap();
        assert_eq!(session.difficulty(), Some(plugin_enemy_down::Difficulty::Normal));
        assert_eq!(session.run(), 1);
        assert!(fx.store.select_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let fx = fixture().await;
        let shutdown = ShutdownState::new();
        shutdown.initiate_shutdown();

        let (_writer, reader) = tokio::io::duplex(64);
        let reader = tokio::io::BufReader::new(reader);
        tokio::time::timeout(std::time::Duration::from_secs(1), fx.console.run(reader, shutdown))
            .await
            .expect("console should stop once shutdown is initiated");
    }
}
