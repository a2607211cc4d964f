//! Join greeting.

use crate::context::EnemyDownContext;
use crate::difficulty::Difficulty;
use arena_event_system::PlayerJoinedEvent;
use tracing::debug;

/// Tells a newly joined player how to start a run.
pub fn handle_player_joined(ctx: &EnemyDownContext, event: &PlayerJoinedEvent) {
    let tokens: Vec<&str> = Difficulty::ALL.iter().map(Difficulty::token).collect();
    let hint = format!(
        "Welcome to EnemyDown! Start a run with one of [{}], or see past runs with list.",
        tokens.join(", ")
    );
    debug!("👋 Greeting {}", event.player_name);
    ctx.world.send_message(&event.player_name, &hint);
}
