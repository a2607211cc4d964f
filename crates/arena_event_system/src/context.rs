//! # Host World Interface
//!
//! The [`ArenaWorld`] trait is the bridge between plugin code and the host
//! world simulation. Plugins never touch entities, inventories or chat
//! directly; they ask the world to do it.
//!
//! ## Core Services
//!
//! - **Entities**: materialize an enemy at a location, remove it again
//! - **Players**: look up positions, reset health/food/equipment, clear effects
//! - **Messaging**: chat lines and on-screen titles
//!
//! ## Thread Safety
//!
//! Implementations must be `Send + Sync`; the arena calls into the world from
//! scheduler tasks and from event handlers, which may run on different
//! runtime threads.

use crate::types::{EnemyKind, EntityId, Position, TitleTimings};
use std::fmt::Debug;

/// Operations the arena needs from the host world.
pub trait ArenaWorld: Send + Sync + Debug {
    /// Materializes an entity of `kind` at `position` and returns its handle.
    fn spawn_entity(&self, kind: EnemyKind, position: Position) -> Result<EntityId, WorldError>;

    /// Removes an entity from the world. Removing an unknown or already dead
    /// entity is not an error.
    fn remove_entity(&self, entity_id: EntityId);

    /// Current position of a player, `None` when the player is not online.
    fn player_position(&self, player_name: &str) -> Option<Position>;

    /// Restores health and food to full and hands out the arena equipment.
    fn reset_player_status(&self, player_name: &str);

    /// Clears every active status effect on the player.
    fn clear_status_effects(&self, player_name: &str);

    /// Sends a chat line to a single player.
    fn send_message(&self, player_name: &str, message: &str);

    /// Shows an on-screen title to a single player.
    fn send_title(&self, player_name: &str, title: &str, subtitle: &str, timings: TitleTimings);
}

/// Errors reported by the host world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The world refused to spawn the entity
    #[error("Spawn rejected: {0}")]
    SpawnRejected(String),
}
