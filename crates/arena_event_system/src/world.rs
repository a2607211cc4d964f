//! # In-Memory World
//!
//! A self-contained [`ArenaWorld`] implementation used by the console server
//! and by tests. It keeps players and entities in `DashMap`s and records every
//! message and title so callers can inspect what a player would have seen.
//!
//! Deaths are driven from outside through [`InMemoryWorld::kill_entity`],
//! which removes the entity and hands back the [`EntityDeathEvent`] the host
//! should emit.

use crate::context::{ArenaWorld, WorldError};
use crate::events::EntityDeathEvent;
use crate::types::{EnemyKind, EntityId, Position, TitleTimings};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Full health and food level for a player.
pub const MAX_PLAYER_VITALS: u32 = 20;

/// Equipment handed out by [`ArenaWorld::reset_player_status`].
pub const ARENA_EQUIPMENT: [&str; 5] = [
    "netherite_helmet",
    "netherite_chestplate",
    "netherite_leggings",
    "netherite_boots",
    "netherite_sword",
];

/// A living entity tracked by the world.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldEntity {
    pub kind: EnemyKind,
    pub position: Position,
}

/// A title shown to a player.
#[derive(Debug, Clone, PartialEq)]
pub struct ShownTitle {
    pub title: String,
    pub subtitle: String,
    pub timings: TitleTimings,
}

/// Everything the world knows about an online player.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub position: Position,
    pub health: u32,
    pub food_level: u32,
    pub equipment: Vec<String>,
    pub status_effects: Vec<String>,
    pub messages: Vec<String>,
    pub titles: Vec<ShownTitle>,
}

impl PlayerState {
    fn new(position: Position) -> Self {
        Self {
            position,
            health: MAX_PLAYER_VITALS,
            food_level: MAX_PLAYER_VITALS,
            equipment: Vec::new(),
            status_effects: Vec::new(),
            messages: Vec::new(),
            titles: Vec::new(),
        }
    }
}

/// Thread-safe world simulation kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryWorld {
    players: DashMap<String, PlayerState>,
    entities: DashMap<EntityId, WorldEntity>,
    reject_spawns: AtomicBool,
}

impl InMemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a player to the world, or moves them if already present.
    pub fn join_player(&self, player_name: &str, position: Position) {
        self.players
            .entry(player_name.to_string())
            .and_modify(|player| player.position = position)
            .or_insert_with(|| PlayerState::new(position));
        info!("👤 {} joined the world at {}", player_name, position);
    }

    /// Moves an online player. Returns `false` if the player is unknown.
    pub fn set_player_position(&self, player_name: &str, position: Position) -> bool {
        match self.players.get_mut(player_name) {
            Some(mut player) => {
                player.position = position;
                true
            }
            None => false,
        }
    }

    /// Applies a status effect to a player.
    pub fn add_status_effect(&self, player_name: &str, effect: &str) {
        if let Some(mut player) = self.players.get_mut(player_name) {
            player.status_effects.push(effect.to_string());
        }
    }

    /// Places an entity in the world without going through the arena.
    pub fn insert_entity(&self, kind: EnemyKind, position: Position) -> EntityId {
        let id = EntityId::new();
        self.entities.insert(id, WorldEntity { kind, position });
        id
    }

    /// Kills an entity, crediting `killer` if given.
    ///
    /// Returns the death event to emit, or `None` if the entity does not exist.
    pub fn kill_entity(&self, entity_id: EntityId, killer: Option<&str>) -> Option<EntityDeathEvent> {
        let (_, entity) = self.entities.remove(&entity_id)?;
        debug!("💀 {} ({}) died, killer: {:?}", entity_id, entity.kind, killer);
        Some(EntityDeathEvent {
            entity_id,
            kind: entity.kind,
            killer: killer.map(str::to_string),
            position: entity.position,
        })
    }

    /// Makes every subsequent spawn request fail (or succeed again).
    pub fn set_reject_spawns(&self, reject: bool) {
        self.reject_spawns.store(reject, Ordering::Release);
    }

    pub fn entity(&self, entity_id: EntityId) -> Option<WorldEntity> {
        self.entities.get(&entity_id).map(|entry| entry.value().clone())
    }

    /// All living entities, in no particular order.
    pub fn entities(&self) -> Vec<(EntityId, WorldEntity)> {
        self.entities
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn player(&self, player_name: &str) -> Option<PlayerState> {
        self.players.get(player_name).map(|entry| entry.value().clone())
    }

    /// Chat lines received by a player, oldest first.
    pub fn messages(&self, player_name: &str) -> Vec<String> {
        self.player(player_name)
            .map(|player| player.messages)
            .unwrap_or_default()
    }

    /// Titles shown to a player, oldest first.
    pub fn titles(&self, player_name: &str) -> Vec<ShownTitle> {
        self.player(player_name)
            .map(|player| player.titles)
            .unwrap_or_default()
    }
}

impl ArenaWorld for InMemoryWorld {
    fn spawn_entity(&self, kind: EnemyKind, position: Position) -> Result<EntityId, WorldError> {
        if self.reject_spawns.load(Ordering::Acquire) {
            return Err(WorldError::SpawnRejected(format!("{kind} at {position}")));
        }
        let id = self.insert_entity(kind.clone(), position);
        debug!("🧟 Spawned {} {} at {}", kind, id, position);
        Ok(id)
    }

    fn remove_entity(&self, entity_id: EntityId) {
        self.entities.remove(&entity_id);
    }

    fn player_position(&self, player_name: &str) -> Option<Position> {
        self.players.get(player_name).map(|player| player.position)
    }

    fn reset_player_status(&self, player_name: &str) {
        if let Some(mut player) = self.players.get_mut(player_name) {
            player.health = MAX_PLAYER_VITALS;
            player.food_level = MAX_PLAYER_VITALS;
            player.equipment = ARENA_EQUIPMENT.iter().map(|item| item.to_string()).collect();
        }
    }

    fn clear_status_effects(&self, player_name: &str) {
        if let Some(mut player) = self.players.get_mut(player_name) {
            player.status_effects.clear();
        }
    }

    fn send_message(&self, player_name: &str, message: &str) {
        info!("💬 [{}] {}", player_name, message);
        if let Some(mut player) = self.players.get_mut(player_name) {
            player.messages.push(message.to_string());
        }
    }

    fn send_title(&self, player_name: &str, title: &str, subtitle: &str, timings: TitleTimings) {
        info!("🏁 [{}] {} - {}", player_name, title, subtitle);
        if let Some(mut player) = self.players.get_mut(player_name) {
            player.titles.push(ShownTitle {
                title: title.to_string(),
                subtitle: subtitle.to_string(),
                timings,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_kill_produces_death_event() {
        let world = InMemoryWorld::new();
        let id = world
            .spawn_entity(EnemyKind::Caster, Position::new(1.0, 2.0, 3.0))
            .expect("spawn should succeed");

        let event = world.kill_entity(id, Some("Alice")).expect("entity exists");
        assert_eq!(event.entity_id, id);
        assert_eq!(event.kind, EnemyKind::Caster);
        assert_eq!(event.killer.as_deref(), Some("Alice"));
        assert!(world.entity(id).is_none());
        assert!(world.kill_entity(id, None).is_none());
    }

    #[test]
    fn test_rejected_spawn() {
        let world = InMemoryWorld::new();
        world.set_reject_spawns(true);
        assert!(world.spawn_entity(EnemyKind::WeakMelee, Position::default()).is_err());
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_reset_status_and_effects() {
        let world = InMemoryWorld::new();
        world.join_player("Alice", Position::default());
        world.add_status_effect("Alice", "poison");
        world.reset_player_status("Alice");
        world.clear_status_effects("Alice");

        let player = world.player("Alice").unwrap();
        assert_eq!(player.health, MAX_PLAYER_VITALS);
        assert_eq!(player.food_level, MAX_PLAYER_VITALS);
        assert_eq!(player.equipment.len(), ARENA_EQUIPMENT.len());
        assert!(player.status_effects.is_empty());
    }

    #[test]
    fn test_messages_only_for_online_players() {
        let world = InMemoryWorld::new();
        world.join_player("Alice", Position::default());
        world.send_message("Alice", "hello");
        world.send_message("Bob", "ignored");

        assert_eq!(world.messages("Alice"), vec!["hello".to_string()]);
        assert!(world.messages("Bob").is_empty());
    }
}
