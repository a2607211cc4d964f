//! # Kill Attribution
//!
//! The host reports every entity death in the world, not only arena enemies.
//! A death is credited only when all of these hold:
//!
//! - the event names a killer
//! - the killer has a session
//! - the dead entity is in that session's spawn set
//!
//! Credited kills are scored by enemy kind (see [`points_for`]) and the player
//! is told the new total. The entity stays in the spawn set until the run is
//! finalized; the host has already removed it from the world.

use crate::context::EnemyDownContext;
use crate::difficulty::points_for;
use crate::session::lock_session;
use arena_event_system::EntityDeathEvent;
use tracing::debug;

/// Applies the scoring rule to one death.
///
/// Returns the points awarded, or `None` when the death is not an arena kill.
pub fn handle_entity_death(ctx: &EnemyDownContext, event: &EntityDeathEvent) -> Option<u32> {
    let killer = event.killer.as_deref()?;

    let Some(session) = ctx.registry.get(killer) else {
        debug!("🗡️ {} killed {} but has no session", killer, event.entity_id);
        return None;
    };

    let points = points_for(&event.kind);
    let score = {
        let mut session = lock_session(&session);
        if !session.is_tracking(&event.entity_id) {
            return None;
        }
        session.add_score(points)
    };

    debug!("🎯 {} killed {} for {} points, total {}", killer, event.kind, points, score);
    ctx.world
        .send_message(killer, &format!("Enemy down! Current score: {score} points!"));
    Some(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::GameRules;
    use crate::spawn::SpawnRng;
    use crate::store::MemoryScoreStore;
    use crate::Difficulty;
    use arena_event_system::{ArenaWorld, EnemyKind, EntityId, InMemoryWorld, ManualScheduler, Position};
    use std::sync::Arc;

    fn context(world: Arc<InMemoryWorld>) -> EnemyDownContext {
        EnemyDownContext::new(
            world,
            Arc::new(ManualScheduler::new()),
            Arc::new(MemoryScoreStore::new()),
            SpawnRng::seeded(5),
        )
    }

    fn death(entity_id: EntityId, kind: EnemyKind, killer: Option<&str>) -> EntityDeathEvent {
        EntityDeathEvent {
            entity_id,
            kind,
            killer: killer.map(str::to_string),
            position: Position::default(),
        }
    }

    fn tracked_enemy(ctx: &EnemyDownContext, player: &str, kind: EnemyKind) -> EntityId {
        let session = ctx.registry.get_or_create(player);
        let id = ctx.world.spawn_entity(kind, Position::default()).unwrap();
        lock_session(&session).track(id);
        id
    }

    #[test]
    fn test_points_by_kind() {
        let world = Arc::new(InMemoryWorld::new());
        world.join_player("Alice", Position::default());
        let ctx = context(world.clone());
        ctx.registry
            .start_run("Alice", Difficulty::Hard, &GameRules::default(), ctx.world.as_ref());

        let melee = tracked_enemy(&ctx, "Alice", EnemyKind::WeakMelee);
        let ranged = tracked_enemy(&ctx, "Alice", EnemyKind::RangedUndead);
        let caster = tracked_enemy(&ctx, "Alice", EnemyKind::Caster);

        assert_eq!(handle_entity_death(&ctx, &death(melee, EnemyKind::WeakMelee, Some("Alice"))), Some(10));
        assert_eq!(handle_entity_death(&ctx, &death(ranged, EnemyKind::RangedUndead, Some("Alice"))), Some(20));
        assert_eq!(handle_entity_death(&ctx, &death(caster, EnemyKind::Caster, Some("Alice"))), Some(20));

        assert_eq!(ctx.registry.snapshot("Alice").unwrap().score(), 50);
        assert_eq!(
            world.messages("Alice").last().map(String::as_str),
            Some("Enemy down! Current score: 50 points!")
        );
    }

    #[test]
    fn test_untracked_entity_scores_nothing() {
        let world = Arc::new(InMemoryWorld::new());
        world.join_player("Alice", Position::default());
        let ctx = context(world.clone());
        ctx.registry.get_or_create("Alice");

        let stray = world.insert_entity(EnemyKind::WeakMelee, Position::default());
        assert_eq!(handle_entity_death(&ctx, &death(stray, EnemyKind::WeakMelee, Some("Alice"))), None);
        assert_eq!(ctx.registry.snapshot("Alice").unwrap().score(), 0);
        assert!(world.messages("Alice").is_empty());
    }

    #[test]
    fn test_environmental_death_is_ignored() {
        let ctx = context(Arc::new(InMemoryWorld::new()));
        let enemy = tracked_enemy(&ctx, "Alice", EnemyKind::Caster);

        assert_eq!(handle_entity_death(&ctx, &death(enemy, EnemyKind::Caster, None)), None);
        assert_eq!(ctx.registry.snapshot("Alice").unwrap().score(), 0);
    }

    #[test]
    fn test_killer_without_session_creates_nothing() {
        let ctx = context(Arc::new(InMemoryWorld::new()));
        let enemy = tracked_enemy(&ctx, "Alice", EnemyKind::WeakMelee);

        assert_eq!(handle_entity_death(&ctx, &death(enemy, EnemyKind::WeakMelee, Some("Mallory"))), None);
        assert!(ctx.registry.get("Mallory").is_none());
        assert_eq!(ctx.registry.len(), 1);
    }

    #[test]
    fn test_someone_elses_enemy_is_not_credited() {
        let ctx = context(Arc::new(InMemoryWorld::new()));
        let alices = tracked_enemy(&ctx, "Alice", EnemyKind::RangedUndead);
        ctx.registry.get_or_create("Bob");

        assert_eq!(handle_entity_death(&ctx, &death(alices, EnemyKind::RangedUndead, Some("Bob"))), None);
        assert_eq!(ctx.registry.snapshot("Bob").unwrap().score(), 0);
    }

    #[test]
    fn test_other_kind_in_spawn_set_scores_zero() {
        let world = Arc::new(InMemoryWorld::new());
        world.join_player("Alice", Position::default());
        let ctx = context(world.clone());
        let cow = tracked_enemy(&ctx, "Alice", EnemyKind::Other("cow".to_string()));

        assert_eq!(
            handle_entity_death(&ctx, &death(cow, EnemyKind::Other("cow".to_string()), Some("Alice"))),
            Some(0)
        );
        assert_eq!(
            world.messages("Alice"),
            vec!["Enemy down! Current score: 0 points!".to_string()]
        );
    }
}
