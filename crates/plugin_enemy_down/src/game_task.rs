//! # Game Task
//!
//! The periodic task behind one run. A [`GameTask`] is bound to a single
//! session, the difficulty and the run number it was started with. Every tick
//! either spawns an enemy near the player and burns one time step, or, once
//! time is up, finalizes the run:
//!
//! 1. cancel its own handle, so no later tick can finalize again
//! 2. show the player the final score
//! 3. remove every enemy the run spawned
//! 4. clear the player's status effects
//! 5. append a [`ScoreRecord`](crate::store::ScoreRecord) to the store
//!
//! A failed store write is reported to the player and logged; the session is
//! finalized either way.

use crate::difficulty::Difficulty;
use crate::session::{lock_session, GameRules, SessionHandle, StartedRun};
use crate::spawn::{pick_enemy, spawn_location, SpawnRng};
use crate::store::{NewScoreRecord, ScoreStore};
use arena_event_system::{ArenaWorld, EntityId, RepeatingTask, TaskHandle, TickOutcome, TitleTimings};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const GAME_OVER_TITLE: &str = "Game over!";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save your score.";
pub const GAME_OVER_TIMINGS: TitleTimings = TitleTimings::new(0, 60, 0);

/// Periodic spawn/expire task for one run.
#[derive(Debug)]
pub struct GameTask {
    player_name: String,
    session: SessionHandle,
    difficulty: Difficulty,
    run: u64,
    rules: GameRules,
    world: Arc<dyn ArenaWorld>,
    store: Arc<dyn ScoreStore>,
    rng: Arc<SpawnRng>,
    handle: TaskHandle,
}

impl GameTask {
    /// Builds the task for `started`, reusing the handle the registry already
    /// registered on the session.
    pub fn new(
        player_name: impl Into<String>,
        started: StartedRun,
        difficulty: Difficulty,
        rules: GameRules,
        world: Arc<dyn ArenaWorld>,
        store: Arc<dyn ScoreStore>,
        rng: Arc<SpawnRng>,
    ) -> Self {
        Self {
            player_name: player_name.into(),
            session: started.session,
            difficulty,
            run: started.run,
            rules,
            world,
            store,
            rng,
            handle: started.handle,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }

    fn spawn_enemy(&self) -> Option<EntityId> {
        let Some(origin) = self.world.player_position(&self.player_name) else {
            warn!("⚠️ {} is not in the world, skipping spawn", self.player_name);
            return None;
        };

        let (location, kind) = self.rng.with(|rng| {
            let location = spawn_location(rng, origin, self.rules.spawn_spread());
            (location, pick_enemy(rng, self.difficulty))
        });

        match self.world.spawn_entity(kind.clone(), location) {
            Ok(entity_id) => {
                debug!("🧟 Spawned {} {} for {} at {}", kind, entity_id, self.player_name, location);
                Some(entity_id)
            }
            Err(e) => {
                warn!("⚠️ Failed to spawn {} for {}: {}", kind, self.player_name, e);
                None
            }
        }
    }

    fn finish(&self, score: u32, leftovers: Vec<EntityId>) {
        self.world.send_title(
            &self.player_name,
            GAME_OVER_TITLE,
            &format!("{} total {} points!", self.player_name, score),
            GAME_OVER_TIMINGS,
        );

        for entity_id in leftovers {
            self.world.remove_entity(entity_id);
        }
        self.world.clear_status_effects(&self.player_name);

        let record = NewScoreRecord {
            player_name: self.player_name.clone(),
            score,
            difficulty: self.difficulty,
        };
        match self.store.insert(record) {
            Ok(record) => info!(
                "🏆 {} finished {} with {} points (record {})",
                self.player_name, self.difficulty, score, record.id
            ),
            Err(e) => {
                error!("❌ Failed to store score for {}: {}", self.player_name, e);
                self.world.send_message(&self.player_name, SAVE_FAILED_MESSAGE);
            }
        }
    }
}

impl RepeatingTask for GameTask {
    fn tick(&self) -> TickOutcome {
        if self.handle.is_cancelled() {
            return TickOutcome::Stopped;
        }

        let mut session = lock_session(&self.session);

        if session.run() != self.run {
            debug!("⏭️ Run {} of {} was superseded", self.run, self.player_name);
            self.handle.cancel();
            return TickOutcome::Stopped;
        }

        if !session.is_active() {
            debug!("⏹️ Run {} of {} is no longer active", self.run, self.player_name);
            self.handle.cancel();
            return TickOutcome::Stopped;
        }

        if session.remaining_time() <= 0 {
            if !self.handle.cancel() {
                return TickOutcome::Stopped;
            }
            let leftovers = session.finalize();
            let score = session.score();
            drop(session);

            self.finish(score, leftovers);
            return TickOutcome::Stopped;
        }

        if let Some(entity_id) = self.spawn_enemy() {
            session.track(entity_id);
        }
        session.advance(self.rules.time_step);
        TickOutcome::Continue
    }

    fn handle(&self) -> TaskHandle {
        self.handle.clone()
    }

    fn name(&self) -> &str {
        "enemy_down_game"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionPhase, SessionRegistry};
    use crate::store::MemoryScoreStore;
    use arena_event_system::{InMemoryWorld, Position};

    struct Fixture {
        world: Arc<InMemoryWorld>,
        store: Arc<MemoryScoreStore>,
        registry: SessionRegistry,
        rng: Arc<SpawnRng>,
        rules: GameRules,
    }

    impl Fixture {
        fn new() -> Self {
            let world = Arc::new(InMemoryWorld::new());
            world.join_player("Alice", Position::new(0.0, 64.0, 0.0));
            Self {
                world,
                store: Arc::new(MemoryScoreStore::new()),
                registry: SessionRegistry::new(),
                rng: Arc::new(SpawnRng::seeded(1)),
                rules: GameRules::default(),
            }
        }

        fn start(&self, difficulty: Difficulty) -> GameTask {
            let started = self
                .registry
                .start_run("Alice", difficulty, &self.rules, self.world.as_ref());
            self.task_for(started, difficulty)
        }

        fn task_for(&self, started: StartedRun, difficulty: Difficulty) -> GameTask {
            GameTask::new(
                "Alice",
                started,
                difficulty,
                self.rules,
                self.world.clone(),
                self.store.clone(),
                self.rng.clone(),
            )
        }
    }

    #[test]
    fn test_each_tick_spawns_and_burns_time() {
        let fx = Fixture::new();
        let task = fx.start(Difficulty::Normal);

        for expected in [15, 10, 5, 0] {
            assert_eq!(task.tick(), TickOutcome::Continue);
            let session = fx.registry.snapshot("Alice").unwrap();
            assert_eq!(session.remaining_time(), expected);
            assert_eq!(session.phase(), SessionPhase::Active);
        }

        assert_eq!(fx.world.entity_count(), 4);
        assert_eq!(fx.registry.snapshot("Alice").unwrap().spawned_count(), 4);
        assert!(fx.store.select_all().unwrap().is_empty());
    }

    #[test]
    fn test_finalize_happens_once() {
        let fx = Fixture::new();
        let task = fx.start(Difficulty::Easy);

        for _ in 0..4 {
            task.tick();
        }
        assert_eq!(task.tick(), TickOutcome::Stopped);
        assert_eq!(task.tick(), TickOutcome::Stopped);
        assert_eq!(task.tick(), TickOutcome::Stopped);

        let records = fx.store.select_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].player_name, "Alice");
        assert_eq!(records[0].difficulty, "easy");
        assert_eq!(fx.world.titles("Alice").len(), 1);
        assert_eq!(fx.world.entity_count(), 0);
        assert!(task.is_cancelled());

        let session = fx.registry.snapshot("Alice").unwrap();
        assert_eq!(session.phase(), SessionPhase::Finalized);
        assert_eq!(session.spawned_count(), 0);
    }

    #[test]
    fn test_game_over_title_shows_score() {
        let fx = Fixture::new();
        let task = fx.start(Difficulty::Hard);
        lock_session(&fx.registry.get("Alice").unwrap()).add_score(30);

        while task.tick() == TickOutcome::Continue {}

        let titles = fx.world.titles("Alice");
        assert_eq!(titles[0].title, GAME_OVER_TITLE);
        assert_eq!(titles[0].subtitle, "Alice total 30 points!");
        assert_eq!(titles[0].timings, GAME_OVER_TIMINGS);
        assert_eq!(fx.store.select_all().unwrap()[0].score, 30);
    }

    #[test]
    fn test_store_failure_still_finalizes() {
        let fx = Fixture::new();
        fx.store.set_unavailable(true);
        let task = fx.start(Difficulty::Easy);

        while task.tick() == TickOutcome::Continue {}

        assert_eq!(fx.registry.snapshot("Alice").unwrap().phase(), SessionPhase::Finalized);
        assert_eq!(fx.world.messages("Alice"), vec![SAVE_FAILED_MESSAGE.to_string()]);
        assert_eq!(task.tick(), TickOutcome::Stopped);
        assert_eq!(fx.world.messages("Alice").len(), 1);
    }

    #[test]
    fn test_superseded_task_stops_quietly() {
        let fx = Fixture::new();
        let old = fx.start(Difficulty::Easy);
        old.tick();
        let new = fx.start(Difficulty::Hard);

        assert_eq!(old.tick(), TickOutcome::Stopped);
        assert_eq!(fx.registry.snapshot("Alice").unwrap().remaining_time(), 20);

        assert_eq!(new.tick(), TickOutcome::Continue);
        assert_eq!(fx.registry.snapshot("Alice").unwrap().remaining_time(), 15);
        assert!(fx.store.select_all().unwrap().is_empty());
    }

    #[test]
    fn test_abandoned_run_stops_even_with_unregistered_handle() {
        let fx = Fixture::new();
        let started = fx
            .registry
            .start_run("Alice", Difficulty::Hard, &fx.rules, fx.world.as_ref());
        let detached = StartedRun {
            handle: TaskHandle::new(),
            ..started
        };
        let task = fx.task_for(detached, Difficulty::Hard);
        assert_eq!(task.tick(), TickOutcome::Continue);

        assert_eq!(fx.registry.abandon_all(fx.world.as_ref()), 1);
        assert!(!task.is_cancelled());

        assert_eq!(task.tick(), TickOutcome::Stopped);
        assert!(task.is_cancelled());
        for _ in 0..5 {
            assert_eq!(task.tick(), TickOutcome::Stopped);
        }
        assert_eq!(fx.world.entity_count(), 0);
        assert!(fx.store.select_all().unwrap().is_empty());
        assert!(fx.world.titles("Alice").is_empty());
    }

    #[test]
    fn test_shutdown_after_interleaved_starts_persists_nothing() {
        let fx = Fixture::new();
        let first = fx
            .registry
            .start_run("Alice", Difficulty::Easy, &fx.rules, fx.world.as_ref());
        let second = fx
            .registry
            .start_run("Alice", Difficulty::Hard, &fx.rules, fx.world.as_ref());
        let second_task = fx.task_for(second, Difficulty::Hard);
        let first_task = fx.task_for(first, Difficulty::Easy);

        assert!(first_task.is_cancelled());
        assert_eq!(second_task.tick(), TickOutcome::Continue);

        assert_eq!(fx.registry.abandon_all(fx.world.as_ref()), 1);
        assert!(second_task.is_cancelled());
        while second_task.tick() == TickOutcome::Continue {}

        assert_eq!(fx.registry.snapshot("Alice").unwrap().phase(), SessionPhase::Idle);
        assert_eq!(fx.world.entity_count(), 0);
        assert!(fx.store.select_all().unwrap().is_empty());
    }

    #[test]
    fn test_spawn_failure_still_burns_time() {
        let fx = Fixture::new();
        fx.world.set_reject_spawns(true);
        let task = fx.start(Difficulty::Hard);

        assert_eq!(task.tick(), TickOutcome::Continue);
        let session = fx.registry.snapshot("Alice").unwrap();
        assert_eq!(session.remaining_time(), 15);
        assert_eq!(session.spawned_count(), 0);
    }

    #[test]
    fn test_spawns_land_near_player() {
        let fx = Fixture::new();
        fx.world.set_player_position("Alice", Position::new(100.0, 70.0, -100.0));
        let task = fx.start(Difficulty::Hard);

        for _ in 0..4 {
            task.tick();
        }

        for (_, entity) in fx.world.entities() {
            assert!((90.0..=109.0).contains(&entity.position.x));
            assert!((-110.0..=-91.0).contains(&entity.position.z));
            assert_eq!(entity.position.y, 70.0);
        }
    }
}
