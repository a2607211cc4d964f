//! # Sessions and the Session Registry
//!
//! Every player owns at most one [`Session`], keyed by player name. A session
//! is reused across runs: starting a new run resets it in place instead of
//! creating a fresh record.
//!
//! ## Run Lifecycle
//!
//! ```text
//! Idle ──start──▶ Active ──tick (time ≤ 0)──▶ Finalized
//!                   ▲                              │
//!                   └────────────start─────────────┘
//! ```
//!
//! Each start bumps the session's run number. A game task remembers the run it
//! was created for, so a task left over from a superseded run can tell that the
//! session has moved on and stop without touching it.
//!
//! ## Thread Safety
//!
//! Sessions are mutated from scheduler ticks and from death-event handlers,
//! which may run on different runtime threads. Each session sits behind its own
//! `Mutex` and the registry is a `DashMap`, so two players never contend.

use crate::difficulty::Difficulty;
use arena_event_system::{ArenaWorld, EntityId, TaskHandle};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Shared handle to one player's session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Locks a session, recovering the data if a previous holder panicked.
pub fn lock_session(handle: &SessionHandle) -> MutexGuard<'_, Session> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

const SPAWN_SPREAD: i32 = 10;

/// Timing constants of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    /// Remaining time a run starts with
    pub duration: i32,
    /// Time removed by each spawning tick
    pub time_step: i32,
    /// Wall-clock time between ticks
    pub tick_interval: Duration,
    spawn_spread: i32,
}

impl GameRules {
    pub fn new(duration: i32, time_step: i32, tick_interval: Duration) -> Self {
        Self {
            duration,
            time_step,
            tick_interval,
            spawn_spread: SPAWN_SPREAD,
        }
    }

    /// Spawn offsets fall in `[-spawn_spread, spawn_spread - 1]` on each horizontal axis.
    pub fn spawn_spread(&self) -> i32 {
        self.spawn_spread
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self::new(20, 5, Duration::from_secs(5))
    }
}

/// Where a session is in its run lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Created but never started
    Idle,
    /// A run is in progress
    Active,
    /// The last run expired and its result was handed to the store
    Finalized,
}

/// One player's arena state.
#[derive(Debug, Clone)]
pub struct Session {
    player_name: String,
    score: u32,
    remaining_time: i32,
    phase: SessionPhase,
    difficulty: Option<Difficulty>,
    run: u64,
    started_at: Option<DateTime<Utc>>,
    spawned: HashSet<EntityId>,
    task: Option<TaskHandle>,
}

impl Session {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            score: 0,
            remaining_time: 0,
            phase: SessionPhase::Idle,
            difficulty: None,
            run: 0,
            started_at: None,
            spawned: HashSet::new(),
            task: None,
        }
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn remaining_time(&self) -> i32 {
        self.remaining_time
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    /// Run number; increases by one on every start.
    pub fn run(&self) -> u64 {
        self.run
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Whether `entity_id` was spawned by this session's current run.
    pub fn is_tracking(&self, entity_id: &EntityId) -> bool {
        self.spawned.contains(entity_id)
    }

    pub fn spawned_count(&self) -> usize {
        self.spawned.len()
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    /// Resets the session for a new run driven by the task behind `task`.
    ///
    /// Returns entities still tracked from the previous run so the caller can
    /// remove them from the world, and cancels the previous run's task.
    pub(crate) fn begin_run(&mut self, difficulty: Difficulty, duration: i32, task: TaskHandle) -> Vec<EntityId> {
        if let Some(previous) = self.task.replace(task) {
            previous.cancel();
        }
        self.run += 1;
        self.score = 0;
        self.remaining_time = duration;
        self.phase = SessionPhase::Active;
        self.difficulty = Some(difficulty);
        self.started_at = Some(Utc::now());
        self.spawned.drain().collect()
    }

    pub(crate) fn track(&mut self, entity_id: EntityId) {
        self.spawned.insert(entity_id);
    }

    /// Adds kill points and returns the new total.
    pub(crate) fn add_score(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    pub(crate) fn advance(&mut self, step: i32) {
        self.remaining_time -= step;
    }

    /// Locks the score and hands back every tracked entity for removal.
    pub(crate) fn finalize(&mut self) -> Vec<EntityId> {
        self.phase = SessionPhase::Finalized;
        self.task = None;
        self.spawned.drain().collect()
    }

    /// Stops an active run without recording a result.
    pub(crate) fn abandon(&mut self) -> Vec<EntityId> {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        if self.phase == SessionPhase::Active {
            self.phase = SessionPhase::Idle;
        }
        self.spawned.drain().collect()
    }
}

/// A run that has just been started.
///
/// `handle` is already registered on the session; the game task driving the
/// run must use it so a restart or shutdown can stop that task.
#[derive(Debug, Clone)]
pub struct StartedRun {
    pub session: SessionHandle,
    pub run: u64,
    pub handle: TaskHandle,
}

/// Registry of sessions, one per player name.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, SessionHandle>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the player's session, creating an idle one if needed.
    pub fn get_or_create(&self, player_name: &str) -> SessionHandle {
        self.sessions
            .entry(player_name.to_string())
            .or_insert_with(|| {
                debug!("🆕 Creating session for {}", player_name);
                Arc::new(Mutex::new(Session::new(player_name)))
            })
            .value()
            .clone()
    }

    /// Looks up a session without creating one.
    pub fn get(&self, player_name: &str) -> Option<SessionHandle> {
        self.sessions.get(player_name).map(|entry| entry.value().clone())
    }

    /// A copy of the player's session state.
    pub fn snapshot(&self, player_name: &str) -> Option<Session> {
        self.get(player_name).map(|handle| lock_session(&handle).clone())
    }

    /// Resets (or creates) the player's session for a new run.
    ///
    /// Score goes to 0, remaining time to `rules.duration`, the player's status
    /// effects are cleared, and any enemies left over from an interrupted run
    /// are removed from the world. The new run's task handle is installed
    /// under the same lock as the reset, so concurrent starts cannot leave a
    /// stale handle behind.
    pub fn start_run(
        &self,
        player_name: &str,
        difficulty: Difficulty,
        rules: &GameRules,
        world: &dyn ArenaWorld,
    ) -> StartedRun {
        let session = self.get_or_create(player_name);
        let handle = TaskHandle::new();
        let (run, leftovers) = {
            let mut guard = lock_session(&session);
            let leftovers = guard.begin_run(difficulty, rules.duration, handle.clone());
            (guard.run(), leftovers)
        };

        if !leftovers.is_empty() {
            debug!("🧹 Removing {} enemies from {}'s previous run", leftovers.len(), player_name);
        }
        for entity_id in leftovers {
            world.remove_entity(entity_id);
        }
        world.clear_status_effects(player_name);

        StartedRun { session, run, handle }
    }

    /// Abandons every active run; used on shutdown.
    ///
    /// Returns the number of runs that were stopped.
    pub fn abandon_all(&self, world: &dyn ArenaWorld) -> usize {
        let handles: Vec<SessionHandle> = self.sessions.iter().map(|entry| entry.value().clone()).collect();
        let mut stopped = 0;
        for handle in handles {
            let leftovers = {
                let mut session = lock_session(&handle);
                if !session.is_active() {
                    continue;
                }
                stopped += 1;
                session.abandon()
            };
            for entity_id in leftovers {
                world.remove_entity(entity_id);
            }
        }
        stopped
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
