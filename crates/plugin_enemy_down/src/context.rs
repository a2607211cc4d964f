//! Shared collaborators of the EnemyDown plugin.

use crate::session::{GameRules, SessionRegistry};
use crate::spawn::SpawnRng;
use crate::store::ScoreStore;
use arena_event_system::{ArenaWorld, Scheduler};
use std::sync::Arc;

/// Everything the command, the game tasks and the event handlers share.
///
/// Cloning is cheap; every field is reference counted or `Copy`.
#[derive(Debug, Clone)]
pub struct EnemyDownContext {
    pub world: Arc<dyn ArenaWorld>,
    pub scheduler: Arc<dyn Scheduler>,
    pub store: Arc<dyn ScoreStore>,
    pub registry: Arc<SessionRegistry>,
    pub rng: Arc<SpawnRng>,
    pub rules: GameRules,
}

impl EnemyDownContext {
    /// Builds a context with a fresh registry and default rules.
    pub fn new(
        world: Arc<dyn ArenaWorld>,
        scheduler: Arc<dyn Scheduler>,
        store: Arc<dyn ScoreStore>,
        rng: SpawnRng,
    ) -> Self {
        Self {
            world,
            scheduler,
            store,
            registry: Arc::new(SessionRegistry::new()),
            rng: Arc::new(rng),
            rules: GameRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: GameRules) -> Self {
        self.rules = rules;
        self
    }
}
