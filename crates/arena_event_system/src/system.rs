//! Core EventSystem implementation.
//!
//! Handlers are stored per event key (`core:<name>`) in a `DashMap`, so
//! registration and emission never contend on a global lock. Emission
//! serializes the event once and runs every handler for the key concurrently.

use crate::events::{Event, EventError, EventHandler, TypedEventHandler};
use dashmap::DashMap;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Statistics about the event system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventSystemStats {
    /// Total number of registered event handlers
    pub total_handlers: usize,
    /// Total number of events emitted that reached at least one handler
    pub events_emitted: u64,
    /// Events emitted with no handler registered for their key
    pub events_unhandled: u64,
    /// Handler invocations that returned an error
    pub handler_failures: u64,
}

/// The central hub routing host events to plugin handlers.
pub struct EventSystem {
    handlers: DashMap<String, Vec<Arc<dyn EventHandler>>>,
    stats: RwLock<EventSystemStats>,
}

impl std::fmt::Debug for EventSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSystem")
            .field("handlers", &self.handlers.len())
            .field("stats", &"[stats]")
            .finish()
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSystem {
    /// Creates a new event system with no registered handlers.
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
            stats: RwLock::new(EventSystemStats::default()),
        }
    }

    /// Registers a handler for a core host event.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use arena_event_system::{EntityDeathEvent, EventSystem};
    ///
    /// # async fn example(events: &EventSystem) -> Result<(), arena_event_system::EventError> {
    /// events.on_core("entity_death", |event: EntityDeathEvent| {
    ///     println!("{} died", event.entity_id);
    ///     Ok(())
    /// }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn on_core<T, F>(&self, event_name: &str, handler: F) -> Result<(), EventError>
    where
        T: Event + 'static,
        F: Fn(T) -> Result<(), EventError> + Send + Sync + 'static,
    {
        let event_key = format!("core:{event_name}");
        let handler_name = format!("{}::{}", event_key, T::type_name());
        let handler: Arc<dyn EventHandler> = Arc::new(TypedEventHandler::new(handler_name, handler));

        self.handlers
            .entry(event_key.clone())
            .or_default()
            .push(handler);

        let mut stats = self.stats.write().await;
        stats.total_handlers += 1;

        info!("📝 Registered handler for {}", event_key);
        Ok(())
    }

    /// Emits a core host event to every handler registered for it.
    ///
    /// Handler failures are logged and counted; they never fail the emit.
    pub async fn emit_core<T>(&self, event_name: &str, event: &T) -> Result<(), EventError>
    where
        T: Event,
    {
        let event_key = format!("core:{event_name}");
        let data: Arc<[u8]> = Arc::from(event.serialize()?);

        // Clone the handler list so no map guard is held across an await.
        let event_handlers = self.handlers.get(&event_key).map(|entry| entry.value().clone());

        let Some(event_handlers) = event_handlers else {
            debug!("No handlers for event: {}", event_key);
            self.stats.write().await.events_unhandled += 1;
            return Ok(());
        };

        debug!("📤 Emitting {} to {} handlers", event_key, event_handlers.len());

        let mut futures = FuturesUnordered::new();
        for handler in event_handlers.iter() {
            let data = data.clone();
            futures.push(async move {
                match handler.handle(&data[..]).await {
                    Ok(()) => true,
                    Err(e) => {
                        error!("❌ Handler {} failed: {}", handler.handler_name(), e);
                        false
                    }
                }
            });
        }

        let mut failures = 0u64;
        while let Some(ok) = futures.next().await {
            if !ok {
                failures += 1;
            }
        }

        let mut stats = self.stats.write().await;
        stats.events_emitted += 1;
        stats.handler_failures += failures;
        Ok(())
    }

    /// Returns a snapshot of the current statistics.
    pub async fn get_stats(&self) -> EventSystemStats {
        self.stats.read().await.clone()
    }
}

/// Creates a shared event system ready for plugin registration.
pub fn create_event_system() -> Arc<EventSystem> {
    Arc::new(EventSystem::new())
}
