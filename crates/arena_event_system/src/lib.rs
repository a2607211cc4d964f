//! # Arena Event System
//!
//! Host-side infrastructure for the EnemyDown arena server: the contracts a
//! game plugin consumes and the in-process implementations the server ships
//! with.
//!
//! ## Overview
//!
//! - [`types`] - entity identifiers, positions, enemy kinds
//! - [`events`] / [`system`] - typed host events and the [`EventSystem`] bus
//! - [`context`] - the [`ArenaWorld`] trait plugins use to act on the world
//! - [`world`] - [`InMemoryWorld`], a complete world kept in memory
//! - [`scheduler`] - [`Scheduler`] with tokio-driven and manual implementations
//! - [`plugin`] - the [`SimplePlugin`] lifecycle
//! - [`shutdown`] - shared [`ShutdownState`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arena_event_system::*;
//!
//! # async fn example() -> Result<(), EventError> {
//! let events = create_event_system();
//! events.on_core("entity_death", |event: EntityDeathEvent| {
//!     println!("{} died", event.entity_id);
//!     Ok(())
//! }).await?;
//!
//! let world = InMemoryWorld::new();
//! let id = world.insert_entity(EnemyKind::WeakMelee, Position::default());
//! if let Some(death) = world.kill_entity(id, Some("Alice")) {
//!     events.emit_core("entity_death", &death).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod events;
pub mod plugin;
pub mod scheduler;
pub mod shutdown;
pub mod system;
pub mod types;
pub mod world;

pub use context::{ArenaWorld, WorldError};
pub use events::{EntityDeathEvent, Event, EventError, EventHandler, PlayerJoinedEvent, TypedEventHandler};
pub use plugin::{PluginError, SimplePlugin};
pub use scheduler::{ManualScheduler, RepeatingTask, Scheduler, TaskHandle, TickOutcome, TokioScheduler};
pub use shutdown::ShutdownState;
pub use system::{create_event_system, EventSystem, EventSystemStats};
pub use types::{EnemyKind, EntityId, Position, TitleTimings};
pub use world::InMemoryWorld;

/// Event name under which the host publishes [`EntityDeathEvent`]s.
pub const ENTITY_DEATH_EVENT: &str = "entity_death";

/// Event name under which the host publishes [`PlayerJoinedEvent`]s.
pub const PLAYER_JOINED_EVENT: &str = "player_joined";

// Re-export commonly used external types
pub use async_trait::async_trait;
