//! # Event Handlers
//!
//! Handlers the plugin subscribes to on the host event bus:
//! - [`kill`] - credits arena kills to the killer's running session
//! - [`join`] - greets players with a hint on how to start a run
//!
//! Each handler is a plain function over the [`EnemyDownContext`](crate::EnemyDownContext)
//! so tests can call it directly without going through the bus.

pub mod join;
pub mod kill;

pub use join::*;
pub use kill::*;
