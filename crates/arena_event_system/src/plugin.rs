//! # Plugin Interface
//!
//! Arena games are delivered as plugins implementing [`SimplePlugin`]. The
//! server drives every plugin through the same lifecycle:
//!
//! 1. **Creation** - the plugin is constructed with its collaborators
//! 2. **Handler Registration** - `register_handlers()` subscribes to host events
//! 3. **Initialization** - `on_init()` for anything that needs the handlers live
//! 4. **Operation** - the plugin reacts to events and commands
//! 5. **Shutdown** - `on_shutdown()` releases resources

use crate::events::EventError;
use crate::system::EventSystem;
use async_trait::async_trait;
use std::sync::Arc;

/// Safe, high-level plugin trait.
#[async_trait]
pub trait SimplePlugin: Send + Sync + 'static {
    /// Returns the name of this plugin, unique across the server.
    fn name(&self) -> &str;

    /// Returns the version string of this plugin.
    fn version(&self) -> &str;

    /// Registers event handlers. Called once, before `on_init()`.
    async fn register_handlers(&mut self, events: Arc<EventSystem>) -> Result<(), PluginError>;

    /// Called after handler registration.
    async fn on_init(&mut self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called once when the server shuts down.
    async fn on_shutdown(&mut self) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Plugin lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Event registration or dispatch failed
    #[error("Event error: {0}")]
    Event(#[from] EventError),
}
