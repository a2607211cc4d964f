//! # Core Type Definitions
//!
//! Fundamental types shared between the host world and arena plugins.
//!
//! ## Key Types
//!
//! - [`EntityId`] - Unique identifier for an entity living in the host world
//! - [`Position`] - 3D position with double precision
//! - [`EnemyKind`] - The kinds of enemies the host knows how to materialize
//! - [`TitleTimings`] - Fade timings for on-screen titles
//!
//! All types serialize to JSON so they can travel inside events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an entity in the host world.
///
/// Wraps a UUID so entity handles cannot be confused with other identifiers.
///
/// # Examples
///
/// ```rust
/// use arena_event_system::EntityId;
///
/// let id = EntityId::new();
/// let parsed: EntityId = id.to_string().parse()?;
/// assert_eq!(id, parsed);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Creates a new random entity ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::str::FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a 3D position in the game world.
///
/// `y` is the vertical axis; `x` and `z` span the horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate (east-west axis)
    pub x: f64,
    /// Y coordinate (vertical axis)
    pub y: f64,
    /// Z coordinate (north-south axis)
    pub z: f64,
}

impl Position {
    /// Creates a new position with the specified coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns this position shifted on the horizontal plane.
    pub fn offset_horizontal(&self, dx: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.y, self.z + dz)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// Kind of a living entity as reported by the host world.
///
/// The first three variants are the enemies an arena run can spawn. Anything
/// else the host reports (animals, villagers, other players' pets) arrives as
/// [`EnemyKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Slow close-range attacker
    WeakMelee,
    /// Undead archer
    RangedUndead,
    /// Potion-throwing spellcaster
    Caster,
    /// Any entity kind that is not an arena enemy
    Other(String),
}

impl std::fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnemyKind::WeakMelee => write!(f, "weak_melee"),
            EnemyKind::RangedUndead => write!(f, "ranged_undead"),
            EnemyKind::Caster => write!(f, "caster"),
            EnemyKind::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Fade timings (in host ticks) for an on-screen title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleTimings {
    pub fade_in: u32,
    pub stay: u32,
    pub fade_out: u32,
}

impl TitleTimings {
    pub const fn new(fade_in: u32, stay: u32, fade_out: u32) -> Self {
        Self { fade_in, stay, fade_out }
    }
}
