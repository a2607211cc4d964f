//! Spawn placement and enemy selection.
//!
//! All randomness goes through one [`SpawnRng`] per plugin so a fixed seed
//! reproduces a whole session's spawns.

use crate::difficulty::Difficulty;
use arena_event_system::{EnemyKind, Position};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::{Mutex, PoisonError};

/// Shared, seedable random source for spawning.
#[derive(Debug)]
pub struct SpawnRng {
    inner: Mutex<ChaCha8Rng>,
}

impl SpawnRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: Mutex::new(ChaCha8Rng::from_entropy()),
        }
    }

    /// Runs `f` with exclusive access to the generator.
    pub fn with<T>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> T) -> T {
        let mut rng = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

/// Random horizontal offset, each axis in `[-spread, spread - 1]`.
///
/// A non-positive spread places the spawn on the origin.
pub fn spawn_offset<R: Rng + ?Sized>(rng: &mut R, spread: i32) -> (i32, i32) {
    if spread <= 0 {
        return (0, 0);
    }
    let dx = rng.gen_range(-spread..spread);
    let dz = rng.gen_range(-spread..spread);
    (dx, dz)
}

/// A spawn location near `origin`, at the same height.
pub fn spawn_location<R: Rng + ?Sized>(rng: &mut R, origin: Position, spread: i32) -> Position {
    let (dx, dz) = spawn_offset(rng, spread);
    origin.offset_horizontal(f64::from(dx), f64::from(dz))
}

/// Picks an enemy uniformly from the difficulty's candidate table.
pub fn pick_enemy<R: Rng + ?Sized>(rng: &mut R, difficulty: Difficulty) -> EnemyKind {
    difficulty
        .candidates()
        .choose(rng)
        .cloned()
        .unwrap_or(EnemyKind::WeakMelee)
}
