//! Difficulty levels and the enemy/points tables that hang off them.

use arena_event_system::EnemyKind;
use serde::{Deserialize, Serialize};

pub const EASY: &str = "easy";
pub const NORMAL: &str = "normal";
pub const HARD: &str = "hard";

const EASY_ENEMIES: &[EnemyKind] = &[EnemyKind::WeakMelee];
const NORMAL_ENEMIES: &[EnemyKind] = &[EnemyKind::WeakMelee, EnemyKind::RangedUndead];
const HARD_ENEMIES: &[EnemyKind] = &[EnemyKind::WeakMelee, EnemyKind::RangedUndead, EnemyKind::Caster];

/// Difficulty chosen when a run is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    /// Parses a command token. Matching is exact and case-sensitive:
    /// `"HARD"` is not a difficulty.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            EASY => Some(Difficulty::Easy),
            NORMAL => Some(Difficulty::Normal),
            HARD => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// The token stored in score records.
    pub fn token(&self) -> &'static str {
        match self {
            Difficulty::Easy => EASY,
            Difficulty::Normal => NORMAL,
            Difficulty::Hard => HARD,
        }
    }

    /// Enemy kinds a run at this difficulty draws from, each equally likely.
    pub fn candidates(&self) -> &'static [EnemyKind] {
        match self {
            Difficulty::Easy => EASY_ENEMIES,
            Difficulty::Normal => NORMAL_ENEMIES,
            Difficulty::Hard => HARD_ENEMIES,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Points awarded for killing an arena enemy of the given kind.
pub fn points_for(kind: &EnemyKind) -> u32 {
    match kind {
        EnemyKind::WeakMelee => 10,
        EnemyKind::RangedUndead | EnemyKind::Caster => 20,
        EnemyKind::Other(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_roundtrip() {
        for difficulty in Difficulty::ALL {
            assert_eq!(Difficulty::from_token(difficulty.token()), Some(difficulty));
        }
    }

    #[test]
    fn test_tokens_are_case_sensitive() {
        assert_eq!(Difficulty::from_token("HARD"), None);
        assert_eq!(Difficulty::from_token("Easy"), None);
        assert_eq!(Difficulty::from_token("expert"), None);
        assert_eq!(Difficulty::from_token(""), None);
    }

    #[test]
    fn test_candidate_tables() {
        assert_eq!(Difficulty::Easy.candidates(), &[EnemyKind::WeakMelee]);
        assert_eq!(
            Difficulty::Normal.candidates(),
            &[EnemyKind::WeakMelee, EnemyKind::RangedUndead]
        );
        assert_eq!(Difficulty::Hard.candidates().len(), 3);
        assert!(Difficulty::Hard.candidates().contains(&EnemyKind::Caster));
    }

    #[test]
    fn test_points() {
        assert_eq!(points_for(&EnemyKind::WeakMelee), 10);
        assert_eq!(points_for(&EnemyKind::RangedUndead), 20);
        assert_eq!(points_for(&EnemyKind::Caster), 20);
        assert_eq!(points_for(&EnemyKind::Other("cow".to_string())), 0);
    }
}
