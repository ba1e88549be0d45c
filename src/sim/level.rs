//! Level configuration table
//!
//! Levels are 1-based. An index past the table means every level has been
//! completed.

use serde::{Deserialize, Serialize};

use super::entity::{EnemyKind, PlayerMode};

/// Resource targets for a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGoals {
    pub water: u32,
    pub fertilizer: u32,
}

/// Enemy spawning for a level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnConfig {
    /// Seconds between timed respawns
    pub interval: f64,
    pub kind: EnemyKind,
    /// Population cap for timed respawns
    pub cap: usize,
    /// Enemies placed at level start
    pub initial_count: usize,
}

/// Everything that varies between levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub number: u32,
    /// Present on resource levels
    pub goals: Option<ResourceGoals>,
    pub spawn: Option<SpawnConfig>,
    pub player_mode: PlayerMode,
    pub has_boss: bool,
}

impl LevelConfig {
    /// Resource levels complete on goals and allow collectible drops
    pub fn is_resource_level(&self) -> bool {
        self.goals.is_some()
    }
}

/// Number of configured levels
pub const LEVEL_COUNT: u32 = 5;

/// Look up a level, `None` once past the last one
pub fn level_config(number: u32) -> Option<LevelConfig> {
    let resource = |water, fertilizer, interval, kind, cap, initial_count| LevelConfig {
        number,
        goals: Some(ResourceGoals { water, fertilizer }),
        spawn: Some(SpawnConfig {
            interval,
            kind,
            cap,
            initial_count,
        }),
        player_mode: PlayerMode::Lane,
        has_boss: false,
    };

    match number {
        1 => Some(resource(3, 2, 2.0, EnemyKind::Slow, 8, 2)),
        2 => Some(resource(5, 3, 1.5, EnemyKind::Slow, 8, 3)),
        3 => Some(resource(8, 5, 1.0, EnemyKind::Fast, 8, 3)),
        4 => Some(resource(12, 8, 0.7, EnemyKind::Faster, 12, 4)),
        5 => Some(LevelConfig {
            number,
            goals: None,
            spawn: None,
            player_mode: PlayerMode::Free,
            has_boss: true,
        }),
        _ => None,
    }
}
