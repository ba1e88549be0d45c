//! Enemy spawn scheduler
//!
//! Two modes: an initial wave placed off the right edge at level start, and
//! timed respawns while the population is under the level's cap. Spawn
//! positions are always strictly outside the visible play area.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Enemy, PlayerMode};
use super::level::{LevelConfig, SpawnConfig};
use super::state::{GamePhase, World};
use crate::tuning::Tuning;

/// Horizontal gap between staggered initial-wave enemies (on top of base size)
const WAVE_STAGGER: f32 = 35.0;
/// Distance past the right edge of the first initial-wave enemy
const WAVE_OFFSET: f32 = 30.0;

/// Timed respawn bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnTimer {
    /// Clock reading of the last (possibly virtual) spawn
    pub last_spawn: f64,
}

impl SpawnTimer {
    /// Timer whose first respawn is due `first_respawn_delay` after `now`
    pub fn new(now: f64, spawn: Option<&SpawnConfig>, tuning: &Tuning) -> Self {
        let last_spawn = match spawn {
            Some(cfg) => now - cfg.interval + tuning.first_respawn_delay,
            None => now,
        };
        Self { last_spawn }
    }

    /// Strictly more than `interval` since the last spawn
    pub fn is_due(&self, now: f64, interval: f64) -> bool {
        now - self.last_spawn > interval
    }
}

/// Row for a new enemy: near the player's lane, or anywhere in a band
fn spawn_y(
    world: &World,
    mode: PlayerMode,
    lane_spread: f32,
    band_bottom: f32,
    tuning: &Tuning,
    rng: &mut impl Rng,
) -> f32 {
    let base = tuning.enemy_base_size;
    let y = match mode {
        PlayerMode::Lane => {
            let spread = world.player.size * lane_spread;
            world.player.pos.y + rng.random_range(-spread..spread)
        }
        PlayerMode::Free => {
            let bottom = band_bottom.max(base + 1.0);
            rng.random_range(base..bottom)
        }
    };
    let max = (world.area.bottom() - base * 2.0).max(base);
    y.clamp(base, max)
}

/// Place the level's initial wave off the right edge, all moving left
pub fn spawn_initial_wave(
    world: &mut World,
    cfg: &SpawnConfig,
    mode: PlayerMode,
    tuning: &Tuning,
    rng: &mut impl Rng,
) -> Vec<u32> {
    let stats = tuning.enemy(cfg.kind);
    let band_bottom = world.area.bottom() * 0.85;
    let mut ids = Vec::with_capacity(cfg.initial_count);
    for i in 0..cfg.initial_count {
        let y = spawn_y(world, mode, 1.5, band_bottom, tuning, rng);
        let x = world.area.right()
            + WAVE_OFFSET
            + i as f32 * (tuning.enemy_base_size + WAVE_STAGGER);
        let id = world.next_entity_id();
        world
            .enemies
            .push(Enemy::new(id, Vec2::new(x, y), cfg.kind, stats, true));
        ids.push(id);
    }
    log::debug!("Initial wave: {} x {:?}", cfg.initial_count, cfg.kind);
    ids
}

/// Timed respawn check. Returns the new enemy's ID if one spawned.
pub fn run_scheduler(
    phase: GamePhase,
    level: &LevelConfig,
    world: &mut World,
    timer: &mut SpawnTimer,
    tuning: &Tuning,
    rng: &mut impl Rng,
    now: f64,
) -> Option<u32> {
    if phase != GamePhase::Playing {
        return None;
    }
    let cfg = level.spawn?;
    if !timer.is_due(now, cfg.interval) || world.enemies.len() >= cfg.cap {
        return None;
    }

    let stats = tuning.enemy(cfg.kind);
    let mode = level.player_mode;
    let area = world.area;
    let y = spawn_y(
        world,
        mode,
        2.0,
        area.bottom() - tuning.enemy_base_size,
        tuning,
        rng,
    );
    let x = match mode {
        PlayerMode::Lane => area.right() + rng.random_range(20.0..120.0),
        PlayerMode::Free => {
            if rng.random_bool(0.5) {
                area.left() - stats.size - rng.random_range(20.0..100.0)
            } else {
                area.right() + rng.random_range(20.0..150.0)
            }
        }
    };

    // Travel toward the level's focus: the player in lanes, else the flower
    let target = match mode {
        PlayerMode::Lane => world.player.pos,
        PlayerMode::Free => world.flower.pos,
    };
    let leftward = x > target.x;

    let id = world.next_entity_id();
    world
        .enemies
        .push(Enemy::new(id, Vec2::new(x, y), cfg.kind, stats, leftward));
    timer.last_spawn = now;
    log::debug!("Spawned {:?} #{id} at ({x:.0}, {y:.0})", cfg.kind);
    Some(id)
}
