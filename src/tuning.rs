//! Game balance table
//!
//! Every number that shapes play lives here so a run can be re-balanced
//! without touching the simulation. Speeds are pixels/second, durations are
//! seconds of simulated time.

use serde::{Deserialize, Serialize};

use crate::sim::entity::EnemyKind;

/// Smallest side length any entity may have
const MIN_SIZE: f32 = 1.0;

/// Per-kind enemy stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Side length of the square bounds
    pub size: f32,
    /// Speed magnitude (sign comes from spawn side)
    pub speed: f32,
    /// Starting health
    pub health: i32,
}

/// Boss stats and attack pattern timings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossTuning {
    pub size: f32,
    pub health: u32,
    /// Horizontal entry speed
    pub entry_speed: f32,
    /// Vertical patrol speed as a fraction of entry speed
    pub patrol_speed_factor: f32,
    /// Entry stop point as a fraction of play width
    pub stop_fraction: f32,
    /// Vertical patrol band as fractions of play height
    pub band_top_fraction: f32,
    pub band_bottom_fraction: f32,

    // === Normal fire ===
    pub fire_cooldown: f64,
    pub spread_count_min: u32,
    pub spread_count_max: u32,
    pub spread_degrees_min: f32,
    pub spread_degrees_max: f32,

    // === Special attack ===
    pub special_interval: f64,
    pub special_duration: f64,
    /// Delay from level start to the first special attack
    pub first_special_delay: f64,
    pub burst_count_min: u32,
    pub burst_count_max: u32,
    /// Burst speed as a fraction of enemy projectile speed
    pub burst_speed_factor: f32,
    /// Chance per tick of a random barrage while the special attack runs
    pub barrage_chance: f64,
    pub barrage_count_min: u32,
    pub barrage_count_max: u32,
    pub barrage_speed_factor: f32,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            size: 70.0,
            health: 80,
            entry_speed: 72.0,
            patrol_speed_factor: 0.5,
            stop_fraction: 0.75,
            band_top_fraction: 0.1,
            band_bottom_fraction: 0.9,

            fire_cooldown: 1.0,
            spread_count_min: 3,
            spread_count_max: 7,
            spread_degrees_min: 25.0,
            spread_degrees_max: 74.0,

            special_interval: 10.0,
            special_duration: 3.5,
            first_special_delay: 5.0,
            burst_count_min: 12,
            burst_count_max: 24,
            burst_speed_factor: 0.65,
            barrage_chance: 1.0 / 3.0,
            barrage_count_min: 2,
            barrage_count_max: 4,
            barrage_speed_factor: 0.8,
        }
    }
}

/// How long each kind of feedback text stays up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackTuning {
    pub pickup: f64,
    pub boss_hit: f64,
    pub damage: f64,
    pub boss_attack: f64,
}

impl Default for FeedbackTuning {
    fn default() -> Self {
        Self {
            pickup: 1.5,
            boss_hit: 1.0,
            damage: 2.0,
            boss_attack: 1.5,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    // === Player ===
    pub player_size: f32,
    pub player_speed: f32,
    pub player_projectile_speed: f32,
    pub player_fire_cooldown: f64,
    /// How long the shoot animation window stays open after firing
    pub player_shoot_anim: f64,
    /// Gap between the flower's right edge and a lane player
    pub lane_gap: f32,

    // === Flower ===
    pub flower_size: f32,
    pub flower_x: f32,

    // === Enemies ===
    pub slow: EnemyStats,
    pub fast: EnemyStats,
    pub faster: EnemyStats,
    /// Margin used to keep spawn rows inside the play area
    pub enemy_base_size: f32,
    pub enemy_projectile_speed: f32,
    /// Delay from level start to the first timed respawn
    pub first_respawn_delay: f64,

    // === Projectiles ===
    pub projectile_size: f32,

    // === Collectibles ===
    pub collectible_size: f32,
    pub collectible_lifespan: f64,
    /// Chance that a killed enemy drops a collectible (resource levels only)
    pub drop_chance: f64,
    /// Collection zone inflation per side, in multiples of player width
    pub collection_zone_factor: f32,

    pub boss: BossTuning,
    pub feedback: FeedbackTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_size: 30.0,
            player_speed: 300.0,
            player_projectile_speed: 600.0,
            player_fire_cooldown: 0.3,
            player_shoot_anim: 0.5,
            lane_gap: 15.0,

            flower_size: 60.0,
            flower_x: 30.0,

            slow: EnemyStats {
                size: 32.0,
                speed: 90.0,
                health: 1,
            },
            fast: EnemyStats {
                size: 36.0,
                speed: 150.0,
                health: 1,
            },
            faster: EnemyStats {
                size: 40.0,
                speed: 210.0,
                health: 1,
            },
            enemy_base_size: 28.0,
            enemy_projectile_speed: 360.0,
            first_respawn_delay: 0.5,

            projectile_size: 8.0,

            collectible_size: 18.0,
            collectible_lifespan: 7.0,
            drop_chance: 0.40,
            collection_zone_factor: 25.0,

            boss: BossTuning::default(),
            feedback: FeedbackTuning::default(),
        }
    }
}

impl Tuning {
    /// Stats for an enemy kind
    pub fn enemy(&self, kind: EnemyKind) -> EnemyStats {
        match kind {
            EnemyKind::Slow => self.slow,
            EnemyKind::Fast => self.fast,
            EnemyKind::Faster => self.faster,
        }
    }

    /// Clamp values that would break invariants, warning about each one
    pub fn sanitized(mut self) -> Self {
        fix_size("player_size", &mut self.player_size);
        fix_size("flower_size", &mut self.flower_size);
        fix_size("enemy_base_size", &mut self.enemy_base_size);
        fix_size("projectile_size", &mut self.projectile_size);
        fix_size("collectible_size", &mut self.collectible_size);
        fix_size("boss.size", &mut self.boss.size);
        for stats in [&mut self.slow, &mut self.fast, &mut self.faster] {
            fix_size("enemy size", &mut stats.size);
        }
        if !(0.0..=1.0).contains(&self.drop_chance) {
            log::warn!("drop_chance {} out of range, clamping", self.drop_chance);
            self.drop_chance = self.drop_chance.clamp(0.0, 1.0);
        }
        if !(0.0..=1.0).contains(&self.boss.barrage_chance) {
            log::warn!(
                "barrage_chance {} out of range, clamping",
                self.boss.barrage_chance
            );
            self.boss.barrage_chance = self.boss.barrage_chance.clamp(0.0, 1.0);
        }
        if self.boss.health == 0 {
            log::warn!("boss health 0 would skip the boss fight, using 1");
            self.boss.health = 1;
        }
        for stats in [&mut self.slow, &mut self.fast, &mut self.faster] {
            if stats.health < 1 {
                log::warn!("enemy health {} below 1, using 1", stats.health);
                stats.health = 1;
            }
        }
        fix_range(
            "spread_count",
            &mut self.boss.spread_count_min,
            &mut self.boss.spread_count_max,
        );
        fix_range(
            "burst_count",
            &mut self.boss.burst_count_min,
            &mut self.boss.burst_count_max,
        );
        fix_range(
            "barrage_count",
            &mut self.boss.barrage_count_min,
            &mut self.boss.barrage_count_max,
        );
        if self.boss.spread_degrees_min > self.boss.spread_degrees_max {
            log::warn!("spread_degrees range inverted, swapping");
            std::mem::swap(
                &mut self.boss.spread_degrees_min,
                &mut self.boss.spread_degrees_max,
            );
        }
        self
    }
}

/// Sizes must be positive for spawn ranges and hit boxes to be non-empty
fn fix_size(name: &str, size: &mut f32) {
    if size.is_nan() || *size < MIN_SIZE {
        log::warn!("{name} {size} too small, using {MIN_SIZE}");
        *size = MIN_SIZE;
    }
}

fn fix_range(name: &str, min: &mut u32, max: &mut u32) {
    if *min == 0 {
        log::warn!("{name} minimum 0, using 1");
        *min = 1;
    }
    if *min > *max {
        log::warn!("{name} range inverted, swapping");
        std::mem::swap(min, max);
    }
}
