//! Boss attack controller
//!
//! A timed state machine layered on the boss's motion:
//! `Approaching` (no fire) -> `NormalFire` <-> `SpecialAttack`.
//!
//! Normal fire aims an evenly spaced spread at the player every cooldown.
//! Once `special_interval` has passed since the last special attack *ended*,
//! the boss opens with a circular burst and then sprays random barrages
//! until the special attack's end time.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Projectile, ProjectileOwner, Rgb, palette};
use super::state::World;
use crate::tuning::Tuning;
use crate::{angle_between, polar_to_cartesian};

/// Attack controller state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackMode {
    /// Boss still entering; holds fire
    Approaching,
    /// Aimed spread on a cooldown
    NormalFire,
    /// Random barrages until `ends_at`
    SpecialAttack { ends_at: f64 },
}

/// Mode changes reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackTransition {
    SpecialStarted,
    SpecialEnded,
}

/// Boss attack timers and mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossAttack {
    pub mode: AttackMode,
    pub last_shot: Option<f64>,
    /// Clock reading when the last special attack ended
    pub last_special_end: f64,
}

impl BossAttack {
    /// Controller for a level starting at `now`; the first special attack is
    /// due `first_special_delay` later
    pub fn new(now: f64, tuning: &Tuning) -> Self {
        let bt = &tuning.boss;
        Self {
            mode: AttackMode::Approaching,
            last_shot: None,
            last_special_end: now - bt.special_interval + bt.first_special_delay,
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self.mode, AttackMode::SpecialAttack { .. })
    }

    /// Run one tick of the controller against the world's boss
    pub fn update(
        &mut self,
        world: &mut World,
        tuning: &Tuning,
        rng: &mut impl Rng,
        now: f64,
    ) -> Option<AttackTransition> {
        let (origin, entering) = match world.boss.as_ref() {
            Some(boss) => (boss.center(), boss.is_entering()),
            None => return None,
        };
        let bt = &tuning.boss;
        let base_speed = tuning.enemy_projectile_speed;

        match self.mode {
            AttackMode::Approaching => {
                if !entering {
                    self.mode = AttackMode::NormalFire;
                }
                None
            }
            AttackMode::SpecialAttack { ends_at } => {
                if now < ends_at {
                    if rng.random_bool(bt.barrage_chance) {
                        let count = rng.random_range(bt.barrage_count_min..=bt.barrage_count_max);
                        let speed = base_speed * bt.barrage_speed_factor;
                        for _ in 0..count {
                            let angle = rng.random_range(0.0..TAU);
                            fire(world, tuning, origin, angle, speed, palette::BOSS_BARRAGE);
                        }
                    }
                    None
                } else {
                    self.mode = AttackMode::NormalFire;
                    self.last_special_end = now;
                    log::debug!("Boss special attack ended");
                    Some(AttackTransition::SpecialEnded)
                }
            }
            AttackMode::NormalFire => {
                if now - self.last_special_end > bt.special_interval {
                    self.mode = AttackMode::SpecialAttack {
                        ends_at: now + bt.special_duration,
                    };
                    world.set_feedback("Boss Attack!", now, tuning.feedback.boss_attack);
                    let count = rng.random_range(bt.burst_count_min..=bt.burst_count_max);
                    circular_burst(world, tuning, origin, count, base_speed * bt.burst_speed_factor);
                    log::debug!("Boss special attack: burst of {count}");
                    return Some(AttackTransition::SpecialStarted);
                }

                if self.last_shot.is_none_or(|t| now - t > bt.fire_cooldown) {
                    let target = world.player.center();
                    let count = rng.random_range(bt.spread_count_min..=bt.spread_count_max);
                    let degrees = rng.random_range(bt.spread_degrees_min..=bt.spread_degrees_max);
                    aimed_spread(world, tuning, origin, target, count, degrees.to_radians());
                    self.last_shot = Some(now);
                }
                None
            }
        }
    }
}

/// Spawn one enemy projectile centred on `origin`
fn fire(world: &mut World, tuning: &Tuning, origin: Vec2, angle: f32, speed: f32, color: Rgb) {
    let size = tuning.projectile_size;
    let id = world.next_entity_id();
    world.enemy_projectiles.push(Projectile {
        id,
        pos: origin - Vec2::splat(size / 2.0),
        size,
        vel: polar_to_cartesian(speed, angle),
        color,
        owner: ProjectileOwner::Enemy,
    });
}

/// `count` shots evenly covering `spread` radians, bisected by the bearing
/// from `origin` to `target`
pub fn aimed_spread(
    world: &mut World,
    tuning: &Tuning,
    origin: Vec2,
    target: Vec2,
    count: u32,
    spread: f32,
) {
    let bearing = angle_between(origin, target);
    let start = bearing - spread / 2.0;
    let step = if count > 1 {
        spread / (count - 1) as f32
    } else {
        0.0
    };
    // A single shot goes straight down the bearing
    let start = if count > 1 { start } else { bearing };
    for k in 0..count {
        let angle = start + k as f32 * step;
        fire(
            world,
            tuning,
            origin,
            angle,
            tuning.enemy_projectile_speed,
            palette::BOSS_SPREAD,
        );
    }
}

/// `count` shots evenly spaced over the full circle
pub fn circular_burst(world: &mut World, tuning: &Tuning, origin: Vec2, count: u32, speed: f32) {
    for k in 0..count {
        let angle = k as f32 * TAU / count as f32;
        fire(world, tuning, origin, angle, speed, palette::BOSS_BURST);
    }
}
