//! Entity models and their per-tick update rules
//!
//! Entities are plain state holders. Each kind exposes one `advance` step;
//! removal decisions (left the play area, expired) are reported back to the
//! caller, which owns the collections.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::tuning::{EnemyStats, Tuning};

/// RGB color handed to the renderer
pub type Rgb = [u8; 3];

/// Named colors used by the simulation
pub mod palette {
    use super::Rgb;

    pub const PLAYER: Rgb = [0, 255, 255];
    pub const PLAYER_SHOT: Rgb = [135, 206, 250];
    pub const CRIMSON: Rgb = [220, 20, 60];
    pub const DARK_ORANGE: Rgb = [255, 140, 0];
    pub const GOLD: Rgb = [255, 215, 0];
    pub const BOSS: Rgb = [139, 0, 139];
    pub const BOSS_SPREAD: Rgb = [255, 105, 180];
    pub const BOSS_BURST: Rgb = [199, 21, 133];
    pub const BOSS_BARRAGE: Rgb = [255, 69, 0];
    pub const WATER: Rgb = [135, 206, 250];
    pub const FERTILIZER: Rgb = [139, 69, 19];
}

// ---------------------------------------------------------------------------
// Flower
// ---------------------------------------------------------------------------

/// Flower health, degrading one step per damaging hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FlowerState {
    Healthy,
    Damaged,
    Broken,
    Dead,
}

impl FlowerState {
    /// The state after one more hit. `Dead` stays `Dead`.
    pub fn next_worse(self) -> Self {
        match self {
            FlowerState::Healthy => FlowerState::Damaged,
            FlowerState::Damaged => FlowerState::Broken,
            FlowerState::Broken | FlowerState::Dead => FlowerState::Dead,
        }
    }

    /// Tint the renderer uses when no sprite is available
    pub fn color(self) -> Rgb {
        match self {
            FlowerState::Healthy => [144, 238, 144],
            FlowerState::Damaged => [255, 255, 150],
            FlowerState::Broken => [210, 180, 140],
            FlowerState::Dead => [100, 100, 100],
        }
    }
}

/// The objective being protected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flower {
    pub pos: Vec2,
    pub size: f32,
    pub state: FlowerState,
}

impl Flower {
    pub fn new(pos: Vec2, size: f32) -> Self {
        Self {
            pos,
            size,
            state: FlowerState::Healthy,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::square(self.pos, self.size)
    }

    /// Apply one damage step and return the new state
    pub fn take_damage(&mut self) -> FlowerState {
        self.state = self.state.next_worse();
        self.state
    }

    pub fn is_dead(&self) -> bool {
        self.state == FlowerState::Dead
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// How the player may move on the current level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerMode {
    /// Held in place beside the flower; movement input is ignored
    Lane,
    /// Free 2-axis movement
    Free,
}

/// The guardian
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
    pub mode: PlayerMode,
    /// End of the shoot animation window, if one is open
    pub shooting_until: Option<f64>,
}

impl Player {
    pub fn new(pos: Vec2, size: f32, speed: f32, mode: PlayerMode) -> Self {
        Self {
            pos,
            size,
            speed,
            mode,
            shooting_until: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::square(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    /// Move by per-axis input (each of -1, 0, +1) and clamp into `area`.
    /// A lane player stays where the level placed it.
    pub fn advance(&mut self, move_x: i8, move_y: i8, dt: f32, area: &Rect) {
        if self.mode == PlayerMode::Lane {
            return;
        }
        let dir = Vec2::new(move_x.signum() as f32, move_y.signum() as f32);
        let next = self.pos + dir * self.speed * dt;
        self.pos = area.clamp_inside(next, Vec2::splat(self.size));
    }

    /// Open the shoot animation window unless one is already running
    pub fn trigger_shoot_animation(&mut self, now: f64, window: f64) {
        if !self.is_shooting(now) {
            self.shooting_until = Some(now + window);
        }
    }

    pub fn is_shooting(&self, now: f64) -> bool {
        self.shooting_until.is_some_and(|end| now < end)
    }
}

// ---------------------------------------------------------------------------
// Enemy
// ---------------------------------------------------------------------------

/// Enemy types, ordered by speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Slow,
    Fast,
    Faster,
}

impl EnemyKind {
    pub fn color(self) -> Rgb {
        match self {
            EnemyKind::Slow => palette::CRIMSON,
            EnemyKind::Fast => palette::DARK_ORANGE,
            EnemyKind::Faster => palette::GOLD,
        }
    }
}

/// A horizontally moving adversary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    /// Signed horizontal speed; negative travels left
    pub speed: f32,
    pub kind: EnemyKind,
    pub health: i32,
}

impl Enemy {
    /// Create an enemy travelling left (`leftward`) or right
    pub fn new(id: u32, pos: Vec2, kind: EnemyKind, stats: EnemyStats, leftward: bool) -> Self {
        let speed = if leftward {
            -stats.speed.abs()
        } else {
            stats.speed.abs()
        };
        Self {
            id,
            pos,
            size: stats.size,
            speed,
            kind,
            health: stats.health.max(1),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::square(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    /// Pure horizontal approach, no vertical tracking
    pub fn advance(&mut self, dt: f32) {
        self.pos.x += self.speed * dt;
    }

    /// True once the enemy is well past the edge it is travelling toward
    pub fn has_left_play(&self, play_width: f32) -> bool {
        let margin = self.size * 1.5;
        if self.speed < 0.0 {
            self.pos.x < -margin
        } else {
            self.pos.x > play_width + margin
        }
    }
}

// ---------------------------------------------------------------------------
// Boss
// ---------------------------------------------------------------------------

/// Boss motion phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossMotion {
    /// Sliding in from the right toward the stop point
    Entering,
    /// Random vertical patrol inside the safe band
    Patrolling,
}

/// The level boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    pub health: u32,
    pub max_health: u32,
    pub entry_speed: f32,
    pub patrol_speed: f32,
    pub stop_x: f32,
    pub band_min: f32,
    pub band_max: f32,
    pub target_y: f32,
    pub motion: BossMotion,
}

impl Boss {
    /// Create the boss just off the right edge of `area`
    pub fn new(id: u32, tuning: &Tuning, area: &Rect, rng: &mut impl Rng) -> Self {
        let bt = &tuning.boss;
        let size = bt.size;
        let pos = Vec2::new(area.right() + size + 20.0, area.center().y - size / 2.0);
        let band_min = area.top() + area.size.y * bt.band_top_fraction;
        let band_max = (area.top() + area.size.y * bt.band_bottom_fraction - size).max(band_min);
        let mut boss = Self {
            id,
            pos,
            size,
            health: bt.health,
            max_health: bt.health,
            entry_speed: bt.entry_speed,
            patrol_speed: bt.entry_speed * bt.patrol_speed_factor,
            stop_x: area.left() + area.size.x * bt.stop_fraction,
            band_min,
            band_max,
            target_y: pos.y,
            motion: BossMotion::Entering,
        };
        boss.retarget(rng);
        boss
    }

    pub fn bounds(&self) -> Rect {
        Rect::square(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    pub fn is_entering(&self) -> bool {
        self.motion == BossMotion::Entering
    }

    fn retarget(&mut self, rng: &mut impl Rng) {
        self.target_y = if self.band_max > self.band_min {
            rng.random_range(self.band_min..self.band_max)
        } else {
            self.band_min
        };
    }

    /// Two-phase motion: enter, then seek-and-retarget patrol
    pub fn advance(&mut self, dt: f32, rng: &mut impl Rng) {
        match self.motion {
            BossMotion::Entering => {
                self.pos.x -= self.entry_speed * dt;
                if self.pos.x <= self.stop_x {
                    self.pos.x = self.stop_x;
                    self.motion = BossMotion::Patrolling;
                    self.retarget(rng);
                }
            }
            BossMotion::Patrolling => {
                let step = self.patrol_speed * dt;
                if (self.pos.y - self.target_y).abs() < step {
                    self.pos.y = self.target_y;
                    self.retarget(rng);
                } else if self.pos.y < self.target_y {
                    self.pos.y += step;
                } else {
                    self.pos.y -= step;
                }
                self.pos.y = self.pos.y.clamp(self.band_min, self.band_max);
            }
        }
    }

    /// Take one hit. Returns true on the hit that brings health to zero.
    pub fn take_hit(&mut self) -> bool {
        if self.health == 0 {
            return false;
        }
        self.health -= 1;
        self.health == 0
    }
}

// ---------------------------------------------------------------------------
// Projectile
// ---------------------------------------------------------------------------

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileOwner {
    Player,
    Enemy,
}

/// A constant-velocity shot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    pub vel: Vec2,
    pub color: Rgb,
    pub owner: ProjectileOwner,
}

impl Projectile {
    pub fn bounds(&self) -> Rect {
        Rect::square(self.pos, self.size)
    }

    /// Integrate position. Returns false once the shot has left `area`.
    pub fn advance(&mut self, dt: f32, area: &Rect) -> bool {
        self.pos += self.vel * dt;
        !area.fully_outside(&self.bounds())
    }
}

// ---------------------------------------------------------------------------
// Collectible
// ---------------------------------------------------------------------------

/// Resource kinds dropped by enemies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Water,
    Fertilizer,
}

impl CollectibleKind {
    pub fn color(self) -> Rgb {
        match self {
            CollectibleKind::Water => palette::WATER,
            CollectibleKind::Fertilizer => palette::FERTILIZER,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CollectibleKind::Water => "Water",
            CollectibleKind::Fertilizer => "Fertilizer",
        }
    }
}

/// A timed resource pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub pos: Vec2,
    pub size: f32,
    pub kind: CollectibleKind,
    /// Simulation clock reading at creation
    pub created_at: f64,
    pub lifespan: f64,
    pub expired: bool,
}

impl Collectible {
    pub fn bounds(&self) -> Rect {
        Rect::square(self.pos, self.size)
    }

    /// Pure expiry test: strictly more than `lifespan` has elapsed
    pub fn is_expired_at(&self, now: f64) -> bool {
        now - self.created_at > self.lifespan
    }

    /// Latch the expired flag. It is never cleared.
    pub fn advance(&mut self, now: f64) {
        if !self.expired && self.is_expired_at(now) {
            self.expired = true;
        }
    }

    /// Seconds left before expiry (zero once expired)
    pub fn remaining(&self, now: f64) -> f64 {
        (self.created_at + self.lifespan - now).max(0.0)
    }
}
