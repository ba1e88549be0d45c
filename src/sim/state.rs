//! Game state and core simulation types
//!
//! `GameState` is the level session: it owns the `World` (every live entity
//! collection) plus the timers, RNG and screen state that drive it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::BossAttack;
use super::entity::{
    Boss, Collectible, CollectibleKind, Enemy, Flower, FlowerState, Player, PlayerMode,
    Projectile,
};
use super::level::{LevelConfig, ResourceGoals};
use super::rect::Rect;
use super::spawn::SpawnTimer;
use crate::consts::{PLAY_HEIGHT, PLAY_WIDTH};
use crate::tuning::Tuning;

/// Current screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Level cleared, frozen until confirm
    LevelTransition,
    /// Run ended, confirm restarts from level 1
    GameOver,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The flower died
    Defeat,
    /// Every configured level was completed
    Victory,
}

/// Things that happened during a tick, for renderer/audio and tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemySpawned { id: u32 },
    EnemyKilled { id: u32 },
    EnemyEscaped { id: u32 },
    CollectibleDropped { kind: CollectibleKind },
    /// `counted` is false when the counter was already at its goal
    Collected { kind: CollectibleKind, counted: bool },
    CollectibleExpired { id: u32 },
    BossHit { health: u32 },
    BossDefeated,
    SpecialAttackStarted,
    SpecialAttackEnded,
    ObjectiveDamaged { state: FlowerState },
    ProjectileClash,
    LevelComplete { level: u32 },
    GameOver { outcome: Outcome },
}

/// Resource counters for the current level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Progress {
    pub water: u32,
    pub fertilizer: u32,
    pub goals: Option<ResourceGoals>,
}

impl Progress {
    pub fn new(goals: Option<ResourceGoals>) -> Self {
        Self {
            water: 0,
            fertilizer: 0,
            goals,
        }
    }

    /// Count one pickup. Counters saturate at their goal; returns false when
    /// the pickup did not move the counter.
    pub fn add(&mut self, kind: CollectibleKind) -> bool {
        let Some(goals) = self.goals else {
            return false;
        };
        let (counter, goal) = match kind {
            CollectibleKind::Water => (&mut self.water, goals.water),
            CollectibleKind::Fertilizer => (&mut self.fertilizer, goals.fertilizer),
        };
        if *counter >= goal {
            return false;
        }
        *counter += 1;
        true
    }

    /// Both counters at their goals at the same time
    pub fn goals_met(&self) -> bool {
        self.goals
            .is_some_and(|g| self.water >= g.water && self.fertilizer >= g.fertilizer)
    }
}

/// Short-lived on-screen text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub text: String,
    pub expires_at: f64,
}

/// Every live entity of the current level
#[derive(Debug, Clone)]
pub struct World {
    /// Visible play rectangle
    pub area: Rect,
    pub player: Player,
    pub flower: Flower,
    pub enemies: Vec<Enemy>,
    /// At most one boss
    pub boss: Option<Boss>,
    pub player_projectiles: Vec<Projectile>,
    pub enemy_projectiles: Vec<Projectile>,
    pub collectibles: Vec<Collectible>,
    pub progress: Progress,
    pub feedback: Option<Feedback>,
    /// Next entity ID
    next_id: u32,
}

impl World {
    /// Fresh world: flower on the left, player placed for `mode`
    pub fn new(tuning: &Tuning, mode: PlayerMode, goals: Option<ResourceGoals>) -> Self {
        let area = Rect::new(Vec2::ZERO, Vec2::new(PLAY_WIDTH, PLAY_HEIGHT));
        let flower = Flower::new(
            Vec2::new(tuning.flower_x, area.center().y - tuning.flower_size / 2.0),
            tuning.flower_size,
        );
        let ps = tuning.player_size;
        let player_pos = match mode {
            PlayerMode::Lane => {
                let fb = flower.bounds();
                Vec2::new(fb.right() + tuning.lane_gap, fb.center().y - ps / 2.0)
            }
            PlayerMode::Free => Vec2::new(area.size.x * 0.2, area.bottom() - ps - 50.0),
        };
        Self {
            area,
            player: Player::new(player_pos, ps, tuning.player_speed, mode),
            flower,
            enemies: Vec::new(),
            boss: None,
            player_projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            collectibles: Vec::new(),
            progress: Progress::new(goals),
            feedback: None,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Replace the feedback text
    pub fn set_feedback(&mut self, text: impl Into<String>, now: f64, duration: f64) {
        self.feedback = Some(Feedback {
            text: text.into(),
            expires_at: now + duration,
        });
    }

    /// Drop feedback whose time is up
    pub fn expire_feedback(&mut self, now: f64) {
        if self.feedback.as_ref().is_some_and(|f| now > f.expires_at) {
            self.feedback = None;
        }
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Single source of randomness
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Current level number (1-based)
    pub level: u32,
    /// Configuration of the current level, `None` past the last level
    pub config: Option<LevelConfig>,
    pub phase: GamePhase,
    pub outcome: Option<Outcome>,
    /// Overlay message for transition/game over screens
    pub message: String,
    /// Simulation clock (seconds)
    pub clock: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub world: World,
    pub spawner: SpawnTimer,
    pub boss_attack: BossAttack,
    pub last_player_shot: Option<f64>,
    /// Events recorded during the most recent tick
    pub events: Vec<GameEvent>,
    /// Set by cancel on the game over screen
    pub quit_requested: bool,
}

impl GameState {
    /// New run with default tuning, starting at level 1
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// New run with the given tuning, starting at level 1
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let tuning = tuning.sanitized();
        let world = World::new(&tuning, PlayerMode::Lane, None);
        let spawner = SpawnTimer::new(0.0, None, &tuning);
        let boss_attack = BossAttack::new(0.0, &tuning);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            level: 1,
            config: None,
            phase: GamePhase::Playing,
            outcome: None,
            message: String::new(),
            clock: 0.0,
            time_ticks: 0,
            world,
            spawner,
            boss_attack,
            last_player_shot: None,
            events: Vec::new(),
            quit_requested: false,
        };

        super::tick::start_level(&mut state, 1);

        state
    }
}
