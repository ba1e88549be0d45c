//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (backward over each collection)
//! - No rendering or platform dependencies

pub mod boss;
pub mod collision;
pub mod entity;
pub mod level;
pub mod rect;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use boss::{AttackMode, BossAttack};
pub use collision::Resolution;
pub use entity::{
    Boss, Collectible, CollectibleKind, Enemy, EnemyKind, Flower, FlowerState, Player, PlayerMode,
    Projectile, ProjectileOwner,
};
pub use level::{LEVEL_COUNT, LevelConfig, ResourceGoals, level_config};
pub use rect::Rect;
pub use snapshot::{EntityView, Snapshot};
pub use state::{GameEvent, GamePhase, GameState, Outcome, World};
pub use tick::{Stepper, TickInput, start_level, tick};
