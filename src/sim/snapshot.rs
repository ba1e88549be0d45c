//! Read-only view of the simulation for renderers and the headless driver
//!
//! Built from a `&GameState`; nothing here can mutate the simulation.

use serde::Serialize;

use super::entity::{CollectibleKind, EnemyKind, FlowerState, ProjectileOwner, Rgb, palette};
use super::rect::Rect;
use super::state::{GamePhase, GameState, Outcome};

/// One drawable entity
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityView {
    Player {
        bounds: Rect,
        color: Rgb,
        shooting: bool,
    },
    Flower {
        bounds: Rect,
        color: Rgb,
        state: FlowerState,
    },
    Enemy {
        id: u32,
        bounds: Rect,
        color: Rgb,
        enemy: EnemyKind,
    },
    Boss {
        id: u32,
        bounds: Rect,
        color: Rgb,
        health: u32,
        max_health: u32,
    },
    Projectile {
        id: u32,
        bounds: Rect,
        color: Rgb,
        owner: ProjectileOwner,
    },
    Collectible {
        id: u32,
        bounds: Rect,
        color: Rgb,
        resource: CollectibleKind,
        /// Seconds left before it expires
        remaining: f64,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressView {
    pub water: u32,
    pub fertilizer: u32,
    pub water_goal: u32,
    pub fertilizer_goal: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackView {
    pub text: String,
    /// Seconds of display time left
    pub remaining: f64,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub clock: f64,
    pub level: u32,
    pub phase: GamePhase,
    pub outcome: Option<Outcome>,
    pub message: String,
    pub flower: FlowerState,
    /// Boss special attack underway (renderers flash the boss)
    pub boss_special: bool,
    pub progress: Option<ProgressView>,
    pub feedback: Option<FeedbackView>,
    pub entities: Vec<EntityView>,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let world = &state.world;
        let now = state.clock;

        let mut entities = Vec::with_capacity(
            2 + world.enemies.len()
                + world.player_projectiles.len()
                + world.enemy_projectiles.len()
                + world.collectibles.len(),
        );
        entities.push(EntityView::Flower {
            bounds: world.flower.bounds(),
            color: world.flower.state.color(),
            state: world.flower.state,
        });
        entities.push(EntityView::Player {
            bounds: world.player.bounds(),
            color: palette::PLAYER,
            shooting: world.player.is_shooting(now),
        });
        entities.extend(world.enemies.iter().map(|e| EntityView::Enemy {
            id: e.id,
            bounds: e.bounds(),
            color: e.kind.color(),
            enemy: e.kind,
        }));
        if let Some(boss) = &world.boss {
            entities.push(EntityView::Boss {
                id: boss.id,
                bounds: boss.bounds(),
                color: palette::BOSS,
                health: boss.health,
                max_health: boss.max_health,
            });
        }
        entities.extend(
            world
                .player_projectiles
                .iter()
                .chain(&world.enemy_projectiles)
                .map(|p| EntityView::Projectile {
                    id: p.id,
                    bounds: p.bounds(),
                    color: p.color,
                    owner: p.owner,
                }),
        );
        entities.extend(world.collectibles.iter().map(|c| EntityView::Collectible {
            id: c.id,
            bounds: c.bounds(),
            color: c.kind.color(),
            resource: c.kind,
            remaining: c.remaining(now),
        }));

        let progress = world.progress.goals.map(|g| ProgressView {
            water: world.progress.water,
            fertilizer: world.progress.fertilizer,
            water_goal: g.water,
            fertilizer_goal: g.fertilizer,
        });
        let feedback = world.feedback.as_ref().map(|f| FeedbackView {
            text: f.text.clone(),
            remaining: (f.expires_at - now).max(0.0),
        });

        Self {
            tick: state.time_ticks,
            clock: now,
            level: state.level,
            phase: state.phase,
            outcome: state.outcome,
            message: state.message.clone(),
            flower: world.flower.state,
            boss_special: state.boss_attack.is_special(),
            progress,
            feedback,
            entities,
        }
    }

    pub fn count_enemies(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| matches!(e, EntityView::Enemy { .. }))
            .count()
    }
}

impl GameState {
    /// Read-only render snapshot of the current frame
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_lists_level_one() {
        let state = GameState::new(10);
        let snap = state.snapshot();
        assert_eq!(snap.level, 1);
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.count_enemies(), 2);
        assert!(matches!(snap.entities[0], EntityView::Flower { .. }));
        let progress = snap.progress.unwrap();
        assert_eq!((progress.water_goal, progress.fertilizer_goal), (3, 2));
    }

    #[test]
    fn test_snapshot_json_is_tagged() {
        let state = GameState::new(10);
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["phase"], "Playing");
        assert_eq!(json["entities"][1]["kind"], "player");
        assert_eq!(json["flower"], "Healthy");
        assert_eq!(json["boss_special"], false);
    }

    #[test]
    fn test_snapshot_flags_boss_special() {
        let mut state = GameState::new(10);
        state.boss_attack.mode = crate::sim::AttackMode::SpecialAttack {
            ends_at: state.clock + 1.0,
        };
        assert!(state.snapshot().boss_special);
    }
}
