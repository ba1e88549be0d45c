//! Scripted input source
//!
//! Plays the game from the simulation state alone, the way a person at the
//! keyboard would: aim at the nearest threat, stand still beside the flower on
//! lane levels, and sidestep incoming shots when free to roam. Used by the headless driver and
//! the integration tests in place of real input events.

use glam::Vec2;

use crate::sim::{GamePhase, GameState, PlayerMode, TickInput};

/// Enemy shots closer than this are dodged in free-roam levels
const DODGE_RADIUS: f32 = 120.0;
/// Movement dead band (pixels) to avoid jittering around a target row
const DEAD_BAND: f32 = 4.0;

#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Confirm (restart) on game over instead of quitting
    pub restart_on_game_over: bool,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new()
    }
}

impl Autopilot {
    pub fn new() -> Self {
        Self {
            restart_on_game_over: false,
        }
    }

    pub fn next_input(&mut self, state: &GameState) -> TickInput {
        match state.phase {
            GamePhase::LevelTransition => TickInput {
                confirm: true,
                ..Default::default()
            },
            GamePhase::GameOver => TickInput {
                confirm: self.restart_on_game_over,
                cancel: !self.restart_on_game_over,
                ..Default::default()
            },
            GamePhase::Playing => self.play(state),
        }
    }

    fn play(&self, state: &GameState) -> TickInput {
        let world = &state.world;
        let me = world.player.center();
        let target = aim_point(state);

        let (move_x, move_y) = match world.player.mode {
            PlayerMode::Lane => (0, 0),
            PlayerMode::Free => match incoming_shot(state) {
                Some(shot) => {
                    let away = me - shot;
                    (axis(away.x), axis(away.y))
                }
                None => {
                    // Hold a line between the flower and the boss
                    let home_y = world
                        .boss
                        .as_ref()
                        .map_or(world.area.center().y, |b| b.center().y);
                    let home = Vec2::new(world.area.size.x * 0.3, home_y);
                    let to_home = home - me;
                    (axis(to_home.x), axis(to_home.y))
                }
            },
        };

        TickInput {
            move_x,
            move_y,
            fire_at: target,
            ..Default::default()
        }
    }
}

/// Boss center if present, else the nearest enemy already on screen
fn aim_point(state: &GameState) -> Option<Vec2> {
    let world = &state.world;
    if let Some(boss) = &world.boss {
        return Some(boss.center());
    }
    let me = world.player.center();
    world
        .enemies
        .iter()
        .filter(|e| e.pos.x < world.area.right())
        .map(|e| e.center())
        .min_by(|a, b| a.distance_squared(me).total_cmp(&b.distance_squared(me)))
}

/// Closest enemy shot within dodge range that is heading our way
fn incoming_shot(state: &GameState) -> Option<Vec2> {
    let me = state.world.player.center();
    state
        .world
        .enemy_projectiles
        .iter()
        .filter(|p| {
            let c = p.bounds().center();
            c.distance(me) < DODGE_RADIUS && p.vel.dot(me - c) > 0.0
        })
        .map(|p| p.bounds().center())
        .min_by(|a, b| a.distance_squared(me).total_cmp(&b.distance_squared(me)))
}

fn axis(delta: f32) -> i8 {
    if delta > DEAD_BAND {
        1
    } else if delta < -DEAD_BAND {
        -1
    } else {
        0
    }
}
