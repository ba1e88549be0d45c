//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically, plus the level
//! lifecycle it drives (start, completion, game over).

use glam::Vec2;

use super::boss::{AttackTransition, BossAttack};
use super::collision::{self, Resolution};
use super::entity::{Boss, Projectile, ProjectileOwner, palette};
use super::level::{LevelConfig, level_config};
use super::spawn::{SpawnTimer, run_scheduler, spawn_initial_wave};
use super::state::{GameEvent, GamePhase, GameState, Outcome, World};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Game over message once every level has been completed
pub const ALL_LEVELS_COMPLETE: &str =
    "You've pieced together all the memories.\nThank you for playing.";

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Horizontal direction held: -1, 0 or +1
    pub move_x: i8,
    /// Vertical direction held: -1, 0 or +1
    pub move_y: i8,
    /// Pointer click target for a player shot
    pub fire_at: Option<Vec2>,
    /// Advance past a transition / restart after game over
    pub confirm: bool,
    /// Quit from the game over screen
    pub cancel: bool,
    /// Skip to next level (debug/testing)
    pub skip_level: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();
    state.time_ticks += 1;
    state.clock += f64::from(dt);
    let now = state.clock;

    match state.phase {
        GamePhase::LevelTransition => {
            if input.confirm {
                let next = state.level + 1;
                start_level(state, next);
            }
            return;
        }
        GamePhase::GameOver => {
            if input.confirm {
                log::info!("Restarting from level 1");
                start_level(state, 1);
            } else if input.cancel {
                state.quit_requested = true;
            }
            return;
        }
        GamePhase::Playing => {}
    }

    // Debug: skip to next level
    if input.skip_level {
        log::info!("Skipping level {}", state.level);
        let next = state.level + 1;
        start_level(state, next);
        return;
    }

    let Some(config) = state.config else {
        return;
    };
    let area = state.world.area;

    // Player movement and firing
    state
        .world
        .player
        .advance(input.move_x, input.move_y, dt, &area);
    if let Some(target) = input.fire_at {
        fire_player_shot(state, target, now);
    }

    // Timed respawns
    if let Some(id) = run_scheduler(
        state.phase,
        &config,
        &mut state.world,
        &mut state.spawner,
        &state.tuning,
        &mut state.rng,
        now,
    ) {
        state.events.push(GameEvent::EnemySpawned { id });
    }

    // Entity updates
    let world = &mut state.world;
    world.player_projectiles.retain_mut(|p| p.advance(dt, &area));
    world.enemy_projectiles.retain_mut(|p| p.advance(dt, &area));

    for i in (0..world.collectibles.len()).rev() {
        world.collectibles[i].advance(now);
        if world.collectibles[i].expired {
            let c = world.collectibles.remove(i);
            state.events.push(GameEvent::CollectibleExpired { id: c.id });
        }
    }

    for i in (0..world.enemies.len()).rev() {
        world.enemies[i].advance(dt);
        if world.enemies[i].has_left_play(area.size.x) {
            let e = world.enemies.remove(i);
            state.events.push(GameEvent::EnemyEscaped { id: e.id });
        }
    }
    if let Resolution::ObjectiveLost(msg) =
        collision::enemies_vs_objective(world, &state.tuning, now, &mut state.events)
    {
        game_over(state, Outcome::Defeat, msg);
        return;
    }

    if let Some(boss) = state.world.boss.as_mut() {
        boss.advance(dt, &mut state.rng);
    }

    // Boss attack pattern
    match state
        .boss_attack
        .update(&mut state.world, &state.tuning, &mut state.rng, now)
    {
        Some(AttackTransition::SpecialStarted) => state.events.push(GameEvent::SpecialAttackStarted),
        Some(AttackTransition::SpecialEnded) => state.events.push(GameEvent::SpecialAttackEnded),
        None => {}
    }

    state.world.expire_feedback(now);

    if let Resolution::ObjectiveLost(msg) = collision::resolve(
        &mut state.world,
        &config,
        &state.tuning,
        &mut state.rng,
        now,
        &mut state.events,
    ) {
        game_over(state, Outcome::Defeat, msg);
        return;
    }

    check_completion(state, &config);
}

/// Turns variable host frame times into fixed simulation steps
#[derive(Debug, Clone, Default)]
pub struct Stepper {
    accumulator: f32,
}

impl Stepper {
    /// Run as many fixed ticks as `frame_dt` covers, capped at
    /// `MAX_SUBSTEPS`. One-shot inputs (fire, confirm, cancel, skip) apply to
    /// the first substep only. Afterwards `state.events` holds the events of
    /// every substep in order (empty when no tick ran). Returns the number of
    /// ticks run.
    pub fn advance(&mut self, state: &mut GameState, input: &TickInput, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.min(0.1);

        let mut input = input.clone();
        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(state, &input, SIM_DT);
            events.append(&mut state.events);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.fire_at = None;
            input.confirm = false;
            input.cancel = false;
            input.skip_level = false;
        }
        state.events = events;
        substeps
    }
}

/// Fire toward `target` if the cooldown allows
fn fire_player_shot(state: &mut GameState, target: Vec2, now: f64) {
    let tuning = &state.tuning;
    if state
        .last_player_shot
        .is_some_and(|last| now - last < tuning.player_fire_cooldown)
    {
        return;
    }

    let player = &state.world.player;
    let center = player.center();
    let dir = (target - center).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    let size = tuning.projectile_size;
    let origin = center + dir * (player.size / 2.0 + 3.0);

    let id = state.world.next_entity_id();
    state.world.player_projectiles.push(Projectile {
        id,
        pos: origin - Vec2::splat(size / 2.0),
        size,
        vel: dir * tuning.player_projectile_speed,
        color: palette::PLAYER_SHOT,
        owner: ProjectileOwner::Player,
    });
    state.last_player_shot = Some(now);
    state
        .world
        .player
        .trigger_shoot_animation(now, tuning.player_shoot_anim);
}

/// Tear down the current level and build `level` from the table.
///
/// Every timer is rebased on the current clock, so nothing scheduled by the
/// previous level can fire in the new one. Past the last level the run ends
/// in victory.
pub fn start_level(state: &mut GameState, level: u32) {
    let Some(config) = level_config(level) else {
        state.level = level;
        state.config = None;
        game_over(state, Outcome::Victory, ALL_LEVELS_COMPLETE);
        return;
    };

    let now = state.clock;
    state.level = level;
    state.config = Some(config);
    state.phase = GamePhase::Playing;
    state.outcome = None;
    state.message.clear();
    state.world = World::new(&state.tuning, config.player_mode, config.goals);
    state.spawner = SpawnTimer::new(now, config.spawn.as_ref(), &state.tuning);
    state.boss_attack = BossAttack::new(now, &state.tuning);
    state.last_player_shot = None;

    if let Some(spawn) = config.spawn {
        let ids = spawn_initial_wave(
            &mut state.world,
            &spawn,
            config.player_mode,
            &state.tuning,
            &mut state.rng,
        );
        state
            .events
            .extend(ids.into_iter().map(|id| GameEvent::EnemySpawned { id }));
    }

    if config.has_boss {
        let id = state.world.next_entity_id();
        let area = state.world.area;
        state.world.boss = Some(Boss::new(id, &state.tuning, &area, &mut state.rng));
    }

    log::info!(
        "Level {level}: {:?} player, goals {:?}, boss {}",
        config.player_mode,
        config.goals.map(|g| (g.water, g.fertilizer)),
        config.has_boss
    );
}

/// Resource levels finish when both goals are met, boss levels when the boss
/// is gone
fn check_completion(state: &mut GameState, config: &LevelConfig) {
    let done = if config.has_boss {
        state.world.boss.is_none()
    } else {
        state.world.progress.goals_met()
    };
    if !done {
        return;
    }

    state.phase = GamePhase::LevelTransition;
    state.message = format!("Level {} Complete!", state.level);
    state.world.feedback = None;
    state.events.push(GameEvent::LevelComplete { level: state.level });
    log::info!("Level {} complete at t={:.2}s", state.level, state.clock);
}

fn game_over(state: &mut GameState, outcome: Outcome, message: &str) {
    state.phase = GamePhase::GameOver;
    state.outcome = Some(outcome);
    state.message = message.to_string();
    state.events.push(GameEvent::GameOver { outcome });
    log::info!("Game over ({outcome:?}) on level {}: {message}", state.level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{CollectibleKind, EnemyKind, FlowerState};

    fn idle() -> TickInput {
        TickInput::default()
    }

    fn confirm() -> TickInput {
        TickInput {
            confirm: true,
            ..Default::default()
        }
    }

    fn skip() -> TickInput {
        TickInput {
            skip_level: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_clock_advances_by_dt() {
        let mut state = GameState::new(1);
        for _ in 0..60 {
            tick(&mut state, &idle(), SIM_DT);
        }
        assert_eq!(state.time_ticks, 60);
        assert!((state.clock - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_lane_player_stays_beside_flower() {
        let mut state = GameState::new(1);
        let start = state.world.player.pos;
        let up = TickInput {
            move_x: 1,
            move_y: -1,
            ..Default::default()
        };
        for _ in 0..120 {
            tick(&mut state, &up, SIM_DT);
        }
        assert_eq!(state.world.player.pos, start);
        let fb = state.world.flower.bounds();
        let y = state.world.player.center().y;
        assert!(y > fb.top() && y < fb.bottom());
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut state = GameState::new(1);
        state.world.enemies.clear();
        let aim = TickInput {
            fire_at: Some(Vec2::new(700.0, 300.0)),
            ..Default::default()
        };
        tick(&mut state, &aim, SIM_DT);
        assert_eq!(state.world.player_projectiles.len(), 1);
        assert!(state.world.player.is_shooting(state.clock));

        // Held fire inside the cooldown adds nothing
        for _ in 0..10 {
            tick(&mut state, &aim, SIM_DT);
        }
        assert_eq!(state.world.player_projectiles.len(), 1);

        for _ in 0..10 {
            tick(&mut state, &aim, SIM_DT);
        }
        assert_eq!(state.world.player_projectiles.len(), 2);
        assert!(state.world.player_projectiles.iter().all(|p| p.vel.x > 0.0));
    }

    #[test]
    fn test_fire_at_own_center_does_nothing() {
        let mut state = GameState::new(1);
        let input = TickInput {
            fire_at: Some(state.world.player.center()),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!(state.world.player_projectiles.is_empty());
        assert!(state.last_player_shot.is_none());
    }

    #[test]
    fn test_goals_complete_level_and_confirm_advances() {
        let mut state = GameState::new(3);
        state.world.progress.water = 3;
        state.world.progress.fertilizer = 2;
        tick(&mut state, &idle(), SIM_DT);
        assert_eq!(state.phase, GamePhase::LevelTransition);
        assert_eq!(state.message, "Level 1 Complete!");
        assert!(state.events.contains(&GameEvent::LevelComplete { level: 1 }));

        // Frozen until confirm
        let enemies: Vec<Vec2> = state.world.enemies.iter().map(|e| e.pos).collect();
        tick(&mut state, &idle(), SIM_DT);
        let after: Vec<Vec2> = state.world.enemies.iter().map(|e| e.pos).collect();
        assert_eq!(enemies, after);

        tick(&mut state, &confirm(), SIM_DT);
        assert_eq!(state.level, 2);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.world.enemies.len(), 3);
        assert_eq!(state.world.progress.water, 0);
    }

    #[test]
    fn test_one_goal_short_keeps_playing() {
        let mut state = GameState::new(3);
        state.world.progress.water = 3;
        state.world.progress.fertilizer = 1;
        tick(&mut state, &idle(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_skip_levels_to_victory() {
        let mut state = GameState::new(4);
        for expected in 2..=5 {
            tick(&mut state, &skip(), SIM_DT);
            assert_eq!(state.level, expected);
            assert_eq!(state.phase, GamePhase::Playing);
        }
        assert!(state.world.boss.is_some());
        assert!(state.world.enemies.is_empty());

        tick(&mut state, &skip(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.outcome, Some(Outcome::Victory));
        assert_eq!(state.message, ALL_LEVELS_COMPLETE);
    }

    #[test]
    fn test_game_over_confirm_restarts_and_cancel_quits() {
        let mut state = GameState::new(5);
        tick(&mut state, &skip(), SIM_DT);
        state.world.flower.state = FlowerState::Dead;
        game_over(&mut state, Outcome::Defeat, "gone");

        tick(&mut state, &idle(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);

        tick(&mut state, &confirm(), SIM_DT);
        assert_eq!(state.level, 1);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.world.flower.state, FlowerState::Healthy);
        assert!(state.outcome.is_none());

        game_over(&mut state, Outcome::Defeat, "gone");
        tick(&mut state, &TickInput { cancel: true, ..Default::default() }, SIM_DT);
        assert!(state.quit_requested);
    }

    /// Idle tick on a boss level with enemy shots swept away so the flower
    /// survives indefinitely
    fn calm_tick(state: &mut GameState) {
        tick(state, &idle(), SIM_DT);
        state.world.enemy_projectiles.clear();
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_restart_discards_boss_timers() {
        let mut state = GameState::new(6);
        for _ in 0..4 {
            tick(&mut state, &skip(), SIM_DT);
        }
        assert!(state.world.boss.is_some());

        let mut ticks = 0;
        while !state.boss_attack.is_special() {
            calm_tick(&mut state);
            ticks += 1;
            assert!(ticks < 60 * 20, "special attack never started");
        }

        // Restart the boss level mid-attack
        start_level(&mut state, 5);
        assert!(!state.boss_attack.is_special());
        assert!(state.world.enemy_projectiles.is_empty());
        assert!(state.world.boss.as_ref().is_some_and(|b| b.is_entering()));

        // The old attack neither ends nor repeats before the fresh delay
        let delay = state.tuning.boss.first_special_delay;
        let start = state.clock;
        while state.clock - start < delay - 0.1 {
            calm_tick(&mut state);
            assert!(!state.events.contains(&GameEvent::SpecialAttackStarted));
            assert!(!state.events.contains(&GameEvent::SpecialAttackEnded));
        }

        let mut started = false;
        while state.clock - start < delay + 0.5 {
            calm_tick(&mut state);
            started |= state.events.contains(&GameEvent::SpecialAttackStarted);
        }
        assert!(started);
    }

    #[test]
    fn test_enemy_reaching_flower_damages_it() {
        let mut state = GameState::new(7);
        state.world.enemies.clear();
        // Player out of the way
        state.world.player.pos = Vec2::new(400.0, 500.0);
        let id = state.world.next_entity_id();
        let stats = state.tuning.slow;
        let near = state.world.flower.bounds().right() + 1.0;
        state.world.enemies.push(crate::sim::entity::Enemy::new(
            id,
            Vec2::new(near, state.world.flower.pos.y),
            EnemyKind::Slow,
            stats,
            true,
        ));
        tick(&mut state, &idle(), SIM_DT);
        assert_eq!(state.world.flower.state, FlowerState::Damaged);
        assert!(state.world.enemies.iter().all(|e| e.id != id));
    }

    #[test]
    fn test_expired_collectible_removed() {
        let mut state = GameState::new(8);
        state.world.collectibles.push(crate::sim::entity::Collectible {
            id: 999,
            pos: Vec2::new(700.0, 50.0),
            size: 18.0,
            kind: CollectibleKind::Water,
            created_at: state.clock - 7.5,
            lifespan: 7.0,
            expired: false,
        });
        // Expiry runs before pickups
        tick(&mut state, &idle(), SIM_DT);
        assert!(state.world.collectibles.is_empty());
        assert!(state.events.contains(&GameEvent::CollectibleExpired { id: 999 }));
        assert_eq!(state.world.progress.water, 0);
    }

    #[test]
    fn test_stepper_accumulates_frames() {
        let mut state = GameState::new(9);
        let mut stepper = Stepper::default();
        // Two half-length frames make one tick
        assert_eq!(stepper.advance(&mut state, &idle(), SIM_DT * 0.5), 0);
        assert_eq!(stepper.advance(&mut state, &idle(), SIM_DT * 0.5 + 1e-6), 1);
        // A long stall is capped
        let ran = stepper.advance(&mut state, &idle(), 1.0);
        assert!(ran <= MAX_SUBSTEPS);
        assert_eq!(state.time_ticks, 1 + u64::from(ran));
    }

    #[test]
    fn test_stepper_fires_once_per_frame() {
        let mut state = GameState::new(9);
        state.tuning.player_fire_cooldown = 0.0;
        let input = TickInput {
            fire_at: Some(Vec2::new(700.0, 300.0)),
            ..Default::default()
        };
        let ran = Stepper::default().advance(&mut state, &input, SIM_DT * 4.0 + 1e-4);
        assert_eq!(ran, 4);
        assert_eq!(state.world.player_projectiles.len(), 1);
    }

    #[test]
    fn test_stepper_keeps_events_from_every_substep() {
        let mut state = GameState::new(9);
        let ran = Stepper::default().advance(&mut state, &skip(), SIM_DT * 3.0 + 1e-4);
        assert_eq!(ran, 3);
        assert_eq!(state.level, 2);
        // Level 2's initial wave spawns on the first substep only
        let spawned = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemySpawned { .. }))
            .count();
        assert_eq!(spawned, 3);

        let ran = Stepper::default().advance(&mut state, &idle(), SIM_DT * 0.5);
        assert_eq!(ran, 0);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);
        let inputs = [
            TickInput {
                move_y: 1,
                fire_at: Some(Vec2::new(700.0, 250.0)),
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                move_y: -1,
                ..Default::default()
            },
        ];

        for _ in 0..600 {
            for input in &inputs {
                tick(&mut state1, input, SIM_DT);
                tick(&mut state2, input, SIM_DT);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.world.enemies.len(), state2.world.enemies.len());
        assert_eq!(state1.world.flower.state, state2.world.flower.state);
        assert_eq!(state1.world.player.pos, state2.world.player.pos);
        assert_eq!(state1.phase, state2.phase);
    }
}
