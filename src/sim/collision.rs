//! Collision detection and resolution
//!
//! Runs once per tick after every entity has advanced. Each pairing is an
//! independent sweep over axis-aligned bounds with immediate resolution.
//! Collections are walked backward so in-place removal never skips or
//! revisits an entry, and a removed entity is simply absent from every later
//! sweep.
//!
//! Sweep order:
//! 1. player shots x enemies (kills may drop a collectible)
//! 2. player shots x boss
//! 3. player collection zone x collectibles
//! 4. enemy shots x player (damages the flower)
//! 5. player x enemies (damages the flower)
//! 6. player shots x enemy shots (clash)
//!
//! Flower damage routes through [`damage_objective`]; the step that kills the
//! flower returns [`Resolution::ObjectiveLost`] and no later sweep runs.

use glam::Vec2;
use rand::Rng;

use super::entity::{Collectible, CollectibleKind, Enemy, Projectile};
use super::level::LevelConfig;
use super::rect::Rect;
use super::state::{GameEvent, World};
use crate::tuning::Tuning;

/// Game over message when an enemy shot lands the final hit
pub const LOST_TO_SHOT: &str = "You couldn't protect the memory... It shattered.";
/// Game over message when enemy contact with the player lands the final hit
pub const LOST_TO_CONTACT: &str = "The chaos was too much for the fragile memory.";
/// Game over message when an enemy reaches the flower
pub const LOST_TO_INVASION: &str = "The memory faded... The flower is gone.";

/// Outcome of a resolution pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Continue,
    /// The flower died; carries the game over message
    ObjectiveLost(&'static str),
}

/// Index of the last item (scanning backward) whose bounds overlap `target`
pub fn first_overlap<T>(items: &[T], target: &Rect, bounds: impl Fn(&T) -> Rect) -> Option<usize> {
    items.iter().rposition(|item| bounds(item).intersects(target))
}

/// Roll for a collectible drop; kind is an even coin flip
pub fn roll_drop(rng: &mut impl Rng, chance: f64) -> Option<CollectibleKind> {
    if !rng.random_bool(chance) {
        return None;
    }
    Some(if rng.random_bool(0.5) {
        CollectibleKind::Water
    } else {
        CollectibleKind::Fertilizer
    })
}

/// Apply one flower damage step
pub fn damage_objective(
    world: &mut World,
    tuning: &Tuning,
    now: f64,
    events: &mut Vec<GameEvent>,
    warning: &str,
    lost: &'static str,
) -> Resolution {
    let state = world.flower.take_damage();
    events.push(GameEvent::ObjectiveDamaged { state });
    log::debug!("Flower damaged: {state:?}");
    if world.flower.is_dead() {
        return Resolution::ObjectiveLost(lost);
    }
    world.set_feedback(warning, now, tuning.feedback.damage);
    Resolution::Continue
}

/// Full resolution pass for one tick
pub fn resolve(
    world: &mut World,
    level: &LevelConfig,
    tuning: &Tuning,
    rng: &mut impl Rng,
    now: f64,
    events: &mut Vec<GameEvent>,
) -> Resolution {
    shots_vs_enemies(world, level, tuning, rng, now, events);
    shots_vs_boss(world, tuning, now, events);
    if level.is_resource_level() {
        collect_pickups(world, tuning, now, events);
    }
    if let Resolution::ObjectiveLost(msg) = enemy_shots_vs_player(world, tuning, now, events) {
        return Resolution::ObjectiveLost(msg);
    }
    if let Resolution::ObjectiveLost(msg) = player_vs_enemies(world, tuning, now, events) {
        return Resolution::ObjectiveLost(msg);
    }
    clash(world, events);
    Resolution::Continue
}

fn shots_vs_enemies(
    world: &mut World,
    level: &LevelConfig,
    tuning: &Tuning,
    rng: &mut impl Rng,
    now: f64,
    events: &mut Vec<GameEvent>,
) {
    for i in (0..world.player_projectiles.len()).rev() {
        let shot = world.player_projectiles[i].bounds();
        let Some(j) = first_overlap(&world.enemies, &shot, Enemy::bounds) else {
            continue;
        };
        world.player_projectiles.remove(i);

        world.enemies[j].health -= 1;
        if world.enemies[j].health > 0 {
            continue;
        }
        let enemy = world.enemies.remove(j);
        events.push(GameEvent::EnemyKilled { id: enemy.id });
        log::debug!("Enemy #{} destroyed", enemy.id);

        if !level.is_resource_level() {
            continue;
        }
        if let Some(kind) = roll_drop(rng, tuning.drop_chance) {
            let size = tuning.collectible_size;
            let id = world.next_entity_id();
            world.collectibles.push(Collectible {
                id,
                pos: enemy.center() - Vec2::splat(size / 2.0),
                size,
                kind,
                created_at: now,
                lifespan: tuning.collectible_lifespan,
                expired: false,
            });
            events.push(GameEvent::CollectibleDropped { kind });
            log::debug!("Dropped {kind:?} at {:?}", enemy.center());
        }
    }
}

fn shots_vs_boss(world: &mut World, tuning: &Tuning, now: f64, events: &mut Vec<GameEvent>) {
    for i in (0..world.player_projectiles.len()).rev() {
        let Some(boss) = world.boss.as_mut() else {
            return;
        };
        if !world.player_projectiles[i].bounds().intersects(&boss.bounds()) {
            continue;
        }
        world.player_projectiles.remove(i);
        let defeated = boss.take_hit();
        let health = boss.health;
        events.push(GameEvent::BossHit { health });
        world.set_feedback(format!("Boss Hit! HP: {health}"), now, tuning.feedback.boss_hit);

        if defeated {
            world.boss = None;
            events.push(GameEvent::BossDefeated);
            log::info!("Boss defeated");
        }
    }
}

fn collect_pickups(world: &mut World, tuning: &Tuning, now: f64, events: &mut Vec<GameEvent>) {
    let player = &world.player;
    let reach = player.size * tuning.collection_zone_factor;
    let zone = player.bounds().inflate(reach, reach);

    for i in (0..world.collectibles.len()).rev() {
        if !world.collectibles[i].bounds().intersects(&zone) {
            continue;
        }
        let kind = world.collectibles.remove(i).kind;
        let counted = world.progress.add(kind);
        let text = if counted {
            format!("+1 {}!", kind.label())
        } else {
            format!("Flower has enough {}.", kind.label().to_lowercase())
        };
        world.set_feedback(text, now, tuning.feedback.pickup);
        events.push(GameEvent::Collected { kind, counted });
    }
}

fn enemy_shots_vs_player(
    world: &mut World,
    tuning: &Tuning,
    now: f64,
    events: &mut Vec<GameEvent>,
) -> Resolution {
    for i in (0..world.enemy_projectiles.len()).rev() {
        if !world.enemy_projectiles[i].bounds().intersects(&world.player.bounds()) {
            continue;
        }
        world.enemy_projectiles.remove(i);
        let outcome = damage_objective(world, tuning, now, events, "Ouch! Be careful!", LOST_TO_SHOT);
        if outcome != Resolution::Continue {
            return outcome;
        }
    }
    Resolution::Continue
}

fn player_vs_enemies(
    world: &mut World,
    tuning: &Tuning,
    now: f64,
    events: &mut Vec<GameEvent>,
) -> Resolution {
    for i in (0..world.enemies.len()).rev() {
        if !world.enemies[i].bounds().intersects(&world.player.bounds()) {
            continue;
        }
        world.enemies.remove(i);
        let outcome = damage_objective(
            world,
            tuning,
            now,
            events,
            "They got too close to you!",
            LOST_TO_CONTACT,
        );
        if outcome != Resolution::Continue {
            return outcome;
        }
    }
    Resolution::Continue
}

/// Each player shot cancels at most one enemy shot
fn clash(world: &mut World, events: &mut Vec<GameEvent>) {
    for i in (0..world.player_projectiles.len()).rev() {
        let shot = world.player_projectiles[i].bounds();
        if let Some(j) = first_overlap(&world.enemy_projectiles, &shot, Projectile::bounds) {
            world.player_projectiles.remove(i);
            world.enemy_projectiles.remove(j);
            events.push(GameEvent::ProjectileClash);
        }
    }
}

/// Enemies that reach the flower are consumed and damage it
pub fn enemies_vs_objective(
    world: &mut World,
    tuning: &Tuning,
    now: f64,
    events: &mut Vec<GameEvent>,
) -> Resolution {
    for i in (0..world.enemies.len()).rev() {
        if !world.enemies[i].bounds().intersects(&world.flower.bounds()) {
            continue;
        }
        world.enemies.remove(i);
        let outcome = damage_objective(
            world,
            tuning,
            now,
            events,
            "They reached the flower!",
            LOST_TO_INVASION,
        );
        if outcome != Resolution::Continue {
            return outcome;
        }
    }
    Resolution::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Boss, EnemyKind, FlowerState, PlayerMode, ProjectileOwner, palette};
    use crate::sim::level::level_config;
    use rand::{RngCore, SeedableRng};
    use rand_pcg::Pcg32;

    /// Always yields the same word: 0 forces Water, `u64::MAX` Fertilizer
    struct ConstRng(u64);

    impl RngCore for ConstRng {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }
        fn next_u64(&mut self) -> u64 {
            self.0
        }
        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(self.0 as u8);
        }
    }

    fn forced_drops() -> Tuning {
        Tuning {
            drop_chance: 1.0,
            ..Tuning::default()
        }
    }

    fn shot(world: &mut World, pos: Vec2, owner: ProjectileOwner) -> Projectile {
        Projectile {
            id: world.next_entity_id(),
            pos,
            size: 8.0,
            vel: Vec2::ZERO,
            color: palette::PLAYER_SHOT,
            owner,
        }
    }

    /// Enemy plus a player shot inside it, far from the player
    fn arm_kill(world: &mut World, tuning: &Tuning) {
        let pos = Vec2::new(500.0, 100.0);
        let id = world.next_entity_id();
        world
            .enemies
            .push(Enemy::new(id, pos, EnemyKind::Slow, tuning.slow, true));
        let s = shot(world, pos + Vec2::splat(4.0), ProjectileOwner::Player);
        world.player_projectiles.push(s);
    }

    #[test]
    fn test_kill_drops_forced_kind() {
        let tuning = forced_drops();
        let level = level_config(1).unwrap();
        let mut world = World::new(&tuning, level.player_mode, level.goals);
        let mut events = Vec::new();

        arm_kill(&mut world, &tuning);
        resolve(&mut world, &level, &tuning, &mut ConstRng(0), 1.0, &mut events);
        assert!(world.enemies.is_empty());
        assert!(world.player_projectiles.is_empty());
        // The collection zone spans the play area, so the drop is picked up at once
        assert_eq!(world.progress.water, 1);
        assert!(events.contains(&GameEvent::CollectibleDropped {
            kind: CollectibleKind::Water
        }));

        arm_kill(&mut world, &tuning);
        resolve(&mut world, &level, &tuning, &mut ConstRng(u64::MAX), 1.0, &mut events);
        assert_eq!(world.progress.fertilizer, 1);
    }

    #[test]
    fn test_no_drops_without_goals() {
        let tuning = forced_drops();
        let level = level_config(5).unwrap();
        let mut world = World::new(&tuning, level.player_mode, level.goals);
        let mut events = Vec::new();
        arm_kill(&mut world, &tuning);
        resolve(&mut world, &level, &tuning, &mut ConstRng(0), 1.0, &mut events);
        assert!(world.enemies.is_empty());
        assert!(world.collectibles.is_empty());
    }

    #[test]
    fn test_drop_frequency_matches_chance() {
        let mut rng = Pcg32::seed_from_u64(99);
        let trials = 10_000;
        let drops = (0..trials)
            .filter(|_| roll_drop(&mut rng, 0.4).is_some())
            .count();
        let freq = drops as f64 / trials as f64;
        assert!((freq - 0.4).abs() < 0.02, "drop frequency {freq}");
    }

    #[test]
    fn test_every_kill_removes_enemy_and_respects_chance() {
        // A zone that cannot reach the drop site keeps drops on the ground
        let tuning = Tuning {
            collection_zone_factor: 0.0,
            ..Tuning::default()
        };
        let level = level_config(1).unwrap();
        let mut rng = Pcg32::seed_from_u64(1234);
        let trials = 2_000;
        let mut drops = 0;
        for _ in 0..trials {
            let mut world = World::new(&tuning, level.player_mode, level.goals);
            let mut events = Vec::new();
            arm_kill(&mut world, &tuning);
            resolve(&mut world, &level, &tuning, &mut rng, 0.0, &mut events);
            assert!(world.enemies.is_empty());
            drops += world.collectibles.len();
        }
        let freq = drops as f64 / trials as f64;
        assert!((freq - tuning.drop_chance).abs() < 0.05, "drop frequency {freq}");
    }

    #[test]
    fn test_enemy_with_health_survives_hit() {
        let tuning = Tuning::default();
        let level = level_config(1).unwrap();
        let mut world = World::new(&tuning, level.player_mode, level.goals);
        arm_kill(&mut world, &tuning);
        world.enemies[0].health = 2;
        let mut events = Vec::new();
        resolve(&mut world, &level, &tuning, &mut ConstRng(0), 0.0, &mut events);
        assert_eq!(world.enemies.len(), 1);
        assert_eq!(world.enemies[0].health, 1);
        assert!(world.player_projectiles.is_empty());
    }

    #[test]
    fn test_boss_last_hit_removes_boss() {
        let tuning = Tuning::default();
        let level = level_config(5).unwrap();
        let mut world = World::new(&tuning, level.player_mode, None);
        let mut rng = Pcg32::seed_from_u64(5);
        let id = world.next_entity_id();
        let mut boss = Boss::new(id, &tuning, &world.area, &mut rng);
        boss.pos = Vec2::new(600.0, 200.0);
        boss.health = 1;
        world.boss = Some(boss);
        let s = shot(&mut world, Vec2::new(610.0, 210.0), ProjectileOwner::Player);
        world.player_projectiles.push(s);

        let mut events = Vec::new();
        resolve(&mut world, &level, &tuning, &mut rng, 3.0, &mut events);
        assert!(world.boss.is_none());
        assert_eq!(
            events,
            vec![GameEvent::BossHit { health: 0 }, GameEvent::BossDefeated]
        );
    }

    #[test]
    fn test_pickup_beyond_goal_not_counted() {
        let tuning = Tuning::default();
        let level = level_config(1).unwrap();
        let mut world = World::new(&tuning, level.player_mode, level.goals);
        world.progress.water = 3;
        world.collectibles.push(Collectible {
            id: 1,
            pos: world.player.pos,
            size: 18.0,
            kind: CollectibleKind::Water,
            created_at: 0.0,
            lifespan: 7.0,
            expired: false,
        });
        let mut events = Vec::new();
        resolve(&mut world, &level, &tuning, &mut ConstRng(0), 0.0, &mut events);
        assert!(world.collectibles.is_empty());
        assert_eq!(world.progress.water, 3);
        assert_eq!(
            world.feedback.as_ref().map(|f| f.text.as_str()),
            Some("Flower has enough water.")
        );
    }

    #[test]
    fn test_clash_removes_both_shots() {
        let tuning = Tuning::default();
        let level = level_config(5).unwrap();
        let mut world = World::new(&tuning, PlayerMode::Free, None);
        let pos = Vec2::new(400.0, 50.0);
        let mine = shot(&mut world, pos, ProjectileOwner::Player);
        let theirs = shot(&mut world, pos, ProjectileOwner::Enemy);
        let other = shot(&mut world, pos, ProjectileOwner::Enemy);
        world.player_projectiles.push(mine);
        world.enemy_projectiles.push(theirs);
        world.enemy_projectiles.push(other);

        let mut events = Vec::new();
        resolve(&mut world, &level, &tuning, &mut ConstRng(0), 0.0, &mut events);
        assert!(world.player_projectiles.is_empty());
        // First match only: one enemy shot survives
        assert_eq!(world.enemy_projectiles.len(), 1);
        assert_eq!(events, vec![GameEvent::ProjectileClash]);
        assert_eq!(world.flower.state, FlowerState::Healthy);
    }

    #[test]
    fn test_broken_flower_dies_once_and_halts() {
        let tuning = Tuning::default();
        let level = level_config(1).unwrap();
        let mut world = World::new(&tuning, level.player_mode, level.goals);
        world.flower.state = FlowerState::Broken;
        let at = world.player.pos;
        for _ in 0..3 {
            let s = shot(&mut world, at, ProjectileOwner::Enemy);
            world.enemy_projectiles.push(s);
        }
        let id = world.next_entity_id();
        world
            .enemies
            .push(Enemy::new(id, at, EnemyKind::Slow, tuning.slow, true));

        let mut events = Vec::new();
        let result = resolve(&mut world, &level, &tuning, &mut ConstRng(0), 0.0, &mut events);
        assert_eq!(result, Resolution::ObjectiveLost(LOST_TO_SHOT));
        assert_eq!(world.flower.state, FlowerState::Dead);
        let damage = events
            .iter()
            .filter(|e| matches!(e, GameEvent::ObjectiveDamaged { .. }))
            .count();
        assert_eq!(damage, 1);
        // Later sweeps never ran
        assert_eq!(world.enemy_projectiles.len(), 2);
        assert_eq!(world.enemies.len(), 1);
    }

    #[test]
    fn test_contact_damages_flower_not_player() {
        let tuning = Tuning::default();
        let level = level_config(1).unwrap();
        let mut world = World::new(&tuning, level.player_mode, level.goals);
        let id = world.next_entity_id();
        let at = world.player.pos;
        world
            .enemies
            .push(Enemy::new(id, at, EnemyKind::Slow, tuning.slow, true));
        let mut events = Vec::new();
        let result = resolve(&mut world, &level, &tuning, &mut ConstRng(0), 0.0, &mut events);
        assert_eq!(result, Resolution::Continue);
        assert!(world.enemies.is_empty());
        assert_eq!(world.flower.state, FlowerState::Damaged);
        assert!(world.feedback.is_some());
    }

    #[test]
    fn test_enemy_reaching_flower() {
        let tuning = Tuning::default();
        let mut world = World::new(&tuning, PlayerMode::Free, None);
        world.flower.state = FlowerState::Broken;
        let id = world.next_entity_id();
        let at = world.flower.pos;
        world
            .enemies
            .push(Enemy::new(id, at, EnemyKind::Fast, tuning.fast, true));
        let mut events = Vec::new();
        let result = enemies_vs_objective(&mut world, &tuning, 0.0, &mut events);
        assert_eq!(result, Resolution::ObjectiveLost(LOST_TO_INVASION));
        assert!(world.enemies.is_empty());
    }

    #[test]
    fn test_first_overlap_scans_backward() {
        let r = |x: f32| Rect::square(Vec2::new(x, 0.0), 10.0);
        let items = vec![r(0.0), r(5.0), r(100.0)];
        let target = r(4.0);
        assert_eq!(first_overlap(&items, &target, |r| *r), Some(1));
        assert_eq!(first_overlap(&items, &r(50.0), |r| *r), None);
    }
}
