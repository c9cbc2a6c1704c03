/// Actor operations and the per-actor action driver.
///
/// The public operations (`move_actor`, `fire_projectile`, `descend`,
/// `ascend`) are the whole control surface; the player's input and the
/// enemy AI both go through them. Each one either starts a timed action
/// in the actor's single slot or is rejected with `false`.
///
/// `kill` is the exception: it discards whatever is running and starts
/// `Dying` unconditionally.
///
/// `tick_actor` advances the slot: per-tick `progress`, then `complete`
/// exactly once when the duration has elapsed.

use glam::Vec2;
use log::{debug, info};
use rand::Rng;

use crate::domain::action::{ease_in_out, ease_out_back, ActionKind, TimedAction};
use crate::domain::actor::{Actor, ActorId, ActorLabel, Controller, Facing, Pose};
use crate::domain::grid::Corridor;
use crate::domain::projectile::{direction_from_angle, Projectile};
use crate::sim::event::GameEvent;
use crate::sim::world::World;

/// Floating-point slack when comparing elapsed time to shot times.
const SHOT_EPSILON: f32 = 1e-4;

// ── Spawning ──

/// Acquire a pooled actor and fade it in at `(depth, cell)`.
pub fn spawn(world: &mut World, controller: Controller, depth: i32, cell: usize) -> ActorId {
    let id = world.actors.acquire(Actor::new(controller, Facing::Right));
    appear(world, id, depth, cell);
    id
}

/// Bind an acquired actor to its corridor and start its fade-in.
pub fn appear(world: &mut World, id: ActorId, depth: i32, cell: usize) {
    let facing = if world.rng.gen_bool(0.5) { Facing::Right } else { Facing::Left };
    let fade = world.config.actor.fade_in_duration;
    world.enter_corridor(id, depth, cell);

    let a = world.actor_mut(id);
    a.facing = facing;
    a.alpha = 0.0;
    a.action = Some(TimedAction::new(ActionKind::FadingIn, fade));
    let label = a.label();
    world.events.push(GameEvent::ActorAppeared { id, label, depth, cell });
}

fn can_act(a: &Actor) -> bool {
    !a.is_busy() && !a.is_dead()
}

fn start(world: &mut World, id: ActorId, kind: ActionKind, duration: f32) {
    let a = world.actor_mut(id);
    debug_assert!(a.action.is_none(), "actor {id:?} already has an action");
    a.action = Some(TimedAction::new(kind, duration));
}

// ── Operations ──

/// Step one cell, or turn first if facing the other way.
pub fn move_actor(world: &mut World, id: ActorId, dx: i32) -> bool {
    let dx = dx.signum();
    let a = world.actor(id);
    if dx == 0 || !can_act(a) {
        return false;
    }
    let (depth, cell, facing) = (a.depth(), a.cell(), a.facing);
    let dest = cell as i64 + dx as i64;
    if !world.corridor_of(id).contains(dest) {
        return false;
    }
    let dest = dest as usize;

    let wanted = Facing::from_dx(dx);
    if facing != wanted {
        let d = world.config.actor.face_direction_duration;
        start(world, id, ActionKind::Turning { to: wanted }, d);
        world.events.push(GameEvent::Turned { id });
        return true;
    }

    world.for_each_actor_in_range(depth, Some(id), dest, dest, |w, other| {
        hit_by_melee(w, other, dx as f32);
    });

    let d = world.config.actor.move_duration;
    start(world, id, ActionKind::Moving { from: cell, to: dest }, d);
    world.actor_mut(id).immune_to_melee = true;
    world.events.push(GameEvent::Stepped { id, depth, cell: dest });
    true
}

pub fn fire_projectile(world: &mut World, id: ActorId) -> bool {
    let a = world.actor(id);
    if !can_act(a) || a.gun_cooldown > 0.0 {
        return false;
    }
    let (depth, cell, facing) = (a.depth(), a.cell(), a.facing);
    let cfg = &world.config.actor;
    let (spread, gun_x, gun_y, duration) = (cfg.projectile_spread, cfg.gun_x, cfg.gun_y + cfg.y_offset, cfg.gun_fire_duration);

    let base = if facing.is_right() { 0.0 } else { 180.0 };
    let angle = base + (world.rng.gen::<f32>() - 0.5) * spread;
    let muzzle = Corridor::cell_position(cell) + Vec2::new(facing.sign() as f32 * gun_x, gun_y);
    spawn_projectile(world, id, depth, muzzle, angle);

    start(world, id, ActionKind::Firing, duration);
    world.actor_mut(id).pose = Pose::Recoil;
    let at = world.to_world(depth, muzzle);
    world.events.push(GameEvent::Fired { id, at, angle });
    true
}

fn spawn_projectile(world: &mut World, owner: ActorId, depth: i32, muzzle: Vec2, angle: f32) {
    let len = world.config.corridor.length;
    let cfg = &world.config.projectile;
    let p = Projectile::new(depth, Some(owner), muzzle, direction_from_angle(angle), cfg.speed, cfg.trail_length, len);
    world.projectiles.acquire(p);
}

/// Drop through the hole under the actor, or start shooting one open.
pub fn descend(world: &mut World, id: ActorId) -> bool {
    let a = world.actor(id);
    if !can_act(a) {
        return false;
    }
    let (depth, cell) = (a.depth(), a.cell());

    if world.corridor_of(id).has_hole(cell) {
        world.get_corridor(depth + 1);
        let d = world.config.actor.descend_duration;
        start(world, id, ActionKind::Descending { kicked: false }, d);
        become_airborne(world.actor_mut(id));
        world.events.push(GameEvent::Jumped { id, down: true });
    } else {
        let cfg = &world.config.actor;
        let d = cfg.floor_break_shots as f32 * cfg.floor_break_interval;
        start(world, id, ActionKind::BreakingFloor { shots_fired: 0 }, d);
        world.actor_mut(id).pose = Pose::Recoil;
    }
    true
}

/// Climb through the hole in the floor above.
pub fn ascend(world: &mut World, id: ActorId) -> bool {
    let a = world.actor(id);
    if !can_act(a) || a.depth() <= world.top_depth() {
        return false;
    }
    let (depth, cell) = (a.depth(), a.cell());
    if !world.corridor(depth - 1).is_some_and(|c| c.has_hole(cell)) {
        return false;
    }
    let d = world.config.actor.descend_duration;
    start(world, id, ActionKind::Ascending { kicked: false }, d);
    become_airborne(world.actor_mut(id));
    world.events.push(GameEvent::Jumped { id, down: false });
    true
}

fn become_airborne(a: &mut Actor) {
    a.immune_to_melee = true;
    a.immune_to_projectile = true;
    a.pose = Pose::Fall;
}

fn land(a: &mut Actor) {
    a.immune_to_melee = false;
    a.immune_to_projectile = false;
    a.pose = Pose::Aim;
    a.offset = Vec2::ZERO;
}

/// Kill an actor. No effect if it is already dead.
pub fn kill(world: &mut World, id: ActorId, offset: f32) {
    let strength = world.config.actor.death_offset_strength;
    let duration = world.config.actor.dying_duration + world.config.actor.death_fade_duration;
    let Some(a) = world.actors.get_mut(id) else { return };
    if a.is_dead() {
        return;
    }
    a.mark_dead();
    a.turn = 0.0;
    a.pose = Pose::Dying;
    // Cancelled: the running action's completion never happens.
    a.action = Some(TimedAction::new(ActionKind::Dying { drift: offset * strength }, duration));

    let (label, depth, local) = (a.label(), a.depth(), Corridor::cell_position(a.cell()) + a.offset);
    debug!("{label:?} {id:?} killed at depth {depth}");
    let at = world.to_world(depth, local);
    world.events.push(GameEvent::ActorKilled { id, label, at });
}

pub fn hit_by_melee(world: &mut World, id: ActorId, offset: f32) {
    if world.actors.get(id).is_some_and(Actor::accepts_melee) {
        kill(world, id, offset);
    }
}

/// `push` is the projectile's horizontal direction, used as death drift.
pub fn hit_by_projectile(world: &mut World, id: ActorId, push: f32) {
    if world.actors.get(id).is_some_and(Actor::accepts_projectile) {
        kill(world, id, push);
    }
}

/// An actor's life is over: enemies go back to the pool, the player ends the run.
fn pool_actor(world: &mut World, id: ActorId) {
    match world.actor(id).label() {
        ActorLabel::Enemy => world.release_actor(id),
        ActorLabel::Player => {
            if !world.run.over {
                world.run.over = true;
                let best_depth = world.run.best_depth;
                info!("run over at best depth {best_depth}");
                world.events.push(GameEvent::PlayerDied { best_depth });
            }
        }
    }
}

// ── Tick driver ──

/// Advance one actor's cooldown and action slot by `dt`.
pub fn tick_actor(world: &mut World, id: ActorId, dt: f32) {
    let Some(a) = world.actors.get_mut(id) else { return };
    if a.gun_cooldown > 0.0 {
        a.gun_cooldown -= dt;
    }
    let Some(mut action) = a.action.take() else { return };

    let finished = action.advance(dt);
    progress(world, id, &mut action, dt);

    let Some(a) = world.actors.get_mut(id) else { return };
    if a.action.is_some() {
        // Killed during progress: the slot now holds `Dying`.
        return;
    }
    if finished {
        complete(world, id, action);
    } else {
        a.action = Some(action);
    }
}

fn progress(world: &mut World, id: ActorId, action: &mut TimedAction, dt: f32) {
    let (p, elapsed) = (action.progress(), action.elapsed());
    let step = 1.0 + world.config.corridor.padding;
    let (depth, cell) = {
        let a = world.actor(id);
        (a.depth(), a.cell())
    };

    match &mut action.kind {
        ActionKind::Turning { .. } => world.actor_mut(id).turn = p,
        ActionKind::Moving { from, to } => {
            let span = *to as f32 - *from as f32;
            world.actor_mut(id).offset.x = span * ease_in_out(p);
        }
        ActionKind::Descending { kicked } => {
            world.actor_mut(id).offset.y = -step * ease_in_out(p);
            if !*kicked && p > 0.5 {
                *kicked = true;
                drop_kick(world, id, depth + 1, cell);
            }
        }
        ActionKind::Ascending { kicked } => {
            world.actor_mut(id).offset.y = step * ease_out_back(p);
            if !*kicked && p > 0.5 {
                *kicked = true;
                drop_kick(world, id, depth - 1, cell);
            }
        }
        ActionKind::BreakingFloor { shots_fired } => {
            let cfg = &world.config.actor;
            let (shots, interval, gun_y) = (cfg.floor_break_shots, cfg.floor_break_interval, cfg.gun_y + cfg.y_offset);
            while *shots_fired < shots && shot_due(elapsed, *shots_fired + 1, interval) {
                *shots_fired += 1;
                let muzzle = Corridor::cell_position(cell) + Vec2::new(0.0, gun_y);
                spawn_projectile(world, id, depth, muzzle, -90.0);
                world.events.push(GameEvent::FloorShot { id, depth, cell });
                if *shots_fired == shots {
                    break_through(world, depth, cell);
                }
            }
        }
        ActionKind::Firing => {}
        ActionKind::FadingIn => world.actor_mut(id).alpha = p,
        ActionKind::Dying { drift } => {
            let cfg = &world.config.actor;
            let (dying, fade) = (cfg.dying_duration, cfg.death_fade_duration);
            let drift = *drift;
            let a = world.actor_mut(id);
            if elapsed < dying {
                let nt = elapsed / dying;
                a.offset.x += drift * nt * dt;
            } else {
                a.pose = Pose::Dead;
                a.alpha = if fade > 0.0 { 1.0 - ((elapsed - dying) / fade).min(1.0) } else { 0.0 };
            }
        }
    }
}

/// Shot `n` (1-based) goes off at `n * interval`.
fn shot_due(elapsed: f32, n: u32, interval: f32) -> bool {
    elapsed >= n as f32 * interval - SHOT_EPSILON
}

/// Melee hit on whoever stands on the landing cell.
fn drop_kick(world: &mut World, id: ActorId, depth: i32, cell: usize) {
    world.for_each_actor_in_range(depth, Some(id), cell, cell, |w, other| hit_by_melee(w, other, 0.0));
    world.events.push(GameEvent::DropKick { depth, cell });
}

fn break_through(world: &mut World, depth: i32, cell: usize) {
    if world.make_hole(depth, cell) {
        world.events.push(GameEvent::FloorBroken { depth, cell });
    }
}

fn complete(world: &mut World, id: ActorId, action: TimedAction) {
    let (depth, cell) = {
        let a = world.actor(id);
        (a.depth(), a.cell())
    };
    match action.kind {
        ActionKind::Turning { to } => {
            let a = world.actor_mut(id);
            a.facing = to;
            a.turn = 0.0;
        }
        ActionKind::Moving { to, .. } => {
            let a = world.actor_mut(id);
            a.bind(depth, to);
            a.offset = Vec2::ZERO;
            a.immune_to_melee = false;
        }
        ActionKind::Descending { .. } => {
            world.enter_corridor(id, depth + 1, cell);
            land(world.actor_mut(id));
        }
        ActionKind::Ascending { .. } => {
            if world.corridor(depth - 1).is_none() {
                // Target retired mid-climb.
                pool_actor(world, id);
                return;
            }
            world.enter_corridor(id, depth - 1, cell);
            land(world.actor_mut(id));
        }
        ActionKind::BreakingFloor { .. } => {
            break_through(world, depth, cell);
            world.actor_mut(id).pose = Pose::Aim;
        }
        ActionKind::Firing => {
            let cooldown = world.config.actor.gun_cooldown_duration;
            let a = world.actor_mut(id);
            a.pose = Pose::Aim;
            a.gun_cooldown = cooldown;
        }
        ActionKind::FadingIn => world.actor_mut(id).alpha = 1.0,
        ActionKind::Dying { .. } => pool_actor(world, id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::ActionState;
    use crate::sim::director;
    use crate::sim::world::tests::{quiet_config, settled};
    use pretty_assertions::assert_eq;

    fn world_of_length(len: usize) -> World {
        let mut cfg = quiet_config();
        cfg.corridor.length = len;
        settled(cfg)
    }

    fn face(w: &mut World, id: ActorId, f: Facing) {
        w.actor_mut(id).facing = f;
    }

    /// Spawn an enemy and let its fade-in finish.
    fn enemy_at(w: &mut World, depth: i32, cell: usize) -> ActorId {
        let id = spawn(w, Controller::enemy(0.35), depth, cell);
        let fade = w.config.actor.fade_in_duration;
        tick_actor(w, id, fade + 0.01);
        id
    }

    fn run_out(w: &mut World, id: ActorId) {
        for _ in 0..200 {
            if w.actors.get(id).map_or(true, |a| !a.is_busy()) {
                return;
            }
            tick_actor(w, id, 0.05);
        }
    }

    #[test]
    fn move_right_lands_on_next_cell() {
        let mut w = world_of_length(5);
        let p = w.player;
        face(&mut w, p, Facing::Right);
        assert_eq!(w.actor(p).cell(), 2);

        assert!(move_actor(&mut w, p, 1));
        assert!(w.actor(p).immune_to_melee);
        let d = w.config.actor.move_duration;
        tick_actor(&mut w, p, d + 0.01);

        let a = w.actor(p);
        assert_eq!(a.cell(), 3);
        assert_eq!(a.action_state(), ActionState::Idle);
        assert!(!a.immune_to_melee);
        assert!(!a.immune_to_projectile);
    }

    #[test]
    fn second_action_is_rejected_while_busy() {
        let mut w = world_of_length(9);
        let p = w.player;
        face(&mut w, p, Facing::Right);
        assert!(move_actor(&mut w, p, 1));
        assert!(!move_actor(&mut w, p, 1));
        assert!(!fire_projectile(&mut w, p));
        assert!(!descend(&mut w, p));
        assert!(!ascend(&mut w, p));
        assert_eq!(w.actor(p).action_state(), ActionState::Moving);
    }

    #[test]
    fn move_against_facing_only_turns() {
        let mut w = world_of_length(9);
        let p = w.player;
        face(&mut w, p, Facing::Left);
        assert!(move_actor(&mut w, p, 1));
        assert_eq!(w.actor(p).action_state(), ActionState::Turning);
        run_out(&mut w, p);
        assert_eq!(w.actor(p).cell(), 4);
        assert_eq!(w.actor(p).facing, Facing::Right);
    }

    #[test]
    fn move_off_the_end_is_rejected() {
        let mut w = world_of_length(5);
        let p = w.player;
        w.enter_corridor(p, 0, 4);
        face(&mut w, p, Facing::Right);
        assert!(!move_actor(&mut w, p, 1));
        assert!(!move_actor(&mut w, p, 0));
        assert_eq!(w.actor(p).action_state(), ActionState::Idle);
    }

    #[test]
    fn stepping_into_an_enemy_kills_it() {
        let mut w = world_of_length(9);
        let p = w.player;
        let e = enemy_at(&mut w, 0, 5);
        face(&mut w, p, Facing::Right);
        assert!(move_actor(&mut w, p, 1));
        assert!(w.actor(e).is_dead());
        assert_eq!(w.actor(e).action_state(), ActionState::Dying);
    }

    #[test]
    fn moving_actor_shrugs_off_melee() {
        let mut w = world_of_length(9);
        let p = w.player;
        face(&mut w, p, Facing::Right);
        move_actor(&mut w, p, 1);
        hit_by_melee(&mut w, p, 1.0);
        assert!(!w.actor(p).is_dead());
        hit_by_projectile(&mut w, p, 1.0);
        assert!(w.actor(p).is_dead());
    }

    #[test]
    fn fire_spawns_projectile_then_cools_down() {
        let mut w = world_of_length(9);
        let p = w.player;
        face(&mut w, p, Facing::Left);
        assert!(fire_projectile(&mut w, p));
        assert_eq!(w.projectiles.len(), 1);
        let (_, shot) = w.projectiles.iter().next().unwrap();
        assert!(shot.direction().x < 0.0);
        assert_eq!(shot.owner(), Some(p));
        assert_eq!(w.actor(p).pose, Pose::Recoil);

        let d = w.config.actor.gun_fire_duration;
        tick_actor(&mut w, p, d);
        assert_eq!(w.actor(p).pose, Pose::Aim);
        assert!(w.actor(p).gun_cooldown > 0.0);
        assert!(!fire_projectile(&mut w, p));

        let cd = w.config.actor.gun_cooldown_duration;
        tick_actor(&mut w, p, cd + 0.01);
        assert!(fire_projectile(&mut w, p));
    }

    #[test]
    fn breaking_floor_opens_hole_only_on_last_shot() {
        let mut w = world_of_length(9);
        let p = w.player;
        assert!(descend(&mut w, p));
        assert_eq!(w.actor(p).action_state(), ActionState::BreakingFloor);

        for _ in 0..4 {
            tick_actor(&mut w, p, 0.05);
            assert!(!w.corridor(0).unwrap().has_hole(4));
        }
        let shots = w.events.iter().filter(|e| matches!(e, GameEvent::FloorShot { .. })).count();
        assert_eq!(shots, 2);

        tick_actor(&mut w, p, 0.05);
        assert!(w.corridor(0).unwrap().has_hole(4));
        let shots = w.events.iter().filter(|e| matches!(e, GameEvent::FloorShot { .. })).count();
        assert_eq!(shots, 3);
        assert!(w.events.contains(&GameEvent::FloorBroken { depth: 0, cell: 4 }));
        assert_eq!(w.actor(p).action_state(), ActionState::Idle);
        assert_eq!(w.actor(p).depth(), 0);
    }

    #[test]
    fn descend_through_hole_drop_kicks_and_lands() {
        let mut w = world_of_length(9);
        let p = w.player;
        w.make_hole(0, 4);
        let e = enemy_at(&mut w, 1, 4);

        assert!(descend(&mut w, p));
        assert_eq!(w.actor(p).action_state(), ActionState::Descending);
        assert!(w.actor(p).immune_to_melee && w.actor(p).immune_to_projectile);

        tick_actor(&mut w, p, 0.1);
        assert!(!w.actor(e).is_dead());
        tick_actor(&mut w, p, 0.1);
        assert!(w.actor(e).is_dead());

        run_out(&mut w, p);
        let a = w.actor(p);
        assert_eq!((a.depth(), a.cell()), (1, 4));
        assert!(!a.immune_to_melee && !a.immune_to_projectile);
        assert!(w.corridor(1).unwrap().actors().contains(&p));
        assert!(!w.corridor(0).unwrap().actors().contains(&p));
    }

    #[test]
    fn ascend_needs_a_hole_above() {
        let mut w = world_of_length(9);
        let p = w.player;
        assert!(!ascend(&mut w, p));

        w.enter_corridor(p, 1, 3);
        assert!(!ascend(&mut w, p));

        w.make_hole(0, 3);
        assert!(ascend(&mut w, p));
        run_out(&mut w, p);
        assert_eq!((w.actor(p).depth(), w.actor(p).cell()), (0, 3));
    }

    #[test]
    fn ascent_uppercuts_whoever_stands_above() {
        let mut w = world_of_length(9);
        let p = w.player;
        w.enter_corridor(p, 1, 3);
        w.make_hole(0, 3);
        let e = enemy_at(&mut w, 0, 3);

        assert!(ascend(&mut w, p));
        tick_actor(&mut w, p, 0.1);
        assert!(!w.actor(e).is_dead());
        tick_actor(&mut w, p, 0.1);
        assert!(w.actor(e).is_dead());
        assert!(w.events.contains(&GameEvent::DropKick { depth: 0, cell: 3 }));

        run_out(&mut w, p);
        assert_eq!((w.actor(p).depth(), w.actor(p).cell()), (0, 3));
        assert!(!w.actor(p).is_dead());
    }

    #[test]
    fn climbing_actor_cannot_be_hit() {
        let mut w = world_of_length(9);
        let p = w.player;
        w.enter_corridor(p, 1, 3);
        w.make_hole(0, 3);
        assert!(ascend(&mut w, p));
        assert_eq!(w.actor(p).action_state(), ActionState::Ascending);
        assert!(w.actor(p).immune_to_melee && w.actor(p).immune_to_projectile);

        hit_by_melee(&mut w, p, 1.0);
        hit_by_projectile(&mut w, p, -1.0);
        tick_actor(&mut w, p, 0.2);
        hit_by_projectile(&mut w, p, 1.0);
        assert!(!w.actor(p).is_dead());

        run_out(&mut w, p);
        hit_by_projectile(&mut w, p, 1.0);
        assert!(w.actor(p).is_dead());
    }

    #[test]
    fn climbing_into_a_retired_corridor_releases_the_enemy() {
        let mut w = world_of_length(9);
        let p = w.player;
        let e = enemy_at(&mut w, 3, 2);
        w.make_hole(2, 2);
        assert!(ascend(&mut w, e));
        tick_actor(&mut w, e, 0.1);

        w.enter_corridor(p, 6, 4);
        director::retire(&mut w);
        assert_eq!(w.top_depth(), 3);
        assert!(w.actors.is_active(e));

        run_out(&mut w, e);
        assert!(!w.actors.is_active(e));
        assert!(!w.corridor(3).unwrap().actors().contains(&e));
        assert!(!w.run.over);
    }

    #[test]
    fn kill_cancels_action_and_is_idempotent() {
        let mut w = world_of_length(9);
        let p = w.player;
        face(&mut w, p, Facing::Right);
        move_actor(&mut w, p, 1);
        kill(&mut w, p, 0.0);
        assert_eq!(w.actor(p).action_state(), ActionState::Dying);

        let killed = w.events.len();
        kill(&mut w, p, 1.0);
        assert_eq!(w.events.len(), killed);

        run_out(&mut w, p);
        // The cancelled move never completed.
        assert_eq!(w.actor(p).cell(), 4);
        assert!(w.run.over);
        assert!(w.events.iter().any(|e| matches!(e, GameEvent::PlayerDied { .. })));
        assert!(!move_actor(&mut w, p, 1));
    }

    #[test]
    fn dead_enemy_returns_to_pool() {
        let mut w = world_of_length(9);
        let e = enemy_at(&mut w, 0, 1);
        kill(&mut w, e, 1.0);
        run_out(&mut w, e);
        assert!(!w.actors.is_active(e));
        assert!(!w.corridor(0).unwrap().actors().contains(&e));
        assert!(!w.run.over);
    }

    #[test]
    fn one_action_at_a_time_across_random_inputs() {
        let mut w = world_of_length(9);
        let p = w.player;
        for i in 0..400 {
            match i % 5 {
                0 => { move_actor(&mut w, p, 1); }
                1 => { fire_projectile(&mut w, p); }
                2 => { move_actor(&mut w, p, -1); }
                3 => { descend(&mut w, p); }
                _ => { ascend(&mut w, p); }
            }
            let before = w.actor(p).action().map(TimedAction::state);
            let started = move_actor(&mut w, p, 1);
            if before.is_some() {
                assert!(!started);
            }
            tick_actor(&mut w, p, 0.03);
        }
    }
}
