/// The step function: advances the world by one tick of `dt` seconds.
///
/// Processing order:
///   1. Player input (one operation per tick, through the actor operations)
///   2. Player depth timer
///   3. Actor action slots and gun cooldowns
///   4. Enemy AI intents
///   5. Projectiles: motion, swept hits, trail shrink, release
///   6. Ambush countdowns
///   7. Progression (best depth) and corridor retirement
///
/// Everything a tick produced for the presentation layer comes back as the
/// returned event list.

use crate::domain::actor::{ActorId, Controller};
use crate::domain::ai::{AiView, Intent};
use crate::domain::grid::Corridor;
use super::actions;
use super::director;
use super::event::GameEvent;
use super::world::World;

/// What the player asked for this tick, after the input policy ran.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// -1, 0 or 1.
    pub horizontal: i32,
    pub descend: bool,
    pub ascend: bool,
    pub fire: bool,
}

impl FrameInput {
    pub fn is_empty(&self) -> bool {
        *self == FrameInput::default()
    }
}

pub fn step(world: &mut World, input: &FrameInput, dt: f32) -> Vec<GameEvent> {
    if world.run.over {
        return std::mem::take(&mut world.events);
    }
    world.time += dt;

    resolve_player_input(world, input);
    resolve_depth_timer(world, dt);
    resolve_actions(world, dt);
    resolve_enemy_ai(world, dt);
    resolve_projectiles(world, dt);
    director::tick_ambushes(world, dt);
    director::track_progress(world);
    director::retire(world);

    std::mem::take(&mut world.events)
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

/// The slot takes one action; the first accepted operation wins.
fn resolve_player_input(world: &mut World, input: &FrameInput) {
    let id = world.player;
    if input.horizontal != 0 && actions::move_actor(world, id, input.horizontal) { return; }
    if input.descend && actions::descend(world, id) { return; }
    if input.ascend && actions::ascend(world, id) { return; }
    if input.fire {
        actions::fire_projectile(world, id);
    }
}

fn resolve_depth_timer(world: &mut World, dt: f32) {
    let id = world.player;
    let a = world.actor(id);
    if a.is_dead() {
        return;
    }
    let depth = a.depth();
    let expired = match &mut world.actor_mut(id).controller {
        Controller::Player(p) => p.tick(depth, dt),
        Controller::Enemy(_) => unreachable!("player handle points at an enemy"),
    };
    if expired {
        actions::kill(world, id, 0.0);
    }
}

// ══════════════════════════════════════════════════════════════
// Actors
// ══════════════════════════════════════════════════════════════

fn resolve_actions(world: &mut World, dt: f32) {
    for id in world.actors.handles() {
        actions::tick_actor(world, id, dt);
    }
}

fn resolve_enemy_ai(world: &mut World, dt: f32) {
    let (player_alive, player_depth, player_cell) = {
        let p = world.player_actor();
        (!p.is_dead(), p.depth(), p.cell())
    };

    for (id, _, _) in world.enemies() {
        let Some(intent) = think(world, id, player_alive, player_depth, player_cell, dt) else { continue };
        match intent {
            Intent::Wait => {}
            Intent::Move(dx) => {
                actions::move_actor(world, id, dx);
            }
            Intent::Descend => {
                actions::descend(world, id);
            }
            Intent::Ascend => {
                actions::ascend(world, id);
            }
            Intent::Fire => {
                actions::fire_projectile(world, id);
            }
        }
    }
}

/// Run one enemy's brain against the current world. `None` if the enemy
/// died or was released earlier this tick.
fn think(world: &mut World, id: ActorId, player_alive: bool, player_depth: i32, player_cell: usize, dt: f32) -> Option<Intent> {
    let a = world.actors.get(id).filter(|a| !a.is_dead())?;
    let Controller::Enemy(ctrl) = &a.controller else { return None };
    let mut brain = ctrl.brain.clone();
    let (depth, cell, facing) = (a.depth(), a.cell(), a.facing);

    let others: Vec<(i32, usize)> =
        world.enemies().into_iter().filter(|&(other, _, _)| other != id).map(|(_, d, c)| (d, c)).collect();
    let view = AiView {
        depth,
        cell,
        facing,
        player_alive,
        player_depth,
        player_cell,
        corridor: world.corridor(depth)?,
        corridor_above: world.corridor(depth - 1),
        enemies: &others,
    };
    let intent = brain.update(&view, dt);

    if let Controller::Enemy(ctrl) = &mut world.actor_mut(id).controller {
        ctrl.brain = brain;
    }
    Some(intent)
}

// ══════════════════════════════════════════════════════════════
// Projectiles
// ══════════════════════════════════════════════════════════════

fn resolve_projectiles(world: &mut World, dt: f32) {
    for h in world.projectiles.handles() {
        let Some(depth) = world.projectiles.get(h).map(|p| p.depth()) else { continue };
        let Some(len) = world.corridor(depth).map(Corridor::len) else {
            world.projectiles.release(h);
            continue;
        };
        let Some(p) = world.projectiles.get_mut(h) else { continue };
        let step = p.advance(dt, len);
        let (owner, push, head) = (p.owner(), p.direction().x, p.position());

        if let Some((lo, hi)) = step.hits {
            world.for_each_actor_in_range(depth, owner, lo, hi, |w, id| actions::hit_by_projectile(w, id, push));
        }
        if step.impacted_now {
            let at = world.to_world(depth, head);
            world.events.push(GameEvent::ProjectileImpact { at });
        }
        if step.expired {
            world.projectiles.release(h);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::ActionState;
    use crate::domain::actor::Facing;
    use crate::domain::ai::AiState;
    use crate::sim::world::tests::{quiet_config, settled};

    const DT: f32 = 1.0 / 60.0;

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn run(w: &mut World, ticks: usize) -> Vec<GameEvent> {
        let mut all = Vec::new();
        for _ in 0..ticks {
            all.extend(step(w, &idle(), DT));
        }
        all
    }

    fn settled_enemy(w: &mut World, depth: i32, cell: usize) -> ActorId {
        let id = actions::spawn(w, Controller::enemy(0.35), depth, cell);
        let fade = w.config.actor.fade_in_duration;
        actions::tick_actor(w, id, fade + 0.01);
        id
    }

    #[test]
    fn held_move_walks_the_player() {
        let mut w = settled(quiet_config());
        let p = w.player;
        w.actor_mut(p).facing = Facing::Right;
        let right = FrameInput { horizontal: 1, ..FrameInput::default() };
        for _ in 0..30 {
            step(&mut w, &right, DT);
        }
        assert!(w.actor(p).cell() > 4);
    }

    #[test]
    fn player_shot_kills_enemy_down_the_corridor() {
        let mut w = settled(quiet_config());
        let p = w.player;
        let e = settled_enemy(&mut w, 0, 7);
        w.actor_mut(p).facing = Facing::Right;

        let fire = FrameInput { fire: true, ..FrameInput::default() };
        let events = step(&mut w, &fire, DT);
        assert!(events.iter().any(|ev| matches!(ev, GameEvent::Fired { .. })));

        let events = run(&mut w, 12);
        assert!(w.actor(e).is_dead());
        assert!(events.iter().any(|ev| matches!(ev, GameEvent::ActorKilled { id, .. } if *id == e)));
        assert!(!w.actor(p).is_dead());
    }

    #[test]
    fn spent_projectiles_return_to_pool() {
        let mut w = settled(quiet_config());
        let p = w.player;
        w.actor_mut(p).facing = Facing::Left;
        step(&mut w, &FrameInput { fire: true, ..FrameInput::default() }, DT);
        assert_eq!(w.projectiles.len(), 1);

        let events = run(&mut w, 60);
        assert!(events.iter().any(|ev| matches!(ev, GameEvent::ProjectileImpact { .. })));
        assert_eq!(w.projectiles.len(), 0);
        assert_eq!(w.projectiles.free_len(), 1);
    }

    #[test]
    fn depth_timer_kills_a_dawdling_player() {
        let mut cfg = quiet_config();
        cfg.player.time_for_each_depth = 1.0;
        let mut w = settled(cfg);
        let p = w.player;
        w.enter_corridor(p, 1, 4);

        run(&mut w, 30);
        assert!(!w.actor(p).is_dead());
        run(&mut w, 40);
        assert!(w.actor(p).is_dead());

        let events = run(&mut w, 120);
        assert!(w.run.over);
        assert!(events.contains(&GameEvent::PlayerDied { best_depth: 1 }));
    }

    #[test]
    fn enemy_reacts_then_shoots_the_player() {
        let mut w = settled(quiet_config());
        let p = w.player;
        let e = settled_enemy(&mut w, 0, 8);

        step(&mut w, &idle(), DT);
        let brain = |w: &World| match &w.actor(e).controller {
            Controller::Enemy(c) => c.brain.state(),
            Controller::Player(_) => unreachable!(),
        };
        assert_eq!(brain(&w), AiState::Idle);

        let mut events = Vec::new();
        for _ in 0..600 {
            events.extend(step(&mut w, &idle(), DT));
            if w.run.over {
                break;
            }
        }
        assert!(w.actor(p).is_dead());
        assert!(w.run.over);
        assert!(events.iter().any(|ev| matches!(ev, GameEvent::Fired { id, .. } if *id == e)));
        assert_eq!(brain(&w), AiState::Idle);
    }

    #[test]
    fn enemy_on_the_players_cell_walks_off_it() {
        let mut w = settled(quiet_config());
        let e = actions::spawn(&mut w, Controller::enemy(0.0), 0, 4);
        let fade = w.config.actor.fade_in_duration;
        actions::tick_actor(&mut w, e, fade + 0.01);
        assert_eq!(w.actor(e).cell(), w.player_actor().cell());

        let mut left = false;
        for _ in 0..120 {
            step(&mut w, &idle(), DT);
            if w.actor(e).cell() != 4 {
                left = true;
                break;
            }
        }
        assert!(left);
        assert!(!w.actor(e).is_dead());
    }

    #[test]
    fn going_deep_retires_the_top() {
        let mut w = settled(quiet_config());
        let p = w.player;
        w.enter_corridor(p, 6, 4);
        let events = step(&mut w, &idle(), DT);

        assert_eq!(w.top_depth(), 3);
        assert_eq!(w.run.best_depth, 6);
        assert!(events.contains(&GameEvent::ReachedDepth { depth: 6 }));
        assert!(events.contains(&GameEvent::CorridorRetired { depth: 2 }));
    }

    #[test]
    fn frozen_once_the_run_is_over() {
        let mut w = settled(quiet_config());
        let p = w.player;
        actions::kill(&mut w, p, 0.0);
        run(&mut w, 120);
        assert!(w.run.over);
        let t = w.time;
        assert!(run(&mut w, 10).is_empty());
        assert_eq!(w.time, t);
        assert_eq!(w.actor(p).action_state(), ActionState::Idle);
    }
}
