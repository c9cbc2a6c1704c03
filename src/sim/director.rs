/// Depth director: what fills a new corridor, when ambushes spring, which
/// corridors fall out of the window, and how far the player has come.
///
/// ## Generation (per new corridor)
///
///   1. Drop-chain holes queued by a shallower corridor are punched.
///   2. Depth 0 stays empty; deeper corridors get
///      `clamp(1 + depth / 4, 1, max_enemies)` enemies on distinct cells.
///   3. Up to `min(depth / door_depth_divisor, max_doors)` of the remaining
///      cells become doors, each with an ambush countdown.
///   4. Past `drop_chain_min_depth`, a roll may start a drop chain: the same
///      cell is holed in this corridor and the next few.
///
/// ## Retirement
///
/// Corridors more than `retire_above` depths above the player are torn
/// down with everything in them: actors, fixtures, projectiles, ambushes.

use log::{debug, info};
use rand::seq::index::sample;
use rand::Rng;

use crate::domain::actor::Controller;
use crate::domain::ambush::AmbushInfo;
use crate::domain::grid::WallState;
use crate::sim::actions;
use crate::sim::event::GameEvent;
use crate::sim::world::World;

/// Enemies placed in a freshly generated corridor.
pub fn enemy_count(depth: i32, max_enemies: usize) -> usize {
    if depth <= 0 || max_enemies == 0 {
        return 0;
    }
    (1 + depth as usize / 4).clamp(1, max_enemies)
}

/// Fill the corridor just generated at `depth`.
pub(crate) fn populate(world: &mut World, depth: i32) {
    let len = world.config.corridor.length;

    let queued: Vec<usize> = world.pending_holes.iter().filter(|(d, _)| *d == depth).map(|&(_, c)| c).collect();
    world.pending_holes.retain(|(d, _)| *d != depth);
    for cell in queued {
        world.make_hole(depth, cell);
    }

    // Enemies
    let count = enemy_count(depth, world.config.enemy.max_enemies).min(len);
    let taken = sample(&mut world.rng, len, count).into_vec();
    let reaction = world.config.enemy.reaction_speed;
    for &cell in &taken {
        actions::spawn(world, Controller::enemy(reaction), depth, cell);
    }

    // Doors
    let free: Vec<usize> = (0..len).filter(|c| !taken.contains(c)).collect();
    let g = &world.config.generator;
    let cap = if depth > 0 { (depth / g.door_depth_divisor.max(1)) as usize } else { 0 };
    let cap = cap.min(g.max_doors).min(free.len());
    let (lo, hi) = (g.ambush_min, g.ambush_max.max(g.ambush_min));
    let doors = world.rng.gen_range(0..=cap);
    for i in sample(&mut world.rng, free.len(), doors).into_vec() {
        let cell = free[i];
        let countdown = world.rng.gen_range(lo..=hi);
        world.set_wall_state(depth, cell, WallState::Door);
        world.ambushes.push(AmbushInfo::new(depth, cell, countdown));
    }

    // Drop chain
    let g = &world.config.generator;
    let (min_depth, chance, max_len) = (g.drop_chain_min_depth, g.drop_chain_chance.clamp(0.0, 1.0), g.drop_chain_max);
    if depth > min_depth && max_len > 0 && world.rng.gen_bool(chance) {
        let chain = world.rng.gen_range(1..=max_len) as i32;
        let cell = world.rng.gen_range(0..len);
        world.make_hole(depth, cell);
        for k in 1..chain {
            world.pending_holes.push((depth + k, cell));
        }
        debug!("drop chain of {chain} from depth {depth} at cell {cell}");
    }

    debug!("generated corridor {depth}: {count} enemies, {doors} doors");
    world.events.push(GameEvent::CorridorGenerated { depth });
}

/// Count down active ambushes and spring the expired ones.
pub fn tick_ambushes(world: &mut World, dt: f32) {
    let (pdepth, pcell) = {
        let p = world.player_actor();
        (p.depth(), p.cell())
    };
    let reaction = world.config.enemy.reaction_speed;

    let mut i = 0;
    while i < world.ambushes.len() {
        let expired = world.ambushes[i].tick(pdepth, dt);
        let a = &world.ambushes[i];
        // Never spawn on top of the player; try again next tick.
        if !expired || (a.depth == pdepth && a.cell == pcell) {
            i += 1;
            continue;
        }
        let a = world.ambushes.remove(i);
        world.set_wall_state(a.depth, a.cell, WallState::Normal);
        actions::spawn(world, Controller::enemy(reaction), a.depth, a.cell);
        debug!("ambush sprung at depth {} cell {}", a.depth, a.cell);
        world.events.push(GameEvent::AmbushSpawned { depth: a.depth, cell: a.cell });
    }
}

/// Tear down corridors that fell behind the player.
pub fn retire(world: &mut World) {
    let horizon = world.player_actor().depth() - world.config.corridor.retire_above;
    while world.top_depth() < horizon {
        let Some(corridor) = world.pop_top() else { break };
        let depth = corridor.depth();

        for id in corridor.teardown(&mut world.fixtures) {
            if id != world.player && world.actors.is_active(id) {
                world.actors.release(id);
            }
        }
        let stray: Vec<_> = world.projectiles.iter().filter(|(_, p)| p.depth() == depth).map(|(h, _)| h).collect();
        for h in stray {
            world.projectiles.release(h);
        }
        world.ambushes.retain(|a| a.depth != depth);

        debug!("retired corridor {depth}");
        world.events.push(GameEvent::CorridorRetired { depth });
    }
}

/// Record the player's deepest depth this run.
pub fn track_progress(world: &mut World) {
    let depth = world.player_actor().depth();
    if depth <= world.run.best_depth {
        return;
    }
    world.run.best_depth = depth;
    world.events.push(GameEvent::ReachedDepth { depth });

    if depth as u32 > world.run.best_of_all_runs {
        if !world.run.record_broken {
            info!("record of {} broken", world.run.best_of_all_runs);
        }
        world.run.record_broken = true;
        world.events.push(GameEvent::NewRecord { depth });
    }
}
