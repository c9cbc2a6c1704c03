/// World: the complete state of one run.
///
/// ## Corridor window
///
/// Corridors live in a `VecDeque` indexed by `depth - top_depth`, so the
/// window is always contiguous:
///   - `get_corridor(d)` generates every missing depth down to `d`.
///   - retirement pops from the front and advances `top_depth`.
///
/// Asking for a depth above `top_depth` is a logic error and panics.
///
/// ## Entities
///
/// Actors, projectiles and wall/hole fixtures each live in their own
/// `Pool`. Corridor membership changes only through `enter_corridor` /
/// `exit_corridor`, one add or one remove at a time.
///
/// ## Events
///
/// Operations push `GameEvent`s into `events`; `step` drains them once per
/// tick and hands them to the presentation layer.

use std::collections::VecDeque;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::domain::actor::{Actor, ActorId, ActorLabel, Controller, Facing, PlayerController};
use crate::domain::ambush::AmbushInfo;
use crate::domain::grid::{Corridor, Fixture, WallState};
use crate::domain::pool::Pool;
use crate::domain::projectile::Projectile;
use crate::sim::actions;
use crate::sim::director;
use crate::sim::event::GameEvent;

/// Per-run progression.
#[derive(Clone, Debug, PartialEq)]
pub struct RunState {
    /// Deepest depth the player reached this run. Never decreases.
    pub best_depth: i32,
    /// Persisted best across runs, as loaded at run start.
    pub best_of_all_runs: u32,
    pub record_broken: bool,
    pub over: bool,
}

pub struct World {
    pub config: GameConfig,
    pub rng: StdRng,
    pub actors: Pool<Actor>,
    pub projectiles: Pool<Projectile>,
    pub fixtures: Pool<Fixture>,
    pub ambushes: Vec<AmbushInfo>,
    /// Pre-punched drop-chain holes for depths not generated yet.
    pub(crate) pending_holes: Vec<(i32, usize)>,
    pub player: ActorId,
    pub run: RunState,
    pub events: Vec<GameEvent>,
    /// Simulated seconds since the run started.
    pub time: f32,
    corridors: VecDeque<Corridor>,
    top_depth: i32,
}

impl World {
    /// Start a run: generate depth 0 and fade the player in at its centre.
    pub fn new(config: GameConfig, best_of_all_runs: u32) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let controller = Controller::Player(PlayerController::new(0, config.player.time_for_each_depth));
        let mut actors = Pool::new();
        let player = actors.acquire(Actor::new(controller, Facing::Right));

        let mut world = World {
            config,
            rng,
            actors,
            projectiles: Pool::new(),
            fixtures: Pool::new(),
            ambushes: Vec::new(),
            pending_holes: Vec::new(),
            player,
            run: RunState { best_depth: 0, best_of_all_runs, record_broken: false, over: false },
            events: Vec::new(),
            time: 0.0,
            corridors: VecDeque::new(),
            top_depth: 0,
        };
        world.get_corridor(0);
        let cell = world.config.corridor.length / 2;
        actions::appear(&mut world, player, 0, cell);
        world
    }

    // ── Corridor window ──

    pub fn top_depth(&self) -> i32 {
        self.top_depth
    }

    /// Deepest generated depth.
    pub fn bottom_depth(&self) -> i32 {
        self.top_depth + self.corridors.len() as i32 - 1
    }

    pub fn corridors(&self) -> impl Iterator<Item = &Corridor> {
        self.corridors.iter()
    }

    fn slot(&self, depth: i32) -> Option<usize> {
        let i = depth - self.top_depth;
        (i >= 0 && (i as usize) < self.corridors.len()).then_some(i as usize)
    }

    /// Corridor at `depth` if it is inside the active window.
    pub fn corridor(&self, depth: i32) -> Option<&Corridor> {
        self.slot(depth).map(|i| &self.corridors[i])
    }

    pub fn corridor_mut(&mut self, depth: i32) -> Option<&mut Corridor> {
        self.slot(depth).map(|i| &mut self.corridors[i])
    }

    /// Fetch a corridor, generating every missing depth down to `depth`.
    pub fn get_corridor(&mut self, depth: i32) -> &mut Corridor {
        assert!(
            depth >= self.top_depth,
            "corridor {depth} requested above the window top {}",
            self.top_depth
        );
        while self.corridors.is_empty() || self.bottom_depth() < depth {
            let next = if self.corridors.is_empty() { self.top_depth } else { self.bottom_depth() + 1 };
            let corridor = Corridor::new(next, self.corridor_origin(next), self.config.corridor.length, &mut self.fixtures);
            self.corridors.push_back(corridor);
            director::populate(self, next);
        }
        let i = (depth - self.top_depth) as usize;
        &mut self.corridors[i]
    }

    /// Open a hole in a live corridor. Returns true when a new hole was made.
    pub fn make_hole(&mut self, depth: i32, cell: usize) -> bool {
        match self.slot(depth) {
            Some(i) => self.corridors[i].make_hole(cell, &mut self.fixtures),
            None => false,
        }
    }

    pub fn set_wall_state(&mut self, depth: i32, cell: usize, state: WallState) {
        if let Some(i) = self.slot(depth) {
            self.corridors[i].set_wall_state(cell, state, &mut self.fixtures);
        }
    }

    /// World position of a corridor's cell 0.
    pub fn corridor_origin(&self, depth: i32) -> Vec2 {
        Vec2::new(0.0, -(1.0 + self.config.corridor.padding) * depth as f32)
    }

    /// Corridor-local point to world space.
    pub fn to_world(&self, depth: i32, local: Vec2) -> Vec2 {
        self.corridor_origin(depth) + local
    }

    /// Drop the top corridor, returning it for teardown.
    pub(crate) fn pop_top(&mut self) -> Option<Corridor> {
        let c = self.corridors.pop_front()?;
        self.top_depth += 1;
        Some(c)
    }

    /// Corridor the actor is bound to. Missing means the model is corrupt.
    pub fn corridor_of(&self, id: ActorId) -> &Corridor {
        let depth = self.actor(id).depth();
        self.corridor(depth)
            .unwrap_or_else(|| panic!("actor {id:?} bound to missing corridor {depth}"))
    }

    // ── Actors ──

    pub fn actor(&self, id: ActorId) -> &Actor {
        self.actors.get(id).unwrap_or_else(|| panic!("inactive actor {id:?}"))
    }

    pub fn actor_mut(&mut self, id: ActorId) -> &mut Actor {
        self.actors.get_mut(id).unwrap_or_else(|| panic!("inactive actor {id:?}"))
    }

    pub fn player_actor(&self) -> &Actor {
        self.actor(self.player)
    }

    pub fn player_controller(&self) -> &PlayerController {
        match &self.player_actor().controller {
            Controller::Player(p) => p,
            Controller::Enemy(_) => unreachable!("player handle points at an enemy"),
        }
    }

    /// Live enemies as `(id, depth, cell)`.
    pub fn enemies(&self) -> Vec<(ActorId, i32, usize)> {
        self.actors
            .iter()
            .filter(|(_, a)| a.label() == ActorLabel::Enemy && !a.is_dead())
            .map(|(id, a)| (id, a.depth(), a.cell()))
            .collect()
    }

    /// Move an actor into a corridor cell, leaving its previous corridor.
    pub fn enter_corridor(&mut self, id: ActorId, depth: i32, cell: usize) {
        self.exit_corridor(id);
        self.get_corridor(depth).add_actor(id);
        self.actor_mut(id).bind(depth, cell);
    }

    /// Remove an actor from the corridor it is bound to, if that is still live.
    pub fn exit_corridor(&mut self, id: ActorId) {
        let depth = self.actor(id).depth();
        if let Some(c) = self.corridor_mut(depth) {
            c.remove_actor(id);
        }
    }

    /// Call `f` on every live actor in `[min_cell, max_cell]` of `depth`.
    /// The id list is taken up front, so `f` may freely mutate the world.
    pub fn for_each_actor_in_range<F>(&mut self, depth: i32, excluding: Option<ActorId>, min_cell: usize, max_cell: usize, mut f: F)
    where
        F: FnMut(&mut World, ActorId),
    {
        let Some(c) = self.corridor(depth) else { return };
        let ids = c.actors_in_range(excluding, min_cell, max_cell, &self.actors);
        for id in ids {
            if self.actors.get(id).is_some_and(|a| !a.is_dead()) {
                f(self, id);
            }
        }
    }

    /// Take an enemy out of play for good.
    pub fn release_actor(&mut self, id: ActorId) {
        self.exit_corridor(id);
        self.actors.release(id);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::action::ActionState;

    /// Seeded config with an empty, door-less, chain-less world.
    pub(crate) fn quiet_config() -> GameConfig {
        let mut cfg = GameConfig::default();
        cfg.seed = Some(7);
        cfg.enemy.max_enemies = 0;
        cfg.generator.max_doors = 0;
        cfg.generator.drop_chain_chance = 0.0;
        cfg
    }

    /// Run the world until the player's spawn fade-in is over.
    pub(crate) fn settled(cfg: GameConfig) -> World {
        let mut w = World::new(cfg, 0);
        let fade = w.config.actor.fade_in_duration;
        let p = w.player;
        actions::tick_actor(&mut w, p, fade + 0.01);
        w.events.clear();
        w
    }

    #[test]
    fn new_world_has_top_corridor_and_player() {
        let w = World::new(quiet_config(), 5);
        assert_eq!(w.top_depth(), 0);
        assert_eq!(w.bottom_depth(), 0);
        let p = w.player_actor();
        assert_eq!((p.depth(), p.cell()), (0, 4));
        assert_eq!(p.action_state(), ActionState::FadingIn);
        assert_eq!(w.corridor(0).unwrap().actors(), &[w.player]);
        assert_eq!(w.run.best_of_all_runs, 5);
    }

    #[test]
    fn get_corridor_fills_the_gap() {
        let mut w = World::new(quiet_config(), 0);
        w.get_corridor(4);
        assert_eq!(w.bottom_depth(), 4);
        let depths: Vec<i32> = w.corridors().map(Corridor::depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 3, 4]);
        assert_eq!(w.corridor(3).unwrap().origin(), Vec2::new(0.0, -4.5));
    }

    #[test]
    #[should_panic(expected = "above the window top")]
    fn retired_depth_cannot_be_fetched() {
        let mut w = World::new(quiet_config(), 0);
        w.get_corridor(1);
        let c = w.pop_top().unwrap();
        c.teardown(&mut w.fixtures);
        w.get_corridor(0);
    }

    #[test]
    fn enter_corridor_keeps_single_membership() {
        let mut w = World::new(quiet_config(), 0);
        let p = w.player;
        w.enter_corridor(p, 2, 1);
        assert!(w.corridor(0).unwrap().actors().is_empty());
        assert_eq!(w.corridor(2).unwrap().actors(), &[p]);
        assert_eq!((w.actor(p).depth(), w.actor(p).cell()), (2, 1));
    }

    #[test]
    fn range_query_skips_excluded_and_dead() {
        let mut w = settled(quiet_config());
        let p = w.player;
        let mut seen = Vec::new();
        w.for_each_actor_in_range(0, None, 0, 8, |_, id| seen.push(id));
        assert_eq!(seen, vec![p]);

        seen.clear();
        w.for_each_actor_in_range(0, Some(p), 0, 8, |_, id| seen.push(id));
        assert!(seen.is_empty());

        w.actor_mut(p).mark_dead();
        w.for_each_actor_in_range(0, None, 0, 8, |_, id| seen.push(id));
        assert!(seen.is_empty());
    }
}
