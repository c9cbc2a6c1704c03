/// Grid model: corridors of cells.
///
/// A corridor is one horizontal row of cells at a fixed depth. Each cell
/// has a wall state (plain wall or door) and a one-way hole flag. The
/// visual markers for walls and holes are pooled `Fixture`s so that a
/// retired corridor hands them back for reuse.
///
/// Corridors only know *which* actors are inside them (membership). The
/// actor list is mutated exclusively through `World::enter_corridor` /
/// `World::exit_corridor`.
///
/// Local coordinates: cell `i` is centred at `(i, 0)`; the occupied row
/// spans `x ∈ [-0.5, len - 0.5)`, `y ∈ [-0.5, 0.5)`.

use glam::Vec2;

use super::actor::{Actor, ActorId};
use super::pool::{Handle, Pool};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WallState {
    Normal,
    Door,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FixtureKind {
    Wall(WallState),
    Hole,
}

/// Wall or hole marker, exposed to the presentation layer.
#[derive(Clone, Debug)]
pub struct Fixture {
    pub depth: i32,
    pub cell: usize,
    /// World position (corridor origin + local offset).
    pub position: Vec2,
    pub kind: FixtureKind,
}

pub type FixtureId = Handle<Fixture>;

#[derive(Clone, Debug)]
pub struct Cell {
    wall_state: WallState,
    has_hole: bool,
    wall: FixtureId,
    hole: Option<FixtureId>,
}

impl Cell {
    pub fn wall_state(&self) -> WallState {
        self.wall_state
    }

    pub fn has_hole(&self) -> bool {
        self.has_hole
    }

    pub fn hole_fixture(&self) -> Option<FixtureId> {
        self.hole
    }
}

pub struct Corridor {
    depth: i32,
    origin: Vec2,
    cells: Vec<Cell>,
    actors: Vec<ActorId>,
}

impl Corridor {
    /// Build a corridor of `length` plain cells, acquiring one wall fixture per cell.
    pub fn new(depth: i32, origin: Vec2, length: usize, fixtures: &mut Pool<Fixture>) -> Self {
        assert!(length > 0, "corridor needs at least one cell");
        let cells = (0..length)
            .map(|i| Cell {
                wall_state: WallState::Normal,
                has_hole: false,
                wall: fixtures.acquire(Fixture {
                    depth,
                    cell: i,
                    position: origin + Self::cell_position(i),
                    kind: FixtureKind::Wall(WallState::Normal),
                }),
                hole: None,
            })
            .collect();
        Corridor { depth, origin, cells, actors: Vec::new() }
    }

    /// Local position of a cell centre.
    #[inline]
    pub fn cell_position(cell: usize) -> Vec2 {
        Vec2::new(cell as f32, 0.0)
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn cell(&self, cell: usize) -> &Cell {
        &self.cells[cell]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Is a signed cell index inside this corridor?
    #[inline]
    pub fn contains(&self, cell: i64) -> bool {
        cell >= 0 && (cell as usize) < self.cells.len()
    }

    pub fn has_hole(&self, cell: usize) -> bool {
        self.cells.get(cell).is_some_and(|c| c.has_hole)
    }

    /// Open a hole in `cell`. Idempotent; returns true only when a new hole was made.
    pub fn make_hole(&mut self, cell: usize, fixtures: &mut Pool<Fixture>) -> bool {
        let position = self.origin + Self::cell_position(cell) - Vec2::Y;
        let depth = self.depth;
        let c = &mut self.cells[cell];
        if c.has_hole {
            return false;
        }
        c.has_hole = true;
        c.hole = Some(fixtures.acquire(Fixture { depth, cell, position, kind: FixtureKind::Hole }));
        true
    }

    pub fn set_wall_state(&mut self, cell: usize, state: WallState, fixtures: &mut Pool<Fixture>) {
        let c = &mut self.cells[cell];
        c.wall_state = state;
        if let Some(f) = fixtures.get_mut(c.wall) {
            f.kind = FixtureKind::Wall(state);
        }
    }

    /// Nearest cell with a hole, scanning outward from `from` in both
    /// directions. Equal distances resolve to the left.
    pub fn closest_hole(&self, from: usize) -> Option<usize> {
        let len = self.cells.len();
        for d in 0..len {
            if d <= from && self.cells[from - d].has_hole {
                return Some(from - d);
            }
            if from + d < len && self.cells[from + d].has_hole {
                return Some(from + d);
            }
        }
        None
    }

    // ── Actor membership ──

    pub fn actors(&self) -> &[ActorId] {
        &self.actors
    }

    pub(crate) fn add_actor(&mut self, id: ActorId) {
        assert!(!self.actors.contains(&id), "actor {id:?} entered corridor {} twice", self.depth);
        self.actors.push(id);
    }

    pub(crate) fn remove_actor(&mut self, id: ActorId) {
        if let Some(i) = self.actors.iter().position(|&a| a == id) {
            self.actors.swap_remove(i);
        }
    }

    /// Live actors standing in `[min_cell, max_cell]`, except `excluding`.
    pub fn actors_in_range(
        &self,
        excluding: Option<ActorId>,
        min_cell: usize,
        max_cell: usize,
        actors: &Pool<Actor>,
    ) -> Vec<ActorId> {
        self.actors
            .iter()
            .copied()
            .filter(|&id| Some(id) != excluding)
            .filter(|&id| {
                actors.get(id).is_some_and(|a| {
                    !a.is_dead() && a.cell() >= min_cell && a.cell() <= max_cell
                })
            })
            .collect()
    }

    /// Release every fixture and hand back the actors still inside.
    pub fn teardown(self, fixtures: &mut Pool<Fixture>) -> Vec<ActorId> {
        for c in &self.cells {
            fixtures.release(c.wall);
            if let Some(h) = c.hole {
                fixtures.release(h);
            }
        }
        self.actors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor(len: usize, fixtures: &mut Pool<Fixture>) -> Corridor {
        Corridor::new(0, Vec2::ZERO, len, fixtures)
    }

    #[test]
    fn new_corridor_has_one_wall_fixture_per_cell() {
        let mut fx = Pool::new();
        let c = corridor(7, &mut fx);
        assert_eq!(c.len(), 7);
        assert_eq!(fx.len(), 7);
        assert!(c.cells().iter().all(|cell| !cell.has_hole()));
    }

    #[test]
    fn make_hole_is_idempotent() {
        let mut fx = Pool::new();
        let mut c = corridor(5, &mut fx);
        assert!(c.make_hole(2, &mut fx));
        let fixture = c.cell(2).hole_fixture();
        let count = fx.len();

        assert!(!c.make_hole(2, &mut fx));
        assert!(c.has_hole(2));
        assert_eq!(c.cell(2).hole_fixture(), fixture);
        assert_eq!(fx.len(), count);
        assert_eq!(fx.get(fixture.unwrap()).unwrap().kind, FixtureKind::Hole);
    }

    #[test]
    fn set_wall_state_updates_fixture() {
        let mut fx = Pool::new();
        let mut c = corridor(3, &mut fx);
        c.set_wall_state(1, WallState::Door, &mut fx);
        assert_eq!(c.cell(1).wall_state(), WallState::Door);
        let f = fx.get(c.cell(1).wall).unwrap();
        assert_eq!(f.kind, FixtureKind::Wall(WallState::Door));
    }

    #[test]
    fn closest_hole_prefers_left_on_tie() {
        let mut fx = Pool::new();
        let mut c = corridor(9, &mut fx);
        c.make_hole(2, &mut fx);
        c.make_hole(6, &mut fx);
        assert_eq!(c.closest_hole(4), Some(2));
    }

    #[test]
    fn closest_hole_picks_nearest_side() {
        let mut fx = Pool::new();
        let mut c = corridor(9, &mut fx);
        c.make_hole(0, &mut fx);
        c.make_hole(6, &mut fx);
        assert_eq!(c.closest_hole(4), Some(6));
        assert_eq!(c.closest_hole(6), Some(6));
        assert_eq!(c.closest_hole(1), Some(0));
    }

    #[test]
    fn closest_hole_none_without_holes() {
        let mut fx = Pool::new();
        let c = corridor(4, &mut fx);
        assert_eq!(c.closest_hole(0), None);
        assert_eq!(c.closest_hole(3), None);
    }

    #[test]
    fn teardown_releases_fixtures() {
        let mut fx = Pool::new();
        let mut c = corridor(4, &mut fx);
        c.make_hole(1, &mut fx);
        assert_eq!(fx.len(), 5);
        let actors = c.teardown(&mut fx);
        assert!(actors.is_empty());
        assert_eq!(fx.len(), 0);
        assert_eq!(fx.free_len(), 5);
    }
}
