/// Projectile motion inside one corridor.
///
/// Positions are local to the originating corridor (cell `i` at `(i, 0)`).
/// The corridor row is the box `x ∈ [-0.5, len - 0.5]`, `y ∈ [-0.5, 0.5]`;
/// leaving it is the only geometry collision there is. Each tick the full
/// displacement is tested against the box first: if an edge would be
/// crossed, the projectile stops exactly on that edge and is impacted.
///
/// Actor hits are swept per tick: whenever the rounded cell changes, the
/// caller gets the inclusive range of cells entered this tick.

use glam::Vec2;

use super::actor::ActorId;

pub type ProjectileId = super::pool::Handle<Projectile>;

#[derive(Clone, Debug)]
pub struct Projectile {
    depth: i32,
    owner: Option<ActorId>,
    position: Vec2,
    direction: Vec2,
    speed: f32,
    cell: usize,
    impacted: bool,
    travelled: f32,
    max_trail: f32,
    trail: f32,
}

/// Result of one `Projectile::advance`.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct ProjectileStep {
    /// Inclusive cell range swept this tick, if the cell changed.
    pub hits: Option<(usize, usize)>,
    /// Hit a corridor edge during this tick.
    pub impacted_now: bool,
    /// Trail has fully shrunk; release the projectile.
    pub expired: bool,
}

/// Unit vector for an angle in degrees (0 = right, 90 = up).
pub fn direction_from_angle(degrees: f32) -> Vec2 {
    let r = degrees.to_radians();
    Vec2::new(r.cos(), r.sin())
}

impl Projectile {
    pub fn new(
        depth: i32,
        owner: Option<ActorId>,
        position: Vec2,
        direction: Vec2,
        speed: f32,
        trail_length: f32,
        corridor_len: usize,
    ) -> Self {
        Projectile {
            depth,
            owner,
            position,
            direction: direction.normalize_or_zero(),
            speed,
            cell: cell_at(position.x, corridor_len),
            impacted: false,
            travelled: 0.0,
            max_trail: trail_length,
            trail: 0.0,
        }
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn owner(&self) -> Option<ActorId> {
        self.owner
    }

    /// Head position, corridor-local.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn cell(&self) -> usize {
        self.cell
    }

    pub fn is_impacted(&self) -> bool {
        self.impacted
    }

    /// Visible trail behind the head.
    pub fn trail_length(&self) -> f32 {
        self.trail
    }

    /// Trail end, corridor-local.
    pub fn tail(&self) -> Vec2 {
        self.position - self.direction * self.trail
    }

    pub fn advance(&mut self, dt: f32, corridor_len: usize) -> ProjectileStep {
        let mut step = ProjectileStep::default();

        if self.impacted {
            self.trail -= self.speed * dt;
            step.expired = self.trail <= 0.0;
            return step;
        }

        let delta = self.direction * self.speed * dt;
        let max_x = corridor_len as f32 - 0.5;
        let (tx, edge_x) = crossing(self.position.x, delta.x, -0.5, max_x);
        let (ty, edge_y) = crossing(self.position.y, delta.y, -0.5, 0.5);

        if tx.min(ty) <= 1.0 {
            let t = tx.min(ty);
            self.position += delta * t;
            // Snap the crossed axis so float error never leaves the box.
            if tx <= ty {
                self.position.x = edge_x;
            } else {
                self.position.y = edge_y;
            }
            self.travelled += delta.length() * t;
            self.impacted = true;
            step.impacted_now = true;
        } else {
            self.position += delta;
            self.travelled += delta.length();
        }
        self.trail = self.travelled.min(self.max_trail);

        let next = cell_at(self.position.x, corridor_len);
        if next != self.cell {
            step.hits = Some(if next > self.cell { (self.cell + 1, next) } else { (next, self.cell - 1) });
            self.cell = next;
        }
        step
    }
}

/// Fraction of `delta` at which `p` leaves `[lo, hi]`, and the edge it hits.
/// `INFINITY` when it never does.
fn crossing(p: f32, delta: f32, lo: f32, hi: f32) -> (f32, f32) {
    if delta > 0.0 {
        ((hi - p) / delta, hi)
    } else if delta < 0.0 {
        ((lo - p) / delta, lo)
    } else {
        (f32::INFINITY, p)
    }
}

fn cell_at(x: f32, corridor_len: usize) -> usize {
    x.round().clamp(0.0, (corridor_len - 1) as f32) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shot(x: f32, dir: Vec2, speed: f32, len: usize) -> Projectile {
        Projectile::new(0, None, Vec2::new(x, 0.0), dir, speed, 3.0, len)
    }

    #[test]
    fn stops_exactly_at_right_edge() {
        let mut p = shot(3.5, Vec2::X, 2.0, 5);
        let step = p.advance(1.0, 5);
        assert!(step.impacted_now);
        assert!(p.is_impacted());
        assert_eq!(p.position(), Vec2::new(4.5, 0.0));
    }

    #[test]
    fn one_unit_from_edge_never_overshoots() {
        for s in [1.0_f32, 3.0, 7.25] {
            let mut p = shot(3.5, Vec2::X, s, 5);
            p.advance(1.0, 5);
            assert!(p.is_impacted());
            assert_eq!(p.position().x, 4.5);
        }
    }

    #[test]
    fn stops_at_left_edge() {
        let mut p = shot(1.0, -Vec2::X, 10.0, 5);
        p.advance(1.0, 5);
        assert_eq!(p.position().x, -0.5);
        assert_eq!(p.cell(), 0);
    }

    #[test]
    fn floor_shot_hits_the_bottom() {
        let mut p = Projectile::new(0, None, Vec2::new(2.0, 0.05), direction_from_angle(-90.0), 30.0, 3.0, 5);
        let step = p.advance(0.1, 5);
        assert!(step.impacted_now);
        assert_eq!(p.position().y, -0.5);
        assert_eq!(step.hits, None);
    }

    #[test]
    fn free_flight_is_not_impacted() {
        let mut p = shot(0.0, Vec2::X, 1.0, 9);
        let step = p.advance(0.25, 9);
        assert_eq!(step, ProjectileStep::default());
        assert!((p.position().x - 0.25).abs() < 1e-6);
        assert!((p.trail_length() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn sweeps_every_cell_entered_in_one_tick() {
        let mut p = shot(1.0, Vec2::X, 3.0, 9);
        let step = p.advance(1.0, 9);
        assert_eq!(step.hits, Some((2, 4)));

        let mut p = shot(6.0, -Vec2::X, 3.0, 9);
        let step = p.advance(1.0, 9);
        assert_eq!(step.hits, Some((3, 5)));
    }

    #[test]
    fn impact_tick_still_sweeps() {
        let mut p = shot(2.0, Vec2::X, 100.0, 5);
        let step = p.advance(1.0, 5);
        assert!(step.impacted_now);
        assert_eq!(step.hits, Some((3, 4)));
    }

    #[test]
    fn trail_shrinks_after_impact_then_expires() {
        let mut p = shot(0.0, Vec2::X, 4.0, 5);
        p.advance(2.0, 5);
        assert!(p.is_impacted());
        assert_eq!(p.trail_length(), 3.0);

        let step = p.advance(0.5, 5);
        assert!(!step.expired);
        assert_eq!(step.hits, None);
        assert!((p.trail_length() - 1.0).abs() < 1e-6);
        assert_eq!(p.position().x, 4.5);

        assert!(p.advance(0.5, 5).expired);
    }
}
