/// Enemy AI: reaction-delayed state machine.
///
/// States:
///   - **Idle**: waits until the player is alive on this actor's depth.
///   - **MoveToPlayer**: hole-seeking pursuit across depths.
///   - **FireAtPlayer**: on the player's depth, face the player and shoot.
///   - **Restart**: initial pseudo-state, resolves to Idle on the first tick.
///
/// Every state *change* arms the reaction timer. Transitions are evaluated
/// every tick; the per-state update is suppressed until the timer runs out.
///
/// The brain never touches the world. It reads an `AiView` and returns an
/// `Intent`, which the tick driver feeds into the same actor operations the
/// player uses.

use super::actor::Facing;
use super::grid::Corridor;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AiState {
    Restart,
    Idle,
    MoveToPlayer,
    FireAtPlayer,
}

/// What the enemy wants its actor to do this tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    Wait,
    Move(i32),
    Descend,
    Ascend,
    Fire,
}

/// Read-only snapshot the brain decides from.
pub struct AiView<'a> {
    pub depth: i32,
    pub cell: usize,
    pub facing: Facing,
    pub player_alive: bool,
    pub player_depth: i32,
    pub player_cell: usize,
    pub corridor: &'a Corridor,
    /// Corridor one depth up, if still in the active window.
    pub corridor_above: Option<&'a Corridor>,
    /// `(depth, cell)` of every other live enemy.
    pub enemies: &'a [(i32, usize)],
}

impl AiView<'_> {
    fn enemy_at(&self, depth: i32, cell: usize) -> bool {
        self.enemies.iter().any(|&(d, c)| d == depth && c == cell)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Climb {
    Up,
    Down,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Target {
    cell: usize,
    climb: Climb,
}

#[derive(Clone, Debug)]
pub struct EnemyBrain {
    state: AiState,
    reaction_speed: f32,
    reaction_timer: f32,
    target: Option<Target>,
    /// `(own depth, player depth)` when `target` was computed.
    target_depths: Option<(i32, i32)>,
    /// Direction chosen to leave the player's cell, kept until we have left.
    step_away: Option<i32>,
}

impl EnemyBrain {
    pub fn new(reaction_speed: f32) -> Self {
        EnemyBrain {
            state: AiState::Restart,
            reaction_speed,
            reaction_timer: 0.0,
            target: None,
            target_depths: None,
            step_away: None,
        }
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    pub fn reaction_timer(&self) -> f32 {
        self.reaction_timer
    }

    /// One decision tick.
    pub fn update(&mut self, view: &AiView, dt: f32) -> Intent {
        let next = self.next_state(view);
        self.enter(next);

        if self.reaction_timer > 0.0 {
            self.reaction_timer -= dt;
            return Intent::Wait;
        }

        match self.state {
            AiState::Idle => Intent::Wait,
            AiState::MoveToPlayer => self.move_to_player(view),
            AiState::FireAtPlayer => self.fire_at_player(view),
            AiState::Restart => unreachable!("restart resolves before any update"),
        }
    }

    fn next_state(&self, view: &AiView) -> AiState {
        let same_depth = view.player_depth == view.depth;
        match self.state {
            AiState::Restart => AiState::Idle,
            AiState::Idle => {
                if view.player_alive && same_depth { AiState::MoveToPlayer } else { AiState::Idle }
            }
            AiState::MoveToPlayer => {
                if !view.player_alive {
                    AiState::Idle
                } else if same_depth {
                    AiState::FireAtPlayer
                } else {
                    AiState::MoveToPlayer
                }
            }
            AiState::FireAtPlayer => {
                if !view.player_alive {
                    AiState::Idle
                } else if !same_depth {
                    AiState::MoveToPlayer
                } else {
                    AiState::FireAtPlayer
                }
            }
        }
    }

    fn enter(&mut self, next: AiState) {
        if next == self.state {
            return;
        }
        self.state = next;
        self.reaction_timer = self.reaction_speed;
        self.step_away = None;
    }

    // ── MoveToPlayer ──

    fn move_to_player(&mut self, view: &AiView) -> Intent {
        let depths = (view.depth, view.player_depth);
        if self.target.is_none() || self.target_depths != Some(depths) {
            self.target = seek_hole(view);
            self.target_depths = Some(depths);
        }
        let Some(target) = self.target else { return Intent::Wait };

        if view.cell != target.cell {
            let dx = if target.cell > view.cell { 1 } else { -1 };
            let dest = (view.cell as i64 + dx as i64) as usize;
            if view.enemy_at(view.depth, dest) {
                return Intent::Wait;
            }
            return Intent::Move(dx);
        }

        match target.climb {
            Climb::Down if !view.enemy_at(view.depth + 1, view.cell) => Intent::Descend,
            Climb::Up if !view.enemy_at(view.depth - 1, view.cell) => Intent::Ascend,
            _ => Intent::Wait,
        }
    }

    // ── FireAtPlayer ──

    fn fire_at_player(&mut self, view: &AiView) -> Intent {
        let last = view.corridor.len() - 1;

        if view.cell == view.player_cell {
            // Turning away flips our facing, so the first choice must stick.
            let dx = *self.step_away.get_or_insert(if view.cell == last {
                -1
            } else if view.cell == 0 {
                1
            } else {
                -view.facing.sign()
            });
            return Intent::Move(dx);
        }
        self.step_away = None;

        let toward = if view.player_cell > view.cell { 1 } else { -1 };
        if view.facing.sign() != toward {
            // Moving against our facing only turns.
            return Intent::Move(toward);
        }

        // Hold fire if another enemy stands anywhere down the barrel.
        let blocked = view.enemies.iter().any(|&(d, c)| {
            d == view.depth && if toward > 0 { c > view.cell } else { c < view.cell }
        });
        if blocked { Intent::Wait } else { Intent::Fire }
    }
}

/// Where to go to change depth toward the player.
/// Down: nearest hole in our own floor, or our own cell (break through).
/// Up: nearest hole in the floor above, if any.
fn seek_hole(view: &AiView) -> Option<Target> {
    if view.player_depth < view.depth {
        let above = view.corridor_above?;
        let cell = above.closest_hole(view.cell)?;
        Some(Target { cell, climb: Climb::Up })
    } else if view.player_depth > view.depth {
        let cell = view.corridor.closest_hole(view.cell).unwrap_or(view.cell);
        Some(Target { cell, climb: Climb::Down })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Fixture;
    use crate::domain::pool::Pool;
    use glam::Vec2;

    struct Fixtures {
        fx: Pool<Fixture>,
        own: Corridor,
        above: Corridor,
    }

    fn setup(len: usize) -> Fixtures {
        let mut fx = Pool::new();
        let above = Corridor::new(1, Vec2::ZERO, len, &mut fx);
        let own = Corridor::new(2, Vec2::new(0.0, -1.5), len, &mut fx);
        Fixtures { fx, own, above }
    }

    fn view<'a>(f: &'a Fixtures, cell: usize, player: (bool, i32, usize), enemies: &'a [(i32, usize)]) -> AiView<'a> {
        AiView {
            depth: 2,
            cell,
            facing: Facing::Right,
            player_alive: player.0,
            player_depth: player.1,
            player_cell: player.2,
            corridor: &f.own,
            corridor_above: Some(&f.above),
            enemies,
        }
    }

    /// Tick until the reaction timer is spent, returning the first real intent.
    fn settle(brain: &mut EnemyBrain, v: &AiView) -> Intent {
        for _ in 0..100 {
            let i = brain.update(v, 0.1);
            if brain.reaction_timer() <= 0.0 && i != Intent::Wait {
                return i;
            }
        }
        Intent::Wait
    }

    #[test]
    fn restart_resolves_to_idle() {
        let f = setup(9);
        let mut brain = EnemyBrain::new(0.3);
        assert_eq!(brain.state(), AiState::Restart);
        brain.update(&view(&f, 4, (true, 0, 4), &[]), 0.1);
        assert_eq!(brain.state(), AiState::Idle);
    }

    #[test]
    fn idle_stays_idle_while_player_elsewhere() {
        let f = setup(9);
        let mut brain = EnemyBrain::new(0.3);
        for _ in 0..20 {
            assert_eq!(brain.update(&view(&f, 4, (true, 0, 4), &[]), 0.1), Intent::Wait);
        }
        assert_eq!(brain.state(), AiState::Idle);
    }

    #[test]
    fn player_arrives_then_dies() {
        let f = setup(9);
        let mut brain = EnemyBrain::new(0.3);
        brain.update(&view(&f, 4, (true, 2, 7), &[]), 0.016);
        assert_eq!(brain.state(), AiState::Idle);

        brain.update(&view(&f, 4, (true, 2, 7), &[]), 0.016);
        assert_eq!(brain.state(), AiState::MoveToPlayer);
        assert!(brain.reaction_timer() > 0.0);

        // Player dies instantly: straight back to Idle, never FireAtPlayer.
        brain.update(&view(&f, 4, (false, 2, 7), &[]), 0.016);
        assert_eq!(brain.state(), AiState::Idle);
    }

    #[test]
    fn reaction_delay_suppresses_updates() {
        let f = setup(9);
        let mut brain = EnemyBrain::new(0.5);
        let v = view(&f, 2, (true, 2, 6), &[]);
        // Restart → Idle → MoveToPlayer → FireAtPlayer, each change re-arms.
        for _ in 0..3 {
            assert_eq!(brain.update(&v, 0.01), Intent::Wait);
        }
        assert_eq!(brain.state(), AiState::FireAtPlayer);
        let timer = brain.reaction_timer();
        assert!(timer > 0.0);

        // Same state: timer keeps counting down, not re-armed.
        brain.update(&v, 0.1);
        assert!(brain.reaction_timer() < timer);
        assert_eq!(settle(&mut brain, &v), Intent::Fire);
    }

    #[test]
    fn turns_to_face_player_before_firing() {
        let f = setup(9);
        let mut brain = EnemyBrain::new(0.0);
        let v = view(&f, 5, (true, 2, 1), &[]);
        assert_eq!(settle(&mut brain, &v), Intent::Move(-1));
    }

    #[test]
    fn steps_off_the_players_cell() {
        let f = setup(9);
        let mut brain = EnemyBrain::new(0.0);
        assert_eq!(settle(&mut brain, &view(&f, 8, (true, 2, 8), &[])), Intent::Move(-1));

        let mut brain = EnemyBrain::new(0.0);
        assert_eq!(settle(&mut brain, &view(&f, 0, (true, 2, 0), &[])), Intent::Move(1));

        // Mid-corridor: away from facing (facing right → step left).
        let mut brain = EnemyBrain::new(0.0);
        let mut v = view(&f, 4, (true, 2, 4), &[]);
        assert_eq!(settle(&mut brain, &v), Intent::Move(-1));

        // The first move only turned us; keep heading the same way.
        v.facing = Facing::Left;
        assert_eq!(brain.update(&v, 0.1), Intent::Move(-1));

        // Off the cell, the choice is forgotten.
        let v = view(&f, 3, (true, 2, 4), &[]);
        assert_eq!(brain.update(&v, 0.1), Intent::Fire);
        let mut v = view(&f, 4, (true, 2, 4), &[]);
        v.facing = Facing::Left;
        assert_eq!(brain.update(&v, 0.1), Intent::Move(1));
    }

    #[test]
    fn holds_fire_when_an_enemy_is_in_line() {
        let f = setup(9);
        let mut brain = EnemyBrain::new(0.0);
        let others = [(2, 7)];
        let v = view(&f, 3, (true, 2, 6), &others);
        for _ in 0..10 {
            assert_ne!(brain.update(&v, 0.1), Intent::Fire);
        }
        // Enemy behind us does not block.
        let behind = [(2, 1)];
        let v = view(&f, 3, (true, 2, 6), &behind);
        assert_eq!(settle(&mut brain, &v), Intent::Fire);
    }

    fn chase_brain(f: &Fixtures) -> EnemyBrain {
        let mut brain = EnemyBrain::new(0.0);
        // Meet the player on our depth, then let them leave.
        let here = view(f, 0, (true, 2, 0), &[]);
        brain.update(&here, 0.1);
        brain.update(&here, 0.1);
        brain
    }

    #[test]
    fn chases_down_through_nearest_hole() {
        let mut f = setup(9);
        f.own.make_hole(6, &mut f.fx);
        let mut brain = chase_brain(&f);
        let v = view(&f, 4, (true, 3, 0), &[]);
        assert_eq!(settle(&mut brain, &v), Intent::Move(1));
        let v = view(&f, 6, (true, 3, 0), &[]);
        assert_eq!(settle(&mut brain, &v), Intent::Descend);
    }

    #[test]
    fn breaks_own_floor_when_no_hole() {
        let f = setup(9);
        let mut brain = chase_brain(&f);
        let v = view(&f, 4, (true, 5, 0), &[]);
        assert_eq!(settle(&mut brain, &v), Intent::Descend);
    }

    #[test]
    fn chases_up_through_hole_above() {
        let mut f = setup(9);
        f.above.make_hole(1, &mut f.fx);
        let mut brain = chase_brain(&f);
        let v = view(&f, 3, (true, 0, 3), &[]);
        assert_eq!(settle(&mut brain, &v), Intent::Move(-1));
        let v = view(&f, 1, (true, 0, 3), &[]);
        assert_eq!(settle(&mut brain, &v), Intent::Ascend);
    }

    #[test]
    fn waits_when_no_way_up() {
        let f = setup(9);
        let mut brain = chase_brain(&f);
        let v = view(&f, 3, (true, 0, 3), &[]);
        for _ in 0..10 {
            assert_eq!(brain.update(&v, 0.1), Intent::Wait);
        }
    }

    #[test]
    fn does_not_stack_onto_other_enemies() {
        let mut f = setup(9);
        f.own.make_hole(6, &mut f.fx);
        let mut brain = chase_brain(&f);
        let blocker = [(2, 5)];
        let v = view(&f, 4, (true, 3, 0), &blocker);
        for _ in 0..10 {
            assert_eq!(brain.update(&v, 0.1), Intent::Wait);
        }
        let below = [(3, 6)];
        let v = view(&f, 6, (true, 3, 0), &below);
        for _ in 0..10 {
            assert_eq!(brain.update(&v, 0.1), Intent::Wait);
        }
    }
}
