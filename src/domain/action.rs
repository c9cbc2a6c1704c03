/// Timed actions: the single action slot every actor owns.
///
/// An action is a tagged state plus `{elapsed, duration}`. The tick driver
/// advances it, runs the per-tick callback for its kind, and runs the
/// completion callback exactly once when `elapsed` reaches `duration`.
/// Cancelling (only death does this) simply drops the value; the
/// completion callback never runs for a cancelled action.

use super::actor::Facing;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ActionKind {
    /// Visual-only turn; facing flips on completion.
    Turning { to: Facing },
    /// Walk one cell; binds to `to` on completion.
    Moving { from: usize, to: usize },
    /// Drop into the corridor below. `kicked` once the midpoint hit ran.
    Descending { kicked: bool },
    /// Climb into the corridor above. `kicked` once the midpoint hit ran.
    Ascending { kicked: bool },
    /// Shooting the floor open; the last shot makes the hole.
    BreakingFloor { shots_fired: u32 },
    Firing,
    FadingIn,
    /// Dying pose drift, then fade. Ends with the actor pooled.
    Dying { drift: f32 },
}

/// Coarse view of the action slot, for presentation and tests.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActionState {
    Idle,
    Turning,
    Moving,
    Descending,
    Ascending,
    BreakingFloor,
    Firing,
    FadingIn,
    Dying,
}

#[derive(Clone, Debug)]
pub struct TimedAction {
    pub kind: ActionKind,
    elapsed: f32,
    duration: f32,
}

impl TimedAction {
    pub fn new(kind: ActionKind, duration: f32) -> Self {
        TimedAction { kind, elapsed: 0.0, duration: duration.max(0.0) }
    }

    /// Advance by `dt`. Returns true once the duration has elapsed.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Normalized progress 0.0 → 1.0.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 { 1.0 } else { self.elapsed / self.duration }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn state(&self) -> ActionState {
        match self.kind {
            ActionKind::Turning { .. } => ActionState::Turning,
            ActionKind::Moving { .. } => ActionState::Moving,
            ActionKind::Descending { .. } => ActionState::Descending,
            ActionKind::Ascending { .. } => ActionState::Ascending,
            ActionKind::BreakingFloor { .. } => ActionState::BreakingFloor,
            ActionKind::Firing => ActionState::Firing,
            ActionKind::FadingIn => ActionState::FadingIn,
            ActionKind::Dying { .. } => ActionState::Dying,
        }
    }
}

// ── Curves ──

/// Smoothstep, used for walking and dropping.
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Overshoots past 1.0 before settling; the climb pops over the ledge.
pub fn ease_out_back(t: f32) -> f32 {
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;
    let t = t.clamp(0.0, 1.0) - 1.0;
    1.0 + C3 * t * t * t + C1 * t * t
}
