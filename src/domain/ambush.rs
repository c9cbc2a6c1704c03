/// Delayed enemy spawn behind a door.

#[derive(Clone, Debug, PartialEq)]
pub struct AmbushInfo {
    pub depth: i32,
    pub cell: usize,
    /// Seconds left once active.
    pub countdown: f32,
    pub active: bool,
}

impl AmbushInfo {
    pub fn new(depth: i32, cell: usize, countdown: f32) -> Self {
        AmbushInfo { depth, cell, countdown, active: false }
    }

    /// Arm once the player has gone deeper than the door, then count down.
    /// Returns true when the countdown has run out.
    pub fn tick(&mut self, player_depth: i32, dt: f32) -> bool {
        if !self.active {
            if player_depth <= self.depth {
                return false;
            }
            self.active = true;
        }
        self.countdown -= dt;
        self.countdown <= 0.0
    }
}
