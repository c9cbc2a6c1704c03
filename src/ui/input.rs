/// Keyboard tracking and the input policy.
///
/// Terminal key events are folded into "held" and "freshly pressed" sets
/// once per frame. `compose` then turns the logical controls into the
/// tick's `FrameInput` under the configured `InputMode`:
///   - `Held`: every held control re-issues its operation each tick.
///   - `Pressed`: only a fresh press issues it.
///
/// Release events are honoured only when the terminal's keyboard
/// enhancement is confirmed; otherwise a key counts as released after
/// `HOLD_TIMEOUT` without Press/Repeat.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::InputMode;
use crate::sim::step::FrameInput;

const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// The five logical controls, as booleans.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub up: bool,
    pub fire: bool,
}

impl Controls {
    pub fn or(self, other: Controls) -> Controls {
        Controls {
            left: self.left || other.left,
            right: self.right || other.right,
            down: self.down || other.down,
            up: self.up || other.up,
            fire: self.fire || other.fire,
        }
    }
}

pub const LEFT_KEYS: [KeyCode; 3] = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('h')];
pub const RIGHT_KEYS: [KeyCode; 3] = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('l')];
pub const DOWN_KEYS: [KeyCode; 3] = [KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('j')];
pub const UP_KEYS: [KeyCode; 3] = [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('k')];
pub const FIRE_KEYS: [KeyCode; 3] = [KeyCode::Char(' '), KeyCode::Char('z'), KeyCode::Char('x')];

/// Turn the frame's held/pressed controls into one tick of player input.
pub fn compose(mode: InputMode, held: Controls, pressed: Controls) -> FrameInput {
    let c = match mode {
        InputMode::Held => held.or(pressed),
        InputMode::Pressed => pressed,
    };
    let horizontal = match (c.left, c.right) {
        (true, false) => -1,
        (false, true) => 1,
        _ => 0,
    };
    FrameInput { horizontal, descend: c.down, ascend: c.up, fire: c.fire }
}

pub struct InputState {
    /// Last Press/Repeat per key.
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went from released to held during the last drain.
    fresh_presses: Vec<KeyCode>,
    pub raw_events: Vec<KeyEvent>,
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain pending terminal events. Call once per frame, before stepping.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            let Ok(Event::Key(key)) = event::read() else { continue };
            self.raw_events.push(key);
            match key.kind {
                KeyEventKind::Release if self.honor_release => {
                    self.last_active.remove(&key.code);
                }
                // Unconfirmed release support: wait for the timeout instead.
                KeyEventKind::Release => {}
                _ => {
                    if !self.is_held(key.code) {
                        self.fresh_presses.push(key.code);
                    }
                    self.last_active.insert(key.code, Instant::now());
                }
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code).is_some_and(|t| t.elapsed() < HOLD_TIMEOUT)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn held_controls(&self) -> Controls {
        Controls {
            left: self.any_held(&LEFT_KEYS),
            right: self.any_held(&RIGHT_KEYS),
            down: self.any_held(&DOWN_KEYS),
            up: self.any_held(&UP_KEYS),
            fire: self.any_held(&FIRE_KEYS),
        }
    }

    pub fn pressed_controls(&self) -> Controls {
        Controls {
            left: self.any_pressed(&LEFT_KEYS),
            right: self.any_pressed(&RIGHT_KEYS),
            down: self.any_pressed(&DOWN_KEYS),
            up: self.any_pressed(&UP_KEYS),
            fire: self.any_pressed(&FIRE_KEYS),
        }
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL) && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }
}
