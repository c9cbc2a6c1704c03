/// Gamepad input through gilrs.
///
/// Face/shoulder buttons map to actions via `[gamepad]` in config.toml.
/// Defaults:
///   D-pad / Left Stick  →  walk left/right, up = ascend, down = descend
///   A / X / R1          →  Fire
///   B / L1              →  Descend
///   Y                   →  Ascend
///   Start               →  Confirm / Pause
///   Select              →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::ui::input::Controls;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.3;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

const BTN_COUNT: usize = 10;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "L2" | "LT" => Some(Btn::L2),
            "R2" | "RT" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2 => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// The four directions, shared by the d-pad and the digitised stick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Dir {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Which buttons trigger which action. Empty lists in the config keep
/// the defaults.
#[derive(Debug, PartialEq)]
struct ActionMap {
    fire: Vec<Btn>,
    descend: Vec<Btn>,
    ascend: Vec<Btn>,
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
}

impl ActionMap {
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse(names: &[String], fallback: &[Btn]) -> Vec<Btn> {
            let btns: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if btns.is_empty() {
                log::warn!("no usable gamepad buttons in {names:?}, keeping {fallback:?}");
                fallback.to_vec()
            } else {
                btns
            }
        }
        let d = GamepadConfig::default();
        let d = ActionMap::from_names(&d);
        ActionMap {
            fire: parse(&cfg.fire, &d.fire),
            descend: parse(&cfg.descend, &d.descend),
            ascend: parse(&cfg.ascend, &d.ascend),
            confirm: parse(&cfg.confirm, &d.confirm),
            cancel: parse(&cfg.cancel, &d.cancel),
        }
    }

    fn from_names(cfg: &GamepadConfig) -> Self {
        let p = |names: &[String]| names.iter().filter_map(|s| Btn::from_name(s)).collect();
        ActionMap {
            fire: p(&cfg.fire),
            descend: p(&cfg.descend),
            ascend: p(&cfg.ascend),
            confirm: p(&cfg.confirm),
            cancel: p(&cfg.cancel),
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,
    buttons: [BtnState; BTN_COUNT],
    dpad: [BtnState; 4],
    stick: [BtnState; 4],
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_xy: (f32, f32),
    map: ActionMap,
    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        let pad = GamepadState::detached(cfg);
        #[cfg(feature = "gamepad")]
        let pad = pad.attach();
        pad
    }

    #[cfg(feature = "gamepad")]
    fn attach(mut self) -> Self {
        match Gilrs::new() {
            Ok(g) => {
                self.connected = g.gamepads().next().is_some();
                self.gilrs = Some(g);
            }
            Err(e) => log::warn!("gamepad support unavailable: {e}"),
        }
        self
    }

    /// A state with no backend attached; every query reads false.
    fn detached(cfg: &GamepadConfig) -> Self {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: [BtnState::default(); 4],
            stick: [BtnState::default(); 4],
            stick_xy: (0.0, 0.0),
            map: ActionMap::from_config(cfg),
            connected: false,
        }
    }

    /// Poll the backend. Call once per frame.
    pub fn update(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            b.just_pressed = false;
        }
        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = &mut self.gilrs else { return };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
                EventType::AxisChanged(Axis::LeftStickX, v, _) => self.stick_xy.0 = v,
                EventType::AxisChanged(Axis::LeftStickY, v, _) => self.stick_xy.1 = v,
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        let (x, y) = self.stick_xy;
        self.stick[Dir::Left as usize].set(x < -STICK_DEADZONE);
        self.stick[Dir::Right as usize].set(x > STICK_DEADZONE);
        self.stick[Dir::Up as usize].set(y > STICK_DEADZONE);
        self.stick[Dir::Down as usize].set(y < -STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, held: bool) {
        let dir = match btn {
            Button::DPadUp => Some(Dir::Up),
            Button::DPadDown => Some(Dir::Down),
            Button::DPadLeft => Some(Dir::Left),
            Button::DPadRight => Some(Dir::Right),
            _ => None,
        };
        if let Some(d) = dir {
            self.dpad[d as usize].set(held);
        } else if let Some(b) = Btn::from_gilrs(btn) {
            self.buttons[b as usize].set(held);
        }
    }

    fn release_all(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            *b = BtnState::default();
        }
        self.stick_xy = (0.0, 0.0);
    }

    // ── Queries ──

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].held)
    }

    fn any_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    fn dir_held(&self, d: Dir) -> bool {
        self.dpad[d as usize].held || self.stick[d as usize].held
    }

    fn dir_pressed(&self, d: Dir) -> bool {
        self.dpad[d as usize].just_pressed || self.stick[d as usize].just_pressed
    }

    pub fn confirm_pressed(&self) -> bool {
        self.any_pressed(&self.map.confirm)
    }

    pub fn cancel_pressed(&self) -> bool {
        self.any_pressed(&self.map.cancel)
    }

    pub fn held_controls(&self) -> Controls {
        Controls {
            left: self.dir_held(Dir::Left),
            right: self.dir_held(Dir::Right),
            down: self.dir_held(Dir::Down) || self.any_held(&self.map.descend),
            up: self.dir_held(Dir::Up) || self.any_held(&self.map.ascend),
            fire: self.any_held(&self.map.fire),
        }
    }

    pub fn pressed_controls(&self) -> Controls {
        Controls {
            left: self.dir_pressed(Dir::Left),
            right: self.dir_pressed(Dir::Right),
            down: self.dir_pressed(Dir::Down) || self.any_pressed(&self.map.descend),
            up: self.dir_pressed(Dir::Up) || self.any_pressed(&self.map.ascend),
            fire: self.any_pressed(&self.map.fire),
        }
    }
}
