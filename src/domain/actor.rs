/// Actors: the player and the enemies share one state record.
///
/// What differs between them is the controller, a closed two-way variant:
///   - `PlayerController` tracks the best depth reached and the depth timer.
///   - `EnemyController` carries the decision state machine.
///
/// Position is always `(depth, cell)` of the corridor the actor is bound
/// to; only `World::enter_corridor` rebinds it.

use glam::Vec2;

use super::action::{ActionState, TimedAction};
use super::ai::EnemyBrain;
use super::pool::Handle;

pub type ActorId = Handle<Actor>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }

    pub fn from_dx(dx: i32) -> Facing {
        if dx > 0 { Facing::Right } else { Facing::Left }
    }

    pub fn is_right(self) -> bool {
        self == Facing::Right
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActorLabel {
    Player,
    Enemy,
}

/// Sprite pose the presentation layer should show.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pose {
    Aim,
    Recoil,
    Fall,
    Dying,
    Dead,
}

// ── Controllers ──

#[derive(Clone, Debug)]
pub struct PlayerController {
    best_depth: i32,
    health: f32,
    time_for_each_depth: f32,
}

impl PlayerController {
    /// `time_for_each_depth == 0` disables the depth timer.
    pub fn new(start_depth: i32, time_for_each_depth: f32) -> Self {
        PlayerController {
            best_depth: start_depth,
            health: time_for_each_depth,
            time_for_each_depth,
        }
    }

    pub fn best_depth(&self) -> i32 {
        self.best_depth
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    /// Remaining depth time as 0.0 → 1.0 (1.0 when the timer is disabled).
    pub fn health_fraction(&self) -> f32 {
        if self.time_for_each_depth <= 0.0 {
            return 1.0;
        }
        (self.health / self.time_for_each_depth).clamp(0.0, 1.0)
    }

    /// Drain the depth timer and refill it on a new best depth.
    /// Returns true when the timer has run out.
    pub fn tick(&mut self, current_depth: i32, dt: f32) -> bool {
        if self.time_for_each_depth <= 0.0 {
            self.best_depth = self.best_depth.max(current_depth);
            return false;
        }
        if self.best_depth > 0 {
            self.health -= dt;
        }
        if current_depth > self.best_depth {
            self.health = self.time_for_each_depth;
            self.best_depth = current_depth;
        }
        self.health < 0.0
    }
}

#[derive(Clone, Debug)]
pub struct EnemyController {
    pub brain: EnemyBrain,
}

#[derive(Clone, Debug)]
pub enum Controller {
    Player(PlayerController),
    Enemy(EnemyController),
}

impl Controller {
    pub fn enemy(reaction_speed: f32) -> Self {
        Controller::Enemy(EnemyController { brain: EnemyBrain::new(reaction_speed) })
    }

    pub fn label(&self) -> ActorLabel {
        match self {
            Controller::Player(_) => ActorLabel::Player,
            Controller::Enemy(_) => ActorLabel::Enemy,
        }
    }
}

// ── Actor ──

#[derive(Clone, Debug)]
pub struct Actor {
    pub controller: Controller,
    depth: i32,
    cell: usize,
    pub facing: Facing,
    dead: bool,
    pub immune_to_melee: bool,
    pub immune_to_projectile: bool,
    /// Seconds until the weapon can fire again.
    pub gun_cooldown: f32,
    pub(crate) action: Option<TimedAction>,

    // ── Presentation ──
    pub pose: Pose,
    /// Visual offset from the bound cell centre.
    pub offset: Vec2,
    pub alpha: f32,
    /// Turn animation progress 0.0 → 1.0 while turning.
    pub turn: f32,
}

impl Actor {
    /// A fresh, unbound actor. `World::enter_corridor` sets the real position.
    pub fn new(controller: Controller, facing: Facing) -> Self {
        Actor {
            controller,
            depth: 0,
            cell: 0,
            facing,
            dead: false,
            immune_to_melee: false,
            immune_to_projectile: false,
            gun_cooldown: 0.0,
            action: None,
            pose: Pose::Aim,
            offset: Vec2::ZERO,
            alpha: 1.0,
            turn: 0.0,
        }
    }

    pub fn label(&self) -> ActorLabel {
        self.controller.label()
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn cell(&self) -> usize {
        self.cell
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_busy(&self) -> bool {
        self.action.is_some()
    }

    pub fn action(&self) -> Option<&TimedAction> {
        self.action.as_ref()
    }

    pub fn action_state(&self) -> ActionState {
        self.action.as_ref().map_or(ActionState::Idle, TimedAction::state)
    }

    pub fn player(&self) -> Option<&PlayerController> {
        match &self.controller {
            Controller::Player(p) => Some(p),
            Controller::Enemy(_) => None,
        }
    }

    /// Would a melee hit land right now?
    pub fn accepts_melee(&self) -> bool {
        !self.dead && !self.immune_to_melee
    }

    /// Would a projectile hit land right now?
    pub fn accepts_projectile(&self) -> bool {
        !self.dead && !self.immune_to_projectile
    }

    pub(crate) fn bind(&mut self, depth: i32, cell: usize) {
        self.depth = depth;
        self.cell = cell;
    }

    pub(crate) fn mark_dead(&mut self) {
        self.dead = true;
    }
}
