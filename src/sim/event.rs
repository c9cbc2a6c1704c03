/// Events emitted during a simulation step.
/// The presentation layer consumes these for effects and sound; the core
/// never waits on them.

use glam::Vec2;

use crate::domain::actor::{ActorId, ActorLabel};

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    ActorAppeared { id: ActorId, label: ActorLabel, depth: i32, cell: usize },
    Turned { id: ActorId },
    Stepped { id: ActorId, depth: i32, cell: usize },
    /// Muzzle flash: world position and firing angle in degrees.
    Fired { id: ActorId, at: Vec2, angle: f32 },
    FloorShot { id: ActorId, depth: i32, cell: usize },
    FloorBroken { depth: i32, cell: usize },
    /// Start of a descent (`down`) or ascent.
    Jumped { id: ActorId, down: bool },
    DropKick { depth: i32, cell: usize },
    ActorKilled { id: ActorId, label: ActorLabel, at: Vec2 },
    ProjectileImpact { at: Vec2 },
    AmbushSpawned { depth: i32, cell: usize },
    CorridorGenerated { depth: i32 },
    CorridorRetired { depth: i32 },
    ReachedDepth { depth: i32 },
    NewRecord { depth: i32 },
    PlayerDied { best_depth: i32 },
}
