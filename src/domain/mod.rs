pub mod action;
pub mod actor;
pub mod ai;
pub mod ambush;
pub mod grid;
pub mod pool;
pub mod projectile;
