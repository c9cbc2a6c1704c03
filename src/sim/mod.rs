pub mod actions;
pub mod director;
pub mod event;
pub mod save;
pub mod step;
pub mod world;
