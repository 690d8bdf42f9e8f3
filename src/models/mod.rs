//! Core data models for the planet tracker.

mod player;
mod research;
mod slot;

pub use player::*;
pub use research::*;
pub use slot::*;
