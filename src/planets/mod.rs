//! Planet upgrade tracking.
//!
//! - **workflow**: the per-slot state machine (add, upgrade, shift, complete)
//! - **report**: planet listings, upgrade suggestions and capacity totals

mod report;
mod workflow;

pub use report::*;
pub use workflow::*;

use thiserror::Error;

use crate::models::PlanetType;

/// Validation failures. The message is shown to the player as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanetError {
    #[error("You don't have a planet named '{0}'.")]
    UnknownPlanet(String),

    #[error("{name} is already at the max level ({max}).")]
    MaxLevel { name: String, max: u32 },

    #[error("Tier 4 ice planets need a discriminator (a or b).")]
    MissingDiscriminator,

    #[error("There is no tier {tier} {planet_type} planet.")]
    InvalidSlot { planet_type: PlanetType, tier: u8 },

    #[error("Tier {tier} planets go from level 1 to {max}, got {level}.")]
    LevelOutOfRange { level: u32, tier: u8, max: u32 },

    #[error("The shift duration must be positive.")]
    NonPositiveShift,
}
