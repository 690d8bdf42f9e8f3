//! Planet types and the fixed slot catalog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of planet slots every player has.
pub const SLOT_COUNT: usize = 16;

/// Planet type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanetType {
    Desert,
    Fire,
    Water,
    Terran,
    Gas,
    Ice,
}

impl PlanetType {
    pub const ALL: [PlanetType; 6] = [
        PlanetType::Desert,
        PlanetType::Fire,
        PlanetType::Water,
        PlanetType::Terran,
        PlanetType::Gas,
        PlanetType::Ice,
    ];

    /// Display glyph used in chat responses.
    pub fn glyph(&self) -> &'static str {
        match self {
            PlanetType::Desert => "🏜️",
            PlanetType::Fire => "🔥",
            PlanetType::Water => "💧",
            PlanetType::Terran => "🪨",
            PlanetType::Gas => "🪐",
            PlanetType::Ice => "🧊",
        }
    }

    /// Key used in reference documents and command arguments.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanetType::Desert => "desert",
            PlanetType::Fire => "fire",
            PlanetType::Water => "water",
            PlanetType::Terran => "terran",
            PlanetType::Gas => "gas",
            PlanetType::Ice => "ice",
        }
    }

    /// Fire planets add nothing to hydro storage.
    pub fn stores_hydro(&self) -> bool {
        !matches!(self, PlanetType::Fire)
    }
}

impl fmt::Display for PlanetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlanetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        PlanetType::ALL
            .into_iter()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| format!("unknown planet type '{}'", s))
    }
}

/// One fixed catalog position a player's planet can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanetSlot {
    pub planet_type: PlanetType,
    pub tier: u8,
    /// `""` except for the two tier-4 ice slots (`"a"` / `"b"`).
    pub discriminator: &'static str,
}

impl PlanetSlot {
    const fn new(planet_type: PlanetType, tier: u8, discriminator: &'static str) -> Self {
        Self {
            planet_type,
            tier,
            discriminator,
        }
    }

    /// Short label such as `🏜️ T1` or `🧊 T4a`.
    pub fn label(&self) -> String {
        format!(
            "{} T{}{}",
            self.planet_type.glyph(),
            self.tier,
            self.discriminator
        )
    }
}

/// The slot catalog, in display and storage order.
pub const SLOT_CATALOG: [PlanetSlot; SLOT_COUNT] = [
    PlanetSlot::new(PlanetType::Desert, 1, ""),
    PlanetSlot::new(PlanetType::Fire, 1, ""),
    PlanetSlot::new(PlanetType::Water, 1, ""),
    PlanetSlot::new(PlanetType::Terran, 1, ""),
    PlanetSlot::new(PlanetType::Gas, 2, ""),
    PlanetSlot::new(PlanetType::Terran, 3, ""),
    PlanetSlot::new(PlanetType::Fire, 3, ""),
    PlanetSlot::new(PlanetType::Water, 3, ""),
    PlanetSlot::new(PlanetType::Gas, 4, ""),
    PlanetSlot::new(PlanetType::Desert, 3, ""),
    PlanetSlot::new(PlanetType::Fire, 4, ""),
    PlanetSlot::new(PlanetType::Desert, 4, ""),
    PlanetSlot::new(PlanetType::Water, 4, ""),
    PlanetSlot::new(PlanetType::Terran, 4, ""),
    PlanetSlot::new(PlanetType::Ice, 4, "a"),
    PlanetSlot::new(PlanetType::Ice, 4, "b"),
];

/// Index of the catalog slot matching the triple, if any.
pub fn find_slot(planet_type: PlanetType, tier: u8, discriminator: &str) -> Option<usize> {
    SLOT_CATALOG.iter().position(|slot| {
        slot.planet_type == planet_type
            && slot.tier == tier
            && slot.discriminator == discriminator
    })
}
