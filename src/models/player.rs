//! Per-player planet records and settings.

use serde::{Deserialize, Serialize};

use super::slot::SLOT_COUNT;

/// Wire form of a planet: `[name | null, level, deadline | null]`.
type PlanetTuple = (Option<String>, u32, Option<i64>);

/// A player's planet in one catalog slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PlanetTuple", into = "PlanetTuple")]
pub struct PlayerPlanet {
    pub name: Option<String>,
    /// 0 means the slot is not owned.
    pub level: u32,
    /// Epoch seconds at which the in-flight upgrade completes.
    pub deadline: Option<i64>,
}

impl From<PlanetTuple> for PlayerPlanet {
    fn from((name, level, deadline): PlanetTuple) -> Self {
        Self {
            name,
            level,
            deadline,
        }
    }
}

impl From<PlayerPlanet> for PlanetTuple {
    fn from(planet: PlayerPlanet) -> Self {
        (planet.name, planet.level, planet.deadline)
    }
}

impl PlayerPlanet {
    pub fn new(name: impl Into<String>, level: u32) -> Self {
        Self {
            name: Some(name.into()),
            level,
            deadline: None,
        }
    }

    pub fn is_owned(&self) -> bool {
        self.name.is_some()
    }

    pub fn is_upgrading(&self) -> bool {
        self.deadline.is_some()
    }

    /// Case-insensitive name match.
    pub fn is_named(&self, name: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|n| n.to_lowercase() == name.trim().to_lowercase())
    }
}

/// Named boolean options a player can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    PingWhenUpgraded,
}

impl SettingKey {
    pub const ALL: [SettingKey; 1] = [SettingKey::PingWhenUpgraded];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::PingWhenUpgraded => "ping_when_upgraded",
        }
    }
}

/// Per-player settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSettings {
    #[serde(default)]
    pub ping_when_upgraded: bool,
}

impl PlayerSettings {
    pub fn get(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::PingWhenUpgraded => self.ping_when_upgraded,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: bool) {
        match key {
            SettingKey::PingWhenUpgraded => self.ping_when_upgraded = value,
        }
    }
}

/// Everything stored for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Index-aligned with [`super::SLOT_CATALOG`].
    pub planets: Vec<PlayerPlanet>,
    #[serde(default)]
    pub settings: PlayerSettings,
}

impl Default for PlayerRecord {
    fn default() -> Self {
        Self {
            planets: vec![PlayerPlanet::default(); SLOT_COUNT],
            settings: PlayerSettings::default(),
        }
    }
}

impl PlayerRecord {
    /// Pad or truncate the planet list to the catalog length.
    /// Returns true if the record had to be changed.
    pub fn normalize(&mut self) -> bool {
        if self.planets.len() == SLOT_COUNT {
            return false;
        }
        self.planets.resize(SLOT_COUNT, PlayerPlanet::default());
        true
    }

    /// Slot index of the first planet with this name.
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.planets.iter().position(|p| p.is_named(name))
    }

    pub fn has_upgrades(&self) -> bool {
        self.planets.iter().any(PlayerPlanet::is_upgrading)
    }
}
