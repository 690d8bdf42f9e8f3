//! Research categories, modules and artifact colours.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Research category a blueprint list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResearchCategory {
    Trade,
    Mining,
    Weapons,
    Shields,
    Support,
}

impl ResearchCategory {
    /// Argument order of the artifact command.
    pub const ALL: [ResearchCategory; 5] = [
        ResearchCategory::Trade,
        ResearchCategory::Mining,
        ResearchCategory::Weapons,
        ResearchCategory::Shields,
        ResearchCategory::Support,
    ];

    /// Artifact colour whose drops unlock this category's blueprints.
    pub fn art_color(&self) -> ArtColor {
        match self {
            ResearchCategory::Trade | ResearchCategory::Mining => ArtColor::Blues,
            ResearchCategory::Weapons | ResearchCategory::Shields => ArtColor::Orbs,
            ResearchCategory::Support => ArtColor::Tets,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchCategory::Trade => "Trade",
            ResearchCategory::Mining => "Mining",
            ResearchCategory::Weapons => "Weapons",
            ResearchCategory::Shields => "Shields",
            ResearchCategory::Support => "Support",
        }
    }
}

impl fmt::Display for ResearchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Artifact colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtColor {
    Blues,
    Orbs,
    Tets,
}

impl ArtColor {
    pub const ALL: [ArtColor; 3] = [ArtColor::Blues, ArtColor::Orbs, ArtColor::Tets];

    pub fn glyph(&self) -> &'static str {
        match self {
            ArtColor::Blues => "🔷",
            ArtColor::Orbs => "🟠",
            ArtColor::Tets => "🔺",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtColor::Blues => "Blues",
            ArtColor::Orbs => "Orbs",
            ArtColor::Tets => "Tets",
        }
    }
}

/// One research module: `[name, research level, blueprints required]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, u8, u32)", into = "(String, u8, u32)")]
pub struct ResearchModule {
    pub name: String,
    /// Research tier (1-11) the module's blueprints drop at.
    pub level: u8,
    pub required: u32,
}

impl From<(String, u8, u32)> for ResearchModule {
    fn from((name, level, required): (String, u8, u32)) -> Self {
        Self {
            name,
            level,
            required,
        }
    }
}

impl From<ResearchModule> for (String, u8, u32) {
    fn from(module: ResearchModule) -> Self {
        (module.name, module.level, module.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_colors() {
        assert_eq!(ResearchCategory::Trade.art_color(), ArtColor::Blues);
        assert_eq!(ResearchCategory::Mining.art_color(), ArtColor::Blues);
        assert_eq!(ResearchCategory::Weapons.art_color(), ArtColor::Orbs);
        assert_eq!(ResearchCategory::Shields.art_color(), ArtColor::Orbs);
        assert_eq!(ResearchCategory::Support.art_color(), ArtColor::Tets);
    }

    #[test]
    fn test_module_wire_format() {
        let module: ResearchModule = serde_json::from_str(r#"["Rush", 2, 30]"#).unwrap();
        assert_eq!(module.name, "Rush");
        assert_eq!(module.level, 2);
        assert_eq!(module.required, 30);
    }
}
