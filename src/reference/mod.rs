//! Static reference documents.
//!
//! Three JSON files are loaded once at start from the reference directory:
//! - `shipments.json`: planet type → tier → hourly shipment value per level
//! - `research_info.json`: category → `[[name, level, required], ...]`
//! - `art_drops.json`: colour → art level → research tier → `[min, max]`

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{ArtColor, PlanetType, ResearchCategory, ResearchModule};

pub const SHIPMENTS_FILE: &str = "shipments.json";
pub const RESEARCH_FILE: &str = "research_info.json";
pub const ART_DROPS_FILE: &str = "art_drops.json";

/// Errors loading reference documents.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Research reference has no {0} modules")]
    MissingCategory(ResearchCategory),
}

/// Hourly shipment value by planet type, tier and level.
#[derive(Debug, Clone, Default)]
pub struct ShipmentTable {
    values: HashMap<PlanetType, HashMap<u8, Vec<u64>>>,
}

impl ShipmentTable {
    pub fn new(values: HashMap<PlanetType, HashMap<u8, Vec<u64>>>) -> Self {
        Self { values }
    }

    /// Shipment value of a planet, or 0 (logged) when the table has no entry.
    pub fn value(&self, planet_type: PlanetType, tier: u8, level: u32) -> u64 {
        if !(1..=4).contains(&tier) {
            warn!("Shipment lookup with invalid tier {} for {}", tier, planet_type);
            return 0;
        }

        let found = self
            .values
            .get(&planet_type)
            .and_then(|tiers| tiers.get(&tier))
            .and_then(|levels| levels.get(level as usize));

        match found {
            Some(value) => *value,
            None => {
                warn!(
                    "No shipment value for {} tier {} level {}",
                    planet_type, tier, level
                );
                0
            }
        }
    }
}

/// Research modules per category, in blueprint-list order.
#[derive(Debug, Clone, Default)]
pub struct ResearchTable {
    modules: HashMap<ResearchCategory, Vec<ResearchModule>>,
}

impl ResearchTable {
    pub fn new(modules: HashMap<ResearchCategory, Vec<ResearchModule>>) -> Self {
        Self { modules }
    }

    pub fn modules(&self, category: ResearchCategory) -> &[ResearchModule] {
        self.modules
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn validate(&self) -> Result<(), ReferenceError> {
        for category in ResearchCategory::ALL {
            if !self.modules.contains_key(&category) {
                return Err(ReferenceError::MissingCategory(category));
            }
        }
        Ok(())
    }
}

/// Blueprint drop ranges by colour, art level and research tier.
#[derive(Debug, Clone, Default)]
pub struct DropTable {
    drops: HashMap<ArtColor, Vec<Vec<Vec<f64>>>>,
}

impl DropTable {
    pub fn new(drops: HashMap<ArtColor, Vec<Vec<Vec<f64>>>>) -> Self {
        Self { drops }
    }

    /// Drop range for one artifact at `art_level` (1-based) and research
    /// `tier` (1-based).
    pub fn range(&self, color: ArtColor, art_level: u8, tier: u8) -> Option<&[f64]> {
        let art_idx = (art_level as usize).checked_sub(1)?;
        let tier_idx = (tier as usize).checked_sub(1)?;
        self.drops
            .get(&color)?
            .get(art_idx)?
            .get(tier_idx)
            .map(Vec::as_slice)
    }
}

/// All reference documents.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub shipments: ShipmentTable,
    pub research: ResearchTable,
    pub drops: DropTable,
}

impl ReferenceData {
    /// Load all reference documents from `dir`.
    pub fn load(dir: &Path) -> Result<Self, ReferenceError> {
        let shipments = ShipmentTable::new(read_json(&dir.join(SHIPMENTS_FILE))?);
        let research = ResearchTable::new(read_json(&dir.join(RESEARCH_FILE))?);
        research.validate()?;
        let drops = DropTable::new(read_json(&dir.join(ART_DROPS_FILE))?);

        info!("Loaded reference data from {:?}", dir);
        Ok(Self {
            shipments,
            research,
            drops,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ReferenceError> {
    let contents = fs::read_to_string(path).map_err(|source| ReferenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Parsing {:?}", path);
    serde_json::from_str(&contents).map_err(|source| ReferenceError::Json {
        path: path.to_path_buf(),
        source,
    })
}
