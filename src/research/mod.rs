//! Blueprint shortfall and artifact farming estimates.
//!
//! A player reports how many blueprints they hold for every research
//! module. For each artifact colour and research tier the shortfall against
//! the module requirements is turned into an expected number of artifacts
//! to open, using the average drop for the player's art level.

use std::fmt::{self, Write};

use thiserror::Error;
use tracing::warn;

use crate::models::{ArtColor, ResearchCategory};
use crate::reference::{DropTable, ResearchTable};

/// Highest research tier and art level.
pub const MAX_TIER: u8 = 11;

/// Average-plus-20% factor applied to the sum of a `[min, max]` drop range.
const LUCK_FACTOR: f64 = 0.6;

/// Blueprint counts per module, one list per category in
/// [`ResearchCategory::ALL`] order. `None` means the module isn't tracked.
pub type BlueprintLists = [Vec<Option<u32>>; 5];

/// Parse a whitespace-separated blueprint list. Tokens that aren't
/// non-negative integers mark the module as not tracked.
pub fn parse_blueprints(text: &str) -> Vec<Option<u32>> {
    text.split_whitespace()
        .map(|token| {
            if token.chars().all(|c| c.is_ascii_digit()) {
                token.parse().ok()
            } else {
                None
            }
        })
        .collect()
}

/// A blueprint list whose length doesn't match the research table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthMismatch {
    pub category: ResearchCategory,
    pub expected: usize,
    pub received: usize,
}

impl fmt::Display for LengthMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expected {} {} modules, received {}.",
            self.expected, self.category, self.received
        )
    }
}

/// Estimator input errors. The message is shown to the player as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResearchError {
    #[error("{}", render_mismatches(.0))]
    LengthMismatch(Vec<LengthMismatch>),
}

fn render_mismatches(mismatches: &[LengthMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Outcome for one research tier of one colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierEstimate {
    /// Artifacts to open, and the modules still short.
    Attempts { count: u64, modules: Vec<String> },
    /// The tier is above the player's art level.
    NoDrops,
    /// The drop table has nothing usable for this tier.
    NoData,
}

/// Tiers of one colour with at least one tracked module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorEstimate {
    pub color: ArtColor,
    pub tiers: Vec<(u8, TierEstimate)>,
}

/// Full estimate for a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReport {
    pub art_level: u8,
    pub colors: Vec<ColorEstimate>,
}

impl ArtifactReport {
    /// Chat rendering.
    pub fn render(&self) -> String {
        let mut out = format!("Level {} arts:", self.art_level);

        for estimate in &self.colors {
            let _ = write!(
                out,
                "\n\n{} {}:",
                estimate.color.glyph(),
                estimate.color.as_str()
            );
            if estimate.tiers.is_empty() {
                out.push_str(" Complete!");
                continue;
            }
            for (tier, tier_estimate) in &estimate.tiers {
                let _ = write!(out, "\nr{}: ", tier);
                match tier_estimate {
                    TierEstimate::Attempts { count, modules } => {
                        let _ = write!(out, "{} ({})", count, modules.join(", "));
                    }
                    TierEstimate::NoDrops => {
                        out.push_str("⚠️ Will not receive BPs for this level!");
                    }
                    TierEstimate::NoData => out.push_str("no drop data"),
                }
            }
        }
        out
    }
}

/// Estimate artifacts needed to finish every tracked module.
pub fn estimate_artifacts(
    art_level: u8,
    blueprints: &BlueprintLists,
    research: &ResearchTable,
    drops: &DropTable,
) -> Result<ArtifactReport, ResearchError> {
    let mismatches: Vec<LengthMismatch> = ResearchCategory::ALL
        .iter()
        .zip(blueprints.iter())
        .filter_map(|(category, counts)| {
            let expected = research.modules(*category).len();
            (expected != counts.len()).then_some(LengthMismatch {
                category: *category,
                expected,
                received: counts.len(),
            })
        })
        .collect();
    if !mismatches.is_empty() {
        return Err(ResearchError::LengthMismatch(mismatches));
    }

    // shortfall[colour][tier - 1] = (missing, module name)
    let mut shortfall: Vec<Vec<Vec<(u32, String)>>> =
        vec![vec![Vec::new(); MAX_TIER as usize]; ArtColor::ALL.len()];

    for (category, counts) in ResearchCategory::ALL.iter().zip(blueprints.iter()) {
        let color_idx = color_index(category.art_color());
        for (module, have) in research.modules(*category).iter().zip(counts.iter()) {
            let Some(have) = have else { continue };
            let missing = module.required.saturating_sub(*have);
            match (module.level as usize).checked_sub(1) {
                Some(tier_idx) if tier_idx < MAX_TIER as usize => {
                    shortfall[color_idx][tier_idx].push((missing, module.name.clone()));
                }
                _ => warn!("Research module {} has invalid tier {}", module.name, module.level),
            }
        }
    }

    let colors = ArtColor::ALL
        .iter()
        .zip(shortfall)
        .map(|(color, tiers)| ColorEstimate {
            color: *color,
            tiers: tiers
                .into_iter()
                .enumerate()
                .filter(|(_, modules)| !modules.is_empty())
                .map(|(idx, modules)| {
                    let tier = idx as u8 + 1;
                    (tier, estimate_tier(*color, art_level, tier, modules, drops))
                })
                .collect(),
        })
        .collect();

    Ok(ArtifactReport { art_level, colors })
}

fn estimate_tier(
    color: ArtColor,
    art_level: u8,
    tier: u8,
    modules: Vec<(u32, String)>,
    drops: &DropTable,
) -> TierEstimate {
    if tier > art_level {
        return TierEstimate::NoDrops;
    }

    let avg_drop = match drops.range(color, art_level, tier) {
        Some(range) => range.iter().sum::<f64>() * LUCK_FACTOR,
        None => 0.0,
    };
    if avg_drop <= 0.0 {
        warn!(
            "No drop data for {} at art level {} tier {}",
            color.as_str(),
            art_level,
            tier
        );
        return TierEstimate::NoData;
    }

    let (amounts, names): (Vec<u32>, Vec<String>) = modules.into_iter().unzip();
    let count = amounts
        .iter()
        .map(|missing| (*missing as f64 / avg_drop).ceil() as u64)
        .sum();
    TierEstimate::Attempts {
        count,
        modules: names,
    }
}

fn color_index(color: ArtColor) -> usize {
    match color {
        ArtColor::Blues => 0,
        ArtColor::Orbs => 1,
        ArtColor::Tets => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResearchModule;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn module(name: &str, level: u8, required: u32) -> ResearchModule {
        ResearchModule {
            name: name.to_string(),
            level,
            required,
        }
    }

    fn research() -> ResearchTable {
        ResearchTable::new(HashMap::from([
            (
                ResearchCategory::Trade,
                vec![module("Cargo", 1, 40), module("Rush", 2, 30)],
            ),
            (ResearchCategory::Mining, vec![module("Enrich", 1, 20)]),
            (ResearchCategory::Weapons, vec![module("Laser", 3, 10)]),
            (ResearchCategory::Shields, vec![]),
            (ResearchCategory::Support, vec![module("EMP", 1, 5)]),
        ]))
    }

    fn drops() -> DropTable {
        // Art level 2: tier 1 drops [2, 3] (avg 3.0), tier 2 [4, 6] (avg 6.0).
        let levels = vec![
            vec![vec![2.0, 3.0]],
            vec![vec![2.0, 3.0], vec![4.0, 6.0]],
        ];
        DropTable::new(HashMap::from([
            (ArtColor::Blues, levels.clone()),
            (ArtColor::Orbs, levels),
        ]))
    }

    fn lists(trade: &str, mining: &str, weapons: &str, shields: &str, support: &str) -> BlueprintLists {
        [
            parse_blueprints(trade),
            parse_blueprints(mining),
            parse_blueprints(weapons),
            parse_blueprints(shields),
            parse_blueprints(support),
        ]
    }

    #[test]
    fn test_parse_blueprints() {
        assert_eq!(
            parse_blueprints(" 3 x 10  -1 "),
            vec![Some(3), None, Some(10), None]
        );
        assert!(parse_blueprints("").is_empty());
    }

    #[test]
    fn test_length_mismatch_reported_together() {
        let err = estimate_artifacts(2, &lists("1", "1", "1", "", ""), &research(), &drops())
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Expected 2 Trade modules, received 1.\nExpected 1 Support modules, received 0."
        );
    }

    #[test]
    fn test_estimate_attempts() {
        // Cargo short 31 at r1 -> ceil(31 / 3) = 11; Enrich short 20 -> 7.
        // Rush short 30 at r2 -> ceil(30 / 6) = 5.
        let report =
            estimate_artifacts(2, &lists("9 0", "0", "x", "", "5"), &research(), &drops())
                .unwrap();

        let blues = &report.colors[0];
        assert_eq!(
            blues.tiers,
            vec![
                (
                    1,
                    TierEstimate::Attempts {
                        count: 18,
                        modules: vec!["Cargo".to_string(), "Enrich".to_string()],
                    }
                ),
                (
                    2,
                    TierEstimate::Attempts {
                        count: 5,
                        modules: vec!["Rush".to_string()],
                    }
                ),
            ]
        );
        // Laser is untracked. EMP is done but tracked, and Tets have no drops.
        assert!(report.colors[1].tiers.is_empty());
        assert_eq!(report.colors[2].tiers, vec![(1, TierEstimate::NoData)]);
    }

    #[test]
    fn test_finished_modules_still_listed() {
        let report =
            estimate_artifacts(2, &lists("40 x", "x", "x", "", "x"), &research(), &drops())
                .unwrap();

        assert_eq!(
            report.colors[0].tiers,
            vec![(
                1,
                TierEstimate::Attempts {
                    count: 0,
                    modules: vec!["Cargo".to_string()],
                }
            )]
        );
        assert!(report.render().contains("🔷 Blues:\nr1: 0 (Cargo)"));
    }

    #[test]
    fn test_tier_above_art_level_warns() {
        let report =
            estimate_artifacts(2, &lists("x x", "x", "0", "", "x"), &research(), &drops()).unwrap();
        assert_eq!(report.colors[1].tiers, vec![(3, TierEstimate::NoDrops)]);
    }

    #[test]
    fn test_missing_drop_data() {
        // Tets have no drop table at all.
        let report =
            estimate_artifacts(2, &lists("x x", "x", "x", "", "0"), &research(), &drops()).unwrap();
        assert_eq!(report.colors[2].tiers, vec![(1, TierEstimate::NoData)]);
    }

    #[test]
    fn test_render() {
        let report =
            estimate_artifacts(2, &lists("40 0", "x", "0", "", "x"), &research(), &drops())
                .unwrap();

        let expected = "Level 2 arts:\n\
            \n\
            🔷 Blues:\n\
            r1: 0 (Cargo)\n\
            r2: 5 (Rush)\n\
            \n\
            🟠 Orbs:\n\
            r3: ⚠️ Will not receive BPs for this level!\n\
            \n\
            🔺 Tets: Complete!";
        assert_eq!(report.render(), expected);
    }
}
