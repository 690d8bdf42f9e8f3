//! Planet listings and upgrade suggestions.

use std::cmp::Ordering;
use std::fmt::Write;

use crate::balance::{credit_storage, hydro_storage, max_level, upgrade_cost, upgrade_duration};
use crate::convert::{format_abbreviated_number, format_duration};
use crate::models::{PlayerPlanet, PlayerRecord, SLOT_CATALOG};
use crate::reference::ShipmentTable;

/// Render all slots in catalog order.
pub fn list_planets(record: &PlayerRecord, now: i64) -> String {
    let mut out = String::from("**Your planets**");

    for (slot, planet) in SLOT_CATALOG.iter().zip(record.planets.iter()) {
        let _ = write!(out, "\n{}", slot.label());
        let Some(name) = planet.name.as_deref() else {
            out.push_str(" · —");
            continue;
        };

        let max = max_level(slot.tier);
        let _ = write!(out, " · {} · Lv {}/{}", name, planet.level, max);
        if let Some(deadline) = planet.deadline {
            let remaining = deadline.saturating_sub(now).max(0);
            let _ = write!(out, " · ⏳ {}", format_duration(remaining, false));
        }
        if planet.level >= max {
            out.push_str(" ✅");
        }
    }
    out
}

/// Total storage across owned planets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capacity {
    pub credits: u64,
    pub hydro: u64,
}

/// Summed storage. With `upgraded`, in-flight upgrades count as finished.
pub fn capacity(record: &PlayerRecord, upgraded: bool) -> Capacity {
    let mut total = Capacity::default();

    for (slot, planet) in SLOT_CATALOG.iter().zip(record.planets.iter()) {
        if !planet.is_owned() {
            continue;
        }
        let mut level = planet.level;
        if upgraded && planet.is_upgrading() {
            level = (level + 1).min(max_level(slot.tier));
        }

        total.credits += credit_storage(level as i64);
        if slot.planet_type.stores_hydro() {
            total.hydro += hydro_storage(level as i64);
        }
    }
    total
}

/// The best next upgrade for a player.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub slot: usize,
    pub name: String,
    pub level: u32,
    pub cost: u64,
    pub duration: i64,
    pub shipment_gain: i64,
    pub storage_gain: i64,
    /// Shipment gain per credit.
    pub shipment_ratio: f64,
    /// Storage gain per credit.
    pub storage_ratio: f64,
}

impl Suggestion {
    fn rank(&self, other: &Self) -> Ordering {
        self.shipment_ratio
            .total_cmp(&other.shipment_ratio)
            .then(self.storage_ratio.total_cmp(&other.storage_ratio))
    }
}

fn candidate(
    slot: usize,
    planet: &PlayerPlanet,
    shipments: &ShipmentTable,
) -> Option<Suggestion> {
    let info = SLOT_CATALOG[slot];
    let name = planet.name.as_ref()?;
    if planet.is_upgrading() || planet.level >= max_level(info.tier) {
        return None;
    }

    let level = planet.level;
    let cost = upgrade_cost(level as i64);
    if cost == 0 {
        return None;
    }

    let next = level + 1;
    let shipment_gain = shipments.value(info.planet_type, info.tier, next) as i64
        - shipments.value(info.planet_type, info.tier, level) as i64;
    let mut storage_gain =
        credit_storage(next as i64) as i64 - credit_storage(level as i64) as i64;
    if info.planet_type.stores_hydro() {
        storage_gain += hydro_storage(next as i64) as i64 - hydro_storage(level as i64) as i64;
    }

    Some(Suggestion {
        slot,
        name: name.clone(),
        level,
        cost,
        duration: upgrade_duration(level as i64),
        shipment_gain,
        storage_gain,
        shipment_ratio: shipment_gain as f64 / cost as f64,
        storage_ratio: storage_gain as f64 / cost as f64,
    })
}

/// Highest shipment-per-credit upgrade among idle, non-maxed planets;
/// storage-per-credit breaks ties, then catalog order.
pub fn suggest_upgrade(record: &PlayerRecord, shipments: &ShipmentTable) -> Option<Suggestion> {
    record
        .planets
        .iter()
        .enumerate()
        .filter_map(|(slot, planet)| candidate(slot, planet, shipments))
        .min_by(|a, b| b.rank(a))
}

/// Render in-flight upgrades, the best next upgrade and capacity totals.
pub fn upgrade_details(record: &PlayerRecord, shipments: &ShipmentTable, now: i64) -> String {
    let mut out = String::from("**Upgrading**");

    let mut upgrading: Vec<(usize, &PlayerPlanet, i64)> = record
        .planets
        .iter()
        .enumerate()
        .filter_map(|(slot, p)| p.deadline.map(|d| (slot, p, d)))
        .collect();
    upgrading.sort_by_key(|(_, _, deadline)| *deadline);

    if upgrading.is_empty() {
        out.push_str("\nNothing is upgrading.");
    }
    for (slot, planet, deadline) in upgrading {
        let _ = write!(
            out,
            "\n{} ({}) Lv {} → {}: {}",
            planet.name.as_deref().unwrap_or("Unnamed planet"),
            SLOT_CATALOG[slot].label(),
            planet.level,
            planet.level + 1,
            format_duration(deadline.saturating_sub(now).max(0), false)
        );
    }

    out.push_str("\n\n**Suggested next upgrade**");
    match suggest_upgrade(record, shipments) {
        Some(s) => {
            let _ = write!(
                out,
                "\n{} ({}) Lv {} → {}: {} credits, {}, +{} shipments/hr, +{} storage",
                s.name,
                SLOT_CATALOG[s.slot].label(),
                s.level,
                s.level + 1,
                format_abbreviated_number(s.cost),
                format_duration(s.duration, true),
                format_abbreviated_number(s.shipment_gain.max(0) as u64),
                format_abbreviated_number(s.storage_gain.max(0) as u64)
            );
        }
        None => out.push_str("\nNo upgrades available."),
    }

    let current = capacity(record, false);
    let upgraded = capacity(record, true);
    let _ = write!(
        out,
        "\n\n**Capacity**\nCredits: {} → {}\nHydro: {} → {}",
        format_abbreviated_number(current.credits),
        format_abbreviated_number(upgraded.credits),
        format_abbreviated_number(current.hydro),
        format_abbreviated_number(upgraded.hydro)
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlanetType;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    const NOW: i64 = 1_700_000_000;

    fn shipments() -> ShipmentTable {
        let levels: Vec<u64> = (0..=50).map(|l| l * 100).collect();
        let mut values = HashMap::new();
        for planet_type in PlanetType::ALL {
            let tiers: HashMap<u8, Vec<u64>> = (1..=4).map(|t| (t, levels.clone())).collect();
            values.insert(planet_type, tiers);
        }
        ShipmentTable::new(values)
    }

    #[test]
    fn test_list_planets() {
        let mut record = PlayerRecord::default();
        record.planets[0] = PlayerPlanet::new("Dune", 5);
        record.planets[0].deadline = Some(NOW + 3_660);
        record.planets[1] = PlayerPlanet::new("Ember", 15);

        let text = list_planets(&record, NOW);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 17);
        assert_eq!(lines[1], "🏜️ T1 · Dune · Lv 5/15 · ⏳ 1h 1m");
        assert_eq!(lines[2], "🔥 T1 · Ember · Lv 15/15 ✅");
        assert_eq!(lines[3], "💧 T1 · —");
        assert_eq!(lines[16], "🧊 T4b · —");
    }

    #[test]
    fn test_list_planets_extreme_deadlines() {
        let mut record = PlayerRecord::default();
        record.planets[0] = PlayerPlanet::new("Dune", 5);
        record.planets[0].deadline = Some(i64::MIN);

        let text = list_planets(&record, NOW);
        assert_eq!(text.lines().nth(1), Some("🏜️ T1 · Dune · Lv 5/15 · ⏳ 0m"));
    }

    #[test]
    fn test_capacity_skips_fire_hydro() {
        let mut record = PlayerRecord::default();
        record.planets[0] = PlayerPlanet::new("Dune", 5);
        record.planets[1] = PlayerPlanet::new("Ember", 5);

        let cap = capacity(&record, false);
        assert_eq!(cap.credits, 2 * credit_storage(5));
        assert_eq!(cap.hydro, hydro_storage(5));
    }

    #[test]
    fn test_capacity_upgraded_counts_in_flight() {
        let mut record = PlayerRecord::default();
        record.planets[0] = PlayerPlanet::new("Dune", 5);
        record.planets[0].deadline = Some(NOW + 60);

        assert_eq!(capacity(&record, false).credits, 4_000);
        assert_eq!(capacity(&record, true).credits, 5_000);
        assert_eq!(capacity(&record, true).hydro, 750);
    }

    #[test]
    fn test_capacity_upgraded_clamps_at_tier_max() {
        let mut record = PlayerRecord::default();
        record.planets[0] = PlayerPlanet::new("Dune", 15);
        record.planets[0].deadline = Some(NOW + 60);

        let upgraded = capacity(&record, true);
        assert_eq!(upgraded, capacity(&record, false));
        assert_eq!(upgraded.credits, credit_storage(15));
        assert_eq!(upgraded.hydro, hydro_storage(15));
    }

    #[test]
    fn test_suggestion_prefers_shipments_per_credit() {
        let mut record = PlayerRecord::default();
        // Both gain 100 shipments; level 2 costs 200, level 8 costs 10000.
        record.planets[0] = PlayerPlanet::new("Cheap", 2);
        record.planets[3] = PlayerPlanet::new("Pricey", 8);

        let s = suggest_upgrade(&record, &shipments()).unwrap();
        assert_eq!(s.name, "Cheap");
        assert_eq!(s.cost, 200);
        assert_eq!(s.shipment_gain, 100);
    }

    #[test]
    fn test_suggestion_breaks_ties_on_storage() {
        let mut record = PlayerRecord::default();
        // Same level, same cost and shipments; fire adds no hydro.
        record.planets[1] = PlayerPlanet::new("Ember", 4);
        record.planets[2] = PlayerPlanet::new("Lagoon", 4);

        let s = suggest_upgrade(&record, &shipments()).unwrap();
        assert_eq!(s.name, "Lagoon");
    }

    #[test]
    fn test_suggestion_full_tie_keeps_catalog_order() {
        let mut record = PlayerRecord::default();
        record.planets[0] = PlayerPlanet::new("First", 4);
        record.planets[2] = PlayerPlanet::new("Second", 4);

        let s = suggest_upgrade(&record, &shipments()).unwrap();
        assert_eq!(s.name, "First");
    }

    #[test]
    fn test_suggestion_skips_upgrading_and_maxed() {
        let mut record = PlayerRecord::default();
        record.planets[0] = PlayerPlanet::new("Busy", 2);
        record.planets[0].deadline = Some(NOW + 60);
        record.planets[1] = PlayerPlanet::new("Done", 15);

        assert!(suggest_upgrade(&record, &shipments()).is_none());
    }

    #[test]
    fn test_upgrade_details_render() {
        let mut record = PlayerRecord::default();
        record.planets[0] = PlayerPlanet::new("Dune", 5);
        record.planets[0].deadline = Some(NOW + 7_200);
        record.planets[2] = PlayerPlanet::new("Lagoon", 3);
        record.planets[2].deadline = Some(NOW + 600);
        record.planets[3] = PlayerPlanet::new("Rock", 4);

        let text = upgrade_details(&record, &shipments(), NOW);
        let expected = "**Upgrading**\n\
            Lagoon (💧 T1) Lv 3 → 4: 10m\n\
            Dune (🏜️ T1) Lv 5 → 6: 2h 0m\n\
            \n\
            **Suggested next upgrade**\n\
            Rock (🪨 T1) Lv 4 → 5: 800 credits, 2m, +100 shipments/hr, +1.12k storage\n\
            \n\
            **Capacity**\n\
            Credits: 8.8k → 11k\n\
            Hydro: 1.36k → 1.65k";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_upgrade_details_empty() {
        let text = upgrade_details(&PlayerRecord::default(), &shipments(), NOW);
        assert!(text.contains("Nothing is upgrading."));
        assert!(text.contains("No upgrades available."));
        assert!(text.contains("Credits: 0 → 0"));
    }
}
