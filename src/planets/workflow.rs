//! Per-slot upgrade state machine.
//!
//! A slot is Empty (no name), Owned-Idle (name, no deadline) or Upgrading
//! (deadline set). Upgrading returns to Owned-Idle one level higher once
//! the deadline passes.

use thiserror::Error;
use tracing::{debug, info};

use super::PlanetError;
use crate::balance::{max_level, upgrade_duration};
use crate::models::{find_slot, PlanetType, PlayerPlanet, PlayerRecord, SLOT_CATALOG};
use crate::storage::{PlayerStore, StorageError};

/// Result of adding or replacing a planet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub slot: usize,
    /// Name and level of the planet that was overwritten.
    pub previous: Option<(String, u32)>,
}

/// Put a planet into the slot matching `(planet_type, tier, discriminator)`.
///
/// Any upgrade in flight on that slot is dropped.
pub fn add_or_replace_planet(
    record: &mut PlayerRecord,
    name: &str,
    level: u32,
    planet_type: PlanetType,
    tier: u8,
    discriminator: &str,
) -> Result<AddOutcome, PlanetError> {
    let discriminator = if planet_type == PlanetType::Ice && tier == 4 {
        if discriminator.is_empty() {
            return Err(PlanetError::MissingDiscriminator);
        }
        discriminator
    } else {
        ""
    };

    let slot = find_slot(planet_type, tier, discriminator)
        .ok_or(PlanetError::InvalidSlot { planet_type, tier })?;

    let max = max_level(tier);
    if level == 0 || level > max {
        return Err(PlanetError::LevelOutOfRange { level, tier, max });
    }

    let planet = &mut record.planets[slot];
    let previous = planet.name.clone().map(|n| (n, planet.level));
    *planet = PlayerPlanet::new(name.trim(), level);

    debug!("Slot {} set to {} (Lv {})", slot, name, level);
    Ok(AddOutcome { slot, previous })
}

/// Result of starting or rescheduling an upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeOutcome {
    pub slot: usize,
    pub name: String,
    pub level: u32,
    pub duration: i64,
    pub deadline: i64,
    /// Deadline that was replaced, when rescheduling.
    pub previous_deadline: Option<i64>,
}

/// Mark the named planet as upgrading for `duration` seconds from `now`.
///
/// A non-positive duration falls back to the balance-table duration for
/// the planet's current level.
pub fn start_or_reschedule_upgrade(
    record: &mut PlayerRecord,
    name: &str,
    duration: i64,
    now: i64,
) -> Result<UpgradeOutcome, PlanetError> {
    let slot = record
        .find_by_name(name)
        .ok_or_else(|| PlanetError::UnknownPlanet(name.trim().to_string()))?;

    let max = max_level(SLOT_CATALOG[slot].tier);
    let planet = &mut record.planets[slot];
    let planet_name = planet.name.clone().unwrap_or_default();
    if planet.level >= max {
        return Err(PlanetError::MaxLevel {
            name: planet_name,
            max,
        });
    }

    let duration = if duration > 0 {
        duration
    } else {
        upgrade_duration(planet.level as i64)
    };
    let deadline = now.saturating_add(duration);
    let previous_deadline = planet.deadline.replace(deadline);

    Ok(UpgradeOutcome {
        slot,
        name: planet_name,
        level: planet.level,
        duration,
        deadline,
        previous_deadline,
    })
}

/// Result of shifting a player's upgrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftOutcome {
    NothingUpgrading,
    Shifted { count: usize },
}

/// Move every in-flight deadline `delta` seconds earlier.
///
/// There is no upper bound; deadlines pushed into the past complete on the
/// next scan.
pub fn shift_all_upgrades(
    record: &mut PlayerRecord,
    delta: i64,
) -> Result<ShiftOutcome, PlanetError> {
    if delta <= 0 {
        return Err(PlanetError::NonPositiveShift);
    }
    if !record.has_upgrades() {
        return Ok(ShiftOutcome::NothingUpgrading);
    }

    let mut count = 0;
    for deadline in record.planets.iter_mut().filter_map(|p| p.deadline.as_mut()) {
        *deadline = deadline.saturating_sub(delta);
        count += 1;
    }
    Ok(ShiftOutcome::Shifted { count })
}

/// An upgrade that finished during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub player_id: String,
    pub slot: usize,
    pub name: String,
    /// Level after the upgrade.
    pub level: u32,
    /// Whether the player asked to be mentioned.
    pub ping: bool,
}

impl Completion {
    /// Chat message announcing the completion.
    pub fn message(&self) -> String {
        let body = format!(
            "{} ({}) finished upgrading to Lv {}!",
            self.name,
            SLOT_CATALOG[self.slot].label(),
            self.level
        );
        if self.ping {
            format!("<@{}> {}", self.player_id, body)
        } else {
            body
        }
    }
}

/// Complete the record's upgrades whose deadline is at or before `now`.
pub fn complete_due_upgrades(record: &mut PlayerRecord, player_id: &str, now: i64) -> Vec<Completion> {
    let ping = record.settings.ping_when_upgraded;
    let mut done = Vec::new();

    for (slot, planet) in record.planets.iter_mut().enumerate() {
        match planet.deadline {
            Some(deadline) if deadline <= now => {
                planet.deadline = None;
                planet.level = (planet.level + 1).min(max_level(SLOT_CATALOG[slot].tier));
                done.push(Completion {
                    player_id: player_id.to_string(),
                    slot,
                    name: planet.name.clone().unwrap_or_else(|| "Unnamed planet".to_string()),
                    level: planet.level,
                    ping,
                });
            }
            _ => {}
        }
    }
    done
}

/// Upgrades that completed in memory but could not be saved.
///
/// The records already reflect the completions, so the caller must still
/// announce them.
#[derive(Debug, Error)]
#[error("Completed {} upgrades but failed to save them: {source}", .completions.len())]
pub struct UnsavedCompletions {
    pub completions: Vec<Completion>,
    #[source]
    pub source: StorageError,
}

/// Complete every due upgrade for every player, flushing once if anything
/// changed.
pub fn scan_and_complete(
    store: &mut PlayerStore,
    now: i64,
) -> Result<Vec<Completion>, UnsavedCompletions> {
    let mut completions = Vec::new();
    for (player_id, record) in store.iter_mut() {
        completions.extend(complete_due_upgrades(record, player_id, now));
    }

    if !completions.is_empty() {
        info!("Completed {} planet upgrades", completions.len());
        if let Err(source) = store.flush() {
            return Err(UnsavedCompletions {
                completions,
                source,
            });
        }
    }
    Ok(completions)
}
