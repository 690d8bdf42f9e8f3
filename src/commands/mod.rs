//! Command dispatch.
//!
//! [`Bot`] owns the player store, the reference data and the notifier.
//! Every command first completes any due upgrades (so players see them
//! straight away), then runs its handler while holding the store lock.

mod parse;

pub use parse::Command;

use std::fmt::Write;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::convert::format_duration;
use crate::models::{SettingKey, SLOT_CATALOG};
use crate::notify::Notifier;
use crate::planets::{self, Completion, PlanetError, ShiftOutcome};
use crate::reference::ReferenceData;
use crate::research::{self, ResearchError};
use crate::storage::{PlayerStore, StorageError};

/// Problems with the command text itself. Shown to the player as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("No command given. Try `help`.")]
    Empty,

    #[error("Unknown command '{0}'. Try `help`.")]
    Unknown(String),

    #[error("Missing argument {0}.")]
    MissingArgument(&'static str),

    #[error("Invalid value '{value}' for {name}: expected {expected}.")]
    InvalidArgument {
        name: &'static str,
        value: String,
        expected: String,
    },

    #[error("Unknown argument {0}.")]
    UnexpectedArgument(String),

    #[error("Argument {0} given more than once.")]
    DuplicateArgument(String),

    #[error("Unexpected '{0}'.")]
    UnexpectedWord(String),

    #[error("Could not read '{0}'. Arguments look like name:value.")]
    Syntax(String),
}

/// Any failure a player should see as a reply rather than an error.
#[derive(Debug, Error)]
enum Rejection {
    #[error(transparent)]
    Planet(#[from] PlanetError),

    #[error(transparent)]
    Research(#[from] ResearchError),
}

const HELP: &str = "**Commands**
add_planet planet_name:<name> level:<1-50> ptype:<type> tier:<1-4> [discriminator:a|b]
upgrade_planet planet_name:<name> [duration:<e.g. 1d 2h 3m>]
shift_upgrades duration:<e.g. 2h>
list_planets
upgrade_details
artifact_count art_level:<1-11> trade:\"..\" mining:\"..\" weapons:\"..\" shields:\"..\" support:\"..\"
settings ping_upgraded flag:<true|false>
settings view";

/// The command dispatcher.
pub struct Bot {
    store: Mutex<PlayerStore>,
    reference: ReferenceData,
    notifier: Arc<dyn Notifier>,
}

impl Bot {
    pub fn new(store: PlayerStore, reference: ReferenceData, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store: Mutex::new(store),
            reference,
            notifier,
        }
    }

    /// Handle a command line from `player_id` at the current time.
    pub async fn handle(&self, player_id: &str, line: &str) -> Result<String, StorageError> {
        self.handle_at(player_id, line, Utc::now().timestamp()).await
    }

    /// Handle a command line as if the time were `now` (epoch seconds).
    ///
    /// Validation problems come back as the reply text; only persistence
    /// failures are errors.
    pub async fn handle_at(
        &self,
        player_id: &str,
        line: &str,
        now: i64,
    ) -> Result<String, StorageError> {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                debug!("Rejected command from {}: {}", player_id, e);
                return Ok(e.to_string());
            }
        };

        let (reply, completions) = {
            let mut store = self.store.lock().await;
            match planets::scan_and_complete(&mut store, now) {
                Ok(completions) => (self.run(&mut store, player_id, &command, now), completions),
                Err(unsaved) => (Err(unsaved.source), unsaved.completions),
            }
        };

        self.deliver(&completions).await;
        reply
    }

    /// Complete all due upgrades and send their notifications.
    ///
    /// Completions are announced even when saving them fails.
    pub async fn scan(&self, now: i64) -> Result<Vec<Completion>, StorageError> {
        let scanned = {
            let mut store = self.store.lock().await;
            planets::scan_and_complete(&mut store, now)
        };
        match scanned {
            Ok(completions) => {
                self.deliver(&completions).await;
                Ok(completions)
            }
            Err(unsaved) => {
                self.deliver(&unsaved.completions).await;
                Err(unsaved.source)
            }
        }
    }

    /// Number of players with stored records.
    pub async fn player_count(&self) -> usize {
        self.store.lock().await.len()
    }

    async fn deliver(&self, completions: &[Completion]) {
        if completions.is_empty() {
            return;
        }
        if let Err(e) = self.notifier.notify(completions).await {
            warn!(
                "Failed to deliver {} notifications via {}: {}",
                completions.len(),
                self.notifier.name(),
                e
            );
        }
    }

    /// Execute a parsed command, saving the store if it changed.
    fn run(
        &self,
        store: &mut PlayerStore,
        player_id: &str,
        command: &Command,
        now: i64,
    ) -> Result<String, StorageError> {
        match self.execute(store, player_id, command, now) {
            Ok(reply) => {
                if command.is_mutating() {
                    store.flush()?;
                }
                Ok(reply)
            }
            Err(rejection) => {
                debug!("Command from {} rejected: {}", player_id, rejection);
                Ok(rejection.to_string())
            }
        }
    }

    fn execute(
        &self,
        store: &mut PlayerStore,
        player_id: &str,
        command: &Command,
        now: i64,
    ) -> Result<String, Rejection> {
        let record = store.player_mut(player_id);

        let reply = match command {
            Command::Test => "I'm alive!".to_string(),
            Command::Help => HELP.to_string(),
            Command::AddPlanet {
                name,
                level,
                planet_type,
                tier,
                discriminator,
            } => {
                let outcome = planets::add_or_replace_planet(
                    record,
                    name,
                    *level,
                    *planet_type,
                    *tier,
                    discriminator,
                )?;
                let label = SLOT_CATALOG[outcome.slot].label();
                info!("Player {} set {} to {} (Lv {})", player_id, label, name, level);
                match outcome.previous {
                    Some((old_name, old_level)) => format!(
                        "Replaced {} (Lv {}) with {} (Lv {}) in {}.",
                        old_name, old_level, name, level, label
                    ),
                    None => format!("Added {} (Lv {}) to {}.", name, level, label),
                }
            }
            Command::UpgradePlanet { name, duration } => {
                let outcome = planets::start_or_reschedule_upgrade(record, name, *duration, now)?;
                info!(
                    "Player {} upgrading {} to Lv {}, done at {}",
                    player_id,
                    outcome.name,
                    outcome.level + 1,
                    outcome.deadline
                );
                let mut reply = match outcome.previous_deadline {
                    Some(old) => format!(
                        "Rescheduled {}'s upgrade to Lv {}: was done <t:{}:f>, now done <t:{}:f>.",
                        outcome.name,
                        outcome.level + 1,
                        old,
                        outcome.deadline
                    ),
                    None => format!(
                        "{} is upgrading to Lv {}, done <t:{}:f>.",
                        outcome.name,
                        outcome.level + 1,
                        outcome.deadline
                    ),
                };
                let _ = write!(reply, " ({})", format_duration(outcome.duration, false));
                reply
            }
            Command::ShiftUpgrades { duration } => {
                match planets::shift_all_upgrades(record, *duration)? {
                    ShiftOutcome::NothingUpgrading => "You have no upgrades in progress.".to_string(),
                    ShiftOutcome::Shifted { count } => format!(
                        "Moved {} upgrade{} {} earlier.",
                        count,
                        if count == 1 { "" } else { "s" },
                        format_duration(*duration, false)
                    ),
                }
            }
            Command::ListPlanets => planets::list_planets(record, now),
            Command::UpgradeDetails => {
                planets::upgrade_details(record, &self.reference.shipments, now)
            }
            Command::ArtifactCount {
                art_level,
                blueprints,
            } => research::estimate_artifacts(
                *art_level,
                blueprints,
                &self.reference.research,
                &self.reference.drops,
            )?
            .render(),
            Command::SetPingWhenUpgraded(flag) => {
                record.settings.set(SettingKey::PingWhenUpgraded, *flag);
                format!("Set {} to {}.", SettingKey::PingWhenUpgraded.as_str(), flag)
            }
            Command::ViewSettings => {
                let mut reply = String::from("**Settings**");
                for key in SettingKey::ALL {
                    let _ = write!(reply, "\n{}: {}", key.as_str(), record.settings.get(key));
                }
                reply
            }
        };
        Ok(reply)
    }
}
