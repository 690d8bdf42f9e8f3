//! The player store.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::StorageError;
use crate::models::PlayerRecord;

/// Every player's record, keyed by player id.
///
/// Loaded once, kept in memory, and written back whole by [`flush`].
///
/// [`flush`]: PlayerStore::flush
#[derive(Debug)]
pub struct PlayerStore {
    path: PathBuf,
    players: BTreeMap<String, PlayerRecord>,
}

impl PlayerStore {
    /// Load the store from `path`. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if !path.exists() {
            info!("No player store at {:?}, starting empty", path);
            return Ok(Self {
                path,
                players: BTreeMap::new(),
            });
        }

        let contents = fs::read_to_string(&path)?;
        let mut players: BTreeMap<String, PlayerRecord> = if contents.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&contents)?
        };

        for (id, record) in players.iter_mut() {
            if record.normalize() {
                warn!("Player {} had a malformed planet list, normalized", id);
            }
        }

        info!("Loaded {} players from {:?}", players.len(), path);
        Ok(Self { path, players })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, player_id: &str) -> Option<&PlayerRecord> {
        self.players.get(player_id)
    }

    /// The player's record, created with defaults on first access.
    pub fn player_mut(&mut self, player_id: &str) -> &mut PlayerRecord {
        self.players
            .entry(player_id.to_string())
            .or_insert_with(|| {
                debug!("Creating record for player {}", player_id);
                PlayerRecord::default()
            })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut PlayerRecord)> {
        self.players.iter_mut()
    }

    /// Rewrite the whole document.
    ///
    /// Writes to a sibling temp file first and renames it over the target.
    pub fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| StorageError::InvalidPath(self.path.display().to_string()))?;
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, &self.players)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        debug!("Wrote {} players to {:?}", self.players.len(), self.path);
        Ok(())
    }
}
