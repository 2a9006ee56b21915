//! Player records in one pretty-printed JSON file, keyed by player id.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use skyrace_core::records::PlayerRecord;
use skyrace_core::sinks::{PersistenceStore, StoreError};
use skyrace_core::types::PlayerId;

/// On-disk shape: `{ "players": { "<id>": { ...record } } }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerFile {
    #[serde(default)]
    pub players: BTreeMap<String, PlayerRecord>,
}

/// File-backed store. The file is read on first use and rewritten whole on
/// every save, so a batch of records costs one write.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: Option<PlayerFile>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: None,
        }
    }

    /// `players.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("players.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn data(&mut self) -> Result<&mut PlayerFile, StoreError> {
        if self.data.is_none() {
            let loaded = read_player_file(&self.path)?;
            tracing::debug!(
                target: "skyrace::store",
                path = %self.path.display(),
                players = loaded.players.len(),
                "store.opened"
            );
            self.data = Some(loaded);
        }
        Ok(self.data.get_or_insert_with(PlayerFile::default))
    }

    fn write(&mut self) -> Result<(), StoreError> {
        let path = self.path.clone();
        let data = self.data()?;
        let json = serde_json::to_string_pretty(data)?;
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, json).map_err(|source| StoreError::Io { path, source })
    }
}

fn read_player_file(path: &Path) -> Result<PlayerFile, StoreError> {
    match fs::read_to_string(path) {
        Ok(json) => Ok(serde_json::from_str(&json)?),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(PlayerFile::default()),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl PersistenceStore for JsonFileStore {
    fn load(&mut self, player: PlayerId) -> Result<Option<PlayerRecord>, StoreError> {
        Ok(self.data()?.players.get(&player.to_string()).cloned())
    }

    fn load_all(&mut self) -> Result<Vec<PlayerRecord>, StoreError> {
        Ok(self.data()?.players.values().cloned().collect())
    }

    fn save(&mut self, record: &PlayerRecord) -> Result<(), StoreError> {
        self.save_all(std::slice::from_ref(record))
    }

    fn save_all(&mut self, records: &[PlayerRecord]) -> Result<(), StoreError> {
        let data = self.data()?;
        for record in records {
            data.players
                .insert(record.player_id.to_string(), record.clone());
        }
        self.write()
    }

    fn remove(&mut self, player: PlayerId) -> Result<(), StoreError> {
        if self.data()?.players.remove(&player.to_string()).is_some() {
            self.write()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.data()?.players.clear();
        self.write()
    }
}
