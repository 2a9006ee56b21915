//! In-memory store for tests and hosts without a disk.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use skyrace_core::records::PlayerRecord;
use skyrace_core::sinks::{PersistenceStore, StoreError};
use skyrace_core::types::PlayerId;

#[derive(Debug, Default)]
struct Inner {
    records: BTreeMap<PlayerId, PlayerRecord>,
    writes: usize,
    offline: bool,
}

/// Clones share the same records, so a test can keep one handle while the
/// engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = PlayerRecord>) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            inner.records = records
                .into_iter()
                .map(|record| (record.player_id, record))
                .collect();
        }
        store
    }

    /// Make every operation fail with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.offline = offline;
        }
    }

    /// Number of successful write calls (`save`, `save_all`, `remove`, `clear`).
    pub fn writes(&self) -> usize {
        self.inner.lock().map_or(0, |inner| inner.writes)
    }

    pub fn get(&self, player: PlayerId) -> Option<PlayerRecord> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.records.get(&player).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        if inner.offline {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(inner)
    }
}

impl PersistenceStore for MemoryStore {
    fn load(&mut self, player: PlayerId) -> Result<Option<PlayerRecord>, StoreError> {
        Ok(self.lock()?.records.get(&player).cloned())
    }

    fn load_all(&mut self) -> Result<Vec<PlayerRecord>, StoreError> {
        Ok(self.lock()?.records.values().cloned().collect())
    }

    fn save(&mut self, record: &PlayerRecord) -> Result<(), StoreError> {
        self.save_all(std::slice::from_ref(record))
    }

    fn save_all(&mut self, records: &[PlayerRecord]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for record in records {
            inner.records.insert(record.player_id, record.clone());
        }
        inner.writes += 1;
        Ok(())
    }

    fn remove(&mut self, player: PlayerId) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.records.remove(&player);
        inner.writes += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.records.clear();
        inner.writes += 1;
        Ok(())
    }
}
