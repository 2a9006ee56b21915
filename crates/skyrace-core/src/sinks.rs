//! Output interfaces: notification delivery and player-record persistence.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::events::Notification;
use crate::records::PlayerRecord;
use crate::types::PlayerId;

pub trait NotificationSink {
    fn emit(&mut self, notification: Notification);
}

/// Collects notifications in memory; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedSink {
    inner: Arc<Mutex<Vec<Notification>>>,
}

impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything emitted so far.
    pub fn drain(&self) -> Vec<Notification> {
        match self.inner.lock() {
            Ok(mut buffer) => std::mem::take(&mut *buffer),
            Err(_) => Vec::new(),
        }
    }
}

impl NotificationSink for SharedSink {
    fn emit(&mut self, notification: Notification) {
        if let Ok(mut buffer) = self.inner.lock() {
            buffer.push(notification);
        }
    }
}

/// Writes every notification to the `skyrace::notify` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn emit(&mut self, notification: Notification) {
        tracing::info!(
            target: "skyrace::notify",
            player = %notification.player,
            event = ?notification.event,
            "notify"
        );
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access player store at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode or decode player store: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("player store unavailable: {0}")]
    Unavailable(String),
}

/// Durable home of [`PlayerRecord`]s.
pub trait PersistenceStore {
    fn load(&mut self, player: PlayerId) -> Result<Option<PlayerRecord>, StoreError>;

    fn load_all(&mut self) -> Result<Vec<PlayerRecord>, StoreError>;

    fn save(&mut self, record: &PlayerRecord) -> Result<(), StoreError>;

    /// Save several records as one write where the backend allows it.
    fn save_all(&mut self, records: &[PlayerRecord]) -> Result<(), StoreError> {
        for record in records {
            self.save(record)?;
        }
        Ok(())
    }

    fn remove(&mut self, player: PlayerId) -> Result<(), StoreError>;

    fn clear(&mut self) -> Result<(), StoreError>;
}
