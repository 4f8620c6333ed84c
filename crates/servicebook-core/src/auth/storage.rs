//! Durable backends for the four named session slots.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to access session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse session file: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Session storage lock poisoned")]
    Poisoned,
}

/// One of the four independently persisted session values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Access,
    Refresh,
    Username,
    ActiveRole,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Access, Slot::Refresh, Slot::Username, Slot::ActiveRole];

    /// Fixed storage key for the slot
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Access => "access",
            Slot::Refresh => "refresh",
            Slot::Username => "username",
            Slot::ActiveRole => "active_role",
        }
    }
}

/// Storage for session slots. Absent means unset; removing an absent slot
/// is not an error.
pub trait SlotStorage: Send + Sync {
    fn get(&self, slot: Slot) -> Result<Option<String>, SessionError>;
    fn set(&self, slot: Slot, value: &str) -> Result<(), SessionError>;
    fn remove(&self, slot: Slot) -> Result<(), SessionError>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, SessionError> {
    mutex.lock().map_err(|_| SessionError::Poisoned)
}

/// In-process storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<BTreeMap<Slot, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStorage for MemoryStorage {
    fn get(&self, slot: Slot) -> Result<Option<String>, SessionError> {
        Ok(lock(&self.slots)?.get(&slot).cloned())
    }

    fn set(&self, slot: Slot, value: &str) -> Result<(), SessionError> {
        lock(&self.slots)?.insert(slot, value.to_string());
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<(), SessionError> {
        lock(&self.slots)?.remove(&slot);
        Ok(())
    }
}

/// Slots kept as a JSON object in a single file.
///
/// The file is read once at open; every mutation rewrites it. Removing the
/// last slot deletes the file.
pub struct FileStorage {
    path: PathBuf,
    slots: Mutex<BTreeMap<Slot, String>>,
}

impl FileStorage {
    /// Open the session file in `dir`, creating nothing until the first write.
    pub fn open(dir: &Path) -> Result<Self, SessionError> {
        let path = dir.join(SESSION_FILE);
        let slots = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), slots = slots.len(), "Opened session file");
        Ok(Self {
            path,
            slots: Mutex::new(slots),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, slots: &BTreeMap<Slot, String>) -> Result<(), SessionError> {
        if slots.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(slots)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl SlotStorage for FileStorage {
    fn get(&self, slot: Slot) -> Result<Option<String>, SessionError> {
        Ok(lock(&self.slots)?.get(&slot).cloned())
    }

    fn set(&self, slot: Slot, value: &str) -> Result<(), SessionError> {
        let mut slots = lock(&self.slots)?;
        slots.insert(slot, value.to_string());
        self.persist(&slots)
    }

    fn remove(&self, slot: Slot) -> Result<(), SessionError> {
        let mut slots = lock(&self.slots)?;
        if slots.remove(&slot).is_some() {
            self.persist(&slots)?;
        }
        Ok(())
    }
}
