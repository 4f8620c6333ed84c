use keyring::Entry;
use tracing::debug;

use super::storage::{SessionError, Slot, SlotStorage};

const SERVICE_NAME: &str = "servicebook";

/// Session slots stored in the OS keychain, one entry per slot.
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a custom keychain service name (e.g. one per backend URL)
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, slot: Slot) -> Result<Entry, SessionError> {
        Ok(Entry::new(&self.service, slot.key())?)
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotStorage for KeyringStorage {
    fn get(&self, slot: Slot) -> Result<Option<String>, SessionError> {
        match self.entry(slot)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, slot: Slot, value: &str) -> Result<(), SessionError> {
        self.entry(slot)?.set_password(value)?;
        debug!(slot = slot.key(), "Stored session slot in keychain");
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<(), SessionError> {
        match self.entry(slot)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
