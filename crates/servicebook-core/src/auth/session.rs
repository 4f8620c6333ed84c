use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::role::Role;
use super::storage::{MemoryStorage, SessionError, Slot, SlotStorage};

/// The credential set as of one read of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSnapshot {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub username: Option<String>,
    pub active_role: Option<Role>,
}

impl AuthSnapshot {
    /// True iff a non-empty access credential is present. Expiry is not checked.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Durable credential set shared by everything that talks to the backend.
///
/// Each operation touches only the slots it names; the four slots are set
/// together at login and cleared together at logout. Concurrent writers
/// resolve last-write-wins.
pub struct SessionStore {
    storage: Box<dyn SlotStorage>,
}

impl SessionStore {
    pub fn new(storage: impl SlotStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    /// Store backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Persist a fresh credential pair and username. The active role is untouched.
    pub fn set_credentials(
        &self,
        access_token: &str,
        refresh_token: &str,
        username: &str,
    ) -> Result<(), SessionError> {
        self.storage.set(Slot::Access, access_token)?;
        self.storage.set(Slot::Refresh, refresh_token)?;
        self.storage.set(Slot::Username, username)?;
        info!(username = username, "Stored session credentials");
        Ok(())
    }

    /// Replace the access credential only (refresh flow)
    pub fn set_access_token(&self, access_token: &str) -> Result<(), SessionError> {
        self.storage.set(Slot::Access, access_token)?;
        debug!("Stored refreshed access token");
        Ok(())
    }

    pub fn set_active_role(&self, role: Role) -> Result<(), SessionError> {
        self.storage.set(Slot::ActiveRole, role.as_str())?;
        info!(role = %role, "Active role changed");
        Ok(())
    }

    /// Remove all four slots. Safe to call when already empty.
    pub fn clear(&self) -> Result<(), SessionError> {
        for slot in Slot::ALL {
            self.storage.remove(slot)?;
        }
        info!("Session cleared");
        Ok(())
    }

    pub fn snapshot(&self) -> Result<AuthSnapshot, SessionError> {
        let active_role = match self.storage.get(Slot::ActiveRole)? {
            Some(tag) => match tag.parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    warn!(error = %e, "Ignoring unrecognised stored role");
                    None
                }
            },
            None => None,
        };

        Ok(AuthSnapshot {
            access_token: self.storage.get(Slot::Access)?,
            refresh_token: self.storage.get(Slot::Refresh)?,
            username: self.storage.get(Slot::Username)?,
            active_role,
        })
    }

    pub fn is_authenticated(&self) -> Result<bool, SessionError> {
        Ok(self
            .storage
            .get(Slot::Access)?
            .is_some_and(|t| !t.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::storage::FileStorage;

    #[test]
    fn test_empty_store_is_not_authenticated() {
        let store = SessionStore::in_memory();
        assert!(!store.is_authenticated().unwrap());
        assert_eq!(store.snapshot().unwrap(), AuthSnapshot::default());
    }

    #[test]
    fn test_set_credentials_keeps_active_role() {
        let store = SessionStore::in_memory();
        store.set_active_role(Role::Client).unwrap();
        store.set_credentials("a", "r", "u").unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(
            snapshot,
            AuthSnapshot {
                access_token: Some("a".to_string()),
                refresh_token: Some("r".to_string()),
                username: Some("u".to_string()),
                active_role: Some(Role::Client),
            }
        );
        assert!(store.is_authenticated().unwrap());
    }

    #[test]
    fn test_set_credentials_overwrites_previous_values() {
        let store = SessionStore::in_memory();
        store.set_credentials("a1", "r1", "first").unwrap();
        store.set_credentials("a2", "r2", "second").unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.access_token.as_deref(), Some("a2"));
        assert_eq!(snapshot.refresh_token.as_deref(), Some("r2"));
        assert_eq!(snapshot.username.as_deref(), Some("second"));
        assert_eq!(snapshot.active_role, None);
    }

    #[test]
    fn test_clear_removes_everything_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(FileStorage::open(dir.path()).unwrap());
        store.set_credentials("a", "r", "u").unwrap();
        store.set_active_role(Role::Manager).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();

        assert!(!store.is_authenticated().unwrap());
        assert_eq!(store.snapshot().unwrap(), AuthSnapshot::default());

        let reopened = FileStorage::open(dir.path()).unwrap();
        for slot in Slot::ALL {
            assert_eq!(reopened.get(slot).unwrap(), None);
        }
    }

    #[test]
    fn test_set_access_token_replaces_access_only() {
        let store = SessionStore::in_memory();
        store.set_credentials("A1", "R1", "u").unwrap();
        store.set_active_role(Role::Service).unwrap();

        store.set_access_token("A2").unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.access_token.as_deref(), Some("A2"));
        assert_eq!(snapshot.refresh_token.as_deref(), Some("R1"));
        assert_eq!(snapshot.active_role, Some(Role::Service));
    }

    #[test]
    fn test_empty_access_token_is_not_authenticated() {
        let store = SessionStore::in_memory();
        store.set_credentials("", "r", "u").unwrap();
        assert!(!store.is_authenticated().unwrap());
        assert!(!store.snapshot().unwrap().is_authenticated());
    }

    #[test]
    fn test_unknown_stored_role_reads_as_unset() {
        let storage = MemoryStorage::new();
        storage.set(Slot::ActiveRole, "superuser").unwrap();
        let store = SessionStore::new(storage);
        assert_eq!(store.snapshot().unwrap().active_role, None);
    }
}
