//! Authentication state for the service book client.
//!
//! This module provides:
//! - `SessionStore`: the credential set (access, refresh, username, active role)
//! - `SlotStorage`: durable backends for the four named session slots
//! - `KeyringStorage`: slot storage in the OS keychain
//! - `Role`: the role a session presents to the backend

pub mod credentials;
pub mod role;
pub mod session;
pub mod storage;

pub use credentials::KeyringStorage;
pub use role::Role;
pub use session::{AuthSnapshot, SessionStore};
pub use storage::{FileStorage, MemoryStorage, SessionError, Slot, SlotStorage};
