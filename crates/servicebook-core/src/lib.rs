//! Core library for the Silant electronic service book client.
//!
//! - `auth`: the durable Session Store (credential set and active role)
//! - `api`: the authenticated API client with refresh-on-401 recovery
//! - `models`: registry records (machines, maintenance, complaints, references)
//! - `config`: configuration file and environment overrides

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, HttpTransport, Transport};
pub use auth::{AuthSnapshot, Role, SessionStore};
pub use config::Config;
