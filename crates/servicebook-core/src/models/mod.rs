//! Data models for service book entities.
//!
//! - `Machine`, `PublicMachine`: registered machines and the public lookup view
//! - `Maintenance`, `Complaint`: service records attached to a machine
//! - `Reference`: directory entries (models, maintenance kinds, failure nodes)
//! - `Identity`, `UserRef`: accounts as the API renders them
//! - `Listing`: the list-or-page envelope of list endpoints

pub mod complaint;
pub mod listing;
pub mod machine;
pub mod maintenance;
pub mod reference;
pub mod user;

pub use complaint::{Complaint, ComplaintDraft, ComplaintFilter};
pub use listing::{Listing, Page};
pub use machine::{Machine, MachineFilter, PublicMachine};
pub use maintenance::{Maintenance, MaintenanceDraft, MaintenanceFilter};
pub use reference::{Reference, ReferenceEntity};
pub use user::{Identity, UserRef, UserSummary};
