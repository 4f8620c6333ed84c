//! REST API client module for the service book backend.
//!
//! This module provides the `ApiClient` for talking to the registry API.
//! Requests carry the session's bearer token and active role; an expired
//! access token is refreshed once per call through the JWT refresh
//! endpoint before the failure is surfaced.

pub mod client;
pub mod error;
pub mod policy;
pub mod transport;

pub use client::ApiClient;
pub use error::{ApiError, ErrorBody};
pub use policy::{auth_headers, RefreshPolicy};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
