use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use crate::auth::{Role, SessionError};

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Status and full body of a failed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub status: StatusCode,
    pub body: String,
}

impl ErrorBody {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The server's `{"detail": "..."}` message, if the body carries one
    pub fn detail(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        value.get("detail")?.as_str().map(str::to_string)
    }

    /// Truncate the body to avoid printing excessive data
    fn truncated_body(&self) -> String {
        if self.body.len() <= MAX_ERROR_BODY_LENGTH {
            self.body.clone()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !self.body.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &self.body[..end],
                self.body.len()
            )
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "{} ({})", detail, self.status),
            None if self.body.is_empty() => write!(f, "{}", self.status),
            None => write!(f, "{}: {}", self.status, self.truncated_body()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - credentials missing, expired or rejected")]
    Unauthorized(ErrorBody),

    #[error("Access denied: {0}")]
    AccessDenied(ErrorBody),

    #[error("Resource not found: {0}")]
    NotFound(ErrorBody),

    #[error("Request rejected: {0}")]
    BadRequest(ErrorBody),

    #[error("Server error: {0}")]
    ServerError(ErrorBody),

    #[error("Unexpected response: {0}")]
    Status(ErrorBody),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Role '{0}' is not granted to this account")]
    RoleNotGranted(Role),

    #[error("Session storage error: {0}")]
    Session(#[from] SessionError),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

impl ApiError {
    pub fn from_status(status: StatusCode, body: impl Into<String>) -> Self {
        let body = ErrorBody::new(status, body);
        match status.as_u16() {
            400 => ApiError::BadRequest(body),
            401 => ApiError::Unauthorized(body),
            403 => ApiError::AccessDenied(body),
            404 => ApiError::NotFound(body),
            500..=599 => ApiError::ServerError(body),
            _ => ApiError::Status(body),
        }
    }

    /// Response details for failures that came from the server
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            ApiError::Unauthorized(b)
            | ApiError::AccessDenied(b)
            | ApiError::NotFound(b)
            | ApiError::BadRequest(b)
            | ApiError::ServerError(b)
            | ApiError::Status(b) => Some(b),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.body().map(|b| b.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}
