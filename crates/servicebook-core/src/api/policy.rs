//! Request decoration and the refresh-and-retry rule.

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;

use super::ApiError;
use crate::auth::AuthSnapshot;

/// Header carrying the session's active role (`X-Active-Role`)
pub const ROLE_HEADER: &str = "x-active-role";

/// Headers for a request made with the given credential set.
///
/// `Authorization: Bearer <access>` when an access token is present and
/// `X-Active-Role: <role>` when a role is selected; nothing otherwise.
pub fn auth_headers(snapshot: &AuthSnapshot) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    if let Some(token) = snapshot.access_token.as_deref().filter(|t| !t.is_empty()) {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| {
                ApiError::InvalidRequest("Access token is not a valid header value".to_string())
            })?;
        headers.insert(header::AUTHORIZATION, value);
    }
    if let Some(role) = snapshot.active_role {
        headers.insert(ROLE_HEADER, HeaderValue::from_static(role.as_str()));
    }
    Ok(headers)
}

/// When a failed call may be recovered by exchanging the refresh token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Refresh exchanges allowed per logical call
    pub max_refreshes: u32,
    pub trigger: StatusCode,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            max_refreshes: 1,
            trigger: StatusCode::UNAUTHORIZED,
        }
    }
}

impl RefreshPolicy {
    /// Never refresh; every failure is surfaced as-is
    pub fn disabled() -> Self {
        Self {
            max_refreshes: 0,
            ..Self::default()
        }
    }

    /// `refreshes_done` counts exchanges already made for this logical call.
    pub fn should_refresh(
        &self,
        status: StatusCode,
        refreshes_done: u32,
        has_refresh_token: bool,
    ) -> bool {
        status == self.trigger && refreshes_done < self.max_refreshes && has_refresh_token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn snapshot(access: Option<&str>, role: Option<Role>) -> AuthSnapshot {
        AuthSnapshot {
            access_token: access.map(str::to_string),
            refresh_token: Some("R1".to_string()),
            username: Some("ivan".to_string()),
            active_role: role,
        }
    }

    #[test]
    fn test_bearer_header_is_exact() {
        let headers = auth_headers(&snapshot(Some("A1"), None)).unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer A1");
        assert!(headers.get(ROLE_HEADER).is_none());
    }

    #[test]
    fn test_role_header_when_selected() {
        let headers = auth_headers(&snapshot(Some("A1"), Some(Role::Service))).unwrap();
        assert_eq!(headers.get(ROLE_HEADER).unwrap(), "service");
    }

    #[test]
    fn test_anonymous_snapshot_has_no_headers() {
        assert!(auth_headers(&AuthSnapshot::default()).unwrap().is_empty());
        // An empty token counts as absent
        let headers = auth_headers(&snapshot(Some(""), None)).unwrap();
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_token_with_newline_is_rejected() {
        let result = auth_headers(&snapshot(Some("bad\ntoken"), None));
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn test_should_refresh_once_on_401_only() {
        let policy = RefreshPolicy::default();
        assert!(policy.should_refresh(StatusCode::UNAUTHORIZED, 0, true));
        assert!(!policy.should_refresh(StatusCode::UNAUTHORIZED, 1, true));
        assert!(!policy.should_refresh(StatusCode::UNAUTHORIZED, 0, false));
        assert!(!policy.should_refresh(StatusCode::FORBIDDEN, 0, true));
        assert!(!policy.should_refresh(StatusCode::INTERNAL_SERVER_ERROR, 0, true));
    }

    #[test]
    fn test_disabled_policy_never_refreshes() {
        assert!(!RefreshPolicy::disabled().should_refresh(StatusCode::UNAUTHORIZED, 0, true));
    }
}
