use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// The authenticated account as returned by the profile endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
}

impl Identity {
    /// Roles this identity may present, in preference order
    pub fn roles(&self) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.holds(*role))
            .collect()
    }

    pub fn holds(&self, role: Role) -> bool {
        self.groups.iter().any(|g| g == role.as_str())
    }

    pub fn preferred_role(&self) -> Option<Role> {
        Role::preferred(self.groups.as_slice())
    }

    pub fn display_name(&self) -> String {
        match self.first_name.as_deref().map(str::trim) {
            Some(first) if !first.is_empty() => first.to_string(),
            _ => self.username.clone(),
        }
    }
}

/// A user as embedded in another record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// User fields come back either as a bare id or as a nested object,
/// depending on the serializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(i64),
    User(UserSummary),
}

impl UserRef {
    pub fn id(&self) -> Option<i64> {
        match self {
            UserRef::Id(id) => Some(*id),
            UserRef::User(user) => user.id,
        }
    }

    /// Key for de-duplication: id, else username
    pub fn key(&self) -> Option<String> {
        match self {
            UserRef::Id(id) => Some(id.to_string()),
            UserRef::User(user) => user
                .id
                .map(|id| id.to_string())
                .or_else(|| user.username.clone()),
        }
    }

    /// Trimmed first name, else username, else `#id`
    pub fn display_name(&self) -> String {
        match self {
            UserRef::Id(id) => format!("#{}", id),
            UserRef::User(user) => {
                if let Some(first) = user.first_name.as_deref().map(str::trim) {
                    if !first.is_empty() {
                        return first.to_string();
                    }
                }
                if let Some(ref username) = user.username {
                    return username.clone();
                }
                user.id.map(|id| format!("#{}", id)).unwrap_or_default()
            }
        }
    }
}
