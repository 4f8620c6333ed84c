use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role a session presents to the backend via the `X-Active-Role` header.
///
/// Declaration order is the default-selection preference: when an identity
/// holds several roles, the first one listed here wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Service,
    Client,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Manager, Role::Service, Role::Client];

    /// Wire tag, also the backend's group name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Service => "service",
            Role::Client => "client",
        }
    }

    /// Human readable label for display
    pub fn label(&self) -> &'static str {
        match self {
            Role::Manager => "Manager",
            Role::Service => "Service company",
            Role::Client => "Client",
        }
    }

    /// Pick the default role for an identity from its group names.
    /// Groups that are not role tags are ignored.
    pub fn preferred<S: AsRef<str>>(groups: &[S]) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|role| groups.iter().any(|g| g.as_ref() == role.as_str()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}' (expected manager, service or client)", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "manager" => Ok(Role::Manager),
            "service" => Ok(Role::Service),
            "client" => Ok(Role::Client),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
