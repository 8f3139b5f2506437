use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Status;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: u64,
    pub name: String,
    /// Unique code; this is the subject name used in the policy store.
    pub code: String,
    pub status: Status,
    pub sort: i32,
    pub remark: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRole {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub sort: i32,
    #[serde(default)]
    pub remark: String,
}

/// Full replacement of a role's editable columns.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleChangeset {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub sort: i32,
    #[serde(default)]
    pub remark: String,
}

/// Listing filter; every populated field must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleFilter {
    /// Substring match on the role name.
    pub name: Option<String>,
    pub code: Option<String>,
    pub status: Option<Status>,
}

impl RoleFilter {
    #[must_use]
    pub fn enabled() -> Self {
        Self {
            status: Some(Status::Enable),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn matches(&self, role: &Role) -> bool {
        self.name
            .as_deref()
            .is_none_or(|name| role.name.contains(name))
            && self.code.as_deref().is_none_or(|code| role.code == code)
            && self.status.is_none_or(|status| role.status == status)
    }
}
