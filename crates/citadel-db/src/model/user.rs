use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Status;

/// A back-office account.
///
/// The password hash never leaves the process: it is skipped on serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub nickname: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Super-admins bypass every permission check.
    pub super_admin: bool,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.status.is_enabled()
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub nickname: String,
    pub password_hash: String,
    pub super_admin: bool,
    pub status: Status,
}
