//! Subject types for authorization.
//!
//! A subject is anything a permission or a role can be attached to: a user
//! (keyed by username) or a role (keyed by role code). Roles may themselves be
//! assigned roles, which is how cascading grants are expressed.

use citadel_db::model::User;

/// A subject for authorization checks.
///
/// In Casbin terms, this is the `sub` parameter in enforcement requests and
/// the left-hand side of `g` rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subject {
    /// A user identified by username.
    User(String),
    /// A role identified by its code.
    Role(String),
}

impl Subject {
    /// Create a subject from a user.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self::User(user.username.clone())
    }

    #[must_use]
    pub fn role(code: impl Into<String>) -> Self {
        Self::Role(code.into())
    }

    /// Returns the Casbin subject string.
    #[must_use]
    pub fn casbin_subject(&self) -> String {
        match self {
            Self::User(name) => format!("user:{name}"),
            Self::Role(code) => format!("role:{code}"),
        }
    }

    /// Parse a Casbin subject string.
    #[must_use]
    pub fn from_casbin_subject(s: &str) -> Option<Self> {
        if let Some(name) = s.strip_prefix("user:") {
            return (!name.is_empty()).then(|| Self::User(name.to_string()));
        }
        let code = s.strip_prefix("role:")?;
        (!code.is_empty()).then(|| Self::Role(code.to_string()))
    }

    /// Returns the role code if this subject is a role.
    #[must_use]
    pub fn role_code(&self) -> Option<&str> {
        match self {
            Self::Role(code) => Some(code),
            Self::User(_) => None,
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.casbin_subject())
    }
}
