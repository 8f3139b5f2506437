//! Enabled/disabled flag shared by users, roles and menus.
//!
//! Serialized as the numeric codes the admin frontend expects: `1` for
//! enabled, `2` for disabled.

use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Status {
    #[default]
    Enable,
    Disable,
}

impl Status {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Enable => 1,
            Self::Disable => 2,
        }
    }

    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Enable)
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        status.as_u8()
    }
}

impl TryFrom<u8> for Status {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Enable),
            2 => Ok(Self::Disable),
            other => Err(format!("invalid status {other}, expected 1 or 2")),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enable => f.write_str("enable"),
            Self::Disable => f.write_str("disable"),
        }
    }
}
