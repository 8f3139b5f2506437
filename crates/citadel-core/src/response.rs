//! Response envelope shared by every admin route.
//!
//! Every response body has the shape `{code, message, data}`. The `code` is
//! drawn from [`ResultCode`] and is mirrored by the HTTP status.

use serde::{Serialize, Serializer};

/// Outcome codes carried in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Success,
    Unauthorized,
    Forbidden,
    NotFound,
    ValidationFailed,
    ServerError,
}

impl ResultCode {
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::Success => 200,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::ValidationFailed => 422,
            Self::ServerError => 500,
        }
    }

    /// Default human readable message for the code.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not found",
            Self::ValidationFailed => "Validation failed",
            Self::ServerError => "Server error",
        }
    }

    #[must_use]
    pub const fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(Self::Success),
            401 => Some(Self::Unauthorized),
            403 => Some(Self::Forbidden),
            404 => Some(Self::NotFound),
            422 => Some(Self::ValidationFailed),
            500 => Some(Self::ServerError),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

impl Serialize for ResultCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.as_u16())
    }
}

/// The `{code, message, data}` envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: ResultCode,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            code: ResultCode::Success,
            message: ResultCode::Success.default_message().to_string(),
            data,
        }
    }
}

impl ApiResponse<()> {
    /// Success envelope with a `null` payload.
    #[must_use]
    pub fn ok() -> Self {
        Self::success(())
    }

    #[must_use]
    pub fn error(code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: (),
        }
    }
}
