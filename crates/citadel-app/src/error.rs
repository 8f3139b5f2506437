use thiserror::Error;

use citadel_core::error::CoreError;
use citadel_core::response::ResultCode;
use citadel_db::error::DbError;
use citadel_service::error::ServiceError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] DbError),

    #[error(transparent)]
    CoreError(#[from] CoreError),

    /// The request could not be decoded (bad JSON body, bad path or query value).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Envelope code this error is reported with.
    #[must_use]
    pub fn result_code(&self) -> ResultCode {
        match self {
            Self::ServiceError(err) => service_code(err),
            Self::DatabaseError(err) => db_code(err),
            Self::CoreError(err) => core_code(err),
            Self::InvalidRequest(_) => ResultCode::ValidationFailed,
        }
    }

    /// Message safe to show the caller. Internal failures and token problems
    /// get the generic text for their code; details only go to the log.
    #[must_use]
    pub fn public_message(&self) -> String {
        match (self.result_code(), self) {
            (_, Self::ServiceError(ServiceError::InvalidCredentials)) => self.to_string(),
            (code @ (ResultCode::ServerError | ResultCode::Unauthorized), _) => {
                code.default_message().to_string()
            }
            _ => self.to_string(),
        }
    }
}

fn service_code(err: &ServiceError) -> ResultCode {
    match err {
        ServiceError::InvalidCredentials | ServiceError::NotAuthenticated => {
            ResultCode::Unauthorized
        }
        ServiceError::AuthorizationError(_) => ResultCode::Forbidden,
        ServiceError::NotFound(_) => ResultCode::NotFound,
        ServiceError::ValidationError(_) => ResultCode::ValidationFailed,
        ServiceError::DatabaseError(err) => db_code(err),
        ServiceError::CasbinError(_)
        | ServiceError::InvalidConfiguration(_)
        | ServiceError::InvariantViolation(_) => ResultCode::ServerError,
    }
}

fn db_code(err: &DbError) -> ResultCode {
    match err {
        DbError::NotFound(_) => ResultCode::NotFound,
        DbError::Conflict(_) => ResultCode::ValidationFailed,
    }
}

const fn core_code(err: &CoreError) -> ResultCode {
    match err {
        CoreError::InvalidConfiguration(_) | CoreError::InvariantViolation(_) => {
            ResultCode::ServerError
        }
    }
}
