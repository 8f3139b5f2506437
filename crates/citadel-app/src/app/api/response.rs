//! Rendering of the `{code, message, data}` envelope and request decoding
//! helpers shared by the admin handlers.

use std::str::FromStr;

use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};
use citadel_core::response::{ApiResponse, ResultCode};

/// HTTP status mirroring an envelope code.
#[must_use]
pub const fn status_for(code: ResultCode) -> StatusCode {
    match code {
        ResultCode::Success => StatusCode::OK,
        ResultCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ResultCode::Forbidden => StatusCode::FORBIDDEN,
        ResultCode::NotFound => StatusCode::NOT_FOUND,
        ResultCode::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
        ResultCode::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn render_success<T: Serialize + Send>(res: &mut Response, data: T) {
    res.status_code(StatusCode::OK);
    res.render(Json(ApiResponse::success(data)));
}

pub fn render_error(res: &mut Response, err: &AppError) {
    let code = err.result_code();
    if code == ResultCode::ServerError {
        tracing::error!(error = ?err, "Request failed");
    } else {
        tracing::debug!(error = %err, code = %code, "Request rejected");
    }

    res.status_code(status_for(code));
    res.render(Json(ApiResponse::error(code, err.public_message())));
}

/// Renders either the success envelope with `data` or the error envelope.
pub fn render<T: Serialize + Send>(res: &mut Response, result: AppResult<T>) {
    match result {
        Ok(data) => render_success(res, data),
        Err(err) => render_error(res, &err),
    }
}

/// ## Errors
/// Returns `InvalidRequest` if the body is missing or is not the expected JSON.
pub async fn json_body<T: DeserializeOwned>(req: &mut Request) -> AppResult<T> {
    req.parse_json::<T>()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("malformed JSON body: {e}")))
}

/// ## Errors
/// Returns `InvalidRequest` if the `id` path segment is not a positive integer.
pub fn path_id(req: &Request) -> AppResult<u64> {
    req.param::<String>("id")
        .and_then(|raw| raw.parse::<u64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::InvalidRequest("id must be a positive integer".to_string()))
}

/// ## Errors
/// Returns `InvalidRequest` if the parameter is present but does not parse.
pub fn query_value<T: FromStr>(req: &Request, key: &str) -> AppResult<Option<T>> {
    match req.query::<String>(key).filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_err| AppError::InvalidRequest(format!("invalid value for '{key}'"))),
    }
}
