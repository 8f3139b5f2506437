//! `/admin/passport`: login, logout, profile and token refresh.

use salvo::{Depot, Request, Response, handler};
use serde::Deserialize;

use crate::app::api::response::{json_body, render};
use crate::app::api::route::RouteEntry;
use crate::db_handler::get_store_from_depot;
use crate::error::AppResult;
use crate::middleware::auth::Access;
use citadel_core::constants::PASSPORT_ROUTE_PREFIX;
use citadel_service::auth::{
    IssuedToken, LoginOutcome, get_current_user_from_depot, get_policy_store_from_depot,
    get_sessions_from_depot, get_token_from_depot,
};
use citadel_service::error::ServiceError;
use citadel_service::listing::{UserInfo, user_info};

const USERNAME_MAX_LEN: usize = 20;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    fn validate(&self) -> Result<(), ServiceError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(ServiceError::ValidationError("username is required".to_string()));
        }
        if username.chars().count() > USERNAME_MAX_LEN {
            return Err(ServiceError::ValidationError(format!(
                "username must be at most {USERNAME_MAX_LEN} characters"
            )));
        }
        if self.password.is_empty() {
            return Err(ServiceError::ValidationError("password is required".to_string()));
        }
        Ok(())
    }
}

#[must_use]
pub fn entries() -> Vec<RouteEntry> {
    vec![
        RouteEntry::post(format!("{PASSPORT_ROUTE_PREFIX}/login"), Access::Public, login),
        RouteEntry::post(
            format!("{PASSPORT_ROUTE_PREFIX}/logout"),
            Access::Authenticated,
            logout,
        ),
        RouteEntry::get(
            format!("{PASSPORT_ROUTE_PREFIX}/getInfo"),
            Access::Authenticated,
            get_info,
        ),
        RouteEntry::post(
            format!("{PASSPORT_ROUTE_PREFIX}/refresh"),
            Access::Authenticated,
            refresh,
        ),
    ]
}

/// ## Summary
/// Exchanges a username and password for a session token.
#[handler]
#[tracing::instrument(skip(req, depot, res), fields(
    method = "POST",
    path = %req.uri().path()
))]
pub async fn login(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    render(res, perform_login(req, depot).await);
}

async fn perform_login(req: &mut Request, depot: &Depot) -> AppResult<LoginOutcome> {
    let body: LoginRequest = json_body(req).await?;
    body.validate()?;

    let store = get_store_from_depot(depot)?;
    let sessions = get_sessions_from_depot(depot)?;
    let outcome = citadel_service::auth::login(
        store.as_ref(),
        &sessions,
        body.username.trim(),
        &body.password,
    )
    .await?;
    Ok(outcome)
}

/// ## Summary
/// Invalidates the presented token. The `null` payload is returned even if a
/// concurrent request already removed the session.
#[handler]
#[tracing::instrument(skip_all)]
pub async fn logout(depot: &mut Depot, res: &mut Response) {
    render(res, perform_logout(depot).await);
}

async fn perform_logout(depot: &Depot) -> AppResult<()> {
    let token = get_token_from_depot(depot)?;
    let sessions = get_sessions_from_depot(depot)?;
    sessions.logout(token).await;
    Ok(())
}

#[handler]
#[tracing::instrument(skip_all)]
pub async fn get_info(depot: &mut Depot, res: &mut Response) {
    render(res, perform_get_info(depot).await);
}

async fn perform_get_info(depot: &Depot) -> AppResult<UserInfo> {
    let current = get_current_user_from_depot(depot)?;
    let policy = get_policy_store_from_depot(depot)?;
    Ok(user_info(&policy, &current.user).await)
}

/// ## Summary
/// Swaps the presented token for a new one. Of concurrent refreshes of the
/// same token exactly one succeeds; the others get 401.
#[handler]
#[tracing::instrument(skip_all)]
pub async fn refresh(depot: &mut Depot, res: &mut Response) {
    render(res, perform_refresh(depot).await);
}

async fn perform_refresh(depot: &Depot) -> AppResult<IssuedToken> {
    let token = get_token_from_depot(depot)?;
    let sessions = get_sessions_from_depot(depot)?;
    Ok(sessions.refresh(token).await?)
}
