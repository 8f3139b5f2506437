use serde::Serialize;

use citadel_db::model::User;
use citadel_db::store::AdminStore;

use super::depot::CurrentUser;
use super::password::verify_password;
use super::session::{IssuedToken, SessionStore};
use crate::error::{ServiceError, ServiceResult};

/// A successful login: the new token plus the caller's profile.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    #[serde(flatten)]
    pub token: IssuedToken,
    pub user: User,
}

/// ## Summary
/// Verifies a username and password and opens a session.
///
/// An unknown user, a disabled user and a wrong password all fail the same
/// way. Nothing but the session table is touched.
///
/// ## Errors
/// Returns `InvalidCredentials` on any credential failure, or a storage or
/// configuration error if the lookup or hash parsing fails.
#[tracing::instrument(skip(store, sessions, password))]
pub async fn login(
    store: &dyn AdminStore,
    sessions: &SessionStore,
    username: &str,
    password: &str,
) -> ServiceResult<LoginOutcome> {
    let Some(user) = store.find_user_by_username(username).await? else {
        tracing::debug!("Login for unknown user");
        return Err(ServiceError::InvalidCredentials);
    };

    if !user.is_enabled() {
        tracing::debug!(user_id = user.id, "Login for disabled user");
        return Err(ServiceError::InvalidCredentials);
    }

    verify_password(password, &user.password_hash)?;

    let token = sessions.issue(user.id).await?;
    tracing::info!(user_id = user.id, "User logged in");
    Ok(LoginOutcome { token, user })
}

/// ## Summary
/// Resolves a bearer token to the caller behind it.
///
/// ## Errors
/// Returns `NotAuthenticated` if the token is invalid or its user no longer
/// exists or has been disabled.
#[tracing::instrument(skip(store, sessions, token))]
pub async fn authenticate_token(
    store: &dyn AdminStore,
    sessions: &SessionStore,
    token: &str,
) -> ServiceResult<CurrentUser> {
    let session = sessions.validate(token).await?;

    let user = store
        .find_user(session.user_id)
        .await?
        .filter(User::is_enabled)
        .ok_or_else(|| {
            tracing::debug!(user_id = session.user_id, "Session user missing or disabled");
            ServiceError::NotAuthenticated
        })?;

    Ok(CurrentUser {
        user,
        session,
        token: token.to_string(),
    })
}
