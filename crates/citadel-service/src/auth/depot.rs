//! Depot helpers for reading the authenticated caller from Salvo requests.

use citadel_db::model::User;

use super::session::Session;
use super::subject::Subject;
use crate::error::{ServiceError, ServiceResult};

pub mod depot_keys {
    pub const CURRENT_USER: &str = "__current_user";
}

/// The caller resolved from a valid bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session: Session,
    /// The token presented with the request, needed by logout and refresh.
    pub token: String,
}

impl CurrentUser {
    #[must_use]
    pub fn subject(&self) -> Subject {
        Subject::from_user(&self.user)
    }
}

/// Get the authenticated caller from the depot.
///
/// ## Errors
///
/// Returns `NotAuthenticated` if the access guard did not store a caller.
pub fn get_current_user_from_depot(depot: &salvo::Depot) -> ServiceResult<&CurrentUser> {
    depot
        .get::<CurrentUser>(depot_keys::CURRENT_USER)
        .map_err(|_e| ServiceError::NotAuthenticated)
}

/// Get the bearer token the caller authenticated with.
///
/// ## Errors
///
/// Returns `NotAuthenticated` if there is no authenticated caller.
pub fn get_token_from_depot(depot: &salvo::Depot) -> ServiceResult<&str> {
    get_current_user_from_depot(depot).map(|current| current.token.as_str())
}

/// Check if the request carries an authenticated caller.
#[must_use]
pub fn is_authenticated(depot: &salvo::Depot) -> bool {
    depot.get::<CurrentUser>(depot_keys::CURRENT_USER).is_ok()
}
