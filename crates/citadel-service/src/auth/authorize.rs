//! Authorization service for centralized access control.
//!
//! Handlers and the access guard ask an [`Authorizer`] whether a caller holds
//! a permission code. Super-admins are allowed without consulting policy.

use std::sync::Arc;

use citadel_db::model::User;

use super::policy::PolicyStore;
use super::subject::Subject;
use crate::error::{ServiceError, ServiceResult};

/// Result of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthzResult {
    /// Access is allowed.
    Allowed,
    /// Access is denied.
    Denied,
}

impl AuthzResult {
    /// Returns `true` if access is allowed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Convert to a `Result`, returning `Err(ServiceError::AuthorizationError)` if denied.
    ///
    /// ## Errors
    ///
    /// Returns `AuthorizationError` if access is denied.
    pub fn require(self, code: &str) -> ServiceResult<()> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied => Err(ServiceError::AuthorizationError(format!(
                "Access denied: missing permission '{code}'"
            ))),
        }
    }
}

/// Authorization service for checking permissions.
pub struct Authorizer {
    policy: Arc<PolicyStore>,
}

impl Authorizer {
    #[must_use]
    pub fn new(policy: Arc<PolicyStore>) -> Self {
        Self { policy }
    }

    /// Check whether `user` holds `code`, directly or through roles.
    ///
    /// ## Errors
    ///
    /// Returns `CasbinError` if Casbin evaluation fails.
    pub async fn check(&self, user: &User, code: &str) -> ServiceResult<AuthzResult> {
        if user.super_admin {
            tracing::debug!(user_id = user.id, code, "Super-admin bypass");
            return Ok(AuthzResult::Allowed);
        }

        let allowed = self
            .policy
            .has_permission(&Subject::from_user(user), code)
            .await?;

        tracing::debug!(user_id = user.id, code, allowed, "Authorization check");
        Ok(if allowed {
            AuthzResult::Allowed
        } else {
            AuthzResult::Denied
        })
    }

    /// Check and require permission, returning an error if denied.
    ///
    /// ## Errors
    ///
    /// - Returns `AuthorizationError` if access is denied.
    /// - Returns `CasbinError` if Casbin evaluation fails.
    pub async fn require(&self, user: &User, code: &str) -> ServiceResult<()> {
        self.check(user, code).await?.require(code)
    }
}

/// Create an authorizer from the depot.
///
/// ## Errors
///
/// Returns `InvariantViolation` if the policy store is not in the depot.
pub fn authorizer_from_depot(depot: &salvo::Depot) -> ServiceResult<Authorizer> {
    let policy = super::policy::get_policy_store_from_depot(depot)?;
    Ok(Authorizer::new(policy))
}
