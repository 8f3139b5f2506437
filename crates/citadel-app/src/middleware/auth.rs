use salvo::Depot;
use salvo::http::header::AUTHORIZATION;

use crate::app::api::response::render_error;
use crate::db_handler::get_store_from_depot;
use crate::error::AppResult;
use citadel_core::constants::TOKEN_QUERY_PARAM;
use citadel_service::auth::{
    CurrentUser, authenticate_token, authorizer_from_depot, depot::depot_keys,
    get_sessions_from_depot,
};
use citadel_service::error::ServiceError;

/// What a route requires of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No token needed.
    Public,
    /// Any valid token.
    Authenticated,
    /// A valid token whose user holds the permission code. Super-admins
    /// always pass.
    Permission(&'static str),
}

/// ## Summary
/// Per-route guard that resolves the caller from its bearer token and checks
/// the route's required permission.
///
/// ## Side Effects
/// Inserts the [`CurrentUser`] into the depot under `depot_keys::CURRENT_USER`.
///
/// ## Errors
/// Renders a 401 envelope for a missing, invalid or expired token (or a
/// missing or disabled user) and a 403 envelope when the permission is
/// not held. Both stop the handler chain.
pub struct AccessGuard {
    access: Access,
}

impl AccessGuard {
    #[must_use]
    pub const fn new(access: Access) -> Self {
        Self { access }
    }

    async fn resolve(&self, token: Option<String>, depot: &Depot) -> AppResult<CurrentUser> {
        let token = token.ok_or_else(|| {
            tracing::debug!("Request carries no token");
            ServiceError::NotAuthenticated
        })?;

        let store = get_store_from_depot(depot)?;
        let sessions = get_sessions_from_depot(depot)?;
        let current = authenticate_token(store.as_ref(), &sessions, &token).await?;

        if let Access::Permission(code) = self.access {
            authorizer_from_depot(depot)?
                .require(&current.user, code)
                .await?;
        }
        Ok(current)
    }
}

#[salvo::async_trait]
impl salvo::Handler for AccessGuard {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path(),
        access = ?self.access
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        if self.access == Access::Public {
            return;
        }

        match self.resolve(extract_token(req), depot).await {
            Ok(current) => {
                tracing::debug!(user_id = current.user.id, "Caller resolved");
                depot.insert(depot_keys::CURRENT_USER, current);
            }
            Err(err) => {
                render_error(res, &err);
                ctrl.skip_rest();
            }
        }
    }
}

/// Reads the token from `Authorization: Bearer <token>`, falling back to the
/// `token` query parameter.
#[must_use]
pub fn extract_token(req: &salvo::Request) -> Option<String> {
    let from_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.trim().split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim().to_string())
        })
        .filter(|token| !token.is_empty());

    from_header.or_else(|| {
        req.query::<String>(TOKEN_QUERY_PARAM)
            .filter(|token| !token.is_empty())
    })
}
