//! `/admin/permission`: the caller's visible menu tree and roles.

use salvo::{Depot, Response, handler};

use crate::app::api::response::render;
use crate::app::api::route::RouteEntry;
use crate::db_handler::get_store_from_depot;
use crate::error::AppResult;
use crate::middleware::auth::Access;
use citadel_core::constants::PERMISSION_ROUTE_PREFIX;
use citadel_db::model::Role;
use citadel_service::auth::{get_current_user_from_depot, get_policy_store_from_depot};
use citadel_service::listing::{MenuNode, menus_for, roles_for};

#[must_use]
pub fn entries() -> Vec<RouteEntry> {
    vec![
        RouteEntry::get(
            format!("{PERMISSION_ROUTE_PREFIX}/menus"),
            Access::Authenticated,
            menus,
        ),
        RouteEntry::get(
            format!("{PERMISSION_ROUTE_PREFIX}/roles"),
            Access::Authenticated,
            roles,
        ),
    ]
}

#[handler]
#[tracing::instrument(skip_all)]
pub async fn menus(depot: &mut Depot, res: &mut Response) {
    render(res, perform_menus(depot).await);
}

async fn perform_menus(depot: &Depot) -> AppResult<Vec<MenuNode>> {
    let current = get_current_user_from_depot(depot)?;
    let store = get_store_from_depot(depot)?;
    let policy = get_policy_store_from_depot(depot)?;
    Ok(menus_for(store.as_ref(), &policy, &current.user).await?)
}

#[handler]
#[tracing::instrument(skip_all)]
pub async fn roles(depot: &mut Depot, res: &mut Response) {
    render(res, perform_roles(depot).await);
}

async fn perform_roles(depot: &Depot) -> AppResult<Vec<Role>> {
    let current = get_current_user_from_depot(depot)?;
    let store = get_store_from_depot(depot)?;
    let policy = get_policy_store_from_depot(depot)?;
    Ok(roles_for(store.as_ref(), &policy, &current.user).await?)
}
