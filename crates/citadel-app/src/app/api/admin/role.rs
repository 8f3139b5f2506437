//! `/admin/role`: role management, each route guarded by its own code.

use salvo::{Depot, Request, Response, handler};
use serde::Deserialize;

use crate::app::api::response::{json_body, path_id, query_value, render};
use crate::app::api::route::RouteEntry;
use crate::db_handler::get_store_from_depot;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::Access;
use citadel_core::constants::{ROLE_ROUTE_PREFIX, permission_codes};
use citadel_db::model::{Menu, NewRole, RoleChangeset, RoleFilter, Status};
use citadel_service::auth::get_policy_store_from_depot;
use citadel_service::role::{self as roles, PageRequest, RolePage};

#[derive(Debug, Deserialize)]
pub struct SetPermissionRequest {
    /// Menu ids whose codes become the role's complete grant set.
    #[serde(default)]
    pub permission_ids: Vec<u64>,
}

#[must_use]
pub fn entries() -> Vec<RouteEntry> {
    let guarded = Access::Permission;
    vec![
        RouteEntry::get(
            format!("{ROLE_ROUTE_PREFIX}/list"),
            guarded(permission_codes::ROLE_LIST),
            list,
        ),
        RouteEntry::post(
            ROLE_ROUTE_PREFIX,
            guarded(permission_codes::ROLE_CREATE),
            create,
        ),
        RouteEntry::put(
            format!("{ROLE_ROUTE_PREFIX}/{{id}}"),
            guarded(permission_codes::ROLE_SAVE),
            save,
        ),
        RouteEntry::delete(
            ROLE_ROUTE_PREFIX,
            guarded(permission_codes::ROLE_DELETE),
            delete,
        ),
        RouteEntry::get(
            format!("{ROLE_ROUTE_PREFIX}/getRolePermission/{{id}}"),
            guarded(permission_codes::ROLE_GET_PERMISSION),
            get_permission,
        ),
        RouteEntry::put(
            format!("{ROLE_ROUTE_PREFIX}/setRolePermission/{{id}}"),
            guarded(permission_codes::ROLE_SET_PERMISSION),
            set_permission,
        ),
    ]
}

#[handler]
#[tracing::instrument(skip_all)]
pub async fn list(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    render(res, perform_list(req, depot).await);
}

async fn perform_list(req: &Request, depot: &Depot) -> AppResult<RolePage> {
    let page = PageRequest::new(
        query_value::<usize>(req, "page")?,
        query_value::<usize>(req, "page_size")?,
    )?;
    let status = query_value::<u8>(req, "status")?
        .map(Status::try_from)
        .transpose()
        .map_err(AppError::InvalidRequest)?;
    let filter = RoleFilter {
        name: query_value::<String>(req, "name")?,
        code: query_value::<String>(req, "code")?,
        status,
    };

    let store = get_store_from_depot(depot)?;
    Ok(roles::page_roles(store.as_ref(), &filter, page).await?)
}

#[handler]
#[tracing::instrument(skip_all)]
pub async fn create(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    render(res, perform_create(req, depot).await);
}

async fn perform_create(req: &mut Request, depot: &Depot) -> AppResult<()> {
    let role: NewRole = json_body(req).await?;
    let store = get_store_from_depot(depot)?;
    roles::create_role(store.as_ref(), role).await?;
    Ok(())
}

#[handler]
#[tracing::instrument(skip_all)]
pub async fn save(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    render(res, perform_save(req, depot).await);
}

async fn perform_save(req: &mut Request, depot: &Depot) -> AppResult<()> {
    let id = path_id(req)?;
    let changes: RoleChangeset = json_body(req).await?;
    let store = get_store_from_depot(depot)?;
    let policy = get_policy_store_from_depot(depot)?;
    roles::save_role(store.as_ref(), &policy, id, changes).await?;
    Ok(())
}

#[handler]
#[tracing::instrument(skip_all)]
pub async fn delete(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    render(res, perform_delete(req, depot).await);
}

async fn perform_delete(req: &mut Request, depot: &Depot) -> AppResult<()> {
    let ids: Vec<u64> = json_body(req).await?;
    let store = get_store_from_depot(depot)?;
    let policy = get_policy_store_from_depot(depot)?;
    roles::delete_roles(store.as_ref(), &policy, &ids).await?;
    Ok(())
}

#[handler]
#[tracing::instrument(skip_all)]
pub async fn get_permission(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    render(res, perform_get_permission(req, depot).await);
}

async fn perform_get_permission(req: &Request, depot: &Depot) -> AppResult<Vec<Menu>> {
    let id = path_id(req)?;
    let store = get_store_from_depot(depot)?;
    let policy = get_policy_store_from_depot(depot)?;
    Ok(roles::role_permissions(store.as_ref(), &policy, id).await?)
}

#[handler]
#[tracing::instrument(skip_all)]
pub async fn set_permission(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    render(res, perform_set_permission(req, depot).await);
}

async fn perform_set_permission(req: &mut Request, depot: &Depot) -> AppResult<()> {
    let id = path_id(req)?;
    let body: SetPermissionRequest = json_body(req).await?;
    let store = get_store_from_depot(depot)?;
    let policy = get_policy_store_from_depot(depot)?;
    roles::set_role_permissions(store.as_ref(), &policy, id, &body.permission_ids).await?;
    Ok(())
}
