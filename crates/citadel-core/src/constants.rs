/// Route component constants shared across crates
pub const ADMIN_ROUTE_COMPONENT: &str = "admin";
pub const ADMIN_ROUTE_PREFIX: &str = const_str::concat!("/", ADMIN_ROUTE_COMPONENT);

pub const PASSPORT_ROUTE_COMPONENT: &str = "passport";
pub const PASSPORT_ROUTE_PREFIX: &str =
    const_str::concat!(ADMIN_ROUTE_PREFIX, "/", PASSPORT_ROUTE_COMPONENT);

pub const PERMISSION_ROUTE_COMPONENT: &str = "permission";
pub const PERMISSION_ROUTE_PREFIX: &str =
    const_str::concat!(ADMIN_ROUTE_PREFIX, "/", PERMISSION_ROUTE_COMPONENT);

pub const ROLE_ROUTE_COMPONENT: &str = "role";
pub const ROLE_ROUTE_PREFIX: &str =
    const_str::concat!(ADMIN_ROUTE_PREFIX, "/", ROLE_ROUTE_COMPONENT);

/// Name of the query parameter that may carry the session token when no
/// `Authorization` header is present.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Permission codes guarding the role management routes.
pub mod permission_codes {
    pub const ROLE_LIST: &str = "role:list";
    pub const ROLE_CREATE: &str = "role:create";
    pub const ROLE_SAVE: &str = "role:save";
    pub const ROLE_DELETE: &str = "role:delete";
    pub const ROLE_GET_PERMISSION: &str = "role:getPermission";
    pub const ROLE_SET_PERMISSION: &str = "role:setPermission";
}
