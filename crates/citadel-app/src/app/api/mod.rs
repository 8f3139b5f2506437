mod admin;
mod healthcheck;
pub mod response;
pub mod route;

use salvo::Router;

use route::RouteEntry;

// Re-export route constants from core
pub use citadel_core::constants::{
    ADMIN_ROUTE_PREFIX, PASSPORT_ROUTE_PREFIX, PERMISSION_ROUTE_PREFIX, ROLE_ROUTE_PREFIX,
};

/// Every admin endpoint with the access it requires.
#[must_use]
pub fn route_table() -> Vec<RouteEntry> {
    let mut table = admin::passport::entries();
    table.extend(admin::permission::entries());
    table.extend(admin::role::entries());
    table
}

/// ## Summary
/// Constructs the main API router from the route table plus the public
/// health check.
#[must_use]
pub fn routes() -> Router {
    route_table()
        .into_iter()
        .fold(Router::new().push(healthcheck::routes()), |router, entry| {
            router.push(entry.into_router())
        })
}
