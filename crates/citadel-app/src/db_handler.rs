use salvo::async_trait;
use std::sync::Arc;

use crate::error::AppResult;
use citadel_core::error::CoreError;
use citadel_db::store::AdminStore;

pub struct StoreHandler {
    pub store: Arc<dyn AdminStore>,
}

#[async_trait]
impl salvo::Handler for StoreHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.store.clone());
    }
}

/// ## Summary
/// Retrieves the admin store from the depot.
///
/// ## Errors
/// Returns an error if the store is not found in the depot.
pub fn get_store_from_depot(depot: &salvo::Depot) -> AppResult<Arc<dyn AdminStore>> {
    depot
        .obtain::<Arc<dyn AdminStore>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Admin store not found in depot").into())
}
