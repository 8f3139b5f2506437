use casbin::{CoreApi, MgmtApi};

use crate::error::ServiceResult;

/// ## Summary
/// Initialize a Casbin enforcer over an in-memory adapter.
///
/// The model matches a subject against a permission code exactly. Role
/// inheritance is resolved by [`super::policy::PolicyStore`] rather than by
/// the matcher, so the cascade depth stays bounded and configurable.
///
/// ## Errors
/// Returns an error if the model fails to parse or the enforcer cannot be built.
#[tracing::instrument]
pub async fn init_casbin() -> ServiceResult<casbin::Enforcer> {
    tracing::debug!("Initializing Casbin enforcer");

    let model = casbin::DefaultModel::from_str(include_str!("casbin_model.conf")).await?;
    tracing::debug!("Casbin model loaded");

    let adapter = casbin::MemoryAdapter::default();
    let enforcer = casbin::Enforcer::new(model, adapter).await?;

    let policy_count = enforcer.get_policy().len();
    let grouping_count = enforcer.get_grouping_policy().len();
    tracing::info!(
        policy_count = policy_count,
        grouping_count = grouping_count,
        "Casbin enforcer initialized successfully"
    );
    Ok(enforcer)
}
