//! Role management: paging, create/update/delete and permission assignment.
//!
//! The store owns role rows; the policy store owns what a role grants. Every
//! operation that changes a role code or removes a role keeps the two in step.

use std::collections::BTreeSet;

use serde::Serialize;

use citadel_db::error::DbError;
use citadel_db::model::{Menu, NewRole, Role, RoleChangeset, RoleFilter};
use citadel_db::store::AdminStore;

use crate::auth::policy::PolicyStore;
use crate::auth::subject::Subject;
use crate::error::{ServiceError, ServiceResult};

pub const NAME_MAX_LEN: usize = 30;
pub const CODE_MAX_LEN: usize = 100;
pub const REMARK_MAX_LEN: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub const DEFAULT_PAGE_SIZE: usize = 10;
    pub const MAX_PAGE_SIZE: usize = 100;

    /// ## Summary
    /// Builds a page request, filling in defaults for missing values.
    ///
    /// ## Errors
    /// Returns `ValidationError` if `page` is zero or `page_size` is outside
    /// `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<usize>, page_size: Option<usize>) -> ServiceResult<Self> {
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(Self::DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(ServiceError::ValidationError(
                "page must be at least 1".to_string(),
            ));
        }
        if !(1..=Self::MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ServiceError::ValidationError(format!(
                "page_size must be between 1 and {}",
                Self::MAX_PAGE_SIZE
            )));
        }
        Ok(Self { page, page_size })
    }

    const fn offset(self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RolePage {
    pub list: Vec<Role>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// ## Summary
/// Checks the editable fields shared by create and update.
///
/// ## Errors
/// Returns `ValidationError` describing the first offending field.
pub fn validate_role_fields(name: &str, code: &str, remark: &str) -> ServiceResult<()> {
    let invalid = |msg: String| Err(ServiceError::ValidationError(msg));

    if name.trim().is_empty() {
        return invalid("name is required".to_string());
    }
    if name.chars().count() > NAME_MAX_LEN {
        return invalid(format!("name must be at most {NAME_MAX_LEN} characters"));
    }
    if code.is_empty() {
        return invalid("code is required".to_string());
    }
    if code.len() > CODE_MAX_LEN {
        return invalid(format!("code must be at most {CODE_MAX_LEN} characters"));
    }
    if !code
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b':'))
    {
        return invalid("code may only contain letters, digits, '_', '-' and ':'".to_string());
    }
    if remark.chars().count() > REMARK_MAX_LEN {
        return invalid(format!("remark must be at most {REMARK_MAX_LEN} characters"));
    }
    Ok(())
}

/// ## Errors
/// Returns `ValidationError` if the id list is empty.
pub fn validate_ids(ids: &[u64]) -> ServiceResult<()> {
    if ids.is_empty() {
        return Err(ServiceError::ValidationError(
            "at least one id is required".to_string(),
        ));
    }
    Ok(())
}

/// ## Errors
/// Returns an error if the store fails.
pub async fn page_roles(
    store: &dyn AdminStore,
    filter: &RoleFilter,
    page: PageRequest,
) -> ServiceResult<RolePage> {
    let roles = store.list_roles(filter).await?;
    let total = roles.len();
    let list = roles
        .into_iter()
        .skip(page.offset())
        .take(page.page_size)
        .collect();

    Ok(RolePage {
        list,
        total,
        page: page.page,
        page_size: page.page_size,
    })
}

/// ## Errors
/// Returns `ValidationError` for bad fields, or `Conflict` (as a database
/// error) if the code is taken.
#[tracing::instrument(skip(store, role), fields(code = %role.code))]
pub async fn create_role(store: &dyn AdminStore, role: NewRole) -> ServiceResult<Role> {
    validate_role_fields(&role.name, &role.code, &role.remark)?;
    let role = store.create_role(role).await?;
    tracing::info!(role_id = role.id, "Role created");
    Ok(role)
}

/// ## Summary
/// Replaces a role's editable fields. A code change carries the role's
/// grants and assignments over to the new code.
///
/// The policy is renamed before the row is written; if the write fails the
/// rename is reversed, so a row never names a code its grants are not under.
///
/// ## Errors
/// Returns `ValidationError` for bad fields, `NotFound` or `Conflict` (as
/// database errors) from the store, or a Casbin error.
#[tracing::instrument(skip(store, policy, changes))]
pub async fn save_role(
    store: &dyn AdminStore,
    policy: &PolicyStore,
    id: u64,
    changes: RoleChangeset,
) -> ServiceResult<Role> {
    validate_role_fields(&changes.name, &changes.code, &changes.remark)?;

    let previous = find_role(store, id).await?;
    if previous.code == changes.code {
        return Ok(store.update_role(id, changes).await?);
    }

    // A taken code must be refused before the rename, which would otherwise
    // merge the two roles' rules.
    if store
        .find_role_by_code(&changes.code)
        .await?
        .is_some_and(|other| other.id != id)
    {
        return Err(DbError::Conflict(format!(
            "role code '{}' already exists",
            changes.code
        ))
        .into());
    }

    let new_code = changes.code.clone();
    policy.rename_role(&previous.code, &new_code).await?;

    match store.update_role(id, changes).await {
        Ok(role) => {
            tracing::info!(from = %previous.code, to = %role.code, "Role code changed");
            Ok(role)
        }
        Err(err) => {
            if let Err(rollback) = policy.rename_role(&new_code, &previous.code).await {
                tracing::error!(
                    error = %rollback,
                    from = %new_code,
                    to = %previous.code,
                    "Failed to restore role policy after a rejected update"
                );
            }
            Err(err.into())
        }
    }
}

/// ## Summary
/// Deletes roles and every policy rule that mentions them. Unknown ids are
/// ignored; returns how many roles were removed.
///
/// ## Errors
/// Returns `ValidationError` for an empty id list, or a store or Casbin error.
#[tracing::instrument(skip(store, policy))]
pub async fn delete_roles(
    store: &dyn AdminStore,
    policy: &PolicyStore,
    ids: &[u64],
) -> ServiceResult<usize> {
    validate_ids(ids)?;

    let removed = store.delete_roles(ids).await?;
    for role in &removed {
        policy.delete_role(&role.code).await?;
    }
    tracing::info!(removed = removed.len(), "Roles deleted");
    Ok(removed.len())
}

/// ## Summary
/// The menus whose permission codes are granted directly to the role.
///
/// ## Errors
/// Returns `NotFound` for an unknown role, or a store error.
pub async fn role_permissions(
    store: &dyn AdminStore,
    policy: &PolicyStore,
    id: u64,
) -> ServiceResult<Vec<Menu>> {
    let role = find_role(store, id).await?;
    let codes = policy.permissions(&Subject::role(&role.code)).await;

    Ok(store
        .list_menus(None)
        .await?
        .into_iter()
        .filter(|menu| codes.contains(&menu.code))
        .collect())
}

/// ## Summary
/// Replaces the role's direct grants with the codes of the given menus.
///
/// ## Errors
/// Returns `NotFound` for an unknown role, `ValidationError` if a menu id
/// does not exist, or a store or Casbin error.
#[tracing::instrument(skip(store, policy, menu_ids))]
pub async fn set_role_permissions(
    store: &dyn AdminStore,
    policy: &PolicyStore,
    id: u64,
    menu_ids: &[u64],
) -> ServiceResult<()> {
    let role = find_role(store, id).await?;

    let wanted: BTreeSet<u64> = menu_ids.iter().copied().collect();
    let ids: Vec<u64> = wanted.iter().copied().collect();
    let menus = store.find_menus_by_ids(&ids).await?;
    if menus.len() != wanted.len() {
        let found: BTreeSet<u64> = menus.iter().map(|m| m.id).collect();
        let missing: Vec<String> = wanted
            .difference(&found)
            .map(ToString::to_string)
            .collect();
        return Err(ServiceError::ValidationError(format!(
            "unknown menu ids: {}",
            missing.join(", ")
        )));
    }

    policy
        .set_permissions(&Subject::role(&role.code), menus.into_iter().map(|m| m.code))
        .await?;
    tracing::info!(role_id = id, count = ids.len(), "Role permissions replaced");
    Ok(())
}

async fn find_role(store: &dyn AdminStore, id: u64) -> ServiceResult<Role> {
    store
        .find_role(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("role {id}")))
}
