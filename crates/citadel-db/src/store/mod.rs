use async_trait::async_trait;

use crate::error::DbResult;
use crate::model::{Menu, NewMenu, NewRole, NewUser, Role, RoleChangeset, RoleFilter, Status, User};

pub mod memory;

pub use memory::MemoryStore;

/// Storage for the entities the admin API reads and writes.
///
/// Every method may suspend on storage latency; lookups that miss return
/// `Ok(None)` and mutations that target a missing row return `DbError::NotFound`.
#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn find_user(&self, id: u64) -> DbResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> DbResult<Option<User>>;
    /// ## Errors
    /// Returns `Conflict` if the username is taken.
    async fn create_user(&self, user: NewUser) -> DbResult<User>;
    async fn count_users(&self) -> DbResult<usize>;

    /// Roles matching `filter`, ordered by `sort` then id.
    async fn list_roles(&self, filter: &RoleFilter) -> DbResult<Vec<Role>>;
    async fn find_role(&self, id: u64) -> DbResult<Option<Role>>;
    async fn find_role_by_code(&self, code: &str) -> DbResult<Option<Role>>;
    /// ## Errors
    /// Returns `Conflict` if the code is taken.
    async fn create_role(&self, role: NewRole) -> DbResult<Role>;
    /// ## Errors
    /// Returns `NotFound` for an unknown id and `Conflict` if the new code
    /// belongs to another role.
    async fn update_role(&self, id: u64, changes: RoleChangeset) -> DbResult<Role>;
    /// Deletes the given roles and returns the rows that existed.
    async fn delete_roles(&self, ids: &[u64]) -> DbResult<Vec<Role>>;

    /// Menus with the given status (all when `None`), ordered by `sort` then id.
    async fn list_menus(&self, status: Option<Status>) -> DbResult<Vec<Menu>>;
    /// Menus whose id is in `ids`; unknown ids are skipped.
    async fn find_menus_by_ids(&self, ids: &[u64]) -> DbResult<Vec<Menu>>;
    async fn create_menu(&self, menu: NewMenu) -> DbResult<Menu>;
    async fn count_menus(&self) -> DbResult<usize>;
}
