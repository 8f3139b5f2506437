//! In-memory implementation of the admin store.
//!
//! Rows live in `BTreeMap`s keyed by id, each guarded by a `tokio::sync::RwLock`.
//! Ids are assigned from per-table counters starting at 1 so that `0` stays
//! free for the "no parent" menu marker. Nothing is durable: state is lost on
//! restart.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::AdminStore;
use crate::error::{DbError, DbResult};
use crate::model::{Menu, NewMenu, NewRole, NewUser, Role, RoleChangeset, RoleFilter, Status, User};

#[derive(Debug)]
struct Table<T> {
    next_id: AtomicU64,
    rows: RwLock<BTreeMap<u64, T>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            rows: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Table<User>,
    roles: Table<Role>,
    menus: Table<Menu>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn find_user(&self, id: u64) -> DbResult<Option<User>> {
        Ok(self.users.rows.read().await.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> DbResult<Option<User>> {
        Ok(self
            .users
            .rows
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    #[tracing::instrument(skip(self, user), fields(username = %user.username))]
    async fn create_user(&self, user: NewUser) -> DbResult<User> {
        let mut rows = self.users.rows.write().await;
        if rows.values().any(|u| u.username == user.username) {
            return Err(DbError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }

        let now = Utc::now();
        let row = User {
            id: self.users.allocate_id(),
            username: user.username,
            nickname: user.nickname,
            password_hash: user.password_hash,
            super_admin: user.super_admin,
            status: user.status,
            created_at: now,
            updated_at: now,
        };
        rows.insert(row.id, row.clone());
        tracing::debug!(user_id = row.id, "User created");
        Ok(row)
    }

    async fn count_users(&self) -> DbResult<usize> {
        Ok(self.users.rows.read().await.len())
    }

    async fn list_roles(&self, filter: &RoleFilter) -> DbResult<Vec<Role>> {
        let mut roles: Vec<Role> = self
            .roles
            .rows
            .read()
            .await
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        roles.sort_by_key(|r| (r.sort, r.id));
        Ok(roles)
    }

    async fn find_role(&self, id: u64) -> DbResult<Option<Role>> {
        Ok(self.roles.rows.read().await.get(&id).cloned())
    }

    async fn find_role_by_code(&self, code: &str) -> DbResult<Option<Role>> {
        Ok(self
            .roles
            .rows
            .read()
            .await
            .values()
            .find(|r| r.code == code)
            .cloned())
    }

    #[tracing::instrument(skip(self, role), fields(code = %role.code))]
    async fn create_role(&self, role: NewRole) -> DbResult<Role> {
        let mut rows = self.roles.rows.write().await;
        if rows.values().any(|r| r.code == role.code) {
            return Err(DbError::Conflict(format!(
                "role code '{}' already exists",
                role.code
            )));
        }

        let now = Utc::now();
        let row = Role {
            id: self.roles.allocate_id(),
            name: role.name,
            code: role.code,
            status: role.status,
            sort: role.sort,
            remark: role.remark,
            created_at: now,
            updated_at: now,
        };
        rows.insert(row.id, row.clone());
        tracing::debug!(role_id = row.id, "Role created");
        Ok(row)
    }

    #[tracing::instrument(skip(self, changes))]
    async fn update_role(&self, id: u64, changes: RoleChangeset) -> DbResult<Role> {
        let mut rows = self.roles.rows.write().await;
        if rows
            .values()
            .any(|r| r.id != id && r.code == changes.code)
        {
            return Err(DbError::Conflict(format!(
                "role code '{}' already exists",
                changes.code
            )));
        }

        let row = rows
            .get_mut(&id)
            .ok_or_else(|| DbError::NotFound(format!("role {id}")))?;
        row.name = changes.name;
        row.code = changes.code;
        row.status = changes.status;
        row.sort = changes.sort;
        row.remark = changes.remark;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_roles(&self, ids: &[u64]) -> DbResult<Vec<Role>> {
        let mut rows = self.roles.rows.write().await;
        let removed: Vec<Role> = ids.iter().filter_map(|id| rows.remove(id)).collect();
        tracing::debug!(removed = removed.len(), "Roles deleted");
        Ok(removed)
    }

    async fn list_menus(&self, status: Option<Status>) -> DbResult<Vec<Menu>> {
        let mut menus: Vec<Menu> = self
            .menus
            .rows
            .read()
            .await
            .values()
            .filter(|m| status.is_none_or(|s| m.status == s))
            .cloned()
            .collect();
        menus.sort_by_key(|m| (m.sort, m.id));
        Ok(menus)
    }

    async fn find_menus_by_ids(&self, ids: &[u64]) -> DbResult<Vec<Menu>> {
        let rows = self.menus.rows.read().await;
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    async fn create_menu(&self, menu: NewMenu) -> DbResult<Menu> {
        let mut rows = self.menus.rows.write().await;
        if menu.parent_id != 0 && !rows.contains_key(&menu.parent_id) {
            return Err(DbError::NotFound(format!("parent menu {}", menu.parent_id)));
        }

        let now = Utc::now();
        let row = Menu {
            id: self.menus.allocate_id(),
            parent_id: menu.parent_id,
            name: menu.name,
            code: menu.code,
            icon: menu.icon,
            route: menu.route,
            component: menu.component,
            redirect: menu.redirect,
            is_hidden: menu.is_hidden,
            menu_type: menu.menu_type,
            status: menu.status,
            sort: menu.sort,
            remark: menu.remark,
            created_at: now,
            updated_at: now,
        };
        rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn count_menus(&self) -> DbResult<usize> {
        Ok(self.menus.rows.read().await.len())
    }
}
