//! Permission-filtered views of menus, roles and the caller's profile.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use citadel_db::model::{Menu, Role, RoleFilter, Status, User};
use citadel_db::store::AdminStore;

use crate::auth::policy::PolicyStore;
use crate::auth::subject::Subject;
use crate::error::ServiceResult;

/// Permission code list reported for super-admins.
pub const ALL_PERMISSIONS: &str = "*";

/// A menu with its visible children attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuNode {
    #[serde(flatten)]
    pub menu: Menu,
    pub children: Vec<MenuNode>,
}

/// Profile returned by `getInfo` and `login`.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub user: User,
    /// Role codes reachable from the user.
    pub roles: Vec<String>,
    /// Permission codes the user holds, or `["*"]` for super-admins.
    pub codes: Vec<String>,
}

/// ## Summary
/// The enabled menu tree visible to `user`.
///
/// Super-admins get every enabled menu. Everyone else gets the menus whose
/// code they hold implicitly, plus the ancestors needed to reach them; a
/// subtree with no granted node is dropped entirely.
///
/// ## Errors
/// Returns an error if the store fails.
#[tracing::instrument(skip(store, policy, user), fields(user_id = user.id))]
pub async fn menus_for(
    store: &dyn AdminStore,
    policy: &PolicyStore,
    user: &User,
) -> ServiceResult<Vec<MenuNode>> {
    let menus = store.list_menus(Some(Status::Enable)).await?;

    if user.super_admin {
        return Ok(build_tree(menus, |_| true));
    }

    let granted = policy.implicit_permissions(&Subject::from_user(user)).await;
    tracing::debug!(granted = granted.len(), "Pruning menu tree");
    Ok(build_tree(menus, |menu| granted.contains(&menu.code)))
}

/// ## Summary
/// The enabled roles visible to `user`: all of them for super-admins,
/// otherwise the ones the user holds directly or through other roles.
///
/// ## Errors
/// Returns an error if the store fails.
#[tracing::instrument(skip(store, policy, user), fields(user_id = user.id))]
pub async fn roles_for(
    store: &dyn AdminStore,
    policy: &PolicyStore,
    user: &User,
) -> ServiceResult<Vec<Role>> {
    let enabled = store.list_roles(&RoleFilter::enabled()).await?;
    if user.super_admin {
        return Ok(enabled);
    }

    let held = policy.implicit_roles(&Subject::from_user(user)).await;
    Ok(enabled
        .into_iter()
        .filter(|role| held.contains(&role.code))
        .collect())
}

pub async fn user_info(policy: &PolicyStore, user: &User) -> UserInfo {
    let subject = Subject::from_user(user);
    let roles = policy.implicit_roles(&subject).await.into_iter().collect();
    let codes = if user.super_admin {
        vec![ALL_PERMISSIONS.to_string()]
    } else {
        policy
            .implicit_permissions(&subject)
            .await
            .into_iter()
            .collect()
    };

    UserInfo {
        user: user.clone(),
        roles,
        codes,
    }
}

/// Assembles the forest rooted at `parent_id == 0`, in input order.
///
/// A node survives if `keep` accepts it or any descendant survives. Every
/// menu has exactly one parent, so the walk down from the root visits each
/// menu at most once; rows whose parent chain never reaches the root are
/// left out.
fn build_tree(menus: Vec<Menu>, keep: impl Fn(&Menu) -> bool) -> Vec<MenuNode> {
    let mut children_of: HashMap<u64, Vec<Menu>> = HashMap::new();
    for menu in menus {
        if menu.id != menu.parent_id {
            children_of.entry(menu.parent_id).or_default().push(menu);
        }
    }
    attach(0, &mut children_of, &keep)
}

fn attach(
    parent_id: u64,
    children_of: &mut HashMap<u64, Vec<Menu>>,
    keep: &impl Fn(&Menu) -> bool,
) -> Vec<MenuNode> {
    let Some(children) = children_of.remove(&parent_id) else {
        return Vec::new();
    };

    children
        .into_iter()
        .filter_map(|menu| {
            let children = attach(menu.id, children_of, keep);
            (keep(&menu) || !children.is_empty()).then_some(MenuNode { menu, children })
        })
        .collect()
}

/// Codes of every node in `nodes`, depth first.
#[must_use]
pub fn collect_codes(nodes: &[MenuNode]) -> BTreeSet<String> {
    let mut codes = BTreeSet::new();
    let mut stack: Vec<&MenuNode> = nodes.iter().collect();
    while let Some(node) = stack.pop() {
        codes.insert(node.menu.code.clone());
        stack.extend(node.children.iter());
    }
    codes
}
