use citadel_core::constants::permission_codes;

use crate::model::NewMenu;
use crate::store::AdminStore;

use super::Seeder;

/// Seeds the default navigation tree. Each role-management route's permission
/// code appears as a button under the "Roles" page so it can be granted
/// through `setRolePermission`.
pub struct MenuSeeder;

impl Seeder for MenuSeeder {
    async fn seed(&self, store: &dyn AdminStore) -> anyhow::Result<()> {
        if store.count_menus().await? > 0 {
            tracing::debug!("Menus already seeded, skipping");
            return Ok(());
        }

        let dashboard = store
            .create_menu(NewMenu::page(0, "Dashboard", "dashboard", "/dashboard", ""))
            .await?;
        store
            .create_menu(NewMenu::page(
                dashboard.id,
                "Workbench",
                "dashboard:workbench",
                "/dashboard/workbench",
                "dashboard/workbench",
            ))
            .await?;

        let mut permission = NewMenu::page(0, "Permission", "permission", "/permission", "");
        permission.sort = 1;
        let permission = store.create_menu(permission).await?;

        store
            .create_menu(NewMenu::page(
                permission.id,
                "Users",
                "permission:user",
                "/permission/user",
                "permission/user",
            ))
            .await?;

        let roles = store
            .create_menu(NewMenu::page(
                permission.id,
                "Roles",
                "permission:role",
                "/permission/role",
                "permission/role",
            ))
            .await?;

        for (name, code) in [
            ("List roles", permission_codes::ROLE_LIST),
            ("Create role", permission_codes::ROLE_CREATE),
            ("Save role", permission_codes::ROLE_SAVE),
            ("Delete role", permission_codes::ROLE_DELETE),
            ("View role permissions", permission_codes::ROLE_GET_PERMISSION),
            ("Set role permissions", permission_codes::ROLE_SET_PERMISSION),
        ] {
            store.create_menu(NewMenu::button(roles.id, name, code)).await?;
        }

        let count = store.count_menus().await?;
        tracing::info!(count, "Seeded default menu tree");
        Ok(())
    }
}
