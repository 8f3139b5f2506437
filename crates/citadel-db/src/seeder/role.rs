use crate::model::{NewRole, RoleFilter, Status};
use crate::store::AdminStore;

use super::Seeder;

pub struct RoleSeeder {
    pub roles: Vec<NewRole>,
}

impl RoleSeeder {
    #[must_use]
    pub fn new(roles: Vec<NewRole>) -> Self {
        Self { roles }
    }

    /// Creates a seeder with the sample roles shipped with a fresh install.
    #[must_use]
    pub fn sample() -> Self {
        let role = |name: &str, code: &str, sort: i32, remark: &str| NewRole {
            name: name.to_string(),
            code: code.to_string(),
            status: Status::Enable,
            sort,
            remark: remark.to_string(),
        };

        Self {
            roles: vec![
                role("Administrator", "admin", 1, "Manages users and roles"),
                role("Auditor", "auditor", 2, "Read-only access to role listings"),
            ],
        }
    }
}

impl Seeder for RoleSeeder {
    async fn seed(&self, store: &dyn AdminStore) -> anyhow::Result<()> {
        if !store.list_roles(&RoleFilter::default()).await?.is_empty() {
            tracing::debug!("Roles already seeded, skipping");
            return Ok(());
        }

        for role in &self.roles {
            let created = store.create_role(role.clone()).await?;
            tracing::debug!(role_id = created.id, code = %created.code, "Seeded role");
        }

        Ok(())
    }
}
