use crate::model::{NewUser, Status};
use crate::store::AdminStore;

use super::Seeder;

/// Creates the super-admin account on an empty user table.
pub struct AdminUserSeeder {
    pub username: String,
    /// Argon2 PHC string; hashing happens before seeding.
    pub password_hash: String,
}

impl AdminUserSeeder {
    #[must_use]
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }
}

impl Seeder for AdminUserSeeder {
    async fn seed(&self, store: &dyn AdminStore) -> anyhow::Result<()> {
        if store.count_users().await? > 0 {
            tracing::debug!("Users already seeded, skipping");
            return Ok(());
        }

        let user = store
            .create_user(NewUser {
                username: self.username.clone(),
                nickname: "Super Administrator".to_string(),
                password_hash: self.password_hash.clone(),
                super_admin: true,
                status: Status::Enable,
            })
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "Seeded super-admin account");
        Ok(())
    }
}
