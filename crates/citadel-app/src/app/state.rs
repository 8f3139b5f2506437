//! Shared application state and the router built over it.

use std::sync::Arc;

use anyhow::Context;
use salvo::{Router, Service};

use crate::app::api;
use crate::db_handler::StoreHandler;
use citadel_core::config::Settings;
use citadel_core::constants::permission_codes;
use citadel_db::seeder::{AdminUserSeeder, MenuSeeder, RoleSeeder, Seeder};
use citadel_db::store::{AdminStore, MemoryStore};
use citadel_service::auth::password::hash_password;
use citadel_service::auth::{
    PolicyStore, PolicyStoreHandler, SessionStore, SessionStoreHandler, Subject,
};

/// Grants given to the sample `auditor` role on a demo install.
const AUDITOR_CODES: [&str; 4] = [
    "permission",
    "permission:role",
    permission_codes::ROLE_LIST,
    permission_codes::ROLE_GET_PERMISSION,
];

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn AdminStore>,
    pub policy: Arc<PolicyStore>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    #[must_use]
    pub fn new(
        settings: Settings,
        store: Arc<dyn AdminStore>,
        policy: PolicyStore,
        sessions: SessionStore,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            store,
            policy: Arc::new(policy),
            sessions: Arc::new(sessions),
        }
    }

    /// ## Summary
    /// Builds the state for a fresh process: an in-memory store holding the
    /// super-admin account (and the demo menus and roles when enabled), and a
    /// policy store loaded from `auth.policy_file` if one is configured.
    ///
    /// ## Errors
    /// Returns an error if seeding fails, the policy file cannot be read, or
    /// one of its lines is malformed.
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let store: Arc<dyn AdminStore> = Arc::new(MemoryStore::new());

        let password_hash = hash_password(&settings.seed.admin_password)?;
        AdminUserSeeder::new(settings.seed.admin_username.clone(), password_hash)
            .seed(store.as_ref())
            .await?;

        let policy = PolicyStore::in_memory(settings.auth.max_role_depth).await?;

        if settings.seed.demo_data {
            MenuSeeder.seed(store.as_ref()).await?;
            RoleSeeder::sample().seed(store.as_ref()).await?;
            seed_demo_policy(store.as_ref(), &policy).await?;
        }

        if let Some(path) = &settings.auth.policy_file {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading policy file {path}"))?;
            let loaded = policy.load_policy_text(&text).await?;
            tracing::info!(path = %path, rules = loaded, "Policy file loaded");
        }

        let sessions = SessionStore::from_config(&settings.auth)?;
        Ok(Self::new(settings, store, policy, sessions))
    }

    /// Router with every shared component injected ahead of the route table.
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .hoop(StoreHandler {
                store: self.store.clone(),
            })
            .hoop(PolicyStoreHandler {
                policy: self.policy.clone(),
            })
            .hoop(SessionStoreHandler {
                sessions: self.sessions.clone(),
            })
            .push(api::routes())
    }

    #[must_use]
    pub fn service(&self) -> Service {
        Service::new(self.router())
    }
}

/// The sample `admin` role gets every menu code; `auditor` gets read access
/// to role management.
async fn seed_demo_policy(store: &dyn AdminStore, policy: &PolicyStore) -> anyhow::Result<()> {
    let admin = Subject::role("admin");
    if store.find_role_by_code("admin").await?.is_some()
        && policy.permissions(&admin).await.is_empty()
    {
        let codes = store.list_menus(None).await?.into_iter().map(|m| m.code);
        policy.set_permissions(&admin, codes).await?;
    }

    let auditor = Subject::role("auditor");
    if store.find_role_by_code("auditor").await?.is_some()
        && policy.permissions(&auditor).await.is_empty()
    {
        policy.set_permissions(&auditor, AUDITOR_CODES).await?;
    }

    tracing::debug!("Demo policy seeded");
    Ok(())
}
