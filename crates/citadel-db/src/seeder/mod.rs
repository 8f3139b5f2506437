pub mod menu;
pub mod role;
pub mod user;

use crate::store::AdminStore;

pub use menu::MenuSeeder;
pub use role::RoleSeeder;
pub use user::AdminUserSeeder;

/// Trait for seeders that populate the store with initial or sample data.
pub trait Seeder {
    /// Seeds the store with data. Seeders skip silently when their table is
    /// already populated.
    ///
    /// ## Errors
    /// Returns an error if the seeding operation fails.
    fn seed(&self, store: &dyn AdminStore) -> impl Future<Output = anyhow::Result<()>> + Send;
}
