pub mod menu;
pub mod role;
pub mod status;
pub mod user;

pub use menu::{Menu, MenuType, NewMenu};
pub use role::{NewRole, Role, RoleChangeset, RoleFilter};
pub use status::Status;
pub use user::{NewUser, User};
