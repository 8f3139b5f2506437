pub mod passport;
pub mod permission;
pub mod role;
