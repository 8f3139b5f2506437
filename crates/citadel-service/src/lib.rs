pub mod auth;
pub mod error;
pub mod listing;
pub mod role;
