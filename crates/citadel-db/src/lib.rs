//! Persistence seam for the admin back office.
//!
//! ## Module Organization
//!
//! - `model`: users, roles, menus and their status flags
//! - `store`: the `AdminStore` trait and its in-memory backend
//! - `seeder`: initial data (super-admin account, default menu tree, sample roles)

pub mod error;
pub mod model;
pub mod seeder;
pub mod store;
