//! Shared configuration, route constants, error types and the response
//! envelope used across the Citadel crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod response;
