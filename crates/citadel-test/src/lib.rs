//! Citadel admin API - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can use
//! `citadel_test::` paths.

pub mod component {
    pub use citadel_core::{config, constants, error as core_error, response};
    pub use citadel_service::{auth, listing, role};

    pub mod model {
        pub use citadel_db::model::*;
    }

    pub mod store {
        pub use citadel_db::store::*;
    }

    pub mod middleware {
        pub use citadel_app::middleware::*;
    }
}

pub mod app {
    pub use citadel_app::app::*;
    pub use citadel_app::error;
}
