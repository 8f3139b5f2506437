//! Authentication and authorization flow.
//!
//! ## Module Organization
//!
//! - `authenticate`: Credential verification and login
//! - `authorize`: Permission checks with the super-admin bypass (`Authorizer`)
//! - `casbin`: Casbin enforcer initialization and the permission model
//! - `depot`: Helpers for reading the authenticated caller from Salvo requests
//! - `password`: Password hashing and verification with Argon2
//! - `policy`: Grant and role assignment store with implicit resolution
//! - `session`: Opaque bearer token issue, validation, logout and refresh
//! - `subject`: Subject types used as Casbin `sub` values

pub mod authenticate;
pub mod authorize;
pub mod casbin;
pub mod depot;
pub mod password;
pub mod policy;
pub mod session;
pub mod subject;

pub use authenticate::{LoginOutcome, authenticate_token, login};
pub use authorize::{Authorizer, AuthzResult, authorizer_from_depot};
pub use depot::{CurrentUser, get_current_user_from_depot, get_token_from_depot, is_authenticated};
pub use policy::{PolicyStore, PolicyStoreHandler, get_policy_store_from_depot};
pub use session::{IssuedToken, Session, SessionStore, SessionStoreHandler, get_sessions_from_depot};
pub use subject::Subject;
