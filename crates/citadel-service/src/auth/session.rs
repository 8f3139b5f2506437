//! Opaque bearer token sessions.
//!
//! A token is 32 random bytes encoded as unpadded URL-safe base64. Only its
//! SHA-256 digest is kept, so the table never holds a usable credential.
//! All state sits behind one `tokio::sync::Mutex`; `refresh` removes the old
//! entry and inserts the new one while holding it, which makes concurrent
//! refreshes of the same token race for a single removal.

use std::collections::HashMap;
use std::sync::Arc;

use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use salvo::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use citadel_core::config::AuthConfig;

use crate::error::{ServiceError, ServiceResult};

const TOKEN_BYTES: usize = 32;
/// Length of an encoded token: `ceil(32 * 4 / 3)` without padding.
const TOKEN_LEN: usize = 43;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: uuid::Uuid,
    pub user_id: u64,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A freshly minted token. This is the only place the clear token exists.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
    pub expire_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// ## Errors
    /// Returns `InvalidConfiguration` if the configured lifetime is not a
    /// positive number of seconds representable as a duration.
    pub fn from_config(config: &AuthConfig) -> ServiceResult<Self> {
        let ttl = Duration::try_seconds(config.token_ttl_seconds)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or_else(|| {
                ServiceError::InvalidConfiguration(format!(
                    "token lifetime of {} seconds is out of range",
                    config.token_ttl_seconds
                ))
            })?;
        Ok(Self::new(ttl))
    }

    /// Creates a session for `user_id` and returns its token.
    ///
    /// ## Errors
    /// Returns `InvalidConfiguration` if the expiry overflows the calendar.
    #[tracing::instrument(skip(self))]
    pub async fn issue(&self, user_id: u64) -> ServiceResult<IssuedToken> {
        let mut sessions = self.sessions.lock().await;
        self.insert_new(&mut sessions, user_id)
    }

    /// ## Summary
    /// Resolves a token to its live session.
    ///
    /// An expired session is removed as a side effect.
    ///
    /// ## Errors
    /// Returns `NotAuthenticated` if the token is malformed, unknown or expired.
    pub async fn validate(&self, token: &str) -> ServiceResult<Session> {
        if !is_well_formed(token) {
            tracing::debug!("Rejected malformed token");
            return Err(ServiceError::NotAuthenticated);
        }

        let key = digest(token);
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get(&key)
            .cloned()
            .ok_or(ServiceError::NotAuthenticated)?;

        if session.is_expired_at(Utc::now()) {
            tracing::debug!(session_id = %session.id, "Session expired");
            sessions.remove(&key);
            return Err(ServiceError::NotAuthenticated);
        }
        Ok(session)
    }

    /// Invalidates a token. Returns `true` if a session was removed; logging
    /// out an unknown or already invalidated token is not an error.
    #[tracing::instrument(skip(self, token))]
    pub async fn logout(&self, token: &str) -> bool {
        if !is_well_formed(token) {
            return false;
        }
        let removed = self.sessions.lock().await.remove(&digest(token));
        if let Some(session) = &removed {
            tracing::debug!(session_id = %session.id, user_id = session.user_id, "Session ended");
        }
        removed.is_some()
    }

    /// ## Summary
    /// Replaces a live token with a new one bound to the same user.
    ///
    /// The old token stops working whether or not this call wins. Of several
    /// concurrent refreshes of one token, exactly one succeeds.
    ///
    /// ## Errors
    /// Returns `NotAuthenticated` if the token is malformed, unknown, already
    /// refreshed or expired.
    #[tracing::instrument(skip(self, token))]
    pub async fn refresh(&self, token: &str) -> ServiceResult<IssuedToken> {
        if !is_well_formed(token) {
            return Err(ServiceError::NotAuthenticated);
        }

        let mut sessions = self.sessions.lock().await;
        let old = sessions
            .remove(&digest(token))
            .ok_or(ServiceError::NotAuthenticated)?;
        if old.is_expired_at(Utc::now()) {
            tracing::debug!(session_id = %old.id, "Refused to refresh expired session");
            return Err(ServiceError::NotAuthenticated);
        }

        let issued = self.insert_new(&mut sessions, old.user_id)?;
        tracing::debug!(previous_session_id = %old.id, "Session refreshed");
        Ok(issued)
    }

    /// Drops every expired session and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::debug!(purged, "Expired sessions purged");
        }
        purged
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    fn insert_new(
        &self,
        sessions: &mut HashMap<String, Session>,
        user_id: u64,
    ) -> ServiceResult<IssuedToken> {
        let issued_at = Utc::now();
        let expires_at = issued_at.checked_add_signed(self.ttl).ok_or_else(|| {
            ServiceError::InvalidConfiguration(format!(
                "token lifetime of {} seconds overflows the expiry time",
                self.ttl.num_seconds()
            ))
        })?;

        let token = generate_token();
        let session = Session {
            id: uuid::Uuid::now_v7(),
            user_id,
            issued_at,
            expires_at,
        };
        let issued = IssuedToken {
            token,
            expires_in: self.ttl.num_seconds(),
            expire_at: session.expires_at,
        };
        sessions.insert(digest(&issued.token), session);
        Ok(issued)
    }
}

fn generate_token() -> String {
    let mut bytes = [0_u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

pub struct SessionStoreHandler {
    pub sessions: Arc<SessionStore>,
}

#[async_trait]
impl salvo::Handler for SessionStoreHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.sessions.clone());
    }
}

/// ## Summary
/// Retrieves the session store from the depot.
///
/// ## Errors
/// Returns an error if the session store is not found in the depot.
pub fn get_sessions_from_depot(depot: &salvo::Depot) -> ServiceResult<Arc<SessionStore>> {
    depot
        .obtain::<Arc<SessionStore>>()
        .cloned()
        .map_err(|_err| ServiceError::InvariantViolation("Session store not found in depot"))
}
