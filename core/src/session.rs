//! Caller-owned session records and the store seam used to read and mutate
//! them.
//!
//! # Design
//! The library never keeps tokens itself. Every operation either receives a
//! `UserSession` from the caller or fetches one through `SessionStore`, and
//! the OAuth flow writes results back through `SessionStore::update_session`
//! as a `SessionPatch`. A store implementation shared between threads must
//! do its own locking.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, BoxError, Result};

const TOKEN_MASK_PREFIX_LEN: usize = 6;
const TOKEN_MASK_SUFFIX_LEN: usize = 4;

/// Identifies a session in the caller's store.
///
/// `user_ip` is a secondary key for the authorization handshake, when the
/// caller may not have a user id yet. Any opaque string works.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub user_id: Option<String>,
    pub user_ip: Option<String>,
}

impl SessionKey {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            user_ip: None,
        }
    }

    pub fn ip(user_ip: impl Into<String>) -> Self {
        Self {
            user_id: None,
            user_ip: Some(user_ip.into()),
        }
    }
}

/// Everything the client needs to know about one DodoIS user.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Granted scopes; also the scopes requested when authorizing.
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub code_verifier: Option<String>,
    #[serde(default)]
    pub code_challenge: Option<String>,
    #[serde(default)]
    pub access_token_expires_at: Option<DateTime<Utc>>,
}

impl UserSession {
    pub fn with_scopes<S: Into<String>>(scopes: impl IntoIterator<Item = S>) -> Self {
        Self {
            scopes: scopes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub(crate) fn require_access_token(&self) -> Result<&str> {
        self.access_token
            .as_deref()
            .ok_or(ApiError::MissingSessionField("access token"))
    }

    pub(crate) fn require_refresh_token(&self) -> Result<&str> {
        self.refresh_token
            .as_deref()
            .ok_or(ApiError::MissingSessionField("refresh token"))
    }

    pub(crate) fn require_code_verifier(&self) -> Result<&str> {
        self.code_verifier
            .as_deref()
            .ok_or(ApiError::MissingSessionField("PKCE code verifier"))
    }

    /// `true` once a known expiry has passed. Sessions without an expiry are
    /// treated as live.
    pub fn is_access_token_expired(&self, now: DateTime<Utc>) -> bool {
        self.access_token_expires_at
            .is_some_and(|expires_at| now >= expires_at)
    }

    pub fn apply(&mut self, patch: SessionPatch) {
        fn merge<T>(slot: &mut Option<T>, update: Option<Option<T>>) {
            if let Some(value) = update {
                *slot = value;
            }
        }
        merge(&mut self.access_token, patch.access_token);
        merge(&mut self.refresh_token, patch.refresh_token);
        merge(&mut self.code_verifier, patch.code_verifier);
        merge(&mut self.code_challenge, patch.code_challenge);
        merge(&mut self.access_token_expires_at, patch.access_token_expires_at);
        if let Some(scopes) = patch.scopes {
            self.scopes = scopes;
        }
    }
}

impl fmt::Debug for UserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSession")
            .field("access_token", &self.access_token.as_deref().map(mask_token))
            .field("refresh_token", &self.refresh_token.as_deref().map(mask_token))
            .field("scopes", &self.scopes)
            .field("code_verifier", &self.code_verifier.as_deref().map(mask_token))
            .field("code_challenge", &self.code_challenge)
            .field("access_token_expires_at", &self.access_token_expires_at)
            .finish()
    }
}

/// A partial update to a `UserSession`.
///
/// Each field is `None` to keep the stored value, `Some(None)` to clear it,
/// or `Some(Some(v))` to replace it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPatch {
    pub access_token: Option<Option<String>>,
    pub refresh_token: Option<Option<String>>,
    pub scopes: Option<Vec<String>>,
    pub code_verifier: Option<Option<String>>,
    pub code_challenge: Option<Option<String>>,
    pub access_token_expires_at: Option<Option<DateTime<Utc>>>,
}

impl SessionPatch {
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(Some(token.into()));
        self
    }

    pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(Some(token.into()));
        self
    }

    pub fn scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = Some(scopes);
        self
    }

    pub fn pkce(mut self, code_verifier: impl Into<String>, code_challenge: impl Into<String>) -> Self {
        self.code_verifier = Some(Some(code_verifier.into()));
        self.code_challenge = Some(Some(code_challenge.into()));
        self
    }

    pub fn clear_pkce(mut self) -> Self {
        self.code_verifier = Some(None);
        self.code_challenge = Some(None);
        self
    }

    /// Record an expiry `expires_in` seconds after `issued_at`; `None` clears it.
    pub fn expires_in(mut self, issued_at: DateTime<Utc>, expires_in: Option<u64>) -> Self {
        let expires_at = expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .filter(|secs| *secs > 0)
            .map(|secs| issued_at + Duration::seconds(secs));
        self.access_token_expires_at = Some(expires_at);
        self
    }
}

/// Caller-supplied persistence for sessions.
pub trait SessionStore: Send + Sync {
    fn fetch_session(&self, key: &SessionKey) -> std::result::Result<UserSession, BoxError>;

    fn update_session(&self, key: &SessionKey, patch: SessionPatch) -> std::result::Result<(), BoxError>;
}

/// Where an operation gets its session from.
#[derive(Debug, Clone)]
pub enum SessionSource<'a> {
    Key(SessionKey),
    Data(&'a UserSession),
}

impl From<SessionKey> for SessionSource<'_> {
    fn from(key: SessionKey) -> Self {
        SessionSource::Key(key)
    }
}

impl From<&SessionKey> for SessionSource<'_> {
    fn from(key: &SessionKey) -> Self {
        SessionSource::Key(key.clone())
    }
}

impl<'a> From<&'a UserSession> for SessionSource<'a> {
    fn from(session: &'a UserSession) -> Self {
        SessionSource::Data(session)
    }
}

/// Process-local `SessionStore`, keyed by `SessionKey`.
///
/// Updating an unknown key creates the session. Fetching an unknown key
/// fails, matching stores backed by a database row.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionKey, UserSession>>,
}

#[derive(Debug, thiserror::Error)]
#[error("no session stored for user_id={user_id:?} user_ip={user_ip:?}")]
pub struct SessionNotFound {
    pub user_id: Option<String>,
    pub user_ip: Option<String>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: SessionKey, session: UserSession) {
        self.sessions.write().insert(key, session);
    }

    pub fn get(&self, key: &SessionKey) -> Option<UserSession> {
        self.sessions.read().get(key).cloned()
    }
}

impl SessionStore for InMemorySessionStore {
    fn fetch_session(&self, key: &SessionKey) -> std::result::Result<UserSession, BoxError> {
        self.get(key).ok_or_else(|| {
            Box::new(SessionNotFound {
                user_id: key.user_id.clone(),
                user_ip: key.user_ip.clone(),
            }) as BoxError
        })
    }

    fn update_session(&self, key: &SessionKey, patch: SessionPatch) -> std::result::Result<(), BoxError> {
        self.sessions
            .write()
            .entry(key.clone())
            .or_default()
            .apply(patch);
        Ok(())
    }
}

pub(crate) fn mask_token(token: &str) -> String {
    let trimmed = token.trim();
    let len = trimmed.len();
    if len <= TOKEN_MASK_PREFIX_LEN + TOKEN_MASK_SUFFIX_LEN || !trimmed.is_ascii() {
        return "*".repeat(len.min(8));
    }
    let prefix = &trimmed[..TOKEN_MASK_PREFIX_LEN];
    let suffix = &trimmed[len - TOKEN_MASK_SUFFIX_LEN..];
    format!("{prefix}...{suffix}")
}
