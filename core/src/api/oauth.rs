//! OAuth2 authorization code flow with PKCE against the DodoIS identity
//! server.
//!
//! # Design
//! A session moves through `unauthenticated → challenge issued → code
//! exchanged → authenticated`, then loops through refreshes. Every transition
//! is written back through the caller's `SessionStore`:
//! - `get_auth_url` stores a fresh verifier/challenge pair.
//! - `handle_auth_callback` exchanges the code, stores the tokens, expiry and
//!   granted scopes, and clears the consumed pair.
//! - `refresh_token_pair_post` replaces the token pair and expiry.
//!
//! Token values never reach the logs.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use url::Url;

use crate::client::ApiClient;
use crate::config::DodoIsConfig;
use crate::error::{ApiError, Result};
use crate::http::HttpRequest;
use crate::pkce::generate_pkce_pair;
use crate::session::{SessionKey, SessionPatch, SessionSource, UserSession};
use crate::types::TokenSet;

pub const CODE_CHALLENGE_METHOD: &str = "S256";

#[derive(Clone)]
pub struct OAuthApi {
    client: Arc<ApiClient>,
    base_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    verifier_length: usize,
}

impl fmt::Debug for OAuthApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthApi")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}

impl OAuthApi {
    pub fn new(client: Arc<ApiClient>, config: &DodoIsConfig) -> Self {
        Self {
            client,
            base_url: config.oauth_base_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            verifier_length: config.pkce_verifier_length,
        }
    }

    /// Build the authorization URL the user is sent to.
    ///
    /// The requested scopes are the session's `scopes`. A new PKCE pair is
    /// generated and stored under `key` on every call, so only the most
    /// recently issued URL can complete the flow.
    pub fn get_auth_url(
        &self,
        key: &SessionKey,
        session: Option<&UserSession>,
        redirect_uri: Option<&str>,
    ) -> Result<String> {
        let session = self.client.resolve_session(source(key, session))?;
        let pkce = generate_pkce_pair(self.verifier_length);

        let mut url = Url::parse(&format!("{}/authorize", self.base_url))
            .map_err(|e| ApiError::invalid("oauth_base_url", e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("scope", &session.scopes.join(" "))
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri.unwrap_or(&self.redirect_uri))
            .append_pair("code_challenge", &pkce.code_challenge)
            .append_pair("code_challenge_method", CODE_CHALLENGE_METHOD);

        self.client.update_session(
            key,
            SessionPatch::default().pkce(pkce.code_verifier, pkce.code_challenge),
        )?;
        tracing::info!(user_id = ?key.user_id, user_ip = ?key.user_ip, "issued PKCE challenge");
        Ok(url.into())
    }

    /// Exchange the authorization `code` for tokens using the stored verifier.
    pub fn handle_auth_callback(
        &self,
        code: &str,
        key: &SessionKey,
        session: Option<&UserSession>,
        redirect_uri: Option<&str>,
    ) -> Result<TokenSet> {
        let session = self.client.resolve_session(source(key, session))?;
        let code_verifier = session.require_code_verifier()?;
        let scope = session.scopes.join(" ");

        let request = HttpRequest::post(self.token_url()).form([
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", code_verifier),
            ("scope", scope.as_str()),
            ("redirect_uri", redirect_uri.unwrap_or(&self.redirect_uri)),
        ]);
        let tokens: TokenSet = self.client.fetch_json(&request)?;

        let mut patch = token_patch(&tokens).clear_pkce();
        if let Some(scopes) = tokens.granted_scopes() {
            patch = patch.scopes(scopes);
        }
        self.client.update_session(key, patch)?;
        tracing::info!(
            user_id = ?key.user_id,
            user_ip = ?key.user_ip,
            has_refresh_token = tokens.refresh_token.is_some(),
            "authorization code exchanged"
        );
        Ok(tokens)
    }

    /// Trade the stored refresh token for a new token pair.
    pub fn refresh_token_pair_post(&self, key: &SessionKey, session: Option<&UserSession>) -> Result<TokenSet> {
        let session = self.client.resolve_session(source(key, session))?;
        let refresh_token = session.require_refresh_token()?;

        let request = HttpRequest::post(self.token_url()).form([
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ]);
        let tokens: TokenSet = self.client.fetch_json(&request)?;

        let mut patch = token_patch(&tokens);
        if let Some(scopes) = tokens.granted_scopes() {
            patch = patch.scopes(scopes);
        }
        self.client.update_session(key, patch)?;
        tracing::info!(user_id = ?key.user_id, "token pair refreshed");
        Ok(tokens)
    }

    /// `GET /userinfo`: the OpenID profile of the token's owner.
    pub fn user_profile_get<'s>(&self, session: impl Into<SessionSource<'s>>) -> Result<Value> {
        let session = self.client.resolve_session(session.into())?;
        let request = HttpRequest::get(format!("{}/userinfo", self.base_url))
            .bearer(session.require_access_token()?);
        self.client.fetch_json(&request)
    }

    fn token_url(&self) -> String {
        format!("{}/token", self.base_url)
    }
}

fn source<'s>(key: &SessionKey, session: Option<&'s UserSession>) -> SessionSource<'s> {
    match session {
        Some(session) => SessionSource::Data(session),
        None => SessionSource::Key(key.clone()),
    }
}

/// Access token and expiry always; the refresh token only when issued, so a
/// grant without `offline_access` keeps whatever was stored before.
fn token_patch(tokens: &TokenSet) -> SessionPatch {
    let mut patch = SessionPatch::default()
        .access_token(tokens.access_token.clone())
        .expires_in(Utc::now(), tokens.expires_in);
    if let Some(refresh_token) = &tokens.refresh_token {
        patch = patch.refresh_token(refresh_token.clone());
    }
    patch
}
