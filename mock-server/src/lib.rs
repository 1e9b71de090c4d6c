//! In-process stand-in for the DodoIS identity server and REST APIs.
//!
//! Serves the production path layout from one host: `/connect/*` for OAuth,
//! `/auth/*` for roles, `/dodopizza/ru/*` for the core API and `/franchisee/*`
//! for the marketplace. Tokens are issued by the mock's own PKCE flow (or
//! seeded with `MockState::grant`) and every resource route checks the
//! bearer token and its scopes.

use std::{collections::HashMap, sync::Arc};

use axum::{
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub mod fixtures;
mod oauth;
mod resources;

pub const CLIENT_ID: &str = "mock-client";
pub const CLIENT_SECRET: &str = "mock-secret";
pub const ACCESS_TOKEN_TTL_SECS: u64 = 3600;

/// An authorization code waiting to be exchanged.
#[derive(Clone, Debug)]
pub struct PendingCode {
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub code_challenge: String,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub codes: HashMap<String, PendingCode>,
    /// Live access tokens and the scopes they carry.
    pub access_tokens: HashMap<String, Vec<String>>,
    pub refresh_tokens: HashMap<String, Vec<String>>,
}

impl MockState {
    /// Register `token` as a live access token with `scopes`.
    pub fn grant(&mut self, token: &str, scopes: &[&str]) {
        self.access_tokens
            .insert(token.to_string(), scopes.iter().map(|s| s.to_string()).collect());
    }

    fn issue_tokens(&mut self, scopes: Vec<String>) -> Value {
        let access_token = Uuid::new_v4().simple().to_string();
        let refresh_token = scopes
            .iter()
            .any(|scope| scope == "offline_access")
            .then(|| Uuid::new_v4().simple().to_string());
        let scope = scopes.join(" ");

        self.access_tokens.insert(access_token.clone(), scopes.clone());
        if let Some(refresh_token) = &refresh_token {
            self.refresh_tokens.insert(refresh_token.clone(), scopes);
        }

        let mut body = json!({
            "access_token": access_token,
            "expires_in": ACCESS_TOKEN_TTL_SECS,
            "token_type": "Bearer",
            "scope": scope,
        });
        if let Some(refresh_token) = refresh_token {
            body["refresh_token"] = json!(refresh_token);
        }
        body
    }
}

pub type Db = Arc<RwLock<MockState>>;

pub(crate) type Rejection = (StatusCode, Json<Value>);
pub(crate) type Reply = Result<Json<Value>, Rejection>;

pub(crate) fn reject(status: StatusCode, error: &str, description: impl Into<String>) -> Rejection {
    let description = description.into();
    tracing::warn!(status = status.as_u16(), error, %description, "mock request rejected");
    (
        status,
        Json(json!({ "error": error, "error_description": description })),
    )
}

/// Check the bearer token is live and carries every scope in `required`.
pub(crate) async fn authorize(db: &Db, headers: &HeaderMap, required: &[&str]) -> Result<(), Rejection> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "invalid_token", "missing bearer token"))?;
    let state = db.read().await;
    let scopes = state
        .access_tokens
        .get(token)
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "invalid_token", "unknown access token"))?;
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|scope| !scopes.iter().any(|granted| granted == scope))
        .collect();
    if !missing.is_empty() {
        return Err(reject(
            StatusCode::FORBIDDEN,
            "insufficient_scope",
            format!("missing scopes: {}", missing.join(" ")),
        ));
    }
    Ok(())
}

pub fn app() -> Router {
    app_with_state(Db::default())
}

pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/connect/authorize", get(oauth::authorize))
        .route("/connect/token", post(oauth::token))
        .route("/connect/userinfo", get(oauth::userinfo))
        .route("/auth/roles/list", get(resources::roles_list))
        .route("/auth/roles/units", get(resources::roles_units))
        .route("/dodopizza/ru/accounting/sales", get(resources::sales))
        .route("/dodopizza/ru/staff/shifts", get(resources::staff_shifts))
        .route("/dodopizza/ru/staff/members", get(resources::staff_members))
        .route("/dodopizza/ru/staff/members/shifts", get(resources::members_shifts))
        .route(
            "/dodopizza/ru/organization-structure/legal-entities",
            get(resources::legal_entities),
        )
        .route("/dodopizza/ru/units/shifts", get(resources::unit_shifts))
        .route("/dodopizza/ru/units/stores", get(resources::stores))
        .route("/franchisee/units", get(resources::franchisee_units))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}
