use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Form, Json,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{authorize as check_bearer, reject, Db, PendingCode, Rejection, Reply, CLIENT_ID, CLIENT_SECRET};

#[derive(Debug, Deserialize)]
pub struct AuthorizeParams {
    pub client_id: String,
    pub scope: String,
    pub response_type: String,
    pub redirect_uri: String,
    pub code_challenge: String,
    pub code_challenge_method: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub grant_type: String,
    pub client_id: String,
    pub client_secret: String,
    pub code: Option<String>,
    pub code_verifier: Option<String>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub refresh_token: Option<String>,
}

/// Skips the login page: the user consents immediately and the code is
/// returned as JSON alongside the redirect target.
pub async fn authorize(State(db): State<Db>, Query(params): Query<AuthorizeParams>) -> Reply {
    if params.client_id != CLIENT_ID {
        return Err(reject(StatusCode::BAD_REQUEST, "invalid_client", "unknown client_id"));
    }
    if params.response_type != "code" {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "unsupported_response_type",
            "only the code flow is supported",
        ));
    }
    if params.code_challenge_method != "S256" {
        return Err(reject(StatusCode::BAD_REQUEST, "invalid_request", "code_challenge_method must be S256"));
    }

    let code = Uuid::new_v4().simple().to_string();
    db.write().await.codes.insert(
        code.clone(),
        PendingCode {
            redirect_uri: params.redirect_uri.clone(),
            scopes: params.scope.split_whitespace().map(str::to_string).collect(),
            code_challenge: params.code_challenge,
        },
    );
    tracing::info!(scope = %params.scope, "authorization code issued");
    Ok(Json(json!({ "code": code, "redirect_uri": params.redirect_uri })))
}

pub async fn token(State(db): State<Db>, Form(form): Form<TokenForm>) -> Reply {
    if form.client_id != CLIENT_ID || form.client_secret != CLIENT_SECRET {
        return Err(reject(StatusCode::UNAUTHORIZED, "invalid_client", "bad client credentials"));
    }
    match form.grant_type.as_str() {
        "authorization_code" => exchange_code(&db, form).await,
        "refresh_token" => refresh(&db, form).await,
        other => Err(reject(
            StatusCode::BAD_REQUEST,
            "unsupported_grant_type",
            format!("grant_type `{other}` is not supported"),
        )),
    }
}

async fn exchange_code(db: &Db, form: TokenForm) -> Reply {
    let code = required(form.code, "code")?;
    let verifier = required(form.code_verifier, "code_verifier")?;
    let mut state = db.write().await;
    let pending = state
        .codes
        .remove(&code)
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "invalid_grant", "unknown or used code"))?;
    if s256(&verifier) != pending.code_challenge {
        return Err(reject(StatusCode::BAD_REQUEST, "invalid_grant", "code_verifier does not match"));
    }
    if form.redirect_uri.as_deref() != Some(pending.redirect_uri.as_str()) {
        return Err(reject(StatusCode::BAD_REQUEST, "invalid_grant", "redirect_uri mismatch"));
    }
    // The token request may narrow the authorized scopes but never widen them.
    let scopes = match form.scope {
        Some(scope) => scope
            .split_whitespace()
            .filter(|requested| pending.scopes.iter().any(|granted| granted == requested))
            .map(str::to_string)
            .collect(),
        None => pending.scopes,
    };
    Ok(Json(state.issue_tokens(scopes)))
}

async fn refresh(db: &Db, form: TokenForm) -> Reply {
    let refresh_token = required(form.refresh_token, "refresh_token")?;
    let mut state = db.write().await;
    // Rotation: a refresh token is good for one use.
    let scopes = state
        .refresh_tokens
        .remove(&refresh_token)
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "invalid_grant", "unknown refresh token"))?;
    tracing::info!("refresh token rotated");
    Ok(Json(state.issue_tokens(scopes)))
}

pub async fn userinfo(State(db): State<Db>, headers: HeaderMap) -> Reply {
    check_bearer(&db, &headers, &[]).await?;
    Ok(Json(json!({
        "sub": "a3f1c6d2e4b5470f9c8d7e6f5a4b3c2d",
        "name": "Мария Иванова",
        "email": "manager@dodo.example",
    })))
}

fn required(value: Option<String>, name: &str) -> Result<String, Rejection> {
    value.ok_or_else(|| reject(StatusCode::BAD_REQUEST, "invalid_request", format!("{name} is required")))
}

pub fn s256(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s256_matches_rfc7636_example() {
        assert_eq!(
            s256("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn token_form_optional_fields() {
        let form: TokenForm = serde_json::from_value(json!({
            "grant_type": "refresh_token",
            "client_id": "c",
            "client_secret": "s",
            "refresh_token": "r"
        }))
        .unwrap();
        assert!(form.code.is_none());
        assert_eq!(form.refresh_token.as_deref(), Some("r"));
    }
}
