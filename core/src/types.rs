//! DTOs returned by the OAuth server.
//!
//! Resource endpoints are returned as `serde_json::Value`; only the token
//! exchange is decoded into a struct because the flow itself reads it.

use serde::{Deserialize, Serialize};

/// Token endpoint response for both the authorization code and the refresh
/// grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    /// Absent when the grant did not include `offline_access`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Space-separated granted scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl TokenSet {
    pub fn granted_scopes(&self) -> Option<Vec<String>> {
        self.scope
            .as_deref()
            .map(|scope| scope.split_whitespace().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_token_response_parses() {
        let tokens: TokenSet = serde_json::from_str(r#"{"access_token":"a"}"#).unwrap();
        assert_eq!(tokens.access_token, "a");
        assert!(tokens.refresh_token.is_none());
        assert!(tokens.granted_scopes().is_none());
    }

    #[test]
    fn granted_scopes_split_on_whitespace() {
        let tokens: TokenSet = serde_json::from_str(
            r#"{"access_token":"a","refresh_token":"r","expires_in":3600,"token_type":"Bearer","scope":"openid  sales offline_access"}"#,
        )
        .unwrap();
        assert_eq!(
            tokens.granted_scopes().unwrap(),
            vec!["openid", "sales", "offline_access"]
        );
        assert_eq!(tokens.expires_in, Some(3600));
    }
}
