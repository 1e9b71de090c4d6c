//! Franchisee: the unit networks (businesses) visible to the user.

use std::sync::Arc;

use serde_json::Value;

use crate::client::ApiClient;
use crate::error::Result;
use crate::http::HttpRequest;
use crate::scopes::FRANCHISEE_READ;
use crate::session::SessionSource;

#[derive(Debug, Clone)]
pub struct FranchiseeApi {
    client: Arc<ApiClient>,
    base_url: String,
}

impl FranchiseeApi {
    pub fn new(client: Arc<ApiClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/franchisee", base_url.trim_end_matches('/')),
        }
    }

    /// `GET /franchisee/units`.
    pub fn units_get<'s>(&self, session: impl Into<SessionSource<'s>>) -> Result<Value> {
        let access_token = self.client.authorize(session, &[FRANCHISEE_READ])?;
        let request = HttpRequest::get(format!("{}/units", self.base_url)).bearer(&access_token);
        self.client.fetch_json(&request)
    }
}
