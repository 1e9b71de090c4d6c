//! Auth API: the user's roles and the units those roles apply to.

use std::sync::Arc;

use serde_json::Value;

use crate::client::ApiClient;
use crate::error::Result;
use crate::http::HttpRequest;
use crate::scopes::USER_ROLE_READ;
use crate::session::SessionSource;

#[derive(Debug, Clone)]
pub struct AuthApi {
    client: Arc<ApiClient>,
    base_url: String,
}

impl AuthApi {
    pub fn new(client: Arc<ApiClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// `GET /roles/list`: the roles held by the user.
    pub fn roles_list_get<'s>(&self, session: impl Into<SessionSource<'s>>) -> Result<Value> {
        self.get_roles(session.into(), "list")
    }

    /// `GET /roles/units`: units available to the user through their roles.
    pub fn roles_units_get<'s>(&self, session: impl Into<SessionSource<'s>>) -> Result<Value> {
        self.get_roles(session.into(), "units")
    }

    fn get_roles(&self, session: SessionSource<'_>, resource: &str) -> Result<Value> {
        let access_token = self.client.authorize(session, &[USER_ROLE_READ])?;
        let request = HttpRequest::get(format!("{}/roles/{resource}", self.base_url)).bearer(&access_token);
        self.client.fetch_json(&request)
    }
}
