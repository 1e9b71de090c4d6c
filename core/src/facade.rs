//! `DodoIsApi`: every section wired to one transport and session store.

use std::sync::Arc;

use crate::api::{AuthApi, CoreApi, MarketplaceApi, OAuthApi};
use crate::client::ApiClient;
use crate::config::DodoIsConfig;
use crate::session::SessionStore;
use crate::transport::{Transport, UreqTransport};

#[derive(Debug, Clone)]
pub struct DodoIsApi {
    pub auth: AuthApi,
    pub oauth: OAuthApi,
    pub core: CoreApi,
    pub marketplace: MarketplaceApi,
}

impl DodoIsApi {
    /// Build the API over a `UreqTransport` using the configured timeout.
    pub fn new(config: &DodoIsConfig, sessions: Arc<dyn SessionStore>) -> Self {
        let transport = Arc::new(UreqTransport::new(config.timeout()));
        Self::with_transport(config, transport, sessions)
    }

    pub fn with_transport(
        config: &DodoIsConfig,
        transport: Arc<dyn Transport>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let client = Arc::new(ApiClient::new(transport, sessions));
        tracing::debug!(
            api_base_url = %config.api_base_url,
            oauth_base_url = %config.oauth_base_url,
            "dodois api configured"
        );
        Self {
            auth: AuthApi::new(client.clone(), config.auth_base_url.clone()),
            oauth: OAuthApi::new(client.clone(), config),
            core: CoreApi::new(client.clone(), &config.api_base_url),
            marketplace: MarketplaceApi::new(client, &config.marketplace_base_url),
        }
    }
}
