//! Marketplace API sections, served from the API host root.

use std::sync::Arc;

use crate::client::ApiClient;

pub mod franchisee;

pub use self::franchisee::FranchiseeApi;

#[derive(Debug, Clone)]
pub struct MarketplaceApi {
    pub franchisee: FranchiseeApi,
}

impl MarketplaceApi {
    pub fn new(client: Arc<ApiClient>, base_url: &str) -> Self {
        Self {
            franchisee: FranchiseeApi::new(client, base_url),
        }
    }
}
