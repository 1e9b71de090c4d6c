//! Core API sections, served under `{api_base_url}` (brand and country
//! specific, `https://api.dodois.io/dodopizza/ru` by default).

use std::sync::Arc;

use crate::client::ApiClient;

pub mod accounting;
pub mod organization_structure;
pub mod staff;
pub mod units;

pub use self::accounting::{AccountingApi, SalesQuery};
pub use self::organization_structure::{LegalEntitiesQuery, OrganizationStructureApi};
pub use self::staff::{MembersQuery, MembersShiftsQuery, StaffApi, StaffShiftsQuery};
pub use self::units::{StoresQuery, UnitShiftsQuery, UnitsApi};

#[derive(Debug, Clone)]
pub struct CoreApi {
    pub accounting: AccountingApi,
    pub staff: StaffApi,
    pub organization_structure: OrganizationStructureApi,
    pub units: UnitsApi,
}

impl CoreApi {
    pub fn new(client: Arc<ApiClient>, base_url: &str) -> Self {
        Self {
            accounting: AccountingApi::new(client.clone(), base_url),
            staff: StaffApi::new(client.clone(), base_url),
            organization_structure: OrganizationStructureApi::new(client.clone(), base_url),
            units: UnitsApi::new(client, base_url),
        }
    }
}
