//! Units: unit shifts and store details.

use std::sync::Arc;

use serde_json::Value;

use crate::client::ApiClient;
use crate::convert::{clean_full_address, clean_legal_entity_name, ensure_ordered, join_ids, join_values, DateTimeValue, IdValue};
use crate::error::{ApiError, Result};
use crate::http::HttpRequest;
use crate::pagination::PageCursor;
use crate::scopes::{SHARED, UNIT_READ, UNIT_SHIFTS_READ, USER_ROLE_READ};
use crate::session::SessionSource;

pub const UNIT_STATES: [&str; 3] = ["Open", "Close", "TemporaryClosed"];
pub const MAX_UNITS_TAKE: u32 = 100;

/// Filters for `GET /units/shifts`; a shift matches when its start falls in
/// `from..=to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitShiftsQuery {
    pub from: DateTimeValue,
    pub to: DateTimeValue,
    pub units: Vec<IdValue>,
    pub skip: u32,
    pub take: u32,
    pub take_all: bool,
}

impl UnitShiftsQuery {
    pub fn new<I>(from: impl Into<DateTimeValue>, to: impl Into<DateTimeValue>, units: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<IdValue>,
    {
        Self {
            from: from.into(),
            to: to.into(),
            units: units.into_iter().map(Into::into).collect(),
            skip: 0,
            take: MAX_UNITS_TAKE,
            take_all: false,
        }
    }

    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = skip;
        self
    }

    pub fn take(mut self, take: u32) -> Self {
        self.take = take;
        self
    }

    pub fn take_all(mut self) -> Self {
        self.take_all = true;
        self
    }

    fn to_request(&self, base_url: &str, access_token: &str) -> Result<HttpRequest> {
        ensure_ordered("from", &self.from, &self.to)?;
        Ok(HttpRequest::get(format!("{base_url}/units/shifts"))
            .bearer(access_token)
            .query("from", self.from.to_query())
            .query("to", self.to.to_query())
            .query_opt("units", join_ids("units", &self.units)?))
    }
}

/// Filters for `GET /units/stores`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoresQuery {
    pub business_id: String,
    pub country_id: String,
    pub organizations: Vec<String>,
    pub unit_states: Vec<String>,
    pub units: Vec<IdValue>,
    pub skip: u32,
    pub take: u32,
    pub take_all: bool,
}

impl StoresQuery {
    pub fn new(business_id: impl Into<String>, country_id: impl Into<String>) -> Self {
        Self {
            business_id: business_id.into(),
            country_id: country_id.into(),
            organizations: Vec::new(),
            unit_states: Vec::new(),
            units: Vec::new(),
            skip: 0,
            take: MAX_UNITS_TAKE,
            take_all: false,
        }
    }

    pub fn organizations<S: Into<String>>(mut self, organizations: impl IntoIterator<Item = S>) -> Self {
        self.organizations = organizations.into_iter().map(Into::into).collect();
        self
    }

    pub fn unit_states<S: Into<String>>(mut self, unit_states: impl IntoIterator<Item = S>) -> Self {
        self.unit_states = unit_states.into_iter().map(Into::into).collect();
        self
    }

    pub fn units<I>(mut self, units: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<IdValue>,
    {
        self.units = units.into_iter().map(Into::into).collect();
        self
    }

    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = skip;
        self
    }

    pub fn take(mut self, take: u32) -> Self {
        self.take = take;
        self
    }

    pub fn take_all(mut self) -> Self {
        self.take_all = true;
        self
    }

    fn to_request(&self, base_url: &str, access_token: &str) -> Result<HttpRequest> {
        if let Some(state) = self
            .unit_states
            .iter()
            .find(|state| !UNIT_STATES.contains(&state.as_str()))
        {
            return Err(ApiError::invalid(
                "unit_states",
                format!("unknown state `{state}`, expected one of {}", UNIT_STATES.join(", ")),
            ));
        }
        Ok(HttpRequest::get(format!("{base_url}/units/stores"))
            .bearer(access_token)
            .query("businessId", &self.business_id)
            .query("countryId", &self.country_id)
            .query_opt("organizations", join_values(&self.organizations))
            .query_opt("unitStates", join_values(&self.unit_states))
            .query_opt("units", join_ids("units", &self.units)?))
    }
}

#[derive(Debug, Clone)]
pub struct UnitsApi {
    client: Arc<ApiClient>,
    base_url: String,
}

impl UnitsApi {
    pub fn new(client: Arc<ApiClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    /// Unit shifts sorted by start: the `shifts` of one page, or of every
    /// page with `take_all`.
    pub fn shifts_get<'s>(&self, session: impl Into<SessionSource<'s>>, query: &UnitShiftsQuery) -> Result<Vec<Value>> {
        let access_token = self
            .client
            .authorize(session, &[UNIT_READ, UNIT_SHIFTS_READ, USER_ROLE_READ])?;
        let request = query.to_request(&self.base_url, &access_token)?;
        self.client.fetch_pages(
            "shifts",
            cursor(query.skip, query.take, query.take_all),
            query.take_all,
            |cursor| cursor.apply(&request),
        )
    }

    /// Stores with their details. Organization names and addresses come back
    /// cleaned up (see `clean_store`).
    pub fn stores_get<'s>(&self, session: impl Into<SessionSource<'s>>, query: &StoresQuery) -> Result<Vec<Value>> {
        let access_token = self.client.authorize(session, &[SHARED])?;
        let request = query.to_request(&self.base_url, &access_token)?;
        let mut stores = self.client.fetch_pages(
            "stores",
            cursor(query.skip, query.take, query.take_all),
            query.take_all,
            |cursor| cursor.apply(&request),
        )?;
        stores.iter_mut().for_each(clean_store);
        Ok(stores)
    }
}

fn cursor(skip: u32, take: u32, take_all: bool) -> PageCursor {
    if take_all {
        PageCursor::exhaustive(MAX_UNITS_TAKE)
    } else {
        PageCursor::new(skip, take)
    }
}

/// Normalise `organizationName` and `location.fullAddress` in place. Null or
/// missing values are left alone.
pub fn clean_store(store: &mut Value) {
    if let Some(Value::String(name)) = store.get_mut("organizationName") {
        *name = clean_legal_entity_name(name);
    }
    if let Some(Value::String(address)) = store.pointer_mut("/location/fullAddress") {
        *address = clean_full_address(address);
    }
}
