//! Staff: shifts by unit, the member list, and shifts by member.

use std::sync::Arc;

use serde_json::Value;

use crate::client::ApiClient;
use crate::convert::{ensure_date_range, ensure_ordered, join_ids, join_values, DateTimeValue, DateValue, IdValue};
use crate::error::{ApiError, Result};
use crate::http::HttpRequest;
use crate::pagination::PageCursor;
use crate::scopes::{STAFF_MEMBERS_READ, STAFF_SHIFTS_READ, USER_ROLE_READ};
use crate::session::SessionSource;

pub const STAFF_TYPES: [&str; 5] = ["Operator", "KitchenMember", "Courier", "Cashier", "PersonalManager"];
pub const STAFF_STATUSES: [&str; 3] = ["Dismissed", "Suspended", "Active"];

pub const DEFAULT_SHIFTS_TAKE: u32 = 100;
pub const MAX_MEMBERS_TAKE: u32 = 1000;

const SHIFTS_SCOPES: [&str; 2] = [STAFF_SHIFTS_READ, USER_ROLE_READ];
const MEMBERS_SCOPES: [&str; 2] = [STAFF_MEMBERS_READ, USER_ROLE_READ];

/// Filters for `GET /staff/shifts`. Shifts are selected by their start time
/// and returned whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffShiftsQuery {
    pub clock_in_from: DateTimeValue,
    pub clock_in_to: DateTimeValue,
    pub units: Vec<IdValue>,
    pub staff_type: Option<String>,
    pub skip: u32,
    pub take: u32,
}

impl StaffShiftsQuery {
    pub fn new<I>(clock_in_from: impl Into<DateTimeValue>, clock_in_to: impl Into<DateTimeValue>, units: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<IdValue>,
    {
        Self {
            clock_in_from: clock_in_from.into(),
            clock_in_to: clock_in_to.into(),
            units: units.into_iter().map(Into::into).collect(),
            staff_type: None,
            skip: 0,
            take: DEFAULT_SHIFTS_TAKE,
        }
    }

    pub fn staff_type(mut self, staff_type: impl Into<String>) -> Self {
        self.staff_type = Some(staff_type.into());
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

    fn to_request(&self, base_url: &str, access_token: &str) -> Result<HttpRequest> {
        ensure_ordered("clock_in_from", &self.clock_in_from, &self.clock_in_to)?;
        Ok(HttpRequest::get(format!("{base_url}/staff/shifts"))
            .bearer(access_token)
            .query("clockInFrom", self.clock_in_from.to_query())
            .query("clockInTo", self.clock_in_to.to_query())
            .query_opt("units", join_ids("units", &self.units)?)
            .query_opt("staffTypeName", self.staff_type.as_deref()))
    }
}

/// Filters for `GET /staff/members`. Every filter is optional; without
/// `units` the vendor returns members of every unit the user can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembersQuery {
    pub dismissed_from: Option<DateValue>,
    pub dismissed_to: Option<DateValue>,
    pub hired_from: Option<DateValue>,
    pub hired_to: Option<DateValue>,
    pub last_modified_from: Option<DateValue>,
    pub last_modified_to: Option<DateValue>,
    pub staff_type: Option<String>,
    pub statuses: Vec<String>,
    pub units: Vec<IdValue>,
    pub skip: u32,
    pub take: u32,
    /// Ignore `skip`/`take` and fetch every page.
    pub take_all: bool,
}

impl Default for MembersQuery {
    fn default() -> Self {
        Self {
            dismissed_from: None,
            dismissed_to: None,
            hired_from: None,
            hired_to: None,
            last_modified_from: None,
            last_modified_to: None,
            staff_type: None,
            statuses: Vec::new(),
            units: Vec::new(),
            skip: 0,
            take: MAX_MEMBERS_TAKE,
            take_all: false,
        }
    }
}

impl MembersQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dismissed(mut self, from: Option<DateValue>, to: Option<DateValue>) -> Self {
        self.dismissed_from = from;
        self.dismissed_to = to;
        self
    }

    pub fn hired(mut self, from: Option<DateValue>, to: Option<DateValue>) -> Self {
        self.hired_from = from;
        self.hired_to = to;
        self
    }

    pub fn last_modified(mut self, from: Option<DateValue>, to: Option<DateValue>) -> Self {
        self.last_modified_from = from;
        self.last_modified_to = to;
        self
    }

    pub fn staff_type(mut self, staff_type: impl Into<String>) -> Self {
        self.staff_type = Some(staff_type.into());
        self
    }

    pub fn statuses<S: Into<String>>(mut self, statuses: impl IntoIterator<Item = S>) -> Self {
        self.statuses = statuses.into_iter().map(Into::into).collect();
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

    fn cursor(&self) -> PageCursor {
        if self.take_all {
            PageCursor::exhaustive(MAX_MEMBERS_TAKE)
        } else {
            PageCursor::new(self.skip, self.take)
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(staff_type) = &self.staff_type {
            if !STAFF_TYPES.iter().any(|known| known.eq_ignore_ascii_case(staff_type)) {
                return Err(ApiError::invalid(
                    "staff_type",
                    format!("must be one of {}", STAFF_TYPES.join(", ")),
                ));
            }
        }
        if let Some(status) = self
            .statuses
            .iter()
            .find(|status| !STAFF_STATUSES.iter().any(|known| known.eq_ignore_ascii_case(status)))
        {
            return Err(ApiError::invalid(
                "statuses",
                format!("unknown status `{status}`, expected one of {}", STAFF_STATUSES.join(", ")),
            ));
        }
        if !self.take_all && !(1..=MAX_MEMBERS_TAKE).contains(&self.take) {
            return Err(ApiError::invalid(
                "take",
                format!("must be between 1 and {MAX_MEMBERS_TAKE}"),
            ));
        }
        ensure_date_range("dismissed_from", self.dismissed_from.as_ref(), self.dismissed_to.as_ref())?;
        ensure_date_range("hired_from", self.hired_from.as_ref(), self.hired_to.as_ref())?;
        ensure_date_range(
            "last_modified_from",
            self.last_modified_from.as_ref(),
            self.last_modified_to.as_ref(),
        )
    }

    fn to_request(&self, base_url: &str, access_token: &str) -> Result<HttpRequest> {
        self.validate()?;
        Ok(HttpRequest::get(format!("{base_url}/staff/members"))
            .bearer(access_token)
            .query_opt("dismissedFrom", self.dismissed_from.as_ref().map(DateValue::to_query))
            .query_opt("dismissedTo", self.dismissed_to.as_ref().map(DateValue::to_query))
            .query_opt("hiredFrom", self.hired_from.as_ref().map(DateValue::to_query))
            .query_opt("hiredTo", self.hired_to.as_ref().map(DateValue::to_query))
            .query_opt("lastModifiedFrom", self.last_modified_from.as_ref().map(DateValue::to_query))
            .query_opt("lastModifiedTo", self.last_modified_to.as_ref().map(DateValue::to_query))
            .query_opt("staffType", self.staff_type.as_deref())
            .query_opt("statuses", join_values(&self.statuses))
            .query_opt("units", join_ids("units", &self.units)?))
    }
}

/// Filters for `GET /staff/members/shifts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembersShiftsQuery {
    pub clock_in_from: DateTimeValue,
    pub clock_in_to: DateTimeValue,
    pub staff_ids: Vec<IdValue>,
    pub skip: u32,
    pub take: u32,
}

impl MembersShiftsQuery {
    pub fn new<I>(clock_in_from: impl Into<DateTimeValue>, clock_in_to: impl Into<DateTimeValue>, staff_ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<IdValue>,
    {
        Self {
            clock_in_from: clock_in_from.into(),
            clock_in_to: clock_in_to.into(),
            staff_ids: staff_ids.into_iter().map(Into::into).collect(),
            skip: 0,
            take: DEFAULT_SHIFTS_TAKE,
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

    fn to_request(&self, base_url: &str, access_token: &str) -> Result<HttpRequest> {
        ensure_ordered("clock_in_from", &self.clock_in_from, &self.clock_in_to)?;
        Ok(HttpRequest::get(format!("{base_url}/staff/members/shifts"))
            .bearer(access_token)
            .query("clockInFrom", self.clock_in_from.to_query())
            .query("clockInTo", self.clock_in_to.to_query())
            .query_opt("staffIds", join_ids("staff_ids", &self.staff_ids)?))
    }
}

#[derive(Debug, Clone)]
pub struct StaffApi {
    client: Arc<ApiClient>,
    base_url: String,
}

impl StaffApi {
    pub fn new(client: Arc<ApiClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    /// One page of staff shifts for the given units.
    pub fn shifts_get<'s>(&self, session: impl Into<SessionSource<'s>>, query: &StaffShiftsQuery) -> Result<Value> {
        let access_token = self.client.authorize(session, &SHIFTS_SCOPES)?;
        let request = query.to_request(&self.base_url, &access_token)?;
        self.client
            .fetch_json(&PageCursor::new(query.skip, query.take).apply(&request))
    }

    /// Staff members sorted by hire date. Returns the `members` of one page,
    /// or of every page when `take_all` is set.
    pub fn members_get<'s>(&self, session: impl Into<SessionSource<'s>>, query: &MembersQuery) -> Result<Vec<Value>> {
        let access_token = self.client.authorize(session, &MEMBERS_SCOPES)?;
        let request = query.to_request(&self.base_url, &access_token)?;
        self.client
            .fetch_pages("members", query.cursor(), query.take_all, |cursor| cursor.apply(&request))
    }

    /// One page of shifts for specific staff members.
    pub fn members_shifts_get<'s>(
        &self,
        session: impl Into<SessionSource<'s>>,
        query: &MembersShiftsQuery,
    ) -> Result<Value> {
        let access_token = self.client.authorize(session, &SHIFTS_SCOPES)?;
        let request = query.to_request(&self.base_url, &access_token)?;
        self.client
            .fetch_json(&PageCursor::new(query.skip, query.take).apply(&request))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::session::{InMemorySessionStore, SessionKey, UserSession};
    use crate::testing::RecordingTransport;

    const UNIT: &str = "0a1b2c3d-4e5f-6071-8293-a4b5c6d7e8f9";

    fn api(transport: &Arc<RecordingTransport>) -> StaffApi {
        let client = ApiClient::new(transport.clone(), Arc::new(InMemorySessionStore::new()));
        StaffApi::new(Arc::new(client), "https://api.dodois.io/dodopizza/ru")
    }

    fn session() -> UserSession {
        UserSession::with_scopes(["staffshifts:read", "staffmembers:read", "user.role:read"]).with_access_token("tok")
    }

    fn date(raw: &str) -> Option<DateValue> {
        Some(DateValue::from(raw))
    }

    #[test]
    fn members_default_is_a_valid_query() {
        let query = MembersQuery::default();
        assert_eq!(query.take, MAX_MEMBERS_TAKE);
        assert!(query.validate().is_ok());
        assert_eq!(query, MembersQuery::new());
    }

    #[test]
    fn shifts_get_sends_clock_in_window() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"shifts": [], "isEndOfListReached": true}));
        let from = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap().and_hms_opt(11, 0, 0).unwrap();
        let to = NaiveDate::from_ymd_opt(2022, 1, 2).unwrap();
        let query = StaffShiftsQuery::new(from, to, [UNIT]).staff_type("Courier").take(50);

        api(&transport).shifts_get(&session(), &query).unwrap();

        let request = transport.last_request();
        assert_eq!(request.url, "https://api.dodois.io/dodopizza/ru/staff/shifts");
        assert_eq!(request.query_value("clockInFrom"), Some("2022-01-01T11:00:00"));
        assert_eq!(request.query_value("clockInTo"), Some("2022-01-02"));
        assert_eq!(request.query_value("units"), Some("0a1b2c3d4e5f60718293a4b5c6d7e8f9"));
        assert_eq!(request.query_value("staffTypeName"), Some("Courier"));
        assert_eq!(request.query_value("take"), Some("50"));
    }

    #[test]
    fn shifts_window_must_be_ordered() {
        let transport = Arc::new(RecordingTransport::new());
        let query = StaffShiftsQuery::new("2022-01-02T00:00:00", "2022-01-01", [UNIT]);

        let err = api(&transport).shifts_get(&session(), &query).unwrap_err();

        assert!(matches!(err, ApiError::InvalidArgument { name: "clock_in_from", .. }));
    }

    #[test]
    fn members_take_all_pages_with_max_take() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"members": [{"id": "a"}], "isEndOfListReached": false}));
        transport.push_json(200, json!({"members": [{"id": "b"}], "isEndOfListReached": true}));
        let query = MembersQuery::new().statuses(["Active"]).skip(5).take(10).take_all();

        let members = api(&transport).members_get(&session(), &query).unwrap();

        assert_eq!(members, vec![json!({"id": "a"}), json!({"id": "b"})]);
        let requests = transport.requests();
        assert_eq!(requests[0].query_value("skip"), Some("0"));
        assert_eq!(requests[1].query_value("skip"), Some("1000"));
        assert!(requests.iter().all(|r| r.query_value("take") == Some("1000")));
        assert_eq!(requests[0].query_value("statuses"), Some("Active"));
    }

    #[test]
    fn members_single_page_keeps_cursor() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"members": [{"id": "a"}], "isEndOfListReached": false}));
        let query = MembersQuery::new()
            .hired(date("2023-01-01"), date("2023-12-31"))
            .staff_type("kitchenmember")
            .units([UNIT])
            .skip(20)
            .take(10);

        let members = api(&transport).members_get(&session(), &query).unwrap();

        assert_eq!(members.len(), 1);
        let request = transport.last_request();
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(request.query_value("hiredFrom"), Some("2023-01-01"));
        assert_eq!(request.query_value("hiredTo"), Some("2023-12-31"));
        assert_eq!(request.query_value("staffType"), Some("kitchenmember"));
        assert_eq!(request.query_value("skip"), Some("20"));
        assert_eq!(request.query_value("dismissedFrom"), None);
    }

    #[test]
    fn members_rejects_unknown_staff_type_and_status() {
        let transport = Arc::new(RecordingTransport::new());
        let err = api(&transport)
            .members_get(&session(), &MembersQuery::new().staff_type("Pilot"))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument { name: "staff_type", .. }));

        let err = api(&transport)
            .members_get(&session(), &MembersQuery::new().statuses(["active", "Retired"]))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument { name: "statuses", .. }));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn members_take_is_bounded() {
        let transport = Arc::new(RecordingTransport::new());
        for take in [0, 1001] {
            let err = api(&transport)
                .members_get(&session(), &MembersQuery::new().take(take))
                .unwrap_err();
            assert!(matches!(err, ApiError::InvalidArgument { name: "take", .. }));
        }
    }

    #[test]
    fn members_date_filters_must_be_ordered() {
        let transport = Arc::new(RecordingTransport::new());
        let query = MembersQuery::new().dismissed(date("2024-02-01"), date("2024-01-01"));

        let err = api(&transport).members_get(&session(), &query).unwrap_err();

        assert!(matches!(err, ApiError::InvalidArgument { name: "dismissed_from", .. }));
    }

    #[test]
    fn members_requires_members_scope() {
        let transport = Arc::new(RecordingTransport::new());
        let session = UserSession::with_scopes(["staffshifts:read", "user.role:read"]).with_access_token("tok");

        let err = api(&transport).members_get(&session, &MembersQuery::new()).unwrap_err();

        assert!(matches!(err, ApiError::MissingScopes { ref missing } if missing == &["staffmembers:read"]));
    }

    #[test]
    fn members_shifts_uses_staff_ids_parameter() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"shifts": [], "isEndOfListReached": true}));
        let query = MembersShiftsQuery::new("2022-01-01T00:00:00", "2022-01-08T00:00:00", [UNIT, "ffffffffffffffffffffffffffffffff"]);

        api(&transport).members_shifts_get(&session(), &query).unwrap();

        let request = transport.last_request();
        assert_eq!(request.url, "https://api.dodois.io/dodopizza/ru/staff/members/shifts");
        assert_eq!(
            request.query_value("staffIds"),
            Some("0a1b2c3d4e5f60718293a4b5c6d7e8f9,ffffffffffffffffffffffffffffffff")
        );
        assert_eq!(request.query_value("staff_ids"), None);
        assert_eq!(request.query_value("to"), None);
    }

    #[test]
    fn session_is_fetched_from_store_by_key() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"members": [], "isEndOfListReached": true}));
        let store = Arc::new(InMemorySessionStore::new());
        let key = SessionKey::user("manager-1");
        store.insert(key.clone(), session());
        let client = ApiClient::new(transport.clone(), store);
        let api = StaffApi::new(Arc::new(client), "https://api.dodois.io/dodopizza/ru");

        api.members_get(&key, &MembersQuery::new()).unwrap();

        assert_eq!(transport.last_request().header_value("authorization"), Some("Bearer tok"));
    }
}
