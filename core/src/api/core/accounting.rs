//! Accounting: sales.

use std::sync::Arc;

use chrono::Duration;
use serde_json::Value;

use crate::client::ApiClient;
use crate::convert::{ensure_ordered, join_ids, DateTimeValue, IdValue};
use crate::error::{ApiError, Result};
use crate::http::HttpRequest;
use crate::pagination::PageCursor;
use crate::scopes::{SALES, USER_ROLE_READ};
use crate::session::SessionSource;

pub const ORDER_SOURCES: [&str; 7] = [
    "CallCenter",
    "Website",
    "Dine-in",
    "MobileApp",
    "Manager",
    "Aggregator",
    "Kiosk",
];
pub const SALES_CHANNELS: [&str; 3] = ["Dine-in", "Takeaway", "Delivery"];

/// Longest period a single sales query may cover.
pub const MAX_SALES_PERIOD_DAYS: i64 = 31;
pub const DEFAULT_SALES_TAKE: u32 = 100;

const REQUIRED_SCOPES: [&str; 2] = [SALES, USER_ROLE_READ];

/// Filters for `GET /accounting/sales`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesQuery {
    pub from: DateTimeValue,
    pub to: DateTimeValue,
    pub units: Vec<IdValue>,
    pub order_source: Option<String>,
    pub sales_channel: Option<String>,
    pub skip: u32,
    pub take: u32,
}

impl SalesQuery {
    pub fn new<I>(from: impl Into<DateTimeValue>, to: impl Into<DateTimeValue>, units: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<IdValue>,
    {
        Self {
            from: from.into(),
            to: to.into(),
            units: units.into_iter().map(Into::into).collect(),
            order_source: None,
            sales_channel: None,
            skip: 0,
            take: DEFAULT_SALES_TAKE,
        }
    }

    pub fn order_source(mut self, order_source: impl Into<String>) -> Self {
        self.order_source = Some(order_source.into());
        self
    }

    pub fn sales_channel(mut self, sales_channel: impl Into<String>) -> Self {
        self.sales_channel = Some(sales_channel.into());
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

    fn validate(&self) -> Result<()> {
        if self.units.is_empty() {
            return Err(ApiError::invalid("units", "at least one unit is required"));
        }
        ensure_ordered("from", &self.from, &self.to)?;
        if let (Some(from), Some(to)) = (self.from.as_naive(), self.to.as_naive()) {
            if to - from > Duration::days(MAX_SALES_PERIOD_DAYS) {
                return Err(ApiError::invalid(
                    "to",
                    format!("period must not exceed {MAX_SALES_PERIOD_DAYS} days"),
                ));
            }
        }
        if let Some(order_source) = &self.order_source {
            if !ORDER_SOURCES.contains(&order_source.as_str()) {
                return Err(ApiError::invalid(
                    "order_source",
                    format!("must be one of {}", ORDER_SOURCES.join(", ")),
                ));
            }
        }
        if let Some(sales_channel) = &self.sales_channel {
            if !SALES_CHANNELS.contains(&sales_channel.as_str()) {
                return Err(ApiError::invalid(
                    "sales_channel",
                    format!("must be one of {}", SALES_CHANNELS.join(", ")),
                ));
            }
        }
        Ok(())
    }

    fn to_request(&self, base_url: &str, access_token: &str) -> Result<HttpRequest> {
        self.validate()?;
        Ok(HttpRequest::get(format!("{base_url}/accounting/sales"))
            .bearer(access_token)
            .query("from", self.from.to_query())
            .query("to", self.to.to_query())
            .query_opt("units", join_ids("units", &self.units)?)
            .query_opt("orderSource", self.order_source.as_deref())
            .query_opt("salesChannel", self.sales_channel.as_deref()))
    }
}

#[derive(Debug, Clone)]
pub struct AccountingApi {
    client: Arc<ApiClient>,
    base_url: String,
}

impl AccountingApi {
    pub fn new(client: Arc<ApiClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    /// One page of sales for the period, sorted by sale date and id. The
    /// returned body holds `sales` and `isEndOfListReached`.
    pub fn sales_get<'s>(&self, session: impl Into<SessionSource<'s>>, query: &SalesQuery) -> Result<Value> {
        let access_token = self.client.authorize(session, &REQUIRED_SCOPES)?;
        let request = query.to_request(&self.base_url, &access_token)?;
        self.client
            .fetch_json(&PageCursor::new(query.skip, query.take).apply(&request))
    }

    /// Every sale for the period, paging from the first record with the
    /// query's `take` until the end of the list.
    pub fn sales_get_all<'s>(
        &self,
        session: impl Into<SessionSource<'s>>,
        query: &SalesQuery,
    ) -> Result<Vec<Value>> {
        let access_token = self.client.authorize(session, &REQUIRED_SCOPES)?;
        let request = query.to_request(&self.base_url, &access_token)?;
        self.client
            .fetch_pages("sales", PageCursor::new(0, query.take), true, |cursor| cursor.apply(&request))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::session::{InMemorySessionStore, UserSession};
    use crate::testing::RecordingTransport;

    const UNIT: &str = "6f1e3b2a-9c4d-4e5f-8a7b-1c2d3e4f5a6b";

    fn api(transport: &Arc<RecordingTransport>) -> AccountingApi {
        let client = ApiClient::new(transport.clone(), Arc::new(InMemorySessionStore::new()));
        AccountingApi::new(Arc::new(client), "https://api.dodois.io/dodopizza/ru")
    }

    fn session() -> UserSession {
        UserSession::with_scopes(["sales", "user.role:read"]).with_access_token("tok")
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn sales_get_sends_normalised_query() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"sales": [{"id": "s1"}], "isEndOfListReached": true}));
        let from = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let query = SalesQuery::new(from, "2024-05-10T00:00:00", [IdValue::from(UNIT), Uuid::nil().into()])
            .sales_channel("Delivery");

        let body = api(&transport).sales_get(&session(), &query).unwrap();

        assert_eq!(body["sales"][0]["id"], "s1");
        let request = transport.last_request();
        assert_eq!(request.url, "https://api.dodois.io/dodopizza/ru/accounting/sales");
        assert_eq!(request.query_value("from"), Some("2024-05-01T09:30:00"));
        assert_eq!(request.query_value("to"), Some("2024-05-10T00:00:00"));
        assert_eq!(
            request.query_value("units"),
            Some("6f1e3b2a9c4d4e5f8a7b1c2d3e4f5a6b,00000000000000000000000000000000")
        );
        assert_eq!(request.query_value("salesChannel"), Some("Delivery"));
        assert_eq!(request.query_value("orderSource"), None);
        assert_eq!(request.query_value("skip"), Some("0"));
        assert_eq!(request.query_value("take"), Some("100"));
        assert_eq!(request.header_value("authorization"), Some("Bearer tok"));
    }

    #[test]
    fn sales_get_all_accumulates_pages() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"sales": [{"id": 1}, {"id": 2}], "isEndOfListReached": false}));
        transport.push_json(200, json!({"sales": [{"id": 3}], "isEndOfListReached": true}));
        let query = SalesQuery::new(day(1), day(2), [UNIT]).skip(40).take(2);

        let sales = api(&transport).sales_get_all(&session(), &query).unwrap();

        assert_eq!(sales.len(), 3);
        let skips: Vec<String> = transport
            .requests()
            .iter()
            .map(|r| r.query_value("skip").unwrap_or_default().to_string())
            .collect();
        assert_eq!(skips, vec!["0", "2"]);
    }

    #[test]
    fn period_must_be_ordered() {
        let transport = Arc::new(RecordingTransport::new());
        let query = SalesQuery::new(day(10), day(1), [UNIT]);

        let err = api(&transport).sales_get(&session(), &query).unwrap_err();

        assert!(matches!(err, ApiError::InvalidArgument { name: "from", .. }));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn period_is_capped_at_31_days() {
        let transport = Arc::new(RecordingTransport::new());
        let ok = SalesQuery::new("2024-05-01T00:00:00", "2024-06-01T00:00:00", [UNIT]);
        let too_long = SalesQuery::new("2024-05-01T00:00:00", "2024-06-01T00:00:01", [UNIT]);
        transport.push_json(200, json!({"sales": [], "isEndOfListReached": true}));

        assert!(api(&transport).sales_get(&session(), &ok).is_ok());
        let err = api(&transport).sales_get(&session(), &too_long).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument { name: "to", .. }));
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn at_most_thirty_units() {
        let transport = Arc::new(RecordingTransport::new());
        let units: Vec<Uuid> = (0..31).map(|_| Uuid::new_v4()).collect();
        let query = SalesQuery::new(day(1), day(2), units);

        let err = api(&transport).sales_get(&session(), &query).unwrap_err();

        assert!(matches!(err, ApiError::InvalidArgument { name: "units", .. }));
    }

    #[test]
    fn at_least_one_unit() {
        let transport = Arc::new(RecordingTransport::new());
        let query = SalesQuery::new(day(1), day(2), Vec::<IdValue>::new());

        let err = api(&transport).sales_get(&session(), &query).unwrap_err();

        assert!(matches!(err, ApiError::InvalidArgument { name: "units", .. }));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn unknown_order_source_and_channel_are_rejected() {
        let transport = Arc::new(RecordingTransport::new());
        let bad_source = SalesQuery::new(day(1), day(2), [UNIT]).order_source("Telegram");
        let bad_channel = SalesQuery::new(day(1), day(2), [UNIT]).sales_channel("Drone");

        let err = api(&transport).sales_get(&session(), &bad_source).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument { name: "order_source", .. }));
        let err = api(&transport).sales_get(&session(), &bad_channel).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument { name: "sales_channel", .. }));
    }

    #[test]
    fn missing_scope_is_reported_before_validation() {
        let transport = Arc::new(RecordingTransport::new());
        let session = UserSession::with_scopes(["user.role:read"]).with_access_token("tok");
        let query = SalesQuery::new(day(10), day(1), [UNIT]);

        let err = api(&transport).sales_get(&session, &query).unwrap_err();

        assert!(matches!(err, ApiError::MissingScopes { ref missing } if missing == &["sales"]));
    }

    #[test]
    fn vendor_error_carries_status_and_body() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(403, json!({"title": "Forbidden"}));
        let query = SalesQuery::new(day(1), day(2), [UNIT]);

        let err = api(&transport).sales_get(&session(), &query).unwrap_err();

        assert!(matches!(err, ApiError::Http { status: 403, ref body } if body.contains("Forbidden")));
    }
}
