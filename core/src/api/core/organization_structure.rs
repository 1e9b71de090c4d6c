//! Organization structure: legal entities.

use std::sync::Arc;

use serde_json::Value;

use crate::client::ApiClient;
use crate::convert::{join_ids, DateTimeValue, IdValue};
use crate::error::Result;
use crate::http::HttpRequest;
use crate::pagination::PageCursor;
use crate::scopes::ORGANIZATION_STRUCTURE;
use crate::session::SessionSource;

pub const MAX_LEGAL_ENTITIES_TAKE: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalEntitiesQuery {
    /// Only entities modified at or after this instant.
    pub modified_at: Option<DateTimeValue>,
    pub type_ids: Vec<IdValue>,
    pub skip: u32,
    pub take: u32,
    pub take_all: bool,
}

impl Default for LegalEntitiesQuery {
    fn default() -> Self {
        Self {
            modified_at: None,
            type_ids: Vec::new(),
            skip: 0,
            take: MAX_LEGAL_ENTITIES_TAKE,
            take_all: false,
        }
    }
}

impl LegalEntitiesQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modified_at(mut self, modified_at: impl Into<DateTimeValue>) -> Self {
        self.modified_at = Some(modified_at.into());
        self
    }

    pub fn type_ids<I>(mut self, type_ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<IdValue>,
    {
        self.type_ids = type_ids.into_iter().map(Into::into).collect();
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
            PageCursor::exhaustive(MAX_LEGAL_ENTITIES_TAKE)
        } else {
            PageCursor::new(self.skip, self.take)
        }
    }

    fn to_request(&self, base_url: &str, access_token: &str) -> Result<HttpRequest> {
        Ok(HttpRequest::get(format!("{base_url}/organization-structure/legal-entities"))
            .bearer(access_token)
            .query_opt("modifiedAt", self.modified_at.as_ref().map(DateTimeValue::to_query))
            .query_opt("typeIds", join_ids("type_ids", &self.type_ids)?))
    }
}

#[derive(Debug, Clone)]
pub struct OrganizationStructureApi {
    client: Arc<ApiClient>,
    base_url: String,
}

impl OrganizationStructureApi {
    pub fn new(client: Arc<ApiClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    /// Legal entities sorted by id: the `legalEntities` of one page, or of
    /// every page with `take_all`.
    pub fn legal_entities_get<'s>(
        &self,
        session: impl Into<SessionSource<'s>>,
        query: &LegalEntitiesQuery,
    ) -> Result<Vec<Value>> {
        let access_token = self.client.authorize(session, &[ORGANIZATION_STRUCTURE])?;
        let request = query.to_request(&self.base_url, &access_token)?;
        self.client
            .fetch_pages("legalEntities", query.cursor(), query.take_all, |cursor| cursor.apply(&request))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use serde_json::json;

    use super::*;
    use crate::error::ApiError;
    use crate::session::{InMemorySessionStore, UserSession};
    use crate::testing::RecordingTransport;

    fn api(transport: &Arc<RecordingTransport>) -> OrganizationStructureApi {
        let client = ApiClient::new(transport.clone(), Arc::new(InMemorySessionStore::new()));
        OrganizationStructureApi::new(Arc::new(client), "https://api.dodois.io/dodopizza/ru")
    }

    fn session() -> UserSession {
        UserSession::with_scopes(["organizationstructure"]).with_access_token("tok")
    }

    #[test]
    fn zoned_modified_at_is_sent_in_utc() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"legalEntities": [{"id": "le"}], "isEndOfListReached": true}));
        let moscow = FixedOffset::east_opt(3 * 3600).unwrap();
        let modified_at = moscow.with_ymd_and_hms(2024, 2, 1, 3, 0, 0).unwrap();
        let query = LegalEntitiesQuery::new()
            .modified_at(modified_at)
            .type_ids(["aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee"]);

        let entities = api(&transport).legal_entities_get(&session(), &query).unwrap();

        assert_eq!(entities, vec![json!({"id": "le"})]);
        let request = transport.last_request();
        assert_eq!(
            request.url,
            "https://api.dodois.io/dodopizza/ru/organization-structure/legal-entities"
        );
        assert_eq!(request.query_value("modifiedAt"), Some("2024-02-01T00:00:00"));
        assert_eq!(request.query_value("typeIds"), Some("aaaaaaaabbbbccccddddeeeeeeeeeeee"));
        assert_eq!(request.query_value("take"), Some("1000"));
    }

    #[test]
    fn take_all_restarts_from_first_record() {
        let transport = Arc::new(RecordingTransport::new());
        for last in [false, false, true] {
            transport.push_json(200, json!({"legalEntities": [{}], "isEndOfListReached": last}));
        }
        let query = LegalEntitiesQuery::new().skip(7).take(3).take_all();

        let entities = api(&transport).legal_entities_get(&session(), &query).unwrap();

        assert_eq!(entities.len(), 3);
        let skips: Vec<String> = transport
            .requests()
            .iter()
            .map(|r| r.query_value("skip").unwrap_or_default().to_string())
            .collect();
        assert_eq!(skips, vec!["0", "1000", "2000"]);
    }

    #[test]
    fn filters_are_optional() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"legalEntities": [], "isEndOfListReached": true}));

        api(&transport)
            .legal_entities_get(&session(), &LegalEntitiesQuery::new())
            .unwrap();

        let request = transport.last_request();
        assert_eq!(request.query_value("modifiedAt"), None);
        assert_eq!(request.query_value("typeIds"), None);
    }

    #[test]
    fn requires_organization_structure_scope() {
        let transport = Arc::new(RecordingTransport::new());
        let session = UserSession::with_scopes(["shared"]).with_access_token("tok");

        let err = api(&transport)
            .legal_entities_get(&session, &LegalEntitiesQuery::new())
            .unwrap_err();

        assert!(matches!(err, ApiError::MissingScopes { .. }));
    }

    #[test]
    fn malformed_page_is_a_deserialization_error() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_json(200, json!({"items": []}));

        let err = api(&transport)
            .legal_entities_get(&session(), &LegalEntitiesQuery::new())
            .unwrap_err();

        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
