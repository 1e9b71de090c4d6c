//! Shared request plumbing for every API section.
//!
//! # Design
//! `ApiClient` bundles the two collaborators each section needs, the
//! `Transport` and the caller's `SessionStore`, and is handed to every
//! section at construction as an `Arc`. Sections build `HttpRequest`s and
//! use the helpers here to resolve sessions, execute, check the status and
//! decode JSON, so that logic lives in one place.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::pagination::{Page, PageCursor};
use crate::scopes::validate_scopes;
use crate::session::{SessionKey, SessionPatch, SessionSource, SessionStore, UserSession};
use crate::transport::Transport;

pub struct ApiClient {
    transport: Arc<dyn Transport>,
    sessions: Arc<dyn SessionStore>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            transport,
            sessions,
        }
    }

    /// Use the session passed by the caller, or fetch it from the store.
    pub fn resolve_session<'s>(&self, source: SessionSource<'s>) -> Result<Cow<'s, UserSession>> {
        match source {
            SessionSource::Data(session) => Ok(Cow::Borrowed(session)),
            SessionSource::Key(key) => self.fetch_session(&key).map(Cow::Owned),
        }
    }

    pub fn fetch_session(&self, key: &SessionKey) -> Result<UserSession> {
        self.sessions.fetch_session(key).map_err(ApiError::SessionStore)
    }

    pub fn update_session(&self, key: &SessionKey, patch: SessionPatch) -> Result<()> {
        self.sessions
            .update_session(key, patch)
            .map_err(ApiError::SessionStore)
    }

    /// Resolve the session, check it grants `required`, and hand back its
    /// access token.
    pub fn authorize<'s>(&self, source: impl Into<SessionSource<'s>>, required: &[&str]) -> Result<String> {
        let session = self.resolve_session(source.into())?;
        validate_scopes(&session.scopes, required)?;
        Ok(session.require_access_token()?.to_string())
    }

    /// Send `request` once and fail on any non-2xx status.
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let response = self.transport.send(request);
        check_status(response)
    }

    pub fn fetch_json<T: DeserializeOwned>(&self, request: &HttpRequest) -> Result<T> {
        let response = self.execute(request)?;
        parse_json(&response)
    }

    /// Fetch a list endpoint starting at `cursor`.
    ///
    /// With `take_all` unset this is a single request returning the items of
    /// that page. With it set, requests are repeated, advancing `skip` by
    /// `take`, until the vendor reports the end of the list; items are
    /// concatenated in request order.
    pub fn fetch_pages<F>(
        &self,
        items_key: &str,
        mut cursor: PageCursor,
        take_all: bool,
        build: F,
    ) -> Result<Vec<Value>>
    where
        F: Fn(PageCursor) -> HttpRequest,
    {
        if take_all && cursor.take == 0 {
            return Err(ApiError::invalid("take", "must be positive when fetching every page"));
        }
        let mut items = Vec::new();
        loop {
            let page = Page::from_body(self.fetch_json(&build(cursor))?, items_key)?;
            tracing::debug!(
                items_key,
                skip = cursor.skip,
                take = cursor.take,
                received = page.items.len(),
                end = page.is_end_of_list_reached,
                "fetched page"
            );
            items.extend(page.items);
            if page.is_end_of_list_reached || !take_all {
                return Ok(items);
            }
            cursor = cursor.next()?;
        }
    }
}

/// Pass 2xx responses through; everything else becomes `ApiError::Http`.
pub fn check_status(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }
    tracing::warn!(status = response.status, "dodois returned an error status");
    Err(ApiError::Http {
        status: response.status,
        body: response.body,
    })
}

pub fn parse_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    Ok(serde_json::from_str(&response.body)?)
}
