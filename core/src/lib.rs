//! Blocking client for the DodoIS REST and OAuth APIs.
//!
//! # Overview
//! Sections build plain-data `HttpRequest` values, a `Transport` executes
//! them, and the shared `ApiClient` turns each `HttpResponse` into parsed
//! JSON or an `ApiError`. Sessions (tokens, granted scopes, PKCE state) are
//! owned by the caller and reached through the `SessionStore` trait.
//!
//! # Design
//! - Every resource operation resolves the session, checks required scopes,
//!   validates and normalises arguments, then issues one GET. All local
//!   checks happen before anything touches the network.
//! - List endpoints page with `skip`/`take`; `take_all` walks every page
//!   sequentially until `isEndOfListReached`.
//! - The transport never fails: network errors arrive as synthetic 502/504/
//!   400/500 responses and flow through the same status check as vendor
//!   errors.
//! - Resource payloads stay `serde_json::Value`; the vendor schema is wide
//!   and changes independently of this crate.

pub mod api;
pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod facade;
pub mod http;
pub mod pagination;
pub mod pkce;
pub mod scopes;
pub mod session;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::ApiClient;
pub use config::{ConfigError, DodoIsConfig};
pub use convert::{DateTimeValue, DateValue, IdValue};
pub use error::{ApiError, Result};
pub use facade::DodoIsApi;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{InMemorySessionStore, SessionKey, SessionPatch, SessionSource, SessionStore, UserSession};
pub use transport::{Transport, UreqTransport};
pub use types::TokenSet;
