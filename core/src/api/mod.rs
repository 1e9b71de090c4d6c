//! DodoIS API sections.
//!
//! Each section owns its base URL and an `Arc<ApiClient>`; operations take
//! anything convertible into a `SessionSource`, so callers pass either a
//! `SessionKey` to look the session up or a `&UserSession` they already hold.

pub mod auth;
pub mod core;
pub mod marketplace;
pub mod oauth;

pub use self::auth::AuthApi;
pub use self::core::CoreApi;
pub use self::marketplace::MarketplaceApi;
pub use self::oauth::OAuthApi;
