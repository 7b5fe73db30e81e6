//! Provider-facing descriptor for The City.
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering the HTTPS-only
//! authorization, token, and profile endpoints plus provider quirks (scope separator, PKCE,
//! profile payload contract). Every endpoint falls back to The City's published URL.

pub mod descriptor;

pub use descriptor::*;

/// Name under which the strategy registers with a host authentication framework.
pub const STRATEGY_NAME: &str = "thecity";
/// Default authorization endpoint.
pub const AUTHORIZATION_URL: &str = "https://authentication.onthecity.org/oauth/authorize";
/// Default token endpoint.
pub const TOKEN_URL: &str = "https://authentication.onthecity.org/oauth/token";
/// Default profile endpoint.
pub const USER_PROFILE_URL: &str = "https://authentication.onthecity.org/authorization";
