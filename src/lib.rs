//! OAuth 2.0 strategy for The City: provider endpoint defaults, header policy, and normalized
//! user profiles layered over the `oauth2` crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod profile;
pub mod provider;
pub mod strategy;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::TokenGrant,
		config::{StrategyConfig, StrategyOptions},
		error::BoxError,
		http::ReqwestHttpClient,
		profile::Profile,
		strategy::TheCityStrategy,
	};

	/// Verify callback used by tests: accepts every login and yields the normalized profile.
	pub type AcceptProfile = fn(TokenGrant, Profile) -> AcceptFuture;

	/// Future returned by [`accept_profile`].
	pub type AcceptFuture =
		Pin<Box<dyn Future<Output = Result<Option<Profile>, BoxError>> + Send>>;

	/// Strategy type alias used by reqwest-backed integration tests.
	pub type ReqwestTestStrategy<V = AcceptProfile> = TheCityStrategy<V, ReqwestHttpClient>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Verify callback that accepts every login and returns the profile as the user.
	pub fn accept_profile(_grant: TokenGrant, profile: Profile) -> AcceptFuture {
		Box::pin(async move { Ok(Some(profile)) })
	}

	/// Options pointing every endpoint at `base` (typically an `httpmock` server URL).
	pub fn mock_options(base: &str, client_id: &str, client_secret: &str) -> StrategyOptions {
		StrategyOptions::new(client_id, client_secret)
			.authorization_url(format!("{base}/oauth/authorize"))
			.token_url(format!("{base}/oauth/token"))
			.user_profile_url(format!("{base}/authorization"))
	}

	/// Constructs a [`TheCityStrategy`] backed by the insecure reqwest transport used across
	/// integration tests.
	pub fn build_reqwest_test_strategy(options: StrategyOptions) -> ReqwestTestStrategy {
		let config =
			StrategyConfig::from_options(options).expect("Failed to build test strategy config.");

		TheCityStrategy::with_http_client(
			config,
			accept_profile as AcceptProfile,
			test_reqwest_http_client(),
		)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
