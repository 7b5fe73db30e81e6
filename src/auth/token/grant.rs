//! Tokens handed to the verify callback after a successful code exchange.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, auth::TokenSecret, error::TokenError};

/// Access and refresh tokens returned by The City's token endpoint.
///
/// Grants are not persisted or refreshed here; they are handed to the verify callback
/// together with the normalized profile and dropped afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenGrant {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token secret, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Instant the token response was received.
	pub issued_at: OffsetDateTime,
	/// Expiry derived from `expires_in`, when the provider sent one.
	pub expires_at: Option<OffsetDateTime>,
}
impl TokenGrant {
	/// Creates a grant issued now without expiry or refresh token.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: None,
			issued_at: OffsetDateTime::now_utc(),
			expires_at: None,
		}
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the expiry `expires_in` after `issued_at`.
	pub fn with_expires_in(mut self, expires_in: StdDuration) -> Result<Self, TokenError> {
		let secs =
			i64::try_from(expires_in.as_secs()).map_err(|_| TokenError::ExpiresInOutOfRange)?;
		let expires_at = self
			.issued_at
			.checked_add(Duration::seconds(secs))
			.ok_or(TokenError::ExpiresInOutOfRange)?;

		self.expires_at = Some(expires_at);

		Ok(self)
	}
}
impl Debug for TokenGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenGrant")
			.field("access_token", &self.access_token)
			.field("refresh_token", &self.refresh_token)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
