//! Strategy-level error types shared across configuration, token exchange, and profile loading.

// self
use crate::_prelude::*;

/// Strategy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used for wrapped transport failures and verify-callback errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical strategy error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Communication with The City failed.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The profile endpoint returned a body that is not valid JSON.
	#[error(transparent)]
	Parse(#[from] serde_json::Error),
	/// Token endpoint rejected the exchange or answered with garbage.
	#[error(transparent)]
	Token(#[from] TokenError),

	/// The `state` returned on the redirect does not match the session.
	#[error("Authorization state mismatch.")]
	StateMismatch,
	/// The application-supplied verify callback failed.
	#[error("Verify callback failed.")]
	Verification {
		/// Error returned by the callback.
		#[source]
		source: BoxError,
	},
}
impl Error {
	/// Wraps a verify-callback failure.
	pub fn verification(source: BoxError) -> Self {
		Self::Verification { source }
	}

	/// Returns true when the error came from talking to the provider.
	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Transport(_))
	}

	/// Returns true when the profile body could not be parsed.
	pub fn is_parse(&self) -> bool {
		matches!(self, Self::Parse(_))
	}
}

/// Configuration and validation failures raised while building a strategy.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// `clientID` was absent or empty.
	#[error("OAuth2 strategy requires a clientID option.")]
	MissingClientId,
	/// `clientSecret` was absent or empty.
	#[error("OAuth2 strategy requires a clientSecret option.")]
	MissingClientSecret,
	/// A URL option could not be parsed.
	#[error("Option `{option}` is not a valid absolute URL.")]
	InvalidUrl {
		/// Option name as recognized by [`crate::config::StrategyOptions`].
		option: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// A custom header name is not a valid HTTP header name.
	#[error("Custom header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Offending header name.
		name: String,
		/// Underlying validation failure.
		#[source]
		source: oauth2::http::header::InvalidHeaderName,
	},
	/// A custom header value is not a valid HTTP header value.
	#[error("Custom header `{name}` has an invalid value.")]
	InvalidHeaderValue {
		/// Header whose value failed validation.
		name: String,
		/// Underlying validation failure.
		#[source]
		source: oauth2::http::header::InvalidHeaderValue,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures while talking to The City.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The profile request failed or came back with a non-success status.
	#[error("Failed to fetch user profile.")]
	Profile {
		/// Underlying transport failure or [`UnexpectedStatus`].
		#[source]
		source: BoxError,
	},
	/// The token request never produced a response.
	#[error("Failed to obtain access token.")]
	Token {
		/// Underlying transport failure.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a profile transport failure.
	pub fn profile(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Profile { source: Box::new(src) }
	}

	/// Wraps a token transport failure.
	pub fn token(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Token { source: Box::new(src) }
	}

	/// Returns the HTTP status when the provider answered with a non-success code.
	pub fn status(&self) -> Option<u16> {
		let source = match self {
			Self::Profile { source } | Self::Token { source } => source,
		};

		source.downcast_ref::<UnexpectedStatus>().map(|err| err.status)
	}
}

/// Non-success HTTP response surfaced as the source of a [`TransportError`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Provider responded with HTTP {status}.")]
pub struct UnexpectedStatus {
	/// HTTP status code.
	pub status: u16,
	/// Response body, decoded lossily.
	pub body: String,
}

/// Token endpoint failures reported by the OAuth2 engine.
#[derive(Debug, ThisError)]
pub enum TokenError {
	/// Provider returned an OAuth error response.
	#[error("Token endpoint returned an OAuth error: {message}.")]
	Rejected {
		/// OAuth `error` code.
		error: String,
		/// `error_description` when supplied, otherwise the error code.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint returned something the engine could not classify.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Unexpected {
		/// Engine-supplied message.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint returned an `expires_in` that does not fit a timestamp.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}
