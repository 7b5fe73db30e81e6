// self
use crate::{
	_prelude::*,
	provider::{
		AUTHORIZATION_URL, ProviderDescriptor, ProviderEndpoints, ProviderQuirks, TOKEN_URL,
		USER_PROFILE_URL,
	},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// A built-in default endpoint failed to parse.
	#[error("Default {endpoint} endpoint is not a valid URL.")]
	InvalidDefault {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Reject scope delimiters that are control characters.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug, Default)]
pub struct ProviderDescriptorBuilder {
	/// Authorization endpoint override.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint override.
	pub token_endpoint: Option<Url>,
	/// Profile endpoint override.
	pub profile_endpoint: Option<Url>,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a builder with no overrides.
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Overrides the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Overrides the profile endpoint.
	pub fn profile_endpoint(mut self, url: Url) -> Self {
		self.profile_endpoint = Some(url);

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder, fills in defaults, and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization =
			or_default(self.authorization_endpoint, "authorization", AUTHORIZATION_URL)?;
		let token = or_default(self.token_endpoint, "token", TOKEN_URL)?;
		let profile = or_default(self.profile_endpoint, "profile", USER_PROFILE_URL)?;
		let descriptor = ProviderDescriptor {
			endpoints: ProviderEndpoints { authorization, token, profile },
			quirks: self.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;
		validate_endpoint("profile", &self.endpoints.profile)?;
		validate_scope_delimiter(self.quirks.scope_delimiter)?;

		Ok(())
	}
}

fn or_default(
	value: Option<Url>,
	endpoint: &'static str,
	default: &str,
) -> Result<Url, ProviderDescriptorError> {
	match value {
		Some(url) => Ok(url),
		None => Url::parse(default)
			.map_err(|source| ProviderDescriptorError::InvalidDefault { endpoint, source }),
	}
}

pub(crate) fn validate_endpoint(
	name: &'static str,
	url: &Url,
) -> Result<(), ProviderDescriptorError> {
	if url.scheme() != "https" {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}

fn validate_scope_delimiter(delimiter: char) -> Result<(), ProviderDescriptorError> {
	if delimiter.is_control() {
		Err(ProviderDescriptorError::InvalidScopeDelimiter { delimiter })
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse test URL.")
	}

	#[test]
	fn overrides_replace_only_their_endpoint() {
		let descriptor = ProviderDescriptor::builder()
			.profile_endpoint(url("https://api.onthecity.org/me"))
			.build()
			.expect("Descriptor with a secure override should build.");

		assert_eq!(descriptor.endpoints.profile.as_str(), "https://api.onthecity.org/me");
		assert_eq!(descriptor.endpoints.token.as_str(), TOKEN_URL);
	}

	#[test]
	fn insecure_endpoints_are_rejected() {
		let err = ProviderDescriptor::builder()
			.token_endpoint(url("http://authentication.onthecity.org/oauth/token"))
			.build()
			.expect_err("Plain HTTP token endpoint must be rejected.");

		assert!(matches!(err, ProviderDescriptorError::InsecureEndpoint { endpoint: "token", .. }));
	}

	#[test]
	fn control_character_delimiters_are_rejected() {
		let quirks = ProviderQuirks { scope_delimiter: '\n', ..ProviderQuirks::default() };
		let err = ProviderDescriptor::builder()
			.quirks(quirks)
			.build()
			.expect_err("Control characters cannot join scopes.");

		assert_eq!(err, ProviderDescriptorError::InvalidScopeDelimiter { delimiter: '\n' });
	}
}
