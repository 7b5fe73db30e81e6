//! Strategy options and the immutable configuration built from them.
//!
//! [`StrategyOptions`] mirrors the option names host applications already use
//! (`clientID`, `callbackURL`, `scopeSeparator`, ...), so it can be deserialized straight
//! from JSON. [`StrategyConfig::from_options`] validates the options once at startup and
//! fills every endpoint, separator, and header default.

// crates.io
use oauth2::http::{HeaderMap, HeaderName, HeaderValue, header::USER_AGENT};
// self
use crate::{
	_prelude::*,
	auth::{ScopeList, TokenSecret},
	error::ConfigError,
	profile::ProfileContract,
	provider::{ProviderDescriptor, ProviderQuirks, descriptor::builder::validate_endpoint},
};

/// `User-Agent` sent when neither `customHeaders` nor `userAgent` supply one.
pub const DEFAULT_USER_AGENT: &str = "oauth2-thecity";

/// Partial, caller-supplied strategy options.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct StrategyOptions {
	/// The City application's client ID (required).
	#[serde(rename = "clientID")]
	pub client_id: Option<String>,
	/// The City application's client secret (required).
	#[serde(rename = "clientSecret")]
	pub client_secret: Option<String>,
	/// URL The City redirects to after the user grants access.
	#[serde(rename = "callbackURL")]
	pub callback_url: Option<String>,
	/// Authorization endpoint override.
	#[serde(rename = "authorizationURL")]
	pub authorization_url: Option<String>,
	/// Token endpoint override.
	#[serde(rename = "tokenURL")]
	pub token_url: Option<String>,
	/// Profile endpoint override.
	#[serde(rename = "userProfileURL")]
	pub user_profile_url: Option<String>,
	/// Scopes to request, in order.
	pub scope: Vec<String>,
	/// Character joining requested scopes.
	#[serde(rename = "scopeSeparator")]
	pub scope_separator: Option<char>,
	/// Headers attached to every request sent to The City.
	#[serde(rename = "customHeaders")]
	pub custom_headers: BTreeMap<String, String>,
	/// `User-Agent` used when `customHeaders` does not carry one.
	#[serde(rename = "userAgent")]
	pub user_agent: Option<String>,
	/// Profile payload contract.
	#[serde(rename = "profileContract")]
	pub profile_contract: Option<ProfileContract>,
	/// Attach a PKCE S256 challenge to authorization requests.
	pub pkce: bool,
}
impl StrategyOptions {
	/// Starts from the two required options.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			client_id: Some(client_id.into()),
			client_secret: Some(client_secret.into()),
			..Default::default()
		}
	}

	/// Parses options from a JSON document.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Sets the callback URL.
	pub fn callback_url(mut self, url: impl Into<String>) -> Self {
		self.callback_url = Some(url.into());

		self
	}

	/// Overrides the authorization endpoint.
	pub fn authorization_url(mut self, url: impl Into<String>) -> Self {
		self.authorization_url = Some(url.into());

		self
	}

	/// Overrides the token endpoint.
	pub fn token_url(mut self, url: impl Into<String>) -> Self {
		self.token_url = Some(url.into());

		self
	}

	/// Overrides the profile endpoint.
	pub fn user_profile_url(mut self, url: impl Into<String>) -> Self {
		self.user_profile_url = Some(url.into());

		self
	}

	/// Replaces the requested scopes.
	pub fn scope<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scope = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Overrides the scope separator.
	pub fn scope_separator(mut self, separator: char) -> Self {
		self.scope_separator = Some(separator);

		self
	}

	/// Adds or replaces a custom header.
	pub fn custom_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.custom_headers.insert(name.into(), value.into());

		self
	}

	/// Sets the fallback `User-Agent`.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());

		self
	}

	/// Selects the profile payload contract.
	pub fn profile_contract(mut self, contract: ProfileContract) -> Self {
		self.profile_contract = Some(contract);

		self
	}

	/// Toggles PKCE.
	pub fn pkce(mut self, enabled: bool) -> Self {
		self.pkce = enabled;

		self
	}

	/// Validates the options; shorthand for [`StrategyConfig::from_options`].
	pub fn build(self) -> Result<StrategyConfig, ConfigError> {
		StrategyConfig::from_options(self)
	}
}
impl Debug for StrategyOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyOptions")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("callback_url", &self.callback_url)
			.field("authorization_url", &self.authorization_url)
			.field("token_url", &self.token_url)
			.field("user_profile_url", &self.user_profile_url)
			.field("scope", &self.scope)
			.field("scope_separator", &self.scope_separator)
			.field("custom_headers", &self.custom_headers)
			.field("user_agent", &self.user_agent)
			.field("profile_contract", &self.profile_contract)
			.field("pkce", &self.pkce)
			.finish()
	}
}

/// Fully resolved strategy configuration; immutable once built.
#[derive(Clone, Debug)]
pub struct StrategyConfig {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: TokenSecret,
	/// Redirect URI registered with The City.
	pub callback_url: Option<Url>,
	/// Endpoints and quirks.
	pub descriptor: ProviderDescriptor,
	/// Scopes requested during authorization.
	pub scope: ScopeList,
	/// Headers attached to every outbound request; always carries a non-empty `User-Agent`.
	pub custom_headers: HeaderMap,
}
impl StrategyConfig {
	/// Validates `options` and applies The City's defaults.
	pub fn from_options(options: StrategyOptions) -> Result<Self, ConfigError> {
		let client_id = options
			.client_id
			.filter(|value| !value.is_empty())
			.ok_or(ConfigError::MissingClientId)?;
		let client_secret = options
			.client_secret
			.filter(|value| !value.is_empty())
			.map(TokenSecret::new)
			.ok_or(ConfigError::MissingClientSecret)?;
		let quirks = ProviderQuirks {
			pkce_required: options.pkce,
			scope_delimiter: options
				.scope_separator
				.unwrap_or(ProviderQuirks::DEFAULT_SCOPE_DELIMITER),
			profile_contract: options.profile_contract.unwrap_or_default(),
		};
		let mut builder = ProviderDescriptor::builder().quirks(quirks);

		if let Some(url) = parse_url("authorizationURL", options.authorization_url)? {
			builder = builder.authorization_endpoint(url);
		}
		if let Some(url) = parse_url("tokenURL", options.token_url)? {
			builder = builder.token_endpoint(url);
		}
		if let Some(url) = parse_url("userProfileURL", options.user_profile_url)? {
			builder = builder.profile_endpoint(url);
		}

		let descriptor = builder.build()?;
		let callback_url = parse_url("callbackURL", options.callback_url)?;

		if let Some(url) = &callback_url {
			validate_endpoint("callback", url)?;
		}

		let scope = ScopeList::new(options.scope)?;

		scope.ensure_delimiter_free(descriptor.quirks.scope_delimiter)?;

		let custom_headers = build_headers(options.custom_headers, options.user_agent)?;

		Ok(Self { client_id, client_secret, callback_url, descriptor, scope, custom_headers })
	}

	/// Authorization endpoint.
	pub fn authorization_url(&self) -> &Url {
		&self.descriptor.endpoints.authorization
	}

	/// Token endpoint.
	pub fn token_url(&self) -> &Url {
		&self.descriptor.endpoints.token
	}

	/// Profile endpoint.
	pub fn user_profile_url(&self) -> &Url {
		&self.descriptor.endpoints.profile
	}

	/// Character joining requested scopes.
	pub fn scope_separator(&self) -> char {
		self.descriptor.quirks.scope_delimiter
	}

	/// Profile payload contract.
	pub fn profile_contract(&self) -> ProfileContract {
		self.descriptor.quirks.profile_contract
	}

	/// Effective `User-Agent` header value.
	pub fn user_agent(&self) -> Option<&str> {
		self.custom_headers.get(USER_AGENT).and_then(|value| value.to_str().ok())
	}
}

fn parse_url(option: &'static str, value: Option<String>) -> Result<Option<Url>, ConfigError> {
	value
		.map(|raw| Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { option, source }))
		.transpose()
}

fn build_headers(
	custom: BTreeMap<String, String>,
	user_agent: Option<String>,
) -> Result<HeaderMap, ConfigError> {
	let mut headers = HeaderMap::new();

	for (name, value) in custom {
		let header = HeaderName::from_bytes(name.as_bytes())
			.map_err(|source| ConfigError::InvalidHeaderName { name: name.clone(), source })?;
		let value = HeaderValue::from_str(&value)
			.map_err(|source| ConfigError::InvalidHeaderValue { name, source })?;

		headers.insert(header, value);
	}

	if headers.get(USER_AGENT).is_none_or(|value| value.is_empty()) {
		let fallback = user_agent.filter(|value| !value.is_empty());
		let value = match fallback {
			Some(value) => HeaderValue::from_str(&value).map_err(|source| {
				ConfigError::InvalidHeaderValue { name: USER_AGENT.as_str().into(), source }
			})?,
			None => HeaderValue::from_static(DEFAULT_USER_AGENT),
		};

		headers.insert(USER_AGENT, value);
	}

	Ok(headers)
}
