#![cfg(feature = "reqwest")]

// self
use oauth2_thecity::{
	_preludet::*,
	config::{DEFAULT_USER_AGENT, StrategyOptions},
	error::ConfigError,
	profile::ProfileContract,
	provider::{AUTHORIZATION_URL, ProviderDescriptorError, TOKEN_URL, USER_PROFILE_URL},
	strategy::ReqwestStrategy,
};

fn new_strategy(options: StrategyOptions) -> Result<ReqwestStrategy<AcceptProfile>> {
	ReqwestStrategy::from_options(options, accept_profile as AcceptProfile)
}

#[test]
fn strategy_defaults_to_the_city_endpoints() {
	let strategy = new_strategy(StrategyOptions::new("ABC123", "secret"))
		.expect("Minimal options should build a strategy.");
	let config = strategy.config();

	assert_eq!(strategy.name(), "thecity");
	assert_eq!(config.authorization_url().as_str(), AUTHORIZATION_URL);
	assert_eq!(config.token_url().as_str(), TOKEN_URL);
	assert_eq!(config.user_profile_url().as_str(), USER_PROFILE_URL);
	assert_eq!(config.scope_separator(), ',');
	assert_eq!(config.profile_contract(), ProfileContract::GlobalUser);
	assert_eq!(config.user_agent(), Some(DEFAULT_USER_AGENT));
}

#[test]
fn strategy_honors_overrides() {
	let strategy = new_strategy(
		StrategyOptions::new("ABC123", "secret")
			.authorization_url("https://auth.example.net/authorize")
			.token_url("https://auth.example.net/token")
			.user_profile_url("https://api.example.net/me")
			.scope_separator(' ')
			.user_agent("church-portal/2.1"),
	)
	.expect("Overridden options should build a strategy.");
	let config = strategy.config();

	assert_eq!(config.authorization_url().as_str(), "https://auth.example.net/authorize");
	assert_eq!(config.token_url().as_str(), "https://auth.example.net/token");
	assert_eq!(config.user_profile_url().as_str(), "https://api.example.net/me");
	assert_eq!(config.scope_separator(), ' ');
	assert_eq!(config.user_agent(), Some("church-portal/2.1"));
}

#[test]
fn strategy_options_load_from_json() {
	let options = StrategyOptions::from_json(
		r#"{
			"clientID": "ABC123",
			"clientSecret": "secret",
			"callbackURL": "https://www.example.net/auth/thecity/callback",
			"scope": ["group", "user"],
			"customHeaders": { "User-Agent": "church-portal/2.1" },
			"profileContract": "response"
		}"#,
	)
	.expect("Options JSON should deserialize.");
	let strategy = new_strategy(options).expect("Deserialized options should build a strategy.");
	let config = strategy.config();

	assert_eq!(
		config.callback_url.as_ref().map(Url::as_str),
		Some("https://www.example.net/auth/thecity/callback")
	);
	assert_eq!(config.scope.as_slice(), ["group".to_string(), "user".to_string()]);
	assert_eq!(config.user_agent(), Some("church-portal/2.1"));
	assert_eq!(config.profile_contract(), ProfileContract::Response);
}

#[test]
fn strategy_rejects_invalid_options() {
	let missing = new_strategy(StrategyOptions::default())
		.expect_err("Options without credentials must be rejected.");

	assert!(matches!(missing, Error::Config(ConfigError::MissingClientId)));

	let insecure = new_strategy(
		StrategyOptions::new("ABC123", "secret").token_url("http://auth.example.net/token"),
	)
	.expect_err("Plain HTTP endpoints must be rejected.");

	assert!(matches!(
		insecure,
		Error::Config(ConfigError::Descriptor(ProviderDescriptorError::InsecureEndpoint { .. }))
	));
}
