// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::ScopeList, config::StrategyConfig};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// Supported PKCE challenge methods surfaced via [`AuthorizationSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Handshake metadata returned by [`TheCityStrategy::start_authorization`].
///
/// Keep the session until the redirect comes back; it is consumed by the code exchange.
///
/// [`TheCityStrategy::start_authorization`]: crate::strategy::TheCityStrategy::start_authorization
#[derive(Clone)]
pub struct AuthorizationSession {
	/// Requested scopes.
	pub scope: ScopeList,
	/// Opaque state value that must round-trip via the redirect handler.
	pub state: String,
	/// Redirect URI sent with the authorize request, when configured.
	pub redirect_uri: Option<Url>,
	/// Fully-formed HTTPS authorize URL that callers should send end-users to.
	pub authorize_url: Url,
	pkce: Option<PkcePair>,
}
impl AuthorizationSession {
	/// PKCE code challenge derived from the secret verifier, when PKCE is enabled.
	pub fn code_challenge(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pkce| pkce.challenge.as_str())
	}

	/// PKCE challenge method, when PKCE is enabled.
	pub fn code_challenge_method(&self) -> Option<PkceCodeChallengeMethod> {
		self.pkce.as_ref().map(|pkce| pkce.method)
	}

	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state {
			Ok(())
		} else {
			Err(Error::StateMismatch)
		}
	}

	pub(super) fn pkce_verifier(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pkce| pkce.verifier.as_str())
	}
}
impl Debug for AuthorizationSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationSession")
			.field("scope", &self.scope)
			.field("state", &self.state)
			.field("redirect_uri", &self.redirect_uri)
			.field("authorize_url", &self.authorize_url)
			.field("code_challenge", &self.code_challenge())
			.field("code_challenge_method", &self.code_challenge_method())
			.finish()
	}
}

#[derive(Clone)]
struct PkcePair {
	verifier: String,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl PkcePair {
	fn generate() -> Self {
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let challenge = compute_pkce_challenge(&verifier);

		Self { verifier, challenge, method: PkceCodeChallengeMethod::S256 }
	}
}

pub(super) fn build_session(config: &StrategyConfig) -> AuthorizationSession {
	let state = random_string(STATE_LEN);
	let pkce = config.descriptor.quirks.pkce_required.then(PkcePair::generate);
	let authorize_url = build_authorize_url(config, &state, pkce.as_ref());

	AuthorizationSession {
		scope: config.scope.clone(),
		state,
		redirect_uri: config.callback_url.clone(),
		authorize_url,
		pkce,
	}
}

fn build_authorize_url(config: &StrategyConfig, state: &str, pkce: Option<&PkcePair>) -> Url {
	let mut url = config.authorization_url().clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", &config.client_id);

	if let Some(redirect_uri) = &config.callback_url {
		pairs.append_pair("redirect_uri", redirect_uri.as_str());
	}
	if let Some(scope_value) = config.scope.join(config.scope_separator()) {
		pairs.append_pair("scope", &scope_value);
	}

	pairs.append_pair("state", state);

	if let Some(pkce) = pkce {
		pairs.append_pair("code_challenge", &pkce.challenge);
		pairs.append_pair("code_challenge_method", pkce.method.as_str());
	}

	drop(pairs);

	url
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(verifier.as_bytes());
	let digest = hasher.finalize();
	URL_SAFE_NO_PAD.encode(digest)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::config::StrategyOptions;

	fn query(url: &Url) -> BTreeMap<String, String> {
		url.query_pairs().into_owned().collect()
	}

	#[test]
	fn authorize_url_joins_scopes_with_the_separator() {
		let config = StrategyOptions::new("ABC123", "secret")
			.callback_url("https://www.example.net/auth/thecity/callback")
			.scope(["user_basic", "user_extended"])
			.build()
			.expect("Options should build.");
		let session = build_session(&config);
		let pairs = query(&session.authorize_url);

		assert!(
			session
				.authorize_url
				.as_str()
				.starts_with("https://authentication.onthecity.org/oauth/authorize?")
		);
		assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
		assert_eq!(pairs.get("client_id").map(String::as_str), Some("ABC123"));
		assert_eq!(
			pairs.get("redirect_uri").map(String::as_str),
			Some("https://www.example.net/auth/thecity/callback")
		);
		assert_eq!(pairs.get("scope").map(String::as_str), Some("user_basic,user_extended"));
		assert_eq!(pairs.get("state"), Some(&session.state));
		assert_eq!(session.state.len(), STATE_LEN);
		assert!(!pairs.contains_key("code_challenge"));
		assert_eq!(session.code_challenge_method(), None);
	}

	#[test]
	fn repeated_scopes_are_sent_once() {
		let config = StrategyOptions::new("ABC123", "secret")
			.scope(["group", "group", "user", "group"])
			.build()
			.expect("Options should build.");
		let session = build_session(&config);

		let pairs = query(&session.authorize_url);

		assert_eq!(pairs.get("scope").map(String::as_str), Some("group,user"));
	}

	#[test]
	fn pkce_adds_a_challenge() {
		let config = StrategyOptions::new("ABC123", "secret")
			.pkce(true)
			.build()
			.expect("Options should build.");
		let session = build_session(&config);
		let pairs = query(&session.authorize_url);
		let verifier = session.pkce_verifier().expect("PKCE verifier should be generated.");

		assert_eq!(verifier.len(), PKCE_VERIFIER_LEN);
		assert_eq!(session.code_challenge_method(), Some(PkceCodeChallengeMethod::S256));
		assert_eq!(pairs.get("code_challenge_method").map(String::as_str), Some("S256"));
		assert_eq!(
			pairs.get("code_challenge").map(String::as_str),
			Some(compute_pkce_challenge(verifier).as_str())
		);
		assert!(!pairs.contains_key("scope"));
		assert!(!pairs.contains_key("redirect_uri"));
	}

	#[test]
	fn state_validation_errors_on_mismatch() {
		let config =
			StrategyOptions::new("ABC123", "secret").build().expect("Options should build.");
		let session = build_session(&config);

		assert!(session.validate_state(&session.state).is_ok());

		let err = session.validate_state("other").expect_err("State mismatch should fail.");

		assert!(matches!(err, Error::StateMismatch));
	}

	#[test]
	fn debug_hides_the_verifier() {
		let config = StrategyOptions::new("ABC123", "secret")
			.pkce(true)
			.build()
			.expect("Options should build.");
		let session = build_session(&config);
		let verifier = session.pkce_verifier().expect("PKCE verifier should be generated.");

		assert!(!format!("{session:?}").contains(verifier));
	}
}
