#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use oauth2_thecity::{
	_preludet::*,
	auth::TokenGrant,
	error::{BoxError, TokenError},
	profile::Profile,
	strategy::{PkceCodeChallengeMethod, ReqwestStrategy},
};

const CLIENT_ID: &str = "ABC123";
const CLIENT_SECRET: &str = "secret";
const PROFILE_BODY: &str =
	"{\"global_user\":{\"id\":1234567890,\"first\":\"Firstname\",\"last\":\"Lastname\"}}";
const TOKEN_BODY: &str =
	"{\"access_token\":\"access-token\",\"refresh_token\":\"refresh-token\",\"token_type\":\"bearer\",\"expires_in\":3600}";

fn authorize_pairs(url: &Url) -> BTreeMap<String, String> {
	url.query_pairs().into_owned().collect()
}

#[tokio::test]
async fn authenticate_exchanges_code_and_verifies_profile() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.header("content-type", "application/x-www-form-urlencoded")
				.header("user-agent", "oauth2-thecity");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/authorization")
				.header("authorization", "Bearer access-token");
			then.status(200).header("content-type", "application/json").body(PROFILE_BODY);
		})
		.await;
	let strategy = build_reqwest_test_strategy(
		mock_options(&server.url(""), CLIENT_ID, CLIENT_SECRET)
			.callback_url("https://www.example.net/auth/thecity/callback")
			.scope(["group", "user"]),
	);
	let session = strategy.start_authorization();
	let pairs = authorize_pairs(&session.authorize_url);

	assert_eq!(session.authorize_url.path(), "/oauth/authorize");
	assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
	assert_eq!(pairs.get("client_id").map(String::as_str), Some(CLIENT_ID));
	assert_eq!(
		pairs.get("redirect_uri").map(String::as_str),
		Some("https://www.example.net/auth/thecity/callback")
	);
	assert_eq!(pairs.get("scope").map(String::as_str), Some("group,user"));
	assert_eq!(pairs.get("state"), Some(&session.state));
	assert!(!pairs.contains_key("code_challenge"));

	let state = session.state.clone();
	let profile = strategy
		.authenticate(session, &state, "valid-code")
		.await
		.expect("Authentication should succeed.")
		.expect("Accepting verify callback should yield a user.");

	token_mock.assert_async().await;
	profile_mock.assert_async().await;

	assert_eq!(profile.provider, "thecity");
	assert_eq!(profile.id.as_deref(), Some("1234567890"));
	assert_eq!(profile.raw, PROFILE_BODY);
}

#[tokio::test]
async fn authenticate_returns_none_when_verify_rejects() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/authorization");
			then.status(200).header("content-type", "application/json").body(PROFILE_BODY);
		})
		.await;
	let config = mock_options(&server.url(""), CLIENT_ID, CLIENT_SECRET)
		.build()
		.expect("Mock options should build.");
	let reject =
		|_grant: TokenGrant, _profile: Profile| async { Ok::<Option<()>, BoxError>(None) };
	let strategy = ReqwestStrategy::with_http_client(config, reject, test_reqwest_http_client());
	let session = strategy.start_authorization();
	let state = session.state.clone();
	let user = strategy
		.authenticate(session, &state, "valid-code")
		.await
		.expect("Rejection is not an error.");

	token_mock.assert_async().await;
	profile_mock.assert_async().await;

	assert!(user.is_none());
}

#[tokio::test]
async fn authenticate_surfaces_verify_failures() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/authorization");
			then.status(200).header("content-type", "application/json").body(PROFILE_BODY);
		})
		.await;

	let config = mock_options(&server.url(""), CLIENT_ID, CLIENT_SECRET)
		.build()
		.expect("Mock options should build.");
	let fail = |_grant: TokenGrant, _profile: Profile| async {
		Err::<Option<()>, BoxError>("user store offline".into())
	};
	let strategy = ReqwestStrategy::with_http_client(config, fail, test_reqwest_http_client());
	let session = strategy.start_authorization();
	let state = session.state.clone();
	let err = strategy
		.authenticate(session, &state, "valid-code")
		.await
		.expect_err("Verify failures must propagate.");

	match err {
		Error::Verification { source } => assert_eq!(source.to_string(), "user store offline"),
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn exchange_code_maps_oauth_error_responses() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"Code expired.\"}");
		})
		.await;
	let strategy =
		build_reqwest_test_strategy(mock_options(&server.url(""), CLIENT_ID, CLIENT_SECRET));
	let session = strategy.start_authorization();
	let err = strategy
		.exchange_code(session, "expired-code")
		.await
		.expect_err("Rejected codes must fail.");

	mock.assert_async().await;

	match err {
		Error::Token(TokenError::Rejected { error, message, status }) => {
			assert_eq!(error, "invalid_grant");
			assert_eq!(message, "Code expired.");
			assert_eq!(status, Some(400));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn exchange_code_returns_grant_with_expiry() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let strategy =
		build_reqwest_test_strategy(mock_options(&server.url(""), CLIENT_ID, CLIENT_SECRET));
	let session = strategy.start_authorization();
	let grant = strategy
		.exchange_code(session, "valid-code")
		.await
		.expect("Code exchange should succeed.");

	mock.assert_async().await;

	assert_eq!(grant.access_token.expose(), "access-token");
	assert_eq!(grant.refresh_token.as_ref().map(|secret| secret.expose()), Some("refresh-token"));
	assert_eq!(grant.expires_at.map(|at| at - grant.issued_at), Some(Duration::seconds(3600)));
}

#[tokio::test]
async fn pkce_sessions_carry_a_challenge() {
	let server = MockServer::start_async().await;
	let strategy = build_reqwest_test_strategy(
		mock_options(&server.url(""), CLIENT_ID, CLIENT_SECRET).pkce(true),
	);
	let session = strategy.start_authorization();
	let pairs = authorize_pairs(&session.authorize_url);

	assert_eq!(session.code_challenge_method(), Some(PkceCodeChallengeMethod::S256));
	assert_eq!(pairs.get("code_challenge").map(String::as_str), session.code_challenge());
	assert_eq!(pairs.get("code_challenge_method").map(String::as_str), Some("S256"));
}

#[tokio::test]
async fn authenticate_rejects_mismatched_state() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let strategy =
		build_reqwest_test_strategy(mock_options(&server.url(""), CLIENT_ID, CLIENT_SECRET));
	let session = strategy.start_authorization();
	let err = strategy
		.authenticate(session, "forged", "valid-code")
		.await
		.expect_err("Mismatched state must fail.");

	mock.assert_calls_async(0).await;

	assert!(matches!(err, Error::StateMismatch));
}
