//! Facade over the `oauth2` crate, the engine that performs the authorization-code exchange.
//!
//! The strategy never speaks the token protocol itself: it configures a [`BasicClient`]
//! with The City's endpoints and client credentials and maps the engine's errors into the
//! crate taxonomy.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, PkceCodeVerifier, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError, BasicTokenResponse},
	http::HeaderMap,
};
// self
use crate::{
	_prelude::*,
	auth::TokenGrant,
	config::StrategyConfig,
	error::{ConfigError, TokenError, TransportError},
	http::{HeaderedHandle, ProviderHttpClient, ResponseMetadataSlot},
	obs::FlowKind,
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

pub(crate) struct BasicFacade<C>
where
	C: ?Sized + ProviderHttpClient,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	headers: HeaderMap,
}
impl<C> BasicFacade<C>
where
	C: ?Sized + ProviderHttpClient,
{
	pub(crate) fn from_config(config: &StrategyConfig, http_client: Arc<C>) -> Self {
		let endpoints = &config.descriptor.endpoints;
		// The City expects client credentials in the form body, not via HTTP Basic.
		let mut oauth_client = BasicClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.expose().to_owned()))
			.set_auth_uri(AuthUrl::from_url(endpoints.authorization.clone()))
			.set_token_uri(TokenUrl::from_url(endpoints.token.clone()))
			.set_auth_type(AuthType::RequestBody);

		if let Some(callback) = &config.callback_url {
			oauth_client = oauth_client.set_redirect_uri(RedirectUrl::from_url(callback.clone()));
		}

		Self { oauth_client, http_client, headers: config.custom_headers.clone() }
	}

	/// Handle carrying the configured custom headers.
	pub(crate) fn handle(&self, slot: ResponseMetadataSlot) -> HeaderedHandle<C::Handle> {
		HeaderedHandle::new(self.http_client.with_metadata(slot), self.headers.clone())
	}

	pub(crate) async fn exchange_authorization_code(
		&self,
		code: &str,
		pkce_verifier: Option<&str>,
		meta: ResponseMetadataSlot,
	) -> Result<TokenGrant> {
		let handle = self.handle(meta.clone());
		let mut request = self.oauth_client.exchange_code(AuthorizationCode::new(code.to_owned()));

		if let Some(verifier) = pkce_verifier {
			request = request.set_pkce_verifier(PkceCodeVerifier::new(verifier.to_owned()));
		}

		let response = request
			.request_async(&handle)
			.await
			.map_err(|err| map_request_error(meta.status(), err))?;

		map_token_response(response)
	}
}

/// Maps a transport failure on `flow` into the crate taxonomy.
pub(crate) fn map_transport_error<E>(flow: FlowKind, err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		other => match flow {
			FlowKind::Profile => TransportError::profile(other).into(),
			FlowKind::Authorization | FlowKind::TokenExchange =>
				TransportError::token(other).into(),
		},
	}
}

fn map_token_response(response: BasicTokenResponse) -> Result<TokenGrant> {
	let mut grant = TokenGrant::new(response.access_token().secret().to_owned());

	if let Some(refresh) = response.refresh_token() {
		grant = grant.with_refresh_token(refresh.secret().to_owned());
	}
	if let Some(expires_in) = response.expires_in() {
		grant = grant.with_expires_in(expires_in)?;
	}

	Ok(grant)
}

fn map_request_error<E>(
	status: Option<u16>,
	err: BasicRequestTokenError<HttpClientError<E>>,
) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		RequestTokenError::ServerResponse(response) => {
			let error = response.error().as_ref().to_owned();
			let message = response.error_description().cloned().unwrap_or_else(|| error.clone());

			TokenError::Rejected { error, message, status }.into()
		},
		RequestTokenError::Request(error) => map_transport_error(FlowKind::TokenExchange, error),
		RequestTokenError::Parse(source, _body) =>
			TokenError::MalformedResponse { source, status }.into(),
		RequestTokenError::Other(message) => TokenError::Unexpected { message, status }.into(),
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{config::StrategyOptions, http::ReqwestHttpClient};

	#[test]
	fn builds_client_with_and_without_callback() {
		let config = StrategyOptions::new("ABC123", "secret")
			.build()
			.expect("Minimal options should build.");
		let facade = BasicFacade::from_config(&config, Arc::new(ReqwestHttpClient::default()));

		assert_eq!(facade.oauth_client.auth_uri().url(), config.authorization_url());
		assert!(facade.oauth_client.redirect_uri().is_none());

		let config = StrategyOptions::new("ABC123", "secret")
			.callback_url("https://www.example.net/auth/thecity/callback")
			.build()
			.expect("Options with callback should build.");
		let facade = BasicFacade::from_config(&config, Arc::new(ReqwestHttpClient::default()));

		assert_eq!(
			facade.oauth_client.redirect_uri().map(|uri| uri.as_str()),
			Some("https://www.example.net/auth/thecity/callback")
		);
	}

	#[test]
	fn transport_errors_are_tagged_by_flow() {
		let err: HttpClientError<std::io::Error> = HttpClientError::Other("reset".into());

		assert!(matches!(
			map_transport_error(FlowKind::Profile, err),
			Error::Transport(TransportError::Profile { .. })
		));

		let err: HttpClientError<std::io::Error> = HttpClientError::Other("reset".into());

		assert!(matches!(
			map_transport_error(FlowKind::TokenExchange, err),
			Error::Transport(TransportError::Token { .. })
		));
	}
}
