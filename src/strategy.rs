//! The City authentication strategy.
//!
//! [`TheCityStrategy`] wraps the `oauth2` engine. The engine owns the
//! token protocol while the strategy contributes the provider name, endpoint defaults,
//! header policy, and the profile fetch. A host framework drives it in three steps:
//! [`start_authorization`](TheCityStrategy::start_authorization) before redirecting the
//! user, then [`authenticate`](TheCityStrategy::authenticate) on the callback, which
//! exchanges the code, loads the profile, and hands both to the [`Verify`] callback.

mod session;
mod verify;

pub use session::*;
pub use verify::*;

// crates.io
use oauth2::{
	AsyncHttpClient,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION},
	},
};
// self
use crate::{
	_prelude::*,
	auth::TokenGrant,
	config::StrategyConfig,
	error::{ConfigError, TransportError, UnexpectedStatus},
	http::{ProviderHttpClient, ResponseMetadataSlot},
	oauth::{self, BasicFacade},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	profile::Profile,
	provider::STRATEGY_NAME,
};
#[cfg(feature = "reqwest")] use crate::{config::StrategyOptions, http::ReqwestHttpClient};

#[cfg(feature = "reqwest")]
/// Strategy specialized for the crate's default reqwest transport.
pub type ReqwestStrategy<V> = TheCityStrategy<V, ReqwestHttpClient>;

/// OAuth 2.0 strategy for The City.
///
/// Holds only immutable state, so one instance can serve any number of concurrent logins;
/// every profile fetch is an independent request.
pub struct TheCityStrategy<V, C>
where
	C: ?Sized + ProviderHttpClient,
{
	config: StrategyConfig,
	facade: BasicFacade<C>,
	verify: V,
}
impl<V, C> TheCityStrategy<V, C>
where
	V: Verify,
	C: ?Sized + ProviderHttpClient,
{
	/// Creates a strategy that reuses the caller-provided transport.
	pub fn with_http_client(
		config: StrategyConfig,
		verify: V,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let facade = BasicFacade::from_config(&config, http_client.into());

		Self { config, facade, verify }
	}

	/// Name the strategy registers under.
	pub fn name(&self) -> &'static str {
		STRATEGY_NAME
	}

	/// Immutable configuration the strategy was built from.
	pub fn config(&self) -> &StrategyConfig {
		&self.config
	}

	/// Generates `state` (and a PKCE pair when enabled) plus the authorize URL.
	pub fn start_authorization(&self) -> AuthorizationSession {
		let _guard = FlowSpan::new(FlowKind::Authorization, "start_authorization").entered();

		obs::record_flow_outcome(FlowKind::Authorization, FlowOutcome::Attempt);

		let session = session::build_session(&self.config);

		obs::record_flow_outcome(FlowKind::Authorization, FlowOutcome::Success);

		session
	}

	/// Exchanges an authorization code at the token endpoint.
	pub async fn exchange_code(
		&self,
		session: AuthorizationSession,
		code: &str,
	) -> Result<TokenGrant> {
		const KIND: FlowKind = FlowKind::TokenExchange;

		let span = FlowSpan::new(KIND, "exchange_code");
		let meta = ResponseMetadataSlot::default();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(self.facade.exchange_authorization_code(
				code,
				session.pkce_verifier(),
				meta.clone(),
			))
			.await;

		if let Some(status) = meta.status() {
			span.record_status(status);
		}

		obs::record_flow_result(KIND, &result);

		result
	}

	/// Fetches and normalizes the profile of the user `access_token` belongs to.
	///
	/// Performs exactly one GET per call; nothing is cached or retried. Transport failures
	/// and non-success statuses surface as [`Error::Transport`], bodies that are not JSON
	/// as [`Error::Parse`].
	pub async fn user_profile(&self, access_token: &str) -> Result<Profile> {
		const KIND: FlowKind = FlowKind::Profile;

		let span = FlowSpan::new(KIND, "user_profile");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.fetch_profile(access_token, &span)).await;

		obs::record_flow_result(KIND, &result);

		result
	}

	/// Completes a login: checks `state`, exchanges `code`, loads the profile, and runs the
	/// verify callback.
	///
	/// `Ok(None)` means the callback rejected the credentials.
	pub async fn authenticate(
		&self,
		session: AuthorizationSession,
		returned_state: &str,
		code: &str,
	) -> Result<Option<V::User>> {
		session.validate_state(returned_state)?;

		let grant = self.exchange_code(session, code).await?;
		let profile = self.user_profile(grant.access_token.expose()).await?;

		self.verify.verify(grant, profile).await.map_err(Error::verification)
	}

	async fn fetch_profile(&self, access_token: &str, span: &FlowSpan) -> Result<Profile> {
		let request = Request::builder()
			.method(Method::GET)
			.uri(self.config.user_profile_url().as_str())
			.header(AUTHORIZATION, format!("Bearer {access_token}"))
			.header(ACCEPT, "application/json")
			.body(Vec::new())
			.map_err(ConfigError::from)?;
		let handle = self.facade.handle(ResponseMetadataSlot::default());
		let response = handle
			.call(request)
			.await
			.map_err(|err| oauth::map_transport_error(FlowKind::Profile, err))?;
		let status = response.status();

		span.record_status(status.as_u16());

		let body = String::from_utf8_lossy(response.body()).into_owned();

		if !status.is_success() {
			return Err(TransportError::profile(UnexpectedStatus { status: status.as_u16(), body })
				.into());
		}

		Ok(Profile::parse(body, self.config.profile_contract())?)
	}
}
#[cfg(feature = "reqwest")]
impl<V> TheCityStrategy<V, ReqwestHttpClient>
where
	V: Verify,
{
	/// Creates a strategy with its own reqwest transport (redirects disabled).
	pub fn new(config: StrategyConfig, verify: V) -> Result<Self> {
		let http_client = ReqwestHttpClient::without_redirects()?;

		Ok(Self::with_http_client(config, verify, http_client))
	}

	/// Validates `options` and creates a reqwest-backed strategy.
	pub fn from_options(options: StrategyOptions, verify: V) -> Result<Self> {
		Self::new(StrategyConfig::from_options(options)?, verify)
	}
}
impl<V, C> Debug for TheCityStrategy<V, C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TheCityStrategy")
			.field("name", &STRATEGY_NAME)
			.field("config", &self.config)
			.finish()
	}
}
