//! Builds a strategy from JSON options, starts an authorization request, and checks the
//! `state` the callback handler would receive.

// std
use std::collections::HashMap;
// crates.io
use color_eyre::Result;
// self
use oauth2_thecity::{
	auth::TokenGrant,
	config::StrategyOptions,
	error::BoxError,
	profile::Profile,
	strategy::ReqwestStrategy,
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let options = StrategyOptions::from_json(
		r#"{
			"clientID": "demo-client",
			"clientSecret": "demo-secret",
			"callbackURL": "https://app.example.com/auth/thecity/callback",
			"scope": ["user", "group"],
			"userAgent": "thecity-demo/0.1"
		}"#,
	)?;
	let verify = |_grant: TokenGrant, profile: Profile| async move {
		Ok::<_, BoxError>(profile.display_name)
	};
	let strategy = ReqwestStrategy::from_options(options, verify)?;
	let session = strategy.start_authorization();

	println!("Strategy `{}` is ready.", strategy.name());
	println!("Send your user to {}.", &session.authorize_url);

	let mut sessions = HashMap::new();

	sessions.insert(session.state.clone(), session.clone());

	// Simulate the redirect handler looking up the stored session by `state`.
	let returned_state = session.state.clone();

	if let Some(stashed) = sessions.remove(&returned_state) {
		stashed.validate_state(&returned_state)?;
		println!("Validated state; pass the session and `code` to TheCityStrategy::authenticate.");
	} else {
		eprintln!("State `{returned_state}` was not recognized.");
	}

	Ok(())
}
