// self
use crate::{_prelude::*, auth::TokenGrant, error::BoxError, profile::Profile};

/// Future returned by [`Verify::verify`].
pub type VerifyFuture<'a, U> =
	Pin<Box<dyn Future<Output = Result<Option<U>, BoxError>> + 'a + Send>>;

/// Application-supplied callback that turns tokens and a profile into a user.
///
/// Return `Ok(None)` to reject the login without an error. Any async closure of the shape
/// `Fn(TokenGrant, Profile) -> impl Future<Output = Result<Option<U>, BoxError>>`
/// implements the trait.
pub trait Verify: Send + Sync {
	/// Application user type.
	type User: Send;

	/// Looks up or creates the user behind `profile`.
	fn verify(&self, grant: TokenGrant, profile: Profile) -> VerifyFuture<'_, Self::User>;
}
impl<F, Fut, U> Verify for F
where
	F: Send + Sync + Fn(TokenGrant, Profile) -> Fut,
	Fut: 'static + Send + Future<Output = Result<Option<U>, BoxError>>,
	U: Send,
{
	type User = U;

	fn verify(&self, grant: TokenGrant, profile: Profile) -> VerifyFuture<'_, Self::User> {
		Box::pin(self(grant, profile))
	}
}
