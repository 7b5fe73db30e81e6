// self
use crate::profile::ProfileContract;

/// Provider-specific quirks that influence how the strategy behaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProviderQuirks {
	/// Indicates whether a PKCE S256 challenge is attached to authorization requests.
	pub pkce_required: bool,
	/// Character used to join scopes when constructing `scope` parameters.
	pub scope_delimiter: char,
	/// Shape of the profile payload and which fields get extracted from it.
	pub profile_contract: ProfileContract,
}
impl ProviderQuirks {
	/// The City joins requested scopes with a comma.
	pub const DEFAULT_SCOPE_DELIMITER: char = ',';
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self {
			pkce_required: false,
			scope_delimiter: Self::DEFAULT_SCOPE_DELIMITER,
			profile_contract: ProfileContract::default(),
		}
	}
}
