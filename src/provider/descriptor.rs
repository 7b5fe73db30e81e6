//! Provider descriptor data structures and helpers.
//!
//! The module exposes validated metadata and supporting builder utilities so the strategy
//! can describe The City's endpoints in a transport-agnostic way.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use quirks::*;

// self
use crate::_prelude::*;

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
	/// Authorization endpoint users are redirected to.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// Endpoint returning the authenticated user's profile as JSON.
	pub profile: Url,
}

/// Immutable provider descriptor consumed by the strategy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderDescriptor {
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder; unset endpoints resolve to The City's defaults.
	pub fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new()
	}
}
