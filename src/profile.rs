//! Normalized user profiles built from The City's profile payload.
//!
//! The provider has shipped two payload shapes. [`ProfileContract::GlobalUser`] reads the
//! `global_user` object (`id`, `first`, `last`, `email`); [`ProfileContract::Response`]
//! keeps the older `response` envelope and extracts nothing. Both keep the exact body and
//! the parsed JSON so callers can reach fields the normalized shape does not cover.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, provider::STRATEGY_NAME};

/// Payload shape returned by the profile endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileContract {
	/// `{"global_user": {"id": ..., "first": ..., "last": ..., "email": ...}}`.
	#[default]
	GlobalUser,
	/// `{"response": {...}}`; no structured fields are extracted.
	Response,
}
impl ProfileContract {
	/// Returns the top-level key the contract reads.
	pub const fn envelope(self) -> &'static str {
		match self {
			ProfileContract::GlobalUser => "global_user",
			ProfileContract::Response => "response",
		}
	}
}

/// Given and family name parts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileName {
	/// First name.
	pub given_name: Option<String>,
	/// Last name.
	pub family_name: Option<String>,
}

/// Provider-agnostic profile handed to the verify callback.
///
/// Built fresh on every fetch and never cached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
	/// Always [`STRATEGY_NAME`].
	pub provider: String,
	/// Provider-assigned user identifier, rendered as a string.
	pub id: Option<String>,
	/// `first last`, when either part is present.
	pub display_name: Option<String>,
	/// Name parts.
	pub name: ProfileName,
	/// Email addresses.
	pub emails: Vec<String>,
	/// Exact response body.
	pub raw: String,
	/// Fully parsed response body.
	pub parsed: Value,
}
impl Profile {
	/// Parses `raw` and extracts the fields `contract` defines.
	///
	/// Only a body that is not JSON fails; missing fields leave the normalized values empty.
	pub fn parse(raw: String, contract: ProfileContract) -> Result<Self, serde_json::Error> {
		let parsed: Value = serde_json::from_str(&raw)?;
		let mut profile = Self {
			provider: STRATEGY_NAME.into(),
			id: None,
			display_name: None,
			name: ProfileName::default(),
			emails: Vec::new(),
			raw,
			parsed,
		};

		if let ProfileContract::GlobalUser = contract {
			profile.extract_global_user();
		}

		Ok(profile)
	}

	/// Returns the contract's envelope object (`global_user` or `response`), if present.
	pub fn envelope(&self, contract: ProfileContract) -> Option<&Value> {
		self.parsed.get(contract.envelope())
	}

	fn extract_global_user(&mut self) {
		let Some(user) = self.parsed.get(ProfileContract::GlobalUser.envelope()) else {
			return;
		};
		let id = user.get("id").and_then(scalar_to_string);
		let given_name = user.get("first").and_then(non_empty_str);
		let family_name = user.get("last").and_then(non_empty_str);
		let display_name = match (&given_name, &family_name) {
			(Some(first), Some(last)) => Some(format!("{first} {last}")),
			(Some(part), None) | (None, Some(part)) => Some(part.clone()),
			(None, None) => None,
		};
		let emails = user.get("email").and_then(non_empty_str).into_iter().collect();

		self.id = id;
		self.display_name = display_name;
		self.name = ProfileName { given_name, family_name };
		self.emails = emails;
	}
}

fn scalar_to_string(value: &Value) -> Option<String> {
	match value {
		Value::String(s) if !s.is_empty() => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

fn non_empty_str(value: &Value) -> Option<String> {
	value.as_str().filter(|s| !s.is_empty()).map(str::to_owned)
}
