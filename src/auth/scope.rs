//! Ordered scope lists joined with the provider's scope separator.

// std
use std::{collections::HashSet, slice::Iter};
// self
use crate::_prelude::*;

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
	/// A scope would be split in two once joined with the separator.
	#[error("Scope `{scope}` contains the scope separator `{delimiter}`.")]
	ContainsDelimiter {
		/// The offending scope string.
		scope: String,
		/// Separator configured for the provider.
		delimiter: char,
	},
}

/// Requested OAuth scopes in caller order.
///
/// Duplicates are dropped (the first occurrence wins); otherwise the order callers supplied
/// is what ends up in the separator-joined `scope` parameter.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ScopeList(Arc<[String]>);
impl ScopeList {
	/// Creates a validated scope list from any iterator.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut seen = HashSet::new();
		let mut ordered = Vec::new();

		for scope in scopes {
			let owned: String = scope.into();

			if owned.is_empty() {
				return Err(ScopeValidationError::Empty);
			}
			if owned.chars().any(char::is_whitespace) {
				return Err(ScopeValidationError::ContainsWhitespace { scope: owned });
			}
			if seen.insert(owned.clone()) {
				ordered.push(owned);
			}
		}

		Ok(Self(Arc::from(ordered)))
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no scopes are requested.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterator over scopes in request order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|s| s.as_str())
	}

	/// Returns the underlying slice of scope strings.
	pub fn as_slice(&self) -> &[String] {
		&self.0
	}

	/// Rejects scopes that contain `delimiter`.
	pub fn ensure_delimiter_free(&self, delimiter: char) -> Result<(), ScopeValidationError> {
		match self.0.iter().find(|scope| scope.contains(delimiter)) {
			Some(scope) =>
				Err(ScopeValidationError::ContainsDelimiter { scope: scope.clone(), delimiter }),
			None => Ok(()),
		}
	}

	/// Joins the scopes with `delimiter`, or `None` when nothing was requested.
	pub fn join(&self, delimiter: char) -> Option<String> {
		if self.is_empty() {
			return None;
		}

		let mut buf = String::new();

		for (idx, value) in self.iter().enumerate() {
			if idx > 0 {
				buf.push(delimiter);
			}

			buf.push_str(value);
		}

		Some(buf)
	}
}
impl Default for ScopeList {
	fn default() -> Self {
		Self(Arc::from(Vec::new()))
	}
}
impl Debug for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeList").field(&self.0).finish()
	}
}
impl TryFrom<Vec<String>> for ScopeList {
	type Error = ScopeValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl From<ScopeList> for Vec<String> {
	fn from(value: ScopeList) -> Self {
		value.0.to_vec()
	}
}
impl<'a> IntoIterator for &'a ScopeList {
	type IntoIter = Iter<'a, String>;
	type Item = &'a String;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}
