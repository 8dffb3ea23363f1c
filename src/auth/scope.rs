//! Ordered scope lists requested from providers.

// std
use std::slice::Iter;
// crates.io
use serde::{Deserializer, Serializer, ser::SerializeSeq};
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
}

/// Ordered, de-duplicated list of OAuth scopes.
///
/// Providers are sensitive to the order scopes are sent in, so unlike a set the list keeps
/// the insertion order; repeated entries keep their first position.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Scopes(Vec<String>);
impl Scopes {
	/// Creates a validated scope list from any iterator.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut list = Vec::new();

		for scope in scopes {
			let scope = scope.into();

			validate(&scope)?;

			if !list.contains(&scope) {
				list.push(scope);
			}
		}

		Ok(Self(list))
	}

	/// Builds the defaults baked into a provider factory.
	pub(crate) fn from_static(scopes: &[&'static str]) -> Self {
		debug_assert!(scopes.iter().all(|scope| validate(scope).is_ok()));

		let mut list: Vec<String> = Vec::with_capacity(scopes.len());

		for scope in scopes {
			if !list.iter().any(|existing| existing == scope) {
				list.push((*scope).to_owned());
			}
		}

		Self(list)
	}

	/// Number of scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no scopes are requested.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if the list contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.iter().any(|candidate| candidate == scope)
	}

	/// Iterator over scopes in request order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|s| s.as_str())
	}

	/// Joins the scopes with the provider's delimiter; `None` when the list is empty.
	pub fn join(&self, delimiter: char) -> Option<String> {
		if self.0.is_empty() {
			return None;
		}

		let mut buf = String::new();

		for (idx, value) in self.0.iter().enumerate() {
			if idx > 0 {
				buf.push(delimiter);
			}

			buf.push_str(value);
		}

		Some(buf)
	}

	/// Returns the underlying slice of scope strings.
	pub fn as_slice(&self) -> &[String] {
		&self.0
	}
}
impl Debug for Scopes {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Scopes").field(&self.0).finish()
	}
}
impl Display for Scopes {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0.join(" "))
	}
}

/// Iterator over scope strings.
pub struct ScopeIter<'a> {
	inner: Iter<'a, String>,
}
impl<'a> Iterator for ScopeIter<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(|s| s.as_str())
	}
}
impl<'a> IntoIterator for &'a Scopes {
	type IntoIter = ScopeIter<'a>;
	type Item = &'a str;

	fn into_iter(self) -> Self::IntoIter {
		ScopeIter { inner: self.0.iter() }
	}
}
impl TryFrom<Vec<String>> for Scopes {
	type Error = ScopeValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for Scopes {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}
		if s.chars().all(char::is_whitespace) {
			return Err(ScopeValidationError::Empty);
		}

		Self::new(s.split_whitespace())
	}
}
impl Serialize for Scopes {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.0.len()))?;

		for scope in self.0.iter() {
			seq.serialize_element(scope)?;
		}

		seq.end()
	}
}
impl<'de> Deserialize<'de> for Scopes {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<String>>::deserialize(deserializer)?;

		Self::new(values).map_err(serde::de::Error::custom)
	}
}

fn validate(scope: &str) -> Result<(), ScopeValidationError> {
	if scope.is_empty() {
		return Err(ScopeValidationError::Empty);
	}
	if scope.chars().any(char::is_whitespace) {
		return Err(ScopeValidationError::ContainsWhitespace { scope: scope.to_owned() });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn order_is_preserved_and_duplicates_dropped() {
		let scopes = Scopes::new(["openid", "profile", "openid", "email"])
			.expect("Scope fixture should be valid.");

		assert_eq!(scopes.iter().collect::<Vec<_>>(), ["openid", "profile", "email"]);
		assert_eq!(scopes.len(), 3);
		assert!(scopes.contains("profile"));
		assert!(!scopes.contains("offline_access"));
	}

	#[test]
	fn join_honors_custom_delimiters() {
		let scopes = Scopes::new(["email", "profile"]).expect("Scope fixture should be valid.");

		assert_eq!(scopes.join(' '), Some("email profile".into()));
		assert_eq!(scopes.join(','), Some("email,profile".into()));
		assert_eq!(Scopes::default().join(' '), None);
	}

	#[test]
	fn invalid_entries_are_rejected() {
		assert_eq!(Scopes::new([""]), Err(ScopeValidationError::Empty));
		assert_eq!(
			Scopes::new(["read user"]),
			Err(ScopeValidationError::ContainsWhitespace { scope: "read user".into() })
		);
		assert_eq!(Scopes::from_str("   "), Err(ScopeValidationError::Empty));
	}

	#[test]
	fn parses_and_serializes_as_sequences() {
		let scopes = Scopes::from_str("read:user user:email").expect("Scopes should parse.");

		assert_eq!(scopes.as_slice(), ["read:user", "user:email"]);

		let json = serde_json::to_string(&scopes).expect("Scopes should serialize.");

		assert_eq!(json, "[\"read:user\",\"user:email\"]");

		let back: Scopes = serde_json::from_str(&json).expect("Scopes should deserialize.");

		assert_eq!(back, scopes);
		assert!(serde_json::from_str::<Scopes>("[\"bad scope\"]").is_err());
	}
}
