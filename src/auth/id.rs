//! Strongly typed provider names.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("Provider identifier cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Provider identifier contains whitespace.")]
	ContainsWhitespace,
	/// The identifier exceeded the allowed character count.
	#[error("Provider identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Registry name of an identity provider (`nextcloud`, `oidc`, ...).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderId(String);
impl ProviderId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}

	/// Wraps a name baked into a provider factory.
	///
	/// Factories cannot fail, so the literal is trusted; debug builds still validate it.
	pub(crate) fn from_static(value: &'static str) -> Self {
		debug_assert!(validate_view(value).is_ok(), "Built-in provider name `{value}` is invalid.");

		Self(value.to_owned())
	}
}
impl Deref for ProviderId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ProviderId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<ProviderId> for String {
	fn from(value: ProviderId) -> Self {
		value.0
	}
}
impl TryFrom<String> for ProviderId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl Borrow<str> for ProviderId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for ProviderId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Provider({})", self.0)
	}
}
impl Display for ProviderId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for ProviderId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

fn validate_view(view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace);
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_whitespace_and_empty_values() {
		assert_eq!(ProviderId::new(" nextcloud"), Err(IdentifierError::ContainsWhitespace));
		assert_eq!(ProviderId::new("next cloud"), Err(IdentifierError::ContainsWhitespace));
		assert_eq!(ProviderId::new(""), Err(IdentifierError::Empty));

		let id = ProviderId::new("nextcloud").expect("Provider fixture should be valid.");

		assert_eq!(id.as_ref(), "nextcloud");
		assert_eq!(format!("{id:?}"), "Provider(nextcloud)");
	}

	#[test]
	fn length_limit_is_enforced() {
		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		ProviderId::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(IDENTIFIER_MAX_LEN + 1);

		assert_eq!(
			ProviderId::new(&too_long),
			Err(IdentifierError::TooLong { max: IDENTIFIER_MAX_LEN })
		);
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let id: ProviderId =
			serde_json::from_str("\"oidc\"").expect("Provider should deserialize successfully.");

		assert_eq!(id.as_ref(), "oidc");
		assert!(serde_json::from_str::<ProviderId>("\"with space\"").is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: BTreeMap<ProviderId, u8> = BTreeMap::from_iter([(
			ProviderId::new("nextcloud").expect("Provider used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("nextcloud"), Some(&7));
	}
}
