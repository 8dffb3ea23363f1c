//! Canonical identity produced by every provider.

// self
use crate::{
	_prelude::*,
	auth::token::{record::Token, secret::TokenSecret},
	error::NormalizationError,
};

/// Identity fields a provider normalizer extracts from its payload.
///
/// Everything except `id` is best-effort and may be empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
	/// Provider-assigned subject identifier.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Login or handle.
	pub username: String,
	/// Email address.
	pub email: String,
	/// Absolute avatar URL.
	pub avatar_url: String,
}

/// Normalized, provider-agnostic user record.
///
/// Built once by the engine and never mutated afterwards; `id` is guaranteed non-empty, also
/// when the record is deserialized from a host's session store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredAuthUser")]
pub struct AuthUser {
	id: String,
	name: String,
	username: String,
	email: String,
	avatar_url: Option<Url>,
	access_token: TokenSecret,
	refresh_token: Option<TokenSecret>,
	expiry: Option<OffsetDateTime>,
	raw_user: JsonMap<String, JsonValue>,
}
impl TryFrom<StoredAuthUser> for AuthUser {
	type Error = NormalizationError;

	fn try_from(stored: StoredAuthUser) -> Result<Self, Self::Error> {
		let StoredAuthUser {
			id,
			name,
			username,
			email,
			avatar_url,
			access_token,
			refresh_token,
			expiry,
			raw_user,
		} = stored;

		if id.is_empty() {
			return Err(NormalizationError::MissingIdentifier { field: "id" });
		}

		Ok(Self {
			id,
			name,
			username,
			email,
			avatar_url,
			access_token,
			refresh_token,
			expiry,
			raw_user,
		})
	}
}
impl AuthUser {
	/// Combines a normalized profile with the decoded payload and the exchanged token.
	///
	/// Callers must have rejected empty identifiers already.
	pub(crate) fn assemble(
		profile: ProviderProfile,
		raw_user: JsonMap<String, JsonValue>,
		token: &Token,
	) -> Self {
		let ProviderProfile { id, name, username, email, avatar_url } = profile;
		// Avatars are cosmetic; anything that is not an absolute URL is dropped.
		let avatar_url = Url::parse(avatar_url.trim()).ok();

		Self {
			id,
			name,
			username,
			email,
			avatar_url,
			access_token: token.access_token.clone(),
			refresh_token: token.refresh_token.clone(),
			expiry: token.expiry,
			raw_user,
		}
	}

	/// Provider-assigned subject identifier.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Display name; empty when the provider omits it.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Login or handle; empty when the provider omits it.
	pub fn username(&self) -> &str {
		&self.username
	}

	/// Email address; empty when the provider omits it.
	pub fn email(&self) -> &str {
		&self.email
	}

	/// Avatar URL, when the provider supplied a valid absolute one.
	pub fn avatar_url(&self) -> Option<&Url> {
		self.avatar_url.as_ref()
	}

	/// Access token copied from the exchange.
	pub fn access_token(&self) -> &TokenSecret {
		&self.access_token
	}

	/// Refresh token copied from the exchange.
	pub fn refresh_token(&self) -> Option<&TokenSecret> {
		self.refresh_token.as_ref()
	}

	/// Access token expiry; `None` means unknown.
	pub fn expiry(&self) -> Option<OffsetDateTime> {
		self.expiry
	}

	/// Returns `true` if the expiry is known and lies at or before `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expiry.is_some_and(|expiry| instant >= expiry)
	}

	/// Full decoded provider payload.
	pub fn raw_user(&self) -> &JsonMap<String, JsonValue> {
		&self.raw_user
	}
}

/// Unchecked wire shape of [`AuthUser`].
#[derive(Deserialize)]
struct StoredAuthUser {
	id: String,
	name: String,
	username: String,
	email: String,
	avatar_url: Option<Url>,
	access_token: TokenSecret,
	refresh_token: Option<TokenSecret>,
	expiry: Option<OffsetDateTime>,
	raw_user: JsonMap<String, JsonValue>,
}
