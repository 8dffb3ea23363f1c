//! Token returned by the authorization code exchange.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Credentials issued by a provider's token endpoint.
///
/// `expiry` is `None` when the provider did not announce a lifetime; that is "unknown", which
/// [`Token::is_expired_at`] never reports as expired.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Token type announced by the provider (usually `bearer`).
	pub token_type: Option<String>,
	/// Refresh token secret, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Absolute expiry derived from `expires_in` at exchange time.
	pub expiry: Option<OffsetDateTime>,
	/// OpenID Connect ID token, if the provider issued one.
	pub id_token: Option<TokenSecret>,
	/// Every non-standard field of the token response.
	#[serde(default)]
	pub extra: JsonMap<String, JsonValue>,
}
impl Token {
	/// Creates a token carrying only an access token.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			token_type: None,
			refresh_token: None,
			expiry: None,
			id_token: None,
			extra: JsonMap::new(),
		}
	}

	/// Sets the refresh token.
	pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the absolute expiry.
	pub fn with_expiry(mut self, expiry: OffsetDateTime) -> Self {
		self.expiry = Some(expiry);

		self
	}

	/// Sets the ID token.
	pub fn with_id_token(mut self, token: impl Into<String>) -> Self {
		self.id_token = Some(TokenSecret::new(token));

		self
	}

	/// Adds a non-standard token response field.
	pub fn with_extra(mut self, key: impl Into<String>, value: JsonValue) -> Self {
		self.extra.insert(key.into(), value);

		self
	}

	/// Returns `true` if the expiry is known and lies at or before `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expiry.is_some_and(|expiry| instant >= expiry)
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
