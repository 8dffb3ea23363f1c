//! Generic OpenID Connect provider.
//!
//! No profile endpoint is configured, so the identity comes from the standard claims of the
//! ID token returned by the exchange. Hosts must point the endpoints at their issuer.

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ProviderProfile, Scopes},
	error::NormalizationError,
	oauth,
	provider::{Provider, ProviderConfig},
};

/// Registry name.
pub const NAME: &str = "oidc";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Claims {
	sub: Option<String>,
	name: Option<String>,
	preferred_username: Option<String>,
	nickname: Option<String>,
	email: Option<String>,
	picture: Option<String>,
}

/// Factory for the generic OpenID Connect provider.
pub fn provider() -> Provider {
	let config = ProviderConfig::new("OpenID Connect")
		.with_pkce(true)
		.with_scopes(Scopes::from_static(&["openid", "profile", "email"]));

	Provider::new(ProviderId::from_static(NAME), config, normalize)
}

/// Maps standard OpenID Connect claims onto the canonical identity.
pub fn normalize(raw: &[u8]) -> Result<ProviderProfile, NormalizationError> {
	let claims: Claims = oauth::decode_json(raw)?;
	let id = claims
		.sub
		.filter(|sub| !sub.is_empty())
		.ok_or(NormalizationError::MissingIdentifier { field: "sub" })?;
	let username = claims
		.preferred_username
		.filter(|name| !name.is_empty())
		.or(claims.nickname)
		.unwrap_or_default();

	Ok(ProviderProfile {
		id,
		name: claims.name.unwrap_or_default(),
		username,
		email: claims.email.unwrap_or_default(),
		avatar_url: claims.picture.unwrap_or_default(),
	})
}
