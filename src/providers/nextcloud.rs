//! Nextcloud (self-hosted) OAuth 2.0 provider.
//!
//! The default endpoints point at a placeholder host; deployments override them with
//! [`Provider::with_auth_url`] and friends, or through
//! [`ProviderOverrides`](crate::ProviderOverrides).

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ProviderProfile, Scopes},
	error::NormalizationError,
	oauth,
	provider::{Provider, ProviderConfig, ProviderQuirks},
};

/// Registry name.
pub const NAME: &str = "nextcloud";

const AUTH_URL: &str = "https://nextcloud.your.domain/apps/oauth2/authorize";
const TOKEN_URL: &str = "https://nextcloud.your.domain/apps/oauth2/api/v1/token";
const USER_INFO_URL: &str = "https://nextcloud.your.domain/ocs/v2.php/cloud/user?format=json";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Envelope {
	ocs: Ocs,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Ocs {
	data: UserData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserData {
	id: Option<String>,
	displayname: Option<String>,
	email: Option<String>,
}

/// Factory for the Nextcloud provider.
pub fn provider() -> Provider {
	let config = ProviderConfig::new("Nextcloud")
		.with_pkce(true)
		.with_scopes(Scopes::from_static(&["read:user", "user:email"]))
		.with_auth_url(AUTH_URL)
		.with_token_url(TOKEN_URL)
		.with_user_info_url(USER_INFO_URL)
		// OCS endpoints refuse requests without this header.
		.with_quirks(ProviderQuirks::default().with_user_info_header("OCS-APIRequest", "true"));

	Provider::new(ProviderId::from_static(NAME), config, normalize)
}

/// Maps the OCS `cloud/user` envelope onto the canonical identity.
///
/// Nextcloud has no separate login handle, so the user id doubles as the username.
pub fn normalize(raw: &[u8]) -> Result<ProviderProfile, NormalizationError> {
	let Envelope { ocs: Ocs { data } } = oauth::decode_json(raw)?;
	let id = data
		.id
		.filter(|id| !id.is_empty())
		.ok_or(NormalizationError::MissingIdentifier { field: "ocs.data.id" })?;

	Ok(ProviderProfile {
		username: id.clone(),
		id,
		name: data.displayname.unwrap_or_default(),
		email: data.email.unwrap_or_default(),
		avatar_url: String::new(),
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn factory_carries_nextcloud_defaults() {
		let provider = provider();
		let config = provider.config();

		assert_eq!(provider.id().as_ref(), "nextcloud");
		assert_eq!(config.display_name(), "Nextcloud");
		assert!(config.pkce());
		assert_eq!(config.scopes().as_slice(), ["read:user", "user:email"]);
		assert_eq!(config.auth_url(), AUTH_URL);
		assert_eq!(config.token_url(), TOKEN_URL);
		assert_eq!(config.user_info_url(), USER_INFO_URL);
		assert_eq!(
			config.quirks().user_info_headers,
			[("OCS-APIRequest".to_owned(), "true".to_owned())]
		);
		assert!(config.client_id().is_none());
		assert!(config.client_secret().is_none());
		assert!(config.redirect_url().is_none());
	}

	#[test]
	fn envelope_is_normalized() {
		let raw = br#"{"ocs":{"meta":{"status":"ok"},"data":{"id":"u1","displayname":"Jane Doe","email":"jane@example.test"}}}"#;
		let profile = normalize(raw).expect("Envelope should normalize.");

		assert_eq!(
			profile,
			ProviderProfile {
				id: "u1".into(),
				name: "Jane Doe".into(),
				username: "u1".into(),
				email: "jane@example.test".into(),
				avatar_url: String::new(),
			}
		);
	}

	#[test]
	fn missing_email_is_not_an_error() {
		let profile = normalize(br#"{"ocs":{"data":{"id":"u2","email":null}}}"#)
			.expect("Null email should normalize.");

		assert_eq!(profile.id, "u2");
		assert_eq!(profile.email, "");
		assert_eq!(profile.name, "");
	}

	#[test]
	fn missing_identifier_is_rejected() {
		let cases: [&[u8]; 3] = [
			b"{}",
			br#"{"ocs":{"data":{"displayname":"Jane"}}}"#,
			br#"{"ocs":{"data":{"id":""}}}"#,
		];

		for raw in cases {
			let err = normalize(raw).expect_err("Payloads without id should fail.");

			assert!(matches!(err, NormalizationError::MissingIdentifier { field: "ocs.data.id" }));
		}
	}

	#[test]
	fn wrongly_typed_wrappers_fail_to_decode() {
		let err = normalize(br#"{"ocs":{"data":"u1"}}"#).expect_err("String data should fail.");

		match err {
			NormalizationError::Decode(e) => assert_eq!(e.path().to_string(), "ocs.data"),
			other => panic!("Unexpected error: {other:?}"),
		}
		assert!(matches!(normalize(b"not json"), Err(NormalizationError::Decode(_))));
	}
}
