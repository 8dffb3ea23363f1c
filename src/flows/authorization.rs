//! Authorization URL construction with state and PKCE handling.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	obs::{FlowSpan, FlowStage},
	provider::Provider,
};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// Supported PKCE challenge methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Secret PKCE verifier that must be presented at the code exchange.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PkceVerifier(String);
impl PkceVerifier {
	/// Wraps a verifier the host persisted between the redirect and the callback.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the verifier. Callers must avoid logging it.
	pub fn secret(&self) -> &str {
		&self.0
	}

	/// `BASE64URL-NOPAD(SHA256(verifier))`.
	pub fn challenge(&self) -> String {
		let digest = Sha256::digest(self.0.as_bytes());

		URL_SAFE_NO_PAD.encode(digest)
	}

	fn generate() -> Self {
		Self(random_string(PKCE_VERIFIER_LEN))
	}
}
impl Debug for PkceVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PkceVerifier(<redacted>)")
	}
}

/// Result of [`Provider::build_auth_url`].
///
/// The engine keeps nothing: the host stores the session (state and verifier) until the
/// provider redirects back, then hands it to [`Provider::authenticate`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationSession {
	provider: ProviderId,
	authorize_url: Url,
	state: String,
	pkce: Option<PkceVerifier>,
}
impl AuthorizationSession {
	/// Provider the session was started for.
	pub fn provider(&self) -> &ProviderId {
		&self.provider
	}

	/// URL the end user must be sent to.
	pub fn authorize_url(&self) -> &Url {
		&self.authorize_url
	}

	/// Opaque state that must round-trip through the redirect.
	pub fn state(&self) -> &str {
		&self.state
	}

	/// PKCE verifier, when the provider uses PKCE.
	pub fn pkce_verifier(&self) -> Option<&PkceVerifier> {
		self.pkce.as_ref()
	}

	/// PKCE challenge embedded in the authorization URL.
	pub fn code_challenge(&self) -> Option<String> {
		self.pkce.as_ref().map(PkceVerifier::challenge)
	}

	/// Checks the `state` returned through the redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state {
			Ok(())
		} else {
			Err(Error::StateMismatch { provider: self.provider.clone() })
		}
	}

	pub(crate) fn into_verifier(self) -> Option<PkceVerifier> {
		self.pkce
	}
}
impl Debug for AuthorizationSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationSession")
			.field("provider", &self.provider)
			.field("authorize_url", &self.authorize_url.as_str())
			.field("state", &self.state)
			.field("pkce", &self.pkce.is_some())
			.finish()
	}
}

/// Generates a random 32-character state for hosts without their own CSRF token.
pub fn generate_state() -> String {
	random_string(STATE_LEN)
}

impl Provider {
	/// Builds the URL the end user is redirected to.
	///
	/// An empty `state` is replaced by [`generate_state`]. The query carries `response_type`,
	/// `client_id`, `redirect_uri`, `scope` (omitted when no scopes are configured), `state`,
	/// the PKCE challenge when enabled, and finally `extra` in the given order.
	pub fn build_auth_url<I, K, V>(&self, state: impl Into<String>, extra: I) -> Result<AuthorizationSession>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		const STAGE: FlowStage = FlowStage::AuthorizationUrl;

		let span = FlowSpan::begin(self.id(), STAGE);
		let _guard = span.enter();
		let result = self.authorization_session(state.into(), extra);

		span.finish(&result);

		result
	}

	fn authorization_session<I, K, V>(&self, state: String, extra: I) -> Result<AuthorizationSession>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let id = self.id();
		let config = self.config();

		config.ensure_ready(id, FlowStage::AuthorizationUrl)?;

		let client_id = config.ready_client_id(id)?;
		let redirect_uri = config.ready_redirect_url(id)?;
		let mut authorize_url = config.auth_endpoint(id)?;
		let state = if state.is_empty() { generate_state() } else { state };
		let pkce = config.pkce().then(PkceVerifier::generate);

		{
			let mut pairs = authorize_url.query_pairs_mut();

			pairs.append_pair("response_type", "code");
			pairs.append_pair("client_id", client_id);
			pairs.append_pair("redirect_uri", redirect_uri);

			if let Some(scope) = config.scopes().join(config.quirks().scope_delimiter) {
				pairs.append_pair("scope", &scope);
			}

			pairs.append_pair("state", &state);

			if let Some(verifier) = &pkce {
				pairs.append_pair("code_challenge", &verifier.challenge());
				pairs.append_pair("code_challenge_method", PkceCodeChallengeMethod::S256.as_str());
			}

			for (key, value) in extra {
				pairs.append_pair(key.as_ref(), value.as_ref());
			}
		}

		Ok(AuthorizationSession { provider: id.clone(), authorize_url, state, pkce })
	}
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}
