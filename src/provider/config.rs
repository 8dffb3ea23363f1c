//! Provider configuration: defaults baked into factories plus host-injected credentials.

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, Scopes, TokenSecret},
	error::ConfigError,
	obs::FlowStage,
};

/// HTTP method used to call the profile endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserInfoMethod {
	#[default]
	/// `GET` with the bearer token in the `Authorization` header.
	Get,
	/// `POST` with the bearer token in the `Authorization` header and an empty body.
	Post,
}

/// Per-provider deviations from the plain OAuth 2.0 wire format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Character used to join scopes in the `scope` parameter.
	pub scope_delimiter: char,
	/// Method used for the profile request.
	pub user_info_method: UserInfoMethod,
	/// Extra headers sent with the profile request.
	pub user_info_headers: Vec<(String, String)>,
}
impl ProviderQuirks {
	/// Adds an extra profile request header.
	pub fn with_user_info_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.user_info_headers.push((name.into(), value.into()));

		self
	}
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self {
			scope_delimiter: ' ',
			user_info_method: UserInfoMethod::default(),
			user_info_headers: Vec::new(),
		}
	}
}

/// Configuration of one provider instance.
///
/// Factories fill in the provider defaults and leave credentials empty; hosts inject the rest
/// through the `with_*` setters or [`ProviderConfig::apply`]. Endpoint URLs are kept as
/// strings and validated when a flow uses them, so a factory can never fail.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
	display_name: String,
	pkce: bool,
	scopes: Scopes,
	auth_url: String,
	token_url: String,
	#[serde(default)]
	user_info_url: String,
	#[serde(default)]
	client_id: Option<String>,
	#[serde(default)]
	client_secret: Option<TokenSecret>,
	#[serde(default)]
	redirect_url: Option<String>,
	#[serde(default)]
	quirks: ProviderQuirks,
}
impl ProviderConfig {
	/// Creates an empty configuration with the given display name.
	pub fn new(display_name: impl Into<String>) -> Self {
		Self {
			display_name: display_name.into(),
			pkce: false,
			scopes: Scopes::default(),
			auth_url: String::new(),
			token_url: String::new(),
			user_info_url: String::new(),
			client_id: None,
			client_secret: None,
			redirect_url: None,
			quirks: ProviderQuirks::default(),
		}
	}

	/// Human-readable provider name.
	pub fn display_name(&self) -> &str {
		&self.display_name
	}

	/// Whether the authorization code flow uses PKCE.
	pub fn pkce(&self) -> bool {
		self.pkce
	}

	/// Scopes requested in the authorization URL.
	pub fn scopes(&self) -> &Scopes {
		&self.scopes
	}

	/// Authorization endpoint.
	pub fn auth_url(&self) -> &str {
		&self.auth_url
	}

	/// Token endpoint.
	pub fn token_url(&self) -> &str {
		&self.token_url
	}

	/// Profile endpoint; empty when identity comes from the token response.
	pub fn user_info_url(&self) -> &str {
		&self.user_info_url
	}

	/// Injected OAuth client identifier.
	pub fn client_id(&self) -> Option<&str> {
		self.client_id.as_deref()
	}

	/// Injected OAuth client secret.
	pub fn client_secret(&self) -> Option<&TokenSecret> {
		self.client_secret.as_ref()
	}

	/// Injected redirect URL.
	pub fn redirect_url(&self) -> Option<&str> {
		self.redirect_url.as_deref()
	}

	/// Wire format deviations.
	pub fn quirks(&self) -> &ProviderQuirks {
		&self.quirks
	}

	/// Enables or disables PKCE.
	pub fn with_pkce(mut self, pkce: bool) -> Self {
		self.pkce = pkce;

		self
	}

	/// Replaces the requested scopes.
	pub fn with_scopes(mut self, scopes: Scopes) -> Self {
		self.scopes = scopes;

		self
	}

	/// Overrides the authorization endpoint.
	pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
		self.auth_url = url.into();

		self
	}

	/// Overrides the token endpoint.
	pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
		self.token_url = url.into();

		self
	}

	/// Overrides the profile endpoint. An empty value switches to token-derived profiles.
	pub fn with_user_info_url(mut self, url: impl Into<String>) -> Self {
		self.user_info_url = url.into();

		self
	}

	/// Injects the client identifier.
	pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Injects the client secret.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(TokenSecret::new(secret));

		self
	}

	/// Injects both client credentials.
	pub fn with_client_credentials(
		self,
		client_id: impl Into<String>,
		secret: impl Into<String>,
	) -> Self {
		self.with_client_id(client_id).with_client_secret(secret)
	}

	/// Injects the redirect URL registered with the provider.
	pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
		self.redirect_url = Some(url.into());

		self
	}

	/// Replaces the quirks.
	pub fn with_quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Applies every field set in `overrides`, leaving the others untouched.
	pub fn apply(mut self, overrides: ProviderOverrides) -> Self {
		let ProviderOverrides {
			display_name,
			pkce,
			scopes,
			auth_url,
			token_url,
			user_info_url,
			client_id,
			client_secret,
			redirect_url,
		} = overrides;

		if let Some(display_name) = display_name {
			self.display_name = display_name;
		}
		if let Some(pkce) = pkce {
			self.pkce = pkce;
		}
		if let Some(scopes) = scopes {
			self.scopes = scopes;
		}
		if let Some(auth_url) = auth_url {
			self.auth_url = auth_url;
		}
		if let Some(token_url) = token_url {
			self.token_url = token_url;
		}
		if let Some(user_info_url) = user_info_url {
			self.user_info_url = user_info_url;
		}
		if client_id.is_some() {
			self.client_id = client_id;
		}
		if client_secret.is_some() {
			self.client_secret = client_secret;
		}
		if redirect_url.is_some() {
			self.redirect_url = redirect_url;
		}

		self
	}

	/// Checks that everything `stage` needs has been injected.
	///
	/// Authorization URLs need the client id and redirect URL. The code exchange additionally
	/// needs a non-empty client secret, with or without PKCE. Later stages only rely on the
	/// exchanged token.
	pub fn ensure_ready(&self, provider: &ProviderId, stage: FlowStage) -> Result<(), ConfigError> {
		match stage {
			FlowStage::AuthorizationUrl => self.ensure_client(provider),
			FlowStage::TokenExchange => {
				self.ensure_client(provider)?;
				self.ready_client_secret(provider)?;

				Ok(())
			},
			FlowStage::UserInfo | FlowStage::Normalization => Ok(()),
		}
	}

	pub(crate) fn ready_client_id(&self, provider: &ProviderId) -> Result<&str, ConfigError> {
		self.client_id
			.as_deref()
			.filter(|id| !id.is_empty())
			.ok_or_else(|| ConfigError::MissingClientId { provider: provider.clone() })
	}

	pub(crate) fn ready_client_secret(&self, provider: &ProviderId) -> Result<&str, ConfigError> {
		self.client_secret
			.as_ref()
			.filter(|secret| !secret.is_empty())
			.map(TokenSecret::expose)
			.ok_or_else(|| ConfigError::MissingClientSecret { provider: provider.clone() })
	}

	/// Validated redirect URL, returned verbatim so it matches the registered value byte for
	/// byte.
	pub(crate) fn ready_redirect_url(&self, provider: &ProviderId) -> Result<&str, ConfigError> {
		let raw = self
			.redirect_url
			.as_deref()
			.filter(|url| !url.is_empty())
			.ok_or_else(|| ConfigError::MissingRedirectUrl { provider: provider.clone() })?;

		parse_endpoint(provider, "redirect", raw)?;

		Ok(raw)
	}

	pub(crate) fn auth_endpoint(&self, provider: &ProviderId) -> Result<Url, ConfigError> {
		parse_endpoint(provider, "authorization", &self.auth_url)
	}

	pub(crate) fn token_endpoint(&self, provider: &ProviderId) -> Result<Url, ConfigError> {
		parse_endpoint(provider, "token", &self.token_url)
	}

	/// `None` when the profile comes from the token response instead of an HTTP call.
	pub(crate) fn user_info_endpoint(
		&self,
		provider: &ProviderId,
	) -> Result<Option<Url>, ConfigError> {
		let raw = self.user_info_url.trim();

		if raw.is_empty() {
			return Ok(None);
		}

		parse_endpoint(provider, "user_info", raw).map(Some)
	}

	fn ensure_client(&self, provider: &ProviderId) -> Result<(), ConfigError> {
		self.ready_client_id(provider)?;
		self.ready_redirect_url(provider)?;

		Ok(())
	}
}
impl Debug for ProviderConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderConfig")
			.field("display_name", &self.display_name)
			.field("pkce", &self.pkce)
			.field("scopes", &self.scopes)
			.field("auth_url", &self.auth_url)
			.field("token_url", &self.token_url)
			.field("user_info_url", &self.user_info_url)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("redirect_url", &self.redirect_url)
			.field("quirks", &self.quirks)
			.finish()
	}
}

/// Host-side overrides, typically deserialized from the host's own configuration file.
///
/// ```
/// use oauth2_identity::ProviderOverrides;
///
/// let overrides: ProviderOverrides = serde_json::from_str(
/// 	r#"{"client_id":"app","client_secret":"s3cr3t","redirect_url":"https://app.test/cb"}"#,
/// )
/// .unwrap();
///
/// assert_eq!(overrides.client_id.as_deref(), Some("app"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderOverrides {
	/// Replacement display name.
	pub display_name: Option<String>,
	/// Replacement PKCE flag.
	pub pkce: Option<bool>,
	/// Replacement scopes.
	pub scopes: Option<Scopes>,
	/// Replacement authorization endpoint.
	pub auth_url: Option<String>,
	/// Replacement token endpoint.
	pub token_url: Option<String>,
	/// Replacement profile endpoint; an empty string switches to token-derived profiles.
	pub user_info_url: Option<String>,
	/// Client identifier.
	pub client_id: Option<String>,
	/// Client secret.
	pub client_secret: Option<TokenSecret>,
	/// Redirect URL.
	pub redirect_url: Option<String>,
}

fn parse_endpoint(
	provider: &ProviderId,
	endpoint: &'static str,
	raw: &str,
) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint {
		provider: provider.clone(),
		endpoint,
		url: raw.to_owned(),
		source,
	})
}
