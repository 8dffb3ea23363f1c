//! Provider instances (configuration plus normalizer) and the name registry.
//!
//! `config` holds the data a factory bakes in and the host injects (endpoints, scopes,
//! credentials, quirks). `registry` maps names to factories so each lookup yields a fresh,
//! independently mutable [`Provider`]. The flows that drive a provider live in
//! [`crate::flows`].

pub mod config;
pub mod registry;

pub use config::*;
pub use registry::*;

// self
use crate::{
	_prelude::*,
	auth::{ProviderId, ProviderProfile, Scopes},
	error::NormalizationError,
};

/// Maps a provider's raw profile payload onto the canonical identity fields.
///
/// Normalizers are pure: no I/O, no hidden state, identical output for identical input.
pub type Normalizer = fn(&[u8]) -> Result<ProviderProfile, NormalizationError>;

/// Builds a fresh provider with its defaults and empty credentials.
pub type ProviderFactory = fn() -> Provider;

/// One configured identity provider.
///
/// Cloning is cheap enough for per-request use, and instances never share mutable state.
#[derive(Clone, Debug)]
pub struct Provider {
	id: ProviderId,
	config: ProviderConfig,
	normalizer: Normalizer,
}
impl Provider {
	/// Creates a provider from its name, defaults, and normalizer.
	pub fn new(id: ProviderId, config: ProviderConfig, normalizer: Normalizer) -> Self {
		Self { id, config, normalizer }
	}

	/// Registry name.
	pub fn id(&self) -> &ProviderId {
		&self.id
	}

	/// Current configuration.
	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	/// Normalizer applied to raw profile payloads.
	pub fn normalizer(&self) -> Normalizer {
		self.normalizer
	}

	/// Injects both client credentials.
	pub fn with_client_credentials(
		mut self,
		client_id: impl Into<String>,
		secret: impl Into<String>,
	) -> Self {
		self.config = self.config.with_client_credentials(client_id, secret);

		self
	}

	/// Injects the client identifier.
	pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
		self.config = self.config.with_client_id(client_id);

		self
	}

	/// Injects the client secret.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.config = self.config.with_client_secret(secret);

		self
	}

	/// Injects the redirect URL registered with the provider.
	pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
		self.config = self.config.with_redirect_url(url);

		self
	}

	/// Points the authorization endpoint at a self-hosted instance.
	pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
		self.config = self.config.with_auth_url(url);

		self
	}

	/// Points the token endpoint at a self-hosted instance.
	pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
		self.config = self.config.with_token_url(url);

		self
	}

	/// Points the profile endpoint at a self-hosted instance.
	pub fn with_user_info_url(mut self, url: impl Into<String>) -> Self {
		self.config = self.config.with_user_info_url(url);

		self
	}

	/// Replaces the requested scopes.
	pub fn with_scopes(mut self, scopes: Scopes) -> Self {
		self.config = self.config.with_scopes(scopes);

		self
	}

	/// Applies host overrides; see [`ProviderConfig::apply`].
	pub fn apply(mut self, overrides: ProviderOverrides) -> Self {
		self.config = self.config.apply(overrides);

		self
	}
}
