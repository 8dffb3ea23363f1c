//! Built-in provider factories.
//!
//! Each submodule exposes a `NAME`, a `provider()` factory, and the pure `normalize` function
//! that maps the provider's profile payload onto [`ProviderProfile`](crate::ProviderProfile).
//! Hosts add their own providers the same way through [`Registry::register`].

pub mod nextcloud;
pub mod oidc;

// self
use crate::{auth::ProviderId, provider::Registry};

/// Registers every built-in provider into `registry`, replacing same-named entries.
pub fn register_builtin(registry: &mut Registry) {
	registry.register(ProviderId::from_static(nextcloud::NAME), nextcloud::provider);
	registry.register(ProviderId::from_static(oidc::NAME), oidc::provider);
}
