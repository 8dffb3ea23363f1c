//! Name to factory mapping built once by the host.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{Provider, ProviderFactory},
	providers,
};

/// Registry of provider factories keyed by name.
///
/// Built at bootstrap and then shared read-only (for example behind an
/// [`Arc`](std::sync::Arc)); lookups never mutate it, so no locking is involved.
#[derive(Clone, Default)]
pub struct Registry {
	factories: BTreeMap<ProviderId, ProviderFactory>,
}
impl Registry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a registry pre-populated with every built-in provider.
	pub fn with_builtin_providers() -> Self {
		let mut registry = Self::new();

		providers::register_builtin(&mut registry);

		registry
	}

	/// Registers `factory` under `id`, returning the factory it replaced.
	pub fn register(&mut self, id: ProviderId, factory: ProviderFactory) -> Option<ProviderFactory> {
		self.factories.insert(id, factory)
	}

	/// Builds a fresh provider for `name`.
	pub fn get(&self, name: &str) -> Result<Provider> {
		self.factories
			.get(name)
			.map(|factory| factory())
			.ok_or_else(|| Error::NotFound { name: name.to_owned() })
	}

	/// Returns `true` if `name` is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.factories.contains_key(name)
	}

	/// Registered names in lexical order.
	pub fn names(&self) -> impl Iterator<Item = &ProviderId> {
		self.factories.keys()
	}

	/// Number of registered providers.
	pub fn len(&self) -> usize {
		self.factories.len()
	}

	/// Returns `true` if nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.factories.is_empty()
	}
}
impl Debug for Registry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Registry").field("providers", &self.factories.keys()).finish()
	}
}
