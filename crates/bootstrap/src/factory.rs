//! Target of the extension orchestrator.
//!
//! Wraps the populated [`Registry`] with the processor provider and the
//! interceptor chain the instantiation engine will apply.

use std::fmt;
use std::sync::Arc;

use blueprint_registry::{Definition, Registry};

use crate::error::{ProcessorError, ProviderError};
use crate::processor::{ComponentView, InstanceInterceptor, Processor};
use crate::provider::ProcessorProvider;

/// Registry plus processor plumbing, as seen by processors during bootstrap.
pub struct ComponentFactory {
	registry: Registry,
	registry_mutable: bool,
	provider: Arc<dyn ProcessorProvider>,
	interceptors: Vec<(String, Arc<dyn InstanceInterceptor>)>,
}

impl ComponentFactory {
	pub fn new(registry: Registry, provider: Arc<dyn ProcessorProvider>) -> Self {
		Self {
			registry,
			registry_mutable: true,
			provider,
			interceptors: Vec::new(),
		}
	}

	/// Controls whether registry mutators may restructure the registry.
	///
	/// A factory without a mutable registry only runs factory hooks.
	pub fn with_mutable_registry(mut self, mutable: bool) -> Self {
		self.registry_mutable = mutable;
		self
	}

	pub fn is_registry_mutable(&self) -> bool {
		self.registry_mutable
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	/// Structural access to the registry, when the factory allows it.
	pub fn as_registry_mut(&mut self) -> Option<&mut Registry> {
		self.registry_mutable.then_some(&mut self.registry)
	}

	pub(crate) fn registry_mut(&mut self) -> &mut Registry {
		&mut self.registry
	}

	/// Mutable access to one definition. Allowed regardless of registry
	/// mutability; factory hooks rewrite definitions in place.
	pub fn definition_mut(&mut self, name: &str) -> Option<&mut Definition> {
		self.registry.get_mut(name)
	}

	/// Returns the processor instance behind `name`.
	pub fn processor(&self, name: &str) -> Result<Processor, ProviderError> {
		let canonical = self.registry.canonical_name(name);
		let definition = self
			.registry
			.get(canonical)
			.ok_or_else(|| ProviderError::NoSuchDefinition(name.to_string()))?;
		self.provider.processor(canonical, definition)
	}

	/// Appends an interceptor. Re-adding a name moves it to the end of the chain.
	pub fn add_interceptor(&mut self, name: impl Into<String>, interceptor: Arc<dyn InstanceInterceptor>) {
		let name = name.into();
		self.interceptors.retain(|(existing, _)| *existing != name);
		self.interceptors.push((name, interceptor));
	}

	pub fn interceptor_count(&self) -> usize {
		self.interceptors.len()
	}

	/// Interceptor names in chain order.
	pub fn interceptor_names(&self) -> impl Iterator<Item = &str> {
		self.interceptors.iter().map(|(name, _)| name.as_str())
	}

	pub fn apply_before_initialization(&self, name: &str) -> Result<(), ProcessorError> {
		self.apply(name, |interceptor, view| interceptor.before_initialization(view))
	}

	pub fn apply_after_initialization(&self, name: &str) -> Result<(), ProcessorError> {
		self.apply(name, |interceptor, view| interceptor.after_initialization(view))
	}

	fn apply<F>(&self, name: &str, hook: F) -> Result<(), ProcessorError>
	where
		F: Fn(&dyn InstanceInterceptor, &ComponentView<'_>) -> Result<(), ProcessorError>,
	{
		let canonical = self.registry.canonical_name(name);
		let Some(definition) = self.registry.get(canonical) else {
			return Err(ProcessorError::new(format!("no definition named '{name}'")));
		};
		let view = ComponentView {
			name: canonical,
			definition,
			capabilities: self.registry.capabilities_of(canonical),
			interceptor_count: self.interceptors.len(),
		};
		for (_, interceptor) in &self.interceptors {
			hook(interceptor.as_ref(), &view)?;
		}
		Ok(())
	}

	/// Releases the registry for the instantiation engine.
	pub fn into_registry(self) -> Registry {
		self.registry
	}
}

impl fmt::Debug for ComponentFactory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentFactory")
			.field("registry", &self.registry)
			.field("registry_mutable", &self.registry_mutable)
			.field("interceptors", &self.interceptor_names().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}
