//! Entry points turning locations into registered definitions.
//!
//! [`DefinitionReader`] resolves locations to resources, loads each into a
//! [`Document`](crate::document::Document) and hands it to a
//! [`DocumentReader`], which walks the tree and registers what it finds.
//! Imports re-enter the definition reader, so a load is a recursion over
//! resources bounded by cycle detection on the current import chain.

mod document;

use std::sync::Arc;

use blueprint_registry::Registry;
use parking_lot::Mutex;
use tracing::{debug, trace};

pub use self::document::{DocumentReader, NoopHooks, ScopeHooks};
use crate::delegate::{DefaultComponentDelegate, DefinitionDecorator, DefinitionParserDelegate};
use crate::document::entity::ResourceEntityResolver;
use crate::document::loader::{DocumentLoader, XmlDocumentLoader};
use crate::environment::{Environment, StandardEnvironment};
use crate::error::ReaderError;
use crate::events::{NoopListener, ReaderEventListener};
use crate::namespace::{NamespaceHandler, NamespaceHandlers};
use crate::problems::{CollectingReporter, ProblemReporter};
use crate::resource::{Resource, ResourceResolver};
use crate::settings::ReaderSettings;

/// Loads definitions from resources into a [`Registry`].
pub struct DefinitionReader {
	resolver: Arc<dyn ResourceResolver>,
	environment: Arc<dyn Environment>,
	loader: Arc<dyn DocumentLoader>,
	delegate: Arc<dyn DefinitionParserDelegate>,
	decorators: Vec<Arc<dyn DefinitionDecorator>>,
	namespaces: NamespaceHandlers,
	hooks: Arc<dyn ScopeHooks>,
	listener: Arc<dyn ReaderEventListener>,
	reporter: Arc<dyn ProblemReporter>,
	settings: ReaderSettings,
	/// Identities of the resources on the current import chain.
	loading: Mutex<Vec<String>>,
}

impl DefinitionReader {
	pub fn new(resolver: Arc<dyn ResourceResolver>) -> Self {
		Self {
			resolver,
			environment: Arc::new(StandardEnvironment::new()),
			loader: Arc::new(XmlDocumentLoader::new()),
			delegate: Arc::new(DefaultComponentDelegate),
			decorators: Vec::new(),
			namespaces: NamespaceHandlers::new(),
			hooks: Arc::new(NoopHooks),
			listener: Arc::new(NoopListener),
			reporter: Arc::new(CollectingReporter::new()),
			settings: ReaderSettings::default(),
			loading: Mutex::new(Vec::new()),
		}
	}

	pub fn with_environment(mut self, environment: Arc<dyn Environment>) -> Self {
		self.environment = environment;
		self
	}

	pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
		self.loader = loader;
		self
	}

	pub fn with_delegate(mut self, delegate: Arc<dyn DefinitionParserDelegate>) -> Self {
		self.delegate = delegate;
		self
	}

	/// Appends a decorator. Decorators run in registration order.
	pub fn with_decorator(mut self, decorator: Arc<dyn DefinitionDecorator>) -> Self {
		self.decorators.push(decorator);
		self
	}

	pub fn with_namespace_handler(mut self, namespace: impl Into<String>, handler: Arc<dyn NamespaceHandler>) -> Self {
		self.namespaces.insert(namespace, handler);
		self
	}

	pub fn with_hooks(mut self, hooks: Arc<dyn ScopeHooks>) -> Self {
		self.hooks = hooks;
		self
	}

	pub fn with_listener(mut self, listener: Arc<dyn ReaderEventListener>) -> Self {
		self.listener = listener;
		self
	}

	pub fn with_reporter(mut self, reporter: Arc<dyn ProblemReporter>) -> Self {
		self.reporter = reporter;
		self
	}

	pub fn with_settings(mut self, settings: ReaderSettings) -> Self {
		self.settings = settings;
		self
	}

	pub fn settings(&self) -> &ReaderSettings {
		&self.settings
	}

	pub fn environment(&self) -> &dyn Environment {
		self.environment.as_ref()
	}

	pub fn resolver(&self) -> &Arc<dyn ResourceResolver> {
		&self.resolver
	}

	/// Loads every resource `location` designates and returns the number of
	/// definitions added.
	///
	/// With a pattern-capable resolver the location may be a glob; otherwise it
	/// names a single resource.
	pub fn load_definitions(&self, registry: &mut Registry, location: &str) -> Result<usize, ReaderError> {
		self.load_location(registry, location, None)
	}

	/// Loads several locations in order, summing the counts.
	pub fn load_all<S: AsRef<str>>(&self, registry: &mut Registry, locations: &[S]) -> Result<usize, ReaderError> {
		let mut count = 0;
		for location in locations {
			count += self.load_definitions(registry, location.as_ref())?;
		}
		Ok(count)
	}

	pub(crate) fn load_location(
		&self,
		registry: &mut Registry,
		location: &str,
		actual: Option<&mut Vec<Arc<dyn Resource>>>,
	) -> Result<usize, ReaderError> {
		let resources = match self.resolver.patterns() {
			Some(patterns) => patterns.resources(location)?,
			None => vec![self.resolver.resource(location)?],
		};

		let mut count = 0;
		for resource in &resources {
			count += self.load_resource(registry, Arc::clone(resource))?;
		}
		trace!(location, resources = resources.len(), count, "loaded location");
		if let Some(actual) = actual {
			actual.extend(resources);
		}
		Ok(count)
	}

	/// Loads one resource and returns the number of definitions added.
	///
	/// Fails with [`ReaderError::CyclicImport`] if the resource is already being
	/// loaded further up the import chain.
	pub fn load_resource(&self, registry: &mut Registry, resource: Arc<dyn Resource>) -> Result<usize, ReaderError> {
		let description = resource.description();
		let _chain = self.enter_chain(resource.as_ref(), registry)?;
		debug!(resource = %description, "loading definitions");

		let entities = ResourceEntityResolver::new(Arc::clone(&self.resolver), Some(Arc::clone(&resource)));
		let document = self
			.loader
			.load_document(resource.as_ref(), &entities, self.settings.validation, self.settings.namespace_aware)
			.map_err(|source| ReaderError::Load {
				resource: description.clone(),
				source,
			})?;

		let before = registry.len();
		DocumentReader::new(self, registry, &resource).register_definitions(&document)?;
		let count = registry.len().saturating_sub(before);
		debug!(resource = %description, count, "loaded definitions");
		Ok(count)
	}

	fn enter_chain(&self, resource: &dyn Resource, registry: &mut Registry) -> Result<ChainGuard<'_>, ReaderError> {
		let identity = resource.identity();
		let mut loading = self.loading.lock();
		if loading.is_empty() {
			registry.set_allow_overriding(self.settings.allow_definition_overriding);
		}
		if loading.contains(&identity) {
			return Err(ReaderError::CyclicImport {
				resource: resource.description(),
			});
		}
		loading.push(identity);
		Ok(ChainGuard { loading: &self.loading })
	}
}

impl std::fmt::Debug for DefinitionReader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DefinitionReader")
			.field("settings", &self.settings)
			.field("namespaces", &self.namespaces)
			.field("decorators", &self.decorators.len())
			.finish_non_exhaustive()
	}
}

/// Pops the current resource off the import chain.
struct ChainGuard<'a> {
	loading: &'a Mutex<Vec<String>>,
}

impl Drop for ChainGuard<'_> {
	fn drop(&mut self) {
		self.loading.lock().pop();
	}
}

#[cfg(test)]
mod tests;
