//! End-to-end bootstrap: read definitions, then orchestrate processors.

use std::path::Path;
use std::sync::Arc;

use blueprint_reader::{
	CollectingReporter, DefinitionDecorator, DefinitionReader, FileSystemResolver, NamespaceHandler, Problem,
	ReaderEventListener, Severity,
};
use blueprint_registry::Registry;
use tracing::{debug, info};

use crate::config::BootstrapConfig;
use crate::error::BootstrapError;
use crate::factory::ComponentFactory;
use crate::orchestrator::{ExtensionOrchestrator, OrchestrationReport, RegisteredInterceptors};
use crate::processor::Mutator;
use crate::provider::ProcessorTypes;

/// Bootstrap pipeline over one configuration.
pub struct Bootstrap {
	config: BootstrapConfig,
	types: Arc<ProcessorTypes>,
	mutators: Vec<Mutator>,
	decorators: Vec<Arc<dyn DefinitionDecorator>>,
	namespaces: Vec<(String, Arc<dyn NamespaceHandler>)>,
	listener: Option<Arc<dyn ReaderEventListener>>,
}

/// A completed bootstrap.
#[derive(Debug)]
pub struct Bootstrapped {
	pub factory: ComponentFactory,
	/// Definitions added by the documents themselves, before any mutator ran.
	pub definitions_loaded: usize,
	pub report: OrchestrationReport,
	pub interceptors: RegisteredInterceptors,
	/// Warnings collected while reading. Errors abort the bootstrap instead.
	pub warnings: Vec<Problem>,
}

impl Bootstrapped {
	/// Freezes the registry for concurrent readers.
	pub fn into_shared_registry(self) -> Arc<Registry> {
		self.factory.into_registry().into_shared()
	}
}

impl Bootstrap {
	pub fn new(config: BootstrapConfig, types: Arc<ProcessorTypes>) -> Self {
		Self {
			config,
			types,
			mutators: Vec::new(),
			decorators: Vec::new(),
			namespaces: Vec::new(),
			listener: None,
		}
	}

	pub fn from_file(path: &Path, types: Arc<ProcessorTypes>) -> Result<Self, BootstrapError> {
		Ok(Self::new(BootstrapConfig::load(path)?, types))
	}

	/// Supplies a mutator that runs ahead of every discovered processor.
	pub fn with_mutator(mut self, mutator: Mutator) -> Self {
		self.mutators.push(mutator);
		self
	}

	pub fn with_decorator(mut self, decorator: Arc<dyn DefinitionDecorator>) -> Self {
		self.decorators.push(decorator);
		self
	}

	pub fn with_namespace_handler(mut self, namespace: impl Into<String>, handler: Arc<dyn NamespaceHandler>) -> Self {
		self.namespaces.push((namespace.into(), handler));
		self
	}

	pub fn with_listener(mut self, listener: Arc<dyn ReaderEventListener>) -> Self {
		self.listener = Some(listener);
		self
	}

	pub fn config(&self) -> &BootstrapConfig {
		&self.config
	}

	/// Loads every configured location, then runs the orchestrator.
	///
	/// Element problems are collected across all documents and reported
	/// together as [`BootstrapError::Problems`]; nothing is orchestrated in
	/// that case.
	pub fn run(&self) -> Result<Bootstrapped, BootstrapError> {
		info!(locations = self.config.locations.len(), "bootstrapping");
		let reporter = Arc::new(CollectingReporter::new());
		let reader = self.reader(Arc::clone(&reporter));

		let mut registry = Registry::new(self.types.clone());
		let definitions_loaded = reader.load_all(&mut registry, &self.config.locations)?;
		let (errors, warnings): (Vec<_>, Vec<_>) = reporter
			.take()
			.into_iter()
			.partition(|problem| problem.severity == Severity::Error);
		if !errors.is_empty() {
			return Err(BootstrapError::Problems { problems: errors });
		}
		debug!(definitions = definitions_loaded, warnings = warnings.len(), "definitions loaded");

		let mut factory = ComponentFactory::new(registry, self.types.clone());
		let orchestrator =
			ExtensionOrchestrator::new().with_max_registry_passes(self.config.orchestrator.max_registry_passes);
		let report = orchestrator.invoke_mutators(&mut factory, &self.mutators)?;
		let interceptors = orchestrator.register_interceptors(&mut factory)?;

		info!(
			definitions = factory.registry().len(),
			processed = report.processed.len(),
			interceptors = factory.interceptor_count(),
			"bootstrap complete"
		);
		Ok(Bootstrapped {
			factory,
			definitions_loaded,
			report,
			interceptors,
			warnings,
		})
	}

	fn reader(&self, reporter: Arc<CollectingReporter>) -> DefinitionReader {
		let resolver = Arc::new(FileSystemResolver::new(self.config.resources.base_dir.clone()));
		let mut reader = DefinitionReader::new(resolver)
			.with_environment(Arc::new(self.config.environment.build()))
			.with_settings(self.config.reader.clone())
			.with_reporter(reporter);
		for decorator in &self.decorators {
			reader = reader.with_decorator(Arc::clone(decorator));
		}
		for (namespace, handler) in &self.namespaces {
			reader = reader.with_namespace_handler(namespace.clone(), Arc::clone(handler));
		}
		if let Some(listener) = &self.listener {
			reader = reader.with_listener(Arc::clone(listener));
		}
		reader
	}
}

#[cfg(test)]
mod tests;
