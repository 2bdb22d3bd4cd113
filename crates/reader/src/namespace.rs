//! Handlers for elements outside the core grammar.

use std::sync::Arc;

use blueprint_registry::{DefinitionHolder, Registry, RegistryError, SourceLocation};
use rustc_hash::FxHashMap;

use crate::document::Element;
use crate::environment::Environment;
use crate::error::ElementError;
use crate::state::ParserState;

/// Context for one foreign element. Definitions registered through it are
/// announced once the handler returns.
pub struct NamespaceContext<'a> {
	registry: &'a mut Registry,
	pub environment: &'a dyn Environment,
	pub state: &'a ParserState,
	pub resource: &'a str,
	registered: Vec<DefinitionHolder>,
}

impl<'a> NamespaceContext<'a> {
	pub fn new(
		registry: &'a mut Registry,
		environment: &'a dyn Environment,
		state: &'a ParserState,
		resource: &'a str,
	) -> Self {
		Self {
			registry,
			environment,
			state,
			resource,
			registered: Vec::new(),
		}
	}

	pub fn registry(&self) -> &Registry {
		self.registry
	}

	pub fn source_of(&self, element: &Element) -> SourceLocation {
		SourceLocation::new(self.resource, Some(element.line))
	}

	/// Registers `holder` under its name and aliases.
	pub fn register(&mut self, holder: DefinitionHolder) -> Result<(), RegistryError> {
		self.registry.register(&holder.name, holder.definition.clone())?;
		for alias in &holder.aliases {
			self.registry.register_alias(&holder.name, alias)?;
		}
		self.registered.push(holder);
		Ok(())
	}

	pub fn into_registered(self) -> Vec<DefinitionHolder> {
		self.registered
	}
}

/// Parses elements of one namespace.
pub trait NamespaceHandler: Send + Sync {
	fn parse(&self, element: &Element, ctx: &mut NamespaceContext<'_>) -> Result<(), ElementError>;
}

/// Namespace URI to handler map.
#[derive(Clone, Default)]
pub struct NamespaceHandlers {
	handlers: FxHashMap<String, Arc<dyn NamespaceHandler>>,
}

impl NamespaceHandlers {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `handler` for `namespace`, replacing any previous one.
	pub fn insert(&mut self, namespace: impl Into<String>, handler: Arc<dyn NamespaceHandler>) {
		self.handlers.insert(namespace.into(), handler);
	}

	pub fn get(&self, namespace: &str) -> Option<&Arc<dyn NamespaceHandler>> {
		self.handlers.get(namespace)
	}

	pub fn len(&self) -> usize {
		self.handlers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.handlers.is_empty()
	}
}

impl std::fmt::Debug for NamespaceHandlers {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_set().entries(self.handlers.keys()).finish()
	}
}
