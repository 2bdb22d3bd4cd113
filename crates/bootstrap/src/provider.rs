//! Processor type table and instance provider.

use std::fmt;
use std::sync::Arc;

use blueprint_registry::{CapabilitySet, Definition, TypeCatalog};
use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::ProviderError;
use crate::processor::Processor;

/// Builds a processor from its definition.
pub type Constructor = Arc<dyn Fn(&Definition) -> Result<Processor, String> + Send + Sync>;

/// Obtains processor instances for registered definitions.
pub trait ProcessorProvider: Send + Sync {
	/// Returns the processor for the definition registered under `name`.
	///
	/// Instances are singletons per name and type reference: repeated calls
	/// yield the same one until the definition's type changes.
	fn processor(&self, name: &str, definition: &Definition) -> Result<Processor, ProviderError>;
}

struct TypeEntry {
	capabilities: CapabilitySet,
	constructor: Option<Constructor>,
}

/// Table of known type references.
///
/// Serves as the registry's [`TypeCatalog`] and as the orchestrator's
/// [`ProcessorProvider`], so classification and instantiation cannot disagree.
#[derive(Default)]
pub struct ProcessorTypes {
	types: IndexMap<String, TypeEntry>,
	/// Keyed by definition name and type reference.
	instances: Mutex<FxHashMap<(String, String), Processor>>,
}

impl ProcessorTypes {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares a type that is classified but never instantiated here, such as
	/// a plain listener component.
	pub fn declare(mut self, type_ref: impl Into<String>, capabilities: CapabilitySet) -> Self {
		self.types.insert(
			type_ref.into(),
			TypeEntry {
				capabilities,
				constructor: None,
			},
		);
		self
	}

	/// Declares a processor type with the constructor that builds it.
	pub fn with<F>(mut self, type_ref: impl Into<String>, capabilities: CapabilitySet, constructor: F) -> Self
	where
		F: Fn(&Definition) -> Result<Processor, String> + Send + Sync + 'static,
	{
		self.types.insert(
			type_ref.into(),
			TypeEntry {
				capabilities,
				constructor: Some(Arc::new(constructor)),
			},
		);
		self
	}

	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	/// Number of processors instantiated so far.
	pub fn instantiated(&self) -> usize {
		self.instances.lock().len()
	}
}

impl TypeCatalog for ProcessorTypes {
	fn capabilities(&self, type_ref: &str) -> CapabilitySet {
		self.types
			.get(type_ref)
			.map(|entry| entry.capabilities)
			.unwrap_or_default()
	}
}

impl ProcessorProvider for ProcessorTypes {
	fn processor(&self, name: &str, definition: &Definition) -> Result<Processor, ProviderError> {
		let type_ref = definition
			.type_ref
			.as_deref()
			.ok_or_else(|| ProviderError::Untyped(name.to_string()))?;
		let key = (name.to_string(), type_ref.to_string());
		if let Some(processor) = self.instances.lock().get(&key) {
			return Ok(processor.clone());
		}

		let constructor = self
			.types
			.get(type_ref)
			.and_then(|entry| entry.constructor.as_ref())
			.ok_or_else(|| ProviderError::UnknownType {
				name: name.to_string(),
				type_ref: type_ref.to_string(),
			})?;

		let processor = constructor(definition).map_err(|message| ProviderError::Construction {
			name: name.to_string(),
			message,
		})?;
		trace!(name, type_ref, kind = processor.kind(), "instantiated processor");
		let mut instances = self.instances.lock();
		Ok(instances.entry(key).or_insert(processor).clone())
	}
}

impl fmt::Debug for ProcessorTypes {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProcessorTypes")
			.field("types", &self.types.keys().collect::<Vec<_>>())
			.field("instantiated", &self.instantiated())
			.finish()
	}
}
