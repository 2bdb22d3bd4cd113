//! Extension processor traits.
//!
//! Processors are classified by the capability set their definition's type
//! reference declares, never by inspecting an instance. The instance only
//! supplies hooks and, for ordered tiers, an order value.

use std::fmt;
use std::sync::Arc;

use blueprint_registry::{CapabilitySet, Definition, Registry};

use crate::error::ProcessorError;
use crate::factory::ComponentFactory;

/// Order value of processors that do not override [`Ordered::order`].
pub const DEFAULT_ORDER: i32 = i32::MAX;

/// Sort key within the priority and ordered tiers. Lower runs first.
pub trait Ordered {
	fn order(&self) -> i32 {
		DEFAULT_ORDER
	}
}

/// Mutates the component factory after the registry is fully populated.
pub trait FactoryMutator: Ordered + Send + Sync {
	fn mutate_factory(&self, _factory: &mut ComponentFactory) -> Result<(), ProcessorError> {
		Ok(())
	}
}

/// Mutates registry structure. Runs before any factory hook and may register
/// further mutators, which are picked up by the next discovery pass.
pub trait RegistryMutator: FactoryMutator {
	fn mutate_registry(&self, registry: &mut Registry) -> Result<(), ProcessorError>;
}

/// Component handed to interceptor hooks.
#[derive(Debug, Clone, Copy)]
pub struct ComponentView<'a> {
	pub name: &'a str,
	pub definition: &'a Definition,
	pub capabilities: CapabilitySet,
	/// Interceptors registered on the factory when the component was created.
	pub interceptor_count: usize,
}

/// Sees component instances around initialization.
///
/// Only registration happens during bootstrap; the instantiation engine drives
/// the hooks through [`ComponentFactory::apply_before_initialization`] and
/// [`ComponentFactory::apply_after_initialization`].
pub trait InstanceInterceptor: Ordered + Send + Sync {
	fn before_initialization(&self, _component: &ComponentView<'_>) -> Result<(), ProcessorError> {
		Ok(())
	}

	fn after_initialization(&self, _component: &ComponentView<'_>) -> Result<(), ProcessorError> {
		Ok(())
	}
}

/// An instantiated processor.
#[derive(Clone)]
pub enum Processor {
	Registry(Arc<dyn RegistryMutator>),
	Factory(Arc<dyn FactoryMutator>),
	Interceptor(Arc<dyn InstanceInterceptor>),
}

impl Processor {
	pub fn registry(mutator: impl RegistryMutator + 'static) -> Self {
		Self::Registry(Arc::new(mutator))
	}

	pub fn factory(mutator: impl FactoryMutator + 'static) -> Self {
		Self::Factory(Arc::new(mutator))
	}

	pub fn interceptor(interceptor: impl InstanceInterceptor + 'static) -> Self {
		Self::Interceptor(Arc::new(interceptor))
	}

	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Registry(_) => "registry mutator",
			Self::Factory(_) => "factory mutator",
			Self::Interceptor(_) => "instance interceptor",
		}
	}

	pub fn order(&self) -> i32 {
		match self {
			Self::Registry(p) => p.order(),
			Self::Factory(p) => p.order(),
			Self::Interceptor(p) => p.order(),
		}
	}

	/// Runs the factory hook. Interceptors have none and are a no-op.
	pub fn mutate_factory(&self, factory: &mut ComponentFactory) -> Result<(), ProcessorError> {
		match self {
			Self::Registry(p) => p.mutate_factory(factory),
			Self::Factory(p) => p.mutate_factory(factory),
			Self::Interceptor(_) => Ok(()),
		}
	}
}

impl fmt::Debug for Processor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Processor")
			.field("kind", &self.kind())
			.field("order", &self.order())
			.finish()
	}
}

/// Mutator handed to the orchestrator directly rather than discovered in the
/// registry. Runs ahead of every discovered processor.
#[derive(Clone)]
pub enum Mutator {
	Registry { name: String, mutator: Arc<dyn RegistryMutator> },
	Factory { name: String, mutator: Arc<dyn FactoryMutator> },
}

impl Mutator {
	pub fn registry(name: impl Into<String>, mutator: Arc<dyn RegistryMutator>) -> Self {
		Self::Registry {
			name: name.into(),
			mutator,
		}
	}

	pub fn factory(name: impl Into<String>, mutator: Arc<dyn FactoryMutator>) -> Self {
		Self::Factory {
			name: name.into(),
			mutator,
		}
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Registry { name, .. } | Self::Factory { name, .. } => name,
		}
	}

	pub fn mutate_factory(&self, factory: &mut ComponentFactory) -> Result<(), ProcessorError> {
		match self {
			Self::Registry { mutator, .. } => mutator.mutate_factory(factory),
			Self::Factory { mutator, .. } => mutator.mutate_factory(factory),
		}
	}
}

impl fmt::Debug for Mutator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let kind = match self {
			Self::Registry { .. } => "registry",
			Self::Factory { .. } => "factory",
		};
		f.debug_struct("Mutator")
			.field("name", &self.name())
			.field("kind", &kind)
			.finish()
	}
}
