//! Phased invocation of extension processors.
//!
//! Runs over a fully populated registry, in three steps:
//!
//! 1. Registry mutation. Supplied registry mutators run first, then
//!    discovered ones in repeated passes until a pass finds nothing new.
//!    Every touched registry mutator then gets its factory hook, followed by
//!    the supplied plain factory mutators.
//! 2. Factory mutation over the remaining factory-mutator definitions.
//! 3. Interceptor registration.
//!
//! Within a pass processors run in three tiers: priority-ordered, ordered,
//! then unordered. The first two are stably sorted by [`Ordered::order`].
//! A processor runs at most once; the first hook failure aborts everything.
//!
//! [`Ordered::order`]: crate::processor::Ordered::order

use std::sync::Arc;

use blueprint_registry::{CapabilitySet, Registry};
use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::error::{BootstrapError, Phase, ProcessorError, ProviderError};
use crate::factory::ComponentFactory;
use crate::interceptors::{CHAIN_CHECKER, InterceptorChainChecker, LISTENER_DETECTOR, ListenerDetector};
use crate::processor::{FactoryMutator, InstanceInterceptor, Mutator, Processor, RegistryMutator};

/// Ordering tier of a processor, derived from its capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
	Priority = 0,
	Ordered = 1,
	Unordered = 2,
}

impl Tier {
	pub const ALL: [Tier; 3] = [Tier::Priority, Tier::Ordered, Tier::Unordered];

	pub fn of(capabilities: CapabilitySet) -> Self {
		if capabilities.contains(CapabilitySet::PRIORITY_ORDERED) {
			Self::Priority
		} else if capabilities.contains(CapabilitySet::ORDERED) {
			Self::Ordered
		} else {
			Self::Unordered
		}
	}

	fn is_sorted(self) -> bool {
		self != Self::Unordered
	}
}

/// Names of registry processors already invoked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedSet {
	names: IndexSet<String>,
}

impl ProcessedSet {
	pub fn contains(&self, name: &str) -> bool {
		self.names.contains(name)
	}

	pub fn insert(&mut self, name: impl Into<String>) -> bool {
		self.names.insert(name.into())
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	/// Names in invocation order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.names.iter().map(String::as_str)
	}
}

/// Outcome of the mutation phases.
#[derive(Debug, Clone, Default)]
pub struct OrchestrationReport {
	pub processed: ProcessedSet,
	/// Discovery passes that invoked at least one registry mutator.
	pub registry_passes: usize,
}

/// Built-in interceptors installed by [`ExtensionOrchestrator::register_interceptors`].
#[derive(Debug, Clone)]
pub struct RegisteredInterceptors {
	pub checker: Arc<InterceptorChainChecker>,
	pub listeners: Arc<ListenerDetector>,
}

/// Drives processors over a [`ComponentFactory`].
#[derive(Debug, Clone, Default)]
pub struct ExtensionOrchestrator {
	max_registry_passes: Option<usize>,
}

impl ExtensionOrchestrator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Caps registry discovery passes. `None` keeps looping until no new
	/// registry mutator appears.
	pub fn with_max_registry_passes(mut self, max: Option<usize>) -> Self {
		self.max_registry_passes = max;
		self
	}

	/// Runs registry mutation then factory mutation.
	pub fn invoke_mutators(&self, factory: &mut ComponentFactory, supplied: &[Mutator]) -> Result<OrchestrationReport, BootstrapError> {
		let mut report = OrchestrationReport::default();
		if factory.is_registry_mutable() {
			self.run_registry_phase(factory, supplied, &mut report)?;
		} else {
			for mutator in supplied {
				trace!(name = mutator.name(), "invoking supplied factory hook");
				mutator
					.mutate_factory(factory)
					.map_err(|source| hook_failed(Phase::FactoryMutation, mutator.name(), source))?;
			}
		}
		run_factory_phase(factory, &mut report.processed)?;
		Ok(report)
	}

	fn run_registry_phase(
		&self,
		factory: &mut ComponentFactory,
		supplied: &[Mutator],
		report: &mut OrchestrationReport,
	) -> Result<(), BootstrapError> {
		let phase = Phase::RegistryMutation;
		let mut touched: Vec<(String, Arc<dyn RegistryMutator>)> = Vec::new();
		let mut plain: Vec<(&str, &Arc<dyn FactoryMutator>)> = Vec::new();

		for entry in supplied {
			match entry {
				Mutator::Registry { name, mutator } => {
					trace!(name = %name, "invoking supplied registry mutator");
					mutator
						.mutate_registry(factory.registry_mut())
						.map_err(|source| hook_failed(phase, name, source))?;
					touched.push((name.clone(), Arc::clone(mutator)));
				}
				Mutator::Factory { name, mutator } => plain.push((name.as_str(), mutator)),
			}
		}

		loop {
			let pending = unprocessed(factory.registry(), CapabilitySet::REGISTRY_MUTATOR, &report.processed);
			if pending.is_empty() {
				break;
			}
			if let Some(max) = self.max_registry_passes
				&& report.registry_passes >= max
			{
				return Err(BootstrapError::FixedPointNotReached {
					passes: report.registry_passes,
					pending,
				});
			}
			report.registry_passes += 1;
			debug!(pass = report.registry_passes, pending = pending.len(), "registry mutator pass");

			for tier in Tier::ALL {
				let names: Vec<String> = unprocessed(factory.registry(), CapabilitySet::REGISTRY_MUTATOR, &report.processed)
					.into_iter()
					.filter(|name| Tier::of(factory.registry().capabilities_of(name)) == tier)
					.collect();
				for (name, processor) in instantiate(factory, names, tier, phase)? {
					let found = processor.kind();
					let Processor::Registry(mutator) = processor else {
						return Err(wrong_kind(phase, name, "registry mutator", found));
					};
					trace!(name = %name, ?tier, "invoking registry mutator");
					mutator
						.mutate_registry(factory.registry_mut())
						.map_err(|source| hook_failed(phase, &name, source))?;
					report.processed.insert(name.clone());
					touched.push((name, mutator));
				}
			}
		}

		for (name, mutator) in &touched {
			trace!(name = %name, "invoking registry mutator factory hook");
			mutator
				.mutate_factory(factory)
				.map_err(|source| hook_failed(Phase::FactoryMutation, name, source))?;
		}
		for (name, mutator) in plain {
			trace!(name, "invoking supplied factory mutator");
			mutator
				.mutate_factory(factory)
				.map_err(|source| hook_failed(Phase::FactoryMutation, name, source))?;
		}
		debug!(
			passes = report.registry_passes,
			touched = touched.len(),
			"registry mutation complete"
		);
		Ok(())
	}

	/// Registers discovered interceptors between the chain checker and the
	/// listener detector.
	///
	/// Internal interceptors are re-added after the other tiers so they sit at
	/// the tail, ahead of the listener detector only.
	pub fn register_interceptors(&self, factory: &mut ComponentFactory) -> Result<RegisteredInterceptors, BootstrapError> {
		let phase = Phase::InterceptorRegistration;
		let names: Vec<String> = factory
			.registry()
			.names_of_type(CapabilitySet::INSTANCE_INTERCEPTOR)
			.map(str::to_owned)
			.collect();

		let target = factory.interceptor_count() + 1 + names.len();
		let checker = Arc::new(InterceptorChainChecker::new(target));
		factory.add_interceptor(CHAIN_CHECKER, Arc::clone(&checker) as Arc<dyn InstanceInterceptor>);

		let mut internal: Vec<(Tier, String, Arc<dyn InstanceInterceptor>)> = Vec::new();
		for (tier, names) in partition(factory.registry(), names) {
			for (name, processor) in instantiate(factory, names, tier, phase)? {
				let found = processor.kind();
				let Processor::Interceptor(interceptor) = processor else {
					return Err(wrong_kind(phase, name, "instance interceptor", found));
				};
				if factory.registry().is_type_match(&name, CapabilitySet::INTERNAL) {
					internal.push((tier, name.clone(), Arc::clone(&interceptor)));
				}
				trace!(name = %name, ?tier, "registering interceptor");
				factory.add_interceptor(name, interceptor);
			}
		}

		internal.sort_by_key(|(tier, _, interceptor)| (*tier, interceptor.order()));
		for (_, name, interceptor) in internal {
			factory.add_interceptor(name, interceptor);
		}

		let listeners = Arc::new(ListenerDetector::new());
		factory.add_interceptor(LISTENER_DETECTOR, Arc::clone(&listeners) as Arc<dyn InstanceInterceptor>);
		debug!(count = factory.interceptor_count(), target, "registered instance interceptors");
		Ok(RegisteredInterceptors { checker, listeners })
	}
}

/// Factory mutation over every factory-mutator definition not yet processed.
fn run_factory_phase(factory: &mut ComponentFactory, processed: &mut ProcessedSet) -> Result<(), BootstrapError> {
	let phase = Phase::FactoryMutation;
	let pending = unprocessed(factory.registry(), CapabilitySet::FACTORY_MUTATOR, processed);
	for (tier, names) in partition(factory.registry(), pending) {
		for (name, processor) in instantiate(factory, names, tier, phase)? {
			if let Processor::Interceptor(_) = processor {
				return Err(wrong_kind(phase, name, "factory mutator", processor.kind()));
			}
			trace!(name = %name, ?tier, "invoking factory mutator");
			processor
				.mutate_factory(factory)
				.map_err(|source| hook_failed(phase, &name, source))?;
			processed.insert(name);
		}
	}

	factory.registry().clear_metadata_cache();
	debug!(processed = processed.len(), "factory mutation complete");
	Ok(())
}

fn unprocessed(registry: &Registry, required: CapabilitySet, processed: &ProcessedSet) -> Vec<String> {
	registry
		.names_of_type(required)
		.filter(|name| !processed.contains(name))
		.map(str::to_owned)
		.collect()
}

/// Splits names into tiers, keeping discovery order within each.
fn partition(registry: &Registry, names: Vec<String>) -> [(Tier, Vec<String>); 3] {
	let mut tiers = Tier::ALL.map(|tier| (tier, Vec::new()));
	for name in names {
		let tier = Tier::of(registry.capabilities_of(&name));
		tiers[tier as usize].1.push(name);
	}
	tiers
}

/// Instantiates one tier, sorted by order value where the tier is ordered.
fn instantiate(
	factory: &ComponentFactory,
	names: Vec<String>,
	tier: Tier,
	phase: Phase,
) -> Result<Vec<(String, Processor)>, BootstrapError> {
	let mut batch = names
		.into_iter()
		.map(|name| factory.processor(&name).map(|processor| (name, processor)))
		.collect::<Result<Vec<_>, _>>()
		.map_err(|source| BootstrapError::Provider { phase, source })?;
	if tier.is_sorted() {
		batch.sort_by_key(|(_, processor)| processor.order());
	}
	Ok(batch)
}

fn hook_failed(phase: Phase, name: &str, source: ProcessorError) -> BootstrapError {
	BootstrapError::Processor {
		phase,
		name: name.to_string(),
		source,
	}
}

fn wrong_kind(phase: Phase, name: String, expected: &'static str, found: &'static str) -> BootstrapError {
	BootstrapError::Provider {
		phase,
		source: ProviderError::WrongKind {
			name,
			expected,
			found,
		},
	}
}
