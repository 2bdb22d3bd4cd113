//! Interceptors the orchestrator registers around discovered ones.

use blueprint_registry::CapabilitySet;
use indexmap::IndexSet;
use parking_lot::Mutex;
use tracing::{info, trace};

use crate::error::ProcessorError;
use crate::processor::{ComponentView, InstanceInterceptor, Ordered};

/// Chain name of the [`InterceptorChainChecker`].
pub const CHAIN_CHECKER: &str = "blueprint.interceptorChainChecker";

/// Chain name of the [`ListenerDetector`].
pub const LISTENER_DETECTOR: &str = "blueprint.listenerDetector";

/// Notices components created while the interceptor chain is still being
/// registered. Such components miss part of the chain; this only logs.
#[derive(Debug)]
pub struct InterceptorChainChecker {
	target: usize,
	ineligible: Mutex<Vec<String>>,
}

impl InterceptorChainChecker {
	/// `target` is the chain length once registration completes.
	pub fn new(target: usize) -> Self {
		Self {
			target,
			ineligible: Mutex::new(Vec::new()),
		}
	}

	pub fn target(&self) -> usize {
		self.target
	}

	/// Components reported as not eligible for the full chain.
	pub fn ineligible(&self) -> Vec<String> {
		self.ineligible.lock().clone()
	}
}

impl Ordered for InterceptorChainChecker {}

impl InstanceInterceptor for InterceptorChainChecker {
	fn after_initialization(&self, component: &ComponentView<'_>) -> Result<(), ProcessorError> {
		if component.capabilities.contains(CapabilitySet::INSTANCE_INTERCEPTOR)
			|| component.definition.is_infrastructure()
			|| component.interceptor_count >= self.target
		{
			return Ok(());
		}
		info!(
			name = component.name,
			registered = component.interceptor_count,
			target = self.target,
			"component is not eligible for processing by all instance interceptors"
		);
		self.ineligible.lock().push(component.name.to_string());
		Ok(())
	}
}

/// Records listener-capable components as they are initialized.
#[derive(Debug, Default)]
pub struct ListenerDetector {
	listeners: Mutex<IndexSet<String>>,
}

impl ListenerDetector {
	pub fn new() -> Self {
		Self::default()
	}

	/// Detected listener names in first-seen order.
	pub fn listeners(&self) -> Vec<String> {
		self.listeners.lock().iter().cloned().collect()
	}
}

impl Ordered for ListenerDetector {}

impl InstanceInterceptor for ListenerDetector {
	fn after_initialization(&self, component: &ComponentView<'_>) -> Result<(), ProcessorError> {
		if component.capabilities.contains(CapabilitySet::LISTENER) && self.listeners.lock().insert(component.name.to_string()) {
			trace!(name = component.name, "detected listener");
		}
		Ok(())
	}
}
