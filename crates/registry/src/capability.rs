bitflags::bitflags! {
	/// Capabilities a definition's type reference can satisfy.
	///
	/// Processor kinds and ordering tiers are answered through this set so the
	/// orchestrator never has to inspect an instance to classify it.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct CapabilitySet: u32 {
		/// Mutates the definition factory after the registry is populated.
		const FACTORY_MUTATOR = 1 << 0;
		/// Mutates the registry structure. Every registry mutator is also a factory mutator.
		const REGISTRY_MUTATOR = (1 << 1) | Self::FACTORY_MUTATOR.bits();
		/// Intercepts component instances around initialization.
		const INSTANCE_INTERCEPTOR = 1 << 2;
		/// Ordered ahead of everything else in its phase.
		const PRIORITY_ORDERED = 1 << 3;
		/// Carries an explicit order value.
		const ORDERED = 1 << 4;
		/// Interceptor that processes other interceptors; registered last.
		const INTERNAL = 1 << 5;
		/// Receives container events once instantiated.
		const LISTENER = 1 << 6;
	}
}

impl CapabilitySet {
	/// Returns true if any processor kind is present.
	pub const fn is_processor(self) -> bool {
		self.intersects(Self::FACTORY_MUTATOR.union(Self::INSTANCE_INTERCEPTOR))
	}

	/// Returns true if this set satisfies every flag in `required`.
	///
	/// An empty requirement never matches; a capability query always names
	/// at least one flag.
	pub const fn satisfies(self, required: CapabilitySet) -> bool {
		!required.is_empty() && self.contains(required)
	}
}

#[cfg(test)]
mod tests {
	use super::CapabilitySet;

	#[test]
	fn registry_mutator_implies_factory_mutator() {
		assert!(CapabilitySet::REGISTRY_MUTATOR.satisfies(CapabilitySet::FACTORY_MUTATOR));
		assert!(!CapabilitySet::FACTORY_MUTATOR.satisfies(CapabilitySet::REGISTRY_MUTATOR));
	}

	#[test]
	fn empty_requirement_never_matches() {
		assert!(!CapabilitySet::all().satisfies(CapabilitySet::empty()));
	}

	#[test]
	fn ordering_flags_are_not_processor_kinds() {
		assert!(!(CapabilitySet::ORDERED | CapabilitySet::LISTENER).is_processor());
		assert!((CapabilitySet::INSTANCE_INTERCEPTOR | CapabilitySet::ORDERED).is_processor());
	}
}
