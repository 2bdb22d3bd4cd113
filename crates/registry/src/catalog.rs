//! Type reference capability lookup.

use indexmap::IndexMap;

use crate::capability::CapabilitySet;

/// Answers which capabilities a type reference satisfies.
///
/// Type references are resolved lazily by an external collaborator; the
/// registry only needs this predicate to classify definitions.
pub trait TypeCatalog: Send + Sync {
	/// Returns the capabilities of `type_ref`, or an empty set when unknown.
	fn capabilities(&self, type_ref: &str) -> CapabilitySet;
}

/// Catalog backed by an explicit table.
#[derive(Debug, Clone, Default)]
pub struct StaticTypeCatalog {
	types: IndexMap<String, CapabilitySet>,
}

impl StaticTypeCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares capabilities for a type reference, merging with earlier declarations.
	pub fn declare(&mut self, type_ref: impl Into<String>, caps: CapabilitySet) -> &mut Self {
		*self.types.entry(type_ref.into()).or_default() |= caps;
		self
	}

	pub fn with(mut self, type_ref: impl Into<String>, caps: CapabilitySet) -> Self {
		self.declare(type_ref, caps);
		self
	}
}

impl TypeCatalog for StaticTypeCatalog {
	fn capabilities(&self, type_ref: &str) -> CapabilitySet {
		self.types.get(type_ref).copied().unwrap_or_default()
	}
}

/// Catalog that knows no types; every query yields an empty set.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyTypeCatalog;

impl TypeCatalog for EmptyTypeCatalog {
	fn capabilities(&self, _type_ref: &str) -> CapabilitySet {
		CapabilitySet::empty()
	}
}
