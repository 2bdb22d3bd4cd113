//! Ordered definition store with alias table.
//!
//! # Invariants
//!
//! - A name maps to at most one [`Definition`]; re-registration overwrites in
//!   place and keeps the original discovery position.
//! - Every alias resolves, possibly through other aliases, to a registered
//!   definition name. Removing a definition drops the aliases that pointed at it.
//! - Capability answers are cached per name until the definition changes or
//!   [`Registry::clear_metadata_cache`] runs.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::capability::CapabilitySet;
use crate::catalog::{EmptyTypeCatalog, TypeCatalog};
use crate::definition::Definition;
use crate::error::{AliasError, RegistryError};

/// Authoritative store of definitions and aliases.
pub struct Registry {
	definitions: IndexMap<String, Definition>,
	/// Alias to target name. Targets may themselves be aliases.
	aliases: IndexMap<String, String>,
	allow_overriding: bool,
	catalog: Arc<dyn TypeCatalog>,
	type_cache: Mutex<FxHashMap<String, CapabilitySet>>,
}

impl Registry {
	/// Creates an empty registry answering capability queries through `catalog`.
	pub fn new(catalog: Arc<dyn TypeCatalog>) -> Self {
		Self {
			definitions: IndexMap::new(),
			aliases: IndexMap::new(),
			allow_overriding: true,
			catalog,
			type_cache: Mutex::new(FxHashMap::default()),
		}
	}

	pub fn allows_overriding(&self) -> bool {
		self.allow_overriding
	}

	/// Controls whether registering an existing name replaces it or fails.
	pub fn set_allow_overriding(&mut self, allow: bool) {
		self.allow_overriding = allow;
	}

	/// Replaces the capability catalog and drops cached answers.
	pub fn set_catalog(&mut self, catalog: Arc<dyn TypeCatalog>) {
		self.catalog = catalog;
		self.clear_metadata_cache();
	}

	/// Registers `definition` under `name`, returning the definition it replaced.
	pub fn register(&mut self, name: &str, definition: Definition) -> Result<Option<Definition>, RegistryError> {
		if name.trim().is_empty() {
			return Err(RegistryError::InvalidName(name.to_string()));
		}

		if self.definitions.contains_key(name) {
			if !self.allow_overriding {
				return Err(RegistryError::OverrideNotAllowed { name: name.to_string() });
			}
			debug!(definition = name, "overriding definition");
		} else if self.aliases.contains_key(name) {
			if !self.allow_overriding {
				return Err(RegistryError::OverrideNotAllowed { name: name.to_string() });
			}
			debug!(definition = name, "definition replaces alias of the same name");
			self.aliases.shift_remove(name);
		}

		self.type_cache.lock().remove(name);
		trace!(definition = name, type_ref = ?definition.type_ref, "registered definition");
		Ok(self.definitions.insert(name.to_string(), definition))
	}

	/// Removes the definition registered under `name` and every alias pointing at it.
	pub fn remove(&mut self, name: &str) -> Result<Definition, RegistryError> {
		let removed = self
			.definitions
			.shift_remove(name)
			.ok_or_else(|| RegistryError::NoSuchDefinition(name.to_string()))?;
		let dangling: Vec<String> = self
			.aliases
			.keys()
			.filter(|alias| self.resolve_alias_chain(alias) == name)
			.cloned()
			.collect();
		for alias in dangling {
			self.aliases.shift_remove(&alias);
		}
		self.type_cache.lock().remove(name);
		Ok(removed)
	}

	/// Binds `alias` to `name`.
	///
	/// `name` may itself be an alias. Binding a name to itself removes any
	/// alias of that spelling.
	pub fn register_alias(&mut self, name: &str, alias: &str) -> Result<(), AliasError> {
		if alias == name {
			self.aliases.shift_remove(alias);
			return Ok(());
		}

		if let Some(existing) = self.aliases.get(alias) {
			if existing == name {
				return Ok(());
			}
			return Err(AliasError::AlreadyBound {
				name: name.to_string(),
				alias: alias.to_string(),
				existing: existing.clone(),
			});
		}

		if self.definitions.contains_key(alias) {
			return Err(AliasError::ShadowsDefinition {
				name: name.to_string(),
				alias: alias.to_string(),
			});
		}

		if !self.contains(name) {
			return Err(AliasError::UnknownName {
				name: name.to_string(),
				alias: alias.to_string(),
			});
		}

		self.aliases.insert(alias.to_string(), name.to_string());
		Ok(())
	}

	/// Returns true if `alias` is registered as an alias.
	pub fn is_alias(&self, alias: &str) -> bool {
		self.aliases.contains_key(alias)
	}

	/// Follows the alias chain starting at `name`.
	pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
		self.resolve_alias_chain(name)
	}

	fn resolve_alias_chain<'a>(&'a self, name: &'a str) -> &'a str {
		let mut current = name;
		// Aliases only target known names, so the chain is acyclic and bounded.
		while let Some(target) = self.aliases.get(current) {
			current = target.as_str();
		}
		current
	}

	/// Returns every alias that resolves to `name`, in registration order.
	pub fn aliases_of(&self, name: &str) -> Vec<&str> {
		let canonical = self.canonical_name(name);
		self.aliases
			.keys()
			.filter(|alias| alias.as_str() != name && self.resolve_alias_chain(alias) == canonical)
			.map(String::as_str)
			.collect()
	}

	/// Returns true if `name` is a definition name or resolves to one.
	pub fn contains(&self, name: &str) -> bool {
		self.definitions.contains_key(self.canonical_name(name))
	}

	/// Returns true if a definition is registered under exactly `name`.
	pub fn contains_definition(&self, name: &str) -> bool {
		self.definitions.contains_key(name)
	}

	/// Looks up a definition by name or alias.
	pub fn get(&self, name: &str) -> Option<&Definition> {
		self.definitions.get(self.canonical_name(name))
	}

	/// Mutable lookup by name or alias. Drops the cached capability answer.
	pub fn get_mut(&mut self, name: &str) -> Option<&mut Definition> {
		let canonical = self.resolve_alias_chain(name).to_string();
		self.type_cache.lock().remove(&canonical);
		self.definitions.get_mut(&canonical)
	}

	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}

	/// Definition names in registration order.
	pub fn names(&self) -> impl Iterator<Item = &str> + Clone + '_ {
		self.definitions.keys().map(String::as_str)
	}

	/// Definitions in registration order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Definition)> + '_ {
		self.definitions.iter().map(|(name, def)| (name.as_str(), def))
	}

	/// Mutable iteration for factory-level rewrites that keep the structure intact.
	pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Definition)> + '_ {
		self.type_cache.lock().clear();
		self.definitions.iter_mut().map(|(name, def)| (name.as_str(), def))
	}

	/// Names whose definitions satisfy `required`, in registration order.
	///
	/// The sequence is lazy and can be restarted by cloning it before iteration.
	pub fn names_of_type(&self, required: CapabilitySet) -> NamesOfType<'_> {
		NamesOfType {
			registry: self,
			keys: self.definitions.keys(),
			required,
		}
	}

	/// Returns true if the definition behind `name` satisfies `required`.
	pub fn is_type_match(&self, name: &str, required: CapabilitySet) -> bool {
		self.capabilities_of(name).satisfies(required)
	}

	/// Capabilities of the definition behind `name`; empty when unknown or untyped.
	pub fn capabilities_of(&self, name: &str) -> CapabilitySet {
		let canonical = self.canonical_name(name);
		if let Some(caps) = self.type_cache.lock().get(canonical) {
			return *caps;
		}

		let Some(definition) = self.definitions.get(canonical) else {
			return CapabilitySet::empty();
		};
		let caps = definition
			.type_ref
			.as_deref()
			.map(|type_ref| self.catalog.capabilities(type_ref))
			.unwrap_or_default();
		self.type_cache.lock().insert(canonical.to_string(), caps);
		caps
	}

	/// Drops derived capability answers. Run after hooks that may have rewritten definitions.
	pub fn clear_metadata_cache(&self) {
		self.type_cache.lock().clear();
	}

	/// Number of cached capability answers.
	pub fn cached_metadata_len(&self) -> usize {
		self.type_cache.lock().len()
	}

	/// Freezes the registry for concurrent readers.
	pub fn into_shared(self) -> Arc<Self> {
		Arc::new(self)
	}
}

impl Default for Registry {
	fn default() -> Self {
		Self::new(Arc::new(EmptyTypeCatalog))
	}
}

impl fmt::Debug for Registry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registry")
			.field("definitions", &self.definitions.keys().collect::<Vec<_>>())
			.field("aliases", &self.aliases)
			.field("allow_overriding", &self.allow_overriding)
			.finish_non_exhaustive()
	}
}

/// Lazy iterator over names satisfying a capability query.
#[derive(Clone)]
pub struct NamesOfType<'a> {
	registry: &'a Registry,
	keys: indexmap::map::Keys<'a, String, Definition>,
	required: CapabilitySet,
}

impl<'a> Iterator for NamesOfType<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<&'a str> {
		let registry = self.registry;
		let required = self.required;
		self.keys
			.find(|name| registry.is_type_match(name, required))
			.map(String::as_str)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(0, self.keys.size_hint().1)
	}
}

#[cfg(test)]
mod tests;
