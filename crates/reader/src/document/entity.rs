//! Local resolution of grammar references.
//!
//! DOCTYPE system ids and `xsi:schemaLocation` hints resolve either to the
//! built-in grammars or to resources next to the document. Nothing is
//! fetched over the network.

use std::sync::Arc;

use tracing::trace;

use crate::grammar::{COMPONENTS_DTD, COMPONENTS_XSD};
use crate::resource::{Resource, ResourceResolver, is_absolute_location};

/// Where a grammar reference resolved to.
#[derive(Debug, Clone)]
pub enum ResolvedEntity {
	/// One of the grammars bundled with the reader, by file name.
	Builtin(&'static str),
	Resource(Arc<dyn Resource>),
}

pub trait EntityResolver: Send + Sync {
	/// Resolves a grammar reference. `None` means it cannot be resolved locally.
	fn resolve_entity(&self, public_id: Option<&str>, system_id: &str) -> Option<ResolvedEntity>;
}

/// Recognizes the bundled grammars by file name.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEntityResolver;

impl EntityResolver for BuiltinEntityResolver {
	fn resolve_entity(&self, _public_id: Option<&str>, system_id: &str) -> Option<ResolvedEntity> {
		let file_name = system_id.rsplit('/').next().unwrap_or(system_id);
		[COMPONENTS_DTD, COMPONENTS_XSD]
			.into_iter()
			.find(|builtin| *builtin == file_name)
			.map(ResolvedEntity::Builtin)
	}
}

/// Built-in grammars first, then resources relative to the current document.
#[derive(Clone)]
pub struct ResourceEntityResolver {
	resolver: Arc<dyn ResourceResolver>,
	base: Option<Arc<dyn Resource>>,
}

impl ResourceEntityResolver {
	pub fn new(resolver: Arc<dyn ResourceResolver>, base: Option<Arc<dyn Resource>>) -> Self {
		Self { resolver, base }
	}
}

impl EntityResolver for ResourceEntityResolver {
	fn resolve_entity(&self, public_id: Option<&str>, system_id: &str) -> Option<ResolvedEntity> {
		if let Some(builtin) = BuiltinEntityResolver.resolve_entity(public_id, system_id) {
			return Some(builtin);
		}

		let resource = if is_absolute_location(system_id) {
			self.resolver.resource(system_id).ok()
		} else {
			self.base.as_ref().and_then(|base| base.create_relative(system_id).ok())
		};
		let resource = resource.filter(|r| r.exists());
		trace!(system_id, resolved = resource.is_some(), "resolved grammar reference");
		resource.map(ResolvedEntity::Resource)
	}
}
