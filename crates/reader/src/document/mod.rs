//! Parsed document tree and the loader producing it.
//!
//! # Modules
//!
//! - [`loader`] - XML parsing with validation mode selection
//! - [`entity`] - Local resolution of DOCTYPE and schema location references
//! - [`schema`] - Structural validation of the core grammar

pub mod entity;
pub mod loader;
pub mod schema;

use crate::grammar::DEFAULT_NAMESPACE;

/// Namespace-qualified element or attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
	/// Resolved namespace URI. `None` when unqualified or when parsing
	/// without namespace awareness.
	pub namespace: Option<String>,
	pub prefix: Option<String>,
	pub local: String,
}

impl QualifiedName {
	pub fn local(local: impl Into<String>) -> Self {
		Self {
			namespace: None,
			prefix: None,
			local: local.into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	pub name: QualifiedName,
	pub value: String,
}

/// Element node. Only element children are kept; text is concatenated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
	pub name: QualifiedName,
	pub attributes: Vec<Attribute>,
	pub children: Vec<Element>,
	pub text: String,
	/// 1-based line of the start tag.
	pub line: u32,
}

impl Element {
	pub fn new(name: QualifiedName, line: u32) -> Self {
		Self {
			name,
			attributes: Vec::new(),
			children: Vec::new(),
			text: String::new(),
			line,
		}
	}

	pub fn local_name(&self) -> &str {
		&self.name.local
	}

	pub fn namespace(&self) -> Option<&str> {
		self.name.namespace.as_deref()
	}

	/// Returns true for elements of the core grammar, including unqualified ones.
	pub fn is_default_namespace(&self) -> bool {
		self.namespace().is_none_or(|ns| ns == DEFAULT_NAMESPACE)
	}

	/// Returns true if this is the core-grammar element `local`.
	pub fn is(&self, local: &str) -> bool {
		self.is_default_namespace() && self.name.local == local
	}

	/// Value of the unqualified attribute `local`.
	pub fn attribute(&self, local: &str) -> Option<&str> {
		self.attributes
			.iter()
			.find(|a| a.name.namespace.is_none() && a.name.local == local)
			.map(|a| a.value.as_str())
	}

	pub fn attribute_ns(&self, namespace: &str, local: &str) -> Option<&str> {
		self.attributes
			.iter()
			.find(|a| a.name.namespace.as_deref() == Some(namespace) && a.name.local == local)
			.map(|a| a.value.as_str())
	}

	pub fn has_attribute(&self, local: &str) -> bool {
		self.attribute(local).is_some()
	}

	pub fn elements(&self) -> impl Iterator<Item = &Element> {
		self.children.iter()
	}
}

/// Parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
	pub root: Element,
	/// Raw DOCTYPE declaration, without the `<!DOCTYPE` and `>` delimiters.
	pub doctype: Option<String>,
	/// Description of the resource the document was read from.
	pub resource: String,
}
