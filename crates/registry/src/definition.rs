//! Declarative component definitions.
//!
//! A [`Definition`] describes a component that will be materialized later by
//! the instantiation engine. Type references stay unresolved strings; the
//! registry answers capability questions about them through a
//! [`TypeCatalog`](crate::TypeCatalog).

use std::fmt;

/// Role hint distinguishing application components from container plumbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
	/// Ordinary application component.
	#[default]
	Application,
	/// Internal support component.
	Infrastructure,
}

impl Role {
	/// Parses the `role` attribute value.
	pub fn parse(value: &str) -> Option<Self> {
		match value.trim() {
			"application" => Some(Self::Application),
			"infrastructure" => Some(Self::Infrastructure),
			_ => None,
		}
	}
}

/// Autowire mode recorded on a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Autowire {
	#[default]
	No,
	ByName,
	ByType,
	Constructor,
}

impl Autowire {
	/// Parses a document attribute value. `"default"` is handled by the caller.
	pub fn parse(value: &str) -> Option<Self> {
		match value.trim() {
			"no" => Some(Self::No),
			"by-name" => Some(Self::ByName),
			"by-type" => Some(Self::ByType),
			"constructor" => Some(Self::Constructor),
			_ => None,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::No => "no",
			Self::ByName => "by-name",
			Self::ByType => "by-type",
			Self::Constructor => "constructor",
		}
	}
}

impl fmt::Display for Autowire {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Where a definition was declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
	/// Human-readable description of the containing resource.
	pub resource: String,
	/// 1-based line of the declaring element, if known.
	pub line: Option<u32>,
}

impl SourceLocation {
	pub fn new(resource: impl Into<String>, line: Option<u32>) -> Self {
		Self {
			resource: resource.into(),
			line,
		}
	}
}

impl fmt::Display for SourceLocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.line {
			Some(line) => write!(f, "{}:{line}", self.resource),
			None => f.write_str(&self.resource),
		}
	}
}

/// Value assigned to a named property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
	/// Literal string, converted later by the instantiation engine.
	Literal(String),
	/// By-name reference to another definition.
	Reference(String),
	/// Anonymous inner definition.
	Nested(Box<DefinitionHolder>),
}

/// One property assignment on a definition.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
	pub name: String,
	pub value: PropertyValue,
}

impl PropertySpec {
	pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: PropertyValue::Literal(value.into()),
		}
	}

	pub fn reference(name: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: PropertyValue::Reference(target.into()),
		}
	}

	pub fn nested(name: impl Into<String>, holder: DefinitionHolder) -> Self {
		Self {
			name: name.into(),
			value: PropertyValue::Nested(Box::new(holder)),
		}
	}
}

/// Declarative description of a component, not yet materialized.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Definition {
	/// Unresolved type reference.
	pub type_ref: Option<String>,
	/// Ordered property assignments.
	pub properties: Vec<PropertySpec>,
	pub role: Role,
	pub lazy_init: bool,
	pub autowire: Autowire,
	pub init_method: Option<String>,
	pub destroy_method: Option<String>,
	/// Declaration site, for diagnostics.
	pub source: Option<SourceLocation>,
}

impl Definition {
	/// Creates a definition for the given type reference with default settings.
	pub fn of_type(type_ref: impl Into<String>) -> Self {
		Self {
			type_ref: Some(type_ref.into()),
			..Self::default()
		}
	}

	pub fn with_property(mut self, property: PropertySpec) -> Self {
		self.properties.push(property);
		self
	}

	pub fn with_role(mut self, role: Role) -> Self {
		self.role = role;
		self
	}

	pub fn with_source(mut self, source: SourceLocation) -> Self {
		self.source = Some(source);
		self
	}

	/// Returns the property assigned under `name`, if any.
	pub fn property(&self, name: &str) -> Option<&PropertyValue> {
		self.properties.iter().find(|p| p.name == name).map(|p| &p.value)
	}

	pub fn is_infrastructure(&self) -> bool {
		self.role == Role::Infrastructure
	}
}

/// A definition together with its registration name and aliases.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionHolder {
	pub name: String,
	pub definition: Definition,
	pub aliases: Vec<String>,
}

impl DefinitionHolder {
	pub fn new(name: impl Into<String>, definition: Definition) -> Self {
		Self {
			name: name.into(),
			definition,
			aliases: Vec::new(),
		}
	}

	pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.aliases.extend(aliases.into_iter().map(Into::into));
		self
	}
}
