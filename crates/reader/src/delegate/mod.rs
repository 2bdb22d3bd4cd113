//! Component element grammar.
//!
//! The document reader hands each `component` element to a
//! [`DefinitionParserDelegate`]; registered [`DefinitionDecorator`]s then wrap
//! the produced holder in order.

use blueprint_registry::{Autowire, Definition, DefinitionHolder, PropertySpec, Registry, Role, SourceLocation};

use crate::document::Element;
use crate::environment::{Environment, tokenize};
use crate::error::ElementError;
use crate::grammar::*;
use crate::state::ParserState;

/// Read-only view of the reading context handed to delegates and decorators.
pub struct ParseContext<'a> {
	pub registry: &'a Registry,
	pub environment: &'a dyn Environment,
	/// Description of the resource being read.
	pub resource: &'a str,
}

impl ParseContext<'_> {
	pub fn source_of(&self, element: &Element) -> SourceLocation {
		SourceLocation::new(self.resource, Some(element.line))
	}
}

/// Parses one component element.
pub trait DefinitionParserDelegate: Send + Sync {
	/// Returns `Ok(None)` when the element is skipped, e.g. for an inactive profile.
	fn parse_component(
		&self,
		element: &Element,
		state: &ParserState,
		ctx: &ParseContext<'_>,
	) -> Result<Option<DefinitionHolder>, ElementError>;
}

/// Wraps or rewrites a parsed holder before registration.
pub trait DefinitionDecorator: Send + Sync {
	fn decorate(
		&self,
		element: &Element,
		holder: DefinitionHolder,
		ctx: &ParseContext<'_>,
	) -> Result<DefinitionHolder, ElementError>;
}

/// Grammar of the `component` element.
///
/// ```xml
/// <component id="a" name="b,c" type="demo.Service" lazy-init="true" role="infrastructure">
///     <property name="port" value="8080"/>
///     <property name="store" ref="db"/>
///     <property name="banner"><value>hello</value></property>
///     <property name="codec"><component type="demo.Codec"/></property>
/// </component>
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultComponentDelegate;

impl DefinitionParserDelegate for DefaultComponentDelegate {
	fn parse_component(
		&self,
		element: &Element,
		state: &ParserState,
		ctx: &ParseContext<'_>,
	) -> Result<Option<DefinitionHolder>, ElementError> {
		if let Some(profiles) = element.attribute(PROFILE_ATTRIBUTE).map(tokenize)
			&& !profiles.is_empty()
			&& !ctx.environment.accepts_profiles(&profiles)
		{
			return Ok(None);
		}

		let definition = self.parse_definition(element, state, ctx)?;
		let (name, aliases) = match self.declared_names(element) {
			(Some(id), aliases) => (id, aliases),
			(None, mut aliases) if !aliases.is_empty() => (aliases.remove(0), aliases),
			(None, aliases) => (generate_name(&definition, ctx.registry), aliases),
		};
		Ok(Some(DefinitionHolder {
			name,
			definition,
			aliases,
		}))
	}
}

impl DefaultComponentDelegate {
	/// `id` plus the tokens of `name`. Duplicates of the id are dropped.
	fn declared_names(&self, element: &Element) -> (Option<String>, Vec<String>) {
		let id = element
			.attribute(ID_ATTRIBUTE)
			.map(str::trim)
			.filter(|id| !id.is_empty())
			.map(str::to_string);
		let mut aliases: Vec<String> = Vec::new();
		for token in element.attribute(NAME_ATTRIBUTE).map(tokenize).unwrap_or_default() {
			if id.as_deref() != Some(token) && !aliases.iter().any(|a| a == token) {
				aliases.push(token.to_string());
			}
		}
		(id, aliases)
	}

	fn parse_definition(
		&self,
		element: &Element,
		state: &ParserState,
		ctx: &ParseContext<'_>,
	) -> Result<Definition, ElementError> {
		let type_ref = element
			.attribute(TYPE_ATTRIBUTE)
			.map(str::trim)
			.filter(|t| !t.is_empty())
			.ok_or(ElementError::MissingAttribute {
				element: COMPONENT_ELEMENT,
				attribute: TYPE_ATTRIBUTE,
			})?;

		let lazy_init = match inherited(element, LAZY_INIT_ATTRIBUTE) {
			None => state.lazy_init,
			Some("true") => true,
			Some("false") => false,
			Some(other) => return Err(invalid(LAZY_INIT_ATTRIBUTE, other)),
		};
		let autowire = match inherited(element, AUTOWIRE_ATTRIBUTE) {
			None => state.autowire,
			Some(value) => Autowire::parse(value).ok_or_else(|| invalid(AUTOWIRE_ATTRIBUTE, value))?,
		};
		let role = match inherited(element, ROLE_ATTRIBUTE) {
			None => Role::default(),
			Some(value) => Role::parse(value).ok_or_else(|| invalid(ROLE_ATTRIBUTE, value))?,
		};

		let mut properties = Vec::new();
		for child in element.elements().filter(|c| c.is(PROPERTY_ELEMENT)) {
			properties.push(self.parse_property(child, state, ctx)?);
		}

		Ok(Definition {
			type_ref: Some(type_ref.to_string()),
			properties,
			role,
			lazy_init,
			autowire,
			init_method: inherited(element, INIT_METHOD_ATTRIBUTE)
				.map(str::to_string)
				.or_else(|| state.init_method.clone()),
			destroy_method: inherited(element, DESTROY_METHOD_ATTRIBUTE)
				.map(str::to_string)
				.or_else(|| state.destroy_method.clone()),
			source: Some(ctx.source_of(element)),
		})
	}

	fn parse_property(
		&self,
		element: &Element,
		state: &ParserState,
		ctx: &ParseContext<'_>,
	) -> Result<PropertySpec, ElementError> {
		let name = element
			.attribute(NAME_ATTRIBUTE)
			.map(str::trim)
			.filter(|n| !n.is_empty())
			.ok_or(ElementError::MissingAttribute {
				element: PROPERTY_ELEMENT,
				attribute: NAME_ATTRIBUTE,
			})?;
		let nested: Vec<&Element> = element
			.elements()
			.filter(|c| c.is(VALUE_ELEMENT) || c.is(COMPONENT_ELEMENT))
			.collect();

		match (element.attribute(VALUE_ATTRIBUTE), element.attribute(REF_ATTRIBUTE), nested.as_slice()) {
			(Some(value), None, []) => Ok(PropertySpec::literal(name, value)),
			(None, Some(target), []) => match target.trim() {
				"" => Err(ElementError::Invalid(format!("property '{name}' has an empty ref"))),
				target => Ok(PropertySpec::reference(name, target)),
			},
			(None, None, [value]) if value.is(VALUE_ELEMENT) => Ok(PropertySpec::literal(name, value.text.clone())),
			(None, None, [component]) => {
				let holder = self.parse_inner(component, name, state, ctx)?;
				Ok(PropertySpec::nested(name, holder))
			}
			(None, None, []) => Err(ElementError::Invalid(format!("property '{name}' has no value"))),
			_ => Err(ElementError::Invalid(format!(
				"property '{name}' must declare exactly one of 'value', 'ref' or a nested element"
			))),
		}
	}

	fn parse_inner(
		&self,
		element: &Element,
		property: &str,
		state: &ParserState,
		ctx: &ParseContext<'_>,
	) -> Result<DefinitionHolder, ElementError> {
		let definition = self.parse_definition(element, state, ctx)?;
		let (id, aliases) = self.declared_names(element);
		let name = id
			.or_else(|| aliases.first().cloned())
			.unwrap_or_else(|| format!("({property})#inner"));
		Ok(DefinitionHolder {
			name,
			definition,
			aliases: Vec::new(),
		})
	}
}

/// Attribute value with `"default"` and blanks treated as absent.
fn inherited<'e>(element: &'e Element, attribute: &str) -> Option<&'e str> {
	element
		.attribute(attribute)
		.map(str::trim)
		.filter(|value| !value.is_empty() && *value != DEFAULT_VALUE)
}

fn invalid(attribute: &'static str, value: &str) -> ElementError {
	ElementError::InvalidAttribute {
		attribute,
		value: value.to_string(),
	}
}

/// `type#N` with the first `N` not taken in `registry`.
fn generate_name(definition: &Definition, registry: &Registry) -> String {
	let base = definition.type_ref.as_deref().unwrap_or("component");
	(0u32..)
		.map(|n| format!("{base}#{n}"))
		.find(|candidate| !registry.contains(candidate))
		.unwrap_or_else(|| base.to_string())
}
