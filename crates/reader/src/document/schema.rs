//! Structural validation of the core grammar.

use crate::document::{Document, Element};
use crate::grammar::*;

/// One structural problem found by a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
	pub line: u32,
	pub message: String,
}

/// Validates a parsed document against a grammar.
pub trait SchemaValidator: Send + Sync {
	fn validate(&self, document: &Document) -> Result<(), Vec<SchemaViolation>>;
}

/// Built-in validator for the `components` grammar.
///
/// Checks element placement and attribute presence. Attribute values, including
/// empty ones, are left to the document reader. Foreign-namespace elements are
/// accepted anywhere a scope or component allows children.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentSchema;

impl SchemaValidator for ComponentSchema {
	fn validate(&self, document: &Document) -> Result<(), Vec<SchemaViolation>> {
		let mut violations = Vec::new();
		let root = &document.root;
		if root.is_default_namespace() {
			if root.local_name() == COMPONENTS_ELEMENT {
				check_scope(root, &mut violations);
			} else {
				violations.push(violation(root, format!("root element must be <{COMPONENTS_ELEMENT}>, found <{}>", root.local_name())));
			}
		}
		if violations.is_empty() { Ok(()) } else { Err(violations) }
	}
}

fn violation(element: &Element, message: String) -> SchemaViolation {
	SchemaViolation {
		line: element.line,
		message,
	}
}

fn require(element: &Element, attribute: &str, out: &mut Vec<SchemaViolation>) {
	if !element.has_attribute(attribute) {
		out.push(violation(element, format!("<{}> is missing required attribute '{attribute}'", element.local_name())));
	}
}

fn check_scope(scope: &Element, out: &mut Vec<SchemaViolation>) {
	for child in scope.elements().filter(|c| c.is_default_namespace()) {
		match child.local_name() {
			DESCRIPTION_ELEMENT => {}
			IMPORT_ELEMENT => require(child, RESOURCE_ATTRIBUTE, out),
			ALIAS_ELEMENT => {
				require(child, NAME_ATTRIBUTE, out);
				require(child, ALIAS_ATTRIBUTE, out);
			}
			COMPONENT_ELEMENT => check_component(child, out),
			COMPONENTS_ELEMENT => check_scope(child, out),
			other => out.push(violation(child, format!("<{other}> is not allowed inside <{COMPONENTS_ELEMENT}>"))),
		}
	}
}

fn check_component(component: &Element, out: &mut Vec<SchemaViolation>) {
	for child in component.elements().filter(|c| c.is_default_namespace()) {
		match child.local_name() {
			DESCRIPTION_ELEMENT => {}
			PROPERTY_ELEMENT => {
				require(child, NAME_ATTRIBUTE, out);
				check_property(child, out);
			}
			other => out.push(violation(child, format!("<{other}> is not allowed inside <{COMPONENT_ELEMENT}>"))),
		}
	}
}

fn check_property(property: &Element, out: &mut Vec<SchemaViolation>) {
	for child in property.elements().filter(|c| c.is_default_namespace()) {
		match child.local_name() {
			DESCRIPTION_ELEMENT | VALUE_ELEMENT => {}
			COMPONENT_ELEMENT => check_component(child, out),
			other => out.push(violation(child, format!("<{other}> is not allowed inside <{PROPERTY_ELEMENT}>"))),
		}
	}
}
