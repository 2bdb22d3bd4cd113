use std::sync::Arc;

use blueprint_registry::{DefinitionHolder, Registry, Role};
use pretty_assertions::assert_eq;

use super::{Fixture, names};
use crate::delegate::{DefinitionDecorator, ParseContext};
use crate::document::Element;
use crate::error::ElementError;
use crate::events::ReaderEvent;

#[test]
fn alias_with_empty_name_is_one_error_and_siblings_load() {
	let fx = Fixture::new();
	fx.document(
		"A.xml",
		r#"<component id="a" type="demo.A"/>
		<alias name="" alias="x"/>
		<component id="b" type="demo.B"/>"#,
	);

	let mut registry = Registry::default();
	fx.reader().load_definitions(&mut registry, "A.xml").expect("load");

	assert_eq!(names(&registry), vec!["a", "b"]);
	assert!(!registry.is_alias("x"));
	let problems = fx.problems();
	assert_eq!(problems.len(), 1);
	assert_eq!(problems[0].location.as_ref().and_then(|l| l.line), Some(4));
}

#[test]
fn alias_missing_both_values_reports_each() {
	let fx = Fixture::new();
	fx.document("A.xml", r#"<alias name=" " alias=""/>"#);

	fx.reader().load_definitions(&mut Registry::default(), "A.xml").expect("load");
	assert_eq!(fx.problems().len(), 2);
}

#[test]
fn alias_registry_errors_are_directive_local() {
	let fx = Fixture::new();
	fx.document(
		"A.xml",
		r#"<alias name="ghost" alias="g"/>
		<component id="a" type="demo.A"/>
		<alias name="a" alias="first"/>"#,
	);

	let mut registry = Registry::default();
	fx.reader().load_definitions(&mut registry, "A.xml").expect("load");

	assert_eq!(registry.canonical_name("first"), "a");
	assert_eq!(fx.problems().len(), 1);
	let aliases: Vec<(String, String)> = fx
		.events()
		.into_iter()
		.filter_map(|event| match event {
			ReaderEvent::AliasRegistered { name, alias, .. } => Some((name, alias)),
			_ => None,
		})
		.collect();
	assert_eq!(aliases, vec![("a".to_string(), "first".to_string())]);
}

#[test]
fn component_names_register_as_aliases() {
	let fx = Fixture::new();
	fx.document("A.xml", r#"<component id="main" name="m1 m2" type="demo.A"/>"#);

	let mut registry = Registry::default();
	fx.reader().load_definitions(&mut registry, "A.xml").expect("load");

	assert_eq!(registry.aliases_of("main"), vec!["m1", "m2"]);
}

#[test]
fn malformed_component_is_local_error() {
	let fx = Fixture::new();
	fx.document(
		"A.xml",
		r#"<component id="broken"/>
		<component id="ok" type="demo.A"/>"#,
	);

	let mut registry = Registry::default();
	let count = fx.reader().load_definitions(&mut registry, "A.xml").expect("load");

	assert_eq!(count, 1);
	assert_eq!(fx.problems().len(), 1);
	assert_eq!(fx.registered(), vec!["ok"]);
}

struct RoleDecorator;

impl DefinitionDecorator for RoleDecorator {
	fn decorate(
		&self,
		_element: &Element,
		mut holder: DefinitionHolder,
		_ctx: &ParseContext<'_>,
	) -> Result<DefinitionHolder, ElementError> {
		holder.definition.role = Role::Infrastructure;
		Ok(holder)
	}
}

struct SuffixDecorator;

impl DefinitionDecorator for SuffixDecorator {
	fn decorate(
		&self,
		element: &Element,
		mut holder: DefinitionHolder,
		_ctx: &ParseContext<'_>,
	) -> Result<DefinitionHolder, ElementError> {
		if element.attribute("id") == Some("reject") {
			return Err(ElementError::Invalid("rejected by decorator".into()));
		}
		holder.name.push_str(".decorated");
		Ok(holder)
	}
}

#[test]
fn decorators_wrap_in_registration_order() {
	let fx = Fixture::new();
	fx.document(
		"A.xml",
		r#"<component id="a" type="demo.A"/>
		<component id="reject" type="demo.A"/>"#,
	);

	let mut registry = Registry::default();
	let reader = fx
		.reader()
		.with_decorator(Arc::new(RoleDecorator))
		.with_decorator(Arc::new(SuffixDecorator));
	reader.load_definitions(&mut registry, "A.xml").expect("load");

	assert_eq!(names(&registry), vec!["a.decorated"]);
	assert!(registry.get("a.decorated").is_some_and(|d| d.is_infrastructure()));
	assert_eq!(fx.problems().len(), 1);
}
