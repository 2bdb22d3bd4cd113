use blueprint_registry::Registry;
use pretty_assertions::assert_eq;
use url::Url;

use super::{Fixture, names};
use crate::environment::StandardEnvironment;
use crate::error::ReaderError;
use crate::settings::ReaderSettings;

#[test]
fn relative_import_loads_from_the_importing_directory() {
	let fx = Fixture::new();
	fx.document("A.xml", r#"<import resource="sub/B.xml"/><component id="a" type="demo.A"/>"#);
	fx.document("sub/B.xml", r#"<component id="b" type="demo.B"/>"#);

	let mut registry = Registry::default();
	let count = fx.reader().load_definitions(&mut registry, "A.xml").expect("load");

	assert_eq!(count, 2);
	assert_eq!(names(&registry), vec!["b", "a"]);
	assert_eq!(fx.imports(), vec![("sub/B.xml".to_string(), 1)]);
	assert!(fx.problems().is_empty(), "{:?}", fx.problems());
}

#[test]
fn import_location_placeholders_resolve_through_environment() {
	let fx = Fixture::new();
	fx.document("A.xml", r#"<import resource="${dir}/B.xml"/>"#);
	fx.document("parts/B.xml", r#"<component id="b" type="demo.B"/>"#);

	let mut registry = Registry::default();
	let reader = fx.reader_with(StandardEnvironment::new().with_property("dir", "parts"));
	reader.load_definitions(&mut registry, "A.xml").expect("load");

	assert!(registry.contains("b"));
	assert_eq!(fx.imports(), vec![("parts/B.xml".to_string(), 1)]);
}

#[test]
fn unresolvable_placeholder_fails_only_its_directive() {
	let fx = Fixture::new();
	fx.document(
		"A.xml",
		r#"<import resource="${missing}/B.xml"/>
		<import resource=""/>
		<component id="a" type="demo.A"/>"#,
	);

	let mut registry = Registry::default();
	fx.reader().load_definitions(&mut registry, "A.xml").expect("load");

	assert_eq!(names(&registry), vec!["a"]);
	assert_eq!(fx.problems().len(), 2);
	assert!(fx.imports().is_empty());
	let first = &fx.problems()[0];
	assert_eq!(first.location.as_ref().and_then(|l| l.line), Some(3));
	assert!(first.cause.as_deref().is_some_and(|c| c.contains("missing")), "{first}");
}

#[test]
fn absolute_import_goes_through_the_reader() {
	let fx = Fixture::new();
	fx.document("lib/B.xml", r#"<component id="b" type="demo.B"/>"#);
	let url = Url::from_file_path(fx.path().join("lib/B.xml")).expect("file url");
	fx.document("A.xml", &format!(r#"<import resource="{url}"/>"#));

	let mut registry = Registry::default();
	fx.reader().load_definitions(&mut registry, "A.xml").expect("load");

	assert!(registry.contains("b"));
	assert_eq!(fx.imports(), vec![(url.to_string(), 1)]);
}

#[test]
fn relative_glob_falls_back_to_pattern_resolution() {
	let fx = Fixture::new();
	fx.document("A.xml", r#"<import resource="parts/*.xml"/>"#);
	fx.document("parts/one.xml", r#"<component id="one" type="demo.A"/>"#);
	fx.document("parts/two.xml", r#"<component id="two" type="demo.A"/>"#);

	let mut registry = Registry::default();
	let count = fx.reader().load_definitions(&mut registry, "A.xml").expect("load");

	assert_eq!(count, 2);
	assert_eq!(names(&registry), vec!["one", "two"]);
	assert_eq!(fx.imports(), vec![("parts/*.xml".to_string(), 2)]);
}

#[test]
fn relative_glob_resolves_under_a_directory_with_spaces() {
	let fx = Fixture::with_prefix("my dir");
	fx.document("A.xml", r#"<import resource="parts/*.xml"/>"#);
	fx.document("parts/one.xml", r#"<component id="one" type="demo.A"/>"#);

	let mut registry = Registry::default();
	let count = fx.reader().load_definitions(&mut registry, "A.xml").expect("load");

	assert_eq!(count, 1);
	assert_eq!(names(&registry), vec!["one"]);
	assert!(fx.problems().is_empty(), "{:?}", fx.problems());
}

#[test]
fn glob_import_with_missing_directory_is_reported() {
	let fx = Fixture::new();
	fx.document(
		"A.xml",
		r#"<import resource="nowhere/*.xml"/>
		<component id="a" type="demo.A"/>"#,
	);

	let mut registry = Registry::default();
	fx.reader().load_definitions(&mut registry, "A.xml").expect("load");

	assert_eq!(names(&registry), vec!["a"]);
	let problems = fx.problems();
	assert_eq!(problems.len(), 1);
	assert!(problems[0].cause.as_deref().is_some_and(|c| c.contains("missing directory")), "{}", problems[0]);
	assert_eq!(fx.imports(), vec![("nowhere/*.xml".to_string(), 0)]);
}

#[test]
fn missing_import_is_reported_and_siblings_continue() {
	let fx = Fixture::new();
	fx.document(
		"A.xml",
		r#"<import resource="missing.xml"/>
		<component id="a" type="demo.A"/>"#,
	);

	let mut registry = Registry::default();
	fx.reader().load_definitions(&mut registry, "A.xml").expect("load");

	assert_eq!(names(&registry), vec!["a"]);
	assert_eq!(fx.problems().len(), 1);
	assert_eq!(fx.imports(), vec![("missing.xml".to_string(), 0)]);
}

#[test]
fn cyclic_import_is_reported_not_looped() {
	let fx = Fixture::new();
	fx.document("A.xml", r#"<import resource="B.xml"/><component id="a" type="demo.A"/>"#);
	fx.document("B.xml", r#"<import resource="A.xml"/><component id="b" type="demo.B"/>"#);

	let mut registry = Registry::default();
	let count = fx.reader().load_definitions(&mut registry, "A.xml").expect("load");

	assert_eq!(count, 2);
	let problems = fx.problems();
	assert_eq!(problems.len(), 1);
	assert!(problems[0].cause.as_deref().is_some_and(|c| c.contains("cyclic import")), "{}", problems[0]);
}

#[test]
fn store_failure_aborts_only_the_imported_document() {
	let fx = Fixture::new();
	fx.document(
		"A.xml",
		r#"<component id="x" type="demo.A"/>
		<import resource="B.xml"/>
		<component id="y" type="demo.A"/>"#,
	);
	fx.document("B.xml", r#"<component id="x" type="demo.B"/><component id="z" type="demo.B"/>"#);

	let mut registry = Registry::default();
	let reader = fx.reader().with_settings(ReaderSettings {
		allow_definition_overriding: false,
		..ReaderSettings::default()
	});
	reader.load_definitions(&mut registry, "A.xml").expect("load");

	assert_eq!(names(&registry), vec!["x", "y"]);
	assert_eq!(registry.get("x").and_then(|d| d.type_ref.as_deref()), Some("demo.A"));
	assert_eq!(fx.problems().len(), 1);
}

#[test]
fn store_failure_in_top_level_document_propagates() {
	let fx = Fixture::new();
	fx.document("A.xml", r#"<component id="x" type="demo.A"/><component id="x" type="demo.B"/>"#);

	let mut registry = Registry::default();
	let reader = fx.reader().with_settings(ReaderSettings {
		allow_definition_overriding: false,
		..ReaderSettings::default()
	});
	let err = reader.load_definitions(&mut registry, "A.xml").unwrap_err();

	assert!(matches!(err, ReaderError::Store { ref name, .. } if name == "x"), "{err:?}");
}

#[test]
fn malformed_top_level_document_is_a_load_error() {
	let fx = Fixture::new();
	fx.raw("A.xml", "<components><component id=\"a\" type=\"demo.A\"></components>");

	let err = fx.reader().load_definitions(&mut Registry::default(), "A.xml").unwrap_err();
	assert!(matches!(err, ReaderError::Load { .. }), "{err:?}");
}

#[test]
fn load_all_sums_counts() {
	let fx = Fixture::new();
	fx.document("A.xml", r#"<component id="a" type="demo.A"/>"#);
	fx.document("B.xml", r#"<component id="b1" type="demo.B"/><component id="b2" type="demo.B"/>"#);

	let mut registry = Registry::default();
	let count = fx.reader().load_all(&mut registry, &["A.xml", "B.xml"]).expect("load");
	assert_eq!(count, 3);
}
