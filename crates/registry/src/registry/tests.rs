use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::Registry;
use crate::capability::CapabilitySet;
use crate::catalog::StaticTypeCatalog;
use crate::definition::{Definition, PropertySpec};
use crate::error::{AliasError, RegistryError};

fn catalog() -> Arc<StaticTypeCatalog> {
	Arc::new(
		StaticTypeCatalog::new()
			.with("demo.RegistryMutator", CapabilitySet::REGISTRY_MUTATOR | CapabilitySet::PRIORITY_ORDERED)
			.with("demo.FactoryMutator", CapabilitySet::FACTORY_MUTATOR)
			.with("demo.Interceptor", CapabilitySet::INSTANCE_INTERCEPTOR),
	)
}

#[test]
fn register_keeps_insertion_order() {
	let mut registry = Registry::default();
	for name in ["c", "a", "b"] {
		registry.register(name, Definition::of_type("demo.Plain")).expect("register");
	}

	assert_eq!(registry.names().collect::<Vec<_>>(), vec!["c", "a", "b"]);
	assert_eq!(registry.len(), 3);
}

/// Last write wins and the name keeps its discovery position.
#[test]
fn reregistration_overwrites_in_place() {
	let mut registry = Registry::default();
	registry.register("a", Definition::of_type("first")).expect("register a");
	registry.register("b", Definition::of_type("demo.Plain")).expect("register b");

	let previous = registry.register("a", Definition::of_type("second")).expect("override a");

	assert_eq!(previous.and_then(|d| d.type_ref), Some("first".to_string()));
	assert_eq!(registry.get("a").and_then(|d| d.type_ref.as_deref()), Some("second"));
	assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn override_can_be_disallowed() {
	let mut registry = Registry::default();
	registry.set_allow_overriding(false);
	registry.register("a", Definition::of_type("first")).expect("register a");

	let err = registry.register("a", Definition::of_type("second")).unwrap_err();
	assert_eq!(err, RegistryError::OverrideNotAllowed { name: "a".into() });
	assert_eq!(registry.get("a").and_then(|d| d.type_ref.as_deref()), Some("first"));
}

#[test]
fn blank_names_are_rejected() {
	let mut registry = Registry::default();
	assert!(matches!(registry.register("  ", Definition::default()), Err(RegistryError::InvalidName(_))));
	assert!(registry.is_empty());
}

#[test]
fn alias_to_missing_name_fails() {
	let mut registry = Registry::default();
	let err = registry.register_alias("missing", "a").unwrap_err();
	assert_eq!(
		err,
		AliasError::UnknownName {
			name: "missing".into(),
			alias: "a".into()
		}
	);
}

#[test]
fn alias_rebinding_fails_but_same_binding_is_idempotent() {
	let mut registry = Registry::default();
	registry.register("a", Definition::default()).unwrap();
	registry.register("b", Definition::default()).unwrap();
	registry.register_alias("a", "x").expect("first binding");
	registry.register_alias("a", "x").expect("same binding again");

	let err = registry.register_alias("b", "x").unwrap_err();
	assert!(matches!(err, AliasError::AlreadyBound { ref existing, .. } if existing == "a"));
}

#[test]
fn alias_cannot_shadow_definition() {
	let mut registry = Registry::default();
	registry.register("a", Definition::default()).unwrap();
	registry.register("b", Definition::default()).unwrap();

	assert!(matches!(registry.register_alias("a", "b"), Err(AliasError::ShadowsDefinition { .. })));
}

#[test]
fn alias_chains_resolve_to_canonical_name() {
	let mut registry = Registry::default();
	registry
		.register("service", Definition::of_type("demo.Service").with_property(PropertySpec::literal("port", "80")))
		.unwrap();
	registry.register_alias("service", "svc").unwrap();
	registry.register_alias("svc", "s").unwrap();

	assert_eq!(registry.canonical_name("s"), "service");
	assert!(registry.contains("s"));
	assert!(!registry.contains_definition("s"));
	assert_eq!(registry.aliases_of("service"), vec!["svc", "s"]);
	assert!(registry.get("s").and_then(|d| d.property("port")).is_some());
}

#[test]
fn removing_definition_drops_its_aliases() {
	let mut registry = Registry::default();
	registry.register("a", Definition::default()).unwrap();
	registry.register("b", Definition::default()).unwrap();
	registry.register_alias("a", "x").unwrap();
	registry.register_alias("x", "y").unwrap();
	registry.register_alias("b", "z").unwrap();

	registry.remove("a").expect("remove a");

	assert!(!registry.is_alias("x"));
	assert!(!registry.is_alias("y"));
	assert!(registry.is_alias("z"));
	assert!(matches!(registry.remove("a"), Err(RegistryError::NoSuchDefinition(_))));
}

#[test]
fn definition_replaces_alias_of_same_spelling() {
	let mut registry = Registry::default();
	registry.register("a", Definition::default()).unwrap();
	registry.register_alias("a", "x").unwrap();

	registry.register("x", Definition::of_type("demo.Plain")).expect("replace alias");

	assert!(!registry.is_alias("x"));
	assert!(registry.contains_definition("x"));
}

#[test]
fn names_of_type_follows_registration_order_and_restarts() {
	let mut registry = Registry::new(catalog());
	registry.register("f1", Definition::of_type("demo.FactoryMutator")).unwrap();
	registry.register("plain", Definition::of_type("demo.Plain")).unwrap();
	registry.register("r1", Definition::of_type("demo.RegistryMutator")).unwrap();
	registry.register("untyped", Definition::default()).unwrap();

	let names = registry.names_of_type(CapabilitySet::FACTORY_MUTATOR);
	let restart = names.clone();

	assert_eq!(names.collect::<Vec<_>>(), vec!["f1", "r1"]);
	assert_eq!(restart.collect::<Vec<_>>(), vec!["f1", "r1"]);
	assert_eq!(registry.names_of_type(CapabilitySet::REGISTRY_MUTATOR).collect::<Vec<_>>(), vec!["r1"]);
}

#[test]
fn type_match_resolves_aliases_and_caches() {
	let mut registry = Registry::new(catalog());
	registry.register("r1", Definition::of_type("demo.RegistryMutator")).unwrap();
	registry.register_alias("r1", "alias").unwrap();

	assert!(registry.is_type_match("alias", CapabilitySet::PRIORITY_ORDERED));
	assert!(!registry.is_type_match("alias", CapabilitySet::INSTANCE_INTERCEPTOR));
	assert!(!registry.is_type_match("missing", CapabilitySet::FACTORY_MUTATOR));
	assert_eq!(registry.cached_metadata_len(), 1);

	registry.clear_metadata_cache();
	assert_eq!(registry.cached_metadata_len(), 0);
}

#[test]
fn rewriting_type_invalidates_cached_answer() {
	let mut registry = Registry::new(catalog());
	registry.register("p", Definition::of_type("demo.Interceptor")).unwrap();
	assert!(registry.is_type_match("p", CapabilitySet::INSTANCE_INTERCEPTOR));

	registry.get_mut("p").expect("definition").type_ref = Some("demo.FactoryMutator".into());

	assert!(registry.is_type_match("p", CapabilitySet::FACTORY_MUTATOR));
	assert!(!registry.is_type_match("p", CapabilitySet::INSTANCE_INTERCEPTOR));
}

#[test]
fn shared_registry_is_readable_across_threads() {
	let mut registry = Registry::new(catalog());
	registry.register("f1", Definition::of_type("demo.FactoryMutator")).unwrap();
	let shared = registry.into_shared();

	let handles: Vec<_> = (0..4)
		.map(|_| {
			let shared = Arc::clone(&shared);
			std::thread::spawn(move || shared.is_type_match("f1", CapabilitySet::FACTORY_MUTATOR))
		})
		.collect();

	for handle in handles {
		assert!(handle.join().expect("reader thread"));
	}
}
