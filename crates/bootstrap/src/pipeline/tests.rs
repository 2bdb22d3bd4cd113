use std::fs;
use std::path::Path;
use std::sync::Arc;

use blueprint_reader::{CollectingListener, ReaderEvent};
use blueprint_registry::{CapabilitySet, Definition, PropertyValue, Registry};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;
use crate::config::{BootstrapConfig, ResourceConfig};
use crate::error::ProcessorError;
use crate::interceptors::{CHAIN_CHECKER, LISTENER_DETECTOR};
use crate::processor::{FactoryMutator, InstanceInterceptor, Ordered, Processor, RegistryMutator};

/// Registers one extra definition named after its `target` property.
struct Registrar {
	target: String,
}

impl Ordered for Registrar {}

impl FactoryMutator for Registrar {}

impl RegistryMutator for Registrar {
	fn mutate_registry(&self, registry: &mut Registry) -> Result<(), ProcessorError> {
		registry
			.register(&self.target, Definition::of_type("app.Generated"))
			.map(|_| ())
			.map_err(|err| ProcessorError::with_source("registration failed", err))
	}
}

/// Marks every application definition lazy.
struct LazyAll;

impl Ordered for LazyAll {}

impl FactoryMutator for LazyAll {
	fn mutate_factory(&self, factory: &mut ComponentFactory) -> Result<(), ProcessorError> {
		let names: Vec<String> = factory.registry().names().map(str::to_owned).collect();
		for name in names {
			if let Some(definition) = factory.definition_mut(&name)
				&& !definition.is_infrastructure()
			{
				definition.lazy_init = true;
			}
		}
		Ok(())
	}
}

struct Audit;

impl Ordered for Audit {}

impl InstanceInterceptor for Audit {}

fn types() -> Arc<ProcessorTypes> {
	Arc::new(
		ProcessorTypes::new()
			.with("app.Registrar", CapabilitySet::REGISTRY_MUTATOR, |definition| {
				let target = match definition.property("target") {
					Some(PropertyValue::Literal(target)) => target.clone(),
					_ => return Err("registrar needs a target".to_string()),
				};
				Ok(Processor::registry(Registrar { target }))
			})
			.with("app.LazyAll", CapabilitySet::FACTORY_MUTATOR, |_| Ok(Processor::factory(LazyAll)))
			.with("app.Audit", CapabilitySet::INSTANCE_INTERCEPTOR, |_| Ok(Processor::interceptor(Audit)))
			.declare("app.Events", CapabilitySet::LISTENER),
	)
}

fn write(dir: &Path, relative: &str, body: &str) {
	let path = dir.join(relative);
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).expect("create parent dirs");
	}
	let document =
		format!("<?xml version=\"1.0\"?>\n<components xmlns=\"urn:blueprint:components\">\n{body}\n</components>\n");
	fs::write(path, document).expect("write document");
}

fn config_for(dir: &TempDir) -> BootstrapConfig {
	BootstrapConfig {
		locations: vec!["app.xml".to_string()],
		resources: ResourceConfig {
			base_dir: dir.path().to_path_buf(),
		},
		..BootstrapConfig::default()
	}
}

#[test]
fn loads_documents_and_runs_every_phase() {
	let dir = tempfile::tempdir().expect("create tempdir");
	write(
		dir.path(),
		"app.xml",
		r#"<import resource="${module}/processors.xml"/>
<component id="dataSource" type="app.DataSource">
  <property name="url" value="jdbc:test"/>
</component>
<component id="events" type="app.Events"/>"#,
	);
	write(
		dir.path(),
		"infra/processors.xml",
		r#"<component id="registrar" type="app.Registrar">
  <property name="target" value="generated"/>
</component>
<component id="lazy" type="app.LazyAll"/>
<component id="audit" type="app.Audit"/>"#,
	);
	let mut config = config_for(&dir);
	config
		.environment
		.properties
		.insert("module".to_string(), "infra".to_string());
	let listener = Arc::new(CollectingListener::new());

	let done = Bootstrap::new(config, types())
		.with_listener(listener.clone())
		.run()
		.expect("bootstrap");

	assert_eq!(done.definitions_loaded, 5);
	assert!(done.warnings.is_empty());
	assert_eq!(done.report.processed.iter().collect::<Vec<_>>(), vec!["registrar", "lazy"]);
	let registry = done.factory.registry();
	assert_eq!(
		registry.names().collect::<Vec<_>>(),
		vec!["registrar", "lazy", "audit", "dataSource", "events", "generated"]
	);
	assert!(registry.get("dataSource").is_some_and(|definition| definition.lazy_init));
	assert!(registry.get("generated").is_some_and(|definition| definition.lazy_init));
	assert_eq!(
		done.factory.interceptor_names().collect::<Vec<_>>(),
		vec![CHAIN_CHECKER, "audit", LISTENER_DETECTOR]
	);
	assert!(
		listener
			.events()
			.iter()
			.any(|event| matches!(event, ReaderEvent::ImportProcessed { location, .. } if location == "infra/processors.xml"))
	);

	done.factory.apply_after_initialization("events").expect("apply");
	assert_eq!(done.interceptors.listeners.listeners(), vec!["events".to_string()]);
}

#[test]
fn element_problems_are_aggregated_into_one_error() {
	let dir = tempfile::tempdir().expect("create tempdir");
	write(
		dir.path(),
		"app.xml",
		r#"<alias name="" alias="x"/>
<component id="ok" type="app.DataSource"/>
<component id="untyped"/>
<import resource="missing.xml"/>"#,
	);

	let err = Bootstrap::new(config_for(&dir), types())
		.run()
		.expect_err("problems must fail the bootstrap");

	let BootstrapError::Problems { problems } = err else {
		panic!("unexpected error: {err:?}");
	};
	assert_eq!(problems.len(), 3);
	let lines: Vec<_> = problems
		.iter()
		.map(|problem| problem.location.as_ref().and_then(|location| location.line))
		.collect();
	assert_eq!(lines, vec![Some(3), Some(5), Some(6)]);
}

#[test]
fn document_failures_propagate_as_read_errors() {
	let dir = tempfile::tempdir().expect("create tempdir");
	fs::write(dir.path().join("app.xml"), "<components><component id=\"a\"").expect("write document");

	let err = Bootstrap::new(config_for(&dir), types())
		.run()
		.expect_err("malformed document");

	assert!(matches!(err, BootstrapError::Read(_)), "{err:?}");
}

#[test]
fn supplied_mutators_run_ahead_of_discovered_ones() {
	let dir = tempfile::tempdir().expect("create tempdir");
	write(dir.path(), "app.xml", r#"<component id="lazy" type="app.LazyAll"/>"#);

	let done = Bootstrap::new(config_for(&dir), types())
		.with_mutator(Mutator::registry(
			"bootstrapRegistrar",
			Arc::new(Registrar {
				target: "early".to_string(),
			}),
		))
		.run()
		.expect("bootstrap");

	let registry = done.into_shared_registry();
	assert!(registry.get("early").is_some_and(|definition| definition.lazy_init));
}

#[test]
fn config_file_drives_the_pipeline() {
	let dir = tempfile::tempdir().expect("create tempdir");
	write(
		dir.path(),
		"conf/app.xml",
		r#"<components profile="prod"><component id="prodOnly" type="app.DataSource"/></components>
<component id="always" type="app.DataSource"/>"#,
	);
	let path = dir.path().join("bootstrap.toml");
	fs::write(
		&path,
		"locations = [\"app.xml\"]\n[resources]\nbase_dir = \"conf\"\n[environment]\nactive_profiles = [\"dev\"]\n",
	)
	.expect("write config");

	let done = Bootstrap::from_file(&path, types())
		.expect("load config")
		.run()
		.expect("bootstrap");

	assert_eq!(done.definitions_loaded, 1);
	assert!(done.factory.registry().contains("always"));
	assert!(!done.factory.registry().contains("prodOnly"));
}

#[test]
fn scope_default_warnings_reach_the_outcome() {
	let dir = tempfile::tempdir().expect("create tempdir");
	write(
		dir.path(),
		"app.xml",
		r#"<components default-lazy-init="maybe" default-autowire="by-type">
  <component id="dataSource" type="app.DataSource"/>
</components>"#,
	);

	let done = Bootstrap::new(config_for(&dir), types()).run().expect("bootstrap");

	assert_eq!(done.definitions_loaded, 1);
	assert_eq!(done.warnings.len(), 1);
	let warning = &done.warnings[0];
	assert_eq!(warning.severity, Severity::Warning);
	assert!(warning.message.contains("default-lazy-init"), "{warning}");
	assert_eq!(warning.location.as_ref().and_then(|location| location.line), Some(3));
	assert!(done.factory.registry().get("dataSource").is_some_and(|definition| !definition.lazy_init));
}
