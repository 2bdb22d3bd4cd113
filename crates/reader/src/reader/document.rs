use std::error::Error as StdError;
use std::sync::Arc;

use blueprint_registry::{DefinitionHolder, Registry, SourceLocation};
use tracing::{debug, trace};

use super::DefinitionReader;
use crate::delegate::ParseContext;
use crate::document::{Document, Element};
use crate::environment::tokenize;
use crate::error::{ElementError, ReaderError};
use crate::events::ReaderEvent;
use crate::grammar::*;
use crate::namespace::NamespaceContext;
use crate::problems::Problem;
use crate::resource::{Resource, apply_relative_path, is_absolute_location};
use crate::state::{InvalidDefault, ParserState, StateStack};

/// Callbacks around each registered scope.
pub trait ScopeHooks: Send + Sync {
	fn pre_process(&self, _scope: &Element, _registry: &mut Registry) {}

	fn post_process(&self, _scope: &Element, _registry: &mut Registry) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl ScopeHooks for NoopHooks {}

/// Walks one document and registers its definitions.
///
/// Element-level problems are reported and the walk continues with the next
/// sibling. Registration failures abort the document.
pub struct DocumentReader<'r> {
	reader: &'r DefinitionReader,
	registry: &'r mut Registry,
	resource: &'r Arc<dyn Resource>,
	description: String,
}

impl<'r> DocumentReader<'r> {
	pub fn new(reader: &'r DefinitionReader, registry: &'r mut Registry, resource: &'r Arc<dyn Resource>) -> Self {
		Self {
			reader,
			registry,
			resource,
			description: resource.description(),
		}
	}

	pub fn register_definitions(&mut self, document: &Document) -> Result<(), ReaderError> {
		let mut states = StateStack::new();
		self.do_register(&document.root, &mut states)
	}

	fn do_register(&mut self, scope: &Element, states: &mut StateStack) -> Result<(), ReaderError> {
		let reader = self.reader;
		let (defaults, invalid) = ParserState::inherit(states.current(), scope);
		for InvalidDefault { attribute, value } in invalid {
			reader.reporter.report(Problem::warning(
				format!("ignoring invalid {attribute} value [{value}], inheriting the enclosing default"),
				Some(self.source_of(scope)),
			));
		}
		let mut states = states.enter(defaults);

		if scope.is_default_namespace()
			&& let Some(spec) = scope.attribute(PROFILE_ATTRIBUTE)
		{
			let profiles = tokenize(spec);
			if !profiles.is_empty() && !reader.environment.accepts_profiles(&profiles) {
				debug!(resource = %self.description, profiles = spec, "skipping scope: profiles not accepted");
				return Ok(());
			}
		}

		reader.listener.on_event(&ReaderEvent::DefaultsRegistered {
			defaults: states.current().clone(),
			source: self.source_of(scope),
		});

		reader.hooks.pre_process(scope, self.registry);
		self.parse_definitions(scope, &mut states)?;
		reader.hooks.post_process(scope, self.registry);
		Ok(())
	}

	fn parse_definitions(&mut self, root: &Element, states: &mut StateStack) -> Result<(), ReaderError> {
		if !root.is_default_namespace() {
			self.parse_custom_element(root, states.current());
			return Ok(());
		}

		for child in root.elements() {
			if !child.is_default_namespace() {
				self.parse_custom_element(child, states.current());
				continue;
			}
			match child.local_name() {
				IMPORT_ELEMENT => self.import_resource(child),
				ALIAS_ELEMENT => self.process_alias(child),
				COMPONENT_ELEMENT => self.process_definition(child, states.current())?,
				COMPONENTS_ELEMENT => self.do_register(child, states)?,
				_ => {}
			}
		}
		Ok(())
	}

	fn import_resource(&mut self, element: &Element) {
		let reader = self.reader;
		let raw = element.attribute(RESOURCE_ATTRIBUTE).unwrap_or_default();
		if raw.trim().is_empty() {
			self.report(element, "resource location must not be empty");
			return;
		}

		let location = match reader.environment.resolve_required_placeholders(raw) {
			Ok(location) if location.trim().is_empty() => {
				self.report(element, format!("resource location [{raw}] resolved to an empty string"));
				return;
			}
			Ok(location) => location,
			Err(err) => {
				self.report_cause(element, format!("failed to resolve placeholders in resource location [{raw}]"), &err);
				return;
			}
		};

		let mut actual: Vec<Arc<dyn Resource>> = Vec::new();
		if is_absolute_location(&location) {
			if let Err(err) = reader.load_location(self.registry, &location, Some(&mut actual)) {
				self.report_cause(element, format!("failed to import definitions from location [{location}]"), &err);
			}
		} else {
			match self.resource.create_relative(&location) {
				Ok(relative) if relative.exists() => match reader.load_resource(self.registry, Arc::clone(&relative)) {
					Ok(count) => {
						trace!(location = %location, count, "imported relative resource");
						actual.push(relative);
					}
					Err(err) => {
						self.report_cause(element, format!("failed to import definitions from relative location [{location}]"), &err);
					}
				},
				Ok(_) => match self.resource.location() {
					Some(base) => {
						let fallback = apply_relative_path(&base, &location);
						if let Err(err) = reader.load_location(self.registry, &fallback, Some(&mut actual)) {
							self.report_cause(element, format!("failed to import definitions from relative location [{location}]"), &err);
						}
					}
					None => self.report(element, format!("cannot resolve relative location [{location}] against {}", self.description)),
				},
				Err(err) => {
					self.report_cause(element, format!("failed to resolve current resource location for [{location}]"), &err);
				}
			}
		}

		debug!(resource = %self.description, location = %location, loaded = actual.len(), "processed import");
		reader.listener.on_event(&ReaderEvent::ImportProcessed {
			location,
			resources: actual,
			source: self.source_of(element),
		});
	}

	fn process_alias(&mut self, element: &Element) {
		let name = element.attribute(NAME_ATTRIBUTE).unwrap_or_default().trim();
		let alias = element.attribute(ALIAS_ATTRIBUTE).unwrap_or_default().trim();
		let mut valid = true;
		if name.is_empty() {
			self.report(element, "alias directive requires a non-empty 'name'");
			valid = false;
		}
		if alias.is_empty() {
			self.report(element, "alias directive requires a non-empty 'alias'");
			valid = false;
		}
		if !valid {
			return;
		}

		match self.registry.register_alias(name, alias) {
			Ok(()) => self.reader.listener.on_event(&ReaderEvent::AliasRegistered {
				name: name.to_string(),
				alias: alias.to_string(),
				source: self.source_of(element),
			}),
			Err(err) => self.report_cause(element, format!("failed to register alias '{alias}' for '{name}'"), &err),
		}
	}

	fn process_definition(&mut self, element: &Element, state: &ParserState) -> Result<(), ReaderError> {
		let reader = self.reader;
		let ctx = ParseContext {
			registry: &*self.registry,
			environment: reader.environment.as_ref(),
			resource: &self.description,
		};

		let parsed = reader.delegate.parse_component(element, state, &ctx).and_then(|holder| {
			let Some(mut holder) = holder else {
				return Ok(None);
			};
			for decorator in &reader.decorators {
				holder = decorator.decorate(element, holder, &ctx)?;
			}
			Ok(Some(holder))
		});
		let holder = match parsed {
			Ok(Some(holder)) => holder,
			Ok(None) => {
				trace!(resource = %self.description, line = element.line, "component skipped");
				return Ok(());
			}
			Err(err) => {
				self.report_cause(element, "failed to parse component", &err);
				return Ok(());
			}
		};

		self.register_holder(&holder).map_err(|source| ReaderError::Store {
			resource: self.description.clone(),
			name: holder.name.clone(),
			source,
		})?;
		reader.listener.on_event(&ReaderEvent::ComponentRegistered { holder });
		Ok(())
	}

	fn register_holder(&mut self, holder: &DefinitionHolder) -> Result<(), blueprint_registry::RegistryError> {
		self.registry.register(&holder.name, holder.definition.clone())?;
		for alias in &holder.aliases {
			self.registry.register_alias(&holder.name, alias)?;
		}
		Ok(())
	}

	fn parse_custom_element(&mut self, element: &Element, state: &ParserState) {
		let reader = self.reader;
		let Some(namespace) = element.namespace() else {
			return;
		};
		let Some(handler) = reader.namespaces.get(namespace) else {
			let err = ElementError::NoNamespaceHandler(namespace.to_string());
			self.report_cause(element, format!("cannot handle <{}>", element.local_name()), &err);
			return;
		};

		let mut ctx = NamespaceContext::new(self.registry, reader.environment.as_ref(), state, &self.description);
		let result = handler.parse(element, &mut ctx);
		for holder in ctx.into_registered() {
			reader.listener.on_event(&ReaderEvent::ComponentRegistered { holder });
		}
		if let Err(err) = result {
			self.report_cause(element, format!("failed to handle <{}> in namespace [{namespace}]", element.local_name()), &err);
		}
	}

	fn source_of(&self, element: &Element) -> SourceLocation {
		SourceLocation::new(self.description.clone(), Some(element.line))
	}

	fn report(&self, element: &Element, message: impl Into<String>) {
		self.reader.reporter.report(Problem::error(message, Some(self.source_of(element))));
	}

	fn report_cause(&self, element: &Element, message: impl Into<String>, cause: &(dyn StdError + 'static)) {
		self.reader
			.reporter
			.report(Problem::error(message, Some(self.source_of(element))).with_cause(cause));
	}
}
