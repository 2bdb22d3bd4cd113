//! XML document loading.

use std::borrow::Cow;
use std::io;
use std::sync::Arc;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::document::entity::EntityResolver;
use crate::document::schema::{ComponentSchema, SchemaValidator, SchemaViolation};
use crate::document::{Attribute, Document, Element, QualifiedName};
use crate::error::{LoadError, ResourceError};
use crate::grammar::{SCHEMA_INSTANCE_NAMESPACE, SCHEMA_LOCATION_ATTRIBUTE};
use crate::resource::Resource;

/// How a document is validated after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
	None,
	/// DTD when the document declares a DOCTYPE, XSD otherwise.
	#[default]
	Auto,
	Dtd,
	/// Schema validation. Forces namespace awareness.
	Xsd,
}

/// Parses resource content into a [`Document`].
pub trait DocumentLoader: Send + Sync {
	fn load_document(
		&self,
		resource: &dyn Resource,
		entities: &dyn EntityResolver,
		mode: ValidationMode,
		namespace_aware: bool,
	) -> Result<Document, LoadError>;
}

/// `quick-xml` backed loader.
#[derive(Clone)]
pub struct XmlDocumentLoader {
	validator: Option<Arc<dyn SchemaValidator>>,
}

impl Default for XmlDocumentLoader {
	fn default() -> Self {
		Self {
			validator: Some(Arc::new(ComponentSchema)),
		}
	}
}

impl XmlDocumentLoader {
	pub fn new() -> Self {
		Self::default()
	}

	/// Loader with no schema validator. XSD validation then fails with
	/// [`LoadError::SchemaUnsupported`].
	pub fn without_validator() -> Self {
		Self { validator: None }
	}

	pub fn with_validator(validator: Arc<dyn SchemaValidator>) -> Self {
		Self { validator: Some(validator) }
	}

	/// Parses `text`, attributing diagnostics to `resource`.
	pub fn parse(
		&self,
		resource: &str,
		text: &str,
		entities: &dyn EntityResolver,
		mode: ValidationMode,
		namespace_aware: bool,
	) -> Result<Document, LoadError> {
		let text = text.strip_prefix('\u{feff}').unwrap_or(text);
		let mode = match mode {
			ValidationMode::Auto => detect_validation_mode(text),
			explicit => explicit,
		};
		if mode == ValidationMode::Xsd && self.validator.is_none() {
			return Err(LoadError::SchemaUnsupported {
				resource: resource.to_string(),
			});
		}
		let namespace_aware = namespace_aware || mode == ValidationMode::Xsd;
		trace!(resource, ?mode, namespace_aware, "parsing document");

		let document = TreeBuilder::new(resource, text, namespace_aware).build()?;
		match mode {
			ValidationMode::Dtd => self.validate_dtd(&document, entities)?,
			ValidationMode::Xsd => self.validate_xsd(&document, entities)?,
			ValidationMode::None | ValidationMode::Auto => {}
		}
		Ok(document)
	}

	fn validate_dtd(&self, document: &Document, entities: &dyn EntityResolver) -> Result<(), LoadError> {
		let Some(doctype) = document.doctype.as_deref() else {
			return Err(LoadError::Parse {
				resource: document.resource.clone(),
				line: Some(document.root.line),
				message: "DTD validation requested but the document declares no DOCTYPE".into(),
			});
		};
		let (public_id, system_id) = doctype_ids(doctype);
		if let Some(system_id) = system_id {
			resolve_grammar(document, entities, public_id, system_id)?;
		}
		self.run_validator(document)
	}

	fn validate_xsd(&self, document: &Document, entities: &dyn EntityResolver) -> Result<(), LoadError> {
		if let Some(hints) = document.root.attribute_ns(SCHEMA_INSTANCE_NAMESPACE, SCHEMA_LOCATION_ATTRIBUTE) {
			let tokens: Vec<&str> = hints.split_whitespace().collect();
			for pair in tokens.chunks(2) {
				if let [namespace, location] = pair {
					resolve_grammar(document, entities, Some(*namespace), location)?;
				}
			}
		}
		self.run_validator(document)
	}

	fn run_validator(&self, document: &Document) -> Result<(), LoadError> {
		let Some(validator) = &self.validator else {
			return Ok(());
		};
		validator.validate(document).map_err(|violations| violations_error(document, violations))
	}
}

impl DocumentLoader for XmlDocumentLoader {
	fn load_document(
		&self,
		resource: &dyn Resource,
		entities: &dyn EntityResolver,
		mode: ValidationMode,
		namespace_aware: bool,
	) -> Result<Document, LoadError> {
		let description = resource.description();
		let bytes = resource.read().map_err(|err| match err {
			ResourceError::Io { source, .. } => LoadError::Io {
				resource: description.clone(),
				source,
			},
			other => LoadError::Io {
				resource: description.clone(),
				source: io::Error::other(other),
			},
		})?;
		let text = std::str::from_utf8(&bytes).map_err(|err| LoadError::Parse {
			resource: description.clone(),
			line: None,
			message: format!("invalid UTF-8: {err}"),
		})?;
		self.parse(&description, text, entities, mode, namespace_aware)
	}
}

fn resolve_grammar(
	document: &Document,
	entities: &dyn EntityResolver,
	public_id: Option<&str>,
	system_id: &str,
) -> Result<(), LoadError> {
	match entities.resolve_entity(public_id, system_id) {
		Some(resolved) => {
			debug!(resource = %document.resource, system_id, ?resolved, "resolved grammar");
			Ok(())
		}
		None => Err(LoadError::UnresolvableEntity {
			resource: document.resource.clone(),
			system_id: system_id.to_string(),
		}),
	}
}

fn violations_error(document: &Document, violations: Vec<SchemaViolation>) -> LoadError {
	let line = violations.first().map(|v| v.line);
	let message = violations
		.into_iter()
		.map(|v| format!("line {}: {}", v.line, v.message))
		.collect::<Vec<_>>()
		.join("; ");
	LoadError::Parse {
		resource: document.resource.clone(),
		line,
		message,
	}
}

/// DTD when a DOCTYPE precedes the first element, XSD otherwise.
pub fn detect_validation_mode(text: &str) -> ValidationMode {
	let mut rest = text;
	while let Some(idx) = rest.find('<') {
		rest = &rest[idx..];
		if rest.starts_with("<!DOCTYPE") {
			return ValidationMode::Dtd;
		}
		if rest.starts_with("<!--") {
			let Some(end) = rest.find("-->") else {
				break;
			};
			rest = &rest[end + 3..];
			continue;
		}
		if rest.starts_with("<?") {
			rest = &rest[2..];
			continue;
		}
		break;
	}
	ValidationMode::Xsd
}

/// Public and system ids of a DOCTYPE body such as
/// `components PUBLIC "-//X//EN" "components.dtd"`.
fn doctype_ids(doctype: &str) -> (Option<&str>, Option<&str>) {
	let quoted: Vec<&str> = doctype.split(['"', '\'']).skip(1).step_by(2).collect();
	let keyword = doctype.split_whitespace().nth(1);
	match keyword {
		Some("PUBLIC") => (quoted.first().copied(), quoted.get(1).copied()),
		Some("SYSTEM") => (None, quoted.first().copied()),
		_ => (None, None),
	}
}

/// Byte offsets of line starts, for mapping reader positions to line numbers.
struct LineIndex {
	starts: Vec<usize>,
}

impl LineIndex {
	fn new(text: &str) -> Self {
		let starts = std::iter::once(0)
			.chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
			.collect();
		Self { starts }
	}

	fn line_of(&self, offset: usize) -> u32 {
		u32::try_from(self.starts.partition_point(|&start| start <= offset)).unwrap_or(u32::MAX)
	}
}

struct TreeBuilder<'i> {
	resource: &'i str,
	text: &'i str,
	namespace_aware: bool,
	lines: LineIndex,
	stack: Vec<Element>,
	root: Option<Element>,
	doctype: Option<String>,
}

impl<'i> TreeBuilder<'i> {
	fn new(resource: &'i str, text: &'i str, namespace_aware: bool) -> Self {
		Self {
			resource,
			text,
			namespace_aware,
			lines: LineIndex::new(text),
			stack: Vec::new(),
			root: None,
			doctype: None,
		}
	}

	fn error(&self, offset: usize, message: impl Into<String>) -> LoadError {
		LoadError::Parse {
			resource: self.resource.to_string(),
			line: Some(self.lines.line_of(offset)),
			message: message.into(),
		}
	}

	fn build(mut self) -> Result<Document, LoadError> {
		let mut reader = NsReader::from_str(self.text);
		reader.config_mut().trim_text(true);

		loop {
			let (resolved, event) = match reader.read_resolved_event() {
				Ok(pair) => pair,
				Err(err) => return Err(self.error(reader.buffer_position() as usize, err.to_string())),
			};
			let namespace = match resolved {
				ResolveResult::Bound(ns) => Some(decode(ns.as_ref())),
				ResolveResult::Unbound => None,
				ResolveResult::Unknown(prefix) if self.namespace_aware => {
					let offset = reader.buffer_position() as usize;
					return Err(self.error(offset, format!("unbound namespace prefix '{}'", decode(&prefix))));
				}
				ResolveResult::Unknown(_) => None,
			};
			let offset = reader.buffer_position() as usize;

			match event {
				Event::Start(start) => {
					let element = self.open(&reader, namespace, &start, offset)?;
					self.stack.push(element);
				}
				Event::Empty(start) => {
					let element = self.open(&reader, namespace, &start, offset)?;
					self.attach(element, offset)?;
				}
				Event::End(_) => {
					let Some(element) = self.stack.pop() else {
						return Err(self.error(offset, "unexpected closing tag"));
					};
					self.attach(element, offset)?;
				}
				Event::Text(text) => {
					let text = text.unescape().map_err(|err| self.error(offset, err.to_string()))?;
					self.push_text(&text, offset)?;
				}
				Event::CData(data) => {
					let data = decode(&data);
					self.push_text(&data, offset)?;
				}
				Event::DocType(doctype) => {
					self.doctype = Some(decode(&doctype).trim().to_string());
				}
				Event::Eof => break,
				_ => {}
			}
		}

		if let Some(open) = self.stack.last() {
			return Err(self.error(self.text.len(), format!("unexpected end of document, <{}> is not closed", open.name.local)));
		}
		let Some(root) = self.root.take() else {
			return Err(self.error(self.text.len(), "document has no root element"));
		};
		Ok(Document {
			root,
			doctype: self.doctype,
			resource: self.resource.to_string(),
		})
	}

	fn open(
		&self,
		reader: &NsReader<&[u8]>,
		namespace: Option<String>,
		start: &BytesStart<'_>,
		end_offset: usize,
	) -> Result<Element, LoadError> {
		let tag_offset = self.text.get(..end_offset).and_then(|head| head.rfind('<')).unwrap_or(0);
		let line = self.lines.line_of(tag_offset);

		let name = if self.namespace_aware {
			QualifiedName {
				namespace,
				prefix: start.name().prefix().map(|p| decode(p.as_ref())),
				local: decode(start.local_name().as_ref()),
			}
		} else {
			QualifiedName::local(decode(start.name().as_ref()))
		};
		let mut element = Element::new(name, line);

		for attr in start.attributes() {
			let attr = attr.map_err(|err| self.error(tag_offset, err.to_string()))?;
			let key = attr.key.as_ref();
			if key == b"xmlns" || key.starts_with(b"xmlns:") {
				continue;
			}
			let value = attr
				.unescape_value()
				.map_err(|err| self.error(tag_offset, err.to_string()))?
				.into_owned();
			let name = if self.namespace_aware {
				let (resolved, local) = reader.resolve_attribute(attr.key);
				let namespace = match resolved {
					ResolveResult::Bound(ns) => Some(decode(ns.as_ref())),
					ResolveResult::Unbound => None,
					ResolveResult::Unknown(prefix) => {
						return Err(self.error(tag_offset, format!("unbound namespace prefix '{}'", decode(&prefix))));
					}
				};
				QualifiedName {
					namespace,
					prefix: attr.key.prefix().map(|p| decode(p.as_ref())),
					local: decode(local.as_ref()),
				}
			} else {
				QualifiedName::local(decode(key))
			};
			element.attributes.push(Attribute { name, value });
		}
		Ok(element)
	}

	fn attach(&mut self, element: Element, offset: usize) -> Result<(), LoadError> {
		if let Some(parent) = self.stack.last_mut() {
			parent.children.push(element);
		} else if self.root.is_some() {
			return Err(self.error(offset, "document has more than one root element"));
		} else {
			self.root = Some(element);
		}
		Ok(())
	}

	fn push_text(&mut self, text: &str, offset: usize) -> Result<(), LoadError> {
		match self.stack.last_mut() {
			Some(open) => {
				open.text.push_str(text);
				Ok(())
			}
			None if text.trim().is_empty() => Ok(()),
			None => Err(self.error(offset, "text outside the root element")),
		}
	}
}

fn decode(bytes: &[u8]) -> String {
	match String::from_utf8_lossy(bytes) {
		Cow::Borrowed(text) => text.to_string(),
		Cow::Owned(text) => text,
	}
}
