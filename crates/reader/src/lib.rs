//! Component document reading.
//!
//! Turns XML component documents into registry definitions. The
//! [`DefinitionReader`] resolves locations into resources, the loader parses
//! each resource into a [`Document`] tree, and a [`DocumentReader`] walks the
//! tree, following imports, applying per-scope defaults and profiles and
//! registering what the delegate parses.
//!
//! Problems confined to one element go to a [`ProblemReporter`] and reading
//! continues with the next sibling. Failures affecting a whole resource are
//! returned as [`ReaderError`].
//!
//! # Modules
//!
//! - [`resource`] - Resource handles, resolvers and pattern expansion
//! - [`environment`] - Placeholders and profiles
//! - [`document`] - Document tree, XML loader, entity resolution, schema checks
//! - [`state`] - Per-scope defaults stack
//! - [`delegate`] - `component` element grammar and decorators
//! - [`namespace`] - Handlers for foreign-namespace elements
//! - [`reader`] - Definition and document readers

pub mod delegate;
pub mod document;
pub mod environment;
pub mod error;
pub mod events;
pub mod grammar;
pub mod namespace;
pub mod problems;
pub mod reader;
pub mod resource;
pub mod settings;
pub mod state;

pub use delegate::{DefaultComponentDelegate, DefinitionDecorator, DefinitionParserDelegate, ParseContext};
pub use document::Document;
pub use document::loader::{DocumentLoader, ValidationMode, XmlDocumentLoader};
pub use environment::{Environment, StandardEnvironment};
pub use error::{ElementError, LoadError, PlaceholderError, ReaderError, ResourceError};
pub use events::{CollectingListener, NoopListener, ReaderEvent, ReaderEventListener};
pub use namespace::{NamespaceContext, NamespaceHandler, NamespaceHandlers};
pub use problems::{CollectingReporter, Problem, ProblemReporter, Severity};
pub use reader::{DefinitionReader, DocumentReader, ScopeHooks};
pub use resource::{ByteResource, FileResource, FileSystemResolver, PatternResolver, Resource, ResourceResolver};
pub use settings::ReaderSettings;
pub use state::{InvalidDefault, ParserState, StateStack};
