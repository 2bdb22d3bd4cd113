use std::io;

use blueprint_registry::{AliasError, RegistryError};

/// Failures locating or reading a resource.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
	#[error("failed to read {location}: {source}")]
	Io {
		location: String,
		#[source]
		source: io::Error,
	},
	#[error("unsupported location scheme '{scheme}' in {location}")]
	UnsupportedScheme { location: String, scheme: String },
	#[error("invalid resource location {location}")]
	InvalidLocation { location: String },
	#[error("invalid location pattern {pattern}: {source}")]
	Pattern {
		pattern: String,
		#[source]
		source: globset::Error,
	},
	/// The literal directory in front of a pattern's glob does not exist.
	#[error("pattern {pattern} starts in missing directory {root}")]
	MissingPatternRoot { pattern: String, root: String },
	#[error("failed to walk {root}: {source}")]
	Walk {
		root: String,
		#[source]
		source: walkdir::Error,
	},
	/// The resource has no base location to resolve relative paths against.
	#[error("cannot create a resource relative to {resource}")]
	NoRelative { resource: String },
}

/// Failures turning resource content into a document tree.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	/// Malformed or invalid content.
	#[error("{resource}{}: {message}", .line.map(|l| format!(":{l}")).unwrap_or_default())]
	Parse { resource: String, line: Option<u32>, message: String },
	/// XSD validation requested but the loader has no schema validator.
	#[error("schema validation requested for {resource} but no schema validator is configured")]
	SchemaUnsupported { resource: String },
	#[error("I/O error loading {resource}: {source}")]
	Io {
		resource: String,
		#[source]
		source: io::Error,
	},
	/// A DOCTYPE system id or schema location could not be resolved locally.
	#[error("{resource}: unable to resolve grammar reference '{system_id}'")]
	UnresolvableEntity { resource: String, system_id: String },
}

/// Placeholder resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaceholderError {
	#[error("could not resolve placeholder '{placeholder}' in value \"{value}\"")]
	Unresolvable { placeholder: String, value: String },
	#[error("circular placeholder reference '{placeholder}'")]
	Circular { placeholder: String },
}

/// Problems local to one element. They are reported and parsing continues
/// with the next sibling.
#[derive(Debug, thiserror::Error)]
pub enum ElementError {
	#[error("<{element}> requires a non-empty '{attribute}' attribute")]
	MissingAttribute { element: &'static str, attribute: &'static str },
	#[error("invalid value \"{value}\" for attribute '{attribute}'")]
	InvalidAttribute { attribute: &'static str, value: String },
	#[error("{0}")]
	Invalid(String),
	#[error("no namespace handler registered for [{0}]")]
	NoNamespaceHandler(String),
	#[error(transparent)]
	Placeholder(#[from] PlaceholderError),
	#[error(transparent)]
	Alias(#[from] AliasError),
	#[error(transparent)]
	Registry(#[from] RegistryError),
}

/// Resource or document level failures. Fatal for the load that raised them.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
	#[error(transparent)]
	Resource(#[from] ResourceError),
	#[error("failed to load {resource}: {source}")]
	Load {
		resource: String,
		#[source]
		source: LoadError,
	},
	/// Registering a parsed definition failed.
	#[error("{resource}: cannot register definition '{name}': {source}")]
	Store {
		resource: String,
		name: String,
		#[source]
		source: RegistryError,
	},
	/// The resource is already being loaded further up the import chain.
	#[error("cyclic import of {resource}")]
	CyclicImport { resource: String },
}
