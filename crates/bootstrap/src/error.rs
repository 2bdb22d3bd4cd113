use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use blueprint_reader::{Problem, ReaderError};

/// Orchestration phase a failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
	/// Structural registry mutation, including the fixed-point discovery loop.
	RegistryMutation,
	/// Factory-level mutation hooks.
	FactoryMutation,
	/// Interceptor discovery and registration.
	InterceptorRegistration,
}

impl fmt::Display for Phase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::RegistryMutation => "registry mutation",
			Self::FactoryMutation => "factory mutation",
			Self::InterceptorRegistration => "interceptor registration",
		})
	}
}

/// Failure raised by a processor hook.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ProcessorError {
	message: String,
	#[source]
	source: Option<Box<dyn StdError + Send + Sync>>,
}

impl ProcessorError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			source: None,
		}
	}

	pub fn with_source(message: impl Into<String>, source: impl StdError + Send + Sync + 'static) -> Self {
		Self {
			message: message.into(),
			source: Some(Box::new(source)),
		}
	}

	pub fn message(&self) -> &str {
		&self.message
	}
}

/// Failures obtaining a processor instance for a registered definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
	#[error("no definition named '{0}'")]
	NoSuchDefinition(String),
	#[error("definition '{0}' has no type reference")]
	Untyped(String),
	#[error("definition '{name}' has unknown processor type '{type_ref}'")]
	UnknownType { name: String, type_ref: String },
	#[error("definition '{name}' is a {found}, expected a {expected}")]
	WrongKind {
		name: String,
		expected: &'static str,
		found: &'static str,
	},
	#[error("failed to construct processor '{name}': {message}")]
	Construction { name: String, message: String },
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {}: {source}", path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse bootstrap configuration: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Bootstrap failures. Any of them leaves the factory unusable.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error(transparent)]
	Read(#[from] ReaderError),
	/// Element-level problems collected while reading definitions.
	#[error("{} problem(s) while reading definitions:\n{}", .problems.len(), render_problems(.problems))]
	Problems { problems: Vec<Problem> },
	#[error("{phase} failed in processor '{name}': {source}")]
	Processor {
		phase: Phase,
		name: String,
		#[source]
		source: ProcessorError,
	},
	#[error("{phase} failed: {source}")]
	Provider {
		phase: Phase,
		#[source]
		source: ProviderError,
	},
	/// Registry mutators kept registering new registry mutators past the pass cap.
	#[error("registry mutators did not settle after {passes} passes; still pending: {}", .pending.join(", "))]
	FixedPointNotReached { passes: usize, pending: Vec<String> },
}

fn render_problems(problems: &[Problem]) -> String {
	problems
		.iter()
		.map(|problem| format!("  {problem}"))
		.collect::<Vec<_>>()
		.join("\n")
}
