//! Recoverable problems found while reading.

use std::error::Error as StdError;
use std::fmt;

use blueprint_registry::SourceLocation;
use parking_lot::Mutex;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
	Warning,
	Error,
}

/// One reported problem with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
	pub severity: Severity,
	pub message: String,
	pub location: Option<SourceLocation>,
	/// Rendered cause chain, outermost first.
	pub cause: Option<String>,
}

impl Problem {
	pub fn error(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
		Self {
			severity: Severity::Error,
			message: message.into(),
			location,
			cause: None,
		}
	}

	pub fn warning(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
		Self {
			severity: Severity::Warning,
			..Self::error(message, location)
		}
	}

	/// Attaches `cause` and its source chain.
	pub fn with_cause(mut self, cause: &(dyn StdError + 'static)) -> Self {
		let mut rendered = cause.to_string();
		let mut next = cause.source();
		while let Some(source) = next {
			let text = source.to_string();
			if !rendered.contains(&text) {
				rendered.push_str(": ");
				rendered.push_str(&text);
			}
			next = source.source();
		}
		self.cause = Some(rendered);
		self
	}
}

impl fmt::Display for Problem {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(location) = &self.location {
			write!(f, "{location}: ")?;
		}
		f.write_str(&self.message)?;
		if let Some(cause) = &self.cause {
			write!(f, " ({cause})")?;
		}
		Ok(())
	}
}

/// Receives problems that do not abort reading.
pub trait ProblemReporter: Send + Sync {
	fn report(&self, problem: Problem);
}

/// Logs and keeps every reported problem.
#[derive(Debug, Default)]
pub struct CollectingReporter {
	problems: Mutex<Vec<Problem>>,
}

impl CollectingReporter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn problems(&self) -> Vec<Problem> {
		self.problems.lock().clone()
	}

	pub fn take(&self) -> Vec<Problem> {
		std::mem::take(&mut *self.problems.lock())
	}

	pub fn error_count(&self) -> usize {
		self.problems
			.lock()
			.iter()
			.filter(|p| p.severity == Severity::Error)
			.count()
	}
}

impl ProblemReporter for CollectingReporter {
	fn report(&self, problem: Problem) {
		warn!(severity = ?problem.severity, location = ?problem.location, cause = ?problem.cause, "{}", problem.message);
		self.problems.lock().push(problem);
	}
}
