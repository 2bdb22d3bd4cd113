//! Per-scope parsing defaults.
//!
//! Every `components` scope pushes a [`ParserState`] derived from its parent.
//! [`StateStack::enter`] returns a guard that pops the frame when dropped, so
//! early returns and `?` leave the stack as they found it.

use std::ops::{Deref, DerefMut};

use blueprint_registry::Autowire;
use crate::document::Element;
use crate::grammar::{
	DEFAULT_AUTOWIRE_ATTRIBUTE, DEFAULT_DESTROY_METHOD_ATTRIBUTE, DEFAULT_INIT_METHOD_ATTRIBUTE,
	DEFAULT_LAZY_INIT_ATTRIBUTE, DEFAULT_VALUE,
};

/// A scope default attribute whose value was not understood. The scope
/// inherits its parent's value instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDefault {
	pub attribute: &'static str,
	pub value: String,
}

/// Defaults applied to components declared in a scope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParserState {
	pub lazy_init: bool,
	pub autowire: Autowire,
	pub init_method: Option<String>,
	pub destroy_method: Option<String>,
}

impl ParserState {
	/// Derives the defaults of `scope`. Absent attributes and the value
	/// `"default"` inherit from `parent`, as do invalid values, which are
	/// returned alongside.
	pub fn inherit(parent: &ParserState, scope: &Element) -> (Self, Vec<InvalidDefault>) {
		let mut invalid = Vec::new();
		let declared = |attribute: &str| {
			scope
				.attribute(attribute)
				.map(str::trim)
				.filter(|value| !value.is_empty() && *value != DEFAULT_VALUE)
		};

		let lazy_init = match declared(DEFAULT_LAZY_INIT_ATTRIBUTE) {
			None => parent.lazy_init,
			Some("true") => true,
			Some("false") => false,
			Some(other) => {
				invalid.push(InvalidDefault {
					attribute: DEFAULT_LAZY_INIT_ATTRIBUTE,
					value: other.to_string(),
				});
				parent.lazy_init
			}
		};
		let autowire = match declared(DEFAULT_AUTOWIRE_ATTRIBUTE) {
			None => parent.autowire,
			Some(value) => Autowire::parse(value).unwrap_or_else(|| {
				invalid.push(InvalidDefault {
					attribute: DEFAULT_AUTOWIRE_ATTRIBUTE,
					value: value.to_string(),
				});
				parent.autowire
			}),
		};

		let state = Self {
			lazy_init,
			autowire,
			init_method: declared(DEFAULT_INIT_METHOD_ATTRIBUTE)
				.map(str::to_string)
				.or_else(|| parent.init_method.clone()),
			destroy_method: declared(DEFAULT_DESTROY_METHOD_ATTRIBUTE)
				.map(str::to_string)
				.or_else(|| parent.destroy_method.clone()),
		};
		(state, invalid)
	}
}

/// Stack of scope defaults. The bottom frame holds the built-in defaults and
/// is never popped.
#[derive(Debug, Clone)]
pub struct StateStack {
	frames: Vec<ParserState>,
}

impl Default for StateStack {
	fn default() -> Self {
		Self {
			frames: vec![ParserState::default()],
		}
	}
}

impl StateStack {
	pub fn new() -> Self {
		Self::default()
	}

	/// Defaults of the innermost scope.
	pub fn current(&self) -> &ParserState {
		// The bottom frame is never popped.
		&self.frames[self.frames.len() - 1]
	}

	/// Number of entered scopes.
	pub fn depth(&self) -> usize {
		self.frames.len() - 1
	}

	/// Pushes `state` until the returned guard drops.
	pub fn enter(&mut self, state: ParserState) -> ScopeGuard<'_> {
		self.frames.push(state);
		ScopeGuard { stack: self }
	}
}

/// Pops its frame on drop. Derefs to the stack for nested scopes.
pub struct ScopeGuard<'a> {
	stack: &'a mut StateStack,
}

impl Deref for ScopeGuard<'_> {
	type Target = StateStack;

	fn deref(&self) -> &StateStack {
		self.stack
	}
}

impl DerefMut for ScopeGuard<'_> {
	fn deref_mut(&mut self) -> &mut StateStack {
		self.stack
	}
}

impl Drop for ScopeGuard<'_> {
	fn drop(&mut self) {
		self.stack.frames.pop();
	}
}
