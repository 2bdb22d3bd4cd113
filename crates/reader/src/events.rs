//! Notifications emitted while documents are read.

use std::sync::Arc;

use blueprint_registry::{DefinitionHolder, SourceLocation};
use parking_lot::Mutex;

use crate::resource::Resource;
use crate::state::ParserState;

#[derive(Debug, Clone)]
pub enum ReaderEvent {
	/// An import directive was processed. `resources` lists what was actually loaded.
	ImportProcessed {
		location: String,
		resources: Vec<Arc<dyn Resource>>,
		source: SourceLocation,
	},
	AliasRegistered {
		name: String,
		alias: String,
		source: SourceLocation,
	},
	ComponentRegistered { holder: DefinitionHolder },
	/// A scope was entered with the given resolved defaults.
	DefaultsRegistered { defaults: ParserState, source: SourceLocation },
}

pub trait ReaderEventListener: Send + Sync {
	fn on_event(&self, event: &ReaderEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl ReaderEventListener for NoopListener {
	fn on_event(&self, _event: &ReaderEvent) {}
}

/// Records events in arrival order.
#[derive(Debug, Default)]
pub struct CollectingListener {
	events: Mutex<Vec<ReaderEvent>>,
}

impl CollectingListener {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn events(&self) -> Vec<ReaderEvent> {
		self.events.lock().clone()
	}

	pub fn take(&self) -> Vec<ReaderEvent> {
		std::mem::take(&mut *self.events.lock())
	}
}

impl ReaderEventListener for CollectingListener {
	fn on_event(&self, event: &ReaderEvent) {
		self.events.lock().push(event.clone());
	}
}
