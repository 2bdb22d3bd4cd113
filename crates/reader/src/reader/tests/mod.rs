use std::fs;
use std::path::Path;
use std::sync::Arc;

use blueprint_registry::Registry;
use tempfile::TempDir;

use super::DefinitionReader;
use crate::environment::{Environment, StandardEnvironment};
use crate::events::{CollectingListener, ReaderEvent};
use crate::problems::{CollectingReporter, Problem};
use crate::resource::FileSystemResolver;

mod directives;
mod imports;

/// Temporary document tree with collecting listener and reporter.
struct Fixture {
	dir: TempDir,
	listener: Arc<CollectingListener>,
	reporter: Arc<CollectingReporter>,
}

impl Fixture {
	fn new() -> Self {
		Self::in_dir(tempfile::tempdir().expect("create tempdir"))
	}

	/// Fixture rooted in a tempdir whose name starts with `prefix`.
	fn with_prefix(prefix: &str) -> Self {
		Self::in_dir(tempfile::Builder::new().prefix(prefix).tempdir().expect("create tempdir"))
	}

	fn in_dir(dir: TempDir) -> Self {
		Self {
			dir,
			listener: Arc::new(CollectingListener::new()),
			reporter: Arc::new(CollectingReporter::new()),
		}
	}

	fn path(&self) -> &Path {
		self.dir.path()
	}

	/// Writes a `components` document with `body` as its content.
	fn document(&self, relative: &str, body: &str) {
		self.raw(relative, &components(body));
	}

	fn raw(&self, relative: &str, content: &str) {
		let path = self.dir.path().join(relative);
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).expect("create parent dirs");
		}
		fs::write(path, content).expect("write document");
	}

	fn reader(&self) -> DefinitionReader {
		self.reader_with(StandardEnvironment::new())
	}

	fn reader_with(&self, environment: impl Environment + 'static) -> DefinitionReader {
		DefinitionReader::new(Arc::new(FileSystemResolver::new(self.dir.path())))
			.with_environment(Arc::new(environment))
			.with_listener(self.listener.clone())
			.with_reporter(self.reporter.clone())
	}

	fn problems(&self) -> Vec<Problem> {
		self.reporter.problems()
	}

	fn events(&self) -> Vec<ReaderEvent> {
		self.listener.events()
	}

	/// Locations and loaded resource counts of every import event.
	fn imports(&self) -> Vec<(String, usize)> {
		self.events()
			.into_iter()
			.filter_map(|event| match event {
				ReaderEvent::ImportProcessed { location, resources, .. } => Some((location, resources.len())),
				_ => None,
			})
			.collect()
	}

	fn registered(&self) -> Vec<String> {
		self.events()
			.into_iter()
			.filter_map(|event| match event {
				ReaderEvent::ComponentRegistered { holder } => Some(holder.name),
				_ => None,
			})
			.collect()
	}
}

fn components(body: &str) -> String {
	format!("<?xml version=\"1.0\"?>\n<components xmlns=\"urn:blueprint:components\">\n{body}\n</components>\n")
}

fn names(registry: &Registry) -> Vec<&str> {
	registry.names().collect()
}
