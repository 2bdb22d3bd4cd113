//! Resource handles and location resolvers.
//!
//! A [`Resource`] is a handle to byte content. Resolvers turn location
//! strings into resources; resolvers that also implement [`PatternResolver`]
//! expand glob patterns into concrete resource sets.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::GlobBuilder;
use tracing::trace;
use url::Url;
use walkdir::WalkDir;

use crate::error::ResourceError;

/// Handle to byte content at a location.
pub trait Resource: fmt::Debug + Send + Sync {
	/// Human-readable description used in diagnostics.
	fn description(&self) -> String;

	fn exists(&self) -> bool;

	fn read(&self) -> Result<Vec<u8>, ResourceError>;

	/// Location string other locations can be concatenated against, if any.
	fn location(&self) -> Option<String>;

	/// Resolves `relative` against this resource's parent location.
	fn create_relative(&self, relative: &str) -> Result<Arc<dyn Resource>, ResourceError>;

	/// Key identifying the underlying content, used to detect cyclic imports.
	fn identity(&self) -> String {
		self.description()
	}
}

/// Resource backed by a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResource {
	path: PathBuf,
}

impl FileResource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl Resource for FileResource {
	fn description(&self) -> String {
		format!("file [{}]", self.path.display())
	}

	fn exists(&self) -> bool {
		self.path.is_file()
	}

	fn read(&self) -> Result<Vec<u8>, ResourceError> {
		fs::read(&self.path).map_err(|source| ResourceError::Io {
			location: self.path.display().to_string(),
			source,
		})
	}

	fn location(&self) -> Option<String> {
		let absolute = if self.path.is_absolute() {
			self.path.clone()
		} else {
			std::env::current_dir().ok()?.join(&self.path)
		};
		Url::from_file_path(&absolute).ok().map(String::from)
	}

	fn create_relative(&self, relative: &str) -> Result<Arc<dyn Resource>, ResourceError> {
		let parent = self.path.parent().unwrap_or_else(|| Path::new(""));
		Ok(Arc::new(Self::new(parent.join(relative))))
	}

	fn identity(&self) -> String {
		fs::canonicalize(&self.path)
			.unwrap_or_else(|_| self.path.clone())
			.display()
			.to_string()
	}
}

/// In-memory resource. Has no location, so relative imports cannot resolve.
#[derive(Clone)]
pub struct ByteResource {
	description: String,
	bytes: Arc<[u8]>,
}

impl ByteResource {
	pub fn new(description: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
		Self {
			description: description.into(),
			bytes: bytes.into(),
		}
	}

	pub fn from_text(description: impl Into<String>, text: &str) -> Self {
		Self::new(description, text.as_bytes())
	}
}

impl fmt::Debug for ByteResource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ByteResource")
			.field("description", &self.description)
			.field("len", &self.bytes.len())
			.finish()
	}
}

impl Resource for ByteResource {
	fn description(&self) -> String {
		self.description.clone()
	}

	fn exists(&self) -> bool {
		true
	}

	fn read(&self) -> Result<Vec<u8>, ResourceError> {
		Ok(self.bytes.to_vec())
	}

	fn location(&self) -> Option<String> {
		None
	}

	fn create_relative(&self, _relative: &str) -> Result<Arc<dyn Resource>, ResourceError> {
		Err(ResourceError::NoRelative {
			resource: self.description.clone(),
		})
	}
}

/// Turns location strings into resources.
pub trait ResourceResolver: Send + Sync {
	fn resource(&self, location: &str) -> Result<Arc<dyn Resource>, ResourceError>;

	/// Pattern expansion, when supported.
	fn patterns(&self) -> Option<&dyn PatternResolver> {
		None
	}
}

/// Expands a location pattern into concrete resources.
pub trait PatternResolver: Send + Sync {
	fn resources(&self, pattern: &str) -> Result<Vec<Arc<dyn Resource>>, ResourceError>;
}

/// Resolves plain paths and `file:` URLs against a base directory.
///
/// Glob metacharacters (`*`, `?`, `[`, `{`) in a location expand to every
/// matching file, sorted by path. `**` crosses directories.
#[derive(Debug, Clone, Default)]
pub struct FileSystemResolver {
	base_dir: PathBuf,
}

impl FileSystemResolver {
	pub fn new(base_dir: impl Into<PathBuf>) -> Self {
		Self { base_dir: base_dir.into() }
	}

	pub fn base_dir(&self) -> &Path {
		&self.base_dir
	}

	fn to_path(&self, location: &str) -> Result<PathBuf, ResourceError> {
		if location.starts_with("file:") {
			let url = Url::parse(location).map_err(|_| ResourceError::InvalidLocation {
				location: location.to_string(),
			})?;
			return url.to_file_path().map_err(|()| ResourceError::InvalidLocation {
				location: location.to_string(),
			});
		}

		if let Some(scheme) = url_scheme(location) {
			return Err(ResourceError::UnsupportedScheme {
				location: location.to_string(),
				scheme,
			});
		}

		let path = Path::new(location);
		Ok(if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.base_dir.join(path)
		})
	}
}

impl ResourceResolver for FileSystemResolver {
	fn resource(&self, location: &str) -> Result<Arc<dyn Resource>, ResourceError> {
		Ok(Arc::new(FileResource::new(self.to_path(location)?)))
	}

	fn patterns(&self) -> Option<&dyn PatternResolver> {
		Some(self)
	}
}

impl PatternResolver for FileSystemResolver {
	fn resources(&self, pattern: &str) -> Result<Vec<Arc<dyn Resource>>, ResourceError> {
		if !has_glob_meta(pattern) {
			return Ok(vec![self.resource(pattern)?]);
		}

		// The literal prefix goes through normal location decoding; only the
		// remainder is a glob, matched against paths relative to the root.
		let (prefix, glob) = split_pattern(pattern);
		let root = match self.to_path(prefix)? {
			root if root.as_os_str().is_empty() => PathBuf::from("."),
			root => root,
		};
		if !root.is_dir() {
			return Err(ResourceError::MissingPatternRoot {
				pattern: pattern.to_string(),
				root: root.display().to_string(),
			});
		}
		let matcher = GlobBuilder::new(glob)
			.literal_separator(true)
			.build()
			.map_err(|source| ResourceError::Pattern {
				pattern: pattern.to_string(),
				source,
			})?
			.compile_matcher();

		let mut walker = WalkDir::new(&root).follow_links(false).min_depth(1);
		if !glob.contains('/') {
			walker = walker.max_depth(1);
		}
		let mut files = Vec::new();
		for entry in walker {
			let entry = entry.map_err(|source| ResourceError::Walk {
				root: root.display().to_string(),
				source,
			})?;
			if entry.file_type().is_dir() || !entry.path().is_file() {
				continue;
			}
			if let Ok(relative) = entry.path().strip_prefix(&root)
				&& matcher.is_match(relative)
			{
				files.push(entry.into_path());
			}
		}
		files.sort();

		trace!(pattern, root = %root.display(), matches = files.len(), "expanded location pattern");
		Ok(files
			.into_iter()
			.map(|file| Arc::new(FileResource::new(file)) as Arc<dyn Resource>)
			.collect())
	}
}

const GLOB_META: [char; 4] = ['*', '?', '[', '{'];

fn has_glob_meta(location: &str) -> bool {
	location.contains(GLOB_META)
}

/// Splits a pattern at the last `/` before its first glob metacharacter into
/// a literal directory prefix (slash included) and the glob remainder.
fn split_pattern(pattern: &str) -> (&str, &str) {
	let meta = pattern.find(GLOB_META).unwrap_or(pattern.len());
	match pattern[..meta].rfind('/') {
		Some(idx) => (&pattern[..=idx], &pattern[idx + 1..]),
		None => ("", pattern),
	}
}

/// Scheme of `location` when it parses as a URL with a scheme longer than one
/// character. Single letters are drive prefixes, not schemes.
fn url_scheme(location: &str) -> Option<String> {
	Url::parse(location)
		.ok()
		.map(|url| url.scheme().to_string())
		.filter(|scheme| scheme.len() > 1)
}

/// Returns true if `location` carries a URL scheme or is an absolute path.
pub fn is_absolute_location(location: &str) -> bool {
	url_scheme(location).is_some() || Path::new(location).is_absolute()
}

/// Replaces the last segment of `base` with `relative`.
///
/// `"dir/a.xml"` + `"b.xml"` gives `"dir/b.xml"`; a base without `/` yields
/// `relative` unchanged.
pub fn apply_relative_path(base: &str, relative: &str) -> String {
	match base.rfind('/') {
		Some(idx) => {
			let mut path = base[..idx].to_string();
			if !relative.starts_with('/') {
				path.push('/');
			}
			path.push_str(relative);
			path
		}
		None => relative.to_string(),
	}
}
