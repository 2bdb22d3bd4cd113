//! Placeholder resolution and profile acceptance.

use indexmap::{IndexMap, IndexSet};

use crate::error::PlaceholderError;

const PLACEHOLDER_PREFIX: &str = "${";
const PLACEHOLDER_SUFFIX: char = '}';
const VALUE_SEPARATOR: char = ':';

/// Profile used when no profile is explicitly activated.
pub const DEFAULT_PROFILE: &str = "default";

/// Property source and profile oracle consulted while reading documents.
pub trait Environment: Send + Sync {
	/// Replaces every `${name}` or `${name:default}` in `text`.
	fn resolve_required_placeholders(&self, text: &str) -> Result<String, PlaceholderError>;

	/// Returns true if any of `profiles` is active. A `!name` entry matches
	/// when `name` is not active.
	fn accepts_profiles(&self, profiles: &[&str]) -> bool;
}

/// Environment backed by an explicit property map and profile sets.
#[derive(Debug, Clone)]
pub struct StandardEnvironment {
	properties: IndexMap<String, String>,
	active_profiles: IndexSet<String>,
	default_profiles: IndexSet<String>,
	include_process_env: bool,
}

impl Default for StandardEnvironment {
	fn default() -> Self {
		Self {
			properties: IndexMap::new(),
			active_profiles: IndexSet::new(),
			default_profiles: IndexSet::from([DEFAULT_PROFILE.to_string()]),
			include_process_env: false,
		}
	}
}

impl StandardEnvironment {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.properties.insert(name.into(), value.into());
		self
	}

	pub fn with_properties<I, K, V>(mut self, properties: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.properties
			.extend(properties.into_iter().map(|(k, v)| (k.into(), v.into())));
		self
	}

	pub fn with_active_profiles<I, S>(mut self, profiles: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.active_profiles = profiles.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_default_profiles<I, S>(mut self, profiles: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.default_profiles = profiles.into_iter().map(Into::into).collect();
		self
	}

	/// Falls back to process environment variables for unknown properties.
	pub fn with_process_env(mut self, include: bool) -> Self {
		self.include_process_env = include;
		self
	}

	pub fn property(&self, name: &str) -> Option<String> {
		self.properties
			.get(name)
			.cloned()
			.or_else(|| self.include_process_env.then(|| std::env::var(name).ok()).flatten())
	}

	pub fn active_profiles(&self) -> impl Iterator<Item = &str> {
		self.active_profiles.iter().map(String::as_str)
	}

	fn is_profile_active(&self, profile: &str) -> bool {
		if self.active_profiles.is_empty() {
			self.default_profiles.contains(profile)
		} else {
			self.active_profiles.contains(profile)
		}
	}

	fn parse(&self, value: &str, visiting: &mut Vec<String>) -> Result<String, PlaceholderError> {
		let mut result = value.to_string();
		let mut search_from = 0;

		while let Some(offset) = result[search_from..].find(PLACEHOLDER_PREFIX) {
			let start = search_from + offset;
			let Some(end) = placeholder_end(&result, start) else {
				break;
			};
			let placeholder = result[start + PLACEHOLDER_PREFIX.len()..end].to_string();
			if visiting.contains(&placeholder) {
				return Err(PlaceholderError::Circular { placeholder });
			}
			visiting.push(placeholder.clone());

			let key = self.parse(&placeholder, visiting)?;
			let resolved = match self.property(&key) {
				Some(found) => found,
				None => match key.split_once(VALUE_SEPARATOR) {
					Some((name, default)) => self.property(name).unwrap_or_else(|| default.to_string()),
					None => {
						return Err(PlaceholderError::Unresolvable {
							placeholder,
							value: value.to_string(),
						});
					}
				},
			};
			let resolved = self.parse(&resolved, visiting)?;

			result.replace_range(start..=end, &resolved);
			search_from = start + resolved.len();
			visiting.pop();
		}

		Ok(result)
	}
}

/// Index of the `}` closing the placeholder opened at `start`, honoring nesting.
fn placeholder_end(text: &str, start: usize) -> Option<usize> {
	let bytes = text.as_bytes();
	let mut depth = 0usize;
	let mut idx = start + PLACEHOLDER_PREFIX.len();
	while idx < bytes.len() {
		if bytes[idx..].starts_with(PLACEHOLDER_PREFIX.as_bytes()) {
			depth += 1;
			idx += PLACEHOLDER_PREFIX.len();
			continue;
		}
		if bytes[idx] == PLACEHOLDER_SUFFIX as u8 {
			if depth == 0 {
				return Some(idx);
			}
			depth -= 1;
		}
		idx += 1;
	}
	None
}

impl Environment for StandardEnvironment {
	fn resolve_required_placeholders(&self, text: &str) -> Result<String, PlaceholderError> {
		self.parse(text, &mut Vec::new())
	}

	fn accepts_profiles(&self, profiles: &[&str]) -> bool {
		profiles.iter().map(|p| p.trim()).any(|profile| match profile.strip_prefix('!') {
			Some(negated) => !negated.is_empty() && !self.is_profile_active(negated),
			None => !profile.is_empty() && self.is_profile_active(profile),
		})
	}
}

/// Splits a multi-value attribute on `,`, `;` and spaces, dropping empty tokens.
pub fn tokenize(value: &str) -> Vec<&str> {
	value
		.split([',', ';', ' '])
		.map(str::trim)
		.filter(|token| !token.is_empty())
		.collect()
}
