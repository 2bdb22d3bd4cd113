//! Bootstrap configuration, read from TOML.
//!
//! ```toml
//! locations = ["app.xml"]
//!
//! [reader]
//! validation = "auto"
//!
//! [resources]
//! base_dir = "conf"
//!
//! [environment]
//! active_profiles = ["dev"]
//! [environment.properties]
//! root = "/srv/app"
//!
//! [orchestrator]
//! max_registry_passes = 64
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use blueprint_reader::ReaderSettings;
use blueprint_reader::environment::{DEFAULT_PROFILE, StandardEnvironment};
use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapConfig {
	/// Locations loaded in order. Patterns are allowed.
	pub locations: Vec<String>,
	pub reader: ReaderSettings,
	pub resources: ResourceConfig,
	pub environment: EnvironmentConfig,
	pub orchestrator: OrchestratorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceConfig {
	/// Directory relative locations resolve against.
	pub base_dir: PathBuf,
}

impl Default for ResourceConfig {
	fn default() -> Self {
		Self {
			base_dir: PathBuf::from("."),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
	pub active_profiles: Vec<String>,
	pub default_profiles: Vec<String>,
	/// Fall back to process environment variables for unknown placeholders.
	pub include_process_env: bool,
	pub properties: BTreeMap<String, String>,
}

impl Default for EnvironmentConfig {
	fn default() -> Self {
		Self {
			active_profiles: Vec::new(),
			default_profiles: vec![DEFAULT_PROFILE.to_string()],
			include_process_env: false,
			properties: BTreeMap::new(),
		}
	}
}

impl EnvironmentConfig {
	pub fn build(&self) -> StandardEnvironment {
		StandardEnvironment::new()
			.with_properties(self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str())))
			.with_active_profiles(self.active_profiles.iter().map(String::as_str))
			.with_default_profiles(self.default_profiles.iter().map(String::as_str))
			.with_process_env(self.include_process_env)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrchestratorConfig {
	/// Cap on registry mutator discovery passes; absent means unbounded.
	pub max_registry_passes: Option<usize>,
}

impl BootstrapConfig {
	pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}

	/// Reads a configuration file. A relative `base_dir` is taken relative to
	/// the file's directory.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		let mut config = Self::from_toml(&text)?;
		if config.resources.base_dir.is_relative()
			&& let Some(parent) = path.parent()
		{
			config.resources.base_dir = parent.join(&config.resources.base_dir);
		}
		Ok(config)
	}
}
