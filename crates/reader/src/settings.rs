use serde::Deserialize;

use crate::document::loader::ValidationMode;

/// Reader switches, deserialized from the `[reader]` configuration table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderSettings {
	pub validation: ValidationMode,
	pub namespace_aware: bool,
	/// Whether a later definition may replace an earlier one of the same name.
	pub allow_definition_overriding: bool,
}

impl Default for ReaderSettings {
	fn default() -> Self {
		Self {
			validation: ValidationMode::Auto,
			namespace_aware: true,
			allow_definition_overriding: true,
		}
	}
}
