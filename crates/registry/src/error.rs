/// Alias table errors. Fatal only for the directive that caused them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AliasError {
	/// The alias target is neither a registered definition nor a known alias.
	#[error("cannot alias '{alias}' to unknown name '{name}'")]
	UnknownName { name: String, alias: String },
	/// The alias is already bound to a different name.
	#[error("alias '{alias}' for '{name}' is already bound to '{existing}'")]
	AlreadyBound { name: String, alias: String, existing: String },
	/// The alias would hide a registered definition of the same name.
	#[error("alias '{alias}' for '{name}' shadows a registered definition")]
	ShadowsDefinition { name: String, alias: String },
}

/// Definition store errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	/// Empty or whitespace-only registration name.
	#[error("invalid definition name {0:?}")]
	InvalidName(String),
	/// A definition already exists and overriding is disabled.
	#[error("cannot register definition '{name}': name already bound and overriding is disabled")]
	OverrideNotAllowed { name: String },
	/// No definition is registered under the name.
	#[error("no definition named '{0}'")]
	NoSuchDefinition(String),
	#[error(transparent)]
	Alias(#[from] AliasError),
}
