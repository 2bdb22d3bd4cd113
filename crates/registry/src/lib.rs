//! Component definition registry.
//!
//! The registry is the single source of truth mutated while the container
//! bootstraps: document readers populate it, registry mutators extend it, and
//! the out-of-crate instantiation engine consumes it once bootstrap completes.
//!
//! # Modules
//!
//! - [`capability`] - Capability flags a definition's type can satisfy
//! - [`catalog`] - Type reference to capability lookup
//! - [`definition`] - Definitions, property specs and holders
//! - [`registry`] - Ordered name/alias store with capability queries

pub mod capability;
pub mod catalog;
pub mod definition;
pub mod error;
pub mod registry;

pub use capability::CapabilitySet;
pub use catalog::{EmptyTypeCatalog, StaticTypeCatalog, TypeCatalog};
pub use definition::{Autowire, Definition, DefinitionHolder, PropertySpec, PropertyValue, Role, SourceLocation};
pub use error::{AliasError, RegistryError};
pub use registry::{NamesOfType, Registry};
