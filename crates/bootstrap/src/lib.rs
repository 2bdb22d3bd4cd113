//! Container bootstrap.
//!
//! Reads component documents into a [`Registry`](blueprint_registry::Registry),
//! then runs extension processors over it in fixed phases before anything is
//! instantiated:
//!
//! - registry mutators, repeated until no new one appears
//! - factory mutators not already run
//! - instance interceptor registration
//!
//! Processors are classified by the capabilities their type reference declares
//! in [`ProcessorTypes`], which also builds the instances.
//!
//! # Modules
//!
//! - [`processor`] - Processor traits and the instantiated [`Processor`]
//! - [`provider`] - Type table and instance provider
//! - [`factory`] - Registry wrapper processors operate on
//! - [`orchestrator`] - Phase ordering
//! - [`interceptors`] - Built-in chain checker and listener detector
//! - [`config`] - TOML configuration
//! - [`pipeline`] - Reading plus orchestration in one call

pub mod config;
pub mod error;
pub mod factory;
pub mod interceptors;
pub mod orchestrator;
pub mod pipeline;
pub mod processor;
pub mod provider;

pub use config::BootstrapConfig;
pub use error::{BootstrapError, ConfigError, Phase, ProcessorError, ProviderError};
pub use factory::ComponentFactory;
pub use interceptors::{InterceptorChainChecker, ListenerDetector};
pub use orchestrator::{ExtensionOrchestrator, OrchestrationReport, ProcessedSet, RegisteredInterceptors, Tier};
pub use pipeline::{Bootstrap, Bootstrapped};
pub use processor::{
	ComponentView, DEFAULT_ORDER, FactoryMutator, InstanceInterceptor, Mutator, Ordered, Processor, RegistryMutator,
};
pub use provider::{ProcessorProvider, ProcessorTypes};
