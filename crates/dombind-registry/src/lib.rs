//! dombind registry crate.
//!
//! Provides [`DataRegistry`], the store every display-object type and API
//! module registers its metadata into, and the [`BindingGenerator`] contract
//! for generators driven from the registry.

mod generator;
mod global;
mod registry;

pub use generator::{BindingGenerator, GenerationSummary, GeneratorOutcome};
pub use global::{global, install_global};
pub use registry::DataRegistry;

// Re-export the metadata model for registration call sites.
pub use dombind_core::{
    Callable, DataRegistrySnapshot, EntryKind, FunctionInfo, PropertyInfo, RegistryError,
    SemanticType, TypeInfo, Value,
};
