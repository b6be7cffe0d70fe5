//! dombind
//!
//! Registers display-object metadata at startup and generates a C API for
//! it: one header/source pair per module, a shared runtime header and a JSON
//! binding manifest.
//!
//! # Crates
//!
//! | Crate              | Contents                                              |
//! |--------------------|-------------------------------------------------------|
//! | `dombind-core`     | metadata model, callables, snapshot, errors           |
//! | `dombind-registry` | [`DataRegistry`](prelude::DataRegistry), registry-driven generators |
//! | `dombind-bindgen`  | manifest builder, C API and legacy generators         |
//!
//! This crate adds metadata documents ([`metadata`]) and the generation
//! driver used by the `dombind` binary ([`generate`]).

pub mod generate;
pub mod metadata;

pub use dombind_bindgen as bindgen;
pub use dombind_core as model;
pub use dombind_registry as registry;

pub use generate::GenerateConfig;
pub use metadata::{MetadataDocument, MetadataLoadError};

pub mod prelude {
    pub use dombind_bindgen::{
        BindGenerator, BindingManifest, CBindingGenerator, CapiBindGenerator, CapiOptions,
        CustomEmitContext, CustomEmitter, DispatchFamily, SplitOutput, SubjectKindCatalog,
        SubjectKindDescriptor, build_binding_manifest, manifest_from_json, manifest_to_json,
    };
    pub use dombind_core::{
        BindingError, Callable, DataRegistrySnapshot, EntryKind, FunctionInfo, GenerationError,
        GenerationReport, ObjectHandle, PropertyInfo, SemanticType, TypeInfo, Value,
    };
    pub use dombind_registry::{BindingGenerator, DataRegistry, GenerationSummary};
}
