//! dombind binding generation.
//!
//! Turns registered metadata into a C ABI.
//!
//! ## Pipeline
//!
//! ```text
//! TypeMap ──► build_binding_manifest ──► BindingManifest ──┐
//!    │                                                       ├──► CapiBindGenerator ──► <module>.h / <module>.c
//!    └──────► build_module_map ─────────► ModuleMap ─────────┘                          bindings_manifest.json
//!
//! DataRegistrySnapshot ──► CBindingGenerator ──► dombind_legacy.h
//! ```
//!
//! ## Modules
//!
//! - [`subject`]: dispatch families and the subject kind catalog
//! - [`ctype`]: the fixed semantic-type to C-type table
//! - [`signature`]: prototype derivation and explicit signature parsing
//! - [`manifest`]: classification into a serializable binding manifest
//! - [`module_map`]: partitioning of types into output modules
//! - [`generator`]: the [`BindGenerator`] contract
//! - [`capi`]: the primary C API generator
//! - [`legacy`]: single-header bootstrap generator

pub mod capi;
pub mod ctype;
pub mod generator;
pub mod legacy;
pub mod manifest;
pub mod module_map;
pub mod signature;
pub mod subject;

pub use capi::{CapiBindGenerator, CapiOptions, CustomEmitContext, CustomEmitter};
pub use ctype::CTypeMap;
pub use generator::{BindGenerator, SplitOutput};
pub use legacy::CBindingGenerator;
pub use manifest::{
    BindingManifest, FunctionBindingDescriptor, ManifestResult, SubjectTypeDescriptor,
    build_binding_manifest, manifest_from_json, manifest_to_json,
};
pub use module_map::{BindModule, ModuleMap, build_module_map, module_has_functions};
pub use signature::CParam;
pub use subject::{
    DEFAULT_SUBJECT_KIND, DispatchFamily, SubjectKindCatalog, SubjectKindDescriptor,
    dispatch_family_from_string, dispatch_family_to_string,
};
