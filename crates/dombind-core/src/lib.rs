//! dombind core crate.
//!
//! Plain data describing registered display-object types, plus the pieces
//! every other dombind crate shares:
//!
//! - [`TypeInfo`], [`PropertyInfo`], [`FunctionInfo`] - registered metadata
//! - [`SemanticType`] - closed set of declared member types
//! - [`Value`], [`Callable`] - runtime values and type-erased call shapes
//! - [`DataRegistrySnapshot`] - immutable copy handed to generators
//! - [`error`] - error taxonomy for every phase
//! - [`GenerationReport`] - what a generator wrote and what it skipped

mod callable;
mod entries;
pub mod error;
mod report;
mod semantic_type;
mod snapshot;
mod value;

pub use callable::{CallShape, Callable};
pub use entries::{EntryKind, EnumValue, FunctionInfo, PropertyInfo, TypeInfo};
pub use error::{
    BindingError, CallError, CatalogError, GenerationError, MetadataError, RegistryError,
};
pub use report::GenerationReport;
pub use semantic_type::SemanticType;
pub use snapshot::{DataRegistrySnapshot, TypeMap};
pub use value::{ObjectHandle, Value};
