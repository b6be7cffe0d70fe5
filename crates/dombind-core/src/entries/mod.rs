//! Registry entry types.
//!
//! - [`TypeInfo`] - a registered type and its members
//! - [`PropertyInfo`] - a property with optional accessor callables
//! - [`FunctionInfo`] - a function with its foreign-symbol overrides
//! - [`EntryKind`] - which module bucket a type lands in
//! - [`EnumValue`] - an enumerator of an enum entry

mod function;
mod property;
mod type_info;

pub use function::FunctionInfo;
pub use property::PropertyInfo;
pub use type_info::{EntryKind, EnumValue, TypeInfo};
