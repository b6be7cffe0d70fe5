//! Error types for dombind.
//!
//! One enum per phase:
//!
//! ```text
//! MetadataError   - malformed metadata labels
//! CallError       - invoking a registered callable
//! RegistryError   - runtime lookups through the DataRegistry
//! CatalogError    - subject kind catalog and custom emitter setup
//! BindingError    - a single unit skipped during generation (non-fatal)
//! GenerationError - a generator could not complete (fatal for that generator)
//! ```

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// Metadata Errors
// ============================================================================

/// Errors raised while interpreting metadata labels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// A semantic type label is not part of the closed tag set.
    #[error("unknown semantic type: '{0}'")]
    UnknownSemanticType(String),
}

// ============================================================================
// Call Errors
// ============================================================================

/// Errors raised when invoking a [`Callable`](crate::Callable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The number of arguments does not match the call shape.
    #[error("expected {expected} argument(s), found {found}")]
    ArityMismatch { expected: usize, found: usize },

    /// A getter or setter received something other than a handle as receiver.
    #[error("expected an object handle as receiver, found {found}")]
    ExpectedHandle { found: &'static str },

    /// The callable lives in the host runtime and is only reachable through
    /// generated bindings.
    #[error("callable is bound by the host runtime")]
    HostBound,
}

// ============================================================================
// Registry Errors
// ============================================================================

/// Errors raised by registry registration and runtime lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Registration with an empty type or member name.
    #[error("empty {0} name")]
    EmptyName(&'static str),

    /// No type with this name is registered.
    #[error("type not found: {0}")]
    TypeNotFound(String),

    /// The type has no function with this name.
    #[error("function not found: {type_name}::{function}")]
    FunctionNotFound { type_name: String, function: String },

    /// The type has no property with this name.
    #[error("property not found: {type_name}::{property}")]
    PropertyNotFound { type_name: String, property: String },

    /// The member was registered without a callable.
    #[error("no callable bound for {type_name}::{member}")]
    NoCallable { type_name: String, member: String },

    /// Attempt to set a read-only property.
    #[error("property {type_name}::{property} is read-only")]
    ReadOnlyProperty { type_name: String, property: String },

    /// The callable rejected the call.
    #[error(transparent)]
    Call(#[from] CallError),
}

// ============================================================================
// Catalog Errors
// ============================================================================

/// Errors raised while configuring subject kinds and custom emitters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A dispatch family label outside the closed set.
    #[error("unknown dispatch family: '{0}'")]
    UnknownDispatchFamily(String),

    /// A subject kind that is neither builtin nor declared.
    #[error("unknown subject kind: '{0}'")]
    UnknownSubjectKind(String),

    /// A custom emitter was registered for a kind with a builtin dispatch family.
    #[error("subject kind '{kind}' uses {family} dispatch and cannot take a custom emitter")]
    NotCustomKind { kind: String, family: String },

    /// A declaration tried to replace a builtin subject kind.
    #[error("subject kind '{0}' is builtin and cannot be redeclared")]
    BuiltinRedeclared(String),
}

// ============================================================================
// Binding Errors
// ============================================================================

/// A single type or function skipped during manifest building or emission.
///
/// Binding errors never abort a run; they are collected in the
/// [`GenerationReport`](crate::GenerationReport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// The type declares a subject kind the catalog does not know.
    #[error("type '{type_name}' declares unknown subject kind '{kind}'")]
    UnknownSubjectKind { type_name: String, kind: String },

    /// A function overrides its owner's subject kind with an unknown one.
    #[error("function '{type_name}::{function}' declares unknown subject kind '{kind}'")]
    UnknownFunctionSubjectKind {
        type_name: String,
        function: String,
        kind: String,
    },

    /// An exported function has neither a callable nor an explicit C signature.
    #[error("function '{type_name}::{function}' has no callable and no explicit C signature")]
    MissingCallable { type_name: String, function: String },

    /// A member type cannot be expressed through the C type table.
    #[error("'{owner}::{member}' uses type '{data_type}' which has no C mapping")]
    UnmappableType {
        owner: String,
        member: String,
        data_type: String,
    },

    /// An explicit C signature could not be used.
    #[error("function '{type_name}::{function}' has malformed C signature '{signature}': {reason}")]
    MalformedSignature {
        type_name: String,
        function: String,
        signature: String,
        reason: String,
    },

    /// Two functions resolve to the same C symbol; the first one is kept.
    #[error("C symbol '{symbol}' from '{duplicate_owner}' collides with '{kept_owner}'")]
    DuplicateSymbol {
        symbol: String,
        kept_owner: String,
        duplicate_owner: String,
    },

    /// A function uses a custom subject kind with no registered emitter.
    #[error("no custom emitter registered for subject kind '{kind}' (function '{symbol}')")]
    NoCustomEmitter { kind: String, symbol: String },

    /// A custom emitter reported a formatting failure.
    #[error("custom emitter for '{symbol}' failed")]
    EmitterFailed { symbol: String },

    /// A module's header would overwrite a file the generator owns.
    #[error("module '{module}' would overwrite generated file '{file}'")]
    ReservedModuleName { module: String, file: String },
}

// ============================================================================
// Generation Errors
// ============================================================================

/// Fatal errors that stop one generator's run.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// `generate` was called before output directories were configured.
    #[error("output directories are not configured")]
    OutputDirsNotConfigured,

    /// An output directory could not be created.
    #[error("cannot create directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    /// A generated file could not be written.
    #[error("cannot write {}: {source}", .path.display())]
    WriteFile { path: PathBuf, source: io::Error },

    /// The binding manifest could not be serialized.
    #[error("cannot serialize binding manifest: {0}")]
    Manifest(String),

    /// Rendering generated text failed.
    #[error("cannot format generated output")]
    Format(#[from] fmt::Error),

    /// The generator was misconfigured.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
