//! Semantic type tags for registered members.
//!
//! Members are declared with a semantic tag rather than a source-language
//! type. The tag set is closed so that every generator can map it through a
//! fixed table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::MetadataError;

/// Declared type of a property, parameter or return value.
///
/// Serialized as its label: `"i32"`, `"string"`, `"enum:Color"`, ...
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SemanticType {
    Void,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float,
    Double,
    /// Null-terminated byte string.
    String,
    /// Opaque handle to a live display object.
    Handle,
    /// Untyped raw pointer.
    Pointer,
    /// A registered enum, passed as its integer value.
    Enum(String),
    /// A registered struct, passed by pointer.
    Struct(String),
}

impl SemanticType {
    /// Label used in metadata documents and diagnostics.
    pub fn label(&self) -> String {
        match self {
            SemanticType::Enum(name) => format!("enum:{name}"),
            SemanticType::Struct(name) => format!("struct:{name}"),
            other => other.simple_label().unwrap_or_default().to_string(),
        }
    }

    fn simple_label(&self) -> Option<&'static str> {
        Some(match self {
            SemanticType::Void => "void",
            SemanticType::Bool => "bool",
            SemanticType::Int8 => "i8",
            SemanticType::Int16 => "i16",
            SemanticType::Int32 => "i32",
            SemanticType::Int64 => "i64",
            SemanticType::Uint8 => "u8",
            SemanticType::Uint16 => "u16",
            SemanticType::Uint32 => "u32",
            SemanticType::Uint64 => "u64",
            SemanticType::Float => "f32",
            SemanticType::Double => "f64",
            SemanticType::String => "string",
            SemanticType::Handle => "handle",
            SemanticType::Pointer => "pointer",
            SemanticType::Enum(_) | SemanticType::Struct(_) => return None,
        })
    }

    /// Check if this is `void`.
    pub fn is_void(&self) -> bool {
        matches!(self, SemanticType::Void)
    }

    /// Check if this is a signed integer type.
    pub fn is_signed_int(&self) -> bool {
        matches!(
            self,
            SemanticType::Int8 | SemanticType::Int16 | SemanticType::Int32 | SemanticType::Int64
        )
    }

    /// Check if this is an unsigned integer type.
    pub fn is_unsigned_int(&self) -> bool {
        matches!(
            self,
            SemanticType::Uint8 | SemanticType::Uint16 | SemanticType::Uint32 | SemanticType::Uint64
        )
    }

    /// Check if this is a floating point type.
    pub fn is_float(&self) -> bool {
        matches!(self, SemanticType::Float | SemanticType::Double)
    }

    /// Name of the registered type this tag refers to, if any.
    pub fn referenced_type(&self) -> Option<&str> {
        match self {
            SemanticType::Enum(name) | SemanticType::Struct(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.simple_label() {
            Some(label) => f.write_str(label),
            None => f.write_str(&self.label()),
        }
    }
}

impl FromStr for SemanticType {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(name) = s.strip_prefix("enum:") {
            return named(name, s).map(SemanticType::Enum);
        }
        if let Some(name) = s.strip_prefix("struct:") {
            return named(name, s).map(SemanticType::Struct);
        }
        Ok(match s {
            "void" => SemanticType::Void,
            "bool" => SemanticType::Bool,
            "i8" => SemanticType::Int8,
            "i16" => SemanticType::Int16,
            "i32" => SemanticType::Int32,
            "i64" => SemanticType::Int64,
            "u8" => SemanticType::Uint8,
            "u16" => SemanticType::Uint16,
            "u32" => SemanticType::Uint32,
            "u64" => SemanticType::Uint64,
            "f32" => SemanticType::Float,
            "f64" => SemanticType::Double,
            "string" => SemanticType::String,
            "handle" => SemanticType::Handle,
            "pointer" => SemanticType::Pointer,
            _ => return Err(MetadataError::UnknownSemanticType(s.to_string())),
        })
    }
}

fn named(name: &str, label: &str) -> Result<String, MetadataError> {
    let name = name.trim();
    if name.is_empty() {
        Err(MetadataError::UnknownSemanticType(label.to_string()))
    } else {
        Ok(name.to_string())
    }
}

impl TryFrom<String> for SemanticType {
    type Error = MetadataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SemanticType> for String {
    fn from(value: SemanticType) -> Self {
        value.label()
    }
}
