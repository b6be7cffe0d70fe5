//! Semantic type to C type mapping.
//!
//! The table is fixed; the only context it needs is the set of registered
//! types, so that `enum:X` and `struct:X` resolve to entries of the right
//! kind.
//!
//! | Semantic            | C                  |
//! |---------------------|--------------------|
//! | `void`              | `void`             |
//! | `bool`              | `uint8_t`          |
//! | `i8`..`i64`         | `int8_t`..`int64_t`  |
//! | `u8`..`u64`         | `uint8_t`..`uint64_t` |
//! | `f32` / `f64`       | `float` / `double` |
//! | `string`            | `const char*`      |
//! | `handle`            | `DomBind_Handle*`  |
//! | `pointer`           | `void*`            |
//! | `enum:X`            | `int32_t`          |
//! | `struct:X`          | `const X*`         |

use dombind_core::{BindingError, EntryKind, EnumValue, SemanticType, TypeMap};

/// Opaque handle type declared by the runtime header.
pub const HANDLE_C_TYPE: &str = "DomBind_Handle*";

const FIXED_WIDTH: [&str; 4] = ["int8_t", "int16_t", "int32_t", "int64_t"];

/// Maps semantic types to C types against a set of registered types.
#[derive(Debug, Clone, Copy)]
pub struct CTypeMap<'a> {
    types: &'a TypeMap,
    handle_type: &'a str,
}

impl<'a> CTypeMap<'a> {
    pub fn new(types: &'a TypeMap) -> Self {
        Self {
            types,
            handle_type: HANDLE_C_TYPE,
        }
    }

    /// Use `handle_type` for `handle` instead of the runtime handle.
    pub fn with_handle_type(mut self, handle_type: &'a str) -> Self {
        self.handle_type = handle_type;
        self
    }

    /// The C spelling of `ty`, or `None` if it has no mapping.
    pub fn map(&self, ty: &SemanticType) -> Option<String> {
        let c = match ty {
            SemanticType::Void => "void",
            SemanticType::Bool => "uint8_t",
            SemanticType::Int8 => "int8_t",
            SemanticType::Int16 => "int16_t",
            SemanticType::Int32 => "int32_t",
            SemanticType::Int64 => "int64_t",
            SemanticType::Uint8 => "uint8_t",
            SemanticType::Uint16 => "uint16_t",
            SemanticType::Uint32 => "uint32_t",
            SemanticType::Uint64 => "uint64_t",
            SemanticType::Float => "float",
            SemanticType::Double => "double",
            SemanticType::String => "const char*",
            SemanticType::Handle => self.handle_type,
            SemanticType::Pointer => "void*",
            SemanticType::Enum(name) => {
                self.registered(name, EntryKind::Enum)?;
                "int32_t"
            }
            SemanticType::Struct(name) => {
                self.registered(name, EntryKind::Struct)?;
                return Some(format!("const {name}*"));
            }
        };
        Some(c.to_string())
    }

    /// Like [`map`](Self::map) but rejects `void`, which is only valid as a
    /// return type.
    pub fn map_value(&self, ty: &SemanticType) -> Option<String> {
        if ty.is_void() { None } else { self.map(ty) }
    }

    /// Module of the struct `ty` points at, when it lives in a registered type.
    pub fn struct_module(&self, ty: &SemanticType) -> Option<String> {
        match ty {
            SemanticType::Struct(name) => self.types.get(name).map(|t| t.effective_file_stem()),
            _ => None,
        }
    }

    fn registered(&self, name: &str, kind: EntryKind) -> Option<()> {
        self.types.get(name).filter(|t| t.kind == kind).map(|_| ())
    }
}

/// Check if a piece of C text names a fixed-width integer type.
pub fn uses_fixed_width(c_text: &str) -> bool {
    // `uint8_t` contains `int8_t`, so the signed names cover both.
    FIXED_WIDTH.iter().any(|t| c_text.contains(t))
}

/// Expression wrapping `expr` of type `ty` into a `DomBind_Value`.
pub fn marshal_arg(ty: &SemanticType, expr: &str) -> String {
    match ty {
        SemanticType::Bool => format!("DomBind_Bool({expr})"),
        SemanticType::Int8
        | SemanticType::Int16
        | SemanticType::Int32
        | SemanticType::Int64
        | SemanticType::Enum(_) => format!("DomBind_Int((int64_t){expr})"),
        SemanticType::Uint8 | SemanticType::Uint16 | SemanticType::Uint32 | SemanticType::Uint64 => {
            format!("DomBind_UInt((uint64_t){expr})")
        }
        SemanticType::Float | SemanticType::Double => format!("DomBind_Float((double){expr})"),
        SemanticType::String => format!("DomBind_String({expr})"),
        SemanticType::Void
        | SemanticType::Handle
        | SemanticType::Pointer
        | SemanticType::Struct(_) => format!("DomBind_Pointer((const void*){expr})"),
    }
}

/// Expression extracting a value of C type `c_type` from `result`.
pub fn unmarshal_result(ty: &SemanticType, c_type: &str) -> String {
    match ty {
        SemanticType::Bool => "(uint8_t)(result.as.i != 0)".to_string(),
        SemanticType::Uint8 | SemanticType::Uint16 | SemanticType::Uint32 | SemanticType::Uint64 => {
            format!("({c_type})result.as.u")
        }
        SemanticType::Float | SemanticType::Double => format!("({c_type})result.as.f"),
        SemanticType::String => "result.as.s".to_string(),
        SemanticType::Void
        | SemanticType::Handle
        | SemanticType::Pointer
        | SemanticType::Struct(_) => format!("({c_type})result.as.p"),
        _ => format!("({c_type})result.as.i"),
    }
}

/// Value returned when a call cannot reach its target, `None` for `void`.
pub fn default_return(ty: &SemanticType) -> Option<&'static str> {
    match ty {
        SemanticType::Void => None,
        SemanticType::Float | SemanticType::Double => Some("0.0"),
        SemanticType::String
        | SemanticType::Handle
        | SemanticType::Pointer
        | SemanticType::Struct(_) => Some("NULL"),
        _ => Some("0"),
    }
}

/// Value of an enumerator of `owner` as an `int32_t` constant.
pub fn enum_constant(owner: &str, value: &EnumValue) -> Result<i32, BindingError> {
    i32::try_from(value.value).map_err(|_| BindingError::UnmappableType {
        owner: owner.to_string(),
        member: value.name.clone(),
        data_type: format!("i64 ({})", value.value),
    })
}
