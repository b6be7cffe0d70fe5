//! Function entry.

use serde::{Deserialize, Serialize};

use crate::{Callable, SemanticType};

/// A function registered on a type.
///
/// `cpp_signature` is kept as documentation only and never parsed. The
/// foreign symbol and prototype are derived by generators unless `c_name` /
/// `c_signature` override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionInfo {
    /// Function name, unique within its type.
    pub name: String,
    /// Native signature string, informational.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cpp_signature: String,
    /// Declared parameter types, excluding the receiver.
    #[serde(default)]
    pub param_types: Vec<SemanticType>,
    /// Parameter names; missing entries fall back to `argN`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub param_names: Vec<String>,
    /// Declared return type.
    #[serde(default = "void_type")]
    pub return_type: SemanticType,
    /// Explicit foreign symbol name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c_name: Option<String>,
    /// Explicit foreign prototype, used verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c_signature: Option<String>,
    /// Documentation string.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
    /// Function does not act on an instance.
    #[serde(default)]
    pub is_static: bool,
    /// Unexported functions are registered but never generated.
    #[serde(default = "exported_default")]
    pub exported: bool,
    /// Overrides the owner's subject kind for this function only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_kind: Option<String>,
    /// Type-erased implementation.
    #[serde(skip)]
    pub callable: Option<Callable>,
}

fn void_type() -> SemanticType {
    SemanticType::Void
}

fn exported_default() -> bool {
    true
}

impl FunctionInfo {
    /// Create an exported instance function returning `void`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cpp_signature: String::new(),
            param_types: Vec::new(),
            param_names: Vec::new(),
            return_type: SemanticType::Void,
            c_name: None,
            c_signature: None,
            doc: String::new(),
            is_static: false,
            exported: true,
            subject_kind: None,
            callable: None,
        }
    }

    // === Builder Methods ===

    /// Add a named parameter.
    pub fn with_param(mut self, name: impl Into<String>, data_type: SemanticType) -> Self {
        // Keep names aligned with types when earlier params were unnamed.
        while self.param_names.len() < self.param_types.len() {
            self.param_names.push(format!("arg{}", self.param_names.len()));
        }
        self.param_types.push(data_type);
        self.param_names.push(name.into());
        self
    }

    /// Set the parameter types, clearing names.
    pub fn with_params(mut self, params: Vec<SemanticType>) -> Self {
        self.param_types = params;
        self.param_names.clear();
        self
    }

    pub fn returns(mut self, data_type: SemanticType) -> Self {
        self.return_type = data_type;
        self
    }

    pub fn with_cpp_signature(mut self, signature: impl Into<String>) -> Self {
        self.cpp_signature = signature.into();
        self
    }

    pub fn with_c_name(mut self, name: impl Into<String>) -> Self {
        self.c_name = Some(name.into());
        self
    }

    pub fn with_c_signature(mut self, signature: impl Into<String>) -> Self {
        self.c_signature = Some(signature.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn with_subject_kind(mut self, kind: impl Into<String>) -> Self {
        self.subject_kind = Some(kind.into());
        self
    }

    pub fn with_callable(mut self, callable: Callable) -> Self {
        self.callable = Some(callable);
        self
    }

    pub fn static_fn(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn unexported(mut self) -> Self {
        self.exported = false;
        self
    }

    // === Queries ===

    /// Name of the parameter at `index`, `argN` when unnamed.
    pub fn param_name(&self, index: usize) -> String {
        self.param_names
            .get(index)
            .filter(|n| !n.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("arg{index}"))
    }

    /// Check if a generator may emit this function at all: it is exported and
    /// either invocable or fully described by an explicit signature.
    pub fn is_bindable(&self) -> bool {
        self.exported && (self.callable.is_some() || self.c_signature.is_some())
    }
}

impl PartialEq for FunctionInfo {
    fn eq(&self, other: &Self) -> bool {
        // Compare metadata, not the callable (closures have no identity).
        self.name == other.name
            && self.cpp_signature == other.cpp_signature
            && self.param_types == other.param_types
            && self.param_names == other.param_names
            && self.return_type == other.return_type
            && self.c_name == other.c_name
            && self.c_signature == other.c_signature
            && self.doc == other.doc
            && self.is_static == other.is_static
            && self.exported == other.exported
            && self.subject_kind == other.subject_kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    #[test]
    fn builder_defaults() {
        let f = FunctionInfo::new("getName");
        assert!(f.exported);
        assert!(!f.is_static);
        assert!(f.return_type.is_void());
        assert!(!f.is_bindable());
    }

    #[test]
    fn param_names_fall_back_to_index() {
        let f = FunctionInfo::new("move")
            .with_params(vec![SemanticType::Int32])
            .with_param("dy", SemanticType::Int32);
        assert_eq!(f.param_name(0), "arg0");
        assert_eq!(f.param_name(1), "dy");
        assert_eq!(f.param_name(2), "arg2");
    }

    #[test]
    fn bindable_requires_callable_or_signature() {
        let with_callable = FunctionInfo::new("a").with_callable(Callable::nullary(|| Value::Void));
        assert!(with_callable.is_bindable());

        let with_sig = FunctionInfo::new("b").with_c_signature("void b(void)");
        assert!(with_sig.is_bindable());

        let hidden = FunctionInfo::new("c")
            .with_callable(Callable::nullary(|| Value::Void))
            .unexported();
        assert!(!hidden.is_bindable());
    }

    #[test]
    fn deserialize_applies_defaults() {
        let f: FunctionInfo = serde_json::from_str(r#"{"name":"show"}"#).unwrap();
        assert!(f.exported);
        assert_eq!(f.return_type, SemanticType::Void);
        assert!(f.param_types.is_empty());
    }
}
