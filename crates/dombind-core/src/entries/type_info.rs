//! Type entry.
//!
//! This module provides `TypeInfo`, the unit of registration, together with
//! `EntryKind` (its module bucket) and `EnumValue`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SemanticType;

use super::{FunctionInfo, PropertyInfo};

/// Which bucket of an output module a type lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntryKind {
    Enum,
    Struct,
    Object,
    Global,
    Function,
    Alias,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Enum => "Enum",
            EntryKind::Struct => "Struct",
            EntryKind::Object => "Object",
            EntryKind::Global => "Global",
            EntryKind::Function => "Function",
            EntryKind::Alias => "Alias",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An enumerator of an enum entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    /// Enumerator name.
    pub name: String,
    /// Integer value.
    pub value: i64,
}

impl EnumValue {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Registered metadata for one type.
///
/// `name` is the registry key. Re-registering a name replaces the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Unique name.
    pub name: String,
    /// Native type identifier, informational only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub native_type: String,
    /// Module bucket.
    pub kind: EntryKind,
    /// Output module grouping key. Empty means the lowercase type name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_stem: String,
    /// Subject kind name; absent means the default method-table kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_kind: Option<String>,
    /// Declared base type names, informational only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_types: Vec<String>,
    /// Properties in registration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyInfo>,
    /// Functions in registration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionInfo>,
    /// Enumerators, for `EntryKind::Enum`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<EnumValue>,
    /// Aliased type, for `EntryKind::Alias`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<SemanticType>,
    /// Documentation string.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
    /// One-line description of the output module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_brief: Option<String>,
    /// `module_brief` was set deliberately rather than inferred.
    #[serde(default)]
    pub brief_is_explicit: bool,
}

impl TypeInfo {
    /// Create a new entry of the given kind with no members.
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        let name = name.into();
        Self {
            native_type: name.clone(),
            name,
            kind,
            file_stem: String::new(),
            subject_kind: None,
            base_types: Vec::new(),
            properties: Vec::new(),
            functions: Vec::new(),
            enum_values: Vec::new(),
            alias_of: None,
            doc: String::new(),
            module_brief: None,
            brief_is_explicit: false,
        }
    }

    /// Create the placeholder used when members arrive before the type.
    pub fn shell(name: impl Into<String>) -> Self {
        Self::new(name, EntryKind::Object)
    }

    // === Builder Methods ===

    pub fn with_file_stem(mut self, stem: impl Into<String>) -> Self {
        self.file_stem = stem.into();
        self
    }

    pub fn with_native_type(mut self, native: impl Into<String>) -> Self {
        self.native_type = native.into();
        self
    }

    pub fn with_subject_kind(mut self, kind: impl Into<String>) -> Self {
        self.subject_kind = Some(kind.into());
        self
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base_types.push(base.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Set an explicit module brief.
    pub fn with_brief(mut self, brief: impl Into<String>) -> Self {
        self.module_brief = Some(brief.into());
        self.brief_is_explicit = true;
        self
    }

    /// Set an inferred module brief, used only when no explicit one exists.
    pub fn with_inferred_brief(mut self, brief: impl Into<String>) -> Self {
        self.module_brief = Some(brief.into());
        self.brief_is_explicit = false;
        self
    }

    pub fn with_property(mut self, property: PropertyInfo) -> Self {
        self.upsert_property(property);
        self
    }

    pub fn with_function(mut self, function: FunctionInfo) -> Self {
        self.upsert_function(function);
        self
    }

    pub fn with_enum_value(mut self, name: impl Into<String>, value: i64) -> Self {
        self.enum_values.push(EnumValue::new(name, value));
        self
    }

    pub fn with_alias_of(mut self, target: SemanticType) -> Self {
        self.alias_of = Some(target);
        self
    }

    // === Members ===

    /// Insert a function, replacing one with the same name in place.
    pub fn upsert_function(&mut self, function: FunctionInfo) {
        match self.functions.iter_mut().find(|f| f.name == function.name) {
            Some(slot) => *slot = function,
            None => self.functions.push(function),
        }
    }

    /// Insert a property, replacing one with the same name in place.
    pub fn upsert_property(&mut self, property: PropertyInfo) {
        match self.properties.iter_mut().find(|p| p.name == property.name) {
            Some(slot) => *slot = property,
            None => self.properties.push(property),
        }
    }

    pub fn function(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Adopt members of `shell` that this entry does not declare itself.
    ///
    /// For members declared on both sides the declared metadata is kept, but
    /// callables attached to the shell fill in any the declaration lacks.
    pub fn absorb_members(&mut self, shell: TypeInfo) {
        for function in shell.functions {
            match self.functions.iter_mut().find(|f| f.name == function.name) {
                Some(declared) => {
                    if declared.callable.is_none() {
                        declared.callable = function.callable;
                    }
                }
                None => self.functions.push(function),
            }
        }
        for property in shell.properties {
            match self.properties.iter_mut().find(|p| p.name == property.name) {
                Some(declared) => {
                    if declared.getter.is_none() {
                        declared.getter = property.getter;
                    }
                    if declared.setter.is_none() && !declared.read_only {
                        declared.setter = property.setter;
                    }
                }
                None => self.properties.push(property),
            }
        }
    }

    // === Queries ===

    /// The module this type is emitted into.
    pub fn effective_file_stem(&self) -> String {
        if self.file_stem.is_empty() {
            self.name.to_ascii_lowercase()
        } else {
            self.file_stem.clone()
        }
    }

    /// Exported functions, in registration order.
    pub fn exported_functions(&self) -> impl Iterator<Item = &FunctionInfo> {
        self.functions.iter().filter(|f| f.exported)
    }

    pub fn explicit_brief(&self) -> Option<&str> {
        self.module_brief
            .as_deref()
            .filter(|_| self.brief_is_explicit)
    }

    pub fn inferred_brief(&self) -> Option<&str> {
        self.module_brief
            .as_deref()
            .filter(|_| !self.brief_is_explicit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stem_defaults_to_lowercase_name() {
        let t = TypeInfo::new("Widget", EntryKind::Object);
        assert_eq!(t.effective_file_stem(), "widget");
        let t = t.with_file_stem("widgets");
        assert_eq!(t.effective_file_stem(), "widgets");
    }

    #[test]
    fn upsert_replaces_same_name() {
        let mut t = TypeInfo::new("Label", EntryKind::Object)
            .with_function(FunctionInfo::new("getText"))
            .with_function(FunctionInfo::new("setText"));
        t.upsert_function(FunctionInfo::new("getText").with_doc("second"));
        assert_eq!(t.functions.len(), 2);
        assert_eq!(t.functions[0].doc, "second");
    }

    #[test]
    fn absorb_keeps_own_members() {
        let mut declared = TypeInfo::new("Button", EntryKind::Object)
            .with_function(FunctionInfo::new("click").with_doc("declared"));
        let shell = TypeInfo::shell("Button")
            .with_function(FunctionInfo::new("click").with_doc("shell"))
            .with_property(PropertyInfo::new("label", SemanticType::String));
        declared.absorb_members(shell);
        assert_eq!(declared.functions.len(), 1);
        assert_eq!(declared.functions[0].doc, "declared");
        assert!(declared.property("label").is_some());
    }

    #[test]
    fn absorb_takes_shell_callables() {
        use crate::{Callable, Value};

        let mut declared = TypeInfo::new("Button", EntryKind::Object)
            .with_function(FunctionInfo::new("click").with_doc("declared"))
            .with_property(PropertyInfo::new("label", SemanticType::String));
        let shell = TypeInfo::shell("Button")
            .with_function(
                FunctionInfo::new("click").with_callable(Callable::nullary(|| Value::Void)),
            )
            .with_property(
                PropertyInfo::new("label", SemanticType::String)
                    .with_getter(Callable::getter(|_| Value::Str("ok".into())))
                    .with_setter(Callable::setter(|_, _| {})),
            );
        declared.absorb_members(shell);

        let click = declared.function("click").unwrap();
        assert_eq!(click.doc, "declared");
        assert!(click.callable.is_some());
        let label = declared.property("label").unwrap();
        assert!(label.getter.is_some());
        assert!(label.setter.is_some());
    }

    #[test]
    fn briefs_split_by_explicitness() {
        let explicit = TypeInfo::new("A", EntryKind::Enum).with_brief("Colors");
        assert_eq!(explicit.explicit_brief(), Some("Colors"));
        assert_eq!(explicit.inferred_brief(), None);

        let inferred = TypeInfo::new("B", EntryKind::Enum).with_inferred_brief("guess");
        assert_eq!(inferred.explicit_brief(), None);
        assert_eq!(inferred.inferred_brief(), Some("guess"));
    }

    #[test]
    fn exported_functions_filters_hidden() {
        let t = TypeInfo::new("Stage", EntryKind::Object)
            .with_function(FunctionInfo::new("show"))
            .with_function(FunctionInfo::new("internal").unexported());
        let names: Vec<_> = t.exported_functions().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["show"]);
    }
}
