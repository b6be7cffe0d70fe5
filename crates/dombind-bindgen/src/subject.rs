//! Subject kinds and dispatch families.
//!
//! A subject kind names a calling convention the generator knows how to
//! emit. The catalog holds the four builtin kinds plus any kinds declared by
//! the embedding application for use with custom emitters.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use dombind_core::CatalogError;
use serde::{Deserialize, Serialize};

/// Kind assumed for types that do not state one.
pub const DEFAULT_SUBJECT_KIND: &str = "Object";

/// Calling-convention category used to emit a function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DispatchFamily {
    /// Resolve a handle to an instance and call through its method table.
    MethodTable,
    /// Call straight into a process-wide singleton.
    Singleton,
    /// Forward into the event dispatch entry point.
    EventRouter,
    /// Body supplied by a registered custom emitter.
    Custom,
}

impl DispatchFamily {
    pub const ALL: [DispatchFamily; 4] = [
        DispatchFamily::MethodTable,
        DispatchFamily::Singleton,
        DispatchFamily::EventRouter,
        DispatchFamily::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DispatchFamily::MethodTable => "MethodTable",
            DispatchFamily::Singleton => "Singleton",
            DispatchFamily::EventRouter => "EventRouter",
            DispatchFamily::Custom => "Custom",
        }
    }
}

impl fmt::Display for DispatchFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DispatchFamily {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownDispatchFamily(s.to_string()))
    }
}

/// Parse a dispatch family label. Unknown labels are an error, never a default.
pub fn dispatch_family_from_string(label: &str) -> Result<DispatchFamily, CatalogError> {
    label.parse()
}

pub fn dispatch_family_to_string(family: DispatchFamily) -> &'static str {
    family.as_str()
}

/// A calling convention the generator understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectKindDescriptor {
    pub name: String,
    pub dispatch_family: DispatchFamily,
    /// Whether instances are referenced through an opaque handle.
    pub uses_handle: bool,
    /// Whether each instance carries its own method table.
    pub owns_method_table: bool,
}

impl SubjectKindDescriptor {
    pub fn new(
        name: impl Into<String>,
        dispatch_family: DispatchFamily,
        uses_handle: bool,
        owns_method_table: bool,
    ) -> Self {
        Self {
            name: name.into(),
            dispatch_family,
            uses_handle,
            owns_method_table,
        }
    }

    /// A kind whose bodies come from a custom emitter.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::new(name, DispatchFamily::Custom, false, false)
    }
}

const BUILTIN_KINDS: [&str; 4] = ["Object", "Singleton", "EventRouter", "Custom"];

/// Known subject kinds, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectKindCatalog {
    kinds: BTreeMap<String, SubjectKindDescriptor>,
}

impl Default for SubjectKindCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SubjectKindCatalog {
    /// The catalog holding only the builtin kinds.
    pub fn builtin() -> Self {
        let kinds = [
            SubjectKindDescriptor::new("Object", DispatchFamily::MethodTable, true, true),
            SubjectKindDescriptor::new("Singleton", DispatchFamily::Singleton, false, false),
            SubjectKindDescriptor::new("EventRouter", DispatchFamily::EventRouter, false, false),
            SubjectKindDescriptor::custom("Custom"),
        ]
        .into_iter()
        .map(|k| (k.name.clone(), k))
        .collect();
        Self { kinds }
    }

    pub fn is_builtin(name: &str) -> bool {
        BUILTIN_KINDS.contains(&name)
    }

    /// Add an application-defined kind. Redeclaring a user kind replaces it.
    pub fn declare(&mut self, descriptor: SubjectKindDescriptor) -> Result<(), CatalogError> {
        if Self::is_builtin(&descriptor.name) {
            return Err(CatalogError::BuiltinRedeclared(descriptor.name));
        }
        self.kinds.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SubjectKindDescriptor> {
        self.kinds.get(name)
    }

    /// Resolve a declared kind, falling back to [`DEFAULT_SUBJECT_KIND`].
    pub fn resolve(&self, declared: Option<&str>) -> Option<&SubjectKindDescriptor> {
        self.get(declared.unwrap_or(DEFAULT_SUBJECT_KIND))
    }

    /// Kinds in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = &SubjectKindDescriptor> {
        self.kinds.values()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_family_labels() {
        for family in DispatchFamily::ALL {
            let label = dispatch_family_to_string(family);
            assert_eq!(dispatch_family_from_string(label).unwrap(), family);
        }
    }

    #[test]
    fn unknown_dispatch_family_is_rejected() {
        assert_eq!(
            dispatch_family_from_string("methodtable"),
            Err(CatalogError::UnknownDispatchFamily("methodtable".into()))
        );
        assert!("".parse::<DispatchFamily>().is_err());
    }

    #[test]
    fn builtin_catalog() {
        let catalog = SubjectKindCatalog::builtin();
        assert_eq!(catalog.len(), 4);

        let object = catalog.get("Object").unwrap();
        assert_eq!(object.dispatch_family, DispatchFamily::MethodTable);
        assert!(object.uses_handle);
        assert!(object.owns_method_table);

        let singleton = catalog.get("Singleton").unwrap();
        assert!(!singleton.uses_handle);
    }

    #[test]
    fn resolve_defaults_to_object() {
        let catalog = SubjectKindCatalog::builtin();
        assert_eq!(catalog.resolve(None).unwrap().name, "Object");
        assert_eq!(catalog.resolve(Some("EventRouter")).unwrap().name, "EventRouter");
        assert!(catalog.resolve(Some("Gadget")).is_none());
    }

    #[test]
    fn declare_user_kind() {
        let mut catalog = SubjectKindCatalog::builtin();
        catalog
            .declare(SubjectKindDescriptor::custom("ScriptHook"))
            .unwrap();
        assert_eq!(
            catalog.get("ScriptHook").unwrap().dispatch_family,
            DispatchFamily::Custom
        );

        let names: Vec<&str> = catalog.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(
            names,
            ["Custom", "EventRouter", "Object", "ScriptHook", "Singleton"]
        );
    }

    #[test]
    fn builtin_cannot_be_redeclared() {
        let mut catalog = SubjectKindCatalog::builtin();
        let err = catalog
            .declare(SubjectKindDescriptor::new(
                "Object",
                DispatchFamily::Singleton,
                false,
                false,
            ))
            .unwrap_err();
        assert_eq!(err, CatalogError::BuiltinRedeclared("Object".into()));
        assert_eq!(
            catalog.get("Object").unwrap().dispatch_family,
            DispatchFamily::MethodTable
        );
    }
}
