//! Immutable registry snapshot.

use rustc_hash::FxHashMap;

use crate::TypeInfo;

/// Registered types keyed by name.
pub type TypeMap = FxHashMap<String, TypeInfo>;

/// Point-in-time value copy of every registered [`TypeInfo`].
///
/// Generators receive a snapshot instead of the live registry so that
/// registration happening during generation can neither corrupt their
/// iteration nor deadlock on the registry lock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataRegistrySnapshot {
    types: TypeMap,
}

impl DataRegistrySnapshot {
    pub fn new(types: TypeMap) -> Self {
        Self { types }
    }

    /// Build a snapshot from entries; later entries replace earlier ones
    /// with the same name.
    pub fn from_types(types: impl IntoIterator<Item = TypeInfo>) -> Self {
        let types = types
            .into_iter()
            .map(|t| (t.name.clone(), t))
            .collect();
        Self { types }
    }

    pub fn get(&self, name: &str) -> Option<&TypeInfo> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// The underlying name-to-type map.
    pub fn types(&self) -> &TypeMap {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> {
        self.types.values()
    }

    /// Type names in ascending order.
    pub fn names_sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Types in ascending name order.
    pub fn sorted(&self) -> Vec<&TypeInfo> {
        let mut types: Vec<&TypeInfo> = self.types.values().collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntryKind;

    #[test]
    fn from_types_last_write_wins() {
        let snap = DataRegistrySnapshot::from_types([
            TypeInfo::new("Frame", EntryKind::Object).with_doc("first"),
            TypeInfo::new("Frame", EntryKind::Object).with_doc("second"),
        ]);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.get("Frame").unwrap().doc, "second");
    }

    #[test]
    fn names_are_sorted() {
        let snap = DataRegistrySnapshot::from_types([
            TypeInfo::new("Triangle", EntryKind::Struct),
            TypeInfo::new("Circle", EntryKind::Struct),
        ]);
        assert_eq!(snap.names_sorted(), vec!["Circle", "Triangle"]);
        assert_eq!(snap.sorted()[0].name, "Circle");
        assert!(snap.contains("Triangle"));
        assert!(snap.get("Square").is_none());
    }
}
