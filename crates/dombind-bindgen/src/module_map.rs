//! Partitioning of registered types into output modules.

use std::collections::BTreeMap;

use dombind_core::{EntryKind, TypeInfo, TypeMap};

/// The types emitted into one header/source pair.
#[derive(Debug, Clone, PartialEq)]
pub struct BindModule<'a> {
    /// File stem.
    pub name: String,
    pub brief: Option<String>,
    pub brief_is_explicit: bool,
    pub enums: Vec<&'a TypeInfo>,
    pub structs: Vec<&'a TypeInfo>,
    pub objects: Vec<&'a TypeInfo>,
    pub globals: Vec<&'a TypeInfo>,
    pub functions: Vec<&'a TypeInfo>,
    pub aliases: Vec<&'a TypeInfo>,
}

impl<'a> BindModule<'a> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            brief: None,
            brief_is_explicit: false,
            enums: Vec::new(),
            structs: Vec::new(),
            objects: Vec::new(),
            globals: Vec::new(),
            functions: Vec::new(),
            aliases: Vec::new(),
        }
    }

    fn bucket_mut(&mut self, kind: EntryKind) -> &mut Vec<&'a TypeInfo> {
        match kind {
            EntryKind::Enum => &mut self.enums,
            EntryKind::Struct => &mut self.structs,
            EntryKind::Object => &mut self.objects,
            EntryKind::Global => &mut self.globals,
            EntryKind::Function => &mut self.functions,
            EntryKind::Alias => &mut self.aliases,
        }
    }

    /// Types that are bound as subjects: objects, globals and free functions.
    pub fn subjects(&self) -> impl Iterator<Item = &'a TypeInfo> + '_ {
        self.objects
            .iter()
            .chain(&self.globals)
            .chain(&self.functions)
            .copied()
    }

    /// Every type, bucket by bucket.
    pub fn all_types(&self) -> impl Iterator<Item = &'a TypeInfo> + '_ {
        self.enums
            .iter()
            .chain(&self.structs)
            .chain(&self.aliases)
            .chain(&self.objects)
            .chain(&self.globals)
            .chain(&self.functions)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.enums.len()
            + self.structs.len()
            + self.objects.len()
            + self.globals.len()
            + self.functions.len()
            + self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn merge_brief(&mut self, info: &TypeInfo) {
        if self.brief_is_explicit {
            return;
        }
        if let Some(brief) = info.explicit_brief() {
            self.brief = Some(brief.to_string());
            self.brief_is_explicit = true;
        } else if self.brief.is_none() {
            self.brief = info.inferred_brief().map(str::to_string);
        }
    }
}

/// Modules keyed by file stem.
pub type ModuleMap<'a> = BTreeMap<String, BindModule<'a>>;

/// Partition `types` by file stem; each bucket is sorted by name.
///
/// Briefs are merged in name order: the first explicit brief wins and is
/// never replaced by an inferred one.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn build_module_map(types: &TypeMap) -> ModuleMap<'_> {
    let mut sorted: Vec<&TypeInfo> = types.values().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut modules = ModuleMap::new();
    for info in sorted {
        let stem = info.effective_file_stem();
        let module = modules
            .entry(stem.clone())
            .or_insert_with(|| BindModule::new(stem));
        module.merge_brief(info);
        module.bucket_mut(info.kind).push(info);
    }
    modules
}

/// Check if any non-enum type in `module` has an exported function.
pub fn module_has_functions(module: &BindModule<'_>) -> bool {
    module
        .structs
        .iter()
        .chain(&module.aliases)
        .copied()
        .chain(module.subjects())
        .any(|t| t.exported_functions().next().is_some())
}
