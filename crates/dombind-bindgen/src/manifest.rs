//! Binding manifest.
//!
//! Classification turns registered types into a [`BindingManifest`]: which
//! subject kind each type resolves to, and the C symbol and prototype of
//! every exported function. The manifest is recomputed on every run and is
//! the only input emission reads function data from.
//!
//! ## Ordering
//!
//! Type bindings are sorted by (module, name) and function bindings by
//! (module, symbol), so the manifest does not depend on registration order.

use dombind_core::{
    BindingError, EntryKind, FunctionInfo, SemanticType, TypeInfo, TypeMap,
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::ser::Error as _;
use serde::{Deserialize, Serialize};

use crate::ctype::{CTypeMap, HANDLE_C_TYPE};
use crate::signature::{self, CParam, SELF_PARAM};
use crate::subject::{DispatchFamily, SubjectKindCatalog, SubjectKindDescriptor};

/// Classification of one registered type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectTypeDescriptor {
    #[serde(rename = "type")]
    pub name: String,
    pub native_type: String,
    pub kind: EntryKind,
    /// Output module (file stem).
    pub module: String,
    pub subject_kind: String,
    pub dispatch_family: DispatchFamily,
    pub uses_handle: bool,
    pub owns_method_table: bool,
    pub has_functions: bool,
    /// Symbols of the type's function bindings, sorted.
    pub functions: Vec<String>,
}

impl SubjectTypeDescriptor {
    /// The registered type this binding was derived from.
    pub fn source<'a>(&self, types: &'a TypeMap) -> Option<&'a TypeInfo> {
        types.get(&self.name)
    }
}

/// Classification of one exported function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionBindingDescriptor {
    pub name: String,
    pub c_name: String,
    pub c_signature: String,
    /// Whether `c_signature` came verbatim from metadata.
    pub explicit_signature: bool,
    pub owner: String,
    pub module: String,
    pub subject_kind: String,
    pub dispatch_family: DispatchFamily,
    pub is_static: bool,
    /// Name of the handle parameter, for functions called on an instance.
    pub handle_param: Option<String>,
    pub params: Vec<CParam>,
    pub return_type: SemanticType,
    pub return_c_type: String,
    pub doc: String,
}

impl FunctionBindingDescriptor {
    /// The owning registered type.
    pub fn owner_info<'a>(&self, types: &'a TypeMap) -> Option<&'a TypeInfo> {
        types.get(&self.owner)
    }

    /// The registered function this binding was derived from.
    pub fn function_info<'a>(&self, types: &'a TypeMap) -> Option<&'a FunctionInfo> {
        self.owner_info(types)?.function(&self.name)
    }
}

/// Everything one generation run binds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingManifest {
    /// Kinds referenced by at least one type or function, by name.
    pub subject_kinds: Vec<SubjectKindDescriptor>,
    pub types: Vec<SubjectTypeDescriptor>,
    pub functions: Vec<FunctionBindingDescriptor>,
}

impl BindingManifest {
    pub fn type_binding(&self, name: &str) -> Option<&SubjectTypeDescriptor> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn function_binding(&self, c_name: &str) -> Option<&FunctionBindingDescriptor> {
        self.functions.iter().find(|f| f.c_name == c_name)
    }

    pub fn subject_kind(&self, name: &str) -> Option<&SubjectKindDescriptor> {
        self.subject_kinds.iter().find(|k| k.name == name)
    }

    /// Function bindings emitted into `module`, in symbol order.
    pub fn functions_in_module<'a>(
        &'a self,
        module: &'a str,
    ) -> impl Iterator<Item = &'a FunctionBindingDescriptor> + 'a {
        self.functions.iter().filter(move |f| f.module == module)
    }

    /// Keep only the function bindings matching `keep`, updating type
    /// bindings and the kind list to match.
    pub fn retain_functions(&mut self, mut keep: impl FnMut(&FunctionBindingDescriptor) -> bool) {
        self.functions.retain(|f| keep(f));

        let kept: FxHashSet<&str> = self.functions.iter().map(|f| f.c_name.as_str()).collect();
        for ty in &mut self.types {
            ty.functions.retain(|symbol| kept.contains(symbol.as_str()));
            ty.has_functions = !ty.functions.is_empty();
        }

        let used: FxHashSet<&str> = self
            .types
            .iter()
            .map(|t| t.subject_kind.as_str())
            .chain(self.functions.iter().map(|f| f.subject_kind.as_str()))
            .collect();
        self.subject_kinds.retain(|k| used.contains(k.name.as_str()));
    }
}

/// A manifest plus the units that were left out of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestResult {
    pub manifest: BindingManifest,
    pub errors: Vec<BindingError>,
}

impl ManifestResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Classify every type and exported function in `types`.
///
/// Units that cannot be bound are reported in
/// [`ManifestResult::errors`] and left out; everything else is still
/// classified.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn build_binding_manifest(types: &TypeMap, catalog: &SubjectKindCatalog) -> ManifestResult {
    let ctypes = CTypeMap::new(types);
    let mut errors = Vec::new();

    let mut sorted: Vec<&TypeInfo> = types.values().collect();
    sorted.sort_by_cached_key(|t| (t.effective_file_stem(), t.name.clone()));

    let mut type_bindings = Vec::with_capacity(sorted.len());
    let mut functions = Vec::new();

    for info in sorted {
        let Some(kind) = catalog.resolve(info.subject_kind.as_deref()) else {
            let kind = info.subject_kind.clone().unwrap_or_default();
            tracing::warn!(type_name = %info.name, %kind, "unknown subject kind, type skipped");
            errors.push(BindingError::UnknownSubjectKind {
                type_name: info.name.clone(),
                kind,
            });
            continue;
        };

        let module = info.effective_file_stem();
        if info.kind != EntryKind::Enum {
            let mut exported: Vec<&FunctionInfo> = info.exported_functions().collect();
            exported.sort_by(|a, b| a.name.cmp(&b.name));
            for function in exported {
                match bind_function(info, function, kind, &module, catalog, &ctypes) {
                    Ok(binding) => functions.push(binding),
                    Err(err) => {
                        tracing::warn!(error = %err, "function skipped");
                        errors.push(err);
                    }
                }
            }
        }

        type_bindings.push(SubjectTypeDescriptor {
            name: info.name.clone(),
            native_type: info.native_type.clone(),
            kind: info.kind,
            module,
            subject_kind: kind.name.clone(),
            dispatch_family: kind.dispatch_family,
            uses_handle: kind.uses_handle,
            owns_method_table: kind.owns_method_table,
            has_functions: false,
            functions: Vec::new(),
        });
    }

    functions.sort_by(|a, b| (&a.module, &a.c_name).cmp(&(&b.module, &b.c_name)));
    let mut seen: FxHashMap<String, String> = FxHashMap::default();
    functions.retain(|f| {
        if let Some(kept_owner) = seen.get(&f.c_name) {
            let err = BindingError::DuplicateSymbol {
                symbol: f.c_name.clone(),
                kept_owner: kept_owner.clone(),
                duplicate_owner: f.owner.clone(),
            };
            tracing::warn!(error = %err, "function skipped");
            errors.push(err);
            return false;
        }
        seen.insert(f.c_name.clone(), f.owner.clone());
        true
    });

    let mut by_owner: FxHashMap<&str, Vec<String>> = FxHashMap::default();
    for f in &functions {
        by_owner.entry(f.owner.as_str()).or_default().push(f.c_name.clone());
    }
    for ty in &mut type_bindings {
        if let Some(mut symbols) = by_owner.remove(ty.name.as_str()) {
            symbols.sort();
            ty.functions = symbols;
            ty.has_functions = true;
        }
    }

    let mut manifest = BindingManifest {
        subject_kinds: catalog.iter().cloned().collect(),
        types: type_bindings,
        functions,
    };
    manifest.retain_functions(|_| true);

    tracing::debug!(
        types = manifest.types.len(),
        functions = manifest.functions.len(),
        skipped = errors.len(),
        "binding manifest built"
    );
    ManifestResult { manifest, errors }
}

fn bind_function(
    owner: &TypeInfo,
    function: &FunctionInfo,
    owner_kind: &SubjectKindDescriptor,
    module: &str,
    catalog: &SubjectKindCatalog,
    ctypes: &CTypeMap<'_>,
) -> Result<FunctionBindingDescriptor, BindingError> {
    let kind = match function.subject_kind.as_deref() {
        None => owner_kind,
        Some(name) => catalog
            .get(name)
            .ok_or_else(|| BindingError::UnknownFunctionSubjectKind {
                type_name: owner.name.clone(),
                function: function.name.clone(),
                kind: name.to_string(),
            })?,
    };

    if !function.is_bindable() {
        return Err(BindingError::MissingCallable {
            type_name: owner.name.clone(),
            function: function.name.clone(),
        });
    }

    let unmappable = |ty: &SemanticType| BindingError::UnmappableType {
        owner: owner.name.clone(),
        member: function.name.clone(),
        data_type: ty.label(),
    };

    let return_c_type = ctypes
        .map(&function.return_type)
        .ok_or_else(|| unmappable(&function.return_type))?;
    let mut params = function
        .param_types
        .iter()
        .enumerate()
        .map(|(i, ty)| {
            let c_type = ctypes.map_value(ty).ok_or_else(|| unmappable(ty))?;
            Ok(CParam::new(function.param_name(i), c_type, ty.clone()))
        })
        .collect::<Result<Vec<_>, BindingError>>()?;

    let c_name = function
        .c_name
        .clone()
        .unwrap_or_else(|| format!("{}_{}", owner.name, function.name));
    let takes_handle = kind.uses_handle && !function.is_static;

    let (c_signature, handle_param, explicit_signature) = match &function.c_signature {
        Some(explicit) => {
            let malformed = |reason: String| BindingError::MalformedSignature {
                type_name: owner.name.clone(),
                function: function.name.clone(),
                signature: explicit.clone(),
                reason,
            };
            let mut names = signature::parse_param_names(explicit, &c_name).map_err(malformed)?;
            let expected = params.len() + usize::from(takes_handle);
            if names.len() != expected {
                return Err(malformed(format!(
                    "expected {expected} parameter(s), found {}",
                    names.len()
                )));
            }
            let handle_param = takes_handle.then(|| names.remove(0));
            for (param, name) in params.iter_mut().zip(names) {
                param.name = name;
            }
            (signature::normalize(explicit).to_string(), handle_param, true)
        }
        None => {
            let receiver = takes_handle.then_some((HANDLE_C_TYPE, SELF_PARAM));
            let proto = signature::derive_prototype(&return_c_type, &c_name, receiver, &params);
            (proto, takes_handle.then(|| SELF_PARAM.to_string()), false)
        }
    };

    Ok(FunctionBindingDescriptor {
        name: function.name.clone(),
        c_name,
        c_signature,
        explicit_signature,
        owner: owner.name.clone(),
        module: module.to_string(),
        subject_kind: kind.name.clone(),
        dispatch_family: kind.dispatch_family,
        is_static: function.is_static,
        handle_param,
        params,
        return_type: function.return_type.clone(),
        return_c_type,
        doc: function.doc.clone(),
    })
}

/// Serialize `manifest`; an `indent` of 0 yields compact JSON.
pub fn manifest_to_json(manifest: &BindingManifest, indent: usize) -> Result<String, serde_json::Error> {
    if indent == 0 {
        return serde_json::to_string(manifest);
    }

    let indent = " ".repeat(indent);
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    manifest.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(serde_json::Error::custom)
}

pub fn manifest_from_json(json: &str) -> Result<BindingManifest, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dombind_core::{Callable, DataRegistrySnapshot, Value};
    use pretty_assertions::assert_eq;

    fn callable() -> Callable {
        Callable::nullary(|| Value::Void)
    }

    fn widget() -> TypeInfo {
        TypeInfo::new("Widget", EntryKind::Object)
            .with_file_stem("widget")
            .with_native_type("ui::Widget")
            .with_function(
                FunctionInfo::new("getName")
                    .returns(SemanticType::String)
                    .with_callable(callable()),
            )
    }

    fn build(types: impl IntoIterator<Item = TypeInfo>) -> ManifestResult {
        let snap = DataRegistrySnapshot::from_types(types);
        build_binding_manifest(snap.types(), &SubjectKindCatalog::builtin())
    }

    #[test]
    fn widget_get_name() {
        let result = build([widget()]);
        assert!(result.is_clean(), "{:?}", result.errors);

        let ty = result.manifest.type_binding("Widget").unwrap();
        assert_eq!(ty.dispatch_family, DispatchFamily::MethodTable);
        assert_eq!(ty.subject_kind, "Object");
        assert_eq!(ty.functions, ["Widget_getName"]);
        assert!(ty.has_functions && ty.uses_handle);

        let f = result.manifest.function_binding("Widget_getName").unwrap();
        assert_eq!(f.c_signature, "const char* Widget_getName(DomBind_Handle* self)");
        assert_eq!(f.handle_param.as_deref(), Some("self"));
        assert_eq!(f.module, "widget");
        assert!(!f.explicit_signature);
    }

    #[test]
    fn default_kind_and_overrides() {
        let result = build([
            TypeInfo::new("App", EntryKind::Global)
                .with_subject_kind("Singleton")
                .with_function(
                    FunctionInfo::new("quit").with_callable(callable()),
                )
                .with_function(
                    FunctionInfo::new("onUpdate")
                        .with_subject_kind("EventRouter")
                        .with_callable(callable()),
                ),
        ]);
        assert!(result.is_clean());

        let quit = result.manifest.function_binding("App_quit").unwrap();
        assert_eq!(quit.dispatch_family, DispatchFamily::Singleton);
        assert_eq!(quit.handle_param, None);
        assert_eq!(quit.c_signature, "void App_quit(void)");

        let on_update = result.manifest.function_binding("App_onUpdate").unwrap();
        assert_eq!(on_update.dispatch_family, DispatchFamily::EventRouter);

        let kinds: Vec<&str> = result
            .manifest
            .subject_kinds
            .iter()
            .map(|k| k.name.as_str())
            .collect();
        assert_eq!(kinds, ["EventRouter", "Singleton"]);
    }

    #[test]
    fn static_method_has_no_handle() {
        let result = build([TypeInfo::new("Widget", EntryKind::Object).with_function(
            FunctionInfo::new("count")
                .static_fn()
                .returns(SemanticType::Uint32)
                .with_callable(callable()),
        )]);
        let f = result.manifest.function_binding("Widget_count").unwrap();
        assert_eq!(f.c_signature, "uint32_t Widget_count(void)");
        assert!(f.is_static);
        assert_eq!(f.handle_param, None);
    }

    #[test]
    fn unexported_functions_are_left_out() {
        let result = build([widget().with_function(
            FunctionInfo::new("internalReset")
                .unexported()
                .with_callable(callable()),
        )]);
        assert!(result.is_clean());
        assert!(result.manifest.function_binding("Widget_internalReset").is_none());
        assert_eq!(result.manifest.functions.len(), 1);
    }

    #[test]
    fn missing_callable_is_reported() {
        let result = build([widget().with_function(FunctionInfo::new("show"))]);
        assert_eq!(
            result.errors,
            [BindingError::MissingCallable {
                type_name: "Widget".into(),
                function: "show".into(),
            }]
        );
        assert_eq!(result.manifest.type_binding("Widget").unwrap().functions.len(), 1);
    }

    #[test]
    fn explicit_signature_used_verbatim() {
        let result = build([TypeInfo::new("Widget", EntryKind::Object).with_function(
            FunctionInfo::new("setLabel")
                .with_param("label", SemanticType::String)
                .with_c_name("dom_widget_set_label")
                .with_c_signature("void dom_widget_set_label(DomBind_Handle* w, const char* text);"),
        )]);
        assert!(result.is_clean(), "{:?}", result.errors);

        let f = result.manifest.function_binding("dom_widget_set_label").unwrap();
        assert!(f.explicit_signature);
        assert_eq!(
            f.c_signature,
            "void dom_widget_set_label(DomBind_Handle* w, const char* text)"
        );
        assert_eq!(f.handle_param.as_deref(), Some("w"));
        assert_eq!(f.params[0].name, "text");
    }

    #[test]
    fn explicit_signature_arity_mismatch() {
        let result = build([TypeInfo::new("Widget", EntryKind::Object).with_function(
            FunctionInfo::new("hide").with_c_signature("void Widget_hide(void)"),
        )]);
        assert!(matches!(
            &result.errors[..],
            [BindingError::MalformedSignature { reason, .. }] if reason == "expected 1 parameter(s), found 0"
        ));
        assert!(result.manifest.functions.is_empty());
    }

    #[test]
    fn unmappable_types_are_reported() {
        let result = build([TypeInfo::new("Widget", EntryKind::Object).with_function(
            FunctionInfo::new("bounds")
                .returns(SemanticType::Struct("Rect".into()))
                .with_callable(callable()),
        )]);
        assert_eq!(
            result.errors,
            [BindingError::UnmappableType {
                owner: "Widget".into(),
                member: "bounds".into(),
                data_type: "struct:Rect".into(),
            }]
        );
    }

    #[test]
    fn unknown_kind_does_not_block_other_types() {
        let result = build([
            widget(),
            TypeInfo::new("Gizmo", EntryKind::Object)
                .with_subject_kind("Gadget")
                .with_function(FunctionInfo::new("spin").with_callable(callable())),
        ]);
        assert_eq!(
            result.errors,
            [BindingError::UnknownSubjectKind {
                type_name: "Gizmo".into(),
                kind: "Gadget".into(),
            }]
        );
        assert!(result.manifest.type_binding("Gizmo").is_none());
        assert!(result.manifest.function_binding("Widget_getName").is_some());
    }

    #[test]
    fn duplicate_symbols_keep_first() {
        let result = build([
            TypeInfo::new("Button", EntryKind::Object).with_file_stem("ui").with_function(
                FunctionInfo::new("click")
                    .with_c_name("ui_click")
                    .with_callable(callable()),
            ),
            TypeInfo::new("Link", EntryKind::Object).with_file_stem("ui").with_function(
                FunctionInfo::new("click")
                    .with_c_name("ui_click")
                    .with_callable(callable()),
            ),
        ]);
        assert_eq!(
            result.errors,
            [BindingError::DuplicateSymbol {
                symbol: "ui_click".into(),
                kept_owner: "Button".into(),
                duplicate_owner: "Link".into(),
            }]
        );
        assert_eq!(result.manifest.function_binding("ui_click").unwrap().owner, "Button");
        assert!(!result.manifest.type_binding("Link").unwrap().has_functions);
    }

    #[test]
    fn ordering_is_by_module_then_name() {
        let result = build([
            TypeInfo::new("Triangle", EntryKind::Struct).with_file_stem("shapes"),
            TypeInfo::new("Circle", EntryKind::Struct).with_file_stem("shapes"),
            TypeInfo::new("Axis", EntryKind::Enum).with_file_stem("zmath"),
            TypeInfo::new("Zoom", EntryKind::Enum).with_file_stem("camera"),
        ]);
        let names: Vec<&str> = result.manifest.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Zoom", "Circle", "Triangle", "Axis"]);
    }

    #[test]
    fn declared_custom_kind() {
        let mut catalog = SubjectKindCatalog::builtin();
        catalog
            .declare(SubjectKindDescriptor::custom("ScriptHook"))
            .unwrap();
        let snap = DataRegistrySnapshot::from_types([TypeInfo::new("Hooks", EntryKind::Global)
            .with_subject_kind("ScriptHook")
            .with_function(FunctionInfo::new("fire").with_callable(callable()))]);

        let result = build_binding_manifest(snap.types(), &catalog);
        assert!(result.is_clean());
        let f = result.manifest.function_binding("Hooks_fire").unwrap();
        assert_eq!(f.dispatch_family, DispatchFamily::Custom);
        assert_eq!(result.manifest.subject_kinds[0].name, "ScriptHook");
    }

    #[test]
    fn json_round_trip() {
        let result = build([
            widget().with_function(
                FunctionInfo::new("move")
                    .with_param("x", SemanticType::Int32)
                    .with_param("y", SemanticType::Int32)
                    .with_callable(callable()),
            ),
            TypeInfo::new("Color", EntryKind::Enum).with_enum_value("Red", 0),
        ]);

        for indent in [0, 2, 4] {
            let json = manifest_to_json(&result.manifest, indent).unwrap();
            let parsed = manifest_from_json(&json).unwrap();
            assert_eq!(parsed, result.manifest);
        }
    }

    #[test]
    fn json_shape() {
        let result = build([widget()]);
        let compact = manifest_to_json(&result.manifest, 0).unwrap();
        assert!(!compact.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&compact).unwrap();
        let ty = &value["types"][0];
        assert_eq!(ty["type"], "Widget");
        assert_eq!(ty["dispatch_family"], "MethodTable");
        assert_eq!(ty["functions"], serde_json::json!(["Widget_getName"]));
        assert_eq!(value["functions"][0]["return_type"], "string");

        let pretty = manifest_to_json(&result.manifest, 3).unwrap();
        assert!(pretty.contains("\n   \"subject_kinds\""));
    }

    #[test]
    fn retain_functions_updates_types() {
        let mut manifest = build([widget()]).manifest;
        manifest.retain_functions(|f| f.c_name != "Widget_getName");
        let ty = manifest.type_binding("Widget").unwrap();
        assert!(ty.functions.is_empty());
        assert!(!ty.has_functions);
        assert_eq!(manifest.subject_kinds.len(), 1);
    }
}
