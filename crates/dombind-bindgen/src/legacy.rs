//! Single-header bootstrap generator.
//!
//! Emits one conservative header straight from the snapshot: opaque
//! typedefs, enum mirrors and prototypes, all in name order. There is no
//! classification, no module partitioning and no function bodies.

use std::fmt::{self, Write};
use std::path::Path;

use dombind_core::{
    BindingError, DataRegistrySnapshot, EntryKind, FunctionInfo, GenerationError,
    GenerationReport, SemanticType, TypeInfo,
};
use dombind_registry::BindingGenerator;

use crate::capi::{GENERATED_BANNER, HANDLE_TYPEDEF, include_guard};
use crate::ctype::{self, CTypeMap};
use crate::generator::{ensure_dir, write_if_changed};
use crate::signature::{self, CParam};

/// Writes `<output>/dombind_legacy.h`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CBindingGenerator {
    file_name: String,
}

impl Default for CBindingGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CBindingGenerator {
    pub fn new() -> Self {
        Self {
            file_name: "dombind_legacy.h".to_string(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Render the header; functions without a derivable prototype are
    /// reported and left out.
    pub fn render(
        &self,
        snapshot: &DataRegistrySnapshot,
    ) -> Result<(String, Vec<BindingError>), fmt::Error> {
        let ctypes = CTypeMap::new(snapshot.types()).with_handle_type("void*");
        let types = snapshot.sorted();
        let mut errors = Vec::new();

        let mut prototypes = Vec::new();
        for info in &types {
            for function in info.exported_functions() {
                match prototype(info, function, &ctypes) {
                    Ok(entry) => prototypes.push(entry),
                    Err(err) => errors.push(err),
                }
            }
        }
        prototypes.sort_by(|a: &(String, String), b| a.0.cmp(&b.0));

        let guard = include_guard(&self.file_name);
        let mut out = String::new();
        writeln!(out, "{GENERATED_BANNER}")?;
        writeln!(out)?;
        writeln!(out, "#ifndef {guard}")?;
        writeln!(out, "#define {guard}")?;
        writeln!(out)?;
        writeln!(out, "#include <stdint.h>")?;
        writeln!(out)?;
        writeln!(out, "#ifdef __cplusplus")?;
        writeln!(out, "extern \"C\" {{")?;
        writeln!(out, "#endif")?;
        writeln!(out)?;

        // Explicit signatures may spell the runtime's handle type.
        if prototypes.iter().any(|(_, proto)| proto.contains("DomBind_Handle")) {
            writeln!(out, "{HANDLE_TYPEDEF}")?;
            writeln!(out)?;
        }

        for info in types.iter().filter(|t| t.kind != EntryKind::Alias) {
            if info.kind == EntryKind::Enum {
                writeln!(out, "typedef int32_t {};", info.name)?;
                for value in &info.enum_values {
                    match ctype::enum_constant(&info.name, value) {
                        Ok(constant) => writeln!(
                            out,
                            "#define {}_{} ((int32_t){constant})",
                            info.name, value.name
                        )?,
                        Err(err) => errors.push(err),
                    }
                }
            } else {
                writeln!(out, "typedef struct {0} {0};", info.name)?;
            }
        }

        if !prototypes.is_empty() {
            writeln!(out)?;
            for (_, proto) in &prototypes {
                writeln!(out, "{proto};")?;
            }
        }

        writeln!(out)?;
        writeln!(out, "#ifdef __cplusplus")?;
        writeln!(out, "}}")?;
        writeln!(out, "#endif")?;
        writeln!(out)?;
        writeln!(out, "#endif /* {guard} */")?;
        Ok((out, errors))
    }
}

/// Symbol and prototype of `function`.
fn prototype(
    owner: &TypeInfo,
    function: &FunctionInfo,
    ctypes: &CTypeMap<'_>,
) -> Result<(String, String), BindingError> {
    if !function.is_bindable() {
        return Err(BindingError::MissingCallable {
            type_name: owner.name.clone(),
            function: function.name.clone(),
        });
    }
    let symbol = function
        .c_name
        .clone()
        .unwrap_or_else(|| format!("{}_{}", owner.name, function.name));
    if let Some(explicit) = &function.c_signature {
        return Ok((symbol, signature::normalize(explicit).to_string()));
    }

    let unmappable = |ty: &SemanticType| BindingError::UnmappableType {
        owner: owner.name.clone(),
        member: function.name.clone(),
        data_type: ty.label(),
    };
    let ret = ctypes
        .map(&function.return_type)
        .ok_or_else(|| unmappable(&function.return_type))?;
    let params = function
        .param_types
        .iter()
        .enumerate()
        .map(|(i, ty)| {
            let c_type = ctypes.map_value(ty).ok_or_else(|| unmappable(ty))?;
            Ok(CParam::new(function.param_name(i), c_type, ty.clone()))
        })
        .collect::<Result<Vec<_>, BindingError>>()?;

    let receiver_type = format!("{}*", owner.name);
    let receiver = (owner.kind == EntryKind::Object && !function.is_static)
        .then_some((receiver_type.as_str(), signature::SELF_PARAM));
    let proto = signature::derive_prototype(&ret, &symbol, receiver, &params);
    Ok((symbol, proto))
}

impl BindingGenerator for CBindingGenerator {
    fn name(&self) -> &str {
        "c-legacy"
    }

    fn generate(
        &mut self,
        snapshot: &DataRegistrySnapshot,
        output_dir: &Path,
    ) -> Result<GenerationReport, GenerationError> {
        ensure_dir(output_dir)?;

        let mut report = GenerationReport::new(self.name());
        let (text, errors) = self.render(snapshot)?;
        for err in &errors {
            tracing::warn!(error = %err, "function skipped");
        }
        report.errors = errors;
        write_if_changed(output_dir.join(&self.file_name), &text, &mut report)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dombind_core::{Callable, Value};
    use pretty_assertions::assert_eq;

    fn snapshot() -> DataRegistrySnapshot {
        let noop = Callable::nullary(|| Value::Void);
        DataRegistrySnapshot::from_types([
            TypeInfo::new("Widget", EntryKind::Object)
                .with_function(
                    FunctionInfo::new("show")
                        .with_param("visible", SemanticType::Bool)
                        .with_callable(noop.clone()),
                )
                .with_function(
                    FunctionInfo::new("count")
                        .static_fn()
                        .returns(SemanticType::Int32)
                        .with_callable(noop.clone()),
                )
                .with_function(FunctionInfo::new("broken")),
            TypeInfo::new("Color", EntryKind::Enum)
                .with_enum_value("Red", 0)
                .with_enum_value("Green", 1),
            TypeInfo::new("App", EntryKind::Global)
                .with_function(FunctionInfo::new("quit").with_callable(noop)),
        ])
    }

    #[test]
    fn renders_sorted_header() {
        let (text, errors) = CBindingGenerator::new().render(&snapshot()).unwrap();
        assert_eq!(
            errors,
            [BindingError::MissingCallable {
                type_name: "Widget".into(),
                function: "broken".into(),
            }]
        );

        let body: Vec<&str> = text
            .lines()
            .skip_while(|l| !l.starts_with("#endif"))
            .skip(2)
            .take(9)
            .collect();
        assert_eq!(
            body,
            [
                "typedef struct App App;",
                "typedef int32_t Color;",
                "#define Color_Red ((int32_t)0)",
                "#define Color_Green ((int32_t)1)",
                "typedef struct Widget Widget;",
                "",
                "void App_quit(void);",
                "int32_t Widget_count(void);",
                "void Widget_show(Widget* self, uint8_t visible);",
            ]
        );
    }

    #[test]
    fn writes_into_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = CBindingGenerator::new().with_file_name("legacy.h");

        let report = generator.generate(&snapshot(), dir.path()).unwrap();
        assert_eq!(report.written, [dir.path().join("legacy.h")]);
        assert_eq!(report.errors.len(), 1);

        let text = std::fs::read_to_string(dir.path().join("legacy.h")).unwrap();
        assert!(text.contains("#ifndef DOMBIND_LEGACY_H"));

        let again = generator.generate(&snapshot(), dir.path()).unwrap();
        assert!(again.written.is_empty());
        assert_eq!(again.unchanged.len(), 1);
    }

    #[test]
    fn explicit_handle_signature_declares_handle() {
        let snap = DataRegistrySnapshot::from_types([TypeInfo::new("Widget", EntryKind::Object)
            .with_function(
                FunctionInfo::new("setLabel")
                    .with_param("text", SemanticType::String)
                    .with_c_signature("void Widget_setLabel(DomBind_Handle* w, const char* text);"),
            )]);
        let (text, errors) = CBindingGenerator::new().render(&snap).unwrap();
        assert!(errors.is_empty(), "{errors:?}");

        let typedef = text.find("typedef struct DomBind_Handle DomBind_Handle;").unwrap();
        let proto = text
            .find("void Widget_setLabel(DomBind_Handle* w, const char* text);")
            .unwrap();
        assert!(typedef < proto);
        assert!(text.contains("#ifndef DOMBIND_HANDLE_DECLARED"));
    }

    #[test]
    fn derived_signatures_need_no_handle_typedef() {
        let (text, _) = CBindingGenerator::new().render(&snapshot()).unwrap();
        assert!(!text.contains("DomBind_Handle"));
    }

    #[test]
    fn out_of_range_enumerator_is_reported() {
        let snap = DataRegistrySnapshot::from_types([TypeInfo::new("Mask", EntryKind::Enum)
            .with_enum_value("Low", 1)
            .with_enum_value("Huge", 1 << 40)]);
        let (text, errors) = CBindingGenerator::new().render(&snap).unwrap();
        assert_eq!(
            errors,
            [BindingError::UnmappableType {
                owner: "Mask".into(),
                member: "Huge".into(),
                data_type: "i64 (1099511627776)".into(),
            }]
        );
        assert!(text.contains("#define Mask_Low ((int32_t)1)"));
        assert!(!text.contains("Mask_Huge"));
    }
}
