//! Module header emission.

use std::collections::BTreeSet;
use std::fmt::{self, Write};

use dombind_core::{BindingError, SemanticType, TypeInfo};
use rustc_hash::FxHashSet;

use crate::ctype::{self, CTypeMap};
use crate::manifest::{BindingManifest, FunctionBindingDescriptor};
use crate::module_map::BindModule;

use super::runtime::{GENERATED_BANNER, include_guard};

/// Everything a module header is rendered from.
pub(crate) struct HeaderContext<'a> {
    pub module: &'a BindModule<'a>,
    pub manifest: &'a BindingManifest,
    /// Function bindings that made it into the source, in symbol order.
    pub bindings: &'a [&'a FunctionBindingDescriptor],
    pub ctypes: CTypeMap<'a>,
    pub runtime_header: &'a str,
}

/// Render `<module>.h`. Struct and alias mirrors that cannot be mapped are
/// reported and left opaque or omitted.
pub(crate) fn render(ctx: &HeaderContext<'_>) -> Result<(String, Vec<BindingError>), fmt::Error> {
    let module = ctx.module;
    let classified: FxHashSet<&str> = ctx.manifest.types.iter().map(|t| t.name.as_str()).collect();
    let keep = |t: &&TypeInfo| classified.contains(t.name.as_str());

    let enums: Vec<&TypeInfo> = module.enums.iter().copied().filter(keep).collect();
    let structs: Vec<&TypeInfo> = module.structs.iter().copied().filter(keep).collect();
    let aliases: Vec<&TypeInfo> = module.aliases.iter().copied().filter(keep).collect();
    let subjects: Vec<&TypeInfo> = module.subjects().filter(keep).collect();

    let mut errors = Vec::new();
    let file_name = format!("{}.h", module.name);
    let guard = include_guard(&file_name);
    let mut out = String::new();

    writeln!(out, "{GENERATED_BANNER}")?;
    match &module.brief {
        Some(brief) => writeln!(out, "/* Module: {} - {} */", module.name, comment_text(brief))?,
        None => writeln!(out, "/* Module: {} */", module.name)?,
    }
    writeln!(out)?;
    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    writeln!(out)?;

    let mut includes = Vec::new();
    if module_needs_cstdint(module, ctx.bindings, &ctx.ctypes) {
        includes.push("#include <stdint.h>".to_string());
    }
    if !ctx.bindings.is_empty() || uses_handle(&structs, &aliases) {
        includes.push(format!("#include \"{}\"", ctx.runtime_header));
    }
    for stem in referenced_modules(ctx, &structs, &aliases) {
        includes.push(format!("#include \"{stem}.h\""));
    }
    if !includes.is_empty() {
        for line in &includes {
            writeln!(out, "{line}")?;
        }
        writeln!(out)?;
    }

    writeln!(out, "#ifdef __cplusplus")?;
    writeln!(out, "extern \"C\" {{")?;
    writeln!(out, "#endif")?;

    if !enums.is_empty() {
        section(&mut out, "Enums")?;
        for info in &enums {
            write_enum(&mut out, info, &mut errors)?;
        }
    }

    if !structs.is_empty() {
        section(&mut out, "Structs")?;
        for info in &structs {
            writeln!(out, "typedef struct {0} {0};", info.name)?;
        }
        writeln!(out)?;
        for info in &structs {
            write_struct(&mut out, info, &ctx.ctypes, &mut errors)?;
        }
    }

    if !aliases.is_empty() {
        section(&mut out, "Aliases")?;
        for info in &aliases {
            write_alias(&mut out, info, &ctx.ctypes, &mut errors)?;
        }
    }

    if !subjects.is_empty() {
        section(&mut out, "Subjects")?;
        for info in &subjects {
            let family = ctx
                .manifest
                .type_binding(&info.name)
                .map(|t| t.dispatch_family.as_str())
                .unwrap_or_default();
            write!(out, "/* {} ({}, {})", info.name, info.kind, family)?;
            if !info.doc.is_empty() {
                write!(out, ": {}", comment_text(&info.doc))?;
            }
            writeln!(out, " */")?;
        }
    }

    if !ctx.bindings.is_empty() {
        section(&mut out, "Functions")?;
        for binding in ctx.bindings {
            if !binding.doc.is_empty() {
                writeln!(out, "/* {} */", comment_text(&binding.doc))?;
            }
            writeln!(out, "{};", binding.c_signature)?;
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

/// Check if anything the module emits spells a fixed-width integer type.
pub(crate) fn module_needs_cstdint(
    module: &BindModule<'_>,
    bindings: &[&FunctionBindingDescriptor],
    ctypes: &CTypeMap<'_>,
) -> bool {
    let mapped_fixed = |ty: &SemanticType| {
        ctypes
            .map_value(ty)
            .is_some_and(|c| ctype::uses_fixed_width(&c))
    };

    !module.enums.is_empty()
        || module
            .structs
            .iter()
            .flat_map(|t| &t.properties)
            .any(|p| mapped_fixed(&p.data_type))
        || module
            .aliases
            .iter()
            .filter_map(|t| t.alias_of.as_ref())
            .any(mapped_fixed)
        || bindings
            .iter()
            .any(|b| ctype::uses_fixed_width(&b.c_signature))
}

fn uses_handle(structs: &[&TypeInfo], aliases: &[&TypeInfo]) -> bool {
    structs
        .iter()
        .flat_map(|t| &t.properties)
        .any(|p| p.data_type == SemanticType::Handle)
        || aliases
            .iter()
            .any(|t| t.alias_of == Some(SemanticType::Handle))
}

fn referenced_modules(
    ctx: &HeaderContext<'_>,
    structs: &[&TypeInfo],
    aliases: &[&TypeInfo],
) -> BTreeSet<String> {
    let fields = structs.iter().flat_map(|t| &t.properties).map(|p| &p.data_type);
    let alias_targets = aliases.iter().filter_map(|t| t.alias_of.as_ref());
    let signatures = ctx
        .bindings
        .iter()
        .flat_map(|b| b.params.iter().map(|p| &p.data_type).chain([&b.return_type]));

    fields
        .chain(alias_targets)
        .chain(signatures)
        .filter_map(|ty| ctx.ctypes.struct_module(ty))
        .filter(|stem| *stem != ctx.module.name)
        .collect()
}

fn section(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "/* ---- {title} ---- */")?;
    writeln!(out)
}

fn write_doc(out: &mut String, info: &TypeInfo) -> fmt::Result {
    if info.doc.is_empty() {
        return Ok(());
    }
    writeln!(out, "/* {}: {} */", info.name, comment_text(&info.doc))
}

/// Enumerators outside the `int32_t` range are reported and left out.
fn write_enum(out: &mut String, info: &TypeInfo, errors: &mut Vec<BindingError>) -> fmt::Result {
    let mut values = Vec::with_capacity(info.enum_values.len());
    for value in &info.enum_values {
        match ctype::enum_constant(&info.name, value) {
            Ok(constant) => values.push((value.name.as_str(), constant)),
            Err(err) => errors.push(err),
        }
    }

    write_doc(out, info)?;
    writeln!(out, "typedef int32_t {};", info.name)?;
    if !values.is_empty() {
        writeln!(out, "enum {{")?;
        let last = values.len() - 1;
        for (i, (name, constant)) in values.into_iter().enumerate() {
            let sep = if i == last { "" } else { "," };
            writeln!(out, "    {}_{name} = {constant}{sep}", info.name)?;
        }
        writeln!(out, "}};")?;
    }
    writeln!(out)
}

/// Struct body, after every struct in the module has been forward declared.
fn write_struct(
    out: &mut String,
    info: &TypeInfo,
    ctypes: &CTypeMap<'_>,
    errors: &mut Vec<BindingError>,
) -> fmt::Result {
    let mut fields = Vec::with_capacity(info.properties.len());
    for property in &info.properties {
        match ctypes.map_value(&property.data_type) {
            Some(c_type) => fields.push((c_type, property.name.as_str())),
            None => errors.push(BindingError::UnmappableType {
                owner: info.name.clone(),
                member: property.name.clone(),
                data_type: property.data_type.label(),
            }),
        }
    }

    // Opaque: the forward declaration is all there is.
    if fields.is_empty() || fields.len() != info.properties.len() {
        return Ok(());
    }

    write_doc(out, info)?;
    writeln!(out, "struct {} {{", info.name)?;
    for (c_type, name) in fields {
        writeln!(out, "    {c_type} {name};")?;
    }
    writeln!(out, "}};")?;
    writeln!(out)
}

fn write_alias(
    out: &mut String,
    info: &TypeInfo,
    ctypes: &CTypeMap<'_>,
    errors: &mut Vec<BindingError>,
) -> fmt::Result {
    let target = info.alias_of.as_ref();
    match target.and_then(|ty| ctypes.map_value(ty)) {
        Some(c_type) => {
            write_doc(out, info)?;
            writeln!(out, "typedef {c_type} {};", info.name)
        }
        None => {
            errors.push(BindingError::UnmappableType {
                owner: info.name.clone(),
                member: info.name.clone(),
                data_type: target.map_or_else(|| "none".to_string(), SemanticType::label),
            });
            Ok(())
        }
    }
}

/// Text safe to place inside a single-line C comment.
pub(crate) fn comment_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("*/", "* /")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_text_is_single_line() {
        assert_eq!(comment_text("Draws\n  a widget */ now"), "Draws a widget * / now");
    }
}
