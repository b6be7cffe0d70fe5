//! Function body emission.
//!
//! One emitter per dispatch family. The builtin emitters only differ in how
//! the target is reached; argument marshalling and result extraction are
//! shared.
//!
//! ```text
//! MethodTable  DomBind_ResolveHandle -> DomBind_InvokeMethod(instance, type, method, ...)
//! Singleton    DomBind_InvokeSingleton(subject, function, ...)
//! EventRouter  DomBind_RouteEvent(subject, function, ...)
//! Custom       registered CustomEmitter
//! ```

use std::fmt::{self, Write};

use dombind_core::{BindingError, TypeMap};
use rustc_hash::FxHashMap;

use crate::ctype::{self, default_return, marshal_arg};
use crate::manifest::{FunctionBindingDescriptor, SubjectTypeDescriptor};
use crate::module_map::BindModule;
use crate::subject::DispatchFamily;

use super::runtime::GENERATED_BANNER;
use super::{CustomEmitContext, CustomEmitter};

/// Render the body of `binding` with the emitter its dispatch family selects.
pub(crate) fn emit_function(
    binding: &FunctionBindingDescriptor,
    subject: &SubjectTypeDescriptor,
    module: &BindModule<'_>,
    types: &TypeMap,
    emitters: &FxHashMap<String, CustomEmitter>,
) -> Result<String, BindingError> {
    let mut out = String::new();
    let failed = |_: fmt::Error| BindingError::EmitterFailed {
        symbol: binding.c_name.clone(),
    };

    match binding.dispatch_family {
        DispatchFamily::MethodTable => emit_method_table(&mut out, binding).map_err(failed)?,
        DispatchFamily::Singleton => emit_singleton(&mut out, binding).map_err(failed)?,
        DispatchFamily::EventRouter => emit_event_router(&mut out, binding).map_err(failed)?,
        DispatchFamily::Custom => {
            let emitter = emitters.get(&binding.subject_kind).ok_or_else(|| {
                BindingError::NoCustomEmitter {
                    kind: binding.subject_kind.clone(),
                    symbol: binding.c_name.clone(),
                }
            })?;
            let ctx = CustomEmitContext {
                function: binding.function_info(types),
                binding,
                module,
                subject,
            };
            emitter(&mut out as &mut dyn Write, &ctx).map_err(failed)?;
        }
    }
    Ok(out)
}

/// Render `<module>.<ext>` from already emitted bodies.
pub(crate) fn render(module: &BindModule<'_>, bodies: &[String]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{GENERATED_BANNER}")?;
    writeln!(out, "/* Module: {} */", module.name)?;
    writeln!(out)?;
    writeln!(out, "#include \"{}.h\"", module.name)?;
    for body in bodies {
        writeln!(out)?;
        out.push_str(body);
    }
    Ok(out)
}

fn emit_method_table(out: &mut String, binding: &FunctionBindingDescriptor) -> fmt::Result {
    writeln!(out, "{}", binding.c_signature)?;
    writeln!(out, "{{")?;

    let instance = match &binding.handle_param {
        Some(handle) => {
            writeln!(out, "    void* instance = DomBind_ResolveHandle({handle});")?;
            writeln!(out, "    if (instance == NULL) {{")?;
            match default_return(&binding.return_type) {
                Some(value) => writeln!(out, "        return {value};")?,
                None => writeln!(out, "        return;")?,
            }
            writeln!(out, "    }}")?;
            "instance"
        }
        None => "NULL",
    };

    let call = format!(
        "DomBind_InvokeMethod({instance}, \"{}\", \"{}\"",
        binding.owner, binding.name
    );
    write_call(out, binding, &call)?;
    writeln!(out, "}}")
}

fn emit_singleton(out: &mut String, binding: &FunctionBindingDescriptor) -> fmt::Result {
    emit_forwarding(out, binding, "DomBind_InvokeSingleton")
}

fn emit_event_router(out: &mut String, binding: &FunctionBindingDescriptor) -> fmt::Result {
    emit_forwarding(out, binding, "DomBind_RouteEvent")
}

fn emit_forwarding(
    out: &mut String,
    binding: &FunctionBindingDescriptor,
    entry_point: &str,
) -> fmt::Result {
    writeln!(out, "{}", binding.c_signature)?;
    writeln!(out, "{{")?;
    if let Some(handle) = &binding.handle_param {
        writeln!(out, "    (void){handle};")?;
    }
    let call = format!("{entry_point}(\"{}\", \"{}\"", binding.owner, binding.name);
    write_call(out, binding, &call)?;
    writeln!(out, "}}")
}

/// Marshal the arguments, make the call opened by `call` and return the result.
fn write_call(out: &mut String, binding: &FunctionBindingDescriptor, call: &str) -> fmt::Result {
    let argc = binding.params.len();
    let args = if argc == 0 {
        "NULL"
    } else {
        writeln!(out, "    DomBind_Value args[{argc}];")?;
        for (i, param) in binding.params.iter().enumerate() {
            writeln!(out, "    args[{i}] = {};", marshal_arg(&param.data_type, &param.name))?;
        }
        "args"
    };

    if binding.return_type.is_void() {
        writeln!(out, "    {call}, {args}, {argc});")
    } else {
        writeln!(out, "    DomBind_Value result = {call}, {args}, {argc});")?;
        writeln!(
            out,
            "    return {};",
            ctype::unmarshal_result(&binding.return_type, &binding.return_c_type)
        )
    }
}
