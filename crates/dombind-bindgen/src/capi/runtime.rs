//! Shared runtime header.
//!
//! Declares the bridge every generated body calls into. The embedding
//! application provides the definitions.

pub(crate) const GENERATED_BANNER: &str = "/* Generated by dombind. Do not edit. */";

/// Handle declaration, shared with headers that spell `DomBind_Handle`
/// without including the runtime header.
pub(crate) const HANDLE_TYPEDEF: &str = "\
#ifndef DOMBIND_HANDLE_DECLARED
#define DOMBIND_HANDLE_DECLARED
typedef struct DomBind_Handle DomBind_Handle;
#endif";

/// Render the runtime header named `file_name`.
pub(crate) fn render(file_name: &str) -> String {
    let guard = include_guard(file_name);
    format!(
        r#"{GENERATED_BANNER}

#ifndef {guard}
#define {guard}

#include <stddef.h>
#include <stdint.h>

#ifdef __cplusplus
extern "C" {{
#endif

{HANDLE_TYPEDEF}

typedef enum DomBind_ValueKind {{
    DOMBIND_VALUE_VOID = 0,
    DOMBIND_VALUE_BOOL = 1,
    DOMBIND_VALUE_INT = 2,
    DOMBIND_VALUE_UINT = 3,
    DOMBIND_VALUE_FLOAT = 4,
    DOMBIND_VALUE_STRING = 5,
    DOMBIND_VALUE_POINTER = 6
}} DomBind_ValueKind;

typedef struct DomBind_Value {{
    DomBind_ValueKind kind;
    union {{
        int64_t i;
        uint64_t u;
        double f;
        const char* s;
        const void* p;
    }} as;
}} DomBind_Value;

static inline DomBind_Value DomBind_Bool(uint8_t v)
{{
    DomBind_Value value;
    value.kind = DOMBIND_VALUE_BOOL;
    value.as.i = v ? 1 : 0;
    return value;
}}

static inline DomBind_Value DomBind_Int(int64_t v)
{{
    DomBind_Value value;
    value.kind = DOMBIND_VALUE_INT;
    value.as.i = v;
    return value;
}}

static inline DomBind_Value DomBind_UInt(uint64_t v)
{{
    DomBind_Value value;
    value.kind = DOMBIND_VALUE_UINT;
    value.as.u = v;
    return value;
}}

static inline DomBind_Value DomBind_Float(double v)
{{
    DomBind_Value value;
    value.kind = DOMBIND_VALUE_FLOAT;
    value.as.f = v;
    return value;
}}

static inline DomBind_Value DomBind_String(const char* v)
{{
    DomBind_Value value;
    value.kind = DOMBIND_VALUE_STRING;
    value.as.s = v;
    return value;
}}

static inline DomBind_Value DomBind_Pointer(const void* v)
{{
    DomBind_Value value;
    value.kind = DOMBIND_VALUE_POINTER;
    value.as.p = v;
    return value;
}}

/* Live instance behind a handle, or NULL when the handle is stale. */
void* DomBind_ResolveHandle(DomBind_Handle* handle);

/* Call `method` through the method table of `instance`. A NULL instance
   addresses the type-level table of `type`. */
DomBind_Value DomBind_InvokeMethod(void* instance, const char* type, const char* method,
                                   const DomBind_Value* args, uint32_t argc);

/* Call `function` on the process-wide singleton `subject`. */
DomBind_Value DomBind_InvokeSingleton(const char* subject, const char* function,
                                      const DomBind_Value* args, uint32_t argc);

/* Forward to the event dispatch entry point of `subject`. */
DomBind_Value DomBind_RouteEvent(const char* subject, const char* function,
                                 const DomBind_Value* args, uint32_t argc);

#ifdef __cplusplus
}}
#endif

#endif /* {guard} */
"#
    )
}

/// `widget.h` becomes `DOMBIND_WIDGET_H`. The whole file name is kept, so
/// `dombind_runtime.h` and `runtime.h` get distinct guards.
pub(crate) fn include_guard(file_name: &str) -> String {
    let mangled: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("DOMBIND_{mangled}")
}
