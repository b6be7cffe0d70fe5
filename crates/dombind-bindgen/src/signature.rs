//! C prototypes.
//!
//! Prototypes are either derived from semantic types or taken verbatim from
//! an explicit signature. For explicit signatures only the symbol and the
//! parameter names are read back, so generated bodies can marshal arguments
//! by name.

use dombind_core::SemanticType;
use serde::{Deserialize, Serialize};

/// Name of the leading handle parameter in derived prototypes.
pub const SELF_PARAM: &str = "self";

/// One parameter of a C prototype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CParam {
    pub name: String,
    pub c_type: String,
    /// Declared semantic type, used to pick the marshalling expression.
    #[serde(rename = "type")]
    pub data_type: SemanticType,
}

impl CParam {
    pub fn new(name: impl Into<String>, c_type: impl Into<String>, data_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            c_type: c_type.into(),
            data_type,
        }
    }
}

/// Build `ret symbol(params)`; an empty list renders as `(void)`.
pub fn derive_prototype(
    return_c_type: &str,
    symbol: &str,
    receiver: Option<(&str, &str)>,
    params: &[CParam],
) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(params.len() + 1);
    if let Some((c_type, name)) = receiver {
        parts.push(declare(c_type, name));
    }
    parts.extend(params.iter().map(|p| declare(&p.c_type, &p.name)));

    let list = if parts.is_empty() {
        "void".to_string()
    } else {
        parts.join(", ")
    };
    format!("{return_c_type} {symbol}({list})")
}

fn declare(c_type: &str, name: &str) -> String {
    format!("{c_type} {name}")
}

/// Normalize an explicit signature: trimmed, without a trailing `;`.
pub fn normalize(signature: &str) -> &str {
    signature.trim().trim_end_matches(';').trim_end()
}

/// Read the parameter names out of an explicit prototype.
///
/// The prototype must declare `symbol`, and every parameter must be named.
/// Function pointer parameters are not supported.
pub fn parse_param_names(signature: &str, symbol: &str) -> Result<Vec<String>, String> {
    let signature = normalize(signature);
    let open = signature
        .find('(')
        .ok_or_else(|| "missing parameter list".to_string())?;
    if !signature.ends_with(')') {
        return Err("text after parameter list".to_string());
    }

    let head = signature[..open].trim_end();
    if trailing_identifier(head) != symbol {
        return Err(format!("does not declare '{symbol}'"));
    }
    if head.len() == symbol.len() {
        return Err("missing return type".to_string());
    }

    let inner = signature[open + 1..signature.len() - 1].trim();
    if inner.contains('(') || inner.contains(')') {
        return Err("function pointer parameters are not supported".to_string());
    }
    if inner.is_empty() || inner == "void" {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .enumerate()
        .map(|(index, param)| {
            let param = param.trim().trim_end_matches("[]").trim_end();
            let name = trailing_identifier(param);
            let ty = param[..param.len() - name.len()].trim();
            if name.is_empty() || ty.is_empty() {
                Err(format!("parameter {} has no name", index + 1))
            } else {
                Ok(name.to_string())
            }
        })
        .collect()
}

fn trailing_identifier(text: &str) -> &str {
    let start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .last()
        .map_or(text.len(), |(i, _)| i);
    &text[start..]
}
