//! Property entry.

use serde::{Deserialize, Serialize};

use crate::{Callable, SemanticType};

/// A property of a registered type.
///
/// A read-only property never carries a setter; [`PropertyInfo::read_only`]
/// and [`PropertyInfo::with_setter`] both maintain that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyInfo {
    /// Property name.
    pub name: String,
    /// Declared semantic type.
    #[serde(rename = "type")]
    pub data_type: SemanticType,
    /// Property cannot be written.
    #[serde(default)]
    pub read_only: bool,
    /// Default value, serialized as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Documentation string.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
    /// Getter callable, absent if unavailable.
    #[serde(skip)]
    pub getter: Option<Callable>,
    /// Setter callable, absent if unavailable or read-only.
    #[serde(skip)]
    pub setter: Option<Callable>,
}

impl PropertyInfo {
    /// Create a new writable property without accessors.
    pub fn new(name: impl Into<String>, data_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            data_type,
            read_only: false,
            default_value: None,
            doc: String::new(),
            getter: None,
            setter: None,
        }
    }

    /// Mark the property read-only, dropping any setter.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self.setter = None;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_getter(mut self, getter: Callable) -> Self {
        self.getter = Some(getter);
        self
    }

    /// Attach a setter. Ignored for read-only properties.
    pub fn with_setter(mut self, setter: Callable) -> Self {
        if !self.read_only {
            self.setter = Some(setter);
        }
        self
    }
}

impl PartialEq for PropertyInfo {
    fn eq(&self, other: &Self) -> bool {
        // Callables have no identity; compare metadata only.
        self.name == other.name
            && self.data_type == other.data_type
            && self.read_only == other.read_only
            && self.default_value == other.default_value
            && self.doc == other.doc
    }
}
