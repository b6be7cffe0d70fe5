//! Metadata documents.
//!
//! A metadata document is the JSON form of a set of registrations, for
//! generating bindings outside the process that owns the types:
//!
//! ```json
//! {
//!   "subject_kinds": [{"name": "ScriptHook", "dispatch_family": "Custom",
//!                      "uses_handle": false, "owns_method_table": false}],
//!   "types": [{"name": "Widget", "kind": "Object", "file_stem": "widget",
//!              "functions": [{"name": "getName", "return_type": "string"}]}]
//! }
//! ```
//!
//! Functions loaded from a document are implemented by the host runtime, so
//! they are registered with [`Callable::Host`].

use std::fs;
use std::path::{Path, PathBuf};

use dombind_bindgen::SubjectKindDescriptor;
use dombind_core::{Callable, RegistryError, TypeInfo};
use dombind_registry::DataRegistry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a metadata document.
#[derive(Debug, Error)]
pub enum MetadataLoadError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid metadata document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Serialized registrations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataDocument {
    /// Application-defined subject kinds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subject_kinds: Vec<SubjectKindDescriptor>,
    pub types: Vec<TypeInfo>,
}

impl MetadataDocument {
    pub fn from_json(json: &str) -> Result<Self, MetadataLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, MetadataLoadError> {
        let json = fs::read_to_string(path).map_err(|source| MetadataLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Build a document from the current contents of `registry`.
    pub fn from_registry(registry: &DataRegistry) -> Self {
        let snapshot = registry.snapshot();
        Self {
            subject_kinds: Vec::new(),
            types: snapshot.sorted().into_iter().cloned().collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, MetadataLoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Register every type into `registry`, binding exported functions that
    /// have no callable to the host runtime.
    pub fn register_into(&self, registry: &DataRegistry) -> Result<usize, MetadataLoadError> {
        for info in &self.types {
            let mut info = info.clone();
            for function in &mut info.functions {
                if function.exported && function.callable.is_none() {
                    function.callable = Some(Callable::Host);
                }
            }
            registry.register_type(info)?;
        }
        tracing::debug!(types = self.types.len(), "metadata document registered");
        Ok(self.types.len())
    }
}
