//! Process-wide registry accessor.
//!
//! A convenience for registration sites that cannot be handed a reference.
//! The registry itself is still constructed and owned by the application,
//! which installs it once.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::DataRegistry;

static GLOBAL: OnceCell<Arc<DataRegistry>> = OnceCell::new();

/// Install `registry` as the process-wide instance.
///
/// Returns the registry back if one was already installed.
pub fn install_global(registry: Arc<DataRegistry>) -> Result<(), Arc<DataRegistry>> {
    GLOBAL.set(registry)
}

/// The installed process-wide registry, if any.
pub fn global() -> Option<Arc<DataRegistry>> {
    GLOBAL.get().cloned()
}
