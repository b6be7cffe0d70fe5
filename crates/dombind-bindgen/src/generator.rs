//! The bind generator contract.
//!
//! A [`BindGenerator`] writes headers and sources into two configured
//! directories. [`SplitOutput`] adapts one to the registry-driven
//! [`BindingGenerator`] contract, which hands over a single output directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dombind_core::{DataRegistrySnapshot, GenerationError, GenerationReport, TypeMap};
use dombind_registry::BindingGenerator;

use crate::module_map::{self, BindModule, ModuleMap};

/// A generator emitting a header/source pair per module.
pub trait BindGenerator {
    fn name(&self) -> &str;

    /// Configure where headers and sources go. Must be called before
    /// [`generate`](Self::generate).
    fn set_output_dirs(&mut self, header_dir: PathBuf, source_dir: PathBuf);

    /// Emit bindings for `types`, using `snapshot` to resolve types they
    /// reference.
    ///
    /// Units that cannot be bound are listed in the report. An `Err` means
    /// the generator could not complete.
    fn generate(
        &mut self,
        types: &TypeMap,
        snapshot: &DataRegistrySnapshot,
    ) -> Result<GenerationReport, GenerationError>;

    fn build_module_map<'a>(&self, types: &'a TypeMap) -> ModuleMap<'a> {
        module_map::build_module_map(types)
    }

    fn module_has_functions(&self, module: &BindModule<'_>) -> bool {
        module_map::module_has_functions(module)
    }
}

/// Runs a [`BindGenerator`] from a registry, writing headers to
/// `<output>/include` and sources to `<output>/src`.
#[derive(Debug)]
pub struct SplitOutput<G> {
    inner: G,
}

impl<G: BindGenerator> SplitOutput<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    pub fn into_inner(self) -> G {
        self.inner
    }
}

impl<G: BindGenerator + Send> BindingGenerator for SplitOutput<G> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn generate(
        &mut self,
        snapshot: &DataRegistrySnapshot,
        output_dir: &Path,
    ) -> Result<GenerationReport, GenerationError> {
        self.inner
            .set_output_dirs(output_dir.join("include"), output_dir.join("src"));
        self.inner.generate(snapshot.types(), snapshot)
    }
}

/// Header and source destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OutputDirs {
    pub header: PathBuf,
    pub source: PathBuf,
}

pub(crate) fn ensure_dir(path: &Path) -> Result<(), GenerationError> {
    fs::create_dir_all(path).map_err(|source| GenerationError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `contents` to `path` unless the file already holds exactly that.
pub(crate) fn write_if_changed(
    path: PathBuf,
    contents: &str,
    report: &mut GenerationReport,
) -> Result<(), GenerationError> {
    let unchanged = match fs::read(&path) {
        Ok(existing) => existing == contents.as_bytes(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => false,
        Err(source) => return Err(GenerationError::WriteFile { path, source }),
    };

    if !unchanged {
        fs::write(&path, contents).map_err(|source| GenerationError::WriteFile {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "wrote");
    }
    report.record_file(path, !unchanged);
    Ok(())
}
