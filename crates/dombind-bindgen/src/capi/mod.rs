//! C API generator.
//!
//! One run:
//!
//! 1. classify `types` into a [`BindingManifest`]
//! 2. partition `types` into modules
//! 3. per module, emit function bodies with the emitter of each binding's
//!    dispatch family, then `<module>.h` and (if any body was emitted)
//!    `<module>.<ext>`
//! 4. write the shared runtime header and the manifest
//!
//! Units that cannot be bound are dropped from every output and listed in
//! the report; the run itself only fails on I/O.

mod header;
mod runtime;
mod source;

pub(crate) use runtime::{GENERATED_BANNER, HANDLE_TYPEDEF, include_guard};

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use dombind_core::{
    BindingError, CatalogError, DataRegistrySnapshot, FunctionInfo, GenerationError,
    GenerationReport, TypeMap,
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::ctype::CTypeMap;
use crate::generator::{self, BindGenerator, OutputDirs};
use crate::manifest::{
    BindingManifest, FunctionBindingDescriptor, ManifestResult, SubjectTypeDescriptor,
    build_binding_manifest, manifest_to_json,
};
use crate::module_map::BindModule;
use crate::subject::{DispatchFamily, SubjectKindCatalog, SubjectKindDescriptor};

/// Writes the body of one function bound through a custom subject kind.
///
/// The emitter owns the whole definition, signature line included.
pub type CustomEmitter =
    Arc<dyn Fn(&mut dyn fmt::Write, &CustomEmitContext<'_>) -> fmt::Result + Send + Sync>;

/// What a [`CustomEmitter`] is given.
pub struct CustomEmitContext<'a> {
    /// Registered metadata, when the owner is present in the generated types.
    pub function: Option<&'a FunctionInfo>,
    pub binding: &'a FunctionBindingDescriptor,
    pub module: &'a BindModule<'a>,
    pub subject: &'a SubjectTypeDescriptor,
}

/// Output options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapiOptions {
    /// Source file extension, `c` or `cpp`.
    pub source_extension: String,
    /// Manifest file name, written next to the headers.
    pub manifest_file: String,
    /// Manifest indentation; 0 writes compact JSON.
    pub manifest_indent: usize,
    /// Shared runtime header file name.
    pub runtime_header: String,
}

impl Default for CapiOptions {
    fn default() -> Self {
        Self {
            source_extension: "c".to_string(),
            manifest_file: "bindings_manifest.json".to_string(),
            manifest_indent: 2,
            runtime_header: "dombind_runtime.h".to_string(),
        }
    }
}

/// Generator for the C API.
pub struct CapiBindGenerator {
    dirs: Option<OutputDirs>,
    options: CapiOptions,
    catalog: SubjectKindCatalog,
    custom_emitters: FxHashMap<String, CustomEmitter>,
}

impl Default for CapiBindGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CapiBindGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut emitters: Vec<&str> = self.custom_emitters.keys().map(String::as_str).collect();
        emitters.sort_unstable();
        f.debug_struct("CapiBindGenerator")
            .field("dirs", &self.dirs)
            .field("options", &self.options)
            .field("catalog", &self.catalog)
            .field("custom_emitters", &emitters)
            .finish()
    }
}

impl CapiBindGenerator {
    pub fn new() -> Self {
        Self::with_options(CapiOptions::default())
    }

    pub fn with_options(options: CapiOptions) -> Self {
        Self {
            dirs: None,
            options,
            catalog: SubjectKindCatalog::builtin(),
            custom_emitters: FxHashMap::default(),
        }
    }

    pub fn options(&self) -> &CapiOptions {
        &self.options
    }

    pub fn catalog(&self) -> &SubjectKindCatalog {
        &self.catalog
    }

    /// Add an application-defined subject kind.
    pub fn declare_subject_kind(
        &mut self,
        descriptor: SubjectKindDescriptor,
    ) -> Result<(), CatalogError> {
        self.catalog.declare(descriptor)
    }

    /// Register the emitter for functions of subject kind `kind`.
    ///
    /// The kind must be known and use custom dispatch. Registering again
    /// replaces the previous emitter.
    pub fn register_custom_emitter(
        &mut self,
        kind: &str,
        emitter: CustomEmitter,
    ) -> Result<(), CatalogError> {
        let descriptor = self
            .catalog
            .get(kind)
            .ok_or_else(|| CatalogError::UnknownSubjectKind(kind.to_string()))?;
        if descriptor.dispatch_family != DispatchFamily::Custom {
            return Err(CatalogError::NotCustomKind {
                kind: kind.to_string(),
                family: descriptor.dispatch_family.to_string(),
            });
        }
        self.custom_emitters.insert(kind.to_string(), emitter);
        Ok(())
    }

    pub fn has_custom_emitter(&self, kind: &str) -> bool {
        self.custom_emitters.contains_key(kind)
    }

    /// Check if `module` spells a fixed-width integer type anywhere, given
    /// the function bindings emitted into it.
    pub fn module_needs_cstdint(
        module: &BindModule<'_>,
        bindings: &[&FunctionBindingDescriptor],
        types: &TypeMap,
    ) -> bool {
        header::module_needs_cstdint(module, bindings, &CTypeMap::new(types))
    }

    /// Write `manifest` to the header directory.
    pub fn emit_binding_manifest(
        &self,
        manifest: &BindingManifest,
        report: &mut GenerationReport,
    ) -> Result<(), GenerationError> {
        let dirs = self.dirs.as_ref().ok_or(GenerationError::OutputDirsNotConfigured)?;
        let mut json = manifest_to_json(manifest, self.options.manifest_indent)
            .map_err(|e| GenerationError::Manifest(e.to_string()))?;
        json.push('\n');
        generator::write_if_changed(dirs.header.join(&self.options.manifest_file), &json, report)
    }
}

impl BindGenerator for CapiBindGenerator {
    fn name(&self) -> &str {
        "capi"
    }

    fn set_output_dirs(&mut self, header_dir: PathBuf, source_dir: PathBuf) {
        self.dirs = Some(OutputDirs {
            header: header_dir,
            source: source_dir,
        });
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn generate(
        &mut self,
        types: &TypeMap,
        snapshot: &DataRegistrySnapshot,
    ) -> Result<GenerationReport, GenerationError> {
        let dirs = self.dirs.clone().ok_or(GenerationError::OutputDirsNotConfigured)?;
        generator::ensure_dir(&dirs.header)?;
        generator::ensure_dir(&dirs.source)?;

        let mut report = GenerationReport::new(self.name());
        let ManifestResult { mut manifest, errors } = build_binding_manifest(types, &self.catalog);
        report.errors.extend(errors);

        let modules = self.build_module_map(types);
        let ctypes = CTypeMap::new(snapshot.types());
        let mut dropped: FxHashSet<String> = FxHashSet::default();
        let mut reserved: FxHashSet<&str> = FxHashSet::default();

        for module in modules.values() {
            let header_file = format!("{}.h", module.name);
            if header_file == self.options.runtime_header || header_file == self.options.manifest_file {
                let err = BindingError::ReservedModuleName {
                    module: module.name.clone(),
                    file: header_file,
                };
                tracing::warn!(error = %err, "module skipped");
                report.errors.push(err);
                reserved.insert(module.name.as_str());
                continue;
            }

            let bindings: Vec<&FunctionBindingDescriptor> =
                manifest.functions_in_module(&module.name).collect();

            let mut emitted = Vec::with_capacity(bindings.len());
            let mut bodies = Vec::with_capacity(bindings.len());
            if self.module_has_functions(module) {
                for binding in bindings {
                    let Some(subject) = manifest.type_binding(&binding.owner) else {
                        continue;
                    };
                    match source::emit_function(binding, subject, module, types, &self.custom_emitters) {
                        Ok(body) => {
                            emitted.push(binding);
                            bodies.push(body);
                        }
                        Err(err) => {
                            tracing::warn!(module = %module.name, error = %err, "function skipped");
                            dropped.insert(binding.c_name.clone());
                            report.errors.push(err);
                        }
                    }
                }
            }

            let has_classified_type = module
                .all_types()
                .any(|t| manifest.type_binding(&t.name).is_some());
            if !has_classified_type {
                tracing::warn!(module = %module.name, "no classified types, module skipped");
                continue;
            }

            let ctx = header::HeaderContext {
                module,
                manifest: &manifest,
                bindings: &emitted,
                ctypes,
                runtime_header: &self.options.runtime_header,
            };
            let (header_text, header_errors) = header::render(&ctx)?;
            report.errors.extend(header_errors);
            generator::write_if_changed(
                dirs.header.join(header_file),
                &header_text,
                &mut report,
            )?;

            if !bodies.is_empty() {
                let source_text = source::render(module, &bodies)?;
                generator::write_if_changed(
                    dirs.source
                        .join(format!("{}.{}", module.name, self.options.source_extension)),
                    &source_text,
                    &mut report,
                )?;
            }
        }

        generator::write_if_changed(
            dirs.header.join(&self.options.runtime_header),
            &runtime::render(&self.options.runtime_header),
            &mut report,
        )?;

        manifest.types.retain(|t| !reserved.contains(t.module.as_str()));
        manifest.retain_functions(|f| {
            !dropped.contains(&f.c_name) && !reserved.contains(f.module.as_str())
        });
        self.emit_binding_manifest(&manifest, &mut report)?;

        tracing::info!(
            generator = self.name(),
            modules = modules.len(),
            written = report.written.len(),
            unchanged = report.unchanged.len(),
            skipped = report.errors.len(),
            "bindings generated"
        );
        Ok(report)
    }
}
