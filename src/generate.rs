//! One-shot generation run over a registry.

use std::path::PathBuf;

use dombind_bindgen::{BindGenerator, CBindingGenerator, CapiBindGenerator, CapiOptions};
use dombind_core::CatalogError;
use dombind_registry::{BindingGenerator, DataRegistry, GenerationSummary, GeneratorOutcome};

use crate::metadata::MetadataDocument;

/// Where and how to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
    pub header_dir: PathBuf,
    pub source_dir: PathBuf,
    /// Also write the single legacy header into this directory.
    pub legacy_dir: Option<PathBuf>,
    pub capi: CapiOptions,
}

impl GenerateConfig {
    pub fn new(header_dir: impl Into<PathBuf>, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            header_dir: header_dir.into(),
            source_dir: source_dir.into(),
            legacy_dir: None,
            capi: CapiOptions::default(),
        }
    }
}

/// A C API generator configured for `config`, with the document's subject
/// kinds declared.
pub fn capi_generator(
    config: &GenerateConfig,
    document: Option<&MetadataDocument>,
) -> Result<CapiBindGenerator, CatalogError> {
    let mut generator = CapiBindGenerator::with_options(config.capi.clone());
    for kind in document.into_iter().flat_map(|d| &d.subject_kinds) {
        generator.declare_subject_kind(kind.clone())?;
    }
    generator.set_output_dirs(config.header_dir.clone(), config.source_dir.clone());
    Ok(generator)
}

/// Run `generator`, then the legacy generator if configured, against one
/// snapshot of `registry`.
pub fn run(
    registry: &DataRegistry,
    mut generator: CapiBindGenerator,
    config: &GenerateConfig,
) -> GenerationSummary {
    let snapshot = registry.snapshot();
    let mut summary = GenerationSummary::default();

    let result = generator.generate(snapshot.types(), &snapshot);
    if let Err(err) = &result {
        tracing::error!(generator = generator.name(), error = %err, "generator failed");
    }
    summary.outcomes.push(GeneratorOutcome {
        name: generator.name().to_string(),
        result,
    });

    if let Some(dir) = &config.legacy_dir {
        let mut legacy = CBindingGenerator::new();
        let result = legacy.generate(&snapshot, dir);
        if let Err(err) = &result {
            tracing::error!(generator = legacy.name(), error = %err, "generator failed");
        }
        summary.outcomes.push(GeneratorOutcome {
            name: legacy.name().to_string(),
            result,
        });
    }

    summary
}
