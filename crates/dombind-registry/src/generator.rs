//! Generators driven by [`DataRegistry::generate_bindings`](crate::DataRegistry::generate_bindings).

use std::path::Path;

use dombind_core::{BindingError, DataRegistrySnapshot, GenerationError, GenerationReport};

/// A generator owned by the registry.
///
/// Receives an immutable snapshot and a single output directory. It must not
/// call back into the live registry.
pub trait BindingGenerator: Send {
    /// Name used in logs and summaries.
    fn name(&self) -> &str;

    /// Emit files for `snapshot` under `output_dir`.
    fn generate(
        &mut self,
        snapshot: &DataRegistrySnapshot,
        output_dir: &Path,
    ) -> Result<GenerationReport, GenerationError>;
}

/// Outcome of one generator in a registry-driven run.
#[derive(Debug)]
pub struct GeneratorOutcome {
    /// Generator name.
    pub name: String,
    /// Report, or the fatal error that stopped the generator.
    pub result: Result<GenerationReport, GenerationError>,
}

/// Aggregated result of [`DataRegistry::generate_bindings`](crate::DataRegistry::generate_bindings).
///
/// Every registered generator runs even after one fails, so all errors are
/// visible in a single pass.
#[derive(Debug, Default)]
pub struct GenerationSummary {
    /// Outcomes in generator registration order.
    pub outcomes: Vec<GeneratorOutcome>,
}

impl GenerationSummary {
    /// Check if every generator completed (logical AND over generators).
    ///
    /// Skipped units do not count as failures; see
    /// [`binding_errors`](Self::binding_errors).
    pub fn succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Fatal failures, by generator name.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &GenerationError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
    }

    /// Every unit skipped by any generator.
    pub fn binding_errors(&self) -> impl Iterator<Item = &BindingError> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .flat_map(|r| r.errors.iter())
    }

    /// Reports of the generators that completed.
    pub fn reports(&self) -> impl Iterator<Item = &GenerationReport> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }
}
