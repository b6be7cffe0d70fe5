//! Result of one generator run.

use std::path::PathBuf;

use crate::BindingError;

/// What a generator produced.
///
/// A report is returned even when units were skipped; those are listed in
/// `errors`. Fatal failures are reported as
/// [`GenerationError`](crate::GenerationError) instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    /// Generator name.
    pub generator: String,
    /// Files whose content changed (or were created).
    pub written: Vec<PathBuf>,
    /// Files regenerated with byte-identical content and left untouched.
    pub unchanged: Vec<PathBuf>,
    /// Units that were skipped.
    pub errors: Vec<BindingError>,
}

impl GenerationReport {
    pub fn new(generator: impl Into<String>) -> Self {
        Self {
            generator: generator.into(),
            ..Self::default()
        }
    }

    /// Check if nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every file the run produced, changed or not.
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.written.iter().chain(self.unchanged.iter())
    }

    /// Record a file, by whether its content changed.
    pub fn record_file(&mut self, path: PathBuf, changed: bool) {
        if changed {
            self.written.push(path);
        } else {
            self.unchanged.push(path);
        }
    }
}
