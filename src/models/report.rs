use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use crate::models::error::ExtractError;

/// The record handed back to callers, one per `extract` invocation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExtractionReport {
    pub source_path: String,
    pub extracted_files: Vec<String>,
    pub total_files: usize,
    pub errors: Vec<String>,
    pub message: String,
    pub duration: String,
}

impl ExtractionReport {
    pub fn new(source: &Path, extracted_files: Vec<String>, errors: Vec<String>, elapsed: Duration) -> Self {
        let total_files = extracted_files.len();
        let message = if errors.is_empty() {
            format!("Successfully extracted {} files from archives", total_files)
        } else {
            format!(
                "Extraction completed with {} files extracted and {} errors",
                total_files,
                errors.len()
            )
        };

        Self {
            source_path: source.to_string_lossy().to_string(),
            extracted_files,
            total_files,
            errors,
            message,
            duration: format!("{:?}", elapsed),
        }
    }

    /// Report for a call that failed before any walking started.
    pub fn rejected(source: &Path, error: &ExtractError, elapsed: Duration) -> Self {
        let mut report = Self::new(source, Vec::new(), vec![error.to_string()], elapsed);
        report.message = error.to_string();
        report
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
