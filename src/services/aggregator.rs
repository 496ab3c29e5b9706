use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::models::error::ExtractError;
use crate::models::report::ExtractionReport;
use crate::services::unarchiver::Decoded;

/// Collects extracted paths (discovery order, no duplicates) and
/// non-fatal errors for one run.
#[derive(Debug)]
pub struct Aggregator {
    started: Instant,
    extracted: Vec<PathBuf>,
    index: HashSet<PathBuf>,
    errors: Vec<ExtractError>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            extracted: Vec::new(),
            index: HashSet::new(),
            errors: Vec::new(),
        }
    }

    pub fn record(&mut self, decoded: Decoded) {
        for path in decoded.files {
            if self.index.insert(path.clone()) {
                self.extracted.push(path);
            }
        }
        for error in decoded.skipped {
            self.error(error);
        }
    }

    pub fn error(&mut self, error: ExtractError) {
        log::warn!("{}", error);
        self.errors.push(error);
    }

    /// Drop a path that no longer exists on disk (a consumed archive).
    pub fn retract(&mut self, path: &Path) {
        if self.index.remove(path) {
            self.extracted.retain(|p| p != path);
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.index.contains(path)
    }

    pub fn finish(self, source: &Path) -> ExtractionReport {
        let extracted = self
            .extracted
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect();
        let errors = self.errors.iter().map(|e| e.to_string()).collect();
        ExtractionReport::new(source, extracted, errors, self.started.elapsed())
    }
}
