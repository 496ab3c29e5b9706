use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::WalkDir;

use crate::models::archive::{ArchiveHandle, ArchiveKey, ExtractionTask};
use crate::models::config::Config;
use crate::models::error::ExtractError;
use crate::models::report::ExtractionReport;
use crate::models::request::ExtractRequest;
use crate::services::aggregator::Aggregator;
use crate::services::classifier::classify;
use crate::services::unarchiver::Unarchiver;

/// Validates a request and runs the tree extraction. A missing source is
/// the only outright failure; everything else lands in the report.
pub fn extract_archives(
    request: &ExtractRequest,
    config: &Config,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<ExtractionReport, ExtractError> {
    let source = request.source_path.as_path();
    if !source.exists() {
        return Err(ExtractError::NotFound {
            path: source.to_path_buf(),
        });
    }

    let output = request.output_dir();
    fs::create_dir_all(&output).map_err(|e| ExtractError::filesystem("create output directory", &output, e))?;

    let mut extractor = Extractor::new(config);
    if let Some(cancel) = cancel {
        extractor = extractor.with_cancel(cancel);
    }
    Ok(extractor.extract_tree(source, &output, request.recursive(config)))
}

/// Round counter plus the archives already taken in the current pass.
#[derive(Debug, Default)]
struct IterationState {
    iteration: usize,
    seen: HashSet<ArchiveKey>,
}

impl IterationState {
    fn begin_pass(&mut self) {
        self.iteration += 1;
        self.seen.clear();
    }

    fn first_visit(&mut self, handle: &ArchiveHandle) -> bool {
        self.seen.insert(handle.key())
    }
}

/// Cross-round bookkeeping for one `extract_tree` call.
#[derive(Debug, Default)]
struct RunState {
    passes: IterationState,
    /// Archives that failed once; never retried within the run.
    failed: HashSet<PathBuf>,
    /// Walk errors already reported.
    unreadable: HashSet<PathBuf>,
}

#[derive(Debug, Default)]
struct Scan {
    archives: Vec<ArchiveHandle>,
    errors: Vec<ExtractError>,
    cancelled: bool,
}

enum Round {
    Decoded,
    Empty,
    Cancelled,
}

pub struct Extractor<'a> {
    config: &'a Config,
    unarchiver: Unarchiver<'a>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> Extractor<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            unarchiver: Unarchiver::new(config),
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// First pass mirrors `source` into `output`; with `recursive` the
    /// output tree is then decoded in place until no archive is left or
    /// the iteration budget runs out.
    pub fn extract_tree(&self, source: &Path, output: &Path, recursive: bool) -> ExtractionReport {
        let mut agg = Aggregator::new();
        let source_abs = std::path::absolute(source).unwrap_or_else(|_| source.to_path_buf());
        let output_abs = std::path::absolute(output).unwrap_or_else(|_| output.to_path_buf());

        log::info!(
            "[{}] extracting into {} (recursive={}, max_iterations={})",
            source.display(),
            output.display(),
            recursive,
            self.config.max_iterations
        );
        self.run(&source_abs, &output_abs, recursive, &mut agg);

        let report = agg.finish(source);
        log::info!("[{}] {} in {}", source.display(), report.message, report.duration);
        report
    }

    fn run(&self, source: &Path, output: &Path, recursive: bool, agg: &mut Aggregator) {
        let mut run = RunState::default();

        run.passes.begin_pass();
        let decoded = match self.first_pass(source, output, &mut run, agg) {
            Some(decoded) => decoded,
            None => return agg.error(ExtractError::Cancelled),
        };
        if !recursive {
            return;
        }
        self.retire(decoded, output, &mut run, agg);
        self.fixpoint(output, &mut run, agg);
    }

    /// Decodes the output tree in place, round after round, until a round
    /// finds nothing or the budget is spent.
    fn fixpoint(&self, output: &Path, run: &mut RunState, agg: &mut Aggregator) {
        loop {
            if run.passes.iteration >= self.config.max_iterations {
                let probe = self.scan(output, run);
                if probe.cancelled {
                    agg.error(ExtractError::Cancelled);
                } else if !probe.archives.is_empty() {
                    agg.error(ExtractError::BudgetExceeded {
                        max_iterations: self.config.max_iterations,
                    });
                }
                break;
            }

            run.passes.begin_pass();
            match self.fixpoint_round(output, run, agg) {
                Round::Decoded => {}
                Round::Empty => {
                    log::debug!("[{}] fixpoint after {} passes", output.display(), run.passes.iteration);
                    break;
                }
                Round::Cancelled => return agg.error(ExtractError::Cancelled),
            }
        }
    }

    /// Decodes every archive under `source` into the mirrored directory
    /// under `output`. Returns the archives decoded, or None if cancelled.
    fn first_pass(
        &self,
        source: &Path,
        output: &Path,
        run: &mut RunState,
        agg: &mut Aggregator,
    ) -> Option<Vec<PathBuf>> {
        let scan = self.scan(source, run);
        scan.errors.into_iter().for_each(|e| agg.error(e));
        if scan.cancelled {
            return None;
        }

        let mut decoded = Vec::new();
        for handle in scan.archives {
            if self.cancelled() {
                return None;
            }
            if !run.passes.first_visit(&handle) {
                continue;
            }

            let rel_dir = handle.dir.strip_prefix(source).unwrap_or(Path::new(""));
            let target = output.join(rel_dir);
            if let Err(e) = fs::create_dir_all(&target) {
                agg.error(ExtractError::filesystem("create target directory", &target, e));
                run.failed.insert(handle.path);
                continue;
            }

            let path = handle.path.clone();
            match self.unarchiver.decode(&ExtractionTask::new(handle, target)) {
                Ok(files) => {
                    agg.record(files);
                    decoded.push(path);
                }
                Err(e) => {
                    agg.error(e);
                    run.failed.insert(path);
                }
            }
        }
        Some(decoded)
    }

    /// Top-level archives that sit inside the output tree are consumed by
    /// the first pass; remove them so the loop does not decode them again.
    fn retire(&self, decoded: Vec<PathBuf>, output: &Path, run: &mut RunState, agg: &mut Aggregator) {
        for path in decoded {
            // Overwritten by an extracted file of the same name.
            if !path.starts_with(output) || agg.contains(&path) {
                continue;
            }
            if let Err(e) = fs::remove_file(&path) {
                agg.error(ExtractError::filesystem("remove original archive", &path, e));
                run.failed.insert(path);
            }
        }
    }

    fn fixpoint_round(&self, output: &Path, run: &mut RunState, agg: &mut Aggregator) -> Round {
        let scan = self.scan(output, run);
        scan.errors.into_iter().for_each(|e| agg.error(e));
        if scan.cancelled {
            return Round::Cancelled;
        }
        if scan.archives.is_empty() {
            return Round::Empty;
        }

        log::debug!(
            "[{}] pass {}: {} archives",
            output.display(),
            run.passes.iteration,
            scan.archives.len()
        );

        for handle in scan.archives {
            if self.cancelled() {
                return Round::Cancelled;
            }
            if !run.passes.first_visit(&handle) {
                continue;
            }

            let path = handle.path.clone();
            match self.unarchiver.decode(&ExtractionTask::in_place(handle)) {
                Ok(decoded) => {
                    let overwritten = decoded.files.contains(&path);
                    agg.record(decoded);
                    if overwritten {
                        continue;
                    }
                    match fs::remove_file(&path) {
                        Ok(()) => agg.retract(&path),
                        Err(e) => {
                            agg.error(ExtractError::filesystem("remove original archive", &path, e));
                            run.failed.insert(path);
                        }
                    }
                }
                Err(e) => {
                    agg.error(e);
                    run.failed.insert(path);
                }
            }
        }
        Round::Decoded
    }

    /// Lexical depth-first walk. Collects candidates before anything is
    /// decoded, so files produced in this round wait for the next one.
    fn scan(&self, root: &Path, run: &mut RunState) -> Scan {
        let mut scan = Scan::default();

        for entry in WalkDir::new(root).sort_by_file_name() {
            if self.cancelled() {
                scan.cancelled = true;
                break;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                    if run.unreadable.insert(path.clone()) {
                        scan.errors.push(ExtractError::Walk { path, source: e });
                    }
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.into_path();
            if run.failed.contains(&path) {
                continue;
            }
            let kind = classify(&path);
            if kind.is_archive() {
                scan.archives.push(ArchiveHandle::new(path, kind));
            }
        }
        scan
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
