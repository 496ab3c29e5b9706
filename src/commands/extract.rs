use anyhow::{Context, Result};
use comfy_table::Table;
use comfy_table::presets::NOTHING;
use std::path::PathBuf;
use std::time::Instant;

use crate::models::config::Config;
use crate::models::error::ExtractError;
use crate::models::report::ExtractionReport;
use crate::models::request::ExtractRequest;
use crate::services::extractor::extract_archives;

pub struct ExtractOptions {
    pub source: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub no_recursive: bool,
    pub max_iterations: Option<usize>,
    pub json: bool,
}

pub fn run(config: &Config, options: ExtractOptions) -> Result<()> {
    let mut config = config.clone();
    if let Some(max_iterations) = options.max_iterations {
        config.max_iterations = max_iterations;
        config.validate()?;
    }

    let mut request = ExtractRequest::new(options.source);
    request.output_dir = options.output_dir;
    request.recursive = options.no_recursive.then_some(false);

    let started = Instant::now();
    let (report, fatal) = match extract_archives(&request, &config, None) {
        Ok(report) => (report, None),
        Err(e) => (ExtractionReport::rejected(&request.source_path, &e, started.elapsed()), Some(e)),
    };

    if options.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        print_report(&report);
    }

    // Only a missing source fails the command; anything else is in the report.
    match fatal {
        Some(e @ ExtractError::NotFound { .. }) => Err(e.into()),
        _ => Ok(()),
    }
}

fn print_report(report: &ExtractionReport) {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec!["Source", "Files", "Errors", "Duration"]);
    table.add_row(vec![
        report.source_path.clone(),
        report.total_files.to_string(),
        report.errors.len().to_string(),
        report.duration.clone(),
    ]);
    println!("{table}");

    if report.has_errors() {
        for error in &report.errors {
            println!("  ! {}", error);
        }
    }
    println!("{}", report.message);
}
