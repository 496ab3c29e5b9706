use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::models::archive::{ArchiveHandle, ExtractionTask};
use crate::models::config::Config;
use crate::services::classifier::classify;
use crate::services::unarchiver::Unarchiver;

pub fn run(config: &Config, archive: &Path, output_dir: Option<&Path>) -> Result<()> {
    if !archive.is_file() {
        anyhow::bail!("archive does not exist: {}", archive.display());
    }

    let handle = ArchiveHandle::new(archive.to_path_buf(), classify(archive));
    let target = output_dir.map(Path::to_path_buf).unwrap_or_else(|| handle.dir.clone());
    fs::create_dir_all(&target)
        .with_context(|| format!("Failed to create output directory: {}", target.display()))?;

    let decoded = Unarchiver::new(config).decode(&ExtractionTask::new(handle, target))?;
    for skipped in &decoded.skipped {
        log::warn!("{}", skipped);
    }
    for file in &decoded.files {
        println!("{}", file.display());
    }
    Ok(())
}
