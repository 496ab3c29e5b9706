use bzip2::read::BzDecoder;
use flate2::read::MultiGzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use tar::EntryType;
use xz2::read::XzDecoder;
use zip::ZipArchive;

use crate::models::archive::{ArchiveKind, ExtractionTask};
use crate::models::config::{Backend, Config, EntryFailurePolicy};
use crate::models::error::ExtractError;
use crate::services::external::ExternalTool;
use crate::utils::fs::{sanitize_entry_path, strip_suffix_ignore_case};

/// Result of one successful decode.
#[derive(Debug, Default)]
pub struct Decoded {
    pub files: Vec<PathBuf>,
    /// Entries dropped under `EntryFailurePolicy::SkipEntry`.
    pub skipped: Vec<ExtractError>,
}

/// Decodes one archive into one directory. Never touches the archive
/// itself; on failure the files it wrote are removed and the files it
/// replaced are put back.
pub struct Unarchiver<'a> {
    config: &'a Config,
}

impl<'a> Unarchiver<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn decode(&self, task: &ExtractionTask) -> Result<Decoded, ExtractError> {
        let archive = task.handle.path.as_path();
        let mut out = Output::new(archive, &task.target_dir);

        let result = match task.handle.kind {
            ArchiveKind::Zip => self.unzip(archive, &mut out),
            ArchiveKind::Tar | ArchiveKind::TarGzip | ArchiveKind::TarBzip2 | ArchiveKind::TarXz => {
                self.untar(archive, task.handle.kind, &mut out)
            }
            ArchiveKind::Gzip | ArchiveKind::Bzip2 | ArchiveKind::Xz => {
                self.decompress_single(archive, task.handle.kind, &mut out)
            }
            // Unrecognized names still get one attempt as zip.
            ArchiveKind::Unknown => self.unzip(archive, &mut out).map_err(|e| ExtractError::UnsupportedFormat {
                path: archive.to_path_buf(),
                reason: e.to_string(),
            }),
        };

        match result {
            Ok(()) => {
                log::info!(
                    "[{}] {} -> {} files",
                    archive.display(),
                    task.handle.kind,
                    out.files.len()
                );
                out.commit();
                Ok(Decoded {
                    files: out.files,
                    skipped: out.skipped,
                })
            }
            Err(e) => {
                out.rollback();
                Err(e)
            }
        }
    }

    fn unzip(&self, archive: &Path, out: &mut Output) -> Result<(), ExtractError> {
        let file = open(archive)?;
        let mut zip = ZipArchive::new(BufReader::new(file))
            .map_err(|e| ExtractError::decode(archive, format!("Failed to open ZIP archive: {}", e)))?;

        for index in 0..zip.len() {
            let result = unzip_entry(&mut zip, index, archive, out);
            self.settle(out, result)?;
        }
        Ok(())
    }

    fn untar(&self, archive: &Path, kind: ArchiveKind, out: &mut Output) -> Result<(), ExtractError> {
        let reader: Box<dyn Read> = match kind {
            ArchiveKind::TarGzip => Box::new(MultiGzDecoder::new(BufReader::new(open(archive)?))),
            ArchiveKind::TarBzip2 => Box::new(BzDecoder::new(BufReader::new(open(archive)?))),
            ArchiveKind::TarXz => self.xz_reader(archive)?,
            _ => Box::new(BufReader::new(open(archive)?)),
        };

        let mut tar = tar::Archive::new(reader);
        let entries = tar
            .entries()
            .map_err(|e| ExtractError::decode(archive, format!("Failed to read TAR stream: {}", e)))?;

        for entry in entries {
            let mut entry =
                entry.map_err(|e| ExtractError::decode(archive, format!("Failed to read TAR header: {}", e)))?;
            let result = untar_entry(&mut entry, archive, out);
            self.settle(out, result)?;
        }
        Ok(())
    }

    fn decompress_single(&self, archive: &Path, kind: ArchiveKind, out: &mut Output) -> Result<(), ExtractError> {
        let name = single_output_name(archive, kind);
        let mut reader: Box<dyn Read> = match kind {
            ArchiveKind::Gzip => Box::new(MultiGzDecoder::new(BufReader::new(open(archive)?))),
            ArchiveKind::Bzip2 => self.bzip2_reader(archive)?,
            _ => self.xz_reader(archive)?,
        };
        out.file(Path::new(&name), &mut reader)
    }

    fn xz_reader(&self, archive: &Path) -> Result<Box<dyn Read>, ExtractError> {
        match self.config.xz.backend {
            Backend::External => {
                let bytes = ExternalTool::xz(&self.config.xz).decompress(archive)?;
                Ok(Box::new(Cursor::new(bytes)))
            }
            Backend::Builtin => Ok(Box::new(XzDecoder::new(BufReader::new(open(archive)?)))),
        }
    }

    fn bzip2_reader(&self, archive: &Path) -> Result<Box<dyn Read>, ExtractError> {
        match self.config.bzip2.backend {
            Backend::External => {
                let bytes = ExternalTool::bzip2(&self.config.bzip2).decompress(archive)?;
                Ok(Box::new(Cursor::new(bytes)))
            }
            Backend::Builtin => Ok(Box::new(BzDecoder::new(BufReader::new(open(archive)?)))),
        }
    }

    fn settle(&self, out: &mut Output, result: Result<(), ExtractError>) -> Result<(), ExtractError> {
        match (result, self.config.entry_failure) {
            (Ok(()), _) => Ok(()),
            (Err(e), EntryFailurePolicy::SkipEntry) => {
                log::warn!("{}", e);
                out.skipped.push(e);
                Ok(())
            }
            (Err(e), EntryFailurePolicy::AbortArchive) => Err(e),
        }
    }
}

fn unzip_entry<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    index: usize,
    archive: &Path,
    out: &mut Output,
) -> Result<(), ExtractError> {
    let mut entry = zip
        .by_index(index)
        .map_err(|e| ExtractError::decode(archive, format!("Failed to open entry #{}: {}", index, e)))?;

    let rel = entry
        .enclosed_name()
        .and_then(|name| sanitize_entry_path(&name))
        .ok_or_else(|| ExtractError::UnsafeEntry {
            path: archive.to_path_buf(),
            entry: entry.name().to_string(),
        })?;

    if entry.is_dir() {
        out.dir(&rel)
    } else {
        out.file(&rel, &mut entry)
    }
}

fn untar_entry<R: Read>(entry: &mut tar::Entry<R>, archive: &Path, out: &mut Output) -> Result<(), ExtractError> {
    let raw = entry
        .path()
        .map_err(|e| ExtractError::decode(archive, format!("Invalid TAR entry path: {}", e)))?
        .into_owned();
    let rel = sanitize_entry_path(&raw).ok_or_else(|| ExtractError::UnsafeEntry {
        path: archive.to_path_buf(),
        entry: raw.display().to_string(),
    })?;

    match entry.header().entry_type() {
        EntryType::Directory => out.dir(&rel),
        EntryType::Regular | EntryType::Continuous => out.file(&rel, entry),
        other => {
            log::debug!("[{}] skip {:?} entry {}", archive.display(), other, raw.display());
            Ok(())
        }
    }
}

fn open(archive: &Path) -> Result<File, ExtractError> {
    File::open(archive).map_err(|e| ExtractError::decode(archive, format!("cannot open archive: {}", e)))
}

/// `foo.txt.gz` decodes to `foo.txt`.
fn single_output_name(archive: &Path, kind: ArchiveKind) -> String {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let stripped = kind
        .single_file_suffix()
        .map(|suffix| strip_suffix_ignore_case(&name, suffix))
        .unwrap_or(name.as_str());

    if stripped.is_empty() || stripped == name {
        format!("{}.out", name)
    } else {
        stripped.to_string()
    }
}

/// Files written for one archive, so a failed decode can be undone.
struct Output<'p> {
    archive: &'p Path,
    dest: &'p Path,
    files: Vec<PathBuf>,
    skipped: Vec<ExtractError>,
    /// (replaced path, where its previous content was moved)
    backups: Vec<(PathBuf, PathBuf)>,
}

impl<'p> Output<'p> {
    fn new(archive: &'p Path, dest: &'p Path) -> Self {
        Self {
            archive,
            dest,
            files: Vec::new(),
            skipped: Vec::new(),
            backups: Vec::new(),
        }
    }

    fn dir(&mut self, rel: &Path) -> Result<(), ExtractError> {
        let path = self.dest.join(rel);
        fs::create_dir_all(&path).map_err(|e| {
            ExtractError::decode(self.archive, format!("Failed to create directory {}: {}", path.display(), e))
        })
    }

    fn file(&mut self, rel: &Path, reader: &mut dyn Read) -> Result<(), ExtractError> {
        if rel.as_os_str().is_empty() {
            return Err(ExtractError::UnsafeEntry {
                path: self.archive.to_path_buf(),
                entry: String::new(),
            });
        }

        let path = self.dest.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ExtractError::decode(self.archive, format!("Failed to create directory for {}: {}", path.display(), e))
            })?;
        }

        // A path written earlier by this same decode needs no second backup.
        let backup = if self.files.contains(&path) {
            None
        } else {
            self.back_up(&path)?
        };

        let written = File::create(&path).and_then(|mut file| io::copy(reader, &mut file));
        match written {
            Ok(bytes) => {
                log::debug!("[{}] wrote {} ({} bytes)", self.archive.display(), path.display(), bytes);
                if let Some(backup) = backup {
                    self.backups.push((path.clone(), backup));
                }
                if !self.files.contains(&path) {
                    self.files.push(path);
                }
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_file(&path);
                if let Some(backup) = backup {
                    self.restore(&path, &backup);
                }
                Err(ExtractError::decode(
                    self.archive,
                    format!("Failed to extract {}: {}", rel.display(), e),
                ))
            }
        }
    }

    /// Moves an existing non-directory at `path` to a hidden sibling name.
    fn back_up(&self, path: &Path) -> Result<Option<PathBuf>, ExtractError> {
        match fs::symlink_metadata(path) {
            Ok(meta) if !meta.is_dir() => {}
            _ => return Ok(None),
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut backup = path.with_file_name(format!(".{}.unnest-orig", name));
        let mut attempt = 1;
        while fs::symlink_metadata(&backup).is_ok() {
            backup = path.with_file_name(format!(".{}.unnest-orig.{}", name, attempt));
            attempt += 1;
        }

        fs::rename(path, &backup).map_err(|e| {
            ExtractError::decode(self.archive, format!("Failed to set aside {}: {}", path.display(), e))
        })?;
        log::trace!("[{}] set aside {} as {}", self.archive.display(), path.display(), backup.display());
        Ok(Some(backup))
    }

    fn restore(&self, path: &Path, backup: &Path) {
        if let Err(e) = fs::rename(backup, path) {
            log::warn!(
                "[{}] could not restore {} from {}: {}",
                self.archive.display(),
                path.display(),
                backup.display(),
                e
            );
        }
    }

    /// Drops the set-aside copies once the decode has succeeded.
    fn commit(&mut self) {
        for (_, backup) in self.backups.drain(..) {
            if let Err(e) = fs::remove_file(&backup) {
                log::debug!("[{}] left {}: {}", self.archive.display(), backup.display(), e);
            }
        }
    }

    fn rollback(&mut self) {
        for path in self.files.drain(..) {
            if let Err(e) = fs::remove_file(&path) {
                log::debug!("[{}] rollback left {}: {}", self.archive.display(), path.display(), e);
            }
        }
        let backups: Vec<_> = self.backups.drain(..).rev().collect();
        for (path, backup) in backups {
            self.restore(&path, &backup);
        }
    }
}
