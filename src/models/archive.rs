use serde::Serialize;
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGzip,
    TarBzip2,
    TarXz,
    Gzip,
    Bzip2,
    Xz,
    Unknown,
}

impl ArchiveKind {
    pub fn is_archive(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Suffix stripped from the base name by the single-file compressors.
    pub fn single_file_suffix(&self) -> Option<&'static str> {
        match self {
            Self::Gzip => Some(".gz"),
            Self::Bzip2 => Some(".bz2"),
            Self::Xz => Some(".xz"),
            _ => None,
        }
    }
}

impl Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zip => write!(f, "zip"),
            Self::Tar => write!(f, "tar"),
            Self::TarGzip => write!(f, "tar+gzip"),
            Self::TarBzip2 => write!(f, "tar+bzip2"),
            Self::TarXz => write!(f, "tar+xz"),
            Self::Gzip => write!(f, "gzip"),
            Self::Bzip2 => write!(f, "bzip2"),
            Self::Xz => write!(f, "xz"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One candidate archive found during a tree walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHandle {
    pub path: PathBuf,
    pub kind: ArchiveKind,
    pub dir: PathBuf,
}

impl ArchiveHandle {
    pub fn new(path: PathBuf, kind: ArchiveKind) -> Self {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self { path, kind, dir }
    }

    pub fn key(&self) -> ArchiveKey {
        ArchiveKey {
            path: self.path.clone(),
            dir: self.dir.clone(),
        }
    }
}

/// Identity of an archive within one pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveKey {
    pub path: PathBuf,
    pub dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ExtractionTask {
    pub handle: ArchiveHandle,
    pub target_dir: PathBuf,
}

impl ExtractionTask {
    pub fn new(handle: ArchiveHandle, target_dir: PathBuf) -> Self {
        Self { handle, target_dir }
    }

    /// Decode next to the archive itself.
    pub fn in_place(handle: ArchiveHandle) -> Self {
        let target_dir = handle.dir.clone();
        Self { handle, target_dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_dir() {
        let handle = ArchiveHandle::new(PathBuf::from("/data/logs/a.tar.gz"), ArchiveKind::TarGzip);
        assert_eq!(handle.dir, PathBuf::from("/data/logs"));
        assert_eq!(ExtractionTask::in_place(handle).target_dir, PathBuf::from("/data/logs"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ArchiveKind::TarBzip2.to_string(), "tar+bzip2");
        assert_eq!(ArchiveKind::Xz.single_file_suffix(), Some(".xz"));
        assert_eq!(ArchiveKind::Tar.single_file_suffix(), None);
        assert!(!ArchiveKind::Unknown.is_archive());
    }
}
