use std::path::Path;

use crate::models::archive::ArchiveKind;

/// Suffix-only classification. Nothing is read from disk, so a mislabeled
/// file is classified by its name.
pub fn classify(path: &Path) -> ArchiveKind {
    let ext = match lowercase_ext(path) {
        Some(ext) => ext,
        None => return ArchiveKind::Unknown,
    };

    let inner_is_tar = path
        .file_stem()
        .and_then(|stem| lowercase_ext(Path::new(stem)))
        .is_some_and(|inner| inner == "tar");

    match (ext.as_str(), inner_is_tar) {
        ("zip", _) => ArchiveKind::Zip,
        ("tar", _) => ArchiveKind::Tar,
        ("tgz", _) | ("gz", true) => ArchiveKind::TarGzip,
        ("tbz2", _) | ("tbz", _) | ("bz2", true) => ArchiveKind::TarBzip2,
        ("txz", _) | ("xz", true) => ArchiveKind::TarXz,
        ("gz", false) => ArchiveKind::Gzip,
        ("bz2", false) => ArchiveKind::Bzip2,
        ("xz", false) => ArchiveKind::Xz,
        _ => ArchiveKind::Unknown,
    }
}

fn lowercase_ext(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(name: &str) -> ArchiveKind {
        classify(Path::new(name))
    }

    #[test]
    fn test_containers() {
        assert_eq!(kind("/bundle/logs.zip"), ArchiveKind::Zip);
        assert_eq!(kind("/bundle/logs.tar"), ArchiveKind::Tar);
        assert_eq!(kind("LOGS.ZIP"), ArchiveKind::Zip);
    }

    #[test]
    fn test_compound_suffixes() {
        assert_eq!(kind("a.tar.gz"), ArchiveKind::TarGzip);
        assert_eq!(kind("a.tgz"), ArchiveKind::TarGzip);
        assert_eq!(kind("a.tar.bz2"), ArchiveKind::TarBzip2);
        assert_eq!(kind("a.tbz2"), ArchiveKind::TarBzip2);
        assert_eq!(kind("a.tar.xz"), ArchiveKind::TarXz);
        assert_eq!(kind("a.TXZ"), ArchiveKind::TarXz);
        assert_eq!(kind("a.TAR.GZ"), ArchiveKind::TarGzip);
    }

    #[test]
    fn test_single_file_compressors() {
        assert_eq!(kind("server.log.gz"), ArchiveKind::Gzip);
        assert_eq!(kind("server.log.bz2"), ArchiveKind::Bzip2);
        assert_eq!(kind("server.log.xz"), ArchiveKind::Xz);
        assert_eq!(kind("tar.gz.gz"), ArchiveKind::Gzip);
    }

    #[test]
    fn test_not_archives() {
        assert_eq!(kind("notes.txt"), ArchiveKind::Unknown);
        assert_eq!(kind("Makefile"), ArchiveKind::Unknown);
        assert_eq!(kind(".gz"), ArchiveKind::Unknown);
        assert_eq!(kind("archive.7z"), ArchiveKind::Unknown);
        assert!(!classify(Path::new("foo.tar.txt")).is_archive());
    }
}
