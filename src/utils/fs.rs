use std::path::{Component, Path, PathBuf};

/// Relative form of an archive entry path, or None when it would land
/// outside the destination (`..`, absolute paths, drive prefixes). A path
/// made only of `.` components comes back empty.
pub fn sanitize_entry_path(path: &Path) -> Option<PathBuf> {
    let mut sanitized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => sanitized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(sanitized)
}

/// `foo.txt.gz` -> `foo.txt`, case-insensitive on the suffix.
pub fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> &'a str {
    let cut = name.len().saturating_sub(suffix.len());
    if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(suffix) {
        &name[..cut]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_nested() {
        assert_eq!(
            sanitize_entry_path(Path::new("./logs/app/server.log")),
            Some(PathBuf::from("logs/app/server.log"))
        );
    }

    #[test]
    fn test_sanitize_rejects_escape() {
        assert_eq!(sanitize_entry_path(Path::new("../../etc/passwd")), None);
        assert_eq!(sanitize_entry_path(Path::new("/etc/passwd")), None);
        assert_eq!(sanitize_entry_path(Path::new("a/../../b")), None);
    }

    #[test]
    fn test_sanitize_current_dir() {
        assert_eq!(sanitize_entry_path(Path::new("./")), Some(PathBuf::new()));
    }

    #[test]
    fn test_strip_suffix() {
        assert_eq!(strip_suffix_ignore_case("foo.txt.gz", ".gz"), "foo.txt");
        assert_eq!(strip_suffix_ignore_case("FOO.LOG.XZ", ".xz"), "FOO.LOG");
        assert_eq!(strip_suffix_ignore_case("foo.txt", ".gz"), "foo.txt");
        assert_eq!(strip_suffix_ignore_case("gz", ".gz"), "gz");
    }
}
