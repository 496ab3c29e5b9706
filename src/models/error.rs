use std::io;
use std::path::PathBuf;

/// Everything the engine can report. Only `NotFound` aborts a run; every
/// other variant ends up as one string in the report's `errors` list.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("source path does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Unsupported archive format: {} ({reason})", path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("Failed to extract {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Unsafe entry '{entry}' in {}", path.display())]
    UnsafeEntry { path: PathBuf, entry: String },

    #[error("Failed to decompress {} with {tool}: {reason}", path.display())]
    ExternalTool {
        tool: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Reached maximum iterations ({max_iterations}) for recursive extraction")]
    BudgetExceeded { max_iterations: usize },

    #[error("Failed to {action} {}: {source}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("Error accessing {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("Extraction cancelled")]
    Cancelled,
}

impl ExtractError {
    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn filesystem(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_message() {
        let err = ExtractError::BudgetExceeded { max_iterations: 10 };
        assert_eq!(
            err.to_string(),
            "Reached maximum iterations (10) for recursive extraction"
        );
    }

    #[test]
    fn test_filesystem_message() {
        let err = ExtractError::filesystem(
            "remove original archive",
            "/tmp/a.zip",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Failed to remove original archive /tmp/a.zip: denied");
    }
}
