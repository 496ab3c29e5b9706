use serde::Deserialize;
use std::path::PathBuf;

use crate::models::config::Config;

/// Parameters of one extraction call, as the tool adapters pass them in.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractRequest {
    pub source_path: PathBuf,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub recursive: Option<bool>,
}

impl ExtractRequest {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            output_dir: None,
            recursive: None,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| self.source_path.clone())
    }

    pub fn recursive(&self, config: &Config) -> bool {
        self.recursive.unwrap_or(config.recursive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let request: ExtractRequest = serde_json::from_str(r#"{"source_path": "/bundle"}"#).unwrap();
        assert_eq!(request.output_dir(), PathBuf::from("/bundle"));
        assert!(request.recursive(&Config::default()));

        let config = Config {
            recursive: false,
            ..Config::default()
        };
        assert!(!request.recursive(&config));
    }

    #[test]
    fn test_explicit_values() {
        let request: ExtractRequest =
            serde_json::from_str(r#"{"source_path": "/bundle", "output_dir": "/out", "recursive": false}"#).unwrap();
        assert_eq!(request.output_dir(), PathBuf::from("/out"));
        assert!(!request.recursive(&Config::default()));
    }
}
