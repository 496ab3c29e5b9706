use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_ITERATIONS: usize = 10;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Child process, stdout captured as the payload.
    #[default]
    External,
    /// In-process decoder crate.
    Builtin,
}

/// What to do when one entry of an otherwise readable archive fails.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EntryFailurePolicy {
    #[default]
    AbortArchive,
    SkipEntry,
}

/// Decoder settings for one compressor. Unset `program`/`args` fall back
/// to the stock tool for that format.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderConfig {
    pub backend: Backend,
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub max_iterations: usize,
    pub recursive: bool,
    pub entry_failure: EntryFailurePolicy,
    pub xz: DecoderConfig,
    pub bzip2: DecoderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            recursive: true,
            entry_failure: EntryFailurePolicy::default(),
            xz: DecoderConfig::default(),
            bzip2: DecoderConfig::default(),
        }
    }
}

impl Config {
    pub const FILENAME: &'static str = "config.toml";

    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|dir| dir.join("unnest").join(Self::FILENAME))
    }

    /// Explicit path first, then the user config dir, then defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        log::debug!("[{}] config loaded", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            anyhow::bail!("max_iterations must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.xz.backend, Backend::External);
        assert_eq!(config.bzip2.program, None);
    }

    #[test]
    fn test_partial_tables() {
        let config = Config::parse(
            r#"
            max_iterations = 4
            entry_failure = "skip-entry"

            [xz]
            backend = "builtin"

            [bzip2]
            program = "lbunzip2"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.entry_failure, EntryFailurePolicy::SkipEntry);
        assert_eq!(config.xz.backend, Backend::Builtin);
        assert_eq!(config.xz.program, None);
        assert_eq!(config.bzip2.program.as_deref(), Some("lbunzip2"));
        assert_eq!(config.bzip2.backend, Backend::External);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::parse("max_iteration = 3").is_err());
    }

    #[test]
    fn test_zero_iterations_rejected() {
        assert!(Config::parse("max_iterations = 0").is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "recursive = false").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert!(!config.recursive);
    }
}
