use std::io;
use std::path::Path;
use std::process::Command;

use crate::models::config::DecoderConfig;
use crate::models::error::ExtractError;

/// An out-of-process decompressor. The archive path is appended to `args`
/// and stdout is taken as the decompressed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
    pub program: String,
    pub args: Vec<String>,
}

impl ExternalTool {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn xz(config: &DecoderConfig) -> Self {
        Self::from_config(config, "xz", &["-d", "-c"])
    }

    pub fn bzip2(config: &DecoderConfig) -> Self {
        Self::from_config(config, "bunzip2", &["-c"])
    }

    fn from_config(config: &DecoderConfig, program: &str, args: &[&str]) -> Self {
        let mut tool = Self::new(config.program.as_deref().unwrap_or(program), args);
        if let Some(args) = &config.args {
            tool.args = args.clone();
        }
        tool
    }

    /// Blocks until the child exits.
    pub fn decompress(&self, archive: &Path) -> Result<Vec<u8>, ExtractError> {
        log::debug!("[{}] {} {}", archive.display(), self.program, self.args.join(" "));

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(archive)
            .output()
            .map_err(|e| self.error(archive, spawn_reason(&self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = match stderr.trim() {
                "" => format!("exited with {}", output.status),
                msg => format!("exited with {}: {}", output.status, msg),
            };
            return Err(self.error(archive, reason));
        }

        Ok(output.stdout)
    }

    fn error(&self, archive: &Path, reason: String) -> ExtractError {
        ExtractError::ExternalTool {
            tool: self.program.clone(),
            path: archive.to_path_buf(),
            reason,
        }
    }
}

fn spawn_reason(program: &str, e: io::Error) -> String {
    if e.kind() == io::ErrorKind::NotFound {
        format!("'{}' not found on PATH", program)
    } else {
        e.to_string()
    }
}
