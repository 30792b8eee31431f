use super::AssemblyError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Stream-level, re-encode-free concatenation of same-encoding files
#[async_trait]
pub trait StreamMuxer: Send + Sync {
    /// Concatenate the files listed in `manifest` into `output`
    ///
    /// # Errors
    /// [`AssemblyError::MuxerFailed`] carries the tool's stderr unmodified
    async fn concat(&self, manifest: &Path, output: &Path) -> Result<(), AssemblyError>;
}

/// Runs an ffmpeg-compatible binary with the concat demuxer and stream copy
pub struct CommandMuxer {
    program: PathBuf,
}

impl CommandMuxer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl StreamMuxer for CommandMuxer {
    async fn concat(&self, manifest: &Path, output: &Path) -> Result<(), AssemblyError> {
        tracing::debug!(
            program = %self.program.display(),
            manifest = %manifest.display(),
            output = %output.display(),
            "Running stream concat"
        );

        let result = Command::new(&self.program)
            .args(["-hide_banner", "-loglevel", "error", "-y"])
            .args(["-f", "concat", "-safe", "0", "-i"])
            .arg(manifest)
            .args(["-c", "copy"])
            .arg(output)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| AssemblyError::MuxerSpawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(AssemblyError::MuxerFailed {
                status: result.status.code(),
                stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            });
        }

        Ok(())
    }
}

/// One concat-demuxer manifest line; single quotes are closed, escaped and reopened
pub fn manifest_entry(path: &Path) -> String {
    let quoted = path.to_string_lossy().replace('\'', r"'\''");
    format!("file '{}'\n", quoted)
}
