pub mod muxer;
pub mod wav;

pub use muxer::{CommandMuxer, StreamMuxer};

use crate::domain::narration::{AudioEncoding, AudioFragment, AudioParams};
use muxer::manifest_entry;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("no audio fragments to assemble")]
    NoFragments,

    #[error("fragment {chunk} is {found} but the run uses {expected}")]
    MixedEncodings {
        chunk: usize,
        expected: AudioEncoding,
        found: AudioEncoding,
    },

    #[error("fragment {chunk} has {len} bytes, which is not a whole number of 16-bit samples")]
    PartialSample { chunk: usize, len: usize },

    #[error("fragment {chunk} is {channels}ch/{bits_per_sample}-bit/{sample_rate}Hz, expected mono 16-bit at the configured rate")]
    UnexpectedWavFormat {
        chunk: usize,
        channels: u16,
        bits_per_sample: u16,
        sample_rate: u32,
    },

    #[error("WAV encoding failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV writer task failed: {0}")]
    WriterTask(#[from] tokio::task::JoinError),

    #[error("failed to run muxer {}: {source}", .program.display())]
    MuxerSpawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("muxer exited with status {}: {stderr}", .status.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    MuxerFailed { status: Option<i32>, stderr: String },
}

/// Summary of the file written by [`AudioAssembler::assemble`]
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledAudio {
    pub path: PathBuf,
    pub encoding: AudioEncoding,
    pub bytes_written: u64,
    /// PCM frames, for LINEAR16 output only
    pub frames: Option<u64>,
}

/// Merges ordered fragments into one output file.
///
/// LINEAR16 fragments are concatenated sample-for-sample into a WAV
/// container. Compressed fragments are staged in a temporary directory and
/// joined by a [`StreamMuxer`]; the directory is removed on every exit path.
pub struct AudioAssembler {
    muxer: Arc<dyn StreamMuxer>,
}

impl AudioAssembler {
    pub fn new(muxer: Arc<dyn StreamMuxer>) -> Self {
        Self { muxer }
    }

    pub async fn assemble(
        &self,
        fragments: &[AudioFragment],
        audio: &AudioParams,
        output_path: &Path,
    ) -> Result<AssembledAudio, AssemblyError> {
        if fragments.is_empty() {
            return Err(AssemblyError::NoFragments);
        }
        if let Some(odd) = fragments.iter().find(|f| f.encoding != audio.encoding) {
            return Err(AssemblyError::MixedEncodings {
                chunk: odd.chunk_index + 1,
                expected: audio.encoding,
                found: odd.encoding,
            });
        }

        ensure_parent_dir(output_path).await?;

        let frames = if audio.encoding.is_compressed() {
            self.concat_compressed(fragments, audio.encoding, output_path)
                .await?;
            None
        } else {
            Some(concat_pcm(fragments, audio.sample_rate_hz, output_path).await?)
        };

        let bytes_written = tokio::fs::metadata(output_path).await?.len();

        tracing::info!(
            path = %output_path.display(),
            encoding = %audio.encoding,
            fragment_count = fragments.len(),
            bytes_written,
            frames = ?frames,
            "Audio assembled"
        );

        Ok(AssembledAudio {
            path: output_path.to_path_buf(),
            encoding: audio.encoding,
            bytes_written,
            frames,
        })
    }

    async fn concat_compressed(
        &self,
        fragments: &[AudioFragment],
        encoding: AudioEncoding,
        output_path: &Path,
    ) -> Result<(), AssemblyError> {
        // A lone fragment is already a complete stream
        if let [only] = fragments {
            tokio::fs::write(output_path, &only.bytes).await?;
            return Ok(());
        }

        let staging = tempfile::Builder::new().prefix("narrator-").tempdir()?;
        let mut manifest = String::new();

        for (position, fragment) in fragments.iter().enumerate() {
            let path = staging
                .path()
                .join(format!("chunk_{:05}.{}", position, encoding.extension()));
            tokio::fs::write(&path, &fragment.bytes).await?;
            manifest.push_str(&manifest_entry(&path));
        }

        let manifest_path = staging.path().join("concat.txt");
        tokio::fs::write(&manifest_path, manifest).await?;

        tracing::debug!(
            staging = %staging.path().display(),
            fragment_count = fragments.len(),
            "Fragments staged for concat"
        );

        self.muxer.concat(&manifest_path, output_path).await?;
        staging.close()?;

        Ok(())
    }
}

async fn concat_pcm(
    fragments: &[AudioFragment],
    sample_rate_hz: u32,
    output_path: &Path,
) -> Result<u64, AssemblyError> {
    let mut samples = Vec::new();
    for fragment in fragments {
        samples.extend(wav::fragment_samples(fragment)?);
    }

    // hound writes through blocking file I/O
    let path = output_path.to_path_buf();
    tokio::task::spawn_blocking(move || wav::write_wav(&path, &samples, sample_rate_hz)).await?
}

async fn ensure_parent_dir(path: &Path) -> Result<(), AssemblyError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}
