use async_trait::async_trait;
use narrator::domain::narration::{
    AudioEncoding, AudioParams, LanguageCode, SynthesisInput, VoiceParams,
};
use narrator::infrastructure::audio::wav::wav_spec;
use narrator::infrastructure::audio::{AssemblyError, StreamMuxer};
use narrator::infrastructure::repositories::TtsRepository;
use parking_lot::Mutex;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Samples returned for the n-th call (1-based): `n` repeated, one per 16 payload bytes
pub fn expected_samples(call: usize, payload_bytes: usize) -> Vec<i16> {
    vec![call as i16; payload_bytes / 16 + 1]
}

/// In-process synthesis provider.
///
/// Records every payload it receives. LINEAR16 responses are raw samples
/// (or RIFF-wrapped when `wrap_wav` is set); compressed responses are a
/// marker naming the call number.
pub struct FakeTtsRepository {
    pub calls: Mutex<Vec<SynthesisInput>>,
    pub voices: Mutex<Vec<VoiceParams>>,
    pub fail_on_call: Option<usize>,
    pub wrap_wav: bool,
    pub ceiling: usize,
}

impl Default for FakeTtsRepository {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            voices: Mutex::new(Vec::new()),
            fail_on_call: None,
            wrap_wav: false,
            ceiling: 5000,
        }
    }
}

impl FakeTtsRepository {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn wrapping_wav() -> Self {
        Self {
            wrap_wav: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl TtsRepository for FakeTtsRepository {
    async fn synthesize(
        &self,
        input: &SynthesisInput,
        voice: &VoiceParams,
        audio: &AudioParams,
    ) -> Result<Vec<u8>, String> {
        let call = {
            let mut calls = self.calls.lock();
            calls.push(input.clone());
            calls.len()
        };
        self.voices.lock().push(voice.clone());

        if self.fail_on_call == Some(call) {
            return Err("429 Too Many Requests: quota exhausted".to_string());
        }

        match audio.encoding {
            AudioEncoding::Linear16 => {
                let samples = expected_samples(call, input.wire_size());
                if self.wrap_wav {
                    let mut buffer = Cursor::new(Vec::new());
                    let mut writer = hound::WavWriter::new(&mut buffer, wav_spec(audio.sample_rate_hz))
                        .map_err(|e| e.to_string())?;
                    for sample in samples {
                        writer.write_sample(sample).map_err(|e| e.to_string())?;
                    }
                    writer.finalize().map_err(|e| e.to_string())?;
                    Ok(buffer.into_inner())
                } else {
                    Ok(samples.iter().flat_map(|s| s.to_le_bytes()).collect())
                }
            }
            _ => Ok(format!("[frame {}]", call).into_bytes()),
        }
    }

    fn max_request_bytes(&self) -> usize {
        self.ceiling
    }

    fn default_voice(&self, language: LanguageCode) -> &'static str {
        match language {
            LanguageCode::English => "fake-en",
            LanguageCode::Spanish => "fake-es",
            _ => "fake-other",
        }
    }

    fn provider(&self) -> &'static str {
        "fake"
    }
}

/// Concatenates the manifest's files byte-for-byte, like a stream copy would
#[derive(Default)]
pub struct ConcatMuxer {
    pub invocations: Mutex<Vec<Vec<PathBuf>>>,
    pub fail_with: Option<String>,
}

impl ConcatMuxer {
    pub fn failing(stderr: &str) -> Self {
        Self {
            fail_with: Some(stderr.to_string()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl StreamMuxer for ConcatMuxer {
    async fn concat(&self, manifest: &Path, output: &Path) -> Result<(), AssemblyError> {
        let entries: Vec<PathBuf> = std::fs::read_to_string(manifest)?
            .lines()
            .filter_map(|line| line.strip_prefix("file '")?.strip_suffix('\'').map(PathBuf::from))
            .collect();
        self.invocations.lock().push(entries.clone());

        if let Some(stderr) = &self.fail_with {
            return Err(AssemblyError::MuxerFailed {
                status: Some(1),
                stderr: stderr.clone(),
            });
        }

        let mut joined = Vec::new();
        for entry in &entries {
            joined.extend(std::fs::read(entry)?);
        }
        std::fs::write(output, joined)?;
        Ok(())
    }
}
