use crate::domain::narration::{AudioParams, LanguageCode, SynthesisInput, VoiceParams};
use async_trait::async_trait;

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (Google Cloud, AWS Polly, ...)
///
/// Implementations synthesize exactly one request-sized payload per call.
/// Chunking and audio merging happen upstream.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize one payload to audio in the requested encoding
    ///
    /// # Arguments
    /// * `input` - Plain text or SSML, already within the request ceiling
    /// * `voice` - Language and voice name
    /// * `audio` - Encoding, speaking rate, pitch and sample rate
    ///
    /// # Errors
    /// Returns the provider's diagnostic text if synthesis fails
    async fn synthesize(
        &self,
        input: &SynthesisInput,
        voice: &VoiceParams,
        audio: &AudioParams,
    ) -> Result<Vec<u8>, String>;

    /// Hard protocol ceiling for one request payload, in bytes
    fn max_request_bytes(&self) -> usize;

    /// Whether LINEAR16 output can be produced at this sample rate
    fn supports_sample_rate(&self, _sample_rate_hz: u32) -> bool {
        true
    }

    /// Voice used when none is configured
    fn default_voice(&self, language: LanguageCode) -> &'static str;

    fn provider(&self) -> &'static str;
}
