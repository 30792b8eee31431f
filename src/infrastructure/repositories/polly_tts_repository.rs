use super::tts_repository::TtsRepository;
use crate::domain::narration::{
    AudioEncoding, AudioParams, LanguageCode, SynthesisInput, VoiceParams,
};
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, TextType, VoiceId},
    Client as PollyClient,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// AWS Polly bills at most 3000 characters per request; in plain text every
/// character is billed
pub const MAX_REQUEST_BYTES: usize = 3000;

/// The only sample rates Polly produces for PCM output
pub const PCM_SAMPLE_RATES: [u32; 2] = [8000, 16000];

/// AWS Polly implementation of TTS repository.
///
/// Polly has no request-level speaking rate or pitch; those only take
/// effect through SSML prosody.
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
    warned_ignored_params: AtomicBool,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self {
            polly_client,
            warned_ignored_params: AtomicBool::new(false),
        }
    }

    /// Configured audio parameters Polly cannot honor
    fn ignored_audio_params(audio: &AudioParams) -> Vec<&'static str> {
        let mut ignored = Vec::new();
        if audio.speaking_rate != 1.0 {
            ignored.push("speaking_rate");
        }
        if audio.pitch != 0.0 {
            ignored.push("pitch");
        }
        ignored
    }

    fn output_format(encoding: AudioEncoding) -> OutputFormat {
        match encoding {
            AudioEncoding::Linear16 => OutputFormat::Pcm,
            AudioEncoding::Mp3 => OutputFormat::Mp3,
            AudioEncoding::Ogg => OutputFormat::OggVorbis,
        }
    }

    fn text_type(input: &SynthesisInput) -> TextType {
        if input.is_markup() {
            TextType::Ssml
        } else {
            TextType::Text
        }
    }
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    async fn synthesize(
        &self,
        input: &SynthesisInput,
        voice: &VoiceParams,
        audio: &AudioParams,
    ) -> Result<Vec<u8>, String> {
        let voice_id = VoiceId::from(voice.name.as_str());
        let engine = Engine::Neural;
        let output_format = Self::output_format(audio.encoding);

        let ignored = Self::ignored_audio_params(audio);
        if !ignored.is_empty() && !self.warned_ignored_params.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                ignored = ?ignored,
                speaking_rate = audio.speaking_rate,
                pitch = audio.pitch,
                "AWS Polly ignores request-level rate and pitch; use PROFESSOR_STYLE prosody instead"
            );
        }

        tracing::debug!(
            voice = %voice.name,
            engine = ?engine,
            output_format = ?output_format,
            ssml = input.is_markup(),
            payload_bytes = input.wire_size(),
            "Calling AWS Polly synthesize_speech"
        );

        // Clone voice_id for error logging since it will be moved
        let voice_id_for_error = voice_id.clone();

        let mut request = self
            .polly_client
            .synthesize_speech()
            .text(input.as_str())
            .text_type(Self::text_type(input))
            .voice_id(voice_id)
            .output_format(output_format)
            .engine(engine.clone());

        if audio.encoding == AudioEncoding::Linear16 {
            request = request.sample_rate(audio.sample_rate_hz.to_string());
        }

        let result = request.send().await.map_err(|e| {
            tracing::error!(
                error = ?e,
                error_display = %e,
                voice_id = ?voice_id_for_error,
                engine = ?engine,
                payload_bytes = input.wire_size(),
                "AWS Polly synthesize_speech failed"
            );
            format!("AWS Polly error: {:?}", e)
        })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            format!("Failed to read audio stream: {}", e)
        })?;

        Ok(audio_stream.into_bytes().to_vec())
    }

    fn max_request_bytes(&self) -> usize {
        MAX_REQUEST_BYTES
    }

    fn supports_sample_rate(&self, sample_rate_hz: u32) -> bool {
        PCM_SAMPLE_RATES.contains(&sample_rate_hz)
    }

    /// Select the appropriate neural Polly voice for a language
    fn default_voice(&self, language: LanguageCode) -> &'static str {
        match language {
            LanguageCode::English => "Joanna",
            LanguageCode::Spanish => "Lucia",
            LanguageCode::French => "Lea",
            LanguageCode::German => "Vicki",
            LanguageCode::Italian => "Bianca",
            LanguageCode::Portuguese => "Ines",
        }
    }

    fn provider(&self) -> &'static str {
        "polly"
    }
}
