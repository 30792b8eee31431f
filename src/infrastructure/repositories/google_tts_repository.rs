use super::tts_repository::TtsRepository;
use crate::domain::narration::{
    AudioEncoding, AudioParams, LanguageCode, SynthesisInput, VoiceParams,
};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

pub const GOOGLE_TTS_ENDPOINT: &str = "https://texttospeech.googleapis.com";

/// Google Cloud rejects any request whose input exceeds 5000 bytes
const MAX_REQUEST_BYTES: usize = 5000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: RequestInput<'a>,
    voice: RequestVoice<'a>,
    audio_config: RequestAudioConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum RequestInput<'a> {
    Text(&'a str),
    Ssml(&'a str),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestVoice<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestAudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f32,
    pitch: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_rate_hertz: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

/// Google Cloud Text-to-Speech over its REST API
pub struct GoogleTtsRepository {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GoogleTtsRepository {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn build_request<'a>(
        input: &'a SynthesisInput,
        voice: &'a VoiceParams,
        audio: &AudioParams,
    ) -> SynthesizeRequest<'a> {
        let input = match input {
            SynthesisInput::Text(text) => RequestInput::Text(text),
            SynthesisInput::Markup(ssml) => RequestInput::Ssml(ssml),
        };

        SynthesizeRequest {
            input,
            voice: RequestVoice {
                language_code: &voice.language,
                name: &voice.name,
            },
            audio_config: RequestAudioConfig {
                audio_encoding: audio.encoding.as_str(),
                speaking_rate: audio.speaking_rate,
                pitch: audio.pitch,
                sample_rate_hertz: (audio.encoding == AudioEncoding::Linear16)
                    .then_some(audio.sample_rate_hz),
            },
        }
    }
}

#[async_trait]
impl TtsRepository for GoogleTtsRepository {
    async fn synthesize(
        &self,
        input: &SynthesisInput,
        voice: &VoiceParams,
        audio: &AudioParams,
    ) -> Result<Vec<u8>, String> {
        let request = Self::build_request(input, voice, audio);
        let url = format!("{}/v1/text:synthesize", self.endpoint);

        tracing::debug!(
            voice = %voice.name,
            language = %voice.language,
            encoding = %audio.encoding,
            ssml = input.is_markup(),
            payload_bytes = input.wire_size(),
            "Calling Google Cloud text:synthesize"
        );

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Google Cloud TTS request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(
                status = %status,
                voice = %voice.name,
                payload_bytes = input.wire_size(),
                "Google Cloud TTS returned an error"
            );
            return Err(format!("Google Cloud TTS error ({}): {}", status, error_text));
        }

        let body: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse Google Cloud TTS response: {}", e))?;

        general_purpose::STANDARD
            .decode(body.audio_content)
            .map_err(|e| format!("Failed to decode base64 audio: {}", e))
    }

    fn max_request_bytes(&self) -> usize {
        MAX_REQUEST_BYTES
    }

    fn default_voice(&self, language: LanguageCode) -> &'static str {
        match language {
            LanguageCode::English => "en-US-Neural2-J",
            LanguageCode::Spanish => "es-ES-Neural2-B",
            LanguageCode::French => "fr-FR-Neural2-B",
            LanguageCode::German => "de-DE-Neural2-B",
            LanguageCode::Italian => "it-IT-Neural2-C",
            LanguageCode::Portuguese => "pt-PT-Wavenet-A",
        }
    }

    fn provider(&self) -> &'static str {
        "google"
    }
}
