use crate::domain::narration::{
    AudioEncoding, AudioParams, LanguageSetting, MarkupMode, MarkupSettings, NarrationSettings,
    PauseDurations, Prosody, VoiceSelection,
};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::google_tts_repository::GOOGLE_TTS_ENDPOINT;
use crate::infrastructure::repositories::polly_tts_repository;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub provider: Provider,
    // Google Cloud
    pub google_api_key: Option<String>,
    pub google_endpoint: String,
    // AWS Polly
    pub aws_region: String,
    // Voice
    pub language_code: String,
    pub voice_name: Option<String>,
    // Audio
    pub audio_encoding: AudioEncoding,
    pub speaking_rate: f32,
    pub pitch: f32,
    pub sample_rate_hz: u32,
    // SSML
    pub ssml_enabled: bool,
    pub ssml_mode: SsmlMode,
    pub pauses: PauseDurations,
    pub professor_style: bool,
    pub prosody_rate: String,
    pub prosody_pitch: String,
    // Request budgets
    pub max_ssml_bytes: usize,
    pub max_text_bytes: usize,
    // Assembly
    pub muxer_path: PathBuf,
    pub log_format: LogFormat,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Polly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsmlMode {
    /// Expand plain text into SSML
    Auto,
    /// Input already is SSML
    Raw,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let defaults = PauseDurations::default();

        let provider = match env_or("TTS_PROVIDER", "google").to_lowercase().as_str() {
            "google" => Provider::Google,
            "polly" | "aws" => Provider::Polly,
            other => {
                return Err(AppError::Config(format!(
                    "TTS_PROVIDER must be google or polly, got {}",
                    other
                )))
            }
        };

        // Polly bills fewer characters per request and only renders PCM at 8 or 16 kHz
        let (default_budget, default_sample_rate) = match provider {
            Provider::Google => (4800, 24000),
            Provider::Polly => (polly_tts_repository::MAX_REQUEST_BYTES, 16000),
        };

        let config = Config {
            input_file: env_or("INPUT_FILE", "/input/input.txt").into(),
            output_file: env_or("OUTPUT_FILE", "/output/output.wav").into(),
            provider,
            google_api_key: env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty()),
            google_endpoint: env_or("GOOGLE_TTS_ENDPOINT", GOOGLE_TTS_ENDPOINT),
            aws_region: env_or("AWS_REGION", "us-east-1"),
            language_code: env_or("LANGUAGE_CODE", "en-US"),
            voice_name: env::var("VOICE_NAME").ok().filter(|v| !v.is_empty()),
            audio_encoding: env_or("AUDIO_ENCODING", "LINEAR16")
                .parse()
                .map_err(AppError::Config)?,
            speaking_rate: parse_env("SPEAKING_RATE", 1.0)?,
            pitch: parse_env("PITCH", 0.0)?,
            sample_rate_hz: parse_env("SAMPLE_RATE_HZ", default_sample_rate)?,
            ssml_enabled: parse_flag("SSML_ENABLED", true),
            ssml_mode: match env_or("SSML_MODE", "auto").to_lowercase().as_str() {
                "auto" => SsmlMode::Auto,
                "raw" => SsmlMode::Raw,
                other => {
                    return Err(AppError::Config(format!(
                        "SSML_MODE must be auto or raw, got {}",
                        other
                    )))
                }
            },
            pauses: PauseDurations {
                sentence_ms: parse_env("BREAK_SENTENCE_MS", defaults.sentence_ms)?,
                setup_ms: parse_env("BREAK_SETUP_MS", defaults.setup_ms)?,
                comma_ms: parse_env("BREAK_COMMA_MS", defaults.comma_ms)?,
                dash_ms: parse_env("BREAK_DASH_MS", defaults.dash_ms)?,
                paragraph_ms: parse_env("BREAK_PARAGRAPH_MS", defaults.paragraph_ms)?,
            },
            professor_style: parse_flag("PROFESSOR_STYLE", false),
            prosody_rate: env_or("PROSODY_RATE", "95%"),
            prosody_pitch: env_or("PROSODY_PITCH", "-1st"),
            max_ssml_bytes: parse_env("MAX_SSML_BYTES", default_budget)?,
            max_text_bytes: parse_env("MAX_TEXT_BYTES", default_budget)?,
            muxer_path: env_or("MUXER_PATH", "ffmpeg").into(),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })
                .unwrap_or(LogFormat::Pretty),
            dry_run: parse_flag("DRY_RUN", false),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.provider == Provider::Google && self.google_api_key.is_none() && !self.dry_run {
            return Err(AppError::Config(
                "GOOGLE_API_KEY is required for the google provider".to_string(),
            ));
        }
        if self.sample_rate_hz == 0 {
            return Err(AppError::Config("SAMPLE_RATE_HZ must be positive".to_string()));
        }
        if self.max_ssml_bytes == 0 || self.max_text_bytes == 0 {
            return Err(AppError::Config("request budgets must be positive".to_string()));
        }
        let pauses = &self.pauses;
        let longest_inline = pauses
            .sentence_ms
            .max(pauses.setup_ms)
            .max(pauses.comma_ms)
            .max(pauses.dash_ms);
        if pauses.paragraph_ms <= longest_inline {
            return Err(AppError::Config(format!(
                "BREAK_PARAGRAPH_MS ({}) must be longer than every inline pause ({})",
                pauses.paragraph_ms, longest_inline
            )));
        }
        Ok(())
    }

    /// Immutable settings handed to the narration service
    pub fn narration_settings(&self) -> NarrationSettings {
        let markup = match (self.ssml_enabled, self.ssml_mode) {
            (false, _) => MarkupMode::Disabled,
            (true, SsmlMode::Raw) => MarkupMode::Raw,
            (true, SsmlMode::Auto) => MarkupMode::Auto(MarkupSettings {
                pauses: self.pauses,
                prosody: self.professor_style.then(|| Prosody {
                    rate: self.prosody_rate.clone(),
                    pitch: self.prosody_pitch.clone(),
                }),
            }),
        };

        let language = if self.language_code.eq_ignore_ascii_case("auto") {
            LanguageSetting::Auto
        } else {
            LanguageSetting::Fixed(self.language_code.clone())
        };

        NarrationSettings {
            markup,
            markup_budget: self.max_ssml_bytes,
            plain_budget: self.max_text_bytes,
            voice: VoiceSelection {
                language,
                name: self.voice_name.clone(),
            },
            audio: AudioParams {
                encoding: self.audio_encoding,
                speaking_rate: self.speaking_rate,
                pitch: self.pitch,
                sample_rate_hz: self.sample_rate_hz,
            },
            dry_run: self.dry_run,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{} has invalid value {:?}: {}", key, raw, e))),
        Err(_) => Ok(default),
    }
}

fn parse_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
