use super::budget::BudgetEstimator;
use super::error::NarrationError;
use super::language::{detect_language, LanguageCode};
use super::markup::MarkupExpander;
use super::model::{AudioEncoding, AudioFragment, Chunk, SynthesisInput, VoiceParams};
use super::segmenter::Segmenter;
use super::settings::{LanguageSetting, MarkupMode, NarrationSettings};
use super::text::normalize_document;
use crate::infrastructure::audio::{AssembledAudio, AudioAssembler};
use crate::infrastructure::repositories::TtsRepository;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// What a narration run produced
#[derive(Debug, Clone)]
pub struct NarrationOutcome {
    pub chunk_count: usize,
    /// Sum of payload bytes across all chunks
    pub wire_bytes: usize,
    pub voice: VoiceParams,
    /// `None` on a dry run
    pub audio: Option<AssembledAudio>,
}

pub struct NarrationService {
    settings: NarrationSettings,
    tts_repo: Arc<dyn TtsRepository>,
    assembler: AudioAssembler,
}

impl NarrationService {
    /// Fails if the configured budget is larger than the provider accepts,
    /// or the provider cannot produce LINEAR16 at the configured rate
    pub fn new(
        settings: NarrationSettings,
        tts_repo: Arc<dyn TtsRepository>,
        assembler: AudioAssembler,
    ) -> Result<Self, NarrationError> {
        let ceiling = tts_repo.max_request_bytes();
        if let Some(budget) = settings.active_budget() {
            if budget > ceiling {
                return Err(NarrationError::BudgetExceedsCeiling {
                    budget,
                    ceiling,
                    provider: tts_repo.provider(),
                });
            }
        }

        let audio = &settings.audio;
        if audio.encoding == AudioEncoding::Linear16
            && !tts_repo.supports_sample_rate(audio.sample_rate_hz)
        {
            return Err(NarrationError::UnsupportedSampleRate {
                sample_rate_hz: audio.sample_rate_hz,
                provider: tts_repo.provider(),
            });
        }

        Ok(Self {
            settings,
            tts_repo,
            assembler,
        })
    }
}

#[async_trait]
pub trait NarrationServiceApi: Send + Sync {
    /// Narrate the document at `input_path` into `output_path`
    ///
    /// This operation:
    /// - Reads and normalizes the document
    /// - Segments it into request-sized chunks (or validates raw markup)
    /// - Synthesizes every chunk sequentially, in order
    /// - Assembles the fragments into one recording
    ///
    /// Any failure aborts the run; nothing is retried.
    async fn narrate(
        &self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<NarrationOutcome, NarrationError>;
}

#[async_trait]
impl NarrationServiceApi for NarrationService {
    async fn narrate(
        &self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<NarrationOutcome, NarrationError> {
        let start_time = std::time::Instant::now();

        // 1. Read and normalize
        let document = read_document(input_path).await?;
        tracing::info!(
            path = %input_path.display(),
            document_length = document.len(),
            "Document loaded"
        );

        // 2. Pick the voice
        let voice = self.resolve_voice(&document)?;

        // 3. Plan chunks before any request is made
        let chunks = self.plan(&document)?;
        let wire_bytes: usize = chunks.iter().map(Chunk::wire_size).sum();
        tracing::info!(
            chunk_count = chunks.len(),
            wire_bytes,
            largest_chunk = chunks.iter().map(Chunk::wire_size).max().unwrap_or(0),
            budget = ?self.settings.active_budget(),
            voice = %voice.name,
            "Narration planned"
        );

        if self.settings.dry_run {
            for chunk in &chunks {
                tracing::info!(
                    chunk = chunk.index + 1,
                    wire_size = chunk.wire_size(),
                    text_length = chunk.text.len(),
                    "Planned chunk"
                );
            }
            return Ok(NarrationOutcome {
                chunk_count: chunks.len(),
                wire_bytes,
                voice,
                audio: None,
            });
        }

        // 4. Synthesize in order
        let fragments = self.synthesize_chunks(&chunks, &voice).await?;

        // 5. Assemble
        let audio = self
            .assembler
            .assemble(&fragments, &self.settings.audio, output_path)
            .await?;

        let duration = start_time.elapsed();
        let throughput_chars_per_sec = if duration.as_secs_f64() > 0.0 {
            document.len() as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        tracing::info!(
            provider = self.tts_repo.provider(),
            latency_ms = duration.as_millis(),
            characters_count = document.len(),
            chunk_count = chunks.len(),
            audio_size_bytes = audio.bytes_written,
            throughput_chars_per_sec = format!("{:.2}", throughput_chars_per_sec),
            "Narration completed"
        );

        Ok(NarrationOutcome {
            chunk_count: chunks.len(),
            wire_bytes,
            voice,
            audio: Some(audio),
        })
    }
}

impl NarrationService {
    /// Turn a normalized document into ordered, budget-checked chunks
    pub fn plan(&self, document: &str) -> Result<Vec<Chunk>, NarrationError> {
        match &self.settings.markup {
            MarkupMode::Auto(markup) => {
                let estimator = BudgetEstimator::markup(
                    MarkupExpander::new(markup.clone()),
                    self.settings.markup_budget,
                );
                Segmenter::new(estimator).segment(document)
            }
            MarkupMode::Disabled => {
                Segmenter::new(BudgetEstimator::plain(self.settings.plain_budget)).segment(document)
            }
            MarkupMode::Raw => {
                let size = document.len();
                let ceiling = self.tts_repo.max_request_bytes();
                if size > ceiling {
                    return Err(NarrationError::RawMarkupTooLarge { size, ceiling });
                }
                Ok(vec![Chunk {
                    index: 0,
                    text: document.to_string(),
                    payload: SynthesisInput::Markup(document.to_string()),
                }])
            }
        }
    }

    /// Language tag and voice name for this run
    pub fn resolve_voice(&self, document: &str) -> Result<VoiceParams, NarrationError> {
        let selection = &self.settings.voice;
        let (tag, language) = match &selection.language {
            LanguageSetting::Auto => {
                let detected = detect_language(document);
                tracing::info!(language_detected = %detected, "Language detected for narration");
                (detected.bcp47().to_string(), Some(detected))
            }
            LanguageSetting::Fixed(tag) => (tag.clone(), LanguageCode::from_tag(tag)),
        };

        let name = match (&selection.name, language) {
            (Some(name), _) => name.clone(),
            (None, Some(language)) => self.tts_repo.default_voice(language).to_string(),
            (None, None) => return Err(NarrationError::UnknownVoice(tag)),
        };

        Ok(VoiceParams {
            language: tag,
            name,
        })
    }

    /// One blocking request per chunk, strictly in chunk order
    pub async fn synthesize_chunks(
        &self,
        chunks: &[Chunk],
        voice: &VoiceParams,
    ) -> Result<Vec<AudioFragment>, NarrationError> {
        let total = chunks.len();
        let mut fragments = Vec::with_capacity(total);

        for chunk in chunks {
            tracing::info!(
                chunk = chunk.index + 1,
                total,
                wire_size = chunk.wire_size(),
                "Synthesizing chunk"
            );

            let bytes = self
                .tts_repo
                .synthesize(&chunk.payload, voice, &self.settings.audio)
                .await
                .map_err(|message| NarrationError::Synthesis {
                    chunk: chunk.index + 1,
                    total,
                    message,
                })?;

            tracing::debug!(
                chunk = chunk.index + 1,
                audio_size = bytes.len(),
                "Chunk synthesized"
            );

            fragments.push(AudioFragment {
                chunk_index: chunk.index,
                encoding: self.settings.audio.encoding,
                sample_rate_hz: self.settings.audio.sample_rate_hz,
                bytes,
            });
        }

        Ok(fragments)
    }
}

/// Read the input document and normalize it; empty documents are rejected
pub async fn read_document(path: &Path) -> Result<String, NarrationError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            NarrationError::MissingInput(path.to_path_buf())
        } else {
            NarrationError::ReadInput {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let document = normalize_document(&raw);
    if document.is_empty() {
        return Err(NarrationError::EmptyDocument);
    }
    Ok(document)
}
