use crate::infrastructure::audio::AssemblyError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum NarrationError {
    #[error("input document not found at {}", .0.display())]
    MissingInput(PathBuf),

    #[error("failed to read input document {}: {source}", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input document is empty")]
    EmptyDocument,

    #[error("no voice for language {0}; set VOICE_NAME")]
    UnknownVoice(String),

    #[error("budget of {budget} bytes exceeds the {provider} request ceiling of {ceiling} bytes")]
    BudgetExceedsCeiling {
        budget: usize,
        ceiling: usize,
        provider: &'static str,
    },

    #[error("{provider} cannot produce LINEAR16 audio at {sample_rate_hz} Hz")]
    UnsupportedSampleRate {
        sample_rate_hz: u32,
        provider: &'static str,
    },

    #[error("cannot split \"{fragment}\": a single word needs {size} bytes, budget is {budget}")]
    Unsplittable {
        fragment: String,
        size: usize,
        budget: usize,
    },

    #[error("raw markup document is {size} bytes, request ceiling is {ceiling}")]
    RawMarkupTooLarge { size: usize, ceiling: usize },

    #[error("segmenter produced chunk {chunk} of {size} bytes over the {budget} byte budget")]
    InternalConsistency {
        chunk: usize,
        size: usize,
        budget: usize,
    },

    #[error("synthesis of chunk {chunk}/{total} failed: {message}")]
    Synthesis {
        chunk: usize,
        total: usize,
        message: String,
    },

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

impl NarrationError {
    /// Name of the pipeline stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MissingInput(_) | Self::ReadInput { .. } | Self::EmptyDocument => "input read",
            Self::UnknownVoice(_)
            | Self::BudgetExceedsCeiling { .. }
            | Self::UnsupportedSampleRate { .. } => "configuration",
            Self::Unsplittable { .. }
            | Self::RawMarkupTooLarge { .. }
            | Self::InternalConsistency { .. } => "segmentation",
            Self::Synthesis { .. } => "synthesis",
            Self::Assembly(_) => "assembly",
        }
    }
}
