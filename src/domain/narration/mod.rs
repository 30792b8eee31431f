pub mod budget;
pub mod error;
pub mod language;
pub mod markup;
pub mod model;
pub mod segmenter;
pub mod service;
pub mod settings;
pub mod text;

pub use budget::{BudgetEstimator, BudgetMode};
pub use error::NarrationError;
pub use language::{detect_language, LanguageCode};
pub use markup::{MarkupExpander, MarkupSettings, PauseDurations, Prosody};
pub use model::{AudioEncoding, AudioFragment, AudioParams, Chunk, SynthesisInput, VoiceParams};
pub use segmenter::Segmenter;
pub use service::{read_document, NarrationOutcome, NarrationService, NarrationServiceApi};
pub use settings::{LanguageSetting, MarkupMode, NarrationSettings, VoiceSelection};
