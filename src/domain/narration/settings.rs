use super::markup::MarkupSettings;
use super::model::AudioParams;

/// How the document is turned into payloads
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupMode {
    /// Expand plain text into SSML and segment by expanded size
    Auto(MarkupSettings),
    /// The document already is SSML; sent as one request, unsegmented
    Raw,
    /// No markup; segment by plain text size
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LanguageSetting {
    /// Detect from the document
    Auto,
    Fixed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSelection {
    pub language: LanguageSetting,
    /// Provider voice; falls back to the provider default for the language
    pub name: Option<String>,
}

/// Immutable settings for one narration run
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationSettings {
    pub markup: MarkupMode,
    /// Ceiling for expanded SSML chunks
    pub markup_budget: usize,
    /// Ceiling for plain text chunks
    pub plain_budget: usize,
    pub voice: VoiceSelection,
    pub audio: AudioParams,
    /// Plan chunks without synthesizing
    pub dry_run: bool,
}

impl NarrationSettings {
    /// Budget in force for the configured mode; raw markup is not segmented
    pub fn active_budget(&self) -> Option<usize> {
        match self.markup {
            MarkupMode::Auto(_) => Some(self.markup_budget),
            MarkupMode::Disabled => Some(self.plain_budget),
            MarkupMode::Raw => None,
        }
    }
}
