use lingua::{Language, LanguageDetectorBuilder};

/// Languages with a default voice on every provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCode {
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
}

impl LanguageCode {
    /// Get the ISO 639-1 code as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::English => "en",
            LanguageCode::Spanish => "es",
            LanguageCode::French => "fr",
            LanguageCode::German => "de",
            LanguageCode::Italian => "it",
            LanguageCode::Portuguese => "pt",
        }
    }

    /// Regional BCP-47 tag sent to the provider
    pub fn bcp47(&self) -> &'static str {
        match self {
            LanguageCode::English => "en-US",
            LanguageCode::Spanish => "es-ES",
            LanguageCode::French => "fr-FR",
            LanguageCode::German => "de-DE",
            LanguageCode::Italian => "it-IT",
            LanguageCode::Portuguese => "pt-PT",
        }
    }

    /// Parse the primary subtag of a BCP-47 tag (`en-GB` -> English)
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next()?.to_lowercase();
        match primary.as_str() {
            "en" => Some(LanguageCode::English),
            "es" => Some(LanguageCode::Spanish),
            "fr" => Some(LanguageCode::French),
            "de" => Some(LanguageCode::German),
            "it" => Some(LanguageCode::Italian),
            "pt" => Some(LanguageCode::Portuguese),
            _ => None,
        }
    }

    /// Convert lingua Language to LanguageCode
    pub fn from_lingua(language: Language) -> Self {
        match language {
            Language::English => LanguageCode::English,
            Language::Spanish => LanguageCode::Spanish,
            Language::French => LanguageCode::French,
            Language::German => LanguageCode::German,
            Language::Italian => LanguageCode::Italian,
            Language::Portuguese => LanguageCode::Portuguese,
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Detect the language of the given text
/// Returns LanguageCode or defaults to English
pub fn detect_language(text: &str) -> LanguageCode {
    let languages = vec![
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
    ];

    let detector = LanguageDetectorBuilder::from_languages(&languages).build();

    match detector.detect_language_of(text) {
        Some(language) => LanguageCode::from_lingua(language),
        None => {
            tracing::warn!("Could not detect language, falling back to English");
            LanguageCode::English
        }
    }
}
