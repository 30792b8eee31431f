use super::text::split_paragraphs;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// Either a punctuation class followed by whitespace, or a dash with optional whitespace
static PAUSE_POINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?P<term>[.!?]+["'”’)\]]*)(?P<term_ws>\s+)|(?P<setup>[:;])(?P<setup_ws>\s+)|(?P<comma>,)(?P<comma_ws>\s+)|(?P<dash>—|--)(?P<dash_ws>\s*)"#,
    )
    .expect("pause pattern is valid")
});

/// Pause lengths in milliseconds per punctuation class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PauseDurations {
    pub sentence_ms: u32,
    /// Colon and semicolon
    pub setup_ms: u32,
    pub comma_ms: u32,
    /// Em-dash and double hyphen
    pub dash_ms: u32,
    /// Between paragraphs; longer than every inline pause
    pub paragraph_ms: u32,
}

impl Default for PauseDurations {
    fn default() -> Self {
        Self {
            sentence_ms: 600,
            setup_ms: 450,
            comma_ms: 250,
            dash_ms: 350,
            paragraph_ms: 900,
        }
    }
}

/// Rate and pitch applied to every paragraph in "professor" delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prosody {
    pub rate: String,
    pub pitch: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkupSettings {
    pub pauses: PauseDurations,
    pub prosody: Option<Prosody>,
}

/// Turns plain text into SSML with pause directives.
///
/// Pure: the same input and settings always produce byte-identical output,
/// which the segmenter relies on when it uses [`MarkupExpander::expand`] as a
/// size oracle.
#[derive(Debug, Clone)]
pub struct MarkupExpander {
    settings: MarkupSettings,
}

impl MarkupExpander {
    pub fn new(settings: MarkupSettings) -> Self {
        Self { settings }
    }

    /// Expand a whole chunk: paragraphs joined by a paragraph pause, wrapped in `<speak>`
    pub fn expand(&self, text: &str) -> String {
        let paragraph_break = break_tag(self.settings.pauses.paragraph_ms);
        let body = split_paragraphs(text)
            .into_iter()
            .map(|paragraph| self.expand_paragraph(paragraph))
            .collect::<Vec<_>>()
            .join(&paragraph_break);

        format!("<speak>{}</speak>", body)
    }

    /// Escape, insert pauses, then optionally wrap in prosody.
    ///
    /// Escaping is applied to source spans before any directive is appended,
    /// so inserted tags are never escaped and entity semicolons never count
    /// as punctuation.
    pub fn expand_paragraph(&self, paragraph: &str) -> String {
        let mut out = String::with_capacity(paragraph.len() + paragraph.len() / 4);
        let mut last_end = 0;

        for caps in PAUSE_POINT.captures_iter(paragraph) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&escape_markup(&paragraph[last_end..whole.end()]));
            out.push_str(&break_tag(self.pause_for(&caps)));
            last_end = whole.end();
        }
        out.push_str(&escape_markup(&paragraph[last_end..]));

        match &self.settings.prosody {
            Some(prosody) => format!(
                r#"<prosody rate="{}" pitch="{}">{}</prosody>"#,
                escape_attribute(&prosody.rate),
                escape_attribute(&prosody.pitch),
                out
            ),
            None => out,
        }
    }

    fn pause_for(&self, caps: &Captures<'_>) -> u32 {
        let pauses = &self.settings.pauses;
        if caps.name("term").is_some() {
            pauses.sentence_ms
        } else if caps.name("setup").is_some() {
            pauses.setup_ms
        } else if caps.name("comma").is_some() {
            pauses.comma_ms
        } else {
            pauses.dash_ms
        }
    }
}

fn break_tag(ms: u32) -> String {
    format!(r#"<break time="{}ms"/>"#, ms)
}

/// Escape the characters that are structural in SSML text content
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attribute(value: &str) -> String {
    escape_markup(value).replace('"', "&quot;")
}
