//! Document normalization and boundary detection.
//!
//! Every splitter here returns borrowed, trimmed, non-empty slices in source
//! order, so re-joining them only ever changes whitespace.

use once_cell::sync::Lazy;
use regex::Regex;

/// Joins paragraphs inside a chunk
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";
/// Joins sentences and words inside a chunk
pub const INLINE_SEPARATOR: &str = " ";

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n\s*").expect("paragraph pattern is valid"));

// Terminal punctuation, optionally closed by quotes or brackets, then whitespace
static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?]+["'”’)\]]*\s+"#).expect("sentence pattern is valid"));

/// Canonical line endings, no byte-order mark, no surrounding whitespace
pub fn normalize_document(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .trim()
        .to_string()
}

/// Split on blank lines
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Split after terminal punctuation followed by whitespace
pub fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut last_end = 0;

    for mat in SENTENCE_END.find_iter(paragraph) {
        sentences.push(paragraph[last_end..mat.end()].trim());
        last_end = mat.end();
    }
    if last_end < paragraph.len() {
        sentences.push(paragraph[last_end..].trim());
    }

    sentences.retain(|s| !s.is_empty());
    sentences
}

pub fn split_words(sentence: &str) -> Vec<&str> {
    sentence.split_whitespace().collect()
}

/// Preview of a fragment for log lines and error messages
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push('…');
    }
    out
}
