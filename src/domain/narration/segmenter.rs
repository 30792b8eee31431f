use super::budget::BudgetEstimator;
use super::error::NarrationError;
use super::model::Chunk;
use super::text::{
    preview, split_paragraphs, split_sentences, split_words, INLINE_SEPARATOR,
    PARAGRAPH_SEPARATOR,
};

/// Unit size the packer is currently working at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Granularity {
    Paragraph,
    Sentence,
    Word,
}

impl Granularity {
    fn joiner(self) -> &'static str {
        match self {
            Granularity::Paragraph => PARAGRAPH_SEPARATOR,
            Granularity::Sentence | Granularity::Word => INLINE_SEPARATOR,
        }
    }

    /// Next finer unit, with the decomposition of an oversized unit into it
    fn finer(self, unit: &str) -> Option<(Granularity, Vec<&str>)> {
        match self {
            Granularity::Paragraph => Some((Granularity::Sentence, split_sentences(unit))),
            Granularity::Sentence => Some((Granularity::Word, split_words(unit))),
            Granularity::Word => None,
        }
    }
}

/// Greedy, boundary-aware bin-packer.
///
/// Packs paragraphs first, falls back to sentences for a paragraph that is
/// too large on its own, and to words for such a sentence. Never splits a
/// word. Packing is strictly greedy: a unit that fits is always appended.
pub struct Segmenter {
    estimator: BudgetEstimator,
}

impl Segmenter {
    pub fn new(estimator: BudgetEstimator) -> Self {
        Self { estimator }
    }

    pub fn estimator(&self) -> &BudgetEstimator {
        &self.estimator
    }

    /// Partition a normalized document into chunks that each fit the budget
    pub fn segment(&self, document: &str) -> Result<Vec<Chunk>, NarrationError> {
        let mut texts = Vec::new();
        let tail = self.pack(
            split_paragraphs(document),
            Granularity::Paragraph,
            PARAGRAPH_SEPARATOR,
            String::new(),
            &mut texts,
        )?;
        if !tail.is_empty() {
            texts.push(tail);
        }

        let chunks: Vec<Chunk> = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk {
                index,
                payload: self.estimator.render(&text),
                text,
            })
            .collect();

        self.verify(&chunks)?;

        tracing::debug!(
            chunk_count = chunks.len(),
            budget = self.estimator.budget(),
            "Document segmented"
        );

        Ok(chunks)
    }

    /// Pack `units` onto the pending accumulator `current`, returning what is
    /// still pending. `boundary` joins `current` to the first unit.
    fn pack(
        &self,
        units: Vec<&str>,
        granularity: Granularity,
        boundary: &str,
        mut current: String,
        out: &mut Vec<String>,
    ) -> Result<String, NarrationError> {
        for (position, unit) in units.into_iter().enumerate() {
            let joiner = if position == 0 {
                boundary
            } else {
                granularity.joiner()
            };

            if !current.is_empty() {
                let candidate = format!("{}{}{}", current, joiner, unit);
                if self.estimator.fits(&candidate) {
                    current = candidate;
                    continue;
                }
            }

            if self.estimator.fits(unit) {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                current.push_str(unit);
                continue;
            }

            match granularity.finer(unit) {
                Some((finer, parts)) => {
                    tracing::debug!(
                        from = ?granularity,
                        to = ?finer,
                        unit_size = self.estimator.estimate(unit),
                        part_count = parts.len(),
                        "Unit over budget, splitting finer"
                    );
                    current = self.pack(parts, finer, joiner, current, out)?;
                }
                None => {
                    return Err(NarrationError::Unsplittable {
                        fragment: preview(unit, 40),
                        size: self.estimator.estimate(unit),
                        budget: self.estimator.budget(),
                    });
                }
            }
        }

        Ok(current)
    }

    /// Re-measure every chunk; a failure here is a packer defect
    fn verify(&self, chunks: &[Chunk]) -> Result<(), NarrationError> {
        let budget = self.estimator.budget();
        for chunk in chunks {
            let size = chunk.wire_size();
            if chunk.text.is_empty() || size > budget {
                return Err(NarrationError::InternalConsistency {
                    chunk: chunk.index + 1,
                    size,
                    budget,
                });
            }
        }
        Ok(())
    }
}
