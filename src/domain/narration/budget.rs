use super::markup::MarkupExpander;
use super::model::SynthesisInput;

/// How a candidate chunk is rendered before it goes over the wire
#[derive(Debug, Clone)]
pub enum BudgetMode {
    /// Size is measured after full markup expansion
    Markup(MarkupExpander),
    /// Size is the UTF-8 length of the text itself
    Plain,
}

/// Exact wire-size oracle for candidate chunks.
///
/// Stateless apart from its configuration; every call re-renders the
/// candidate, so markup estimates are never approximations.
#[derive(Debug, Clone)]
pub struct BudgetEstimator {
    mode: BudgetMode,
    budget: usize,
}

impl BudgetEstimator {
    pub fn new(mode: BudgetMode, budget: usize) -> Self {
        Self { mode, budget }
    }

    pub fn markup(expander: MarkupExpander, budget: usize) -> Self {
        Self::new(BudgetMode::Markup(expander), budget)
    }

    pub fn plain(budget: usize) -> Self {
        Self::new(BudgetMode::Plain, budget)
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// The payload that would be transmitted for `text`
    pub fn render(&self, text: &str) -> SynthesisInput {
        match &self.mode {
            BudgetMode::Markup(expander) => SynthesisInput::Markup(expander.expand(text)),
            BudgetMode::Plain => SynthesisInput::Text(text.to_string()),
        }
    }

    /// Byte length of the rendered payload
    pub fn estimate(&self, text: &str) -> usize {
        match &self.mode {
            BudgetMode::Markup(expander) => expander.expand(text).len(),
            BudgetMode::Plain => text.len(),
        }
    }

    pub fn fits(&self, text: &str) -> bool {
        self.estimate(text) <= self.budget
    }
}
