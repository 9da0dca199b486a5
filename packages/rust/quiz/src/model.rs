//! Validated quiz types and submitted answers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A validated quiz, ready to present and score.
#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    pub title: String,
    /// Minimum percentage (0–100) needed to pass.
    pub passing_score: f64,
    pub questions: Vec<Question>,
}

/// One question with its prompt, explanation, and answer shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub prompt: String,
    pub explanation: String,
    pub kind: QuestionKind,
}

/// The three supported question variants.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    /// Exactly one option is correct.
    SingleChoice { options: Vec<String>, answer: String },
    /// A non-empty set of options is correct; order does not matter.
    MultiSelect {
        options: Vec<String>,
        answers: Vec<String>,
    },
    TrueFalse { answer: bool },
}

impl QuestionKind {
    /// Selectable options in display order (`True`/`False` for true/false).
    pub fn options(&self) -> Vec<String> {
        match self {
            Self::SingleChoice { options, .. } | Self::MultiSelect { options, .. } => {
                options.clone()
            }
            Self::TrueFalse { .. } => vec!["True".to_string(), "False".to_string()],
        }
    }

    /// Short name used in prompts and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SingleChoice { .. } => "multiple-choice",
            Self::MultiSelect { .. } => "multi-select",
            Self::TrueFalse { .. } => "true-false",
        }
    }
}

impl Question {
    /// Build the response for the option at `index` (zero-based) in
    /// [`QuestionKind::options`] order.
    ///
    /// For multi-select the result holds just that option; use
    /// [`Question::response_for_options`] to select several.
    pub fn response_for_option(&self, index: usize) -> Option<Response> {
        match &self.kind {
            QuestionKind::TrueFalse { .. } => match index {
                0 => Some(Response::Flag(true)),
                1 => Some(Response::Flag(false)),
                _ => None,
            },
            QuestionKind::SingleChoice { options, .. } => {
                options.get(index).cloned().map(Response::Choice)
            }
            QuestionKind::MultiSelect { options, .. } => options
                .get(index)
                .cloned()
                .map(|o| Response::Choices(vec![o])),
        }
    }

    /// Build a multi-option response from zero-based option indices.
    /// Returns `None` if any index is out of range.
    pub fn response_for_options(&self, indices: &[usize]) -> Option<Response> {
        let options = self.kind.options();
        let chosen = indices
            .iter()
            .map(|i| options.get(*i).cloned())
            .collect::<Option<Vec<_>>>()?;
        Some(Response::Choices(chosen))
    }
}

/// A user's answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Flag(bool),
    Choice(String),
    Choices(Vec<String>),
}

/// Answers for one quiz attempt, keyed by zero-based question index.
///
/// Deserializes from a JSON object such as `{"0": "B", "1": true}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<usize, Response>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the answer to question `index`.
    pub fn insert(&mut self, index: usize, response: Response) {
        self.0.insert(index, response);
    }

    pub fn get(&self, index: usize) -> Option<&Response> {
        self.0.get(&index)
    }

    pub fn remove(&mut self, index: usize) {
        self.0.remove(&index);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Toggle `option` within a multi-select answer, creating it if needed.
    pub fn toggle_choice(&mut self, index: usize, option: &str) {
        let entry = self
            .0
            .entry(index)
            .or_insert_with(|| Response::Choices(Vec::new()));
        if !matches!(entry, Response::Choices(_)) {
            *entry = Response::Choices(Vec::new());
        }
        if let Response::Choices(chosen) = entry {
            if let Some(pos) = chosen.iter().position(|c| c == option) {
                chosen.remove(pos);
            } else {
                chosen.push(option.to_string());
            }
        }
    }
}

impl FromIterator<(usize, Response)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (usize, Response)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
