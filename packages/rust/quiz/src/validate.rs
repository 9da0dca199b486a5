//! Quiz file parsing and structural validation.
//!
//! Accepted question types: `multiple-choice` (legacy `single`),
//! `multi-select` (legacy `multi`), and `true-false`. Answers may name an
//! option by its text or, in older files, by its zero-based index.

use std::collections::BTreeSet;

use lessonhub_shared::LessonHubError;
use serde::Deserialize;
use serde_json::Value;

use crate::model::{Question, QuestionKind, Quiz};

/// Passing score used when a quiz file omits `passingScore`.
pub const DEFAULT_PASSING_SCORE: f64 = 70.0;

/// Why a quiz file was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuizFormatError {
    /// Not JSON, or the top-level shape is wrong.
    #[error("Invalid quiz format.")]
    Json(String),

    #[error("Invalid quiz format: missing title")]
    MissingTitle,

    #[error("Invalid quiz format: passingScore {0} is outside 0-100")]
    PassingScore(f64),

    #[error("No questions")]
    NoQuestions,

    #[error("Invalid quiz format: question {} is missing {field}", .index + 1)]
    MissingField { index: usize, field: &'static str },

    #[error("Invalid quiz format: question {} has unknown type '{kind}'", .index + 1)]
    UnknownType { index: usize, kind: String },

    #[error("Invalid quiz format: question {} needs at least 2 options", .index + 1)]
    TooFewOptions { index: usize },

    #[error("Invalid quiz format: question {}: {reason}", .index + 1)]
    InvalidAnswer { index: usize, reason: String },
}

impl From<QuizFormatError> for LessonHubError {
    fn from(err: QuizFormatError) -> Self {
        match err {
            QuizFormatError::Json(detail) => {
                tracing::debug!(error = %detail, "quiz JSON rejected");
                LessonHubError::parse("Invalid quiz format.")
            }
            other => LessonHubError::validation(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw file shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuiz {
    #[serde(default)]
    title: String,
    #[serde(default = "default_passing_score")]
    passing_score: f64,
    questions: Vec<RawQuestion>,
}

fn default_passing_score() -> f64 {
    DEFAULT_PASSING_SCORE
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default, alias = "prompt")]
    question: String,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default, alias = "correctAnswer")]
    answer: Value,
    #[serde(default)]
    explanation: String,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Parse quiz JSON text and validate its structure.
pub fn parse_quiz(text: &str) -> Result<Quiz, QuizFormatError> {
    let raw: RawQuiz =
        serde_json::from_str(text).map_err(|e| QuizFormatError::Json(e.to_string()))?;
    validate(raw)
}

fn validate(raw: RawQuiz) -> Result<Quiz, QuizFormatError> {
    if raw.title.trim().is_empty() {
        return Err(QuizFormatError::MissingTitle);
    }
    if !raw.passing_score.is_finite() || !(0.0..=100.0).contains(&raw.passing_score) {
        return Err(QuizFormatError::PassingScore(raw.passing_score));
    }
    if raw.questions.is_empty() {
        return Err(QuizFormatError::NoQuestions);
    }

    let questions = raw
        .questions
        .into_iter()
        .enumerate()
        .map(|(index, q)| validate_question(index, q))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(title = %raw.title, questions = questions.len(), "quiz validated");

    Ok(Quiz {
        title: raw.title,
        passing_score: raw.passing_score,
        questions,
    })
}

fn validate_question(index: usize, q: RawQuestion) -> Result<Question, QuizFormatError> {
    if q.kind.trim().is_empty() {
        return Err(QuizFormatError::MissingField { index, field: "type" });
    }
    if q.question.trim().is_empty() {
        return Err(QuizFormatError::MissingField {
            index,
            field: "question",
        });
    }
    if q.explanation.trim().is_empty() {
        return Err(QuizFormatError::MissingField {
            index,
            field: "explanation",
        });
    }

    let kind = match normalize_type(&q.kind) {
        Some(QuestionType::TrueFalse) => match q.answer {
            Value::Bool(answer) => QuestionKind::TrueFalse { answer },
            _ => {
                return Err(QuizFormatError::InvalidAnswer {
                    index,
                    reason: "answer must be true or false".into(),
                });
            }
        },
        Some(QuestionType::SingleChoice) => {
            let options = options_of(index, q.options)?;
            let answer = resolve_option(&options, &q.answer).ok_or_else(|| {
                QuizFormatError::InvalidAnswer {
                    index,
                    reason: "answer must be one of the options".into(),
                }
            })?;
            QuestionKind::SingleChoice { options, answer }
        }
        Some(QuestionType::MultiSelect) => {
            let options = options_of(index, q.options)?;
            let Value::Array(items) = &q.answer else {
                return Err(QuizFormatError::InvalidAnswer {
                    index,
                    reason: "answer must be a list of options".into(),
                });
            };
            if items.is_empty() {
                return Err(QuizFormatError::InvalidAnswer {
                    index,
                    reason: "answer must name at least one option".into(),
                });
            }

            let mut seen = BTreeSet::new();
            let mut answers = Vec::new();
            for item in items {
                let option = resolve_option(&options, item).ok_or_else(|| {
                    QuizFormatError::InvalidAnswer {
                        index,
                        reason: format!("{item} is not one of the options"),
                    }
                })?;
                if seen.insert(option.clone()) {
                    answers.push(option);
                }
            }
            QuestionKind::MultiSelect { options, answers }
        }
        None => {
            return Err(QuizFormatError::UnknownType {
                index,
                kind: q.kind,
            });
        }
    };

    Ok(Question {
        prompt: q.question,
        explanation: q.explanation,
        kind,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuestionType {
    SingleChoice,
    MultiSelect,
    TrueFalse,
}

/// Map required type names and their legacy aliases.
fn normalize_type(kind: &str) -> Option<QuestionType> {
    match kind.trim() {
        "multiple-choice" | "single" => Some(QuestionType::SingleChoice),
        "multi-select" | "multi" => Some(QuestionType::MultiSelect),
        "true-false" => Some(QuestionType::TrueFalse),
        _ => None,
    }
}

fn options_of(index: usize, options: Option<Vec<String>>) -> Result<Vec<String>, QuizFormatError> {
    match options {
        Some(options) if options.len() >= 2 => Ok(options),
        _ => Err(QuizFormatError::TooFewOptions { index }),
    }
}

/// Resolve an answer value to option text: a non-empty string present in
/// `options`, or an in-range index.
fn resolve_option(options: &[String], value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() && options.contains(s) => Some(s.clone()),
        Value::Number(n) => n
            .as_u64()
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| options.get(i).cloned()),
        _ => None,
    }
}
